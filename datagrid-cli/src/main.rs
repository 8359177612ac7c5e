mod paths;
mod render;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use datagrid_lib::error::ApiError;
use datagrid_lib::error::SessionError;
use datagrid_lib::fetch::TableFetcher;
use datagrid_lib::model::Entity;
use datagrid_lib::notify::NoticeLevel;
use datagrid_lib::notify::NoticeQueue;
use datagrid_lib::query::Direction;
use datagrid_lib::query::Sort;
use datagrid_lib::session::AccessToken;
use datagrid_lib::session::Session;
use datagrid_lib::session::SqliteSessionStore;
use datagrid_lib::table::TableConfig;
use datagrid_lib::table::TableController;
use datagrid_lib::transport::HttpTransport;
use paths::AppDirs;
use simplelog::ColorChoice;
use simplelog::CombinedLogger;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::SharedLogger;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

#[derive(Parser)]
#[command(name = "datagrid")]
#[command(about = "Browse admin collections (leads, customers, vendors, ...) from the terminal")]
#[command(
    after_help = "Environment:\n  DATAGRID_BASE_URL   API base URL (also read from .env)"
)]
struct Cli {
    /// API base URL, e.g. https://admin.example.com/api
    #[arg(long, global = true, env = "DATAGRID_BASE_URL")]
    base_url: Option<String>,
    /// Session database; defaults to the platform data directory
    #[arg(long, global = true)]
    session_db: Option<PathBuf>,
    /// Also write a debug log to the platform cache directory
    #[arg(long, global = true, default_value_t = false)]
    log_file: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token for later requests
    Login {
        #[arg(long)]
        token: String,
        /// Seconds until the token expires
        #[arg(long)]
        expires_in: Option<i64>,
    },
    /// Forget the stored token
    Logout,
    /// Show whether a usable token is stored
    Status,
    /// Print one page of a collection
    List(ListArgs),
}

#[derive(clap::Args)]
struct ListArgs {
    /// leads, customers, vendors, users, invoices, quotations or a raw path
    entity: String,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = 10)]
    page_size: usize,
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, value_enum, default_value_t = OrderCli::Asc)]
    order: OrderCli,
    /// Free-text search
    #[arg(long)]
    query: Option<String>,
    /// Column filter as column=value; repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    /// Status filter; -1 means any
    #[arg(long, allow_hyphen_values = true, default_value = "-1")]
    status: String,
    /// Person type filter (customers and vendors); -1 means any
    #[arg(long, allow_hyphen_values = true, default_value = "-1")]
    person_type: String,
    /// Comma-separated columns to show
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
    /// Print the rows as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Send requests without the stored token
    #[arg(long, default_value_t = false)]
    anonymous: bool,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderCli {
    Asc,
    Desc,
}

impl From<OrderCli> for Direction {
    fn from(order: OrderCli) -> Self {
        match order {
            OrderCli::Asc => Direction::Asc,
            OrderCli::Desc => Direction::Desc,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.is_empty() => {
            Ok((column.to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, got '{}'", raw)),
    }
}

/// Instant `secs` seconds after `now`.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Result<DateTime<Utc>, CliError> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(CliError::InvalidExpiry(secs))
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("--expires-in {0} is out of range")]
    InvalidExpiry(i64),
    #[error("no base URL: pass --base-url or set DATAGRID_BASE_URL")]
    MissingBaseUrl,
    #[error("cannot determine a data directory; pass --session-db")]
    NoDataDir,
    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Lib(#[from] datagrid_lib::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("fetch failed")]
    FetchFailed,
}

fn init_logging(verbose: u8, to_file: bool) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    let mut log_path = None;
    let mut problems = Vec::new();
    if to_file {
        match AppDirs::discover().map(|dirs| dirs.open_log_file()) {
            Some(Ok(log)) => {
                loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), log.file));
                problems = log.problems;
                log_path = Some(log.path);
            }
            Some(Err(e)) => eprintln!("warning: cannot open log file: {}", e),
            None => eprintln!("warning: no cache directory; not writing a log file"),
        }
    }

    let _ = CombinedLogger::init(loggers);

    if let Some(path) = log_path {
        log::info!("writing debug log to {}", path.display());
    }
    for problem in problems {
        log::warn!("{}", problem);
    }
}

async fn open_session(path: Option<PathBuf>) -> Result<Session, CliError> {
    let path = match path {
        Some(path) => path,
        None => AppDirs::discover()
            .map(|dirs| dirs.session_db())
            .ok_or(CliError::NoDataDir)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    log::debug!("session database: {}", path.display());
    Ok(Session::new(SqliteSessionStore::open(&path).await?))
}

async fn list(base_url: String, session: Session, args: ListArgs) -> Result<(), CliError> {
    let Ok(entity) = args.entity.parse::<Entity>();
    let notices = Arc::new(NoticeQueue::new());
    let transport = HttpTransport::builder()
        .timeout(Duration::from_secs(args.timeout))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let builder = TableFetcher::builder()
        .base_url(base_url)
        .entity(entity.clone())
        .transport(transport)
        .notifier(notices.clone());
    let fetcher = if args.anonymous {
        builder.build()?
    } else {
        builder.session(session).build()?
    };

    let config = TableConfig::for_fetcher(&fetcher).with_default_page_size(args.page_size);
    let mut table = TableController::new(config);

    if let Some(column) = args.sort {
        table.set_sort(Some(Sort {
            column,
            direction: args.order.into(),
        }));
    }
    if let Some(query) = args.query {
        table.set_search(query);
    }
    for (column, value) in args.filters {
        table.set_column_filter(column, Some(value));
    }
    for (name, value) in [("status", args.status), ("person_type", args.person_type)] {
        if !entity.supports_filter(name) {
            log::debug!("{} does not filter on {}", entity, name);
            continue;
        }
        table.set_extra_filter(name, value);
    }
    // Filter changes return to the first page.
    let ticket = table.set_page_index(args.page.saturating_sub(1));
    table.execute(ticket, &fetcher).await;

    let mut failed = false;
    for notice in notices.drain() {
        failed |= notice.level == NoticeLevel::Error || notice.level == NoticeLevel::Warning;
        eprintln!("{}", notice.message);
    }
    if failed {
        return Err(CliError::FetchFailed);
    }

    if args.json {
        let rows: Vec<_> = table.rows().iter().map(|r| r.as_map()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    let columns = render::columns(table.page(), &args.columns);
    let rendered = render::table(table.page(), &columns);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    println!(
        "{}",
        render::footer(table.page(), table.query().page_index(), table.query().page_size())
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let session = open_session(cli.session_db).await?;

    match cli.command {
        Commands::Login { token, expires_in } => {
            let token = match expires_in {
                Some(secs) => AccessToken::with_expiry(token, expiry_after(Utc::now(), secs)?),
                None => AccessToken::new(token),
            };
            session.login(token).await?;
            println!("Logged in");
        }
        Commands::Logout => {
            session.logout().await?;
            println!("Logged out");
        }
        Commands::Status => match session.token().await? {
            Some(token) => match token.expires_at {
                Some(at) => println!("Logged in, token expires {}", at.to_rfc3339()),
                None => println!("Logged in"),
            },
            None => println!("Not logged in"),
        },
        Commands::List(args) => {
            let base_url = cli.base_url.ok_or(CliError::MissingBaseUrl)?;
            list(base_url, session, args).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::FetchFailed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
