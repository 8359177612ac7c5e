//! Admin entity collections

use super::IdField;

/// An entity collection exposed by the admin backend.
///
/// Each variant knows the path segment of its collection endpoint, which
/// identifier field its rows carry, and which categorical filters the
/// backend accepts for it.
///
/// # Examples
///
/// ```
/// use datagrid_lib::model::Entity;
///
/// assert_eq!(Entity::Customers.path(), "customers");
/// assert_eq!(Entity::custom("suppliers/archived").path(), "suppliers/archived");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Leads,
    Customers,
    Vendors,
    Users,
    Invoices,
    Quotations,
    /// Any other collection, addressed by its raw path.
    Custom(String),
}

impl Entity {
    /// Creates an entity reference from a raw collection path.
    pub fn custom(path: impl Into<String>) -> Self {
        Self::Custom(path.into())
    }

    /// Returns the collection path relative to the API base URL.
    pub fn path(&self) -> &str {
        match self {
            Self::Leads => "leads",
            Self::Customers => "customers",
            Self::Vendors => "vendors",
            Self::Users => "users",
            Self::Invoices => "invoices",
            Self::Quotations => "quotations",
            Self::Custom(path) => path.trim_matches('/'),
        }
    }

    /// Returns the identifier field rows of this collection carry.
    ///
    /// User records are keyed by `uuid`; everything else by `id`.
    pub fn id_field(&self) -> IdField {
        match self {
            Self::Users => IdField::Uuid,
            _ => IdField::Id,
        }
    }

    /// Returns the extra categorical filters the backend accepts.
    pub fn extra_filters(&self) -> &'static [&'static str] {
        match self {
            Self::Leads => &["status"],
            Self::Customers | Self::Vendors => &["status", "person_type"],
            Self::Invoices | Self::Quotations => &["status"],
            Self::Users | Self::Custom(_) => &[],
        }
    }

    /// Returns `true` if the named extra filter applies to this collection.
    pub fn supports_filter(&self, name: &str) -> bool {
        match self {
            Self::Custom(_) => true,
            _ => self.extra_filters().contains(&name),
        }
    }
}

impl std::str::FromStr for Entity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim_matches('/') {
            "leads" => Self::Leads,
            "customers" => Self::Customers,
            "vendors" => Self::Vendors,
            "users" => Self::Users,
            "invoices" => Self::Invoices,
            "quotations" => Self::Quotations,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
