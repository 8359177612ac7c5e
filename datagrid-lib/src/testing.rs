//! Test doubles shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::error::ApiError;
use crate::transport::Transport;

/// What the recording transport answers with.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Body(String),
    Status(u16),
}

/// A [`Transport`] that records every request and answers with a fixed reply.
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    reply: Mutex<Reply>,
    calls: Mutex<Vec<(Url, Option<String>)>>,
}

impl RecordingTransport {
    pub(crate) fn body(body: serde_json::Value) -> Self {
        Self::new(Reply::Body(body.to_string()))
    }

    pub(crate) fn status(status: u16) -> Self {
        Self::new(Reply::Status(status))
    }

    pub(crate) fn new(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<(Url, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.clone(), bearer.map(str::to_string)));
        match self.reply.lock().unwrap().clone() {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(ApiError::http(status, "boom")),
        }
    }
}
