// Error types for dashboard synchronization
use crate::domain::widget::WidgetId;
use thiserror::Error;

/// Failure of a remote dashboard call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("request payload could not be encoded: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 means the session expired; the login redirect happens elsewhere
    pub fn is_ignorable(&self) -> bool {
        self.status() == Some(401)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("widget {0} is not part of this dashboard")]
    UnknownWidget(WidgetId),

    #[error("persisted widget data carries no id")]
    MissingWidgetId,

    #[error("{context}: {source}")]
    Unrecoverable {
        context: &'static str,
        source: ApiError,
    },
}

impl DashboardError {
    pub fn is_ignorable(&self) -> bool {
        match self {
            DashboardError::Api(e) => e.is_ignorable(),
            _ => false,
        }
    }
}
