//! Error types

use fos_dom::DomError;

use crate::monitor::MonitorState;

pub type Result<T> = std::result::Result<T, VisibilityError>;

#[derive(Debug, thiserror::Error)]
pub enum VisibilityError {
    /// The host lacks a capability the core cannot work without
    #[error("unsupported environment: no {capability} available")]
    UnsupportedEnvironment { capability: &'static str },

    #[error("cannot {operation} a monitor in state {state:?}")]
    InvalidState { operation: &'static str, state: MonitorState },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl VisibilityError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
