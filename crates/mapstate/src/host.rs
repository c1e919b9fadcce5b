use runtime::InteractivityFlag;
use serde_json::Value;

/// Why the host could not hand out a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("parameter `{0}` is not set")]
    Missing(String),
    #[error("parameter lookup rejected: {0}")]
    Rejected(String),
    #[error("parameter value is malformed: {0}")]
    Malformed(String),
}

/// Capabilities the host application lends to the synchronizer.
///
/// The host also owns the interactivity flag that tells user-driven map moves
/// apart from programmatic ones.
#[allow(async_fn_in_trait)]
pub trait Host: InteractivityFlag {
    /// Looks up a named parameter, e.g. from the URL or a remote source.
    async fn get_parameter(&self, name: &str) -> Result<Value, ParameterError>;

    /// Asks the host to rewrite its link/state from the current map view.
    fn update_link(&self);
}
