use thiserror::Error;

/// Errors raised while wiring up the agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The orchestrator was misconfigured (e.g. missing required components).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while rendering a report into a document.
///
/// A render failure counts as a delivery failure for that report.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A template failed to compile.
    #[error("template syntax error in '{name}': {message}")]
    Syntax { name: String, message: String },

    /// A template failed while rendering.
    #[error("error rendering '{name}': {message}")]
    Render { name: String, message: String },

    /// Rendered output exceeded the size limit.
    #[error("rendered '{name}' exceeds maximum size of {limit} bytes")]
    TooLarge { name: String, limit: usize },
}
