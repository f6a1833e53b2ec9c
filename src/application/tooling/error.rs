use crate::infrastructure::geocode::GeocodeError;
use thiserror::Error;

/// Terminal failure of a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error("invalid input for tool {tool}: {reason}")]
    InvalidInput { tool: String, reason: String },
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Geocode(err) => err.kind(),
            ToolError::InvalidInput { .. } => "invalid_input",
            ToolError::UnknownTool(_) => "unknown_tool",
        }
    }
}
