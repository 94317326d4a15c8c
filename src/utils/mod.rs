// Shared tool utilities
mod errors;
mod timeout;

pub use errors::ToolError;
pub use timeout::validate_wait_timeout;
