//! Timeout validation for wait operations

use std::time::Duration;

use super::ToolError;
use crate::WaitConfig;

/// Validate timeout for `wait_for`
///
/// # Arguments
/// * `timeout_ms` - Optional timeout in milliseconds
/// * `config` - Supplies the default and the accepted maximum
///
/// # Returns
/// * `Ok(Duration)` - Validated Duration object
/// * `Err(ToolError)` - If timeout exceeds `config.max_timeout_ms`
pub fn validate_wait_timeout(
    timeout_ms: Option<u64>,
    config: &WaitConfig,
) -> Result<Duration, ToolError> {
    let ms = timeout_ms.unwrap_or(config.default_timeout_ms);

    if ms > config.max_timeout_ms {
        return Err(ToolError::invalid_arguments(format!(
            "Timeout cannot exceed {}ms ({} minutes). Received: {}ms ({:.1} minutes)",
            config.max_timeout_ms,
            config.max_timeout_ms / 60_000,
            ms,
            ms as f64 / 60_000.0
        )));
    }

    Ok(Duration::from_millis(ms))
}
