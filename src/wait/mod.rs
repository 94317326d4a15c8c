//! Text polling for dynamic pages
//!
//! [`TextWaiter`] samples a page's rendered text until a substring appears or
//! the deadline passes. This is what `wait_for` uses before re-snapshotting
//! SPAs that render content after the load event.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::WaitConfig;
use crate::snapshot::SnapshotError;

/// Capability returning the current page's text content
#[async_trait]
pub trait TextSampler: Send + Sync {
    async fn sample_text(&self) -> Result<String, SnapshotError>;
}

#[derive(Error, Debug)]
pub enum WaitError {
    #[error(
        "Timed out after {}ms waiting for text \"{text}\" to appear on the page",
        .elapsed.as_millis()
    )]
    Timeout { text: String, elapsed: Duration },

    #[error("Wait for text \"{text}\" was cancelled")]
    Cancelled { text: String },

    #[error("Failed to read page text: {0}")]
    Sampler(#[from] SnapshotError),
}

/// One wait request
#[derive(Debug, Clone)]
pub struct WaitSpec {
    pub text: String,
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(text: impl Into<String>, timeout: Duration) -> Self {
        Self {
            text: text.into(),
            timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Time from the first sample to the matching one
    pub elapsed: Duration,
    pub samples: u32,
}

/// Polls a [`TextSampler`] with exponential backoff
///
/// # Polling Strategy
/// - Starts at `initial_interval` (50ms by default)
/// - Doubles each retry, capped at `max_interval` (250ms by default)
/// - Never sleeps past the deadline, so one last sample lands on it
#[derive(Debug, Clone)]
pub struct TextWaiter {
    initial_interval: Duration,
    max_interval: Duration,
}

impl Default for TextWaiter {
    fn default() -> Self {
        Self::from_config(&WaitConfig::default())
    }
}

impl TextWaiter {
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            max_interval: max_interval.max(initial_interval),
        }
    }

    pub fn from_config(config: &WaitConfig) -> Self {
        Self::new(config.initial_poll_interval(), config.max_poll_interval())
    }

    /// Wait until `spec.text` is contained in a sample (case-sensitive).
    ///
    /// The deadline is measured from the first sample. A sample still pending
    /// when the deadline passes counts as a timeout. Failed samples are retried;
    /// if the last sample before the deadline failed, that error is returned.
    pub async fn wait_for_text<S>(
        &self,
        sampler: &S,
        spec: &WaitSpec,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, WaitError>
    where
        S: TextSampler + ?Sized,
    {
        let start = Instant::now();
        let deadline = start + spec.timeout;
        let mut poll_interval = self.initial_interval;
        let mut samples = 0u32;
        let mut last_error = None;

        loop {
            let sampled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(spec)),
                sampled = sampler.sample_text() => sampled,
                _ = tokio::time::sleep_until(deadline) => return Err(timed_out(spec, start)),
            };
            samples += 1;

            match sampled {
                Ok(page_text) if page_text.contains(&spec.text) => {
                    let elapsed = start.elapsed();
                    tracing::debug!(
                        text = %spec.text,
                        samples,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Text found on page"
                    );
                    return Ok(WaitOutcome { elapsed, samples });
                }
                Ok(_) => last_error = None,
                // Pages mid-navigation fail evaluation; retry until the deadline
                Err(e) => {
                    tracing::debug!(error = %e, "Page text sample failed, retrying");
                    last_error = Some(e);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(match last_error {
                    Some(e) => WaitError::Sampler(e),
                    None => timed_out(spec, start),
                });
            }

            let pause = poll_interval.min(deadline - now);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(spec)),
                _ = tokio::time::sleep(pause) => {}
            }

            poll_interval = (poll_interval * 2).min(self.max_interval);
        }
    }
}

fn timed_out(spec: &WaitSpec, start: Instant) -> WaitError {
    let elapsed = start.elapsed();
    tracing::warn!(
        text = %spec.text,
        elapsed_ms = elapsed.as_millis() as u64,
        "Timed out waiting for text"
    );
    WaitError::Timeout {
        text: spec.text.clone(),
        elapsed,
    }
}

fn cancelled(spec: &WaitSpec) -> WaitError {
    tracing::info!(text = %spec.text, "Wait for text cancelled");
    WaitError::Cancelled {
        text: spec.text.clone(),
    }
}

/// Wait for `text` using the default polling strategy
pub async fn await_text<S>(
    sampler: &S,
    text: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<WaitOutcome, WaitError>
where
    S: TextSampler + ?Sized,
{
    TextWaiter::default()
        .wait_for_text(sampler, &WaitSpec::new(text, timeout), cancel)
        .await
}
