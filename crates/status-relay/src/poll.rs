//! Bounded waiting on a running pipeline.
//!
//! A pipeline that is still running when the relay starts is looked up again
//! every `interval`, at most `max_attempts` lookups in total. When the budget
//! runs out the last observation is returned as is: a still running pipeline
//! is reported as pending rather than failing the run.

use std::future::Future;

use tracing::{debug, info};

use crate::config::PollPolicy;
use crate::pipeline::Pipeline;
use crate::Result;

/// Look a pipeline up until it leaves the running state or the attempts run out.
///
/// Errors from `lookup` abort immediately. A `max_attempts` of zero still
/// performs one lookup.
pub async fn poll_until_settled<F, Fut>(mut lookup: F, policy: &PollPolicy) -> Result<Pipeline>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Pipeline>>,
{
    let max_attempts = policy.max_attempts.max(1);

    let mut pipeline = lookup().await?;
    let mut attempts = 1;

    while pipeline.status.is_running() && attempts < max_attempts {
        info!(
            event = "relay.poll_wait",
            attempt = attempts,
            max_attempts = max_attempts,
            wait_secs = policy.interval.as_secs(),
            sha = %pipeline.sha,
        );
        tokio::time::sleep(policy.interval).await;

        pipeline = lookup().await?;
        attempts += 1;
    }

    if pipeline.status.is_running() {
        debug!(attempts, "pipeline still running after last attempt");
    }

    Ok(pipeline)
}
