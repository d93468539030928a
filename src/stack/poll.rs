//! Generic status polling.
//!
//! A fixed-interval poll loop: fetch a status, test it against a predicate,
//! sleep, repeat. The sleep blocks the single thread of control for the full
//! interval; the only exits are the target status, a fetch error, or the
//! optional attempt bound.

use snafu::prelude::*;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Poll-loop settings.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed sleep between status checks.
    pub interval: Duration,
    /// Bound on status checks; `None` polls forever, matching the historical
    /// behavior of the tool this replaces.
    pub max_attempts: Option<u32>,
}

/// Errors from a poll loop.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PollError<E>
where
    E: std::error::Error + 'static,
{
    /// A status check failed.
    #[snafu(display("Status check failed"))]
    Fetch { source: E },

    /// The attempt bound was reached before the predicate held.
    #[snafu(display("Status did not settle after {attempts} checks"))]
    AttemptsExhausted { attempts: u32 },
}

/// Repeatedly fetch a status until `done` accepts it.
///
/// Sleeps `config.interval` between checks but not after the final one, so a
/// status sequence of n checks sleeps n - 1 times. `fetch` is responsible
/// for logging the status it observed.
pub async fn poll_until<S, E, F, Fut, D>(
    mut fetch: F,
    done: D,
    config: &PollConfig,
) -> Result<S, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S, E>>,
    D: Fn(&S) -> bool,
    E: std::error::Error + 'static,
{
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let status = fetch().await.context(FetchSnafu)?;
        if done(&status) {
            return Ok(status);
        }
        if let Some(max) = config.max_attempts {
            ensure!(attempts < max, AttemptsExhaustedSnafu { attempts });
        }
        info!("checking again in {}s", config.interval.as_secs());
        tokio::time::sleep(config.interval).await;
    }
}
