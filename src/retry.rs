//! Fixed-depth retry wrapper for collaborator calls
//!
//! Every outbound call (cloud APIs and persistence) goes through [`retry`]:
//! a bounded number of immediate attempts, intermediate failures logged and
//! swallowed, and the final failure handed back to the caller. Callers decide
//! what exhaustion means for them (500, empty result, or no audio).

use crate::config::RetryConfig;
use crate::error::Result;
use std::future::Future;
use tracing::{error, warn};

/// Retry behaviour for collaborator calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up
///
/// No delay is applied between attempts.
///
/// # Arguments
///
/// * `policy` - Attempt budget
/// * `op_name` - Short label used in log lines (for example `"vision annotate"`)
/// * `op` - Closure producing a fresh future per attempt
///
/// # Errors
///
/// Returns the error of the last attempt when every attempt failed
pub async fn retry<T, F, Fut>(policy: RetryPolicy, op_name: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(
                    "{} attempt {}/{} failed: {}",
                    op_name, attempt, attempts, e
                );
                attempt += 1;
            }
            Err(e) => {
                error!("{} failed after {} attempts: {}", op_name, attempts, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MemoriaError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry(RetryPolicy::default(), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, anyhow::Error>(7)
        })
        .await
        .unwrap();

        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry(RetryPolicy::default(), "test", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(MemoriaError::Collaborator(format!("failure {}", n)).into())
            } else {
                Ok("done")
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let err = retry(RetryPolicy::default(), "test", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<(), _>(MemoriaError::Collaborator(format!("failure {}", n)).into())
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("failure 3"));
    }

    #[tokio::test]
    async fn test_retry_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy { max_attempts: 0 };
        let _ = retry(policy, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(anyhow::anyhow!("boom"))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(RetryConfig { max_attempts: 5 });
        assert_eq!(policy.max_attempts, 5);
    }
}
