use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Wraps an external call with a deadline, surfacing expiry as
/// `DomainError::Timeout` tagged with the stage name.
pub(crate) async fn bounded<T, F>(limit: Duration, stage: &str, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| DomainError::timeout(format!("{stage} exceeded {limit:?}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expiry_surfaces_timeout_with_stage() {
        let result: Result<(), DomainError> =
            bounded(Duration::from_millis(10), "slow call", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        match result {
            Err(DomainError::Timeout(msg)) => assert!(msg.contains("slow call")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn completed_call_passes_value_through() {
        let result = bounded(Duration::from_secs(1), "fast call", async {
            Ok::<_, DomainError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn inner_error_is_preserved() {
        let result: Result<(), DomainError> =
            bounded(Duration::from_secs(1), "failing call", async {
                Err(DomainError::generation("boom"))
            })
            .await;

        assert!(matches!(result.unwrap_err(), DomainError::Generation(_)));
    }
}
