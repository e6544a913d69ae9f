// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Settle-all fan-out.
//!
//! Every concurrent batch in the aggregator runs to completion; successes and
//! failures are collected separately instead of failing fast on the first
//! error.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

use crate::cosmos::ChainClientError;

/// Outcome of a settled batch, each side in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled<T, E> {
    pub succeeded: Vec<T>,
    pub failed: Vec<E>,
}

impl<T, E> Settled<T, E> {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<T, E> Default for Settled<T, E> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Drive all futures concurrently and split their results.
pub async fn settle_all<I, F, T, E>(futures: I) -> Settled<T, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    join_all(futures)
        .await
        .into_iter()
        .fold(Settled::default(), |mut settled, result| {
            match result {
                Ok(value) => settled.succeeded.push(value),
                Err(error) => settled.failed.push(error),
            }
            settled
        })
}

/// Bound a chain query by `limit`; elapsing resolves as a timeout failure.
pub async fn bounded<F, T>(limit: Duration, label: &str, call: F) -> Result<T, ChainClientError>
where
    F: Future<Output = Result<T, ChainClientError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ChainClientError::Timeout(format!(
            "{label} exceeded {}ms",
            limit.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_successes_and_failures_in_order() {
        let settled: Settled<u32, String> = settle_all((0..6u32).map(|i| async move {
            if i % 2 == 0 {
                Ok(i)
            } else {
                Err(format!("odd {i}"))
            }
        }))
        .await;

        assert_eq!(settled.succeeded, vec![0, 2, 4]);
        assert_eq!(settled.failed, vec!["odd 1", "odd 3", "odd 5"]);
        assert!(!settled.is_complete());
    }

    #[tokio::test]
    async fn empty_batch_is_complete() {
        let settled: Settled<(), ()> =
            settle_all(Vec::<std::future::Ready<Result<(), ()>>>::new()).await;
        assert!(settled.is_complete());
        assert!(settled.succeeded.is_empty());
    }

    #[tokio::test]
    async fn bounded_times_out_slow_calls() {
        let result: Result<(), _> = bounded(Duration::from_millis(10), "balances", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ChainClientError::Timeout(msg)) if msg.contains("balances")));
    }

    #[tokio::test]
    async fn bounded_passes_through_results() {
        let ok = bounded(Duration::from_secs(1), "x", async { Ok::<_, ChainClientError>(7) }).await;
        assert_eq!(ok, Ok(7));

        let err = bounded(Duration::from_secs(1), "x", async {
            Err::<(), _>(ChainClientError::MalformedResponse("bad".into()))
        })
        .await;
        assert_eq!(err, Err(ChainClientError::MalformedResponse("bad".into())));
    }
}
