//! Per-item fan-out with failure isolation.
//!
//! Every input ends up in exactly one of `successful` or `failed`, in input
//! order, no matter how resolutions interleave.

use std::future::Future;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use xhs_core::{BatchResult, FailedItem, ItemError, NoteRecord};

/// One unit of work for [`run_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput<T> {
    /// Label used in failure reports (usually the post URL).
    pub identifier: String,
    /// `None` when the input has no usable identifier; recorded as
    /// [`ItemError::MissingIdentifier`] without calling the resolver.
    pub target: Option<T>,
}

impl<T> BatchInput<T> {
    pub fn new(identifier: impl Into<String>, target: Option<T>) -> Self {
        Self {
            identifier: identifier.into(),
            target,
        }
    }
}

type Slot = Option<Result<NoteRecord, ItemError>>;

/// Resolves every input with at most `concurrency` resolutions in flight.
///
/// Individual failures never stop the batch. Once `cancel` fires, inputs
/// that have not finished are recorded as [`ItemError::Cancelled`].
pub async fn run_batch<T, R, Fut>(
    inputs: Vec<BatchInput<T>>,
    concurrency: usize,
    cancel: &CancellationToken,
    resolve: R,
) -> BatchResult
where
    R: Fn(T) -> Fut,
    Fut: Future<Output = Result<NoteRecord, ItemError>>,
{
    let total = inputs.len();
    let mut slots: Vec<Slot> = (0..total).map(|_| None).collect();
    let mut identifiers = Vec::with_capacity(total);
    let mut pending = Vec::with_capacity(total);

    for (idx, input) in inputs.into_iter().enumerate() {
        identifiers.push(input.identifier);
        match input.target {
            Some(target) => pending.push((idx, target)),
            None => slots[idx] = Some(Err(ItemError::MissingIdentifier)),
        }
    }

    let resolve = &resolve;
    let resolved: Vec<(usize, Result<NoteRecord, ItemError>)> = stream::iter(pending)
        .map(|(idx, target)| async move {
            if cancel.is_cancelled() {
                return (idx, Err(ItemError::Cancelled));
            }
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ItemError::Cancelled),
                result = resolve(target) => result,
            };
            (idx, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for (idx, outcome) in resolved {
        slots[idx] = Some(outcome);
    }

    let mut result = BatchResult {
        total,
        successful: Vec::new(),
        failed: Vec::new(),
    };
    for (identifier, slot) in identifiers.into_iter().zip(slots) {
        match slot.unwrap_or(Err(ItemError::Cancelled)) {
            Ok(record) => result.successful.push(record),
            Err(error) => {
                tracing::warn!(identifier = %identifier, reason = %error, "item failed");
                result.failed.push(FailedItem::new(identifier, error));
            }
        }
    }

    tracing::info!(
        total = result.total,
        succeeded = result.succeeded_count(),
        failed = result.failed_count(),
        "batch complete"
    );
    result
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
