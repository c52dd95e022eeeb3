//! Bounded-concurrency task executor
//!
//! Runs a list of asynchronous task factories with a fixed parallelism
//! ceiling. The first `limit` tasks start immediately; every completion
//! dispatches exactly one pending task, in original submission order.
//! Results land in submission-order slots regardless of completion order.
//!
//! On the first task failure no further pending task is dispatched;
//! already-started tasks are drained to completion, then the run fails
//! with that first error. Results from the drained wave are discarded.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Tag a task future with its original submission index
async fn indexed<Fut: Future>(index: usize, task: Fut) -> (usize, Fut::Output) {
    (index, task.await)
}

/// Run `factories` with at most `limit` tasks in flight.
///
/// `on_complete` fires exactly once per task completion (success or
/// failure), in completion order, with the number of tasks completed so
/// far. An empty input resolves immediately with no callbacks. `limit`
/// is clamped to at least 1.
pub async fn run_bounded<T, E, F, Fut>(
    factories: Vec<F>,
    limit: usize,
    mut on_complete: impl FnMut(usize),
) -> Result<Vec<T>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let total = factories.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let limit = limit.max(1);
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut pending = factories.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();

    for _ in 0..limit {
        match pending.next() {
            Some((index, factory)) => {
                // invoke the factory at dispatch time so dispatch order is
                // observable as the factory invocation order
                in_flight.push(indexed(index, factory()));
            }
            None => break,
        }
    }

    let mut first_failure: Option<E> = None;
    let mut completed = 0;

    while let Some((index, result)) = in_flight.next().await {
        completed += 1;
        match result {
            Ok(value) => slots[index] = Some(value),
            Err(err) => {
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
        on_complete(completed);

        // dispatch the next pending task unless a failure was observed;
        // the current wave still drains either way
        if first_failure.is_none() {
            if let Some((index, factory)) = pending.next() {
                in_flight.push(indexed(index, factory()));
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(slots
            .into_iter()
            .map(|slot| slot.expect("every dispatched task wrote its slot"))
            .collect()),
    }
}
