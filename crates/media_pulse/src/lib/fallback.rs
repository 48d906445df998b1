//! Ordered fallback over a fixed list of candidates.
//!
//! Candidates are tried strictly one after another. Each attempt reports an
//! [`Outcome`]: `Done` stops with a result, `Skip` moves on to the next
//! candidate, `Abort` stops immediately and surfaces the error.

use std::future::Future;

#[derive(Debug)]
pub enum Outcome<T, E> {
    Done(T),
    /// Soft failure, try the next candidate.
    Skip(E),
    /// Hard failure, stop trying.
    Abort(E),
}

#[derive(Debug)]
pub enum FallbackError<E> {
    /// Every candidate was skipped; holds the skip reasons in candidate order.
    Exhausted(Vec<E>),
    Aborted(E),
}

/// Tries `candidates` in order until one attempt is `Done` or `Abort`.
///
/// Returns the winning candidate alongside its result. No candidate after
/// the winner (or after an abort) is attempted.
pub async fn try_in_order<'a, C, T, E, F, Fut>(
    candidates: &'a [C],
    mut attempt: F,
) -> Result<(&'a C, T), FallbackError<E>>
where
    F: FnMut(&'a C) -> Fut,
    Fut: Future<Output = Outcome<T, E>>,
{
    let mut skipped = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match attempt(candidate).await {
            Outcome::Done(value) => return Ok((candidate, value)),
            Outcome::Skip(err) => skipped.push(err),
            Outcome::Abort(err) => return Err(FallbackError::Aborted(err)),
        }
    }

    Err(FallbackError::Exhausted(skipped))
}
