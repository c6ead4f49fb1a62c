//! Suspension points of a voice sequence
//!
//! A sequence only ever suspends in one of two places: waiting out the
//! duration of a one-shot clip, or holding a looping clip until someone
//! releases it. Both observe the sequence's cancellation token, and
//! cancellation is polled first so it wins any tie with the timer.

use std::pin::Pin;
use std::time::Duration;
use tokio::sync::futures::Notified;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a timed wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// How a loop hold ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HoldOutcome {
    /// `stop()` ended the loop; the sequence may continue
    Released,
    Cancelled,
}

/// Wait for `duration` of unpaused time, or until cancelled
///
/// Time spent while `paused` reads `true` does not count. A closed pause
/// channel means the voice is gone and is treated as cancellation.
pub(crate) async fn wait_for_clip(
    duration: Duration,
    token: &CancellationToken,
    paused: &mut watch::Receiver<bool>,
) -> WaitOutcome {
    let mut remaining = duration;

    loop {
        if *paused.borrow_and_update() {
            tokio::select! {
                biased;
                _ = token.cancelled() => return WaitOutcome::Cancelled,
                changed = paused.changed() => {
                    if changed.is_err() {
                        return WaitOutcome::Cancelled;
                    }
                }
            }
            continue;
        }

        let started = Instant::now();
        tokio::select! {
            biased;
            _ = token.cancelled() => return WaitOutcome::Cancelled,
            _ = tokio::time::sleep(remaining) => return WaitOutcome::Elapsed,
            changed = paused.changed() => {
                if changed.is_err() {
                    return WaitOutcome::Cancelled;
                }
                remaining = remaining.saturating_sub(started.elapsed());
            }
        }
    }
}

/// Hold a looping clip until released by `stop()` or cancelled
///
/// `released` must be enabled before the clip starts so a stop issued
/// right after `play` is not missed.
pub(crate) async fn hold_loop(
    token: &CancellationToken,
    released: Pin<&mut Notified<'_>>,
) -> HoldOutcome {
    tokio::select! {
        biased;
        _ = token.cancelled() => HoldOutcome::Cancelled,
        _ = released => HoldOutcome::Released,
    }
}
