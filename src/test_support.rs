//! Helpers shared by the native unit tests.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Yields back to the executor once, waking itself so the executor polls
/// again. Lets concurrent futures interleave under `block_on`.
pub struct YieldNow(bool);

pub fn yield_now() -> YieldNow {
    YieldNow(false)
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
