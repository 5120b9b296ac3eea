//! Stream throttling utilities

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Throttle the stream to emit at most once per interval
    ///
    /// Uses "latest-wins" semantics - if multiple items arrive
    /// during an interval, only the latest is emitted.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that throttles emission rate
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        interval: Interval,
        pending: Option<S::Item>,
        upstream_done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    /// Create a new throttled stream
    pub fn new(stream: S, duration: Duration) -> Self {
        let mut interval = interval(duration);
        // Delay rather than burst after a slow consumer
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, pending: None, upstream_done: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain everything available, keeping only the latest
        while !*this.upstream_done {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.pending = Some(item),
                Poll::Ready(None) => *this.upstream_done = true,
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            // Idle upstream keeps the stream alive; only a finished upstream ends it
            return if *this.upstream_done { Poll::Ready(None) } else { Poll::Pending };
        }

        // Hold the latest item until the next tick
        match this.interval.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(this.pending.take()),
            Poll::Pending => Poll::Pending,
        }
    }
}
