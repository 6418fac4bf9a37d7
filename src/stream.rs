use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use futures_core::Stream;

pub(crate) type LocalBoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + 'a>>;

#[derive(Debug, thiserror::Error)]
#[error("Timeout in stream")]
pub(crate) struct TimeoutError;

pub(crate) trait StreamTimeout: Stream {
    // The deadline resets whenever the inner stream produces an item.
    fn timeout(self, duration: Duration) -> Timeout<Self>
    where
        Self: Sized,
    {
        Timeout {
            stream: self,
            duration,
            sleep: None,
            expired: false,
        }
    }
}

impl<S> StreamTimeout for S where S: Stream {}

pin_project_lite::pin_project! {
    pub(crate) struct Timeout<S> {
        #[pin]
        stream: S,

        duration: Duration,

        #[pin]
        sleep: Option<tokio::time::Sleep>,

        expired: bool,
    }
}

impl<S> Stream for Timeout<S>
where
    S: Stream,
{
    type Item = Result<S::Item, TimeoutError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.expired {
            return Poll::Ready(None);
        }

        match this.stream.poll_next(cx) {
            Poll::Ready(Some(item)) => {
                if let Some(sleep) = this.sleep.as_mut().as_pin_mut() {
                    sleep.reset(tokio::time::Instant::now() + *this.duration);
                }

                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => {
                if this.sleep.as_mut().as_pin_mut().is_none() {
                    this.sleep
                        .as_mut()
                        .set(Some(tokio::time::sleep(*this.duration)));
                }

                if let Some(sleep) = this.sleep.as_mut().as_pin_mut() {
                    if sleep.poll(cx).is_ready() {
                        *this.expired = true;
                        return Poll::Ready(Some(Err(TimeoutError)));
                    }
                }

                Poll::Pending
            }
        }
    }
}
