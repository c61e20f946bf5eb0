use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::task::JoinHandle;

use super::error::ApiError;

/// An in-flight request running on its own task.
///
/// Await it for the result, or call [`cancel`](Self::cancel) to abort the
/// task; a cancelled request resolves to [`ApiError::Cancelled`]. Dropping
/// the handle detaches the task without cancelling it.
#[derive(Debug)]
pub struct CancelableRequest<T> {
    handle: JoinHandle<Result<T, ApiError>>,
}

impl<T: Send + 'static> CancelableRequest<T> {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }
}

impl<T> CancelableRequest<T> {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for CancelableRequest<T> {
    type Output = Result<T, ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(ApiError::Cancelled)),
            Poll::Ready(Err(e)) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn completed_request_yields_its_result() {
        let req = CancelableRequest::spawn(async { Ok::<_, ApiError>(42) });
        assert_eq!(req.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn cancelled_request_yields_cancelled_error() {
        let req = CancelableRequest::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ApiError>(())
        });
        req.cancel();
        assert!(matches!(req.await, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn cancel_after_completion_keeps_result() {
        let req = CancelableRequest::spawn(async { Ok::<_, ApiError>("done") });
        while !req.is_finished() {
            tokio::task::yield_now().await;
        }
        req.cancel();
        assert_eq!(req.await.unwrap(), "done");
    }
}
