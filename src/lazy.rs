//! Asynchronously initialised, memoised values.

use crate::error::{Error, Result};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

type Factory<T> = Box<dyn Fn(CancellationToken) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// A value produced by an async factory on first use.
///
/// Concurrent callers share a single factory invocation. A failed or
/// cancelled initialisation is not remembered; the next caller runs the
/// factory again.
///
/// ```
/// use hostkit::AsyncLazy;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> hostkit::Result<()> {
/// let lazy = AsyncLazy::new(|_ct| async { Ok(String::from("connection string")) });
/// let value = lazy.get(&CancellationToken::new()).await?;
/// assert_eq!(value, "connection string");
/// # Ok(())
/// # }
/// ```
pub struct AsyncLazy<T> {
    factory: Factory<T>,
    cell: OnceCell<T>,
}

impl<T: Send + Sync + 'static> AsyncLazy<T> {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            factory: Box::new(move |ct| factory(ct).boxed()),
            cell: OnceCell::new(),
        }
    }

    /// Get the value, running the factory if this is the first call.
    ///
    /// Fails with [`Error::Cancelled`] if `ct` is already cancelled, or is
    /// cancelled while waiting for initialisation.
    pub async fn get(&self, ct: &CancellationToken) -> Result<&T> {
        if ct.is_cancelled() {
            return Err(Error::Cancelled("lazy value requested".into()));
        }

        tokio::select! {
            biased;
            _ = ct.cancelled() => Err(Error::Cancelled("lazy value initialisation".into())),
            value = self.cell.get_or_try_init(|| (self.factory)(ct.clone())) => value,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// The value, if it has been initialised.
    pub fn peek(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Drop the current value. The next [`get`](Self::get) runs the factory again.
    pub fn reset(&mut self) -> Option<T> {
        self.cell.take()
    }

    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }
}

impl<T: fmt::Debug> fmt::Debug for AsyncLazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLazy")
            .field("value", &self.cell.get())
            .finish_non_exhaustive()
    }
}
