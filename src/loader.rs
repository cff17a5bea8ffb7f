//! At-most-once initialization of the rendering library.
//!
//! The first caller starts the load; callers arriving while it is in
//! flight await the same shared future, and everyone after that gets the
//! cached handle. A failed load is kept as well, so later callers observe
//! the same failure instead of starting a second load.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::schema::ConvertError;

/// Performs the actual (expensive) initialization of a rendering library.
#[async_trait(?Send)]
pub trait LibraryLoader: 'static {
    type Library: Clone + 'static;

    async fn load(&self) -> Result<Self::Library, ConvertError>;
}

type PendingLoad<T> = Shared<LocalBoxFuture<'static, Result<T, ConvertError>>>;

enum LoadState<T> {
    Idle,
    Loading(PendingLoad<T>),
    Ready(T),
}

/// Lazily initialized, shared handle to a rendering library.
///
/// Cloning is cheap and every clone refers to the same state.
pub struct LazyLibrary<L: LibraryLoader> {
    loader: Rc<L>,
    state: Rc<RefCell<LoadState<L::Library>>>,
}

impl<L: LibraryLoader> Clone for LazyLibrary<L> {
    fn clone(&self) -> Self {
        Self {
            loader: Rc::clone(&self.loader),
            state: Rc::clone(&self.state),
        }
    }
}

impl<L: LibraryLoader> LazyLibrary<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader: Rc::new(loader),
            state: Rc::new(RefCell::new(LoadState::Idle)),
        }
    }

    /// Returns the library handle, loading it on first use.
    pub async fn get(&self) -> Result<L::Library, ConvertError> {
        let pending = match self.ready_or_pending() {
            Ok(library) => return Ok(library),
            Err(pending) => pending,
        };

        let result = pending.await;
        if let Ok(library) = &result {
            *self.state.borrow_mut() = LoadState::Ready(library.clone());
        }
        result
    }

    /// Returns `true` once a handle has been loaded successfully.
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Ready(_))
    }

    fn ready_or_pending(&self) -> Result<L::Library, PendingLoad<L::Library>> {
        let mut state = self.state.borrow_mut();
        let pending = match &*state {
            LoadState::Ready(library) => return Ok(library.clone()),
            LoadState::Loading(pending) => return Err(pending.clone()),
            LoadState::Idle => {
                let loader = Rc::clone(&self.loader);
                async move { loader.load().await }.boxed_local().shared()
            }
        };
        *state = LoadState::Loading(pending.clone());
        Err(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;
    use crate::test_support::yield_now;

    struct CountingLoader {
        loads: Rc<Cell<usize>>,
        fail: bool,
    }

    #[async_trait(?Send)]
    impl LibraryLoader for CountingLoader {
        type Library = Rc<String>;

        async fn load(&self) -> Result<Self::Library, ConvertError> {
            self.loads.set(self.loads.get() + 1);
            yield_now().await;
            if self.fail {
                Err(ConvertError::LibraryLoad("module not found".into()))
            } else {
                Ok(Rc::new(format!("library #{}", self.loads.get())))
            }
        }
    }

    fn lazy(fail: bool) -> (LazyLibrary<CountingLoader>, Rc<Cell<usize>>) {
        let loads = Rc::new(Cell::new(0));
        let lazy = LazyLibrary::new(CountingLoader {
            loads: Rc::clone(&loads),
            fail,
        });
        (lazy, loads)
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let (lazy, loads) = lazy(false);
        let (a, b) = block_on(async { futures::join!(lazy.get(), lazy.get()) });

        assert_eq!(loads.get(), 1);
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Rc::ptr_eq(&a, &b));
        assert!(lazy.is_ready());
    }

    #[test]
    fn test_later_callers_reuse_cached_handle() {
        let (lazy, loads) = lazy(false);
        let first = block_on(lazy.get()).unwrap();
        let second = block_on(lazy.clone().get()).unwrap();

        assert_eq!(loads.get(), 1);
        assert_eq!(*second, "library #1");
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_is_shared_and_kept() {
        let (lazy, loads) = lazy(true);
        let (a, b) = block_on(async { futures::join!(lazy.get(), lazy.get()) });
        let expected = ConvertError::LibraryLoad("module not found".into());
        assert_eq!(a, Err(expected.clone()));
        assert_eq!(b, Err(expected.clone()));

        assert_eq!(block_on(lazy.get()), Err(expected));
        assert_eq!(loads.get(), 1);
        assert!(!lazy.is_ready());
    }

    #[test]
    fn test_nothing_loads_before_first_use() {
        let (lazy, loads) = lazy(false);
        assert_eq!(loads.get(), 0);
        assert!(!lazy.is_ready());
    }
}
