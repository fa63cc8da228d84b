use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

/// An object that can be disposed. Disposing more than once is a no-op.
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

/// A set of disposables that are disposed together.
///
/// Items are held by `Arc`, membership is by identity.
#[derive(Default)]
pub struct DisposableSet {
    disposables: Mutex<Vec<Arc<dyn Disposable>>>,
}

impl DisposableSet {
    /// Creates a new empty set.
    pub fn new() -> Self {
        Self {
            disposables: Mutex::new(Vec::new()),
        }
    }

    /// Adds a disposable to the set. Returns that disposable, for chaining.
    pub fn add<D>(&self, disposable: Arc<D>) -> Arc<D>
    where
        D: Disposable + 'static,
    {
        self.disposables
            .lock()
            .push(disposable.clone());
        disposable
    }

    /// Removes a disposable from the set without disposing it.
    pub fn remove<D>(&self, disposable: &Arc<D>)
    where
        D: Disposable + ?Sized,
    {
        let target = Arc::as_ptr(disposable).cast::<()>();
        self.disposables
            .lock()
            .retain(|item| Arc::as_ptr(item).cast::<()>() != target);
    }

    /// Disposes every item, in the order they were added, and empties the set.
    pub fn clear(&self) {
        // taken out first, so items that touch this set while disposing don't deadlock.
        let disposables = std::mem::take(&mut *self.disposables.lock());
        for disposable in disposables {
            disposable.dispose();
        }
    }

    pub fn len(&self) -> usize {
        self.disposables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposables.lock().is_empty()
    }
}

impl Disposable for DisposableSet {
    fn dispose(&self) {
        self.clear();
    }
}

impl Debug for DisposableSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposableSet")
            .field("len", &self.len())
            .finish()
    }
}

/// A disposable that runs a callback the first time it is disposed, and never again.
pub struct CallbackDisposable {
    callback: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl CallbackDisposable {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            callback: Mutex::new(Some(Box::new(callback))),
        }
    }
}

impl Disposable for CallbackDisposable {
    fn dispose(&self) {
        let callback = self.callback.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Debug for CallbackDisposable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackDisposable")
            .field("disposed", &self.callback.lock().is_none())
            .finish()
    }
}

/// A disposable that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisposable;

impl Disposable for NullDisposable {
    fn dispose(&self) {}
}

/// Creates a disposable from a function, see [`CallbackDisposable`].
pub fn from_fn(callback: impl FnOnce() + Send + 'static) -> CallbackDisposable {
    CallbackDisposable::new(callback)
}
