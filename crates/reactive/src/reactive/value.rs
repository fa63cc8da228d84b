//! Reactive values that notify listeners of `(new, old)` pairs when they change.
//!
//! Whether an assignment counts as a change is decided by an [`Equality`] policy:
//!
//! - [`ByValue`]: `PartialEq`, for primitive and structural data.
//! - [`ByIdentity`]: pointer identity of an `Arc`, for shared objects.
//! - [`ByPresence`]: for optional shared objects. Two `None`s are equal, two `Some`s are equal
//!   only if they point to the same object.
//!
//! Assigning an equal value never notifies.

use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ReactorConfig;
use crate::reactive::connection::Subscription;
use crate::reactive::reactor::Reactor;

/// Decides whether replacing one value with another is a change worth notifying.
pub trait Equality<T>: Send + Sync + 'static {
    fn equal(a: &T, b: &T) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByValue;

impl<T: PartialEq> Equality<T> for ByValue {
    fn equal(a: &T, b: &T) -> bool {
        a == b
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByIdentity;

impl<T: ?Sized> Equality<Arc<T>> for ByIdentity {
    fn equal(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByPresence;

impl<T: ?Sized> Equality<Option<Arc<T>>> for ByPresence {
    fn equal(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Read access to a reactive value, plus change notification.
pub trait ValueView<T: Clone + Send + 'static> {
    /// The current value.
    fn value(&self) -> T;

    /// Connects a listener that receives `(new, old)` on every change.
    ///
    /// The listener is held by a strong reference for as long as it is connected.
    fn connect(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) -> Subscription;

    /// Connects a listener that only receives the new value.
    fn connect_new(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.connect(move |new, _| listener(new))
    }

    /// Connects a listener that is only told that a change happened.
    fn connect_unit(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.connect(move |_, _| listener())
    }

    /// Connects the listener, then immediately calls it once with `(current, current)`.
    ///
    /// The immediate call is a direct invocation, it does not go through the dispatch queue.
    fn connect_notify(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) -> Subscription {
        let listener = Arc::new(listener);
        let connection = {
            let listener = listener.clone();
            self.connect(move |new, old| listener(new, old))
        };
        let current = self.value();
        listener(&current, &current);
        connection
    }

    fn connect_notify_new(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.connect_notify(move |new, _| listener(new))
    }

    fn connect_notify_unit(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.connect_notify(move |_, _| listener())
    }
}

/// A reactive container, parameterized by its equality policy.
///
/// Cloning a `Value` creates a new handle to the **same** value and listeners.
pub struct Value<T, E = ByValue> {
    current: Arc<Mutex<T>>,
    reactor: Reactor<(T, T)>,
    _policy: PhantomData<fn() -> E>,
}

/// A reactive value that stores primitives, compared with `PartialEq`.
pub type PrimitiveValue<T> = Value<T, ByValue>;
/// A reactive value that stores shared objects, compared by identity.
pub type ObjectValue<T> = Value<Arc<T>, ByIdentity>;
/// A reactive value that optionally stores a shared object.
pub type OptionalValue<T> = Value<Option<Arc<T>>, ByPresence>;

pub type IntValue = PrimitiveValue<i64>;
pub type FloatValue = PrimitiveValue<f32>;
pub type DoubleValue = PrimitiveValue<f64>;
pub type BoolValue = PrimitiveValue<bool>;

impl<T, E> Clone for Value<T, E> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            reactor: self.reactor.clone(),
            _policy: PhantomData,
        }
    }
}

impl<T: Debug, E> Debug for Value<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("current", &*self.current.lock())
            .field("reactor", &self.reactor)
            .finish()
    }
}

impl<T, E> Default for Value<T, E>
where
    T: Default + Clone + Send + 'static,
    E: Equality<T>,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T, E> Value<T, E>
where
    T: Clone + Send + 'static,
    E: Equality<T>,
{
    pub fn new(value: T) -> Self {
        Self::with_config(value, ReactorConfig::default())
    }

    pub fn with_config(value: T, config: ReactorConfig) -> Self {
        Self {
            current: Arc::new(Mutex::new(value)),
            reactor: Reactor::with_config(config),
            _policy: PhantomData,
        }
    }

    pub fn get(&self) -> T {
        self.current.lock().clone()
    }

    /// Calls `f` with a reference to the current value, without cloning it.
    ///
    /// `f` must not set this value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.current.lock())
    }

    /// Stores `value` and notifies listeners with `(new, old)`, unless it equals the current value.
    pub fn set(&self, value: T) {
        let old = {
            let mut current = self.current.lock();
            if E::equal(&value, &current) {
                return;
            }
            std::mem::replace(&mut *current, value.clone())
        };

        self.reactor.notify((value, old));
    }

    /// Computes the new value from the current one, then applies it as [`set`](Self::set) does.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let value = self.with(f);
        self.set(value);
    }

    pub fn connection_count(&self) -> usize {
        self.reactor.connection_count()
    }
}

impl<T, E> ValueView<T> for Value<T, E>
where
    T: Clone + Send + 'static,
    E: Equality<T>,
{
    fn value(&self) -> T {
        self.get()
    }

    fn connect(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) -> Subscription {
        self.reactor
            .add_connection(move |(new, old): &(T, T)| listener(new, old))
    }
}
