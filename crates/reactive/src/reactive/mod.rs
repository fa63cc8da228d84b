//! Core reactive system components.
//!
//! This module provides the building blocks for event dispatch:
//!
//! - `Reactor<P>`: The priority-ordered observer registry every other type is built on
//! - `Signal<T>` / `UnitSignal`: Typed event streams
//! - `Value<T, E>`: A container that notifies `(new, old)` pairs when it changes
//! - `Subscription`: The handle returned by every `connect`
//! - `DisposableSet`: Disposes many connections together
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use reactive::{Connection, IntValue, ValueView};
//!
//! let count = IntValue::new(0);
//! let last_old = Arc::new(AtomicI64::new(-1));
//!
//! let last_old_for_listener = last_old.clone();
//! count
//!     .connect(move |_new, old| last_old_for_listener.store(*old, Ordering::SeqCst))
//!     .once();
//!
//! count.set(5);
//! count.set(6);
//!
//! assert_eq!(count.get(), 6);
//! assert_eq!(last_old.load(Ordering::SeqCst), 0);
//! ```

mod connection;
mod disposable;
mod reactor;
mod signal;
mod value;

pub use connection::{Connection, Subscription};
pub use disposable::{CallbackDisposable, Disposable, DisposableSet, NullDisposable, from_fn};
pub use reactor::Reactor;
pub use signal::{Signal, UnitSignal};
pub use value::{
    BoolValue, ByIdentity, ByPresence, ByValue, DoubleValue, Equality, FloatValue, IntValue, ObjectValue,
    OptionalValue, PrimitiveValue, Value, ValueView,
};
