//! A thread-safe reactive event dispatch system.
//!
//! This crate provides signals and reactive values built on a single dispatch engine, which keeps
//! its observers ordered by priority and can be safely modified while a notification is running.
//!
//! # Key Features
//!
//! - Synchronous fan-out, highest priority first, then in connection order
//! - Listeners may connect, dispose or emit on the same signal from inside a notification
//! - One-shot connections and reprioritization
//! - Change detection with pluggable equality (by value, by identity, by presence)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use reactive::{Connection, Signal};
//!
//! let signal = Signal::<&'static str>::new();
//! let received = Arc::new(Mutex::new(Vec::new()));
//!
//! let received_for_low = received.clone();
//! signal.connect(move |event| received_for_low.lock().push(format!("low {}", event)));
//!
//! let received_for_high = received.clone();
//! signal
//!     .connect(move |event| received_for_high.lock().push(format!("high {}", event)))
//!     .at_prio(1);
//!
//! signal.emit("ping");
//!
//! assert_eq!(*received.lock(), ["high ping", "low ping"]);
//! ```
//!
//! # Concurrency
//!
//! All dispatch is synchronous on the calling thread. Each reactor guards its observer list with
//! its own lock, which is never held while a listener runs. A notify that arrives while another
//! walk of the same reactor is in flight, whether re-entrant or from another thread, is queued and
//! run by the thread that owns the in-flight walk once it completes. Walks of one reactor
//! therefore never overlap and run in FIFO order, but a caller that got queued returns before its
//! payload has been delivered.
//!
//! A listener that always re-emits on its own signal never lets the queue drain. Avoiding that is
//! the caller's responsibility, see [`ReactorConfig::pending_run_warn_threshold`].

pub mod config;
pub mod error;
pub mod reactive;

pub use config::ReactorConfig;
pub use error::ConnectionError;
pub use reactive::{
    BoolValue, ByIdentity, ByPresence, ByValue, CallbackDisposable, Connection, Disposable, DisposableSet,
    DoubleValue, Equality, FloatValue, IntValue, NullDisposable, ObjectValue, OptionalValue, PrimitiveValue,
    Reactor, Signal, Subscription, UnitSignal, Value, ValueView, from_fn,
};
