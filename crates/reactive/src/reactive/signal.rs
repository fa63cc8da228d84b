use std::fmt::{Debug, Formatter};

use crate::config::ReactorConfig;
use crate::reactive::connection::Subscription;
use crate::reactive::reactor::Reactor;

/// A stream of typed events.
///
/// Cloning a `Signal` creates a new handle to the **same** stream.
pub struct Signal<T> {
    reactor: Reactor<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            reactor: self.reactor.clone(),
        }
    }
}

impl<T> Debug for Signal<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("reactor", &self.reactor)
            .finish()
    }
}

impl<T: Send + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Signal<T> {
    pub fn new() -> Self {
        Self::with_config(ReactorConfig::default())
    }

    pub fn with_config(config: ReactorConfig) -> Self {
        Self {
            reactor: Reactor::with_config(config),
        }
    }

    pub fn connect(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.reactor.add_connection(listener)
    }

    /// Notifies every connected listener, returning once they, and any deferred work they caused, have run.
    pub fn emit(&self, event: T) {
        self.reactor.notify(event);
    }

    pub fn connection_count(&self) -> usize {
        self.reactor.connection_count()
    }
}

/// A signal without any data.
#[derive(Clone, Debug, Default)]
pub struct UnitSignal {
    signal: Signal<()>,
}

impl UnitSignal {
    pub fn new() -> Self {
        Self::with_config(ReactorConfig::default())
    }

    pub fn with_config(config: ReactorConfig) -> Self {
        Self {
            signal: Signal::with_config(config),
        }
    }

    pub fn connect(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.signal.connect(move |_| listener())
    }

    pub fn emit(&self) {
        self.signal.emit(());
    }

    pub fn connection_count(&self) -> usize {
        self.signal.connection_count()
    }
}
