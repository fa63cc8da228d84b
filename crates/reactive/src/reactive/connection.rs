use std::fmt::{Debug, Formatter};
use std::sync::Weak;

use crate::error::ConnectionError;
use crate::reactive::disposable::Disposable;
use crate::reactive::reactor::{NodeKey, NodeOwner};

/// A connection to a signal or value. Dispose the connection to stop getting events.
///
/// Dropping a connection handle does *not* disconnect the listener.
pub trait Connection: Disposable {
    /// Makes the connection close itself after its first notification.
    fn once(self) -> Self
    where
        Self: Sized;

    /// Changes the priority of the connection.
    ///
    /// Connections are notified from highest to lowest priority, the default priority is 0.
    /// Has no effect on a disposed connection.
    fn at_prio(self, priority: i32) -> Self
    where
        Self: Sized;
}

/// The handle to one listener registered with a [`Reactor`](super::Reactor).
///
/// The handle refers to the reactor weakly, it never keeps the reactor alive. Clones refer to the
/// same listener.
#[derive(Clone)]
pub struct Subscription {
    owner: Weak<dyn NodeOwner>,
    key: NodeKey,
}

impl Subscription {
    pub(crate) fn new(owner: Weak<dyn NodeOwner>, key: NodeKey) -> Self {
        Self {
            owner,
            key,
        }
    }

    pub fn try_once(&self) -> Result<(), ConnectionError> {
        self.with_owner(|owner, key| owner.set_one_shot(key))
    }

    pub fn try_at_prio(&self, priority: i32) -> Result<(), ConnectionError> {
        self.with_owner(|owner, key| owner.reprioritize_node(key, priority))
    }

    /// `false` once disposed, either explicitly or after a one-shot notification.
    pub fn is_active(&self) -> bool {
        self.try_priority().is_ok()
    }

    pub fn priority(&self) -> Option<i32> {
        self.try_priority().ok()
    }

    fn try_priority(&self) -> Result<i32, ConnectionError> {
        self.with_owner(|owner, key| owner.node_priority(key))
    }

    fn with_owner<R>(
        &self,
        f: impl FnOnce(&dyn NodeOwner, NodeKey) -> Result<R, ConnectionError>,
    ) -> Result<R, ConnectionError> {
        let owner = self
            .owner
            .upgrade()
            .ok_or(ConnectionError::ReactorDropped)?;
        f(owner.as_ref(), self.key)
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.dispose_node(self.key);
        }
    }
}

impl Connection for Subscription {
    fn once(self) -> Self {
        let _ = self.try_once();
        self
    }

    fn at_prio(self, priority: i32) -> Self {
        let _ = self.try_at_prio(priority);
        self
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("priority", &self.priority())
            .finish()
    }
}
