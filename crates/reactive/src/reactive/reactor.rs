//! The dispatch engine shared by [`Signal`](super::Signal) and [`Value`](super::Value).
//!
//! A [`Reactor`] owns a priority-ordered list of listener nodes and a FIFO queue of pending runs.
//!
//! Nodes live in a slot-map arena and are chained through their `next` keys, highest priority
//! first. Among equal priorities, nodes keep their insertion order.
//!
//! While a walk is in progress every structural edit (link, unlink, reprioritize) and every
//! further `notify` is queued instead of applied. The thread that owns the walk drains the queue
//! once the walk completes. Listeners are always invoked without the reactor's lock held, so a
//! listener may freely connect, dispose or emit on the reactor that is calling it.
//!
//! Disposing a node clears its listener immediately, even when the unlink itself is deferred,
//! so an in-flight walk never invokes a disposed listener.

use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace, warn};

use crate::config::ReactorConfig;
use crate::error::ConnectionError;
use crate::reactive::connection::Subscription;

new_key_type! {
    pub(crate) struct NodeKey;
}

type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Node<P> {
    /// `None` once disposed.
    listener: Option<Listener<P>>,
    next: Option<NodeKey>,
    priority: i32,
    one_shot: bool,
    linked: bool,
}

impl<P> Node<P> {
    fn is_alive(&self) -> bool {
        self.listener.is_some()
    }
}

enum PendingRun<P> {
    Link(NodeKey),
    Unlink(NodeKey),
    Reprioritize(NodeKey, i32),
    Notify(P),
}

struct ReactorState<P> {
    nodes: SlotMap<NodeKey, Node<P>>,
    head: Option<NodeKey>,
    dispatching: bool,
    pending_runs: VecDeque<PendingRun<P>>,
}

impl<P> ReactorState<P> {
    fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            dispatching: false,
            pending_runs: VecDeque::new(),
        }
    }

    /// Splices the node in before the first node with a strictly lower priority.
    ///
    /// Disposed nodes are released instead of linked.
    fn link(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if node.linked {
            return;
        }
        if !node.is_alive() {
            self.nodes.remove(key);
            return;
        }

        let priority = node.priority;
        let mut previous: Option<NodeKey> = None;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            let current_node = &self.nodes[current];
            if priority > current_node.priority {
                break;
            }
            previous = Some(current);
            cursor = current_node.next;
        }

        let node = &mut self.nodes[key];
        node.next = cursor;
        node.linked = true;

        match previous {
            None => self.head = Some(key),
            Some(previous) => self.nodes[previous].next = Some(key),
        }
    }

    /// Removes the node from the chain, by identity. Disposed nodes are released from the arena.
    fn unlink(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };

        if node.linked {
            node.linked = false;
            let next = node.next.take();

            if self.head == Some(key) {
                self.head = next;
            } else {
                let mut cursor = self.head;
                while let Some(current) = cursor {
                    let current_node = &mut self.nodes[current];
                    if current_node.next == Some(key) {
                        current_node.next = next;
                        break;
                    }
                    cursor = current_node.next;
                }
            }
        }

        if self
            .nodes
            .get(key)
            .is_some_and(|node| !node.is_alive())
        {
            self.nodes.remove(key);
        }
    }

    fn reprioritize(&mut self, key: NodeKey, priority: i32) {
        self.unlink(key);
        if let Some(node) = self.nodes.get_mut(key) {
            node.priority = priority;
            self.link(key);
        }
    }

    /// Returns the released listener, or `None` if the node was already disposed.
    ///
    /// The caller must drop the listener after releasing the lock, its captures may touch this reactor.
    #[must_use]
    fn dispose(&mut self, key: NodeKey) -> Option<Listener<P>> {
        let listener = self.nodes.get_mut(key)?.listener.take()?;

        if self.dispatching {
            self.pending_runs
                .push_back(PendingRun::Unlink(key));
        } else {
            self.unlink(key);
        }
        Some(listener)
    }

    fn alive_node_mut(&mut self, key: NodeKey) -> Result<&mut Node<P>, ConnectionError> {
        self.nodes
            .get_mut(key)
            .filter(|node| node.is_alive())
            .ok_or(ConnectionError::Disposed)
    }

    fn linked_count(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            if node.is_alive() {
                count += 1;
            }
            cursor = node.next;
        }
        count
    }
}

pub(crate) struct ReactorShared<P> {
    state: Mutex<ReactorState<P>>,
    config: ReactorConfig,
}

/// Resets the dispatching flag when a walk ends, including by a panicking listener.
struct DispatchGuard<'a, P> {
    state: &'a Mutex<ReactorState<P>>,
}

impl<P> Drop for DispatchGuard<'_, P> {
    fn drop(&mut self) {
        self.state.lock().dispatching = false;
    }
}

impl<P: Send + 'static> ReactorShared<P> {
    /// Walks the chain from the head, the dispatching flag must already be set by the caller.
    fn dispatch(&self, payload: &P) {
        let _guard = DispatchGuard {
            state: &self.state,
        };

        let mut cursor = self.state.lock().head;
        while let Some(key) = cursor {
            let listener = self
                .state
                .lock()
                .nodes
                .get(key)
                .and_then(|node| node.listener.clone());

            let invoked = match listener {
                Some(listener) => {
                    if self.config.trace_dispatch {
                        trace!("dispatch. invoking listener. node: {:?}", key);
                    }
                    listener(payload);
                    true
                }
                None => false,
            };

            let released = {
                let mut state = self.state.lock();
                let released = if invoked
                    && state
                        .nodes
                        .get(key)
                        .is_some_and(|node| node.one_shot)
                {
                    state.dispose(key)
                } else {
                    None
                };
                cursor = state
                    .nodes
                    .get(key)
                    .and_then(|node| node.next);
                released
            };
            drop(released);
        }
    }

    /// Applies pending runs in FIFO order until the queue is empty.
    ///
    /// If another thread starts a walk in the meantime, the rest of the queue is left to it.
    fn drain(&self) {
        let mut executed: usize = 0;

        loop {
            let payload = {
                let mut state = self.state.lock();
                if state.dispatching {
                    break;
                }
                let Some(run) = state.pending_runs.pop_front() else {
                    break;
                };

                match run {
                    PendingRun::Link(key) => {
                        state.link(key);
                        None
                    }
                    PendingRun::Unlink(key) => {
                        state.unlink(key);
                        None
                    }
                    PendingRun::Reprioritize(key, priority) => {
                        state.reprioritize(key, priority);
                        None
                    }
                    PendingRun::Notify(payload) => {
                        state.dispatching = true;
                        Some(payload)
                    }
                }
            };

            executed += 1;
            if executed == self.config.pending_run_warn_threshold.saturating_add(1) {
                warn!(
                    "drain. pending runs exceeded threshold, a listener may be re-triggering its own reactor. threshold: {}",
                    self.config.pending_run_warn_threshold
                );
            }

            if let Some(payload) = payload {
                self.dispatch(&payload);
            }
        }

        if executed > 0 {
            debug!("drain. completed. executed: {}", executed);
        }
    }
}

/// Operations a [`Subscription`] routes back to the reactor that owns its node.
pub(crate) trait NodeOwner: Send + Sync {
    fn dispose_node(&self, key: NodeKey);
    fn set_one_shot(&self, key: NodeKey) -> Result<(), ConnectionError>;
    fn reprioritize_node(&self, key: NodeKey, priority: i32) -> Result<(), ConnectionError>;
    fn node_priority(&self, key: NodeKey) -> Result<i32, ConnectionError>;
}

impl<P: Send + 'static> NodeOwner for ReactorShared<P> {
    fn dispose_node(&self, key: NodeKey) {
        let released = {
            let mut state = self.state.lock();
            let released = state.dispose(key);
            if released.is_some() {
                trace!("connection disposed. node: {:?}, deferred: {}", key, state.dispatching);
            }
            released
        };
        drop(released);
    }

    fn set_one_shot(&self, key: NodeKey) -> Result<(), ConnectionError> {
        let mut state = self.state.lock();
        state.alive_node_mut(key)?.one_shot = true;
        Ok(())
    }

    fn reprioritize_node(&self, key: NodeKey, priority: i32) -> Result<(), ConnectionError> {
        let mut state = self.state.lock();
        state.alive_node_mut(key)?;

        if state.dispatching {
            trace!("connection reprioritize deferred. node: {:?}, priority: {}", key, priority);
            state
                .pending_runs
                .push_back(PendingRun::Reprioritize(key, priority));
        } else {
            state.reprioritize(key, priority);
        }
        Ok(())
    }

    fn node_priority(&self, key: NodeKey) -> Result<i32, ConnectionError> {
        let mut state = self.state.lock();
        Ok(state.alive_node_mut(key)?.priority)
    }
}

/// A priority-ordered observer registry, generic over the payload delivered to listeners.
///
/// Cloning a `Reactor` creates a new handle to the **same** registry.
pub struct Reactor<P> {
    shared: Arc<ReactorShared<P>>,
}

impl<P> Clone for Reactor<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> Debug for Reactor<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Reactor")
            .field("nodes", &state.nodes.len())
            .field("dispatching", &state.dispatching)
            .field("pending_runs", &state.pending_runs.len())
            .finish()
    }
}

impl<P: Send + 'static> Default for Reactor<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + 'static> Reactor<P> {
    pub fn new() -> Self {
        Self::with_config(ReactorConfig::default())
    }

    pub fn with_config(config: ReactorConfig) -> Self {
        Self {
            shared: Arc::new(ReactorShared {
                state: Mutex::new(ReactorState::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.shared.config
    }

    /// Registers a listener at the default priority of 0.
    ///
    /// If a walk is in progress the insertion is deferred until it completes, so the new listener
    /// never receives the in-flight payload. The returned handle is usable immediately.
    pub fn add_connection(&self, listener: impl Fn(&P) + Send + Sync + 'static) -> Subscription {
        self.add_connection_at(listener, 0)
    }

    pub fn add_connection_at(&self, listener: impl Fn(&P) + Send + Sync + 'static, priority: i32) -> Subscription {
        let key = {
            let mut state = self.shared.state.lock();
            let key = state.nodes.insert(Node {
                listener: Some(Arc::new(listener)),
                next: None,
                priority,
                one_shot: false,
                linked: false,
            });

            if state.dispatching {
                state
                    .pending_runs
                    .push_back(PendingRun::Link(key));
            } else {
                state.link(key);
            }
            trace!("connection added. node: {:?}, priority: {}, deferred: {}", key, priority, state.dispatching);
            key
        };

        let owner = Arc::downgrade(&self.shared);
        let owner: Weak<dyn NodeOwner> = owner;
        Subscription::new(owner, key)
    }

    /// Synchronously invokes every live listener, highest priority first, then drains pending runs.
    ///
    /// Called while a walk is already in progress, the payload is queued as a pending re-notify
    /// and this call returns immediately.
    ///
    /// Runs left over from an interrupted walk (a panicking listener) are drained first.
    pub fn notify(&self, payload: P) {
        {
            let mut state = self.shared.state.lock();
            if state.dispatching {
                trace!("notify deferred, dispatch in progress");
                state
                    .pending_runs
                    .push_back(PendingRun::Notify(payload));
                return;
            }
            if !state.pending_runs.is_empty() {
                debug!("notify. draining leftover runs first. pending: {}", state.pending_runs.len());
                state
                    .pending_runs
                    .push_back(PendingRun::Notify(payload));
                drop(state);
                self.shared.drain();
                return;
            }
            state.dispatching = true;
        }

        self.shared.dispatch(&payload);
        self.shared.drain();
    }

    /// The number of live listeners currently linked into the chain.
    pub fn connection_count(&self) -> usize {
        self.shared.state.lock().linked_count()
    }

    pub fn is_dispatching(&self) -> bool {
        self.shared.state.lock().dispatching
    }
}
