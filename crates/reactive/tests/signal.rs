use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use reactive::test::{Counter, Recorder, init_tracing};
use reactive::{Connection, Disposable, ReactorConfig, Signal, Subscription, UnitSignal};
use rstest::rstest;

#[test]
fn signal_to_slot() {
    // given
    let signal = Signal::<i32>::new();
    let slot = Recorder::<i32>::new();
    signal.connect(slot.slot());

    // when
    signal.emit(1);
    signal.emit(2);
    signal.emit(3);

    // then
    assert_eq!(slot.events(), [1, 2, 3]);
}

#[test]
fn one_shot_slot() {
    // given
    let signal = Signal::<i32>::new();
    let slot = Recorder::<i32>::new();
    let connection = signal.connect(slot.slot()).once();

    // when
    signal.emit(1);
    signal.emit(2);
    signal.emit(3);

    // then
    assert_eq!(slot.events(), [1]);
    assert!(!connection.is_active());

    // and
    connection.dispose();
    assert_eq!(signal.connection_count(), 0);
}

/// Records the position at which each slot was called.
struct PriorityTestSlot {
    order: Arc<AtomicUsize>,
}

impl PriorityTestSlot {
    fn new() -> Self {
        Self {
            order: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn slot(&self, counter: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static + use<> {
        let counter = counter.clone();
        let order = self.order.clone();
        move || {
            let position = counter.fetch_add(1, Ordering::SeqCst) + 1;
            order.store(position, Ordering::SeqCst);
        }
    }

    fn order(&self) -> usize {
        self.order.load(Ordering::SeqCst)
    }
}

#[test]
fn slot_priority() {
    // given
    let counter = Arc::new(AtomicUsize::new(0));
    let slot1 = PriorityTestSlot::new();
    let slot2 = PriorityTestSlot::new();
    let slot3 = PriorityTestSlot::new();
    let slot4 = PriorityTestSlot::new();

    let signal = UnitSignal::new();
    signal.connect(slot3.slot(&counter)).at_prio(3);
    signal.connect(slot1.slot(&counter)).at_prio(1);
    signal.connect(slot2.slot(&counter)).at_prio(2);
    signal.connect(slot4.slot(&counter)).at_prio(4);

    // when
    signal.emit();

    // then
    // higher priorities are called first
    assert_eq!(slot1.order(), 4);
    assert_eq!(slot2.order(), 3);
    assert_eq!(slot3.order(), 2);
    assert_eq!(slot4.order(), 1);
}

#[rstest]
#[case::all_default(&[0, 0, 0], &[0, 1, 2])]
#[case::reversed(&[1, 2, 3], &[2, 1, 0])]
#[case::ties_after_higher(&[0, 5, 0, 5], &[1, 3, 0, 2])]
fn emission_order(#[case] priorities: &[i32], #[case] expected: &[usize]) {
    // given
    let signal = Signal::<()>::new();
    let slot = Recorder::<usize>::new();
    for (index, priority) in priorities.iter().enumerate() {
        let record = slot.slot();
        signal
            .connect(move |_| record(&index))
            .at_prio(*priority);
    }

    // when
    signal.emit(());

    // then
    assert_eq!(slot.events(), expected);
}

#[test]
fn add_during_dispatch() {
    // given
    let signal = Signal::<i32>::new();
    let to_add = Recorder::<i32>::new();
    {
        let signal_for_listener = signal.clone();
        let to_add = to_add.clone();
        signal
            .connect(move |_| {
                signal_for_listener.connect(to_add.slot());
            })
            .once();
    }

    // when
    // connects the new slot, but does not dispatch to it
    signal.emit(5);

    // then
    assert!(to_add.is_empty());

    // when
    signal.emit(42);

    // then
    assert_eq!(to_add.events(), [42]);
}

#[test]
fn remove_during_dispatch() {
    // given
    let signal = Signal::<i32>::new();
    let to_remove = Recorder::<i32>::new();
    let rconn = signal.connect(to_remove.slot());

    signal.emit(5);
    assert_eq!(to_remove.events(), [5]);

    // dispatched before the slot it removes
    signal
        .connect(move |_| rconn.dispose())
        .at_prio(1);

    // when
    signal.emit(42);

    // then
    assert_eq!(to_remove.events(), [5]);
}

#[test]
fn add_and_remove_during_dispatch() {
    // given
    let signal = Signal::<i32>::new();
    let to_add = Recorder::<i32>::new();
    let to_remove = Recorder::<i32>::new();
    let rconn = signal.connect(to_remove.slot());

    signal.emit(5);
    assert_eq!(to_remove.events(), [5]);

    {
        let signal_for_listener = signal.clone();
        let to_add = to_add.clone();
        signal.connect(move |_| {
            rconn.dispose();
            signal_for_listener.connect(to_add.slot());
        });
    }

    // when
    signal.emit(42);

    // then
    assert_eq!(to_remove.events(), [5, 42]);
    assert!(to_add.is_empty());

    // when
    signal.emit(9);

    // then
    assert_eq!(to_add.events(), [9]);
    assert_eq!(to_remove.events(), [5, 42]);
}

#[test]
fn dispose_self_during_dispatch() {
    // given
    let signal = Signal::<i32>::new();
    let slot = Recorder::<i32>::new();
    let connection: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    {
        let connection_for_listener = connection.clone();
        let record = slot.slot();
        let subscription = signal.connect(move |value| {
            record(value);
            if let Some(connection) = connection_for_listener.lock().as_ref() {
                connection.dispose();
            }
        });
        *connection.lock() = Some(subscription);
    }

    // when
    signal.emit(1);
    signal.emit(2);

    // then
    assert_eq!(slot.events(), [1]);
    assert_eq!(signal.connection_count(), 0);
}

#[test]
fn emit_during_dispatch_is_sequential() {
    // given
    let signal = Signal::<i32>::new();
    let log = Recorder::<String>::new();
    {
        let signal_for_listener = signal.clone();
        let record = log.slot();
        signal
            .connect(move |value| {
                record(&format!("first:{}", value));
                if *value < 3 {
                    signal_for_listener.emit(value + 1);
                }
            })
            .at_prio(1);
    }
    {
        let record = log.slot();
        signal.connect(move |value| record(&format!("second:{}", value)));
    }

    // when
    signal.emit(1);

    // then
    assert_eq!(log.events(), [
        "first:1", "second:1", "first:2", "second:2", "first:3", "second:3"
    ]);
}

#[test]
fn drain_continues_past_warning_threshold() {
    // given
    init_tracing();
    let signal = Signal::<usize>::with_config(ReactorConfig {
        pending_run_warn_threshold: 2,
        trace_dispatch: true,
    });
    let counter = Counter::new();
    {
        let signal_for_listener = signal.clone();
        let trigger = counter.slot();
        signal.connect(move |remaining| {
            trigger();
            if *remaining > 0 {
                signal_for_listener.emit(remaining - 1);
            }
        });
    }

    // when
    signal.emit(10);

    // then
    counter.assert_triggered(11);
}

#[test]
fn connect_count_tracks_live_connections() {
    // given
    let signal = Signal::<i32>::new();
    let first = signal.connect(|_| {});
    let _second = signal.connect(|_| {});

    // when
    first.dispose();

    // then
    assert_eq!(signal.connection_count(), 1);
}
