//! Thread safety tests for `wait_event`.
//!
//! These tests verify the thread confinement rules of `EventFuture`: the owning thread may
//! set and wait, other threads are rejected, while the event source may deliver from anywhere.

use std::thread;
use std::time::Duration;

use static_assertions::assert_impl_all;
use testing::{ManualEventSource, SourceToken, with_watchdog};
use wait_event::{
    Error, EventBinding, EventFuture, Handler, OwnerThread, RegistrationRefused, WakeSignal,
};

struct Progress;

impl EventBinding for Progress {
    const NAME: &'static str = "Progress";

    type Sender = ManualEventSource<u8>;
    type Payload = u8;
    type Token = SourceToken;

    fn register(
        sender: &Self::Sender,
        handler: Handler<Self>,
    ) -> Result<Self::Token, RegistrationRefused> {
        sender.add_handler(handler).map_err(RegistrationRefused::new)
    }

    fn unregister(sender: &Self::Sender, token: Self::Token) -> bool {
        sender.remove_handler(token)
    }
}

assert_impl_all!(EventFuture<'static, Progress>: Send, Sync);
assert_impl_all!(WakeSignal: Send, Sync);
assert_impl_all!(OwnerThread: Send, Sync);
assert_impl_all!(Error: Send, Sync);

#[test]
fn set_from_foreign_thread_is_rejected() {
    let source = ManualEventSource::new();
    let progress = EventFuture::<Progress>::new(&source);

    let outcome = thread::scope(|s| s.spawn(|| progress.set(50)).join());

    assert!(outcome.is_err());
    assert!(!progress.is_ready());

    progress.set(100);
    assert_eq!(*progress.get().unwrap(), 100);
}

#[test]
fn wait_from_foreign_thread_is_rejected() {
    let source = ManualEventSource::new();
    let progress = EventFuture::<Progress>::new(&source);

    let outcome = thread::scope(|s| s.spawn(|| progress.wait()).join());

    assert!(outcome.is_err());

    source.fire(1);
    assert!(progress.wait());
}

#[test]
fn second_waiter_is_rejected_while_owner_waits() {
    with_watchdog(|| {
        let source = ManualEventSource::new();
        let progress = EventFuture::<Progress>::builder(&source)
            .timeout(Duration::from_secs(5))
            .build();

        thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(Duration::from_millis(20));

                // Turned away by the owner check, not by the in-progress wait.
                let intruder = thread::scope(|inner| inner.spawn(|| progress.wait()).join());
                assert!(intruder.is_err());

                source.fire(7);
            });

            assert!(progress.wait());
        });

        assert_eq!(*progress.get().unwrap(), 7);
    });
}

#[test]
fn is_ready_may_be_queried_from_any_thread() {
    let source = ManualEventSource::new();
    let progress = EventFuture::<Progress>::new(&source);

    let before = thread::scope(|s| s.spawn(|| progress.is_ready()).join().unwrap());
    source.fire(3);
    let after = thread::scope(|s| s.spawn(|| progress.is_ready()).join().unwrap());

    assert!(!before);
    assert!(after);
    assert!(progress.wait());
}

#[test]
fn future_can_be_owned_by_worker_thread() {
    with_watchdog(|| {
        let source = ManualEventSource::new();

        thread::scope(|s| {
            let worker = s.spawn(|| {
                let progress = EventFuture::<Progress>::new(&source);
                progress.get().copied()
            });

            while source.handler_count() == 0 {
                thread::sleep(Duration::from_millis(1));
            }
            source.fire(9);

            assert_eq!(worker.join().unwrap().unwrap(), 9);
        });
    });
}
