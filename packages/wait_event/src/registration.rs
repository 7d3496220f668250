//! Registration state machine, arbitrating between the handler unregistering itself
//! and the owner of the future unregistering it on drop.
//!
//! The following states exist:
//!
//! * `Registering` - the register call has not returned a token yet.
//! * `Pending` - the handler is registered and has not fired.
//! * `Fired` - the handler fired before the register call returned; whoever completes the
//!   registration owes the event source an unregister call.
//! * `Unregistered` - the token has been handed out for unregistering. Terminal.
//!
//! Every transition happens under one lock and each method hands out the token at most once,
//! so the token reaches the unregister operation at most once no matter how the handler and
//! the owner race.

use std::mem;
use std::sync::Mutex;

use crate::ERR_POISONED_LOCK;

#[derive(Debug)]
enum State<T> {
    Registering,
    Pending(T),
    Fired,
    Unregistered,
}

#[derive(Debug)]
pub(crate) struct Registration<T> {
    state: Mutex<State<T>>,
}

impl<T> Registration<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::Registering),
        }
    }

    /// The register call returned `token`.
    ///
    /// Returns the token back if the handler already fired, in which case the caller
    /// must unregister it immediately.
    pub(crate) fn complete(&self, token: T) -> Option<T> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        match *state {
            State::Registering => {
                *state = State::Pending(token);
                None
            }
            State::Fired => {
                *state = State::Unregistered;
                Some(token)
            }
            State::Pending(_) | State::Unregistered => {
                panic!("registration completed twice")
            }
        }
    }

    /// The handler fired. Returns the token if the handler itself must unregister it.
    pub(crate) fn fire(&self) -> Option<T> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        match mem::replace(&mut *state, State::Unregistered) {
            State::Registering => {
                *state = State::Fired;
                None
            }
            State::Pending(token) => Some(token),
            State::Fired => {
                *state = State::Fired;
                None
            }
            State::Unregistered => None,
        }
    }

    /// The owner no longer wants the registration. Returns the token if it is still registered.
    pub(crate) fn release(&self) -> Option<T> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        match mem::replace(&mut *state, State::Unregistered) {
            State::Pending(token) => Some(token),
            State::Registering | State::Fired | State::Unregistered => None,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(
            *self.state.lock().expect(ERR_POISONED_LOCK),
            State::Pending(_)
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    #[test]
    fn fire_after_complete_hands_out_token() {
        let registration = Registration::new();

        assert_eq!(registration.complete(7), None);
        assert!(registration.is_pending());

        assert_eq!(registration.fire(), Some(7));
        assert!(!registration.is_pending());

        assert_eq!(registration.fire(), None);
        assert_eq!(registration.release(), None);
    }

    #[test]
    fn fire_during_registering_defers_to_complete() {
        let registration = Registration::new();

        assert_eq!(registration.fire(), None);
        assert_eq!(registration.fire(), None);
        assert_eq!(registration.complete(7), Some(7));

        assert_eq!(registration.release(), None);
    }

    #[test]
    fn release_before_fire_hands_out_token() {
        let registration = Registration::new();
        registration.complete(7);

        assert_eq!(registration.release(), Some(7));
        assert_eq!(registration.fire(), None);
        assert_eq!(registration.release(), None);
    }

    #[test]
    fn release_without_registration_is_noop() {
        let registration = Registration::<u32>::new();

        assert_eq!(registration.release(), None);
        assert!(!registration.is_pending());
    }

    #[test]
    #[should_panic(expected = "registration completed twice")]
    fn complete_twice_panics() {
        let registration = Registration::new();
        registration.complete(1);
        registration.complete(2);
    }

    #[test]
    fn racing_fire_and_release_hand_out_token_once() {
        for _ in 0..100 {
            let registration = Arc::new(Registration::new());
            registration.complete(42);

            let handed_out = Arc::new(AtomicUsize::new(0));

            let threads = [
                {
                    let registration = Arc::clone(&registration);
                    let handed_out = Arc::clone(&handed_out);
                    thread::spawn(move || {
                        if registration.fire().is_some() {
                            handed_out.fetch_add(1, Ordering::Relaxed);
                        }
                    })
                },
                {
                    let registration = Arc::clone(&registration);
                    let handed_out = Arc::clone(&handed_out);
                    thread::spawn(move || {
                        if registration.release().is_some() {
                            handed_out.fetch_add(1, Ordering::Relaxed);
                        }
                    })
                },
            ];

            for thread in threads {
                thread.join().unwrap();
            }

            assert_eq!(handed_out.load(Ordering::Relaxed), 1);
        }
    }
}
