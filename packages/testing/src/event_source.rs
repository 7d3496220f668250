use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const ERR_POISONED_LOCK: &str = "poisoned lock in ManualEventSource - a handler panicked while \
    the source was being mutated, so its state can no longer be trusted";

/// A handler registered with a [`ManualEventSource`].
///
/// Handlers receive the source that raised the event plus the event payload.
pub type SourceHandler<P> = Arc<dyn Fn(&ManualEventSource<P>, P) + Send + Sync>;

/// Identifies one handler registration on a [`ManualEventSource`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SourceToken(u64);

/// An in-process event source whose events are raised on demand by test code.
///
/// This stands in for a native callback-driven API: handlers are added and removed via
/// tokens and invoked with `(source, payload)` whenever the test calls [`fire()`][Self::fire].
/// The source counts how often it is asked to add and remove handlers so tests can verify
/// registration discipline.
///
/// Handlers are invoked without any internal lock held, so a handler may remove itself
/// from the source while it is being invoked.
pub struct ManualEventSource<P> {
    handlers: Mutex<Vec<(SourceToken, SourceHandler<P>)>>,
    next_token: AtomicU64,

    refusal_status: Mutex<Option<i32>>,
    fire_on_add: Mutex<Option<P>>,

    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl<P> ManualEventSource<P>
where
    P: Clone,
{
    /// Creates a source with no handlers that accepts every registration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(1),
            refusal_status: Mutex::new(None),
            fire_on_add: Mutex::new(None),
            add_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        }
    }

    /// Adds a handler, returning the token that identifies the registration.
    ///
    /// # Errors
    ///
    /// Returns the configured status code if [`refuse_registrations()`][Self::refuse_registrations]
    /// has been called.
    pub fn add_handler(&self, handler: SourceHandler<P>) -> Result<SourceToken, i32> {
        self.add_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(status) = *self.refusal_status.lock().expect(ERR_POISONED_LOCK) {
            return Err(status);
        }

        let token = SourceToken(self.next_token.fetch_add(1, Ordering::Relaxed));

        self.handlers
            .lock()
            .expect(ERR_POISONED_LOCK)
            .push((token, Arc::clone(&handler)));

        // Some native sources raise the event synchronously from within the add call,
        // before the caller has even seen the token.
        let immediate = self.fire_on_add.lock().expect(ERR_POISONED_LOCK).take();

        if let Some(payload) = immediate {
            handler(self, payload);
        }

        Ok(token)
    }

    /// Removes a handler. Returns `false` if the token is not (or no longer) registered.
    pub fn remove_handler(&self, token: SourceToken) -> bool {
        self.remove_calls.fetch_add(1, Ordering::Relaxed);

        let mut handlers = self.handlers.lock().expect(ERR_POISONED_LOCK);
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != token);

        handlers.len() != before
    }

    /// Raises the event, invoking every currently registered handler with a clone of `payload`.
    ///
    /// Returns the number of handlers invoked.
    pub fn fire(&self, payload: P) -> usize {
        self.fire_as(self, payload)
    }

    /// Raises the event on this source's handlers but reports `sender` as the source
    /// that raised it.
    ///
    /// Used to simulate a misbehaving native API that delivers events with the wrong sender.
    pub fn fire_as(&self, sender: &Self, payload: P) -> usize {
        let handlers = self
            .handlers
            .lock()
            .expect(ERR_POISONED_LOCK)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect::<Vec<_>>();

        for handler in &handlers {
            handler(sender, payload.clone());
        }

        handlers.len()
    }

    /// Drops every registered handler without going through `remove_handler()`.
    ///
    /// Simulates an event source that tears down its subscriptions on its own, for example
    /// because the underlying native object was closed.
    pub fn forget_handlers(&self) {
        self.handlers.lock().expect(ERR_POISONED_LOCK).clear();
    }

    /// All future registrations will be refused with the given status code.
    pub fn refuse_registrations(&self, status: i32) {
        *self.refusal_status.lock().expect(ERR_POISONED_LOCK) = Some(status);
    }

    /// The next handler to be added is invoked with `payload` before `add_handler()` returns.
    pub fn fire_on_next_add(&self, payload: P) {
        *self.fire_on_add.lock().expect(ERR_POISONED_LOCK) = Some(payload);
    }

    /// Number of handlers currently registered.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Number of times `add_handler()` has been called, including refused calls.
    #[must_use]
    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::Relaxed)
    }

    /// Number of times `remove_handler()` has been called, including calls for unknown tokens.
    #[must_use]
    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::Relaxed)
    }
}

impl<P> Default for ManualEventSource<P>
where
    P: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for ManualEventSource<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualEventSource")
            .field(
                "handlers",
                &self.handlers.lock().map(|handlers| handlers.len()).ok(),
            )
            .field("add_calls", &self.add_calls.load(Ordering::Relaxed))
            .field("remove_calls", &self.remove_calls.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
