use std::any;
use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::registration::Registration;
use crate::{
    Error, EventBinding, EventFutureBuilder, Handler, OwnerThread, Result, WakeSignal,
};

/// Callback invoked with the event payload when the event fires.
pub(crate) type Callback<B> = Box<dyn Fn(&<B as EventBinding>::Payload) + Send + Sync + 'static>;

/// State shared between an [`EventFuture`] and the handler it registered.
///
/// The handler may outlive the future (the event source decides when to drop it),
/// so this lives behind an `Arc`.
pub(crate) struct Shared<B>
where
    B: EventBinding,
{
    result: OnceLock<B::Payload>,
    registration: Registration<B::Token>,
    wake: WakeSignal,
}

impl<B> Shared<B>
where
    B: EventBinding,
{
    pub(crate) fn new() -> Self {
        Self {
            result: OnceLock::new(),
            registration: Registration::new(),
            wake: WakeSignal::new(),
        }
    }

    fn store(&self, payload: B::Payload) {
        let Ok(()) = self.result.set(payload) else {
            panic!(
                "EventFuture for the '{}' event can only have its result set once",
                B::NAME
            );
        };
    }

    /// Stores the result and marks the future ready in one step.
    fn deliver(&self, payload: B::Payload) {
        self.store(payload);

        // The signal is sticky, so this also covers a wait that has not started blocking yet.
        self.wake.request_stop();
    }

    /// Whether delivery has completed, including the callback and handler teardown.
    fn is_ready(&self) -> bool {
        self.wake.is_stop_requested()
    }

    /// Creates the single-shot handler to register with the event source.
    ///
    /// `sender_addr` is the address of the sender the handler is registered with.
    /// The handler refuses to accept events from any other sender.
    pub(crate) fn handler(
        this: &Arc<Self>,
        sender_addr: usize,
        callback: Option<Callback<B>>,
    ) -> Handler<B> {
        let shared = Arc::clone(this);

        Arc::new(
            move |notifying_sender: &B::Sender, payload: B::Payload| {
                assert!(
                    sender_address::<B>(notifying_sender) == sender_addr,
                    "handler for the '{}' event was invoked by a different sender than it was registered with",
                    B::NAME
                );

                shared.store(payload);
                debug!(event = B::NAME, "event fired");

                if let (Some(callback), Some(payload)) = (&callback, shared.result.get()) {
                    callback(payload);
                }

                if let Some(token) = shared.registration.fire() {
                    unregister::<B>(notifying_sender, token);
                }

                // Only now may the owner observe the result: the callback's side effects are
                // visible and the handler is no longer registered.
                shared.wake.request_stop();
            },
        )
    }

    /// The register call returned `token`; finishes the registration.
    pub(crate) fn complete_registration(&self, sender: &B::Sender, token: B::Token) {
        if let Some(token) = self.registration.complete(token) {
            // The event fired before we knew the token, so the handler could not remove itself.
            unregister::<B>(sender, token);
        }
    }
}

pub(crate) fn sender_address<B>(sender: &B::Sender) -> usize
where
    B: EventBinding,
{
    ptr::from_ref(sender).cast::<()>().addr()
}

fn unregister<B>(sender: &B::Sender, token: B::Token)
where
    B: EventBinding,
{
    if B::unregister(sender, token) {
        debug!(event = B::NAME, "event handler unregistered");
    } else {
        debug!(
            event = B::NAME,
            "event handler was already unregistered by the event source"
        );
    }
}

/// A single-assignment slot that is filled in by one asynchronous event notification.
///
/// Creating an `EventFuture` registers a handler with the event source described by the
/// [`EventBinding`] `B`. When the event fires, the handler stores the payload in the future,
/// runs the callback (if any), removes itself from the event source and only then wakes up the
/// owning thread.
/// This lets test code turn a callback-driven API into a plain blocking call:
///
/// ```rust
/// # use testing::{ManualEventSource, SourceToken};
/// # use wait_event::{EventBinding, Handler, RegistrationRefused};
/// # struct Loaded;
/// # impl EventBinding for Loaded {
/// #     const NAME: &'static str = "Loaded";
/// #     type Sender = ManualEventSource<u32>;
/// #     type Payload = u32;
/// #     type Token = SourceToken;
/// #     fn register(s: &Self::Sender, h: Handler<Self>) -> Result<SourceToken, RegistrationRefused> {
/// #         s.add_handler(h).map_err(RegistrationRefused::new)
/// #     }
/// #     fn unregister(s: &Self::Sender, t: SourceToken) -> bool {
/// #         s.remove_handler(t)
/// #     }
/// # }
/// use wait_event::EventFuture;
///
/// let page = ManualEventSource::<u32>::new();
///
/// let loaded = EventFuture::<Loaded>::new(&page);
/// page.fire(200);
///
/// assert_eq!(*loaded.get().unwrap(), 200);
/// ```
///
/// # Contract
///
/// The owning thread is the thread that created the future. Only the owning thread may call
/// [`set()`][Self::set], [`wait()`][Self::wait], [`try_get()`][Self::try_get] and
/// [`get()`][Self::get]. The event source may invoke the handler on any thread.
///
/// The following are bugs in the caller and panic:
///
/// * Calling an owner-only method from another thread.
/// * Setting the result more than once, whether via [`set()`][Self::set] or by the event firing
///   again.
/// * Calling [`wait()`][Self::wait] while a wait is already in progress.
/// * The event being raised by a different sender than the one the future was created with.
/// * Dropping a future whose result was never set, unless a wait on it has timed out
///   (in which case the caller has already been told that the event did not arrive).
///
/// Dropping the future removes the handler from the event source if it is still registered.
pub struct EventFuture<'s, B>
where
    B: EventBinding,
{
    sender: &'s B::Sender,
    shared: Arc<Shared<B>>,
    owner: OwnerThread,
    timeout: Duration,

    // Only touched by the owning thread but atomics keep the future `Sync`, so misuse from
    // other threads reaches our thread check instead of being rejected by the compiler.
    waiting: AtomicBool,
    timed_out: AtomicBool,
}

impl<'s, B> EventFuture<'s, B>
where
    B: EventBinding,
{
    /// Registers for the next event raised by `sender`, using the default timeout.
    ///
    /// # Panics
    ///
    /// Panics if the event source refuses the registration. Use
    /// [`builder()`][Self::builder] and [`build_checked()`][EventFutureBuilder::build_checked]
    /// to handle that as an error instead.
    #[must_use]
    pub fn new(sender: &'s B::Sender) -> Self {
        Self::builder(sender).build()
    }

    /// Registers for the next event raised by `sender` and invokes `callback` with the payload
    /// when it arrives.
    ///
    /// The callback runs on whichever thread the event source delivers the event on.
    ///
    /// # Panics
    ///
    /// Panics if the event source refuses the registration.
    #[must_use]
    pub fn with_callback<F>(sender: &'s B::Sender, callback: F) -> Self
    where
        F: Fn(&B::Payload) + Send + Sync + 'static,
    {
        Self::builder(sender).on_event(callback).build()
    }

    /// Starts configuring a future that will register for the next event raised by `sender`.
    #[must_use]
    pub fn builder(sender: &'s B::Sender) -> EventFutureBuilder<'s, B> {
        EventFutureBuilder::new(sender)
    }

    pub(crate) fn from_parts(
        sender: &'s B::Sender,
        shared: Arc<Shared<B>>,
        owner: OwnerThread,
        timeout: Duration,
    ) -> Self {
        Self {
            sender,
            shared,
            owner,
            timeout,
            waiting: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
        }
    }

    /// Stores the result as if the event had fired with `payload`.
    ///
    /// Wakes up the owning thread if it is waiting. The handler stays registered until the
    /// future is dropped.
    ///
    /// # Panics
    ///
    /// Panics if not called on the owning thread or if the result has already been set.
    pub fn set(&self, payload: B::Payload) {
        self.owner.assert_current("EventFuture::set");

        self.shared.deliver(payload);
    }

    /// Waits until the result is set or the timeout elapses, returning whether the result is set.
    ///
    /// Returns immediately if the result is already set.
    ///
    /// # Panics
    ///
    /// Panics if not called on the owning thread or if a wait is already in progress.
    pub fn wait(&self) -> bool {
        self.owner.assert_current("EventFuture::wait");

        assert!(
            !self.waiting.load(Ordering::Relaxed),
            "EventFuture::wait cannot be called while it is already waiting"
        );

        if self.is_ready() {
            return true;
        }

        self.waiting.store(true, Ordering::Relaxed);
        self.shared.wake.block_with_timeout(self.timeout);
        self.waiting.store(false, Ordering::Relaxed);

        let ready = self.is_ready();

        if !ready {
            self.timed_out.store(true, Ordering::Relaxed);
        }

        ready
    }

    /// Waits for the result, returning it if it arrived before the timeout elapsed.
    ///
    /// # Panics
    ///
    /// Panics if not called on the owning thread or if a wait is already in progress.
    #[must_use]
    pub fn try_get(&self) -> Option<&B::Payload> {
        if self.wait() {
            self.shared.result.get()
        } else {
            None
        }
    }

    /// Waits for the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimedOut`] if the event did not fire before the timeout elapsed.
    ///
    /// # Panics
    ///
    /// Panics if not called on the owning thread or if a wait is already in progress.
    pub fn get(&self) -> Result<&B::Payload> {
        self.try_get().ok_or_else(|| {
            warn!(
                event = B::NAME,
                timeout = ?self.timeout,
                payload_type = any::type_name::<B::Payload>(),
                "timed out waiting for event result"
            );

            Error::TimedOut {
                event: B::NAME,
                timeout: self.timeout,
            }
        })
    }

    /// Waits for the result and returns a copy of it, consuming the future.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimedOut`] if the event did not fire before the timeout elapsed.
    ///
    /// # Panics
    ///
    /// Panics if not called on the owning thread.
    pub fn into_result(self) -> Result<B::Payload>
    where
        B::Payload: Clone,
    {
        self.get().cloned()
    }

    /// Whether the result has been set. Never blocks and may be called from any thread.
    ///
    /// When the event fires, the future becomes ready only after the callback (if any) has
    /// returned and the handler has removed itself from the event source.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.shared.is_ready()
    }

    /// How long [`wait()`][Self::wait] blocks before giving up.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the handler is still registered with the event source.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.shared.registration.is_pending()
    }
}

impl<B> Drop for EventFuture<'_, B>
where
    B: EventBinding,
{
    fn drop(&mut self) {
        if let Some(token) = self.shared.registration.release() {
            unregister::<B>(self.sender, token);
        }

        if thread::panicking() {
            return;
        }

        assert!(
            self.shared.result.get().is_some() || self.timed_out.load(Ordering::Relaxed),
            "EventFuture for the '{}' event was dropped without its result ever having been set",
            B::NAME
        );
    }
}

impl<B> fmt::Debug for EventFuture<'_, B>
where
    B: EventBinding,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFuture")
            .field("event", &B::NAME)
            .field("ready", &self.is_ready())
            .field("registered", &self.is_registered())
            .field("owner", &self.owner)
            .field("timeout", &self.timeout)
            .field("waiting", &self.waiting.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
