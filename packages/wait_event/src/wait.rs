use crate::{EventBinding, EventFuture, Result};

/// Blocks until `sender` raises the event described by `B`, returning the event payload.
///
/// Registers a handler, waits up to [`DEFAULT_TIMEOUT`][crate::DEFAULT_TIMEOUT] for the event
/// and unregisters the handler again. The event must be triggered by some other party while
/// this call is blocked, typically another thread or the event source's own worker.
///
/// # Errors
///
/// Returns [`Error::TimedOut`][crate::Error::TimedOut] if the event does not fire in time.
///
/// # Panics
///
/// Panics if the event source refuses the registration.
///
/// # Example
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
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// let page = Arc::new(ManualEventSource::<u32>::new());
///
/// let page_clone = Arc::clone(&page);
/// let loader = thread::spawn(move || {
///     // Wait for the handler to be registered before raising the event.
///     while page_clone.handler_count() == 0 {
///         thread::sleep(Duration::from_millis(1));
///     }
///     page_clone.fire(200);
/// });
///
/// let status = wait_event::wait_for_event::<Loaded>(&page).unwrap();
/// assert_eq!(status, 200);
///
/// loader.join().unwrap();
/// ```
pub fn wait_for_event<B>(sender: &B::Sender) -> Result<B::Payload>
where
    B: EventBinding,
    B::Payload: Clone,
{
    EventFuture::<B>::new(sender).into_result()
}

/// Like [`wait_for_event()`] but also invokes `callback` with the payload when the event fires.
///
/// # Errors
///
/// Returns [`Error::TimedOut`][crate::Error::TimedOut] if the event does not fire in time.
///
/// # Panics
///
/// Panics if the event source refuses the registration.
pub fn wait_for_event_with<B, F>(sender: &B::Sender, callback: F) -> Result<B::Payload>
where
    B: EventBinding,
    B::Payload: Clone,
    F: Fn(&B::Payload) + Send + Sync + 'static,
{
    EventFuture::<B>::with_callback(sender, callback).into_result()
}
