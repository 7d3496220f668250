use std::error::Error as _;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::future::{Callback, Shared, sender_address};
use crate::{DEFAULT_TIMEOUT, Error, EventBinding, EventFuture, OwnerThread, Result};

/// Configures and creates an [`EventFuture`].
///
/// Obtained via [`EventFuture::builder()`]. The thread that calls [`build()`][Self::build]
/// becomes the owning thread of the future.
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
/// use std::time::Duration;
///
/// use wait_event::EventFuture;
///
/// let page = ManualEventSource::<u32>::new();
///
/// let loaded = EventFuture::<Loaded>::builder(&page)
///     .timeout(Duration::from_secs(5))
///     .on_event(|status| println!("page loaded with status {status}"))
///     .build();
///
/// page.fire(200);
/// assert!(loaded.wait());
/// ```
#[must_use]
pub struct EventFutureBuilder<'s, B>
where
    B: EventBinding,
{
    sender: &'s B::Sender,
    callback: Option<Callback<B>>,
    timeout: Duration,
}

impl<'s, B> EventFutureBuilder<'s, B>
where
    B: EventBinding,
{
    pub(crate) fn new(sender: &'s B::Sender) -> Self {
        Self {
            sender,
            callback: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Invokes `callback` with the payload when the event fires.
    ///
    /// The callback runs on whichever thread the event source delivers the event on,
    /// after the result has been stored in the future and before the owning thread is woken.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(&B::Payload) + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Sets how long [`EventFuture::wait()`] blocks before giving up.
    ///
    /// Defaults to [`DEFAULT_TIMEOUT`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Registers with the event source and returns the future.
    ///
    /// # Panics
    ///
    /// Panics if the event source refuses the registration. This indicates a broken test
    /// setup rather than a condition to recover from. Also panics if the sender is zero-sized.
    #[must_use]
    pub fn build(self) -> EventFuture<'s, B> {
        self.build_checked()
            .unwrap_or_else(|error| match error.source() {
                Some(source) => panic!("{error}: {source}"),
                None => panic!("{error}"),
            })
    }

    /// Registers with the event source and returns the future.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registration`] if the event source refuses the registration.
    ///
    /// # Panics
    ///
    /// Panics if the sender is zero-sized, as its handler could not tell it apart from
    /// other senders.
    pub fn build_checked(self) -> Result<EventFuture<'s, B>> {
        assert!(
            mem::size_of_val(self.sender) != 0,
            "the sender of the '{}' event is zero-sized and cannot be told apart from other senders",
            B::NAME
        );

        let owner = OwnerThread::current();
        let shared = Arc::new(Shared::<B>::new());

        let handler = Shared::handler(&shared, sender_address::<B>(self.sender), self.callback);

        let token = B::register(self.sender, handler).map_err(|source| Error::Registration {
            event: B::NAME,
            source,
        })?;

        debug!(event = B::NAME, timeout = ?self.timeout, "event handler registered");

        shared.complete_registration(self.sender, token);

        Ok(EventFuture::from_parts(
            self.sender,
            shared,
            owner,
            self.timeout,
        ))
    }
}

impl<B> fmt::Debug for EventFutureBuilder<'_, B>
where
    B: EventBinding,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFutureBuilder")
            .field("event", &B::NAME)
            .field("has_callback", &self.callback.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
