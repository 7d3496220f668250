use std::any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A handler that an [`EventBinding`] hands to its event source.
///
/// The event source invokes it with the object that raised the event and the event payload.
/// It may be invoked from any thread.
pub type Handler<B> = Arc<
    dyn Fn(&<B as EventBinding>::Sender, <B as EventBinding>::Payload) + Send + Sync + 'static,
>;

/// Describes how to subscribe to one kind of asynchronous notification.
///
/// Implement this once per event kind, typically on a unit struct named after the event.
/// The implementation is pure configuration: it names the sender and payload types and
/// forwards registration calls to the event source's own API.
///
/// # Example
///
/// ```rust
/// use testing::{ManualEventSource, SourceToken};
/// use wait_event::{EventBinding, Handler, RegistrationRefused};
///
/// struct DownloadCompleted;
///
/// impl EventBinding for DownloadCompleted {
///     const NAME: &'static str = "DownloadCompleted";
///
///     type Sender = ManualEventSource<String>;
///     type Payload = String;
///     type Token = SourceToken;
///
///     fn register(
///         sender: &Self::Sender,
///         handler: Handler<Self>,
///     ) -> Result<Self::Token, RegistrationRefused> {
///         sender.add_handler(handler).map_err(RegistrationRefused::new)
///     }
///
///     fn unregister(sender: &Self::Sender, token: Self::Token) -> bool {
///         sender.remove_handler(token)
///     }
/// }
/// ```
pub trait EventBinding: 'static {
    /// Human-readable name of the event, used in diagnostics.
    const NAME: &'static str;

    /// The object that raises the event.
    ///
    /// Handlers tell senders apart by address, so the sender must not be a zero-sized value.
    /// Distinct zero-sized values may share an address; creating a future for one panics.
    type Sender: Sync + ?Sized;

    /// The data delivered with the event.
    type Payload: Send + Sync + 'static;

    /// Identifies a handler registration so it can be removed later.
    type Token: Send + 'static;

    /// Registers `handler` with `sender`, returning the token that identifies the registration.
    ///
    /// # Errors
    ///
    /// Returns the status code reported by the event source if it refuses the registration.
    fn register(
        sender: &Self::Sender,
        handler: Handler<Self>,
    ) -> Result<Self::Token, RegistrationRefused>;

    /// Removes the registration identified by `token`.
    ///
    /// Returns `false` if the registration no longer existed. Callers treat that as a no-op,
    /// so implementations must tolerate being given a token that was already removed.
    fn unregister(sender: &Self::Sender, token: Self::Token) -> bool;
}

/// An event source refused to register a handler.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("event source refused the handler registration with status {status:#x}")]
pub struct RegistrationRefused {
    status: i32,
}

impl RegistrationRefused {
    /// Wraps the status code reported by the event source.
    #[must_use]
    pub const fn new(status: i32) -> Self {
        Self { status }
    }

    /// The status code reported by the event source.
    #[must_use]
    pub const fn status(&self) -> i32 {
        self.status
    }
}

/// Static, type-erased description of an [`EventBinding`].
///
/// Descriptors can be collected into an [`EventRegistry`][crate::EventRegistry] to list
/// every event kind a test suite knows how to wait for.
#[derive(Clone, Copy)]
pub struct EventDescriptor {
    name: &'static str,
    sender_type: fn() -> &'static str,
    payload_type: fn() -> &'static str,
}

impl EventDescriptor {
    /// Describes the event kind bound by `B`.
    #[must_use]
    pub const fn of<B>() -> Self
    where
        B: EventBinding,
    {
        Self {
            name: B::NAME,
            sender_type: any::type_name::<B::Sender>,
            payload_type: any::type_name::<B::Payload>,
        }
    }

    /// The event name, as declared by [`EventBinding::NAME`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Type name of the object that raises the event.
    #[must_use]
    pub fn sender_type(&self) -> &'static str {
        (self.sender_type)()
    }

    /// Type name of the data delivered with the event.
    #[must_use]
    pub fn payload_type(&self) -> &'static str {
        (self.payload_type)()
    }
}

impl fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("name", &self.name)
            .field("sender_type", &self.sender_type())
            .field("payload_type", &self.payload_type())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;
    use testing::ManualEventSource;

    use super::*;
    use crate::test_bindings::Tick;

    assert_impl_all!(RegistrationRefused: Send, Sync, Copy);
    assert_impl_all!(EventDescriptor: Send, Sync, Copy);

    #[test]
    fn descriptor_reflects_binding() {
        let descriptor = EventDescriptor::of::<Tick>();

        assert_eq!(descriptor.name(), "Tick");
        assert_eq!(
            descriptor.sender_type(),
            any::type_name::<ManualEventSource<u32>>()
        );
        assert_eq!(descriptor.payload_type(), "u32");
    }

    #[test]
    fn refusal_message_includes_status() {
        // E_OUTOFMEMORY
        let refused = RegistrationRefused::new(-2_147_024_882);

        assert_eq!(refused.status(), -2_147_024_882);
        assert!(refused.to_string().contains("0x8007000e"));
    }
}
