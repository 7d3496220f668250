use std::slice;

use crate::EventDescriptor;

/// A static catalog of the event kinds a test suite can wait for.
///
/// Assemble it once, next to the [`EventBinding`][crate::EventBinding] implementations:
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
/// use wait_event::{EventDescriptor, EventRegistry};
///
/// static EVENTS: EventRegistry = EventRegistry::new(&[EventDescriptor::of::<Loaded>()]);
///
/// assert!(EVENTS.get("Loaded").is_some());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EventRegistry {
    descriptors: &'static [EventDescriptor],
}

impl EventRegistry {
    /// Creates a registry over a static list of descriptors.
    #[must_use]
    pub const fn new(descriptors: &'static [EventDescriptor]) -> Self {
        Self { descriptors }
    }

    /// Looks up the descriptor of the event with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static EventDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name() == name)
    }

    /// Iterates over all registered descriptors, in declaration order.
    pub fn iter(&self) -> slice::Iter<'static, EventDescriptor> {
        self.descriptors.iter()
    }

    /// Number of registered event kinds.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the registry has no event kinds at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl IntoIterator for EventRegistry {
    type Item = &'static EventDescriptor;
    type IntoIter = slice::Iter<'static, EventDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
