#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Turns callback-driven event notifications into bounded blocking waits.
//!
//! Many native APIs report completion of an operation by invoking a registered handler some
//! time later, possibly on a different thread. Test code usually wants the opposite shape:
//! start the operation, then block until it is done and look at the result. This crate bridges
//! the two.
//!
//! The central type is [`EventFuture`], a single-assignment slot that registers a handler for
//! exactly one event, captures the payload of the first notification and removes the handler
//! again. The owning thread can then [`wait()`][EventFuture::wait] for the payload with a
//! bounded timeout, or use [`get()`][EventFuture::get] to receive it as a `Result`.
//!
//! How to subscribe to a particular kind of event is described by implementing
//! [`EventBinding`] once per event kind. [`EventDescriptor`] and [`EventRegistry`] allow
//! collecting the known event kinds into a static catalog.
//!
//! For the common case of "register, wait, return the payload", use [`wait_for_event()`].
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//!
//! use testing::{ManualEventSource, SourceToken};
//! use wait_event::{EventBinding, EventFuture, Handler, RegistrationRefused};
//!
//! struct NavigationCompleted;
//!
//! impl EventBinding for NavigationCompleted {
//!     const NAME: &'static str = "NavigationCompleted";
//!
//!     type Sender = ManualEventSource<bool>;
//!     type Payload = bool;
//!     type Token = SourceToken;
//!
//!     fn register(
//!         sender: &Self::Sender,
//!         handler: Handler<Self>,
//!     ) -> Result<Self::Token, RegistrationRefused> {
//!         sender.add_handler(handler).map_err(RegistrationRefused::new)
//!     }
//!
//!     fn unregister(sender: &Self::Sender, token: Self::Token) -> bool {
//!         sender.remove_handler(token)
//!     }
//! }
//!
//! let web_view = ManualEventSource::<bool>::new();
//! let navigation = EventFuture::<NavigationCompleted>::new(&web_view);
//!
//! thread::scope(|s| {
//!     // Some other party raises the event while we are waiting for it.
//!     s.spawn(|| web_view.fire(true));
//!
//!     assert!(navigation.wait());
//! });
//!
//! assert!(*navigation.get().unwrap());
//! ```
//!
//! # Logging
//!
//! Registration, delivery and teardown of handlers are logged at debug level via the
//! `tracing` crate; timeouts reported by [`EventFuture::get()`] are logged at warning level.
//! This crate never installs a subscriber.

mod binding;
mod builder;
mod constants;
mod error;
mod future;
mod owner_thread;
mod registration;
mod registry;
mod wait;
mod wake_signal;

#[cfg(test)]
mod test_bindings;

pub use binding::*;
pub use builder::*;
pub use constants::DEFAULT_TIMEOUT;
pub(crate) use constants::ERR_POISONED_LOCK;
pub use error::*;
pub use future::EventFuture;
pub use owner_thread::*;
pub use registry::*;
pub use wait::*;
pub use wake_signal::*;
