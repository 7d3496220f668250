use std::time::Duration;

use thiserror::Error;

use crate::RegistrationRefused;

/// Errors that can occur when waiting for an event.
///
/// Contract violations (calls from the wrong thread, setting a result twice and similar)
/// are not represented here - they are programming errors in the caller and panic instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The event did not fire before the wait timeout elapsed.
    #[error("timed out after {timeout:?} waiting for the '{event}' event")]
    TimedOut {
        /// Name of the event that was being waited for.
        event: &'static str,

        /// How long the wait lasted before giving up.
        timeout: Duration,
    },

    /// The event source refused to register the handler.
    #[error("failed to register a handler for the '{event}' event")]
    Registration {
        /// Name of the event whose handler could not be registered.
        event: &'static str,

        /// The refusal reported by the event source.
        #[source]
        source: RegistrationRefused,
    },
}

/// A specialized `Result` type for event wait operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::error::Error as _;
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn timed_out_names_event_and_duration() {
        let error = Error::TimedOut {
            event: "NavigationCompleted",
            timeout: Duration::from_millis(30),
        };

        let message = error.to_string();
        assert!(message.contains("NavigationCompleted"));
        assert!(message.contains("30ms"));
        assert!(error.source().is_none());
    }

    #[test]
    fn registration_exposes_refusal_as_source() {
        let error = Error::Registration {
            event: "NavigationCompleted",
            source: RegistrationRefused::new(-5),
        };

        let source = error
            .source()
            .and_then(|source| source.downcast_ref::<RegistrationRefused>())
            .expect("registration error must carry the refusal");

        assert_eq!(source.status(), -5);
    }
}
