use std::thread::{self, ThreadId};

/// Remembers which thread created an object so that later calls can be checked against it.
///
/// This is how [`EventFuture`][crate::EventFuture] enforces that only its owning thread may set
/// its result or wait for it. A call from any other thread is a bug in the caller and
/// [`assert_current()`][Self::assert_current] panics when it sees one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OwnerThread {
    id: ThreadId,
}

impl OwnerThread {
    /// Captures the identity of the current thread.
    #[must_use]
    pub fn current() -> Self {
        Self {
            id: thread::current().id(),
        }
    }

    /// The identity of the owning thread.
    #[must_use]
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Whether the caller is running on the owning thread.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.id == thread::current().id()
    }

    /// Panics unless the caller is running on the owning thread.
    ///
    /// `operation` names the call being checked and appears in the panic message.
    ///
    /// # Panics
    ///
    /// Panics if called from a thread other than the one that created this `OwnerThread`.
    #[track_caller]
    pub fn assert_current(&self, operation: &str) {
        assert!(
            self.is_current(),
            "{operation} must be called on the owning thread {:?} but was called on {:?}",
            self.id,
            thread::current().id()
        );
    }
}
