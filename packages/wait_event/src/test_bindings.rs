//! Event bindings over `testing::ManualEventSource`, shared by the unit tests.

use testing::{ManualEventSource, SourceToken};

use crate::{EventBinding, Handler, RegistrationRefused};

/// An event carrying a number.
pub(crate) struct Tick;

impl EventBinding for Tick {
    const NAME: &'static str = "Tick";

    type Sender = ManualEventSource<u32>;
    type Payload = u32;
    type Token = SourceToken;

    fn register(
        sender: &Self::Sender,
        handler: Handler<Self>,
    ) -> Result<Self::Token, RegistrationRefused> {
        sender.add_handler(handler).map_err(RegistrationRefused::new)
    }

    fn unregister(sender: &Self::Sender, token: Self::Token) -> bool {
        sender.remove_handler(token)
    }
}

/// An event carrying a heap-allocated payload.
pub(crate) struct Label;

impl EventBinding for Label {
    const NAME: &'static str = "Label";

    type Sender = ManualEventSource<String>;
    type Payload = String;
    type Token = SourceToken;

    fn register(
        sender: &Self::Sender,
        handler: Handler<Self>,
    ) -> Result<Self::Token, RegistrationRefused> {
        sender.add_handler(handler).map_err(RegistrationRefused::new)
    }

    fn unregister(sender: &Self::Sender, token: Self::Token) -> bool {
        sender.remove_handler(token)
    }
}

/// A sender that occupies no memory.
pub(crate) struct Silent;

/// An event raised by a zero-sized sender.
pub(crate) struct Whisper;

impl EventBinding for Whisper {
    const NAME: &'static str = "Whisper";

    type Sender = Silent;
    type Payload = ();
    type Token = ();

    fn register(
        _sender: &Self::Sender,
        _handler: Handler<Self>,
    ) -> Result<Self::Token, RegistrationRefused> {
        Ok(())
    }

    fn unregister(_sender: &Self::Sender, _token: Self::Token) -> bool {
        true
    }
}
