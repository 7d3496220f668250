//! Simplified example demonstrating key `wait_event` types working together.
//!
//! This example shows how to use the main parts of the `wait_event` package:
//! - `EventBinding`: Describes how to subscribe to one kind of event
//! - `EventFuture`: Captures the payload of the next event raised by a sender
//! - `wait_for_event_with()`: Blocks until the event arrives, with a callback
//!
//! Run with: `cargo run --example wait_event_basic`.

use std::thread;
use std::time::Duration;

use testing::{ManualEventSource, SourceToken};
use wait_event::{EventBinding, EventFuture, Handler, RegistrationRefused, wait_for_event_with};

/// Raised when a simulated page has finished loading, carrying the HTTP status.
struct PageLoaded;

impl EventBinding for PageLoaded {
    const NAME: &'static str = "PageLoaded";

    type Sender = ManualEventSource<u16>;
    type Payload = u16;
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

/// Plays the part of a browser that finishes loading the page some time later.
fn load_page_later(page: &ManualEventSource<u16>, status: u16) {
    while page.handler_count() == 0 {
        thread::sleep(Duration::from_millis(1));
    }

    thread::sleep(Duration::from_millis(50));
    page.fire(status);
}

fn main() {
    println!("=== Event Waiting Example ===");
    println!();

    let page = ManualEventSource::<u16>::new();

    // Register first, then trigger the event, then collect the result.
    {
        let loaded = EventFuture::<PageLoaded>::builder(&page)
            .timeout(Duration::from_secs(5))
            .build();
        println!("✓ Registered for PageLoaded (registered: {})", loaded.is_registered());

        page.fire(200);

        let status = loaded.get().unwrap();
        println!("✓ Page loaded with status {status}");
        println!("  Handler still registered: {}", loaded.is_registered());
        println!();
    }

    // Block until another thread raises the event.
    let status = thread::scope(|s| {
        s.spawn(|| load_page_later(&page, 404));

        wait_for_event_with::<PageLoaded, _>(&page, |status| {
            println!("  Callback saw status {status}");
        })
    });
    println!("✓ Page loaded on another thread with status {}", status.unwrap());
    println!();

    // An event that never arrives is reported as an error instead of hanging forever.
    let never = EventFuture::<PageLoaded>::builder(&page)
        .timeout(Duration::from_millis(100))
        .build();

    match never.get() {
        Ok(status) => println!("✗ Unexpected status {status}"),
        Err(error) => println!("✓ {error}"),
    }

    println!();
    println!("Add/remove calls on the page: {}/{}", page.add_calls(), page.remove_calls());
}
