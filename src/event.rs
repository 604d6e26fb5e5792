//! Terminal event pump.
//!
//! crossterm's `event::poll` blocks, so it runs on its own thread and
//! forwards events over a tokio channel.  The main loop can then `select!`
//! between keyboard input and store actions without stalling the runtime.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, KeyEvent};
use tokio::sync::mpsc;

/// Terminal events
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize,
    /// Nothing happened for one tick
    Tick,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start the reader thread.  It exits when the handler is dropped.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || loop {
            let event = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(event::Event::Key(key)) => Event::Key(key),
                    Ok(event::Event::Resize(..)) => Event::Resize,
                    Ok(_) => continue,
                    Err(err) => {
                        log::warn!("Failed to read terminal event: {}", err);
                        std::thread::sleep(tick_rate);
                        continue;
                    }
                }
            } else {
                Event::Tick
            };

            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Event channel closed"))
    }
}
