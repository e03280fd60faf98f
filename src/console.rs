//! Minimal, TUI-safe logging.
//!
//! The step grid owns the terminal while it runs, so engine and loader code
//! never print directly. Messages are published to subscribers (the TUI's
//! output pane, or a test); with nobody listening, warnings and errors fall
//! back to stderr.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub text: String,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);
static SUBSCRIBERS: Lazy<Mutex<Vec<(usize, Sender<LogMessage>)>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// A subscription to console log messages.
///
/// Dropping this value unsubscribes it.
pub struct Subscription {
    id: usize,
    rx: Receiver<LogMessage>,
}

impl Subscription {
    pub fn drain(&self) -> Vec<LogMessage> {
        self.rx.try_iter().collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Ok(mut subs) = SUBSCRIBERS.lock() {
            subs.retain(|(id, _)| *id != self.id);
        }
    }
}

pub fn subscribe() -> Subscription {
    let (tx, rx) = mpsc::channel();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    if let Ok(mut subs) = SUBSCRIBERS.lock() {
        subs.push((id, tx));
    }
    Subscription { id, rx }
}

pub fn info(msg: impl Into<String>) {
    publish(Level::Info, msg.into());
}

pub fn warn(msg: impl Into<String>) {
    publish(Level::Warn, msg.into());
}

pub fn error(msg: impl Into<String>) {
    publish(Level::Error, msg.into());
}

fn publish(level: Level, text: String) {
    let message = LogMessage { level, text };

    let Ok(mut subs) = SUBSCRIBERS.lock() else {
        return;
    };
    if subs.is_empty() {
        match message.level {
            Level::Warn | Level::Error => eprintln!("{}", message.text),
            Level::Info => {}
        }
        return;
    }

    // Broadcast to all subscribers; drop any that have gone away.
    subs.retain(|(_, tx)| tx.send(message.clone()).is_ok());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_receives_every_level() {
        let sub = subscribe();
        info("console-test info");
        warn("console-test warn");
        error("console-test error");

        let mine: Vec<LogMessage> = sub
            .drain()
            .into_iter()
            .filter(|m| m.text.starts_with("console-test"))
            .collect();
        let levels: Vec<Level> = mine.iter().map(|m| m.level).collect();
        assert_eq!(levels, vec![Level::Info, Level::Warn, Level::Error]);
    }

    #[test]
    fn dropped_subscription_stops_receiving() {
        let sub = subscribe();
        drop(sub);
        let other = subscribe();
        warn("console-test after drop");
        assert!(other.drain().iter().any(|m| m.text == "console-test after drop"));
    }
}
