//! Observer channel carrying [`Message`]s from the parser to whoever cares.
//!
//! The bus keeps the full history of a parser's messages and fans each new
//! message out synchronously to the registered listeners, in registration
//! order. Listener identity is the `Rc` allocation, so registering the same
//! `Rc` twice is a no-op.

use std::rc::Rc;

use crate::message::Message;

/// Receives messages published on a [`DiagnosticsBus`].
pub trait Listener {
    fn notify(&self, message: &Message) -> anyhow::Result<()>;
}

impl<F> Listener for F
where
    F: Fn(&Message) -> anyhow::Result<()>,
{
    fn notify(&self, message: &Message) -> anyhow::Result<()> {
        self(message)
    }
}

/// Forwards every message to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl Listener for LogListener {
    fn notify(&self, message: &Message) -> anyhow::Result<()> {
        let level = message.severity().log_level();
        if message.data().is_empty() {
            log::log!(level, "{}", message.text());
        } else {
            log::log!(level, "{} {:?}", message.text(), message.data());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct DiagnosticsBus {
    listeners: Vec<Rc<dyn Listener>>,
    history: Vec<Message>,
}

impl DiagnosticsBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the listener was already registered.
    pub fn register(&mut self, listener: Rc<dyn Listener>) -> bool {
        if self.position(&listener).is_some() {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Returns `false` if the listener was not registered.
    pub fn unregister(&mut self, listener: &Rc<dyn Listener>) -> bool {
        match self.position(listener) {
            Some(idx) => {
                self.listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn emit(&mut self, message: Message) {
        for listener in &self.listeners {
            if let Err(e) = listener.notify(&message) {
                log::warn!("Diagnostics listener failed on \"{}\": {e:#}", message.text());
            }
        }
        self.history.push(message);
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn last(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn position(&self, listener: &Rc<dyn Listener>) -> Option<usize> {
        self.listeners
            .iter()
            .position(|l| std::ptr::addr_eq(Rc::as_ptr(l), Rc::as_ptr(listener)))
    }
}

impl std::fmt::Debug for DiagnosticsBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsBus")
            .field("listeners", &self.listeners.len())
            .field("history", &self.history)
            .finish()
    }
}
