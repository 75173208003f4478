use std::cell::RefCell;
use std::collections::VecDeque;

use syncsketch_shared::{ClientMessage, ServerMessage};

/// Outbound half of the connection to the coordinating service. Delivery is
/// best effort; a closed connection drops messages.
pub trait Transport {
    fn send(&self, message: &ClientMessage);
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, message: &ClientMessage) {
        (**self).send(message);
    }
}

/// Queues messages until a driver drains them onto a real connection.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: RefCell<VecDeque<ClientMessage>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<ClientMessage> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Transport for Outbox {
    fn send(&self, message: &ClientMessage) {
        self.queue.borrow_mut().push_back(message.clone());
    }
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

pub fn decode_server_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}
