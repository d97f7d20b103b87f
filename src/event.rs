//! Events published by a [`crate::client::StompClient`].
//!
//! Events are sent on an unbounded channel so the read loop never waits for a
//! slow consumer. Publishing after the receiver has been dropped is a no-op.

use tokio::sync::mpsc;

use crate::message::ChatMessage;

/// Something the session wants its owner to know about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// A chat message arrived on the subscription.
    MessageReceived(ChatMessage),
    /// A lifecycle or diagnostic notice.
    System(String),
}

impl ClientEvent {
    /// Text of a [`ClientEvent::System`] event.
    #[must_use]
    pub fn system_text(&self) -> Option<&str> {
        match self {
            Self::System(text) => Some(text),
            Self::MessageReceived(_) => None,
        }
    }
}

/// Receiving half handed to the client's owner.
pub type EventReceiver = mpsc::UnboundedReceiver<ClientEvent>;

/// Sending half shared by the client and its background tasks.
#[derive(Clone, Debug)]
pub(crate) struct EventSink(mpsc::UnboundedSender<ClientEvent>);

impl EventSink {
    pub(crate) fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    pub(crate) fn system(&self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(event = %text, "system event");
        self.publish(ClientEvent::System(text));
    }

    pub(crate) fn message(&self, message: ChatMessage) {
        self.publish(ClientEvent::MessageReceived(message));
    }

    fn publish(&self, event: ClientEvent) {
        if self.0.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}
