//! # Error Messages
//!
//! Converts stream failures into user-visible text.
//!
//! A component owns a [`MessageChannel`] and guards each of its data streams with
//! [`Stream::catch_into`]. When a guarded stream fails, the failure is reported
//! on the channel and the stream completes quietly instead of erroring, so the
//! rest of the view keeps working.

use crate::action::ActionStream;
use crate::error::StreamError;
use crate::stream::Stream;
use tracing::warn;

/// The user-facing error channel of one component.
#[derive(Clone, Default)]
pub struct MessageChannel {
    messages: ActionStream<String>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `error` and publishes its message.
    pub fn report(&self, error: &StreamError) {
        warn!(%error, "stream failed; reporting to view");
        self.messages.emit(error.to_string());
    }

    /// Every reported message. A late subscriber sees the most recent one.
    pub fn messages(&self) -> Stream<String> {
        self.messages.stream()
    }
}

impl<T: 'static> Stream<T> {
    /// Reports an error to `channel` and completes empty instead of failing.
    pub fn catch_into(&self, channel: &MessageChannel) -> Stream<T> {
        let channel = channel.clone();
        self.catch_error(move |error| {
            channel.report(&error);
            Stream::empty()
        })
    }
}
