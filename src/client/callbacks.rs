//! Callback table for response stream events.
//!
//! Only four events exist, so the table is a struct of optional slots
//! rather than a listener registry. Registering a callback replaces any
//! earlier one for the same event.

use std::fmt;

use crate::status::Status;

/// Invoked with each deserialized response message.
pub type DataCallback<R> = Box<dyn FnMut(R)>;

/// Invoked with the status carried by the trailer, or with the synthesised
/// status of a failed call.
pub type StatusCallback = Box<dyn FnMut(Status)>;

/// Invoked once the stream has ended normally.
pub type EndCallback = Box<dyn FnMut()>;

/// Event names accepted by the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// A response message arrived.
    Data,
    /// The trailer status arrived.
    Status,
    /// The call failed.
    Error,
    /// The stream ended.
    End,
}

pub(crate) struct StreamCallbacks<R> {
    pub(crate) data: Option<DataCallback<R>>,
    pub(crate) status: Option<StatusCallback>,
    pub(crate) error: Option<StatusCallback>,
    pub(crate) end: Option<EndCallback>,
}

impl<R> Default for StreamCallbacks<R> {
    fn default() -> Self {
        Self {
            data: None,
            status: None,
            error: None,
            end: None,
        }
    }
}

impl<R> StreamCallbacks<R> {
    pub(crate) fn is_registered(&self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::Data => self.data.is_some(),
            StreamEvent::Status => self.status.is_some(),
            StreamEvent::Error => self.error.is_some(),
            StreamEvent::End => self.end.is_some(),
        }
    }

    pub(crate) fn clear(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Data => self.data = None,
            StreamEvent::Status => self.status = None,
            StreamEvent::Error => self.error = None,
            StreamEvent::End => self.end = None,
        }
    }
}

impl<R> fmt::Debug for StreamCallbacks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("data", &self.data.is_some())
            .field("status", &self.status.is_some())
            .field("error", &self.error.is_some())
            .field("end", &self.end.is_some())
            .finish()
    }
}
