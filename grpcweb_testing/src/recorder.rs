//! Records the callbacks a stream fires, in order.

use std::{cell::RefCell, rc::Rc};

use grpcweb::{client::ResponseStream, status::Status, transport::Transport};

/// One callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<R> {
    /// `data` fired with a message.
    Data(R),
    /// `status` fired.
    Status(Status),
    /// `error` fired.
    Error(Status),
    /// `end` fired.
    End,
}

/// Ordered log of every event a stream delivered.
#[derive(Debug)]
pub struct EventLog<R> {
    events: Rc<RefCell<Vec<Event<R>>>>,
}

impl<R: 'static> EventLog<R> {
    /// Register recording callbacks for all four events on `stream`.
    pub fn attach<T: Transport>(stream: &mut ResponseStream<T, R>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let data = Rc::clone(&events);
        let status = Rc::clone(&events);
        let error = Rc::clone(&events);
        let end = Rc::clone(&events);
        stream
            .on_data(move |message| data.borrow_mut().push(Event::Data(message)))
            .on_status(move |s| status.borrow_mut().push(Event::Status(s)))
            .on_error(move |s| error.borrow_mut().push(Event::Error(s)))
            .on_end(move || end.borrow_mut().push(Event::End));
        Self { events }
    }

    /// Number of events recorded.
    #[must_use]
    pub fn len(&self) -> usize { self.events.borrow().len() }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.events.borrow().is_empty() }
}

impl<R: Clone> EventLog<R> {
    /// Snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Event<R>> { self.events.borrow().clone() }
}
