//! Unary calls as single-message streams.
//!
//! A unary response is a stream that carries at most one message. The
//! adapter here wires the stream's four callbacks to one completion callback
//! that receives either the response or the failing [`Status`].

use std::{cell::RefCell, rc::Rc};

use super::response_stream::ResponseStream;
use crate::{
    status::{Status, StatusCode},
    transport::Transport,
};

/// Completion callback for a unary call.
pub type UnaryCallback<R> = Box<dyn FnOnce(Result<R, Status>)>;

struct UnaryState<R> {
    response: Option<R>,
    callback: Option<UnaryCallback<R>>,
}

impl<R> UnaryState<R> {
    fn take_callback(state: &RefCell<Self>) -> Option<UnaryCallback<R>> {
        state.borrow_mut().callback.take()
    }
}

fn complete<R>(state: &RefCell<UnaryState<R>>, result: Result<R, Status>) {
    // Release the borrow before running user code.
    let callback = UnaryState::take_callback(state);
    if let Some(callback) = callback {
        callback(result);
    }
}

/// Route the stream's events into `callback`.
///
/// The first message is kept. A non-OK trailer status or a stream error
/// completes the call with that status; a clean end completes it with the
/// kept message, or `INTERNAL` if none arrived. `callback` runs at most
/// once.
pub(crate) fn attach<T, R>(
    stream: &mut ResponseStream<T, R>,
    callback: impl FnOnce(Result<R, Status>) + 'static,
) where
    T: Transport,
    R: 'static,
{
    let state = Rc::new(RefCell::new(UnaryState {
        response: None,
        callback: Some(Box::new(callback)),
    }));

    let on_data = Rc::clone(&state);
    let on_status = Rc::clone(&state);
    let on_error = Rc::clone(&state);
    let on_end = state;

    stream
        .on_data(move |message| {
            let mut state = on_data.borrow_mut();
            if state.response.is_none() {
                state.response = Some(message);
            } else {
                tracing::debug!("unary call received more than one message");
            }
        })
        .on_status(move |status| {
            if !status.is_ok() {
                complete(&on_status, Err(status));
            }
        })
        .on_error(move |status| complete(&on_error, Err(status)))
        .on_end(move || {
            let response = on_end.borrow_mut().response.take();
            let result = response.ok_or_else(|| {
                Status::new(StatusCode::Internal, "no response message")
            });
            complete(&on_end, result);
        });
}
