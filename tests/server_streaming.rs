//! Event ordering and chunking behaviour of server-streaming responses.

use grpcweb::{
    client::{CallOptions, GrpcWebClientBuilder, MethodDescriptor, ResponseStream, StreamEvent},
    config::WireFormat,
    metadata::Metadata,
    status::{Status, StatusCode},
};
use grpcweb_testing::{
    Event,
    EventLog,
    MockHandle,
    MockTransport,
    data_frame,
    mock_handle,
    text_body,
    trailer_block,
    trailer_frame,
};
use rstest::rstest;

type Stream = ResponseStream<MockTransport, Vec<u8>>;

fn raw_descriptor() -> MethodDescriptor<(), Vec<u8>> {
    MethodDescriptor::new(
        "test.Feed/Subscribe",
        |(): &()| Ok(Vec::new()),
        |payload: &[u8]| Ok((!payload.is_empty()).then(|| payload.to_vec())),
    )
}

fn start(handle: &MockHandle, format: WireFormat) -> (Stream, EventLog<Vec<u8>>) {
    let client = GrpcWebClientBuilder::new()
        .format(format)
        .build(handle.factory());
    let mut stream = client
        .server_streaming(
            "/test.Feed/Subscribe",
            &(),
            &Metadata::new(),
            &raw_descriptor(),
            CallOptions::default(),
        )
        .expect("call starts");
    let log = EventLog::attach(&mut stream);
    (stream, log)
}

fn ok_status() -> Status { Status::new(StatusCode::Ok, "") }

fn wire_body() -> Vec<u8> {
    let mut body = data_frame(&[1]);
    body.extend(data_frame(&[2, 2]));
    body.extend(data_frame(&[3, 3, 3]));
    body.extend(trailer_frame(0, ""));
    body
}

fn expected_events() -> Vec<Event<Vec<u8>>> {
    vec![
        Event::Data(vec![1]),
        Event::Data(vec![2, 2]),
        Event::Data(vec![3, 3, 3]),
        Event::Status(ok_status()),
        Event::End,
    ]
}

#[rstest]
fn messages_arrive_in_wire_order_then_status_then_end(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(wire_body());
    stream.on_transport_progress();
    stream.on_transport_complete();

    assert_eq!(log.events(), expected_events());
    assert_eq!(stream.frames_received(), 3);
    assert_eq!(stream.status(), Some(&ok_status()));
}

#[rstest]
#[case::single_bytes(1)]
#[case::inside_header(3)]
#[case::straddling_frames(7)]
#[case::large(64)]
fn chunking_does_not_change_events(mock_handle: MockHandle, #[case] chunk: usize) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    for piece in wire_body().chunks(chunk) {
        mock_handle.push_body(piece);
        stream.on_transport_progress();
    }
    stream.on_transport_complete();

    assert_eq!(log.events(), expected_events());
}

#[rstest]
fn progress_without_new_bytes_is_harmless(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    stream.on_transport_progress();
    mock_handle.push_body(data_frame(&[9]));
    stream.on_transport_progress();
    stream.on_transport_progress();

    assert_eq!(log.events(), vec![Event::Data(vec![9])]);
}

#[rstest]
fn empty_messages_are_not_delivered(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(data_frame(&[]));
    mock_handle.push_body(data_frame(&[4]));
    stream.on_transport_progress();

    assert_eq!(log.events(), vec![Event::Data(vec![4])]);
    assert_eq!(stream.frames_received(), 2);
}

#[rstest]
fn text_mode_handles_unaligned_chunks_and_inner_padding(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Text);
    let first = data_frame(&[1]);
    let second = data_frame(&[2, 2]);
    let third = data_frame(&[3, 3, 3]);
    let trailer = trailer_frame(0, "");
    let body = text_body(&[first.as_slice(), second.as_slice(), third.as_slice(), trailer.as_slice()]);
    for piece in body.as_bytes().chunks(3) {
        mock_handle.push_body(piece);
        stream.on_transport_progress();
    }
    stream.on_transport_complete();

    assert_eq!(log.events(), expected_events());
}

#[rstest]
fn json_mode_delivers_whole_body_on_completion(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Json);
    mock_handle.push_body(b"{\"field1\":");
    stream.on_transport_progress();
    mock_handle.push_body(b"\"meow\"}");
    stream.on_transport_progress();
    assert!(log.is_empty());

    stream.on_transport_complete();
    assert_eq!(
        log.events(),
        vec![Event::Data(b"{\"field1\":\"meow\"}".to_vec()), Event::End]
    );
}

#[rstest]
fn trailer_metadata_is_kept_on_the_status(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(trailer_block(&[
        ("grpc-status", "0"),
        ("x-request-id", "first"),
        ("x-request-id", "second"),
    ]));
    stream.on_transport_progress();
    stream.on_transport_complete();

    let events = log.events();
    let Event::Status(status) = &events[0] else {
        panic!("expected status event, got {events:?}");
    };
    let metadata = status.metadata.as_ref().expect("extra trailer keys");
    assert_eq!(metadata.get("x-request-id"), Some("second"));
    assert_eq!(events[1], Event::End);
}

#[rstest]
fn trailer_names_ignore_case(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(trailer_block(&[
        ("Grpc-Status", "7"),
        ("Grpc-Message", "denied"),
        ("X-Request-Id", "abc"),
    ]));
    stream.on_transport_progress();
    stream.on_transport_complete();

    let events = log.events();
    let Event::Status(status) = &events[0] else {
        panic!("expected status event, got {events:?}");
    };
    assert_eq!(status.code, StatusCode::PermissionDenied);
    assert_eq!(status.details, "denied");
    let metadata = status.metadata.as_ref().expect("extra trailer keys");
    assert_eq!(metadata.get("x-request-id"), Some("abc"));
    assert!(!metadata.contains_key("grpc-status"));
}

#[rstest]
fn second_trailer_is_ignored(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(trailer_frame(0, ""));
    mock_handle.push_body(trailer_frame(13, "late"));
    stream.on_transport_progress();
    stream.on_transport_complete();

    assert_eq!(log.events(), vec![Event::Status(ok_status()), Event::End]);
}

#[rstest]
fn malformed_tag_fails_once_and_closes(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(data_frame(&[1]));
    stream.on_transport_progress();
    mock_handle.push_body([0x01_u8, 0x00]);
    stream.on_transport_progress();
    mock_handle.push_body(data_frame(&[2]));
    stream.on_transport_progress();
    stream.on_transport_complete();

    let events = log.events();
    assert_eq!(events.len(), 2, "unexpected events: {events:?}");
    assert_eq!(events[0], Event::Data(vec![1]));
    let Event::Error(status) = &events[1] else {
        panic!("expected error event, got {events:?}");
    };
    assert_eq!(status.code, StatusCode::Internal);
    assert!(status.details.contains("invalid frame tag 0x01"));
    assert!(stream.is_closed());
}

#[rstest]
fn invalid_base64_fails_the_stream(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Text);
    mock_handle.push_body(b"AA!A");
    stream.on_transport_progress();

    let events = log.events();
    assert!(matches!(&events[..], [Event::Error(status)] if status.code == StatusCode::Internal));
}

#[rstest]
fn oversized_frame_fails_the_stream(mock_handle: MockHandle) {
    let client = GrpcWebClientBuilder::new()
        .format(WireFormat::Binary)
        .max_frame_length(4)
        .build(mock_handle.factory());
    let mut stream = client
        .server_streaming(
            "/test.Feed/Subscribe",
            &(),
            &Metadata::new(),
            &raw_descriptor(),
            CallOptions::default(),
        )
        .expect("call starts");
    let log = EventLog::attach(&mut stream);
    mock_handle.push_body(data_frame(&[0; 5]));
    stream.on_transport_progress();

    let events = log.events();
    assert!(matches!(&events[..], [Event::Error(status)] if status.details.contains("exceeds limit")));
}

#[rstest]
fn cancel_aborts_and_silences_the_stream(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    mock_handle.push_body(data_frame(&[1]));
    stream.on_transport_progress();
    stream.cancel();
    stream.cancel();

    mock_handle.push_body(data_frame(&[2]));
    mock_handle.push_body(trailer_frame(0, ""));
    stream.on_transport_progress();
    stream.on_transport_complete();

    assert_eq!(log.events(), vec![Event::Data(vec![1])]);
    assert_eq!(mock_handle.aborts(), 1);
    assert!(!stream.has_listener(StreamEvent::Data));
}

#[rstest]
fn last_registration_wins(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    let replaced = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = std::rc::Rc::clone(&replaced);
    stream.on_data(move |_| counter.set(counter.get() + 1));

    mock_handle.push_body(data_frame(&[1]));
    mock_handle.push_body(data_frame(&[2]));
    stream.on_transport_progress();

    assert_eq!(replaced.get(), 2);
    assert!(log.is_empty());
}

#[rstest]
fn removed_listener_is_not_called(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle, WireFormat::Binary);
    stream.remove_listener(StreamEvent::Status);
    assert!(!stream.has_listener(StreamEvent::Status));
    assert!(stream.has_listener(StreamEvent::End));

    mock_handle.push_body(trailer_frame(0, ""));
    stream.on_transport_progress();
    stream.on_transport_complete();

    assert_eq!(log.events(), vec![Event::End]);
    assert_eq!(stream.status(), Some(&ok_status()));
}

#[rstest]
fn request_carries_protocol_headers(mock_handle: MockHandle) {
    let (_stream, _log) = start(&mock_handle, WireFormat::Text);
    let request = mock_handle.sent().pop().expect("request sent");

    assert_eq!(request.method, "POST");
    assert_eq!(request.headers.get("Accept"), Some("application/grpc-web-text"));
    assert_eq!(request.headers.get("X-Grpc-Web"), Some("1"));
    assert_eq!(
        request.headers.get("X-User-Agent"),
        Some(grpcweb::client::DEFAULT_USER_AGENT)
    );
}
