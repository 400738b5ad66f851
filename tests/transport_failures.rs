//! Completion handling when no trailer frame arrives.

use grpcweb::{
    client::{CallOptions, GrpcWebClientBuilder, MethodDescriptor, ResponseStream},
    config::WireFormat,
    metadata::Metadata,
    status::{Status, StatusCode},
    transport::TransportFailure,
};
use grpcweb_testing::{Event, EventLog, MockHandle, MockTransport, mock_handle, trailer_frame};
use rstest::rstest;

fn start(handle: &MockHandle) -> (ResponseStream<MockTransport, Vec<u8>>, EventLog<Vec<u8>>) {
    let client = GrpcWebClientBuilder::new()
        .format(WireFormat::Binary)
        .build(handle.factory());
    let descriptor = MethodDescriptor::<(), Vec<u8>>::new(
        "test.Service/Call",
        |(): &()| Ok(Vec::new()),
        |payload: &[u8]| Ok(Some(payload.to_vec())),
    );
    let mut stream = client
        .server_streaming(
            "/test.Service/Call",
            &(),
            &Metadata::new(),
            &descriptor,
            CallOptions::default(),
        )
        .expect("call starts");
    let log = EventLog::attach(&mut stream);
    (stream, log)
}

fn single_error(log: &EventLog<Vec<u8>>) -> Status {
    match &log.events()[..] {
        [Event::Error(status)] => status.clone(),
        other => panic!("expected a single error event, got {other:?}"),
    }
}

#[rstest]
#[case::cancelled(TransportFailure::Cancelled, StatusCode::Cancelled)]
#[case::aborted(TransportFailure::Aborted, StatusCode::Aborted)]
#[case::timeout(TransportFailure::Timeout, StatusCode::DeadlineExceeded)]
#[case::network(TransportFailure::Network("connection reset".into()), StatusCode::Unavailable)]
#[case::http_unauthorised(TransportFailure::Http(401), StatusCode::Unauthenticated)]
#[case::http_server_error(TransportFailure::Http(500), StatusCode::Unknown)]
fn failure_without_trailer_maps_to_status(
    mock_handle: MockHandle,
    #[case] failure: TransportFailure,
    #[case] expected: StatusCode,
) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.fail(failure);
    stream.on_transport_complete();

    assert_eq!(single_error(&log).code, expected);
    assert!(stream.is_closed());
}

#[rstest]
#[case::not_found(404, StatusCode::NotFound)]
#[case::unavailable(503, StatusCode::Unavailable)]
#[case::teapot(418, StatusCode::Unknown)]
fn non_success_http_status_maps_to_status(
    mock_handle: MockHandle,
    #[case] http: u16,
    #[case] expected: StatusCode,
) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.set_http_status(Some(http));
    stream.on_transport_complete();

    let status = single_error(&log);
    assert_eq!(status.code, expected);
    assert_eq!(status.details, format!("HTTP status {http}"));
}

#[rstest]
fn trailer_takes_precedence_over_transport_failure(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.push_body(trailer_frame(7, "denied"));
    mock_handle.fail(TransportFailure::Network("late reset".into()));
    stream.on_transport_progress();
    stream.on_transport_complete();

    assert_eq!(
        log.events(),
        vec![
            Event::Status(Status::new(StatusCode::PermissionDenied, "denied")),
            Event::End,
        ]
    );
}

#[rstest]
fn trailer_in_unannounced_bytes_is_read_on_completion(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.push_body(trailer_frame(0, ""));
    stream.on_transport_complete();

    assert_eq!(
        log.events(),
        vec![Event::Status(Status::new(StatusCode::Ok, "")), Event::End]
    );
}

#[rstest]
fn trailers_only_response_reports_header_status(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.set_header("grpc-status", "12");
    mock_handle.set_header("grpc-message", "not here");
    stream.on_transport_complete();

    assert_eq!(
        log.events(),
        vec![
            Event::Status(Status::new(StatusCode::Unimplemented, "not here")),
            Event::End,
        ]
    );
}

#[rstest]
fn trailers_only_header_names_ignore_case(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.set_header("Grpc-Status", "12");
    mock_handle.set_header("Grpc-Message", "not here");
    stream.on_transport_complete();

    assert_eq!(
        log.events(),
        vec![
            Event::Status(Status::new(StatusCode::Unimplemented, "not here")),
            Event::End,
        ]
    );
}

#[rstest]
fn trailers_only_header_beats_http_error(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.set_http_status(Some(404));
    mock_handle.set_header("grpc-status", "5");
    stream.on_transport_complete();

    assert_eq!(
        log.events(),
        vec![
            Event::Status(Status::new(StatusCode::NotFound, "")),
            Event::End,
        ]
    );
}

#[rstest]
fn network_failure_beats_trailers_only_header(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    mock_handle.set_header("grpc-status", "0");
    mock_handle.fail(TransportFailure::Network("dns".into()));
    stream.on_transport_complete();

    assert_eq!(single_error(&log).code, StatusCode::Unavailable);
}

#[rstest]
fn clean_completion_without_trailer_ends(mock_handle: MockHandle) {
    let (mut stream, log) = start(&mock_handle);
    stream.on_transport_complete();
    stream.on_transport_complete();

    assert_eq!(log.events(), vec![Event::End]);
}

#[rstest]
fn refused_send_surfaces_as_client_error(mock_handle: MockHandle) {
    mock_handle.refuse_send("offline");
    let client = GrpcWebClientBuilder::new().build(mock_handle.factory());
    let descriptor = MethodDescriptor::<(), ()>::new(
        "test.Service/Call",
        |(): &()| Ok(Vec::new()),
        |_: &[u8]| Ok(None),
    );
    let err = client
        .server_streaming(
            "/test.Service/Call",
            &(),
            &Metadata::new(),
            &descriptor,
            CallOptions::default(),
        )
        .expect_err("send refused");
    assert_eq!(err.to_string(), "failed to start request: transport rejected request: offline");
}
