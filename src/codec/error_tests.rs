//! Unit tests for codec error types.

use std::io;

use rstest::rstest;

use super::ParseError;

#[test]
fn invalid_tag_display_names_byte_and_position() {
    let err = ParseError::InvalidTag {
        tag: 0x01,
        position: 17,
    };
    assert_eq!(
        err.to_string(),
        "invalid frame tag 0x01 at stream position 17"
    );
}

#[test]
fn frame_too_large_display_names_limit() {
    let err = ParseError::FrameTooLarge {
        length: 2048,
        max: 1024,
        position: 4,
    };
    assert_eq!(
        err.to_string(),
        "frame length 2048 exceeds limit 1024 at stream position 4"
    );
}

#[rstest]
#[case::tag(ParseError::InvalidTag { tag: 7, position: 0 }, "invalid_tag")]
#[case::too_large(
    ParseError::FrameTooLarge { length: 9, max: 8, position: 4 },
    "frame_too_large"
)]
#[case::base64(
    ParseError::InvalidBase64 { position: 0, reason: "bad".into() },
    "invalid_base64"
)]
#[case::truncated(ParseError::Truncated { position: 3 }, "truncated")]
fn error_type_labels(#[case] err: ParseError, #[case] expected: &str) {
    assert_eq!(err.error_type(), expected);
}

#[test]
fn malformed_input_maps_to_invalid_data() {
    let err: io::Error = ParseError::InvalidTag {
        tag: 0x42,
        position: 0,
    }
    .into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn truncation_maps_to_unexpected_eof() {
    let err: io::Error = ParseError::Truncated { position: 3 }.into();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
