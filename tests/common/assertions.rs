//! Assertion utilities for testing.

use reqwest::StatusCode;

/// Assert two colors are equal within `tolerance` per channel
pub fn assert_color_near(actual: [u8; 4], expected: [u8; 4], tolerance: u8) {
    for (channel, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.abs_diff(*e) <= tolerance,
            "Colors differ in channel {}: actual = {:?}, expected = {:?}, tolerance = {}",
            channel,
            actual,
            expected,
            tolerance
        );
    }
}

/// Assert a JSON error body with the expected status
pub fn assert_error_response(
    status: StatusCode,
    body: &serde_json::Value,
    expected_status: StatusCode,
    message_fragment: &str,
) {
    assert_eq!(status, expected_status, "Unexpected status, body: {}", body);

    let message = body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("Missing error message in {}", body));
    assert!(
        message.contains(message_fragment),
        "Error {:?} does not mention {:?}",
        message,
        message_fragment
    );

    let request_id = body["request_id"]
        .as_str()
        .unwrap_or_else(|| panic!("Missing request_id in {}", body));
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}
