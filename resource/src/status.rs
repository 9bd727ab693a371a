//! Human-readable messages for failed requests.

use crate::transport::{TransportError, TransportResponse};

/// Fixed messages for status codes whose reason phrase is not helpful.
#[must_use]
pub const fn status_override(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Unauthorized: authentication is required"),
        403 => Some("Forbidden: you do not have access to this resource"),
        404 => Some("Page/Resource Not Found"),
        409 => Some("Conflict: the resource has changed or already exists"),
        _ => None,
    }
}

/// Message for a non-success response.
///
/// Priority: non-empty body text, then the override table, then the
/// response's reason phrase, then a generic message with the status code.
#[must_use]
pub fn failure_message(response: &TransportResponse) -> String {
    if !response.text().is_empty() {
        return response.text().to_string();
    }
    if let Some(message) = status_override(response.status) {
        return message.to_string();
    }
    if !response.status_text.trim().is_empty() {
        return response.status_text.clone();
    }
    format!("Request failed with status {}", response.status)
}

/// A failed request, resolved to what gets recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    /// Status code when a response was received.
    pub status_code: Option<u16>,
    /// Message to record.
    pub message: String,
    /// The response, when one was received.
    pub response: Option<TransportResponse>,
}

impl RequestFailure {
    /// Failure without a response.
    #[must_use]
    pub fn transport(error: &TransportError) -> Self {
        Self {
            status_code: None,
            message: error.to_string(),
            response: None,
        }
    }

    /// Failure from a non-success response.
    #[must_use]
    pub fn from_response(response: TransportResponse) -> Self {
        Self {
            status_code: Some(response.status),
            message: failure_message(&response),
            response: Some(response),
        }
    }

    /// Success status whose body could not be interpreted.
    pub fn unreadable(response: TransportResponse, detail: impl std::fmt::Display) -> Self {
        Self {
            status_code: Some(response.status),
            message: format!("Unexpected response body: {detail}"),
            response: Some(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_wins() {
        let response = TransportResponse::with_body(404, "widget 7 is gone");
        assert_eq!(failure_message(&response), "widget 7 is gone");
    }

    #[test]
    fn test_override_table_for_empty_body() {
        let response = TransportResponse::with_body(404, "");
        assert_eq!(failure_message(&response), "Page/Resource Not Found");

        let response = TransportResponse::with_body(401, "");
        assert_eq!(failure_message(&response), "Unauthorized: authentication is required");
    }

    #[test]
    fn test_whitespace_body_is_not_empty() {
        let response = TransportResponse::with_body(401, "  \n");
        assert_eq!(failure_message(&response), "  \n");
    }

    #[test]
    fn test_status_text_fallback() {
        let response = TransportResponse::new(500, "Internal Server Error", "");
        assert_eq!(failure_message(&response), "Internal Server Error");

        let response = TransportResponse::new(599, "", "");
        assert_eq!(failure_message(&response), "Request failed with status 599");
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let failure = RequestFailure::transport(&TransportError::Network("connection refused".into()));
        assert_eq!(failure.status_code, None);
        assert_eq!(failure.message, "connection refused");
    }
}
