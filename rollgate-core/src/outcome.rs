use crate::{HTTP_ERROR_STATUS, SUCCESS_STATUS};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

/// How a single request ended.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "kind", rename_all = "snake_case"))]
pub enum OutcomeKind {
    /// The target answered with a status below 400.
    Response { status: u16 },
    /// No usable response: timeout, DNS, refused connection, TLS, or a 4xx/5xx status.
    Transport { error: String },
}

/// The recorded result of one synthetic request. Immutable once recorded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct RequestOutcome {
    #[cfg_attr(feature = "rt", serde(with = "time::serde::rfc3339"))]
    pub issued_at: OffsetDateTime,
    pub client: usize,
    pub latency: Duration,
    pub kind: OutcomeKind,
}

impl RequestOutcome {
    /// A status of 400 or above becomes a `Transport` outcome carrying [`http_error_message`].
    pub fn response(issued_at: OffsetDateTime, client: usize, latency: Duration, status: u16) -> Self {
        if status >= HTTP_ERROR_STATUS {
            return Self::transport(issued_at, client, latency, http_error_message(status));
        }
        Self {
            issued_at,
            client,
            latency,
            kind: OutcomeKind::Response { status },
        }
    }

    pub fn transport(
        issued_at: OffsetDateTime,
        client: usize,
        latency: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            issued_at,
            client,
            latency,
            kind: OutcomeKind::Transport {
                error: error.into(),
            },
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            OutcomeKind::Response { status } => Some(status),
            OutcomeKind::Transport { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.kind {
            OutcomeKind::Response { .. } => None,
            OutcomeKind::Transport { error } => Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code() == Some(SUCCESS_STATUS)
    }
}

/// `HTTP Error 503: Service Unavailable`
pub fn http_error_message(status: u16) -> String {
    let reason = http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown");
    format!("HTTP Error {status}: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_counts_as_success() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let ok = RequestOutcome::response(now, 0, Duration::from_millis(5), 200);
        let redirect = RequestOutcome::response(now, 1, Duration::from_millis(5), 204);
        let failed = RequestOutcome::transport(now, 2, Duration::from_secs(30), "timed out");

        assert!(ok.is_success());
        assert!(!redirect.is_success());
        assert!(!failed.is_success());

        assert_eq!(redirect.status_code(), Some(204));
        assert_eq!(failed.status_code(), None);
        assert_eq!(failed.error(), Some("timed out"));
        assert_eq!(ok.error(), None);
    }

    #[test]
    fn error_statuses_are_not_responses() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let unavailable = RequestOutcome::response(now, 3, Duration::from_millis(10), 503);
        let missing = RequestOutcome::response(now, 4, Duration::from_millis(10), 404);
        let moved = RequestOutcome::response(now, 5, Duration::from_millis(10), 302);

        assert_eq!(unavailable.status_code(), None);
        assert_eq!(unavailable.error(), Some("HTTP Error 503: Service Unavailable"));
        assert_eq!(unavailable.latency, Duration::from_millis(10));
        assert_eq!(missing.error(), Some("HTTP Error 404: Not Found"));
        assert_eq!(moved.status_code(), Some(302));
    }

    #[test]
    fn unknown_error_status_still_has_a_message() {
        assert_eq!(http_error_message(599), "HTTP Error 599: Unknown");
    }
}
