// src/error.rs
use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::ValidationError;

/// Which zone call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneOperation {
    Get,
    Patch,
}

impl fmt::Display for ZoneOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneOperation::Get => f.write_str("get"),
            ZoneOperation::Patch => f.write_str("update"),
        }
    }
}

/// Classification of a failed zone API call.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The request could not be sent or the response could not be read.
    #[error("error sending request")]
    Transport(#[source] reqwest::Error),

    /// A successful response whose body is not the expected envelope.
    #[error("error decoding response (HTTP {status})")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    /// The API reported an error in its envelope.
    #[error("api error: status={status}, message={message}")]
    Api {
        http_status: StatusCode,
        status: i64,
        message: String,
        invocation_id: Option<String>,
    },

    /// A failed response whose body is not a usable error envelope.
    #[error("error parsing error response (HTTP {status})")]
    MalformedErrorBody {
        status: StatusCode,
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl ErrorKind {
    /// Both flavours of unparsable body count as decode errors.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ErrorKind::Decode { .. } | ErrorKind::MalformedErrorBody { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ErrorKind::Transport(err) if err.is_timeout())
    }

    /// HTTP status of the response, if one was received.
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            ErrorKind::Transport(err) => err.status(),
            ErrorKind::Decode { status, .. } | ErrorKind::MalformedErrorBody { status, .. } => {
                Some(*status)
            }
            ErrorKind::Api { http_status, .. } => Some(*http_status),
        }
    }
}

/// A zone API failure together with the call that produced it.
#[derive(Debug, Error)]
#[error("could not {operation} zone {domain}")]
pub struct ClientError {
    pub operation: ZoneOperation,
    pub domain: String,
    #[source]
    pub kind: ErrorKind,
}

impl ClientError {
    pub fn new(operation: ZoneOperation, domain: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            operation,
            domain: domain.into(),
            kind,
        }
    }

    /// Status and message reported by the API, if it reported one.
    pub fn api_error(&self) -> Option<(i64, &str)> {
        match &self.kind {
            ErrorKind::Api {
                status, message, ..
            } => Some((*status, message.as_str())),
            _ => None,
        }
    }
}

/// Failure of a Present or CleanUp call.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid challenge name")]
    InvalidName(#[from] ValidationError),

    #[error("unable to get zone")]
    Fetch(#[source] ClientError),

    #[error("error updating zone")]
    Update(#[source] ClientError),
}

impl SolverError {
    /// The underlying API failure, if the error came from the zone API.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            SolverError::Fetch(err) | SolverError::Update(err) => Some(err),
            SolverError::InvalidName(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_keeps_status_and_message() {
        let err = ClientError::new(
            ZoneOperation::Get,
            "example.com",
            ErrorKind::Api {
                http_status: StatusCode::NOT_FOUND,
                status: 404,
                message: "not found".into(),
                invocation_id: None,
            },
        );

        assert_eq!(err.to_string(), "could not get zone example.com");
        assert_eq!(
            err.kind.to_string(),
            "api error: status=404, message=not found"
        );
        assert_eq!(err.api_error(), Some((404, "not found")));
        assert!(!err.kind.is_decode());
    }

    #[test]
    fn malformed_error_body_counts_as_decode_and_names_status() {
        let kind = ErrorKind::MalformedErrorBody {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            source: None,
        };
        assert!(kind.is_decode());
        assert_eq!(kind.http_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(kind.to_string().contains("500"));
    }

    #[test]
    fn solver_error_exposes_client_error() {
        let client = ClientError::new(
            ZoneOperation::Patch,
            "example.com",
            ErrorKind::MalformedErrorBody {
                status: StatusCode::BAD_GATEWAY,
                source: None,
            },
        );
        let err = SolverError::Update(client);

        assert_eq!(err.to_string(), "error updating zone");
        assert_eq!(
            err.client_error().map(|e| e.operation),
            Some(ZoneOperation::Patch)
        );
        assert!(SolverError::InvalidName(ValidationError::EmptyZone)
            .client_error()
            .is_none());
    }

    fn chain(err: &dyn std::error::Error) -> Vec<String> {
        let mut messages = vec![err.to_string()];
        let mut source = err.source();
        while let Some(next) = source {
            messages.push(next.to_string());
            source = next.source();
        }
        messages
    }

    #[test]
    fn each_layer_reports_its_own_message_once() {
        let err = SolverError::Fetch(ClientError::new(
            ZoneOperation::Get,
            "example.com",
            ErrorKind::Api {
                http_status: StatusCode::NOT_FOUND,
                status: 404,
                message: "not found".into(),
                invocation_id: None,
            },
        ));

        let messages = chain(&err);
        assert_eq!(
            messages,
            [
                "unable to get zone",
                "could not get zone example.com",
                "api error: status=404, message=not found",
            ]
        );
        assert_eq!(
            messages.iter().filter(|m| m.contains("not found")).count(),
            1
        );
    }

    #[test]
    fn decode_error_chain_ends_in_the_json_error() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let json_message = source.to_string();
        let err = ClientError::new(
            ZoneOperation::Patch,
            "example.com",
            ErrorKind::MalformedErrorBody {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                source: Some(source),
            },
        );

        let messages = chain(&err);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], "error parsing error response (HTTP 500 Internal Server Error)");
        assert_eq!(messages[2], json_message);
    }
}
