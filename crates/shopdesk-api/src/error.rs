// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "request failed -- check the backend logs and retry";

const FOREIGN_KEY_MARKERS: [&str; 2] = ["foreign key constraint", "referenced from table \"sku\""];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach {url} -- start the backend or fix api.base_url ({reason})")]
    Connection { url: String, reason: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("server returned {status}")]
    Status { status: u16 },
    #[error("decode {what}: {reason}")]
    Decode { what: String, reason: String },
}

impl ApiError {
    pub fn connection(url: &str, error: &reqwest::Error) -> Self {
        Self::Connection {
            url: url.to_owned(),
            reason: error.to_string(),
        }
    }

    /// Builds the error for a non-success response, preferring the server's
    /// own message when the body carries one.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let status = status.as_u16();
        if let Some(message) = server_message(body) {
            return Self::Server { status, message };
        }
        let trimmed = body.trim();
        if !trimmed.is_empty() && trimmed.len() < 200 && !trimmed.contains('{') {
            return Self::Server {
                status,
                message: trimmed.to_owned(),
            };
        }
        Self::Status { status }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Status { status } => Some(*status),
            Self::Connection { .. } | Self::Decode { .. } => None,
        }
    }

    pub fn server_text(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Message { message: String },
    Nested { error: NestedError },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: String,
}

fn server_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<ErrorEnvelope>(body).ok()? {
        ErrorEnvelope::Message { message } => message,
        ErrorEnvelope::Nested { error } => error.message,
        ErrorEnvelope::Plain { error } => error,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_owned())
}

/// Text for the one-line alert shown after a failed command.
pub fn user_message(error: &anyhow::Error) -> String {
    if let Some(api) = error.downcast_ref::<ApiError>()
        && let Some(text) = api.server_text()
    {
        return text.to_owned();
    }
    let text = format!("{error:#}");
    if text.trim().is_empty() {
        GENERIC_FAILURE.to_owned()
    } else {
        text
    }
}

/// True when the backend refused a delete because other rows still point
/// at the record.
pub fn is_foreign_key_violation(error: &anyhow::Error) -> bool {
    let text = user_message(error).to_lowercase();
    FOREIGN_KEY_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::{ApiError, GENERIC_FAILURE, is_foreign_key_violation, user_message};
    use anyhow::{Context, anyhow};
    use reqwest::StatusCode;

    #[test]
    fn response_wrapper_message_wins() {
        let error = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"status":400,"message":"Phone already exists","data":null}"#,
        );
        assert_eq!(error.server_text(), Some("Phone already exists"));
        assert_eq!(error.status(), Some(400));
        assert_eq!(error.to_string(), "server error (400): Phone already exists");
    }

    #[test]
    fn nested_and_plain_error_fields() {
        let nested =
            ApiError::from_response(StatusCode::CONFLICT, r#"{"error":{"message":"taken"}}"#);
        assert_eq!(nested.server_text(), Some("taken"));
        let plain = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"error":"Not Found"}"#);
        assert_eq!(plain.server_text(), Some("Not Found"));
    }

    #[test]
    fn short_text_body_is_kept_and_json_noise_is_not() {
        let text = ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(text.server_text(), Some("upstream down"));

        let noise = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"trace":"..."}"#);
        assert!(matches!(noise, ApiError::Status { status: 500 }));
    }

    #[test]
    fn user_message_survives_context() {
        let error = anyhow::Error::new(ApiError::Server {
            status: 409,
            message: "duplicate".to_owned(),
        })
        .context("create customer");
        assert_eq!(user_message(&error), "duplicate");

        let other = anyhow!("disk full").context("write export");
        assert_eq!(user_message(&other), "write export: disk full");

        assert_eq!(user_message(&anyhow!("")), GENERIC_FAILURE);
    }

    #[test]
    fn foreign_key_detection_is_case_insensitive() {
        let error = anyhow::Error::new(ApiError::Server {
            status: 500,
            message: "update or delete on table \"product_models\" violates FOREIGN KEY constraint".to_owned(),
        });
        assert!(is_foreign_key_violation(&error));

        let sku = anyhow::Error::new(ApiError::Server {
            status: 500,
            message: "Key (id)=(4) is still referenced from table \"sku\".".to_owned(),
        });
        assert!(is_foreign_key_violation(&sku));

        let unrelated = Err::<(), _>(anyhow!("timeout")).context("delete").expect_err("err");
        assert!(!is_foreign_key_violation(&unrelated));
    }
}
