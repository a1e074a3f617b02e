use thiserror::Error;

// ---------------------------------------------------------------------------
// ViewError – every failure a page can show
// ---------------------------------------------------------------------------

/// Failure kinds routed to presentation. Nothing is retried automatically:
/// a failed request is terminal for the view until the user reloads it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    /// Network failure or a non-2xx response.
    #[error("transport error ({}): {}", status_label(.status), .details.join("; "))]
    Transport {
        /// HTTP status, `None` when the request never got a response.
        status: Option<u16>,
        /// Messages from the error body (`detail[].msg`) or the client.
        details: Vec<String>,
    },

    /// The payload does not have the expected shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// No auth token cookie for a view that requires one.
    #[error("not authenticated")]
    Auth,
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

impl ViewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ViewError::Validation(msg.into())
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        ViewError::Transport {
            status: None,
            details: vec![err.to_string()],
        }
    }

    /// Messages suitable for the status line, one per line.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ViewError::Transport { details, .. } if !details.is_empty() => details.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_includes_status_and_details() {
        let err = ViewError::Transport {
            status: Some(401),
            details: vec!["Could not validate credentials".into()],
        };
        assert_eq!(
            err.to_string(),
            "transport error (HTTP 401): Could not validate credentials"
        );
        assert_eq!(err.messages(), vec!["Could not validate credentials"]);
    }

    #[test]
    fn messages_fall_back_to_display() {
        assert_eq!(ViewError::Auth.messages(), vec!["not authenticated"]);
        let err = ViewError::network("connection refused");
        assert_eq!(
            err.to_string(),
            "transport error (no response): connection refused"
        );
    }
}
