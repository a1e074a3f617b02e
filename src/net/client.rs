use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::data::model::{CurrentUser, ErrorBody, Token};
use crate::error::ViewError;
use crate::state::Pagination;

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

/// Blocking client for the analytics service. Cheap to clone; each request
/// runs on whichever thread calls it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    user_name: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// No explicit timeout: requests rely on the transport default.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ViewError> {
        let base = Url::parse(base_url)
            .map_err(|e| ViewError::validation(format!("invalid base url '{base_url}': {e}")))?;
        let http = Client::builder()
            .build()
            .map_err(|e| ViewError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http, base, token })
    }

    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL for a server-provided path such as an image.
    pub fn resolve(&self, path: &str) -> String {
        self.base
            .join(path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| path.to_string())
    }

    // -- endpoints --

    /// `GET /api/analytics/` as raw JSON; assembly validates the shape.
    pub fn analytics(&self) -> Result<JsonValue, ViewError> {
        self.get_json("/api/analytics/", &[])
    }

    /// `GET /api/info/{item}` returning text.
    pub fn info_text(&self, item: &str) -> Result<String, ViewError> {
        let body = self.get_body(&format!("/api/info/{item}"), &[])?;
        Ok(unwrap_text(&body))
    }

    /// `GET /api/info/{item}?limit=&offset=` returning a tabular record.
    pub fn info_table(&self, item: &str, page: &Pagination) -> Result<JsonValue, ViewError> {
        let query = [
            ("limit", page.limit.to_string()),
            ("offset", page.offset.to_string()),
        ];
        self.get_json(&format!("/api/info/{item}"), &query)
    }

    /// `GET /api/users/me`. Requires a token.
    pub fn current_user(&self) -> Result<CurrentUser, ViewError> {
        if self.token.is_none() {
            return Err(ViewError::Auth);
        }
        let value = self.get_json("/api/users/me", &[])?;
        from_json(value, "current user")
    }

    /// `POST /api/auth/login`.
    pub fn login(&self, user_name: &str, password: &str) -> Result<Token, ViewError> {
        let value = self.post_json("/api/auth/login", &Credentials { user_name, password })?;
        from_json(value, "login response")
    }

    /// `POST /api/auth/registration`.
    pub fn register(&self, user_name: &str, password: &str) -> Result<(), ViewError> {
        self.post_json("/api/auth/registration", &Credentials { user_name, password })?;
        Ok(())
    }

    // -- plumbing --

    fn url(&self, path: &str) -> Result<Url, ViewError> {
        self.base
            .join(path)
            .map_err(|e| ViewError::validation(format!("invalid path '{path}': {e}")))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    fn get_body(&self, path: &str, query: &[(&str, String)]) -> Result<String, ViewError> {
        let url = self.url(path)?;
        log::debug!("GET {url}");
        let mut req = self.http.get(url.clone()).header("Content-Type", "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        let response = self.authorize(req).send().map_err(|e| {
            log::error!("GET {url} failed: {e}");
            ViewError::network(format!("Request failed: {e}"))
        })?;
        read_response(response)
    }

    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<JsonValue, ViewError> {
        let body = self.get_body(path, query)?;
        parse_json(&body)
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<JsonValue, ViewError> {
        let url = self.url(path)?;
        log::debug!("POST {url}");
        let req = self.http.post(url.clone()).json(body);
        let response = self.authorize(req).send().map_err(|e| {
            log::error!("POST {url} failed: {e}");
            ViewError::network(format!("Request failed: {e}"))
        })?;
        let text = read_response(response)?;
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        parse_json(&text)
    }
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

fn read_response(response: Response) -> Result<String, ViewError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|e| ViewError::network(format!("Failed to read response: {e}")))?;
    check_status(status, body)
}

/// Pass 2xx bodies through; turn anything else into a transport error
/// carrying the service's `detail` messages when the body has them.
pub fn check_status(status: u16, body: String) -> Result<String, ViewError> {
    if (200..300).contains(&status) {
        return Ok(body);
    }
    let details = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => err.messages(),
        Err(_) if body.trim().is_empty() => Vec::new(),
        Err(_) => vec![body.trim().to_string()],
    };
    log::error!("request failed with HTTP {status}: {details:?}");
    Err(ViewError::Transport {
        status: Some(status),
        details,
    })
}

fn parse_json(body: &str) -> Result<JsonValue, ViewError> {
    serde_json::from_str(body)
        .map_err(|e| ViewError::validation(format!("Failed to parse response: {e}")))
}

fn from_json<T: DeserializeOwned>(value: JsonValue, what: &str) -> Result<T, ViewError> {
    serde_json::from_value(value).map_err(|e| ViewError::validation(format!("{what}: {e}")))
}

/// Text endpoints are declared as returning `str`, so the body is usually a
/// JSON string literal. Unwrap it; any other body is used verbatim.
pub fn unwrap_text(body: &str) -> String {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::String(s)) => s,
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_passes_body_through() {
        assert_eq!(check_status(200, "{}".into()).unwrap(), "{}");
        assert_eq!(check_status(204, String::new()).unwrap(), "");
    }

    #[test]
    fn error_body_details_are_kept() {
        let err = check_status(
            422,
            r#"{"detail": [{"msg": "field required"}, {"msg": "too short"}]}"#.into(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ViewError::Transport {
                status: Some(422),
                details: vec!["field required".into(), "too short".into()],
            }
        );
    }

    #[test]
    fn plain_error_body_becomes_detail() {
        let err = check_status(502, "Bad Gateway\n".into()).unwrap_err();
        assert_eq!(err.messages(), vec!["Bad Gateway"]);
        let err = check_status(500, String::new()).unwrap_err();
        assert_eq!(err.to_string(), "transport error (HTTP 500): ");
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        assert!(matches!(parse_json("{nope"), Err(ViewError::Validation(_))));
    }

    #[test]
    fn text_bodies_are_unwrapped() {
        assert_eq!(unwrap_text(r#""line one\nline two""#), "line one\nline two");
        assert_eq!(unwrap_text("raw text"), "raw text");
    }

    #[test]
    fn paths_resolve_against_base() {
        let client = ApiClient::new("http://127.0.0.1:8000", None).unwrap();
        assert_eq!(
            client.resolve("/static/roc/svm.png"),
            "http://127.0.0.1:8000/static/roc/svm.png"
        );
        assert!(!client.has_token());
        assert!(client.with_token(Some("t".into())).has_token());
    }

    #[test]
    fn current_user_without_token_is_auth_error() {
        let client = ApiClient::new("http://127.0.0.1:8000", None).unwrap();
        assert_eq!(client.current_user().unwrap_err(), ViewError::Auth);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url", None),
            Err(ViewError::Validation(_))
        ));
    }
}
