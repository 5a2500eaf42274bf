//! Remote responder: the HTTP chat backend.
//!
//! One request per call, no retries. Transport failures, non-2xx statuses
//! and undecodable bodies come back as distinct [`ChatError`] variants.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

impl ChatRequest {
    /// Build a request, dropping an age that is blank after trimming.
    pub fn new(message: impl Into<String>, age: Option<&str>) -> Self {
        let age = age
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        Self {
            message: message.into(),
            age,
        }
    }
}

/// Successful backend answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Something that can answer a chat message.
#[async_trait]
pub trait RemoteResponder: Send + Sync {
    async fn respond(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// [`RemoteResponder`] that POSTs JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpResponder {
    client: reqwest::Client,
    url: String,
}

impl HttpResponder {
    /// Create a responder for `url`. Without a timeout a hung request
    /// simply never completes.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ChatError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteResponder for HttpResponder {
    async fn respond(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        tracing::debug!(url = %self.url, has_age = request.age.is_some(), "Sending chat request");

        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::HttpStatus(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        serde_json::from_slice::<ChatReply>(&body).map_err(|e| ChatError::Decode(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn responder_for(server: &MockServer) -> HttpResponder {
        HttpResponder::new(format!("{}/chat", server.uri()), None).unwrap()
    }

    #[test]
    fn test_request_drops_blank_age() {
        assert_eq!(ChatRequest::new("hi", Some("   ")).age, None);
        assert_eq!(ChatRequest::new("hi", None).age, None);
        assert_eq!(ChatRequest::new("hi", Some(" 42 ")).age.as_deref(), Some("42"));
    }

    #[test]
    fn test_request_omits_missing_age() {
        let body = serde_json::to_value(ChatRequest::new("hi", None)).unwrap();
        assert_eq!(body, json!({"message": "hi"}));

        let body = serde_json::to_value(ChatRequest::new("hi", Some("30"))).unwrap();
        assert_eq!(body, json!({"message": "hi", "age": "30"}));
    }

    #[tokio::test]
    async fn test_success_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"message": "I have a fever", "age": "34"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Rest up."})))
            .expect(1)
            .mount(&server)
            .await;

        let responder = responder_for(&server);
        let reply = responder
            .respond(&ChatRequest::new("I have a fever", Some("34")))
            .await
            .unwrap();
        assert_eq!(reply.reply, "Rest up.");
    }

    #[tokio::test]
    async fn test_extra_fields_are_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"reply": "ok", "model": "x"})),
            )
            .mount(&server)
            .await;

        let reply = responder_for(&server)
            .respond(&ChatRequest::new("hi", None))
            .await
            .unwrap();
        assert_eq!(reply.reply, "ok");
    }

    #[tokio::test]
    async fn test_server_error_is_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"reply": "ignored"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = responder_for(&server)
            .respond(&ChatRequest::new("hi", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_missing_reply_field_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "hi"})))
            .mount(&server)
            .await;

        let err = responder_for(&server)
            .respond(&ChatRequest::new("hi", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Decode(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>sleeping</html>"))
            .mount(&server)
            .await;

        let err = responder_for(&server)
            .respond(&ChatRequest::new("hi", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop a listener to get a port nobody is serving.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let responder = HttpResponder::new(format!("http://{}/chat", addr), None).unwrap();
        let err = responder
            .respond(&ChatRequest::new("hi", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Network(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"reply": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let responder = HttpResponder::new(
            format!("{}/chat", server.uri()),
            Some(Duration::from_millis(100)),
        )
        .unwrap();
        let err = responder
            .respond(&ChatRequest::new("hi", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Network(_)));
    }
}
