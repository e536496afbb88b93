//! HTTP client for the external chat-persistence collaborator.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ChatMessageRecord, ChatStore, CollaboratorError, MessageBody, UserId};

#[derive(Debug, Serialize)]
struct PersistRequest<'a> {
    sender_id: &'a str,
    receiver_id: &'a str,
    body: &'a MessageBody,
}

/// reqwest-based `ChatStore` implementation.
///
/// The collaborator assigns the durable id, timestamp and ordering; this
/// client only transports the payload and hands the stored record back.
pub struct HttpChatStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatStore {
    /// Create a new client against `base_url` (e.g. `http://chat-api:8080`).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn check_status(response: &reqwest::Response) -> Result<(), CollaboratorError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CollaboratorError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl ChatStore for HttpChatStore {
    async fn persist(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<ChatMessageRecord, CollaboratorError> {
        let request = PersistRequest {
            sender_id: sender_id.as_str(),
            receiver_id: receiver_id.as_str(),
            body: &body,
        };

        let response = self
            .client
            .post(format!("{}/api/messages", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))?;
        Self::check_status(&response)?;

        response
            .json::<ChatMessageRecord>()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))
    }

    async fn history(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Vec<ChatMessageRecord>, CollaboratorError> {
        let response = self
            .client
            .get(format!("{}/api/messages", self.base_url))
            .query(&[("user_a", user_a.as_str()), ("user_b", user_b.as_str())])
            .send()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))?;
        Self::check_status(&response)?;

        response
            .json::<Vec<ChatMessageRecord>>()
            .await
            .map_err(|e| CollaboratorError::Request(e.to_string()))
    }
}
