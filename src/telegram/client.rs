// Bot API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::types::{ApiResponse, File, InlineKeyboardMarkup};
use super::{DownloadedFile, Reply, Transport, TransportError};
use crate::metrics;

const API_BASE: &str = "https://api.telegram.org";

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            token: token.into(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Talk to a different API host (a local Bot API server, or a test double).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{file_path}", self.base_url, self.token)
    }

    /// POST a JSON body to `method` and unwrap the response envelope.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let result = async {
            let response = self
                .client
                .post(self.method_url(method))
                .json(body)
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            read_envelope(response).await
        }
        .await;
        if result.is_err() {
            metrics::TRANSPORT_ERRORS_TOTAL
                .with_label_values(&[method])
                .inc();
        }
        result
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
    let status = response.status().as_u16();
    let envelope: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| TransportError::Parse(e.to_string()))?;
    if !envelope.ok {
        return Err(TransportError::Api {
            status,
            message: envelope.description.unwrap_or_default(),
        });
    }
    envelope
        .result
        .ok_or_else(|| TransportError::Parse("missing result".to_string()))
}

fn reply_body(reply: &Reply) -> serde_json::Map<String, Value> {
    let mut body = serde_json::Map::new();
    body.insert("text".into(), json!(reply.text));
    if let Some(mode) = reply.parse_mode {
        body.insert("parse_mode".into(), json!(mode));
    }
    if let Some(keyboard) = &reply.keyboard {
        body.insert("reply_markup".into(), json!(keyboard));
    }
    body
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        let mut body = reply_body(reply);
        body.insert("chat_id".into(), json!(chat_id));
        self.call::<_, Value>("sendMessage", &body).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &[u8],
        caption: Option<&str>,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", Part::bytes(photo.to_vec()).file_name("photo.jpg"));
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }
        if let Some(keyboard) = keyboard {
            let markup = serde_json::to_string(keyboard)
                .map_err(|e| TransportError::Parse(e.to_string()))?;
            form = form.text("reply_markup", markup);
        }

        let result = async {
            let response = self
                .client
                .post(self.method_url("sendPhoto"))
                .multipart(form)
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            read_envelope::<Value>(response).await
        }
        .await;
        if result.is_err() {
            metrics::TRANSPORT_ERRORS_TOTAL
                .with_label_values(&["sendPhoto"])
                .inc();
        }
        result.map(|_| ())
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        let mut body = reply_body(reply);
        body.insert("chat_id".into(), json!(chat_id));
        body.insert("message_id".into(), json!(message_id));
        self.call::<_, Value>("editMessageText", &body).await?;
        Ok(())
    }

    async fn clear_keyboard(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError> {
        let body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "reply_markup": {"inline_keyboard": []},
        });
        self.call::<_, Value>("editMessageReplyMarkup", &body).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        let body = json!({ "callback_query_id": callback_id });
        self.call::<_, Value>("answerCallbackQuery", &body).await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<DownloadedFile, TransportError> {
        let file: File = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let Some(path) = file.file_path else {
            return Err(TransportError::Parse("file has no path".to_string()));
        };

        let response = self
            .client
            .get(self.file_url(&path))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Api { status, message });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(DownloadedFile {
            bytes: bytes.to_vec(),
            path: Some(path),
        })
    }

    async fn set_webhook(&self, url: &str) -> Result<bool, TransportError> {
        self.call("setWebhook", &json!({ "url": url })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::types::InlineKeyboardButton;
    use axum::{extract::Json, routing::get, routing::post, Router};

    async fn spawn_fake_api() -> String {
        let app = Router::new()
            .route(
                "/bottok/sendMessage",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"ok": true, "result": {"message_id": 1, "echo": body}}))
                }),
            )
            .route(
                "/bottok/answerCallbackQuery",
                post(|| async {
                    (
                        axum::http::StatusCode::BAD_REQUEST,
                        Json(json!({"ok": false, "error_code": 400, "description": "query is too old"})),
                    )
                }),
            )
            .route(
                "/bottok/setWebhook",
                post(|| async { Json(json!({"ok": true, "result": true})) }),
            )
            .route(
                "/bottok/getFile",
                post(|| async {
                    Json(json!({"ok": true, "result": {"file_id": "f1", "file_path": "photos/file_1.png"}}))
                }),
            )
            .route(
                "/file/bottok/photos/file_1.png",
                get(|| async { vec![1u8, 2, 3] }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_reply_body_fields() {
        let reply = Reply::html("<code>J**</code>").with_keyboard(InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton::new("Back", "menu_back")]],
        });
        let body = reply_body(&reply);
        assert_eq!(body["text"], json!("<code>J**</code>"));
        assert_eq!(body["parse_mode"], json!("HTML"));
        assert_eq!(
            body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            json!("menu_back")
        );

        let plain = reply_body(&Reply::text("hi"));
        assert!(!plain.contains_key("parse_mode"));
        assert!(!plain.contains_key("reply_markup"));
    }

    #[test]
    fn test_urls() {
        let client = TelegramClient::new("123:abc")
            .unwrap()
            .with_base_url("http://localhost:8081/");
        assert_eq!(client.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
        assert_eq!(
            client.file_url("photos/a.jpg"),
            "http://localhost:8081/file/bot123:abc/photos/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_send_text_ok() {
        let base = spawn_fake_api().await;
        let client = TelegramClient::new("tok").unwrap().with_base_url(base);
        client.send_text(5, &Reply::text("hello")).await.unwrap();
        assert!(client.set_webhook("https://x/webhook").await.unwrap());
    }

    #[tokio::test]
    async fn test_api_error_carries_description() {
        let base = spawn_fake_api().await;
        let client = TelegramClient::new("tok").unwrap().with_base_url(base);
        match client.answer_callback("q1").await {
            Err(TransportError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "query is too old");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_file() {
        let base = spawn_fake_api().await;
        let client = TelegramClient::new("tok").unwrap().with_base_url(base);
        let file = client.download_file("f1").await.unwrap();
        assert_eq!(file.bytes, vec![1, 2, 3]);
        assert_eq!(file.path.as_deref(), Some("photos/file_1.png"));
    }
}
