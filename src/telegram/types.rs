// Bot API wire types (the subset this bot reads and writes).

use serde::{Deserialize, Serialize};

/// One inbound event delivered to the webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Available sizes of a photo, smallest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo: Vec<PhotoSize>,
}

impl Message {
    /// Whether the text is the `/start` command (optionally addressed to a bot).
    pub fn is_start_command(&self) -> bool {
        self.text.as_deref().is_some_and(|t| {
            let command = t.split_whitespace().next().unwrap_or_default();
            command == "/start" || command.starts_with("/start@")
        })
    }

    /// The largest available photo size.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo.last()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// Result of `getFile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct File {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    Markdown,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_update_deserializes() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "from": {"id": 77, "is_bot": false, "first_name": "Min"},
                "chat": {"id": 77, "type": "private"},
                "date": 1700000000,
                "text": "twice"
            }
        }))
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 77);
        assert_eq!(message.text.as_deref(), Some("twice"));
        assert!(message.photo.is_empty());
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_callback_update_deserializes() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 11,
            "callback_query": {
                "id": "abc",
                "from": {"id": 3, "is_bot": false, "first_name": "Ji"},
                "message": {"message_id": 9, "chat": {"id": 3}},
                "chat_instance": "x",
                "data": "menu_play"
            }
        }))
        .unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("menu_play"));
        assert_eq!(query.message.unwrap().message_id, 9);
    }

    #[test]
    fn test_largest_photo_is_last() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 1,
            "chat": {"id": 1},
            "photo": [
                {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90},
                {"file_id": "big", "file_unique_id": "b", "width": 1280, "height": 1280, "file_size": 2048}
            ]
        }))
        .unwrap();
        let photo = message.largest_photo().unwrap();
        assert_eq!(photo.file_id, "big");
        assert_eq!(photo.file_size, Some(2048));
    }

    #[test]
    fn test_start_command() {
        let mut message = Message::default();
        message.text = Some("/start".into());
        assert!(message.is_start_command());
        message.text = Some("/start@kpop_bot payload".into());
        assert!(message.is_start_command());
        message.text = Some("/started".into());
        assert!(!message.is_start_command());
        message.text = None;
        assert!(!message.is_start_command());
    }

    #[test]
    fn test_keyboard_and_parse_mode_serialize() {
        let markup = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton::new("Back", "menu_back")]],
        };
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({"inline_keyboard": [[{"text": "Back", "callback_data": "menu_back"}]]})
        );
        assert_eq!(serde_json::to_value(ParseMode::Html).unwrap(), json!("HTML"));
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<bool> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        }))
        .unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
