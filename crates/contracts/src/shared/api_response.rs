use serde::{Deserialize, Serialize};

/// Ответ вида `{ "message": "..." }`.
///
/// Используется и для успешных ответов (текст уведомления), и для
/// извлечения сообщения из тела ошибки.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
