use thiserror::Error;

/// Ошибка обращения к REST API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Server {
        status: u16,
        /// Поле `message` из тела ответа, если оно было
        message: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Текст для оператора: сообщение сервера как есть, иначе `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Ошибка проверки одного поля формы
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Имя поля в форме, например `profitMargin` или `standardWeightRanges[1].to`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Все ошибки проверки формы разом
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ошибка отправки формы: до сети (проверка) или после (API)
#[derive(Debug, Error)]
pub enum SubmitError<V: std::error::Error + 'static> {
    #[error(transparent)]
    Invalid(V),

    #[error("{message}")]
    Api {
        /// Сообщение, показываемое оператору
        message: String,
        #[source]
        source: ApiError,
    },
}

impl<V: std::error::Error + 'static> SubmitError<V> {
    pub fn api(source: ApiError, fallback: &str) -> Self {
        Self::Api {
            message: source.user_message(fallback),
            source,
        }
    }

    /// Текст для уведомления оператору
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Invalid(v) => v.to_string(),
            SubmitError::Api { message, .. } => message.clone(),
        }
    }
}
