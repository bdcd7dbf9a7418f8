use serde::{Deserialize, Serialize};

/// Тип услуги доставки (тариф обслуживания)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Standard,
    /// В интерфейсе отображается как "Same Day"
    Express,
    Overnight,
}

impl ServiceType {
    /// Код, который используется в API
    pub fn code(&self) -> &'static str {
        match self {
            ServiceType::Standard => "STANDARD",
            ServiceType::Express => "EXPRESS",
            ServiceType::Overnight => "OVERNIGHT",
        }
    }

    /// Человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceType::Standard => "Standard",
            ServiceType::Express => "Same Day",
            ServiceType::Overnight => "Overnight",
        }
    }

    /// Все типы услуг в порядке отображения
    pub fn all() -> Vec<ServiceType> {
        vec![
            ServiceType::Standard,
            ServiceType::Express,
            ServiceType::Overnight,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "STANDARD" => Some(ServiceType::Standard),
            "EXPRESS" => Some(ServiceType::Express),
            "OVERNIGHT" => Some(ServiceType::Overnight),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
