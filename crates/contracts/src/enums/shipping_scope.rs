use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Географический уровень отправки
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShippingScope {
    InTown,
    Regional,
    International,
}

/// Таблица соответствия ключей API каноническим значениям.
///
/// Эндпоинт сгруппированных заказов называет городскую доставку `TOWN`,
/// а тарифы и партии используют `IN_TOWN`. Все ключи сводятся здесь,
/// потребители работают только с [`ShippingScope`].
pub const SCOPE_WIRE_KEYS: &[(&str, ShippingScope)] = &[
    ("IN_TOWN", ShippingScope::InTown),
    ("TOWN", ShippingScope::InTown),
    ("REGIONAL", ShippingScope::Regional),
    ("INTERNATIONAL", ShippingScope::International),
];

impl ShippingScope {
    /// Код для тел запросов партий и тарифов
    pub fn code(&self) -> &'static str {
        match self {
            ShippingScope::InTown => "IN_TOWN",
            ShippingScope::Regional => "REGIONAL",
            ShippingScope::International => "INTERNATIONAL",
        }
    }

    /// Ключ, под которым эндпоинт `/batch/categorized-orders` отдаёт группу
    pub fn grouped_key(&self) -> &'static str {
        match self {
            ShippingScope::InTown => "TOWN",
            ShippingScope::Regional => "REGIONAL",
            ShippingScope::International => "INTERNATIONAL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShippingScope::InTown => "In Town",
            ShippingScope::Regional => "Regional",
            ShippingScope::International => "International",
        }
    }

    pub fn all() -> Vec<ShippingScope> {
        vec![
            ShippingScope::InTown,
            ShippingScope::Regional,
            ShippingScope::International,
        ]
    }

    /// Парсинг любого известного ключа API (без учёта регистра)
    pub fn from_wire(key: &str) -> Option<Self> {
        let key = key.trim();
        SCOPE_WIRE_KEYS
            .iter()
            .find(|(wire, _)| wire.eq_ignore_ascii_case(key))
            .map(|(_, scope)| *scope)
    }
}

impl std::fmt::Display for ShippingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ShippingScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ShippingScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ShippingScope::from_wire(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown shipping scope: {}", raw)))
    }
}
