use serde::{Deserialize, Serialize};

use crate::enums::{ServiceType, ShippingScope};
use crate::shared::serde_helpers::{de_f64_lenient, de_opt_f64_lenient};

// ============================================================================
// Payload (POST /pricing/tariff, PATCH /pricing/tariff/{id})
// ============================================================================

/// Тариф в том виде, в котором он отправляется на сервер
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tariff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ShippingScope>,

    /// Ровно три записи: STANDARD, EXPRESS, OVERNIGHT
    pub service_types: Vec<ServiceTypeFee>,

    /// Ровно три списка диапазонов, по одному на тип услуги
    pub airport_fees: Vec<AirportFee>,

    /// Только настроенные комиссии (хотя бы одно ненулевое поле)
    pub driver_commissions: Vec<DriverCommission>,

    /// Маржа, 0..=100
    pub profit: f64,
}

/// Базовая стоимость для типа услуги
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeFee {
    /// Заполняется только при редактировании, чтобы сервер обновил запись
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type_id: Option<String>,
    pub service_type: ServiceType,
    pub base_fee: f64,
}

/// Аэропортовый сбор по весовым диапазонам для одного типа услуги
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportFee {
    pub service_type: ServiceType,
    pub brackets: Vec<WeightBracket>,
}

/// Весовой диапазон `[min_kg, max_kg)` с фиксированной ставкой
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightBracket {
    pub min_kg: f64,
    pub max_kg: f64,
    pub rate: f64,
}

/// Комиссия водителя для типа транспорта.
///
/// Отсутствующее поле означает "не настроено", а не ноль.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCommission {
    pub vehicle_type_id: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub fixed: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub per_km: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_f64_lenient"
    )]
    pub percentage: Option<f64>,
}

// ============================================================================
// Record (tariff as stored on the server, used in edit mode)
// ============================================================================

/// Сохранённый тариф.
///
/// Принимает как вложенную форму (`serviceTypes[].airportFee.brackets`),
/// так и плоскую (`airportFees`), поэтому построенный payload тоже
/// читается как запись.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub scope: Option<ShippingScope>,

    #[serde(default)]
    pub service_types: Vec<ServiceTypeRecord>,

    #[serde(default)]
    pub airport_fees: Vec<AirportFeeGroupRecord>,

    #[serde(default)]
    pub driver_commissions: Vec<DriverCommission>,

    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub profit_margin: Option<f64>,

    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub profit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub service_type_id: Option<String>,

    pub service_type: ServiceType,

    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub base_fee: Option<f64>,

    #[serde(default)]
    pub airport_fee: Option<AirportFeeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirportFeeRecord {
    #[serde(default)]
    pub brackets: Vec<BracketRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportFeeGroupRecord {
    pub service_type: ServiceType,
    #[serde(default)]
    pub brackets: Vec<BracketRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRecord {
    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub min_kg: f64,

    /// Может отсутствовать у последнего открытого диапазона
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub max_kg: Option<f64>,

    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub rate: f64,
}

impl ServiceTypeRecord {
    /// Идентификатор записи типа услуги, под каким бы ключом он ни пришёл
    pub fn record_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.service_type_id.as_deref())
    }
}

impl TariffRecord {
    /// Маржа: `profitMargin`, если есть, иначе `profit`
    pub fn profit_value(&self) -> Option<f64> {
        self.profit_margin.or(self.profit)
    }

    pub fn service_type(&self, service_type: ServiceType) -> Option<&ServiceTypeRecord> {
        self.service_types
            .iter()
            .find(|st| st.service_type == service_type)
    }

    /// Диапазоны для типа услуги: вложенные, иначе из плоского списка
    pub fn brackets_for(&self, service_type: ServiceType) -> &[BracketRecord] {
        if let Some(fee) = self
            .service_type(service_type)
            .and_then(|st| st.airport_fee.as_ref())
        {
            return &fee.brackets;
        }
        self.airport_fees
            .iter()
            .find(|group| group.service_type == service_type)
            .map(|group| group.brackets.as_slice())
            .unwrap_or(&[])
    }

    pub fn commission_for(&self, vehicle_type_id: &str) -> Option<&DriverCommission> {
        self.driver_commissions
            .iter()
            .find(|c| c.vehicle_type_id == vehicle_type_id)
    }

    /// Разобрать тариф, переданный через параметр навигации.
    ///
    /// Значение может быть как URL-кодированным JSON, так и уже
    /// декодированным.
    pub fn from_query_param(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if let Ok(record) = serde_json::from_str::<TariffRecord>(trimmed) {
            return Ok(record);
        }
        let decoded = urlencoding::decode(trimmed)
            .map_err(|e| format!("Invalid URL encoding: {}", e))?;
        serde_json::from_str::<TariffRecord>(&decoded)
            .map_err(|e| format!("Invalid tariff JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_TARIFF: &str = r#"{
        "id": "t-1",
        "name": "Regional 2024",
        "scope": "REGIONAL",
        "profitMargin": "12.5",
        "serviceTypes": [
            {"id": "st-1", "serviceType": "STANDARD", "baseFee": "100.00",
             "airportFee": {"brackets": [{"minKg": 0, "maxKg": 5, "rate": "10"}, {"minKg": 5, "rate": 20}]}},
            {"id": "st-2", "serviceType": "EXPRESS", "baseFee": 150},
            {"id": "st-3", "serviceType": "OVERNIGHT", "baseFee": 90}
        ],
        "driverCommissions": [{"vehicleTypeId": "v1", "fixed": "50", "perKm": null}]
    }"#;

    #[test]
    fn test_reads_server_record() {
        let record: TariffRecord = serde_json::from_str(SERVER_TARIFF).unwrap();
        assert_eq!(record.profit_value(), Some(12.5));
        assert_eq!(record.scope, Some(ShippingScope::Regional));

        let standard = record.service_type(ServiceType::Standard).unwrap();
        assert_eq!(standard.record_id(), Some("st-1"));
        assert_eq!(standard.base_fee, Some(100.0));

        let brackets = record.brackets_for(ServiceType::Standard);
        assert_eq!(brackets.len(), 2);
        assert_eq!(brackets[1].max_kg, None);
        assert!(record.brackets_for(ServiceType::Express).is_empty());

        let commission = record.commission_for("v1").unwrap();
        assert_eq!(commission.fixed, Some(50.0));
        assert_eq!(commission.per_km, None);
    }

    #[test]
    fn test_from_query_param_accepts_encoded_and_plain() {
        let encoded = urlencoding::encode(SERVER_TARIFF).into_owned();
        let a = TariffRecord::from_query_param(&encoded).unwrap();
        let b = TariffRecord::from_query_param(SERVER_TARIFF).unwrap();
        assert_eq!(a, b);
        assert!(TariffRecord::from_query_param("%7Bnot-json").is_err());
    }

    #[test]
    fn test_payload_omits_unset_fields() {
        let payload = Tariff {
            name: None,
            scope: None,
            service_types: vec![ServiceTypeFee {
                service_type_id: None,
                service_type: ServiceType::Express,
                base_fee: 10.0,
            }],
            airport_fees: vec![],
            driver_commissions: vec![DriverCommission {
                vehicle_type_id: "v1".into(),
                fixed: Some(50.0),
                per_km: None,
                percentage: None,
            }],
            profit: 10.0,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json["driverCommissions"][0],
            serde_json::json!({"vehicleTypeId": "v1", "fixed": 50.0})
        );
        assert!(json["serviceTypes"][0].get("serviceTypeId").is_none());
        assert!(json.get("name").is_none());
    }
}
