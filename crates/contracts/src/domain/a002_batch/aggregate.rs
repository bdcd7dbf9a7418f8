use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{ServiceType, ShippingScope};

/// Тело `POST /batch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub scope: ShippingScope,
    pub service_type: ServiceType,
    pub category: Vec<String>,
    pub is_fragile: bool,
    pub origin_id: String,
    pub destination_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Суммарный вес; не передаётся, если равен нулю
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Идентификаторы заказов
    pub orders: Vec<String>,

    /// `YYYY-MM-DD`
    pub shipment_date: NaiveDate,
}

/// Ответ `POST /batch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchResponse {
    pub data: CreatedBatchData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBatchData {
    pub batch: CreatedBatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBatch {
    #[serde(default)]
    pub id: Option<String>,
    pub batch_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let req = CreateBatchRequest {
            scope: ShippingScope::InTown,
            service_type: ServiceType::Express,
            category: vec!["docs".into()],
            is_fragile: true,
            origin_id: "b1".into(),
            destination_id: "b2".into(),
            notes: None,
            weight: Some(5.5),
            orders: vec!["o1".into(), "o2".into()],
            shipment_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["scope"], "IN_TOWN");
        assert_eq!(json["serviceType"], "EXPRESS");
        assert_eq!(json["shipmentDate"], "2024-03-09");
        assert_eq!(json["isFragile"], true);
        assert!(json.get("notes").is_none());
    }
}
