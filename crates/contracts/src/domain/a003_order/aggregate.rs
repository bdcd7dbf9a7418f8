use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::serde_helpers::de_f64_lenient;

/// Заказ в том виде, в котором его отдаёт API партий
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,

    #[serde(default)]
    pub tracking_code: String,

    #[serde(default, deserialize_with = "de_f64_lenient")]
    pub weight: f64,

    #[serde(default)]
    pub is_fragile: bool,

    #[serde(default)]
    pub category: Vec<String>,

    /// Сырое значение; каноническая область определяется ключом группы
    #[serde(default)]
    pub shipping_scope: Option<String>,

    #[serde(default)]
    pub service_type: Option<String>,

    #[serde(default)]
    pub delivery_address: serde_json::Value,

    #[serde(default)]
    pub branch_id: Option<String>,

    #[serde(default)]
    pub branch: Option<BranchRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRef {
    pub id: String,
}

impl Order {
    /// Филиал заказа: `branchId`, иначе `branch.id`
    pub fn branch_ref(&self) -> Option<&str> {
        self.branch_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.branch.as_ref().map(|b| b.id.as_str()))
            .filter(|id| !id.trim().is_empty())
    }
}

/// scope key → route key → service type key → orders
pub type RawGroupedOrders = HashMap<String, HashMap<String, HashMap<String, Vec<Order>>>>;

/// Ответ `GET /batch/categorized-orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedOrdersResponse {
    pub data: CategorizedOrdersData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedOrdersData {
    #[serde(default)]
    pub grouped: RawGroupedOrders,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_ref_fallback() {
        let order: Order = serde_json::from_str(
            r#"{"id": "o1", "weight": "2.5", "branchId": "", "branch": {"id": "b7"}}"#,
        )
        .unwrap();
        assert_eq!(order.weight, 2.5);
        assert_eq!(order.branch_ref(), Some("b7"));
        assert!(!order.is_fragile);

        let bare: Order = serde_json::from_str(r#"{"id": "o2"}"#).unwrap();
        assert_eq!(bare.branch_ref(), None);
        assert_eq!(bare.weight, 0.0);
    }

    #[test]
    fn test_categorized_envelope() {
        let body = r#"{"data": {"grouped": {"TOWN": {"A->B": {"STANDARD": [{"id": "o1", "weight": 1}]}}}}}"#;
        let resp: CategorizedOrdersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data.grouped["TOWN"]["A->B"]["STANDARD"][0].id, "o1");
    }
}
