use serde::{Deserialize, Serialize};

/// Тип транспорта из справочника автопарка
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleType {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Ответ `GET /fleet/type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTypeListResponse {
    pub data: VehicleTypeListData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTypeListData {
    #[serde(default)]
    pub vehicle_types: Vec<VehicleType>,
}
