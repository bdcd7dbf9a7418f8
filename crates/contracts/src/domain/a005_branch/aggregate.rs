use serde::{Deserialize, Serialize};

/// Филиал (пункт отправки / назначения партии)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Ответ `GET /branch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchListResponse {
    pub data: BranchListData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchListData {
    #[serde(default)]
    pub branches: Vec<Branch>,
}
