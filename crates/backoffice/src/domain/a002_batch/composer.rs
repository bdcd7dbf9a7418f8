use chrono::NaiveDate;
use contracts::domain::a002_batch::aggregate::CreateBatchRequest;
use contracts::domain::a003_order::aggregate::Order;
use contracts::enums::{ServiceType, ShippingScope};
use serde::Deserialize;
use thiserror::Error;

use super::grouping::GroupedOrders;
use super::selection::OrderSelection;

/// Откуда берутся категории партии, если оператор их не указал
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryPolicy {
    /// Категории первого выбранного заказа
    #[default]
    FirstOrder,
    /// Объединение категорий всех выбранных заказов
    Union,
}

/// Что делать, если филиал отправления нельзя определить по заказам
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginPolicy {
    /// Использовать филиал назначения
    #[default]
    FallbackToDestination,
    /// Отклонить партию
    Require,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositionPolicy {
    pub category: CategoryPolicy,
    pub origin: OriginPolicy,
}

/// Поле формы партии
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchField {
    Scope,
    ServiceType,
    Orders,
    Destination,
    ShipmentDate,
    Origin,
}

impl BatchField {
    pub fn name(&self) -> &'static str {
        match self {
            BatchField::Scope => "scope",
            BatchField::ServiceType => "serviceType",
            BatchField::Orders => "orders",
            BatchField::Destination => "destinationId",
            BatchField::ShipmentDate => "shipmentDate",
            BatchField::Origin => "originId",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BatchField::Scope => "Выберите область доставки",
            BatchField::ServiceType => "Выберите тип услуги",
            BatchField::Orders => "Выберите хотя бы один заказ",
            BatchField::Destination => "Выберите филиал назначения",
            BatchField::ShipmentDate => "Укажите дату отправки",
            BatchField::Origin => "Не удалось определить филиал отправления",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("{}", .0.message())]
    Missing(BatchField),
    #[error("Партия {batch_code} уже создана")]
    AlreadyCreated { batch_code: String },
}

impl BatchError {
    /// Поле формы, к которому относится ошибка
    pub fn field(&self) -> Option<BatchField> {
        match self {
            BatchError::Missing(field) => Some(*field),
            BatchError::AlreadyCreated { .. } => None,
        }
    }
}

/// Черновик партии, который заполняет оператор
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchDraft {
    pub scope: Option<ShippingScope>,
    pub service_type: Option<ServiceType>,
    pub selection: OrderSelection,
    pub destination_id: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub notes: Option<String>,
    categories: Vec<String>,
}

impl BatchDraft {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Добавить тег категории; пустые и повторяющиеся игнорируются
    pub fn add_category(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.categories.iter().any(|c| c == tag) {
            return false;
        }
        self.categories.push(tag.to_string());
        true
    }

    pub fn remove_category(&mut self, tag: &str) {
        self.categories.retain(|c| c != tag.trim());
    }
}

/// Собрать тело `POST /batch` из черновика.
///
/// Поля проверяются по порядку: область, тип услуги, заказы, назначение,
/// дата. В партию попадают только выбранные заказы из текущего рабочего
/// набора, в порядке выбора.
pub fn assemble_batch(
    draft: &BatchDraft,
    grouped: &GroupedOrders,
    policy: CompositionPolicy,
) -> Result<CreateBatchRequest, BatchError> {
    let scope = draft.scope.ok_or(BatchError::Missing(BatchField::Scope))?;
    let service_type = draft
        .service_type
        .ok_or(BatchError::Missing(BatchField::ServiceType))?;

    let working_set = grouped.working_set(scope, service_type);
    let selected: Vec<&Order> = draft
        .selection
        .ids()
        .iter()
        .filter_map(|id| working_set.iter().copied().find(|o| &o.id == id))
        .collect();
    let first = *selected
        .first()
        .ok_or(BatchError::Missing(BatchField::Orders))?;

    let destination_id = draft
        .destination_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(BatchError::Missing(BatchField::Destination))?
        .to_string();
    let shipment_date = draft
        .shipment_date
        .ok_or(BatchError::Missing(BatchField::ShipmentDate))?;

    let weight: f64 = selected.iter().map(|o| o.weight).sum();
    let is_fragile = selected.iter().any(|o| o.is_fragile);

    let category = if !draft.categories.is_empty() {
        draft.categories.clone()
    } else {
        match policy.category {
            CategoryPolicy::FirstOrder => first.category.clone(),
            CategoryPolicy::Union => {
                let mut union: Vec<String> = Vec::new();
                for tag in selected.iter().flat_map(|o| o.category.iter()) {
                    if !union.contains(tag) {
                        union.push(tag.clone());
                    }
                }
                union
            }
        }
    };

    let origin_id = match (first.branch_ref(), policy.origin) {
        (Some(branch), _) => branch.to_string(),
        (None, OriginPolicy::FallbackToDestination) => destination_id.clone(),
        (None, OriginPolicy::Require) => return Err(BatchError::Missing(BatchField::Origin)),
    };

    let notes = draft
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(CreateBatchRequest {
        scope,
        service_type,
        category,
        is_fragile,
        origin_id,
        destination_id,
        notes,
        weight: (weight > 0.0).then_some(weight),
        orders: selected.iter().map(|o| o.id.clone()).collect(),
        shipment_date,
    })
}
