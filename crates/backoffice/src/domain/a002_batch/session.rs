use chrono::NaiveDate;
use contracts::domain::a002_batch::aggregate::CreateBatchRequest;
use contracts::domain::a003_order::aggregate::{Order, RawGroupedOrders};
use contracts::domain::a005_branch::aggregate::Branch;
use contracts::enums::{ServiceType, ShippingScope};
use std::collections::BTreeMap;

use super::composer::{assemble_batch, BatchDraft, BatchError, CompositionPolicy};
use super::grouping::GroupedOrders;
use crate::shared::api_client::BackofficeApi;
use crate::shared::error::{ApiError, SubmitError};
use crate::shared::generation::{RequestGeneration, Ticket};

pub const CREATE_FAILED: &str = "Failed to create batch";
pub const ORDERS_FAILED: &str = "Failed to load orders";
pub const BRANCHES_FAILED: &str = "Failed to load branches";

pub type BatchSubmitError = SubmitError<BatchError>;

/// Этап формы создания партии
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStage {
    Loading,
    ScopeUnselected,
    ServiceTypeUnselected,
    Selecting,
    Submitting,
    Succeeded { batch_code: String },
}

/// Сессия формы создания партии
#[derive(Debug)]
pub struct BatchComposer {
    grouped: Option<GroupedOrders>,
    branches: Option<Vec<Branch>>,
    draft: BatchDraft,
    policy: CompositionPolicy,
    orders_generation: RequestGeneration,
    branches_generation: RequestGeneration,
    submitting: bool,
    batch_code: Option<String>,
    last_error: Option<String>,
}

impl BatchComposer {
    pub fn new(policy: CompositionPolicy) -> Self {
        Self {
            grouped: None,
            branches: None,
            draft: BatchDraft::default(),
            policy,
            orders_generation: RequestGeneration::new(),
            branches_generation: RequestGeneration::new(),
            submitting: false,
            batch_code: None,
            last_error: None,
        }
    }

    pub fn stage(&self) -> BatchStage {
        if let Some(batch_code) = &self.batch_code {
            return BatchStage::Succeeded {
                batch_code: batch_code.clone(),
            };
        }
        if self.submitting {
            return BatchStage::Submitting;
        }
        match (&self.grouped, self.draft.scope, self.draft.service_type) {
            (None, _, _) => BatchStage::Loading,
            (Some(_), None, _) => BatchStage::ScopeUnselected,
            (Some(_), Some(_), None) => BatchStage::ServiceTypeUnselected,
            (Some(_), Some(_), Some(_)) => BatchStage::Selecting,
        }
    }

    pub fn draft(&self) -> &BatchDraft {
        &self.draft
    }

    pub fn grouped(&self) -> Option<&GroupedOrders> {
        self.grouped.as_ref()
    }

    pub fn branches(&self) -> &[Branch] {
        self.branches.as_deref().unwrap_or(&[])
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ------------------------------------------------------------------
    // Загрузка данных
    // ------------------------------------------------------------------

    pub fn begin_orders_load(&mut self) -> Ticket {
        self.orders_generation.begin()
    }

    /// Применить сгруппированные заказы. Возвращает `false`, если ответ устарел.
    pub fn on_orders_loaded(&mut self, ticket: Ticket, raw: RawGroupedOrders) -> bool {
        if !self.orders_generation.is_current(ticket) {
            tracing::warn!("Dropping stale categorized orders response");
            return false;
        }
        let grouped = GroupedOrders::from_wire(raw);
        tracing::info!(
            "Categorized orders loaded: {:?}",
            grouped.scope_totals()
        );
        self.grouped = Some(grouped);
        true
    }

    pub fn on_orders_failed(&mut self, ticket: Ticket, error: &ApiError) {
        if self.orders_generation.is_current(ticket) {
            self.last_error = Some(error.user_message(ORDERS_FAILED));
        }
    }

    pub fn begin_branches_load(&mut self) -> Ticket {
        self.branches_generation.begin()
    }

    pub fn on_branches_loaded(&mut self, ticket: Ticket, branches: Vec<Branch>) -> bool {
        if !self.branches_generation.is_current(ticket) {
            tracing::warn!("Dropping stale branch list response");
            return false;
        }
        self.branches = Some(branches);
        true
    }

    pub fn on_branches_failed(&mut self, ticket: Ticket, error: &ApiError) {
        if self.branches_generation.is_current(ticket) {
            self.last_error = Some(error.user_message(BRANCHES_FAILED));
        }
    }

    /// Загрузить заказы и филиалы
    pub async fn load(
        &mut self,
        api: &dyn BackofficeApi,
        orders_page_size: u32,
        branches_page_size: u32,
    ) -> Result<(), ApiError> {
        let orders_ticket = self.begin_orders_load();
        let branches_ticket = self.begin_branches_load();
        let (orders, branches) = tokio::join!(
            api.fetch_categorized_orders(orders_page_size),
            api.fetch_branches(branches_page_size)
        );

        // Ответы применяются независимо: ошибка филиалов не отменяет заказы
        let orders = match orders {
            Ok(raw) => {
                self.on_orders_loaded(orders_ticket, raw);
                Ok(())
            }
            Err(e) => {
                self.on_orders_failed(orders_ticket, &e);
                Err(e)
            }
        };
        let branches = match branches {
            Ok(list) => {
                self.on_branches_loaded(branches_ticket, list);
                Ok(())
            }
            Err(e) => {
                self.on_branches_failed(branches_ticket, &e);
                Err(e)
            }
        };
        orders.and(branches)
    }

    // ------------------------------------------------------------------
    // Выбор области, типа услуги и заказов
    // ------------------------------------------------------------------

    /// Счётчики по областям для селектора
    pub fn scope_totals(&self) -> BTreeMap<ShippingScope, usize> {
        self.grouped
            .as_ref()
            .map(GroupedOrders::scope_totals)
            .unwrap_or_default()
    }

    /// Счётчики по типам услуги выбранной области
    pub fn service_type_counts(&self) -> BTreeMap<ServiceType, usize> {
        match (&self.grouped, self.draft.scope) {
            (Some(grouped), Some(scope)) => grouped.service_type_counts(scope),
            _ => BTreeMap::new(),
        }
    }

    /// Выбрать область. Пустые области недоступны.
    /// Смена области сбрасывает тип услуги, отметки заказов сохраняются.
    pub fn select_scope(&mut self, scope: ShippingScope) -> bool {
        let available = self
            .grouped
            .as_ref()
            .is_some_and(|g| g.is_scope_available(scope));
        if !available {
            return false;
        }
        if self.draft.scope != Some(scope) {
            self.draft.scope = Some(scope);
            self.draft.service_type = None;
        }
        true
    }

    pub fn select_service_type(&mut self, service_type: ServiceType) -> bool {
        let available = match (&self.grouped, self.draft.scope) {
            (Some(grouped), Some(scope)) => grouped.is_service_type_available(scope, service_type),
            _ => false,
        };
        if available {
            self.draft.service_type = Some(service_type);
        }
        available
    }

    /// Текущий рабочий набор заказов
    pub fn visible_orders(&self) -> Vec<&Order> {
        match (&self.grouped, self.draft.scope, self.draft.service_type) {
            (Some(grouped), Some(scope), Some(service_type)) => {
                grouped.working_set(scope, service_type)
            }
            _ => Vec::new(),
        }
    }

    /// Переключить отметку заказа из рабочего набора
    pub fn toggle_order(&mut self, id: &str) -> Option<bool> {
        let visible = self.visible_orders().iter().any(|o| o.id == id);
        visible.then(|| self.draft.selection.toggle(id))
    }

    /// Отметить заказ из рабочего набора; повторный вызов ничего не меняет
    pub fn select_order(&mut self, id: &str) -> bool {
        let visible = self.visible_orders().iter().any(|o| o.id == id);
        if visible {
            self.draft.selection.select(id);
        }
        visible
    }

    pub fn select_all_visible(&mut self) {
        let Some(grouped) = &self.grouped else { return };
        if let (Some(scope), Some(service_type)) = (self.draft.scope, self.draft.service_type) {
            let visible = grouped.working_set(scope, service_type);
            self.draft.selection.select_all(&visible);
        }
    }

    pub fn deselect_all_visible(&mut self) {
        let Some(grouped) = &self.grouped else { return };
        if let (Some(scope), Some(service_type)) = (self.draft.scope, self.draft.service_type) {
            let visible = grouped.working_set(scope, service_type);
            self.draft.selection.deselect_all(&visible);
        }
    }

    /// Число отмеченных заказов из рабочего набора
    pub fn selected_visible_count(&self) -> usize {
        self.visible_orders()
            .iter()
            .filter(|o| self.draft.selection.contains(&o.id))
            .count()
    }

    /// Выбрать филиал назначения; если список филиалов загружен, id должен быть в нём
    pub fn set_destination(&mut self, branch_id: &str) -> bool {
        let known = self
            .branches
            .as_ref()
            .map_or(true, |list| list.iter().any(|b| b.id == branch_id));
        if known {
            self.draft.destination_id = Some(branch_id.to_string());
        }
        known
    }

    pub fn set_shipment_date(&mut self, date: NaiveDate) {
        self.draft.shipment_date = Some(date);
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.draft.notes = Some(notes.to_string());
    }

    pub fn add_category(&mut self, tag: &str) -> bool {
        self.draft.add_category(tag)
    }

    pub fn remove_category(&mut self, tag: &str) {
        self.draft.remove_category(tag);
    }

    // ------------------------------------------------------------------
    // Отправка
    // ------------------------------------------------------------------

    /// Проверить черновик и перейти в `Submitting`
    pub fn begin_submit(&mut self) -> Result<CreateBatchRequest, BatchSubmitError> {
        if let Some(batch_code) = &self.batch_code {
            return Err(SubmitError::Invalid(BatchError::AlreadyCreated {
                batch_code: batch_code.clone(),
            }));
        }
        let empty = GroupedOrders::default();
        let grouped = self.grouped.as_ref().unwrap_or(&empty);
        match assemble_batch(&self.draft, grouped, self.policy) {
            Ok(request) => {
                self.submitting = true;
                self.last_error = None;
                Ok(request)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(SubmitError::Invalid(e))
            }
        }
    }

    /// Завершить отправку. При ошибке возвращаемся к выбору, всё сохраняется.
    pub fn finish_submit(
        &mut self,
        result: Result<String, ApiError>,
    ) -> Result<String, BatchSubmitError> {
        self.submitting = false;
        match result {
            Ok(batch_code) => {
                tracing::info!("Batch created: {}", batch_code);
                self.batch_code = Some(batch_code.clone());
                Ok(batch_code)
            }
            Err(e) => {
                let err = SubmitError::api(e, CREATE_FAILED);
                self.last_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn submit(&mut self, api: &dyn BackofficeApi) -> Result<String, BatchSubmitError> {
        let request = self.begin_submit()?;
        let result = api
            .create_batch(&request)
            .await
            .map(|created| created.batch_code);
        self.finish_submit(result)
    }
}
