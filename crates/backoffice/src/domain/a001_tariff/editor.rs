use contracts::domain::a001_tariff::aggregate::TariffRecord;
use contracts::domain::a004_vehicle_type::aggregate::VehicleType;
use std::collections::BTreeSet;

use super::builder::build_tariff;
use super::deconstruct::{deconstruct_tariff, refresh_commission_skeleton};
use super::form::{TariffForm, TariffTier};
use crate::shared::api_client::BackofficeApi;
use crate::shared::error::{ApiError, FieldError, SubmitError, ValidationErrors};
use crate::shared::generation::{RequestGeneration, Ticket};

pub const SAVE_FAILED: &str = "Failed to save tariff";
pub const CATALOG_FAILED: &str = "Failed to load vehicle types";
const SAVED: &str = "Tariff saved";

#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    Create,
    Edit(TariffRecord),
}

/// Сессия формы тарифа: создание или редактирование.
///
/// Владеет состоянием формы и справочником типов транспорта. Ответы на
/// устаревшие запросы справочника отбрасываются.
#[derive(Debug)]
pub struct TariffEditor {
    mode: EditorMode,
    form: TariffForm,
    vehicle_types: Option<Vec<VehicleType>>,
    catalog_generation: RequestGeneration,
    weight_range_step: f64,
    last_error: Option<String>,
}

pub type TariffSubmitError = SubmitError<ValidationErrors>;

impl TariffEditor {
    pub fn create(weight_range_step: f64) -> Self {
        Self::with_mode(EditorMode::Create, TariffForm::new(weight_range_step), weight_range_step)
    }

    /// Редактирование: форма заполняется сразу, комиссии после загрузки справочника
    pub fn edit(record: TariffRecord, weight_range_step: f64) -> Self {
        let form = deconstruct_tariff(&record, &[]);
        Self::with_mode(EditorMode::Edit(record), form, weight_range_step)
    }

    fn with_mode(mode: EditorMode, form: TariffForm, weight_range_step: f64) -> Self {
        Self {
            mode,
            form,
            vehicle_types: None,
            catalog_generation: RequestGeneration::new(),
            weight_range_step,
            last_error: None,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn is_edit_mode(&self) -> bool {
        matches!(self.mode, EditorMode::Edit(_))
    }

    pub fn form(&self) -> &TariffForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TariffForm {
        &mut self.form
    }

    pub fn vehicle_types(&self) -> Option<&[VehicleType]> {
        self.vehicle_types.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record(&self) -> Option<&TariffRecord> {
        match &self.mode {
            EditorMode::Create => None,
            EditorMode::Edit(record) => Some(record),
        }
    }

    pub fn begin_catalog_load(&mut self) -> Ticket {
        self.catalog_generation.begin()
    }

    /// Применить загруженный справочник. Возвращает `false`, если ответ устарел.
    pub fn on_catalog_loaded(&mut self, ticket: Ticket, vehicle_types: Vec<VehicleType>) -> bool {
        if !self.catalog_generation.is_current(ticket) {
            tracing::warn!("Dropping stale vehicle type catalog response");
            return false;
        }
        let record = match &self.mode {
            EditorMode::Create => None,
            EditorMode::Edit(record) => Some(record),
        };
        refresh_commission_skeleton(&mut self.form, &vehicle_types, record);
        tracing::info!("Vehicle type catalog loaded: {} types", vehicle_types.len());
        self.vehicle_types = Some(vehicle_types);
        true
    }

    pub fn on_catalog_failed(&mut self, ticket: Ticket, error: &ApiError) {
        if self.catalog_generation.is_current(ticket) {
            self.last_error = Some(error.user_message(CATALOG_FAILED));
        }
    }

    /// Загрузить справочник целиком: запрос и применение ответа
    pub async fn load_catalog(&mut self, api: &dyn BackofficeApi, limit: u32) -> Result<(), ApiError> {
        let ticket = self.begin_catalog_load();
        match api.fetch_vehicle_types(limit).await {
            Ok(types) => {
                self.on_catalog_loaded(ticket, types);
                Ok(())
            }
            Err(e) => {
                self.on_catalog_failed(ticket, &e);
                Err(e)
            }
        }
    }

    pub fn append_weight_range(&mut self, tier: TariffTier) {
        let step = self.weight_range_step;
        self.form.append_weight_range(tier, step);
    }

    pub fn delete_weight_ranges(&mut self, tier: TariffTier, indices: &BTreeSet<usize>) {
        self.form.delete_weight_ranges(tier, indices);
    }

    /// Отправить тариф. Проверка формы выполняется до любого сетевого вызова;
    /// при ошибке форма остаётся заполненной.
    pub async fn submit(&mut self, api: &dyn BackofficeApi) -> Result<String, TariffSubmitError> {
        let result = self.try_submit(api).await;
        self.last_error = result.as_ref().err().map(|e| e.user_message());
        result
    }

    async fn try_submit(&self, api: &dyn BackofficeApi) -> Result<String, TariffSubmitError> {
        // Без справочника комиссии формы пусты, и PATCH стёр бы сохранённые
        if self.is_edit_mode() && self.vehicle_types.is_none() {
            return Err(SubmitError::Invalid(ValidationErrors(vec![FieldError::new(
                "driverCommission",
                "Справочник типов транспорта ещё не загружен",
            )])));
        }
        let payload = build_tariff(&self.form, self.record()).map_err(SubmitError::Invalid)?;
        tracing::debug!(
            "Tariff payload: {}",
            serde_json::to_string(&payload).unwrap_or_default()
        );

        let response = match self.record() {
            None => api.create_tariff(&payload).await,
            Some(record) => {
                let id = record.id.as_deref().ok_or_else(|| {
                    SubmitError::Invalid(ValidationErrors(vec![FieldError::new(
                        "id",
                        "Тариф не имеет идентификатора",
                    )]))
                })?;
                api.update_tariff(id, &payload).await
            }
        }
        .map_err(|e| SubmitError::api(e, SAVE_FAILED))?;

        let message = response.message.unwrap_or_else(|| SAVED.to_string());
        tracing::info!("Tariff submitted: {}", message);
        Ok(message)
    }
}
