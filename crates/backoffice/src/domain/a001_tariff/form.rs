use contracts::domain::a004_vehicle_type::aggregate::VehicleType;
use contracts::enums::{ServiceType, ShippingScope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::shared::numbers::{format_number, parse_number};

/// Уровень тарифа в форме. `SameDay` уходит на сервер как `EXPRESS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TariffTier {
    Standard,
    SameDay,
    Overnight,
}

impl TariffTier {
    pub fn all() -> [TariffTier; 3] {
        [TariffTier::Standard, TariffTier::SameDay, TariffTier::Overnight]
    }

    pub fn service_type(&self) -> ServiceType {
        match self {
            TariffTier::Standard => ServiceType::Standard,
            TariffTier::SameDay => ServiceType::Express,
            TariffTier::Overnight => ServiceType::Overnight,
        }
    }

    /// Имя поля базовой стоимости
    pub fn fee_field(&self) -> &'static str {
        match self {
            TariffTier::Standard => "standard",
            TariffTier::SameDay => "sameDay",
            TariffTier::Overnight => "overnight",
        }
    }

    /// Имя поля списка весовых диапазонов
    pub fn ranges_field(&self) -> &'static str {
        match self {
            TariffTier::Standard => "standardWeightRanges",
            TariffTier::SameDay => "sameDayWeightRanges",
            TariffTier::Overnight => "overnightWeightRanges",
        }
    }
}

/// Строка весового диапазона в том виде, как её ввёл оператор
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeightRange {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub price: String,
}

impl WeightRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            price: price.into(),
        }
    }
}

/// Строка комиссии водителя для одного типа транспорта
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRow {
    /// Идентификатор типа транспорта
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<f64>,
    /// Ставка за километр
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl CommissionRow {
    /// Пустая строка для типа транспорта
    pub fn empty(vehicle_type: &VehicleType) -> Self {
        Self {
            category: vehicle_type.id.clone(),
            ..Self::default()
        }
    }
}

/// Состояние формы тарифа
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ShippingScope>,

    #[serde(default)]
    pub standard: Option<f64>,
    #[serde(default)]
    pub same_day: Option<f64>,
    #[serde(default)]
    pub overnight: Option<f64>,

    #[serde(default)]
    pub standard_weight_ranges: Vec<WeightRange>,
    #[serde(default)]
    pub same_day_weight_ranges: Vec<WeightRange>,
    #[serde(default)]
    pub overnight_weight_ranges: Vec<WeightRange>,

    #[serde(default)]
    pub profit_margin: Option<f64>,

    #[serde(default)]
    pub driver_commission: Vec<CommissionRow>,
}

impl TariffForm {
    /// Новая форма: по одной пустой строке диапазона `0..step` на уровень
    pub fn new(step: f64) -> Self {
        let first = || vec![WeightRange::new("0", format_number(step), "")];
        Self {
            standard_weight_ranges: first(),
            same_day_weight_ranges: first(),
            overnight_weight_ranges: first(),
            ..Self::default()
        }
    }

    pub fn base_fee(&self, tier: TariffTier) -> Option<f64> {
        match tier {
            TariffTier::Standard => self.standard,
            TariffTier::SameDay => self.same_day,
            TariffTier::Overnight => self.overnight,
        }
    }

    pub fn set_base_fee(&mut self, tier: TariffTier, value: Option<f64>) {
        match tier {
            TariffTier::Standard => self.standard = value,
            TariffTier::SameDay => self.same_day = value,
            TariffTier::Overnight => self.overnight = value,
        }
    }

    pub fn weight_ranges(&self, tier: TariffTier) -> &[WeightRange] {
        match tier {
            TariffTier::Standard => &self.standard_weight_ranges,
            TariffTier::SameDay => &self.same_day_weight_ranges,
            TariffTier::Overnight => &self.overnight_weight_ranges,
        }
    }

    pub fn weight_ranges_mut(&mut self, tier: TariffTier) -> &mut Vec<WeightRange> {
        match tier {
            TariffTier::Standard => &mut self.standard_weight_ranges,
            TariffTier::SameDay => &mut self.same_day_weight_ranges,
            TariffTier::Overnight => &mut self.overnight_weight_ranges,
        }
    }

    /// Добавить диапазон, продолжающий последний: `[last.to, last.to + step)`.
    ///
    /// Если верхняя граница последней строки не число, отсчёт идёт от нуля.
    pub fn append_weight_range(&mut self, tier: TariffTier, step: f64) -> &WeightRange {
        let ranges = self.weight_ranges_mut(tier);
        let start = ranges
            .last()
            .and_then(|last| parse_number(&last.to))
            .unwrap_or(0.0);
        ranges.push(WeightRange::new(
            format_number(start),
            format_number(start + step),
            "",
        ));
        &ranges[ranges.len() - 1]
    }

    /// Удалить строки с указанными индексами за одну операцию
    pub fn delete_weight_ranges(&mut self, tier: TariffTier, indices: &BTreeSet<usize>) {
        let ranges = self.weight_ranges_mut(tier);
        let mut index = 0;
        ranges.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
    }

    pub fn commission_mut(&mut self, vehicle_type_id: &str) -> Option<&mut CommissionRow> {
        self.driver_commission
            .iter_mut()
            .find(|row| row.category == vehicle_type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_continues_from_last_upper_bound() {
        let mut form = TariffForm::default();
        form.standard_weight_ranges = vec![WeightRange::new("1", "3", "10")];

        let added = form.append_weight_range(TariffTier::Standard, 5.0).clone();
        assert_eq!(added, WeightRange::new("3", "8", ""));
        assert_eq!(form.standard_weight_ranges.len(), 2);
        assert!(form.same_day_weight_ranges.is_empty());
    }

    #[test]
    fn test_append_to_empty_and_fractional() {
        let mut form = TariffForm::default();
        form.append_weight_range(TariffTier::Overnight, 2.5);
        form.append_weight_range(TariffTier::Overnight, 2.5);
        assert_eq!(
            form.overnight_weight_ranges,
            vec![WeightRange::new("0", "2.5", ""), WeightRange::new("2.5", "5", "")]
        );
    }

    #[test]
    fn test_delete_selected_rows_only_in_one_list() {
        let mut form = TariffForm::new(5.0);
        for _ in 0..3 {
            form.append_weight_range(TariffTier::SameDay, 5.0);
        }
        assert_eq!(form.same_day_weight_ranges.len(), 4);

        form.delete_weight_ranges(TariffTier::SameDay, &BTreeSet::from([0, 2, 9]));
        assert_eq!(
            form.same_day_weight_ranges,
            vec![WeightRange::new("5", "10", ""), WeightRange::new("15", "20", "")]
        );
        assert_eq!(form.standard_weight_ranges.len(), 1);
        assert_eq!(form.overnight_weight_ranges.len(), 1);
    }

    #[test]
    fn test_tier_mapping() {
        assert_eq!(TariffTier::SameDay.service_type(), ServiceType::Express);
        assert_eq!(TariffTier::SameDay.fee_field(), "sameDay");
        assert_eq!(TariffTier::Overnight.ranges_field(), "overnightWeightRanges");
    }

    #[test]
    fn test_form_json_field_names() {
        let form: TariffForm = serde_json::from_str(
            r#"{"standard": 10, "sameDay": 20, "profitMargin": 15,
                "sameDayWeightRanges": [{"from": "0", "to": "5", "price": "7"}],
                "driverCommission": [{"category": "v1", "fixedCost": 50}]}"#,
        )
        .unwrap();
        assert_eq!(form.same_day, Some(20.0));
        assert_eq!(form.overnight, None);
        assert_eq!(form.same_day_weight_ranges[0].price, "7");
        assert_eq!(form.driver_commission[0].fixed_cost, Some(50.0));
    }
}
