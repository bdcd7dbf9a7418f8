use contracts::domain::a001_tariff::aggregate::{
    AirportFee, DriverCommission, ServiceTypeFee, Tariff, TariffRecord, WeightBracket,
};

use super::form::{CommissionRow, TariffForm, TariffTier, WeightRange};
use super::validation::validate_tariff_form;
use crate::shared::error::ValidationErrors;
use crate::shared::numbers::{is_set, parse_number};

/// Собрать payload тарифа из формы.
///
/// `existing` задаётся в режиме редактирования: из него берутся
/// `serviceTypeId` каждого типа услуги, имя и область тарифа.
pub fn build_tariff(
    form: &TariffForm,
    existing: Option<&TariffRecord>,
) -> Result<Tariff, ValidationErrors> {
    validate_tariff_form(form)?;

    let service_types = TariffTier::all()
        .iter()
        .map(|tier| {
            let service_type = tier.service_type();
            ServiceTypeFee {
                service_type_id: existing
                    .and_then(|record| record.service_type(service_type))
                    .and_then(|st| st.record_id())
                    .map(str::to_string),
                service_type,
                base_fee: form.base_fee(*tier).unwrap_or(0.0),
            }
        })
        .collect();

    let airport_fees = TariffTier::all()
        .iter()
        .map(|tier| AirportFee {
            service_type: tier.service_type(),
            brackets: form.weight_ranges(*tier).iter().map(to_bracket).collect(),
        })
        .collect();

    let driver_commissions = form
        .driver_commission
        .iter()
        .filter_map(to_commission)
        .collect();

    Ok(Tariff {
        name: form
            .name
            .clone()
            .or_else(|| existing.and_then(|record| record.name.clone())),
        scope: form.scope.or_else(|| existing.and_then(|record| record.scope)),
        service_types,
        airport_fees,
        driver_commissions,
        profit: form.profit_margin.unwrap_or(0.0),
    })
}

fn to_bracket(range: &WeightRange) -> WeightBracket {
    WeightBracket {
        min_kg: parse_number(&range.from).unwrap_or(0.0),
        max_kg: parse_number(&range.to).unwrap_or(0.0),
        rate: parse_number(&range.price).unwrap_or(0.0),
    }
}

/// Строка попадает в payload, только если хотя бы одно поле задано и не ноль;
/// копируются только такие поля.
fn to_commission(row: &CommissionRow) -> Option<DriverCommission> {
    let keep = |value: Option<f64>| value.filter(|_| is_set(value));
    let commission = DriverCommission {
        vehicle_type_id: row.category.clone(),
        fixed: keep(row.fixed_cost),
        per_km: keep(row.driver_cost),
        percentage: keep(row.percentage),
    };
    let configured =
        commission.fixed.is_some() || commission.per_km.is_some() || commission.percentage.is_some();
    configured.then_some(commission)
}
