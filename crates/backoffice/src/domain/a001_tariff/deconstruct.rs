use contracts::domain::a001_tariff::aggregate::{BracketRecord, DriverCommission, TariffRecord};
use contracts::domain::a004_vehicle_type::aggregate::VehicleType;

use super::form::{CommissionRow, TariffForm, TariffTier, WeightRange};
use crate::shared::numbers::{format_number, is_set};

/// Заполнить форму из сохранённого тарифа (режим редактирования).
///
/// Комиссии строятся по одной строке на каждый известный тип транспорта;
/// пока справочник не загружен, список комиссий пуст.
pub fn deconstruct_tariff(record: &TariffRecord, vehicle_types: &[VehicleType]) -> TariffForm {
    let mut form = TariffForm {
        name: record.name.clone(),
        scope: record.scope,
        profit_margin: record.profit_value(),
        ..TariffForm::default()
    };

    for tier in TariffTier::all() {
        let service_type = tier.service_type();
        form.set_base_fee(
            tier,
            record.service_type(service_type).and_then(|st| st.base_fee),
        );
        *form.weight_ranges_mut(tier) = record
            .brackets_for(service_type)
            .iter()
            .map(to_weight_range)
            .collect();
    }

    form.driver_commission = vehicle_types
        .iter()
        .map(|vt| saved_row(vt, Some(record)))
        .collect();

    form
}

/// Перестроить только строки комиссий под текущий справочник.
///
/// Строки, которые оператор уже редактировал, сохраняются; новые типы
/// заполняются из сохранённого тарифа или остаются пустыми; строки
/// исчезнувших типов удаляются. Остальные поля формы не меняются.
pub fn refresh_commission_skeleton(
    form: &mut TariffForm,
    vehicle_types: &[VehicleType],
    record: Option<&TariffRecord>,
) {
    let mut previous = std::mem::take(&mut form.driver_commission);
    form.driver_commission = vehicle_types
        .iter()
        .map(|vt| {
            match previous.iter().position(|row| row.category == vt.id) {
                Some(index) => previous.swap_remove(index),
                None => saved_row(vt, record),
            }
        })
        .collect();
}

fn saved_row(vehicle_type: &VehicleType, record: Option<&TariffRecord>) -> CommissionRow {
    match record.and_then(|r| r.commission_for(&vehicle_type.id)) {
        Some(saved) => to_commission_row(saved),
        None => CommissionRow::empty(vehicle_type),
    }
}

fn to_commission_row(saved: &DriverCommission) -> CommissionRow {
    let defined = |value: Option<f64>| value.filter(|_| is_set(value));
    CommissionRow {
        category: saved.vehicle_type_id.clone(),
        fixed_cost: defined(saved.fixed),
        driver_cost: defined(saved.per_km),
        percentage: defined(saved.percentage),
    }
}

fn to_weight_range(bracket: &BracketRecord) -> WeightRange {
    let max_kg = bracket.max_kg.unwrap_or(bracket.min_kg + 1.0);
    WeightRange::new(
        format_number(bracket.min_kg),
        format_number(max_kg),
        format_number(bracket.rate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_tariff::builder::build_tariff;

    fn catalog() -> Vec<VehicleType> {
        vec![
            VehicleType { id: "v1".into(), name: "Van".into() },
            VehicleType { id: "v2".into(), name: "Truck".into() },
        ]
    }

    fn saved() -> TariffRecord {
        serde_json::from_value(serde_json::json!({
            "id": "t-1",
            "profit": 18,
            "serviceTypes": [
                {"id": "a", "serviceType": "STANDARD", "baseFee": "99.5",
                 "airportFee": {"brackets": [{"minKg": 0, "maxKg": 5, "rate": 4}, {"minKg": 5, "rate": 9}]}},
                {"id": "b", "serviceType": "EXPRESS", "baseFee": 150,
                 "airportFee": {"brackets": []}}
            ],
            "driverCommissions": [
                {"vehicleTypeId": "v2", "perKm": "1.5", "fixed": 0},
                {"vehicleTypeId": "v-retired", "fixed": 10}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_deconstruct_reads_fees_ranges_and_profit() {
        let form = deconstruct_tariff(&saved(), &catalog());
        assert_eq!(form.standard, Some(99.5));
        assert_eq!(form.same_day, Some(150.0));
        assert_eq!(form.overnight, None);
        assert_eq!(form.profit_margin, Some(18.0));
        assert_eq!(
            form.standard_weight_ranges,
            vec![WeightRange::new("0", "5", "4"), WeightRange::new("5", "6", "9")]
        );
        assert!(form.same_day_weight_ranges.is_empty());
    }

    #[test]
    fn test_one_row_per_known_vehicle_type() {
        let form = deconstruct_tariff(&saved(), &catalog());
        assert_eq!(
            form.driver_commission,
            vec![
                CommissionRow { category: "v1".into(), ..CommissionRow::default() },
                CommissionRow {
                    category: "v2".into(),
                    fixed_cost: None,
                    driver_cost: Some(1.5),
                    percentage: None,
                },
            ]
        );
    }

    #[test]
    fn test_refresh_preserves_unrelated_edits() {
        let record = saved();
        let mut form = deconstruct_tariff(&record, &[]);
        assert!(form.driver_commission.is_empty());

        form.standard = Some(1.0);
        form.append_weight_range(TariffTier::Standard, 5.0);
        let before = form.clone();

        refresh_commission_skeleton(&mut form, &catalog(), Some(&record));
        assert_eq!(form.driver_commission.len(), 2);
        assert_eq!(form.driver_commission[1].driver_cost, Some(1.5));
        assert_eq!(form.standard, Some(1.0));
        assert_eq!(form.standard_weight_ranges, before.standard_weight_ranges);

        form.commission_mut("v1").unwrap().percentage = Some(7.0);
        let reordered = vec![catalog()[1].clone(), catalog()[0].clone()];
        refresh_commission_skeleton(&mut form, &reordered, Some(&record));
        assert_eq!(form.driver_commission[0].category, "v2");
        assert_eq!(form.driver_commission[1].percentage, Some(7.0));

        refresh_commission_skeleton(&mut form, &reordered[..1], Some(&record));
        assert_eq!(form.driver_commission.len(), 1);
    }

    #[test]
    fn test_build_then_deconstruct_round_trip() {
        let mut form = TariffForm::new(5.0);
        form.standard = Some(100.0);
        form.same_day = Some(175.25);
        form.overnight = Some(0.0);
        form.profit_margin = Some(12.0);
        form.standard_weight_ranges[0].price = "10".into();
        form.append_weight_range(TariffTier::Standard, 5.0);
        form.standard_weight_ranges[1].price = "12.5".into();
        form.same_day_weight_ranges[0].price = "30".into();
        form.overnight_weight_ranges[0].price = "0".into();
        refresh_commission_skeleton(&mut form, &catalog(), None);
        form.commission_mut("v1").unwrap().fixed_cost = Some(0.0);
        form.commission_mut("v2").unwrap().percentage = Some(3.0);

        let payload = build_tariff(&form, None).unwrap();
        let record: TariffRecord =
            serde_json::from_value(serde_json::to_value(&payload).unwrap()).unwrap();
        let restored = deconstruct_tariff(&record, &catalog());

        assert_eq!(restored.standard, form.standard);
        assert_eq!(restored.same_day, form.same_day);
        assert_eq!(restored.overnight, form.overnight);
        assert_eq!(restored.profit_margin, form.profit_margin);
        for tier in TariffTier::all() {
            assert_eq!(restored.weight_ranges(tier), form.weight_ranges(tier));
        }
        assert_eq!(restored.driver_commission[0], CommissionRow {
            category: "v1".into(),
            ..CommissionRow::default()
        });
        assert_eq!(restored.driver_commission[1].percentage, Some(3.0));

        // повторная отправка без изменений даёт тот же payload
        assert_eq!(build_tariff(&restored, None).unwrap(), payload);
    }
}
