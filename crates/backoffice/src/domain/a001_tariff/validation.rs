use super::form::{TariffForm, TariffTier, WeightRange};
use crate::shared::error::{FieldError, ValidationErrors};
use crate::shared::numbers::parse_number;

const REQUIRED: &str = "Обязательное поле";
const NEGATIVE: &str = "Значение не может быть отрицательным";
const NOT_A_NUMBER: &str = "Должно быть числом";

/// Проверить форму тарифа перед отправкой.
///
/// Возвращает все найденные ошибки сразу, по одной на поле.
pub fn validate_tariff_form(form: &TariffForm) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    for tier in TariffTier::all() {
        check_amount(tier.fee_field(), form.base_fee(tier), &mut errors);
    }

    check_amount("profitMargin", form.profit_margin, &mut errors);
    if let Some(profit) = form.profit_margin {
        if profit > 100.0 {
            errors.push(FieldError::new(
                "profitMargin",
                "Маржа не может превышать 100%",
            ));
        }
    }

    for tier in TariffTier::all() {
        for (index, range) in form.weight_ranges(tier).iter().enumerate() {
            check_range(tier, index, range, &mut errors);
        }
    }

    for row in &form.driver_commission {
        let fields = [
            ("fixedCost", row.fixed_cost),
            ("driverCost", row.driver_cost),
            ("percentage", row.percentage),
        ];
        for (name, value) in fields {
            if matches!(value, Some(v) if !v.is_finite() || v < 0.0) {
                errors.push(FieldError::new(
                    format!("driverCommission[{}].{}", row.category, name),
                    NEGATIVE,
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn check_amount(field: &str, value: Option<f64>, errors: &mut Vec<FieldError>) {
    match value {
        None => errors.push(FieldError::new(field, REQUIRED)),
        Some(v) if !v.is_finite() => errors.push(FieldError::new(field, NOT_A_NUMBER)),
        Some(v) if v < 0.0 => errors.push(FieldError::new(field, NEGATIVE)),
        Some(_) => {}
    }
}

fn check_range(tier: TariffTier, index: usize, range: &WeightRange, errors: &mut Vec<FieldError>) {
    let prefix = format!("{}[{}]", tier.ranges_field(), index);
    let mut parse = |name: &str, raw: &str| -> Option<f64> {
        let field = format!("{}.{}", prefix, name);
        match parse_number(raw) {
            None => {
                errors.push(FieldError::new(field, NOT_A_NUMBER));
                None
            }
            Some(v) if v < 0.0 => {
                errors.push(FieldError::new(field, NEGATIVE));
                None
            }
            Some(v) => Some(v),
        }
    };

    let from = parse("from", &range.from);
    let to = parse("to", &range.to);
    parse("price", &range.price);

    if let (Some(from), Some(to)) = (from, to) {
        if to < from {
            errors.push(FieldError::new(
                format!("{}.to", prefix),
                "Верхняя граница меньше нижней",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> TariffForm {
        TariffForm {
            standard: Some(100.0),
            same_day: Some(150.0),
            overnight: Some(0.0),
            profit_margin: Some(10.0),
            standard_weight_ranges: vec![WeightRange::new("0", "5", "10")],
            ..TariffForm::default()
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(validate_tariff_form(&valid_form()).is_ok());
    }

    #[test]
    fn test_profit_over_hundred_rejected() {
        let mut form = valid_form();
        form.profit_margin = Some(150.0);
        let errors = validate_tariff_form(&form).unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "profitMargin");
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let errors = validate_tariff_form(&TariffForm::default()).unwrap_err();
        let fields: Vec<&str> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["standard", "sameDay", "overnight", "profitMargin"]);
    }

    #[test]
    fn test_negative_fee_rejected() {
        let mut form = valid_form();
        form.same_day = Some(-1.0);
        let errors = validate_tariff_form(&form).unwrap_err();
        assert_eq!(errors.for_field("sameDay").unwrap().message, NEGATIVE);
    }

    #[test]
    fn test_bracket_fields_must_be_numbers() {
        let mut form = valid_form();
        form.overnight_weight_ranges = vec![
            WeightRange::new("0", "5", ""),
            WeightRange::new("10", "5", "3"),
        ];
        let errors = validate_tariff_form(&form).unwrap_err();
        assert!(errors.for_field("overnightWeightRanges[0].price").is_some());
        assert!(errors.for_field("overnightWeightRanges[1].to").is_some());
        assert_eq!(errors.0.len(), 2);
    }
}
