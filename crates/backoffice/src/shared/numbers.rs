//! Numeric coercion for values typed into form fields.

/// Разобрать число из поля ввода; пустая строка, `NaN` и бесконечности не числа
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Записать число обратно в поле ввода: `8.0` → `"8"`, `2.5` → `"2.5"`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // -0.0 тоже
        return "0".to_string();
    }
    format!("{}", value)
}

/// Число задано и не равно нулю
pub fn is_set(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v != 0.0 && !v.is_nan())
}
