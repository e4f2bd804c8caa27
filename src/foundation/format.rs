/// Format `value` in scientific notation with `precision` mantissa decimals and a signed,
/// at-least-two-digit exponent (`1.5e+03`, `2.000000e-05`).
pub fn scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exp)) = raw.split_once('e') else {
        return raw;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return raw;
    };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

/// Fixed-point notation with `precision` decimals.
pub fn fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}
