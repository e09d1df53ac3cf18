//! Tính BMI từ chiều cao (cm) và cân nặng (kg).

/// BMI làm tròn một chữ số thập phân; `None` nếu thiếu hoặc không dương.
pub fn compute(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if !(height_cm.is_finite() && weight_kg.is_finite()) {
        return None;
    }
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }

    let height_m = height_cm / 100.0;
    Some(round1(weight_kg / (height_m * height_m)))
}

/// Làm tròn nửa xa số 0, một chữ số thập phân.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_example() {
        assert_eq!(compute(165.0, 60.0), Some(22.0));
        assert_eq!(compute(172.0, 68.0), Some(23.0));
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert_eq!(compute(0.0, 60.0), None);
        assert_eq!(compute(170.0, -1.0), None);
        assert_eq!(compute(f64::NAN, 60.0), None);
    }
}
