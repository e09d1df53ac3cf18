//! Gợi ý chế độ dinh dưỡng dựa trên bản ghi khám gần nhất.

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::record::{HealthRecord, Readings};
use crate::CheckupError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NutritionType {
    LowSalt,
    LowSugar,
    LowFat,
    LiverSupport,
}

/// Mỗi quy tắc: loại dinh dưỡng và các ngưỡng (trường, giá trị tối thiểu) kích hoạt nó.
const RULES: [(NutritionType, &[(Field, f64)]); 4] = [
    (
        NutritionType::LowSalt,
        &[
            (Field::BloodPressureSystolic, 130.0),
            (Field::BloodPressureDiastolic, 85.0),
        ],
    ),
    (
        NutritionType::LowSugar,
        &[(Field::BloodSugar, 126.0), (Field::Hba1c, 6.5)],
    ),
    (
        NutritionType::LowFat,
        &[
            (Field::CholesterolTotal, 220.0),
            (Field::CholesterolLdl, 140.0),
            (Field::Triglycerides, 150.0),
        ],
    ),
    (NutritionType::LiverSupport, &[(Field::LiverGpt, 56.0)]),
];

/// Các loại dinh dưỡng phù hợp, không trùng lặp, theo thứ tự quy tắc.
pub fn recommend<R: Readings + ?Sized>(record: &R) -> Vec<NutritionType> {
    RULES
        .iter()
        .filter(|(_, thresholds)| {
            thresholds.iter().any(|(field, threshold)| {
                record
                    .reading(*field)
                    .is_some_and(|value| value >= *threshold)
            })
        })
        .map(|(kind, _)| *kind)
        .collect()
}

/// Gợi ý theo bản ghi có ngày khám mới nhất. Trùng ngày: lấy bản ghi đứng trước.
pub fn recommend_latest(records: &[HealthRecord]) -> Result<Vec<NutritionType>, CheckupError> {
    let latest = records
        .iter()
        .rev()
        .max_by_key(|record| record.date)
        .ok_or(CheckupError::NoRecords)?;
    Ok(recommend(latest))
}
