//! Bản ghi khám sức khỏe: bản nháp (builder) và bản ghi đã gửi.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::bmi;
use crate::field::{Field, Gender};
use crate::range::RangeStatus;

/// Truy cập giá trị số theo tên trường chuẩn.
pub trait Readings {
    fn reading(&self, field: Field) -> Option<f64>;
}

/// Các chỉ số số thực, mỗi chỉ số độc lập và có thể vắng mặt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Measurements {
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub pulse: Option<f64>,
    pub blood_sugar: Option<f64>,
    pub hba1c: Option<f64>,
    pub cholesterol_total: Option<f64>,
    pub cholesterol_hdl: Option<f64>,
    pub cholesterol_ldl: Option<f64>,
    pub triglycerides: Option<f64>,
    pub uric_acid: Option<f64>,
    pub liver_got: Option<f64>,
    pub liver_gpt: Option<f64>,
    pub liver_r_gpt: Option<f64>,
}

impl Measurements {
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Age | Field::Gender => None,
            Field::Height => self.height,
            Field::Weight => self.weight,
            Field::Bmi => self.bmi,
            Field::BloodPressureSystolic => self.blood_pressure_systolic,
            Field::BloodPressureDiastolic => self.blood_pressure_diastolic,
            Field::Pulse => self.pulse,
            Field::BloodSugar => self.blood_sugar,
            Field::Hba1c => self.hba1c,
            Field::CholesterolTotal => self.cholesterol_total,
            Field::CholesterolHdl => self.cholesterol_hdl,
            Field::CholesterolLdl => self.cholesterol_ldl,
            Field::Triglycerides => self.triglycerides,
            Field::UricAcid => self.uric_acid,
            Field::LiverGot => self.liver_got,
            Field::LiverGpt => self.liver_gpt,
            Field::LiverRGpt => self.liver_r_gpt,
        }
    }

    fn slot_mut(&mut self, field: Field) -> Option<&mut Option<f64>> {
        let slot = match field {
            Field::Age | Field::Gender => return None,
            Field::Height => &mut self.height,
            Field::Weight => &mut self.weight,
            Field::Bmi => &mut self.bmi,
            Field::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            Field::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            Field::Pulse => &mut self.pulse,
            Field::BloodSugar => &mut self.blood_sugar,
            Field::Hba1c => &mut self.hba1c,
            Field::CholesterolTotal => &mut self.cholesterol_total,
            Field::CholesterolHdl => &mut self.cholesterol_hdl,
            Field::CholesterolLdl => &mut self.cholesterol_ldl,
            Field::Triglycerides => &mut self.triglycerides,
            Field::UricAcid => &mut self.uric_acid,
            Field::LiverGot => &mut self.liver_got,
            Field::LiverGpt => &mut self.liver_gpt,
            Field::LiverRGpt => &mut self.liver_r_gpt,
        };
        Some(slot)
    }
}

/// Bản nháp phía client, được điền dần theo từng trường.
///
/// BMI không có setter công khai: nó luôn được tính lại khi chiều cao hoặc cân nặng
/// thay đổi. Giá trị BMI đọc được từ form/OCR chỉ được giữ khi không tự tính được.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HealthRecordDraft {
    id: Option<String>,
    date: Option<NaiveDate>,
    age: Option<u32>,
    gender: Option<Gender>,
    #[serde(flatten)]
    measurements: Measurements,
    #[serde(skip)]
    reported_bmi: Option<f64>,
}

impl HealthRecordDraft {
    /// Bản nháp mới với ngày khám mặc định là hôm nay.
    pub fn new() -> Self {
        Self {
            date: Some(Utc::now().date_naive()),
            ..Self::default()
        }
    }

    /// Bản nháp rỗng hoàn toàn, kể cả ngày khám.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn gender(&self) -> Option<&Gender> {
        self.gender.as_ref()
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn set_id(&mut self, id: Option<String>) -> &mut Self {
        self.id = id.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) -> &mut Self {
        self.date = date;
        self
    }

    /// Điền ngày hôm nay nếu ngày khám còn trống.
    pub fn date_or_today(&mut self) -> &mut Self {
        if self.date.is_none() {
            self.date = Some(Utc::now().date_naive());
        }
        self
    }

    pub fn set_age(&mut self, age: Option<u32>) -> &mut Self {
        self.age = age.filter(|value| *value > 0);
        self
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) -> &mut Self {
        self.gender = gender;
        self
    }

    pub fn set_height(&mut self, height_cm: Option<f64>) -> &mut Self {
        self.measurements.height = height_cm;
        self.refresh_bmi();
        self
    }

    pub fn set_weight(&mut self, weight_kg: Option<f64>) -> &mut Self {
        self.measurements.weight = weight_kg;
        self.refresh_bmi();
        self
    }

    /// Ghi một chỉ số số thực. BMI được coi là giá trị "báo cáo", chỉ dùng khi
    /// không tính được từ chiều cao và cân nặng.
    pub fn set_measurement(&mut self, field: Field, value: Option<f64>) -> &mut Self {
        match field {
            Field::Height => return self.set_height(value),
            Field::Weight => return self.set_weight(value),
            Field::Bmi => {
                self.reported_bmi = value;
                self.refresh_bmi();
            }
            Field::Age => {
                let age = value.filter(|v| {
                    v.fract() == 0.0 && *v > 0.0 && *v <= f64::from(u32::MAX)
                });
                return self.set_age(age.map(|v| v as u32));
            }
            Field::Gender => {}
            other => {
                if let Some(slot) = self.measurements.slot_mut(other) {
                    *slot = value;
                }
            }
        }
        self
    }

    /// Các trường đang có giá trị, theo thứ tự khai báo.
    pub fn present_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(move |field| match field {
            Field::Age => self.age.is_some(),
            Field::Gender => self.gender.is_some(),
            other => self.measurements.get(*other).is_some(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().next().is_none()
    }

    fn refresh_bmi(&mut self) {
        let derived = match (self.measurements.height, self.measurements.weight) {
            (Some(height), Some(weight)) => bmi::compute(height, weight),
            _ => None,
        };
        self.measurements.bmi = derived.or(self.reported_bmi);
    }
}

impl Readings for HealthRecordDraft {
    fn reading(&self, field: Field) -> Option<f64> {
        match field {
            Field::Age => self.age.map(f64::from),
            other => self.measurements.get(other),
        }
    }
}

/// Bản ghi đã gửi, bất biến, chuyển nguyên vẹn cho API lưu trữ bên ngoài.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthRecord {
    /// Do kho lưu trữ cấp; `Some` nghĩa là thay thế bản ghi cũ.
    pub id: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    #[serde(flatten)]
    pub measurements: Measurements,
    /// Các trường nằm ngoài khoảng tham chiếu tại thời điểm gửi, kèm hướng lệch.
    /// Serialize thành `{trường: "high"|"low"}` như cột `anomalies` của backend.
    #[serde(default)]
    pub anomalies: BTreeMap<Field, RangeStatus>,
}

impl HealthRecord {
    pub(crate) fn from_draft(
        draft: HealthRecordDraft,
        user_id: String,
        date: NaiveDate,
        anomalies: BTreeMap<Field, RangeStatus>,
    ) -> Self {
        Self {
            id: draft.id,
            user_id,
            date,
            age: draft.age,
            gender: draft.gender,
            measurements: draft.measurements,
            anomalies,
        }
    }

    pub fn is_replacement(&self) -> bool {
        self.id.is_some()
    }

    /// Tập trường bất thường, không kèm hướng lệch.
    pub fn anomaly_fields(&self) -> BTreeSet<Field> {
        self.anomalies.keys().copied().collect()
    }
}

impl Readings for HealthRecord {
    fn reading(&self, field: Field) -> Option<f64> {
        match field {
            Field::Age => self.age.map(f64::from),
            other => self.measurements.get(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_follows_height_and_weight() {
        let mut draft = HealthRecordDraft::blank();
        draft.set_height(Some(165.0));
        assert_eq!(draft.measurements().bmi, None);

        draft.set_weight(Some(60.0));
        assert_eq!(draft.measurements().bmi, Some(22.0));

        draft.set_weight(Some(70.0));
        assert_eq!(draft.measurements().bmi, Some(25.7));

        draft.set_height(None);
        assert_eq!(draft.measurements().bmi, None);
    }

    #[test]
    fn reported_bmi_only_used_when_not_derivable() {
        let mut draft = HealthRecordDraft::blank();
        draft.set_measurement(Field::Bmi, Some(30.0));
        assert_eq!(draft.measurements().bmi, Some(30.0));

        draft
            .set_measurement(Field::Height, Some(165.0))
            .set_measurement(Field::Weight, Some(60.0));
        assert_eq!(draft.measurements().bmi, Some(22.0));
    }

    #[test]
    fn fractional_or_non_positive_age_is_no_value() {
        let mut draft = HealthRecordDraft::blank();
        draft.set_measurement(Field::Age, Some(35.9));
        assert_eq!(draft.age(), None);

        draft.set_measurement(Field::Age, Some(-3.0));
        assert_eq!(draft.age(), None);

        draft.set_measurement(Field::Age, Some(f64::NAN));
        assert_eq!(draft.age(), None);

        draft.set_measurement(Field::Age, Some(35.0));
        assert_eq!(draft.age(), Some(35));
    }

    #[test]
    fn absent_is_not_zero() {
        let draft = HealthRecordDraft::new();
        assert!(draft.date().is_some());
        assert!(draft.is_empty());
        assert_eq!(draft.reading(Field::BloodSugar), None);
    }
}
