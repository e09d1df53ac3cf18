//! Lược đồ trường chuẩn cho một lần khám sức khỏe.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kiểu dữ liệu khai báo của một trường.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Real,
    Integer,
    Category,
}

/// Tên trường chuẩn duy nhất. Mọi tên cũ (`systolicBP`, `got`...) được ánh xạ về đây.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Age,
    Gender,
    Height,
    Weight,
    Bmi,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    Pulse,
    BloodSugar,
    Hba1c,
    CholesterolTotal,
    CholesterolHdl,
    CholesterolLdl,
    Triglycerides,
    UricAcid,
    LiverGot,
    LiverGpt,
    LiverRGpt,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::Age,
        Field::Gender,
        Field::Height,
        Field::Weight,
        Field::Bmi,
        Field::BloodPressureSystolic,
        Field::BloodPressureDiastolic,
        Field::Pulse,
        Field::BloodSugar,
        Field::Hba1c,
        Field::CholesterolTotal,
        Field::CholesterolHdl,
        Field::CholesterolLdl,
        Field::Triglycerides,
        Field::UricAcid,
        Field::LiverGot,
        Field::LiverGpt,
        Field::LiverRGpt,
    ];

    /// Khóa snake_case dùng cho REST backend và serde.
    pub fn key(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Height => "height",
            Field::Weight => "weight",
            Field::Bmi => "bmi",
            Field::BloodPressureSystolic => "blood_pressure_systolic",
            Field::BloodPressureDiastolic => "blood_pressure_diastolic",
            Field::Pulse => "pulse",
            Field::BloodSugar => "blood_sugar",
            Field::Hba1c => "hba1c",
            Field::CholesterolTotal => "cholesterol_total",
            Field::CholesterolHdl => "cholesterol_hdl",
            Field::CholesterolLdl => "cholesterol_ldl",
            Field::Triglycerides => "triglycerides",
            Field::UricAcid => "uric_acid",
            Field::LiverGot => "liver_got",
            Field::LiverGpt => "liver_gpt",
            Field::LiverRGpt => "liver_r_gpt",
        }
    }

    /// Tra cứu theo khóa chuẩn hoặc tên cũ của các phiên bản form trước.
    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim();
        if let Some(field) = Field::ALL.iter().copied().find(|field| field.key() == key) {
            return Some(field);
        }

        let field = match key {
            "sex" => Field::Gender,
            "systolicBP" | "systolic_bp" => Field::BloodPressureSystolic,
            "diastolicBP" | "diastolic_bp" => Field::BloodPressureDiastolic,
            "heart_rate" => Field::Pulse,
            "bloodSugar" => Field::BloodSugar,
            "HbA1c" => Field::Hba1c,
            "totalCholesterol" => Field::CholesterolTotal,
            "hdlCholesterol" => Field::CholesterolHdl,
            "ldlCholesterol" => Field::CholesterolLdl,
            "uricAcid" => Field::UricAcid,
            "got" | "ast" => Field::LiverGot,
            "gpt" | "alt" => Field::LiverGpt,
            "gammaGTP" | "gamma_gtp" | "r_gtp" => Field::LiverRGpt,
            _ => return None,
        };
        Some(field)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Age => FieldKind::Integer,
            Field::Gender => FieldKind::Category,
            _ => FieldKind::Real,
        }
    }

    /// Đơn vị hiển thị; `None` với trường phân loại.
    pub fn unit(self) -> Option<&'static str> {
        let unit = match self {
            Field::Gender => return None,
            Field::Age => "years",
            Field::Height => "cm",
            Field::Weight => "kg",
            Field::Bmi => "kg/m2",
            Field::BloodPressureSystolic | Field::BloodPressureDiastolic => "mmHg",
            Field::Pulse => "bpm",
            Field::Hba1c => "%",
            Field::LiverGot | Field::LiverGpt | Field::LiverRGpt => "U/L",
            Field::BloodSugar
            | Field::CholesterolTotal
            | Field::CholesterolHdl
            | Field::CholesterolLdl
            | Field::Triglycerides
            | Field::UricAcid => "mg/dL",
        };
        Some(unit)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Giới tính đã chuẩn hóa. Nhãn không nhận diện được giữ nguyên trong `Unlisted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unlisted(String),
}

impl Gender {
    /// Ánh xạ nhãn (tiếng Nhật hoặc tiếng Anh) về mã ngắn; `None` khi nhãn rỗng.
    pub fn from_label(label: &str) -> Option<Gender> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }

        let gender = match trimmed.to_ascii_lowercase().as_str() {
            "male" | "m" | "男性" | "男" => Gender::Male,
            "female" | "f" | "女性" | "女" => Gender::Female,
            "other" | "その他" => Gender::Other,
            _ => Gender::Unlisted(trimmed.to_string()),
        };
        Some(gender)
    }

    pub fn code(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unlisted(label) => label,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Gender::from_label(&value).unwrap_or(Gender::Unlisted(value))
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        value.code().to_string()
    }
}
