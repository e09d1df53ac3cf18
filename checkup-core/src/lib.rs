//! Logic lõi chuẩn hóa, kiểm tra khoảng tham chiếu và gửi bản ghi khám sức khỏe.

use serde::{Deserialize, Serialize};

pub mod advice;
pub mod bmi;
pub mod field;
pub mod normalize;
pub mod range;
pub mod record;
pub mod submit;

pub use advice::{recommend, recommend_latest, NutritionType};
pub use field::{Field, FieldKind, Gender};
pub use normalize::{normalize_form, normalize_pairs, parse_date, parse_integer, parse_real};
pub use range::{
    classify, find_anomalies, RangeFinding, RangeStatus, ReferenceRange, ReferenceTable,
};
pub use record::{HealthRecord, HealthRecordDraft, Measurements, Readings};
pub use submit::{submit, CheckupReport, Owner};

/// Cấu hình chính sách gửi bản ghi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckupConfig {
    /// Bắt buộc tuổi và giới tính (một số phiên bản form yêu cầu).
    pub require_demographics: bool,
    /// Điền ngày hôm nay cho bản ghi OCR không đọc được ngày khám.
    pub default_date_today: bool,
}

impl Default for CheckupConfig {
    fn default() -> Self {
        Self {
            require_demographics: false,
            default_date_today: true,
        }
    }
}

/// Lỗi chung của pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CheckupError {
    #[error("Thiếu trường bắt buộc: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Khoảng tham chiếu không hợp lệ: [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
    #[error("Không tìm thấy dữ liệu khám")]
    NoRecords,
}
