//! Khoảng tham chiếu lâm sàng và phân loại trong/ngoài khoảng.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::record::Readings;
use crate::CheckupError;

/// Khoảng đóng [min, max]. Chỉ dựng được qua `new`, kể cả khi deserialize.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawRange")]
pub struct ReferenceRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRange> for ReferenceRange {
    type Error = CheckupError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        ReferenceRange::new(raw.min, raw.max)
    }
}

impl ReferenceRange {
    pub fn new(min: f64, max: f64) -> Result<Self, CheckupError> {
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(CheckupError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn status(&self, value: f64) -> RangeStatus {
        if value < self.min {
            RangeStatus::Low
        } else if value > self.max {
            RangeStatus::High
        } else {
            RangeStatus::Normal
        }
    }

    /// Chuỗi hiển thị dạng `18.5-25`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    Low,
    Normal,
    High,
}

impl RangeStatus {
    pub fn label(self) -> &'static str {
        match self {
            RangeStatus::Low => "low",
            RangeStatus::Normal => "normal",
            RangeStatus::High => "high",
        }
    }
}

/// Bảng khoảng tham chiếu theo tên trường. Trường không có trong bảng không bao giờ bị
/// đánh dấu bất thường.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceTable {
    ranges: BTreeMap<Field, ReferenceRange>,
}

static STANDARD_TABLE: LazyLock<ReferenceTable> = LazyLock::new(|| {
    let entries = [
        (Field::Bmi, 18.5, 25.0),
        (Field::BloodPressureSystolic, 90.0, 120.0),
        (Field::BloodPressureDiastolic, 60.0, 80.0),
        (Field::Pulse, 60.0, 100.0),
        (Field::BloodSugar, 70.0, 100.0),
        (Field::Hba1c, 4.6, 6.2),
        (Field::CholesterolTotal, 130.0, 219.0),
        (Field::CholesterolHdl, 40.0, 60.0),
        (Field::CholesterolLdl, 0.0, 100.0),
        (Field::Triglycerides, 0.0, 150.0),
        (Field::UricAcid, 3.5, 7.2),
        (Field::LiverGot, 10.0, 40.0),
        (Field::LiverGpt, 7.0, 56.0),
        (Field::LiverRGpt, 0.0, 73.0),
    ];

    ReferenceTable {
        ranges: entries
            .into_iter()
            .map(|(field, min, max)| (field, ReferenceRange { min, max }))
            .collect(),
    }
});

impl ReferenceTable {
    /// Bảng chuẩn dùng chung cho cả tiến trình, khởi tạo một lần.
    pub fn standard() -> &'static ReferenceTable {
        &STANDARD_TABLE
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, CheckupError>
    where
        I: IntoIterator<Item = (Field, f64, f64)>,
    {
        let mut ranges = BTreeMap::new();
        for (field, min, max) in entries {
            ranges.insert(field, ReferenceRange::new(min, max)?);
        }
        Ok(Self { ranges })
    }

    pub fn get(&self, field: Field) -> Option<&ReferenceRange> {
        self.ranges.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ReferenceRange)> {
        self.ranges.iter().map(|(field, range)| (*field, range))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Kết quả phân loại một trường có mặt và có khoảng tham chiếu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeFinding {
    pub field: Field,
    pub value: f64,
    pub range: ReferenceRange,
    pub status: RangeStatus,
}

impl RangeFinding {
    pub fn is_anomalous(&self) -> bool {
        self.status != RangeStatus::Normal
    }
}

/// Phân loại mọi trường có mặt trong cả bản ghi lẫn bảng tham chiếu.
pub fn classify<R: Readings + ?Sized>(record: &R, table: &ReferenceTable) -> Vec<RangeFinding> {
    table
        .iter()
        .filter_map(|(field, range)| {
            let value = record.reading(field)?;
            Some(RangeFinding {
                field,
                value,
                range: *range,
                status: range.status(value),
            })
        })
        .collect()
}

/// Tập trường có giá trị nằm ngoài [min, max]. Tập rỗng: mọi giá trị đều bình thường.
pub fn find_anomalies<R: Readings + ?Sized>(
    record: &R,
    table: &ReferenceTable,
) -> BTreeSet<Field> {
    table
        .iter()
        .filter(|(field, range)| {
            record
                .reading(*field)
                .is_some_and(|value| !range.contains(value))
        })
        .map(|(field, _)| field)
        .collect()
}
