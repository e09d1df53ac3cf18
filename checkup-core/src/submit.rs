//! Gửi bản nháp: kiểm tra trường bắt buộc, tính tập bất thường, dựng báo cáo.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::range::{classify, RangeFinding, ReferenceTable};
use crate::record::{HealthRecord, HealthRecordDraft};
use crate::{CheckupConfig, CheckupError};

/// Ngữ cảnh người sở hữu bản ghi, truyền tường minh vào mỗi lần gửi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Owner {
    pub user_id: String,
}

impl Owner {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Kết quả gửi: bản ghi bất biến kèm chi tiết phân loại từng trường.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckupReport {
    pub record: HealthRecord,
    pub findings: Vec<RangeFinding>,
}

impl CheckupReport {
    pub fn has_anomalies(&self) -> bool {
        !self.record.anomalies.is_empty()
    }

    /// Ánh xạ `{trường: "high"|"low"}` cho cột `anomalies` của backend.
    pub fn anomaly_labels(&self) -> BTreeMap<String, String> {
        self.record
            .anomalies
            .iter()
            .map(|(field, status)| (field.key().to_string(), status.label().to_string()))
            .collect()
    }

    /// Nội dung banner cảnh báo hiển thị sau khi lưu.
    pub fn summary(&self) -> String {
        if !self.has_anomalies() {
            return "すべての値は正常範囲内です。".to_string();
        }

        let details = self
            .findings
            .iter()
            .filter(|finding| finding.is_anomalous())
            .map(|finding| format!("{} (正常範囲: {})", finding.field, finding.range))
            .collect::<Vec<_>>()
            .join(", ");
        format!("一部の値が正常範囲外です: {details}")
    }
}

/// Kiểm tra và gửi một bản nháp. Giá trị ngoài khoảng chỉ là cảnh báo, không chặn.
pub fn submit(
    draft: HealthRecordDraft,
    owner: &Owner,
    table: &ReferenceTable,
    config: &CheckupConfig,
) -> Result<CheckupReport, CheckupError> {
    let missing = missing_required(&draft, config);
    if !missing.is_empty() {
        return Err(CheckupError::MissingFields(missing));
    }
    let Some(date) = draft.date() else {
        return Err(CheckupError::MissingFields(vec!["date"]));
    };

    let findings = classify(&draft, table);
    let anomalies = findings
        .iter()
        .filter(|finding| finding.is_anomalous())
        .map(|finding| (finding.field, finding.status))
        .collect();

    let record = HealthRecord::from_draft(draft, owner.user_id.clone(), date, anomalies);

    if record.anomalies.is_empty() {
        tracing::info!(user_id = %owner.user_id, date = %record.date, "Đã gửi bản ghi khám");
    } else {
        tracing::warn!(
            user_id = %owner.user_id,
            date = %record.date,
            anomaly_count = record.anomalies.len(),
            "Đã gửi bản ghi khám có chỉ số ngoài khoảng"
        );
    }

    Ok(CheckupReport { record, findings })
}

fn missing_required(draft: &HealthRecordDraft, config: &CheckupConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if draft.date().is_none() {
        missing.push("date");
    }
    if config.require_demographics {
        if draft.age().is_none() {
            missing.push(Field::Age.key());
        }
        if draft.gender().is_none() {
            missing.push(Field::Gender.key());
        }
    }
    missing
}
