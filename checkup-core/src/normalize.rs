//! Chuẩn hóa dữ liệu form (chuỗi thô) thành bản nháp có kiểu.
//!
//! Không hàm nào ở đây trả lỗi: chuỗi rỗng hoặc không đọc được đều trở thành
//! "không có giá trị".

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::field::{Field, FieldKind, Gender};
use crate::record::HealthRecordDraft;

/// Chuẩn hóa ánh xạ tên trường -> chuỗi thô từ form.
pub fn normalize_form(input: &BTreeMap<String, Option<String>>) -> HealthRecordDraft {
    normalize_pairs(
        input
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref())),
    )
}

/// Biến thể nhận cặp (khóa, giá trị) bất kỳ, dùng chung cho bridge WASM.
pub fn normalize_pairs<'a, I>(pairs: I) -> HealthRecordDraft
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut draft = HealthRecordDraft::blank();

    for (key, raw) in pairs {
        let raw = raw.filter(|value| !value.trim().is_empty());

        match key.trim() {
            "date" | "checkup_date" => {
                draft.set_date(raw.and_then(parse_date));
                continue;
            }
            "id" => {
                draft.set_id(raw.map(str::to_string));
                continue;
            }
            _ => {}
        }

        match Field::from_key(key) {
            Some(field) => apply_raw(&mut draft, field, raw),
            None => tracing::debug!(key, "Bỏ qua trường không thuộc lược đồ"),
        }
    }

    draft
}

/// Gán một chuỗi thô vào bản nháp theo kiểu khai báo của trường.
pub fn apply_raw(draft: &mut HealthRecordDraft, field: Field, raw: Option<&str>) {
    let raw = raw.filter(|value| !value.trim().is_empty());

    match field.kind() {
        FieldKind::Real => {
            let value = raw.and_then(parse_real);
            if raw.is_some() && value.is_none() {
                tracing::debug!(field = %field, "Giá trị số không hợp lệ, coi như trống");
            }
            draft.set_measurement(field, value);
        }
        FieldKind::Integer => {
            draft.set_age(raw.and_then(parse_integer));
        }
        FieldKind::Category => {
            draft.set_gender(raw.and_then(Gender::from_label));
        }
    }
}

/// Đọc số thực; chấp nhận chữ số toàn độ rộng và dấu phân cách hàng nghìn.
pub fn parse_real(raw: &str) -> Option<f64> {
    let cleaned = clean_numeric(raw)?;
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Đọc số nguyên cơ số 10, dương.
pub fn parse_integer(raw: &str) -> Option<u32> {
    let cleaned = clean_numeric(raw)?;
    cleaned.parse::<u32>().ok().filter(|value| *value > 0)
}

/// Ngày dạng `YYYY-MM-DD` hoặc `YYYY/MM/DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .ok()
}

/// Dấu phẩy chỉ hợp lệ khi tách đúng từng nhóm ba chữ số.
static GROUPED_THOUSANDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?$")
        .expect("Invalid built-in thousands pattern")
});

fn clean_numeric(raw: &str) -> Option<String> {
    let ascii: String = raw
        .trim()
        .chars()
        .filter_map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
            '．' => Some('.'),
            '，' => Some(','),
            '－' | '−' => Some('-'),
            '＋' => Some('+'),
            other => Some(other),
        })
        .collect();

    if ascii.is_empty() {
        return None;
    }
    if !ascii.contains(',') {
        return Some(ascii);
    }
    // "5,4" hay "1,2,3" không phải phân cách hàng nghìn: coi như trống.
    GROUPED_THOUSANDS
        .is_match(&ascii)
        .then(|| ascii.replace(',', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_real_tolerates_ime_input() {
        assert_eq!(parse_real("１２０"), Some(120.0));
        assert_eq!(parse_real(" 5.4 "), Some(5.4));
        assert_eq!(parse_real("６．２"), Some(6.2));
        assert_eq!(parse_real("1,200"), Some(1200.0));
        assert_eq!(parse_real("１，２００．５"), Some(1200.5));
    }

    #[test]
    fn comma_outside_thousands_groups_is_no_value() {
        assert_eq!(parse_real("5,4"), None);
        assert_eq!(parse_real("1,2,3"), None);
        assert_eq!(parse_real("12,34"), None);
        assert_eq!(parse_real(",120"), None);
        assert_eq!(parse_integer("3,5"), None);
    }

    #[test]
    fn parse_real_never_fails_loudly() {
        assert_eq!(parse_real(""), None);
        assert_eq!(parse_real("abc"), None);
        assert_eq!(parse_real("12mg"), None);
        assert_eq!(parse_real("NaN"), None);
        assert_eq!(parse_real("inf"), None);
    }

    #[test]
    fn parse_integer_is_base_ten_and_positive() {
        assert_eq!(parse_integer("35"), Some(35));
        assert_eq!(parse_integer("０３５"), Some(35));
        assert_eq!(parse_integer("35.5"), None);
        assert_eq!(parse_integer("0"), None);
        assert_eq!(parse_integer("-4"), None);
    }

    #[test]
    fn parse_date_accepts_both_separators() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(parse_date("2024-01-01"), expected);
        assert_eq!(parse_date("2024/01/01"), expected);
        assert_eq!(parse_date("01.01.2024"), None);
    }
}
