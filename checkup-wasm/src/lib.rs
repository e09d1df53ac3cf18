//! Bridge WASM <-> JavaScript trung lập framework.

use checkup_core::{
    recommend, CheckupConfig, CheckupError, HealthRecord, HealthRecordDraft, Owner,
    ReferenceTable,
};
use checkup_ocr::{ExtractError, LabelPatterns};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsCheckupConfig {
    #[serde(default)]
    require_demographics: Option<bool>,
    #[serde(default)]
    default_date_today: Option<bool>,
}

impl From<JsCheckupConfig> for CheckupConfig {
    fn from(cfg: JsCheckupConfig) -> Self {
        let mut base = CheckupConfig::default();
        if let Some(required) = cfg.require_demographics {
            base.require_demographics = required;
        }
        if let Some(today) = cfg.default_date_today {
            base.default_date_today = today;
        }
        base
    }
}

/// Chuẩn hóa dữ liệu form thành bản nháp (chưa kiểm tra trường bắt buộc).
#[wasm_bindgen]
pub fn normalize_form(form: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let draft = read_form(form)?;
    to_js(&draft)
}

/// Chuẩn hóa và gửi form: trả về báo cáo gồm bản ghi và tập bất thường.
#[wasm_bindgen]
pub fn submit_form(
    form: JsValue,
    user_id: String,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let draft = read_form(form)?;
    let cfg = read_config(config)?;
    submit_draft(draft, &user_id, &cfg)
}

/// Trích xuất từ văn bản OCR rồi gửi như một bản ghi mới.
#[wasm_bindgen]
pub fn submit_ocr_text(
    text: &str,
    user_id: String,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let cfg = read_config(config)?;
    let extraction = checkup_ocr::extract_text(text, LabelPatterns::standard())
        .map_err(|err| JsValue::from_str(&format_extract_error(err)))?;

    let mut draft = extraction.draft;
    if cfg.default_date_today {
        draft.date_or_today();
    }
    submit_draft(draft, &user_id, &cfg)
}

/// Trích xuất từ văn bản OCR, trả về bản nháp và danh sách nhãn đã khớp.
#[wasm_bindgen]
pub fn extract_text(text: &str) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let extraction = checkup_ocr::extract_text(text, LabelPatterns::standard())
        .map_err(|err| JsValue::from_str(&format_extract_error(err)))?;
    to_js(&extraction)
}

/// Trích xuất từ phản hồi JSON của dịch vụ nhận dạng ảnh.
#[wasm_bindgen]
pub fn extract_annotation(response: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let response_value = from_value::<Value>(response)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được phản hồi OCR: {err}")))?;

    let extraction =
        checkup_ocr::extract_annotation_value(&response_value, LabelPatterns::standard())
            .map_err(|err| JsValue::from_str(&format_extract_error(err)))?;
    to_js(&extraction)
}

/// Bảng khoảng tham chiếu chuẩn, dùng để hiển thị gợi ý "正常範囲".
#[wasm_bindgen]
pub fn reference_table() -> Result<JsValue, JsValue> {
    to_js(ReferenceTable::standard())
}

/// Gợi ý dinh dưỡng cho một bản ghi đã lưu.
#[wasm_bindgen]
pub fn nutrition_advice(record: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let record: HealthRecord = from_value(record)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bản ghi: {err}")))?;
    to_js(&recommend(&record))
}

fn submit_draft(
    draft: HealthRecordDraft,
    user_id: &str,
    cfg: &CheckupConfig,
) -> Result<JsValue, JsValue> {
    let owner = Owner::new(user_id);
    let report = checkup_core::submit(draft, &owner, ReferenceTable::standard(), cfg)
        .map_err(|err| JsValue::from_str(&format_checkup_error(err)))?;
    to_js(&report)
}

fn read_form(form: JsValue) -> Result<HealthRecordDraft, JsValue> {
    let form_value = from_value::<Value>(form)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu form: {err}")))?;
    let object = form_value
        .as_object()
        .ok_or_else(|| JsValue::from_str("Dữ liệu form phải là object"))?;

    Ok(checkup_ocr::normalize_json_form(object))
}

fn read_config(config: Option<JsValue>) -> Result<CheckupConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsCheckupConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(CheckupConfig::from(cfg))
        }
        _ => Ok(CheckupConfig::default()),
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn format_checkup_error(err: CheckupError) -> String {
    format!("Checkup error: {err}")
}

fn format_extract_error(err: ExtractError) -> String {
    format!("OCR error: {err}")
}
