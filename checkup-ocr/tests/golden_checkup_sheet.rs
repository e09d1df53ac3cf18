use std::fs;

use checkup_ocr::{extract_annotation_str, extract_text, LabelPatterns};
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn golden() -> Value {
    let expected = fs::read_to_string(fixture_path("checkup_sheet_extraction.json"))
        .expect("Không đọc được golden extraction");
    serde_json::from_str(&expected).expect("Golden không hợp lệ")
}

#[test]
fn checkup_sheet_matches_golden() {
    let text = fs::read_to_string(fixture_path("checkup_sheet.txt"))
        .expect("Không đọc được phiếu khám mẫu");

    let extraction =
        extract_text(&text, LabelPatterns::standard()).expect("Không trích xuất được dữ liệu");

    let actual = serde_json::to_value(extraction).expect("Không serialize extraction");
    assert_eq!(actual, golden());
}

#[test]
fn vision_response_matches_golden() {
    let response = fs::read_to_string(fixture_path("vision_response.json"))
        .expect("Không đọc được phản hồi OCR mẫu");

    let extraction = extract_annotation_str(&response, LabelPatterns::standard())
        .expect("Không trích xuất được dữ liệu");

    let actual = serde_json::to_value(extraction).expect("Không serialize extraction");
    assert_eq!(actual, golden());
}
