//! OCR text to `HealthRecordDraft` extractor based on labeled regex capture.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use checkup_core::normalize::apply_raw;
use checkup_core::{normalize_pairs, Field, HealthRecordDraft};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Errors raised while turning recognized text into a draft record.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("No text detected")]
    NoTextDetected,
    #[error("No known checkup label found in the recognized text")]
    NothingRecognized,
    #[error("OCR service error: {0}")]
    Service(String),
    #[error("Invalid label pattern for {field}: {reason}")]
    Pattern { field: Field, reason: String },
    #[error("Unable to read OCR response: {0}")]
    Parse(String),
}

/// One compiled label pattern per field. Each pattern captures exactly one group.
#[derive(Debug, Clone)]
pub struct LabelPatterns {
    patterns: BTreeMap<Field, Regex>,
}

const NUMBER: &str = r"([0-9０-９]+(?:[.．][0-9０-９]+)?)";
const SEPARATOR: &str = r"\s*[：:]\s*";
/// Latin labels must not continue another word ("Non-HDL", "VLDL", "sdLDL").
const WORD_START: &str = r"(?:^|[^A-Za-z\-])";

static STANDARD_PATTERNS: LazyLock<LabelPatterns> = LazyLock::new(|| {
    let labels: [(Field, &str, &str); 18] = [
        (Field::Age, "年齢", r"([0-9０-９]+)"),
        (Field::Gender, "性別", r"(\S+)"),
        (Field::Height, "身長", NUMBER),
        (Field::Weight, "体重", NUMBER),
        (Field::Bmi, "BMI", NUMBER),
        (Field::BloodPressureSystolic, "(?:収縮期血圧|最高血圧)", NUMBER),
        (Field::BloodPressureDiastolic, "(?:拡張期血圧|最低血圧)", NUMBER),
        (Field::Pulse, "脈拍", NUMBER),
        (Field::BloodSugar, "(?:空腹時血糖|血糖値?)", NUMBER),
        (Field::Hba1c, "HbA1c", NUMBER),
        (Field::CholesterolTotal, "総コレステロール", NUMBER),
        (Field::CholesterolHdl, "HDL(?:コレステロール)?", NUMBER),
        (Field::CholesterolLdl, "LDL(?:コレステロール)?", NUMBER),
        (Field::Triglycerides, "中性脂肪", NUMBER),
        (Field::UricAcid, "尿酸", NUMBER),
        (Field::LiverGot, r"(?:AST|GOT)(?:\s*[（(](?:AST|GOT)[）)])?", NUMBER),
        (Field::LiverGpt, r"(?:ALT|GPT)(?:\s*[（(](?:ALT|GPT)[）)])?", NUMBER),
        (Field::LiverRGpt, "(?:γ|ガンマ)-?GTP?", NUMBER),
    ];

    let patterns = labels
        .into_iter()
        .map(|(field, label, value)| {
            let head = label.trim_start_matches("(?:");
            let start = if head.starts_with(|c: char| c.is_ascii_alphabetic()) {
                WORD_START
            } else {
                ""
            };
            let regex = Regex::new(&format!("{start}{label}{SEPARATOR}{value}"))
                .expect("Invalid built-in label pattern");
            (field, regex)
        })
        .collect();

    LabelPatterns { patterns }
});

impl LabelPatterns {
    /// Labels printed on Japanese checkup result sheets.
    pub fn standard() -> &'static LabelPatterns {
        &STANDARD_PATTERNS
    }

    /// Compile custom patterns. Every pattern must contain a capture group.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = (Field, &'a str)>,
    {
        let mut patterns = BTreeMap::new();
        for (field, source) in pairs {
            let regex = Regex::new(source).map_err(|err| ExtractError::Pattern {
                field,
                reason: err.to_string(),
            })?;
            if regex.captures_len() < 2 {
                return Err(ExtractError::Pattern {
                    field,
                    reason: "pattern has no capture group".to_string(),
                });
            }
            patterns.insert(field, regex);
        }
        Ok(Self { patterns })
    }

    pub fn get(&self, field: Field) -> Option<&Regex> {
        self.patterns.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.patterns.keys().copied()
    }
}

/// Extraction outcome: the draft plus which labels matched.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Extraction {
    pub draft: HealthRecordDraft,
    /// Fields whose label was found in the text.
    pub matched: Vec<Field>,
    /// Fields whose label was found but whose value could not be read.
    pub unparsed: Vec<Field>,
}

/// Extract checkup values from one block of recognized text.
///
/// Only the first occurrence of each label is used.
pub fn extract_text(text: &str, patterns: &LabelPatterns) -> Result<Extraction, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::NoTextDetected);
    }

    let mut draft = HealthRecordDraft::blank();
    let mut matched = Vec::new();
    let mut unparsed = Vec::new();

    for (field, regex) in &patterns.patterns {
        let Some(captured) = regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|group| group.as_str())
        else {
            continue;
        };

        matched.push(*field);
        apply_raw(&mut draft, *field, Some(captured));

        if !field_is_present(&draft, *field) {
            tracing::debug!(field = %field, "Label matched but value is unreadable");
            unparsed.push(*field);
        }
    }

    if draft.is_empty() {
        return Err(ExtractError::NothingRecognized);
    }

    tracing::info!(
        matched = matched.len(),
        unparsed = unparsed.len(),
        "Extracted checkup values from OCR text"
    );

    Ok(Extraction {
        draft,
        matched,
        unparsed,
    })
}

/// Extract from an OCR service response serialized as JSON.
pub fn extract_annotation_str(
    response_json: &str,
    patterns: &LabelPatterns,
) -> Result<Extraction, ExtractError> {
    let value: Value =
        serde_json::from_str(response_json).map_err(|err| ExtractError::Parse(err.to_string()))?;
    extract_annotation_value(&value, patterns)
}

/// Extract from an image annotation response (`textAnnotations[0].description`,
/// falling back to `fullTextAnnotation.text`). Batch responses use the first entry.
pub fn extract_annotation_value(
    response: &Value,
    patterns: &LabelPatterns,
) -> Result<Extraction, ExtractError> {
    let annotation = match response.get("responses") {
        Some(responses) => responses
            .as_array()
            .and_then(|arr| arr.first())
            .ok_or(ExtractError::NoTextDetected)?,
        None => response,
    };

    if let Some(message) = annotation
        .get("error")
        .and_then(|err| err.get("message"))
        .and_then(Value::as_str)
    {
        return Err(ExtractError::Service(message.to_string()));
    }

    let text = full_text(annotation).ok_or(ExtractError::NoTextDetected)?;
    extract_text(text, patterns)
}

/// Normalize a JSON form object. Strings and numbers are read as raw text;
/// `null`, booleans and nested values count as "no value".
pub fn normalize_json_form(form: &Map<String, Value>) -> HealthRecordDraft {
    let pairs: Vec<(&str, Option<String>)> = form
        .iter()
        .map(|(key, value)| (key.as_str(), form_text(value)))
        .collect();

    normalize_pairs(pairs.iter().map(|(key, value)| (*key, value.as_deref())))
}

fn form_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn full_text(annotation: &Value) -> Option<&str> {
    annotation
        .get("textAnnotations")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("description"))
        .and_then(Value::as_str)
        .or_else(|| {
            annotation
                .get("fullTextAnnotation")
                .and_then(|full| full.get("text"))
                .and_then(Value::as_str)
        })
        .filter(|text| !text.trim().is_empty())
}

fn field_is_present(draft: &HealthRecordDraft, field: Field) -> bool {
    draft.present_fields().any(|present| present == field)
}
