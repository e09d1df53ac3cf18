use std::collections::{BTreeMap, BTreeSet};

use checkup_core::{
    find_anomalies, normalize_form, recommend_latest, submit, CheckupConfig, CheckupError, Field,
    Gender, HealthRecord, NutritionType, Owner, Readings, ReferenceTable,
};
use chrono::NaiveDate;

fn form(pairs: &[(&str, &str)]) -> BTreeMap<String, Option<String>> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Some(value.to_string())))
        .collect()
}

fn blood_pressure_table() -> ReferenceTable {
    ReferenceTable::from_entries([
        (Field::BloodPressureSystolic, 90.0, 120.0),
        (Field::BloodPressureDiastolic, 60.0, 80.0),
    ])
    .unwrap()
}

#[test]
fn systolic_above_range_is_the_only_anomaly() {
    let draft = normalize_form(&form(&[
        ("date", "2024-01-01"),
        ("blood_pressure_systolic", "135"),
        ("blood_pressure_diastolic", "75"),
    ]));

    let anomalies = find_anomalies(&draft, &blood_pressure_table());
    assert_eq!(anomalies, BTreeSet::from([Field::BloodPressureSystolic]));
}

#[test]
fn range_bounds_are_inclusive() {
    let table = blood_pressure_table();

    let at_max = normalize_form(&form(&[("blood_pressure_systolic", "120")]));
    assert!(find_anomalies(&at_max, &table).is_empty());

    let at_min = normalize_form(&form(&[("blood_pressure_systolic", "90")]));
    assert!(find_anomalies(&at_min, &table).is_empty());

    let above = normalize_form(&form(&[("blood_pressure_systolic", "121")]));
    assert_eq!(
        find_anomalies(&above, &table),
        BTreeSet::from([Field::BloodPressureSystolic])
    );
}

#[test]
fn blank_and_malformed_inputs_become_no_value() {
    let mut input = form(&[("pulse", ""), ("blood_sugar", "   "), ("hba1c", "五")]);
    input.insert("uric_acid".to_string(), None);

    let draft = normalize_form(&input);
    for field in [Field::Pulse, Field::BloodSugar, Field::Hba1c, Field::UricAcid] {
        assert_eq!(draft.reading(field), None, "{field}");
    }
    assert!(draft.is_empty());
    assert!(find_anomalies(&draft, ReferenceTable::standard()).is_empty());
}

#[test]
fn decimal_comma_is_not_read_as_a_larger_number() {
    let draft = normalize_form(&form(&[("hba1c", "5,4"), ("triglycerides", "1,250")]));
    assert_eq!(draft.reading(Field::Hba1c), None);
    assert_eq!(draft.reading(Field::Triglycerides), Some(1250.0));
    assert_eq!(
        find_anomalies(&draft, ReferenceTable::standard()),
        BTreeSet::from([Field::Triglycerides])
    );
}

#[test]
fn zero_is_a_value_and_gets_checked() {
    let draft = normalize_form(&form(&[("pulse", "0")]));
    assert_eq!(draft.reading(Field::Pulse), Some(0.0));
    assert_eq!(
        find_anomalies(&draft, ReferenceTable::standard()),
        BTreeSet::from([Field::Pulse])
    );
}

#[test]
fn bmi_is_derived_and_user_input_ignored() {
    let draft = normalize_form(&form(&[("height", "165"), ("weight", "60"), ("bmi", "35")]));
    assert_eq!(draft.reading(Field::Bmi), Some(22.0));
}

#[test]
fn gender_labels_are_normalized_or_passed_through() {
    let draft = normalize_form(&form(&[("gender", "女性")]));
    assert_eq!(draft.gender(), Some(&Gender::Female));

    let draft = normalize_form(&form(&[("sex", "X")]));
    assert_eq!(draft.gender(), Some(&Gender::Unlisted("X".to_string())));
}

#[test]
fn missing_date_blocks_submission() {
    let draft = normalize_form(&form(&[("date", "not-a-date"), ("pulse", "70")]));
    let err = submit(
        draft,
        &Owner::new("u1"),
        ReferenceTable::standard(),
        &CheckupConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, CheckupError::MissingFields(ref fields) if fields == &vec!["date"]));
}

#[test]
fn demographics_required_when_configured() {
    let config = CheckupConfig {
        require_demographics: true,
        ..CheckupConfig::default()
    };
    let draft = normalize_form(&form(&[("date", "2024-01-01"), ("age", "40")]));
    let err = submit(draft, &Owner::new("u1"), ReferenceTable::standard(), &config).unwrap_err();

    assert!(matches!(err, CheckupError::MissingFields(ref fields) if fields == &vec!["gender"]));
}

#[test]
fn out_of_range_values_do_not_block_submission() {
    let draft = normalize_form(&form(&[
        ("id", "rec-9"),
        ("date", "2024-01-01"),
        ("blood_pressure_systolic", "135"),
    ]));
    let report = submit(
        draft,
        &Owner::new("u1"),
        &blood_pressure_table(),
        &CheckupConfig::default(),
    )
    .unwrap();

    assert!(report.has_anomalies());
    assert!(report.record.is_replacement());
    assert_eq!(report.record.user_id, "u1");
    assert_eq!(
        report.anomaly_labels().get("blood_pressure_systolic").map(String::as_str),
        Some("high")
    );
    assert!(report.summary().contains("90-120"));
}

#[test]
fn record_anomalies_serialize_as_backend_status_map() {
    let draft = normalize_form(&form(&[
        ("date", "2024-01-01"),
        ("blood_pressure_systolic", "135"),
        ("blood_pressure_diastolic", "55"),
    ]));
    let report = submit(
        draft,
        &Owner::new("u1"),
        &blood_pressure_table(),
        &CheckupConfig::default(),
    )
    .unwrap();

    assert_eq!(
        report.record.anomaly_fields(),
        BTreeSet::from([Field::BloodPressureSystolic, Field::BloodPressureDiastolic])
    );

    let json = serde_json::to_value(&report.record).unwrap();
    assert_eq!(
        json["anomalies"],
        serde_json::json!({
            "blood_pressure_systolic": "high",
            "blood_pressure_diastolic": "low"
        })
    );

    let labels: BTreeMap<String, String> = report.anomaly_labels();
    assert_eq!(serde_json::to_value(&labels).unwrap(), json["anomalies"]);

    let stored: HealthRecord = serde_json::from_value(json).unwrap();
    assert_eq!(stored, report.record);
}

#[test]
fn same_day_records_recommend_from_the_first() {
    let first = normalize_form(&form(&[("date", "2024-04-01"), ("blood_sugar", "140")]));
    let second = normalize_form(&form(&[("date", "2024-04-01"), ("triglycerides", "180")]));

    let records: Vec<HealthRecord> = [first, second]
        .into_iter()
        .map(|draft| {
            submit(
                draft,
                &Owner::new("u1"),
                ReferenceTable::standard(),
                &CheckupConfig::default(),
            )
            .unwrap()
            .record
        })
        .collect();

    assert_eq!(recommend_latest(&records).unwrap(), vec![NutritionType::LowSugar]);
}

#[test]
fn recommendations_use_latest_record() {
    let older = normalize_form(&form(&[("date", "2023-04-01"), ("blood_sugar", "140")]));
    let newer = normalize_form(&form(&[("date", "2024-04-01"), ("triglycerides", "180")]));

    let records: Vec<HealthRecord> = [older, newer]
        .into_iter()
        .map(|draft| {
            submit(
                draft,
                &Owner::new("u1"),
                ReferenceTable::standard(),
                &CheckupConfig::default(),
            )
            .unwrap()
            .record
        })
        .collect();

    assert_eq!(
        records[1].date,
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    );
    assert_eq!(recommend_latest(&records).unwrap(), vec![NutritionType::LowFat]);
    assert!(matches!(recommend_latest(&[]), Err(CheckupError::NoRecords)));
}
