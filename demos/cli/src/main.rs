use std::path::{Path, PathBuf};

use anyhow::Context;
use checkup_core::{
    recommend, submit, CheckupConfig, CheckupReport, HealthRecordDraft, Owner, ReferenceTable,
};
use checkup_ocr::{extract_annotation_str, extract_text, normalize_json_form, LabelPatterns};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "checkup-cli",
    about = "Chuẩn hóa và kiểm tra dữ liệu khám sức khỏe từ form JSON hoặc văn bản OCR."
)]
struct Args {
    /// Mức log (error, warn, info, debug, trace). Ưu tiên hơn RUST_LOG; mặc định `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Mã người dùng sở hữu bản ghi.
    #[arg(long, global = true, default_value = "local-user")]
    user: String,

    /// Bắt buộc tuổi và giới tính.
    #[arg(long, global = true)]
    require_demographics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Đọc form JSON (tên trường -> chuỗi).
    Form {
        /// Đường dẫn tới file JSON.
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Đọc văn bản OCR hoặc phản hồi JSON của dịch vụ nhận dạng.
    Ocr {
        /// Đường dẫn tới file văn bản.
        #[arg(short, long)]
        input: PathBuf,
        /// File đầu vào là phản hồi JSON thay vì văn bản thuần.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let config = CheckupConfig {
        require_demographics: args.require_demographics,
        ..CheckupConfig::default()
    };

    let draft = match &args.command {
        Command::Form { input } => {
            let data = read_input(input)?;
            let form: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&data)
                .with_context(|| format!("Form JSON không hợp lệ: {input:?}"))?;
            normalize_json_form(&form)
        }
        Command::Ocr { input, json } => {
            let data = read_input(input)?;
            let patterns = LabelPatterns::standard();
            let extraction = if *json {
                extract_annotation_str(&data, patterns)?
            } else {
                extract_text(&data, patterns)?
            };
            println!("Matched labels: {}", extraction.matched.len());

            let mut draft: HealthRecordDraft = extraction.draft;
            if config.default_date_today {
                draft.date_or_today();
            }
            draft
        }
    };

    let report = submit(
        draft,
        &Owner::new(args.user.clone()),
        ReferenceTable::standard(),
        &config,
    )?;
    print_report(&report)?;

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Không đọc được file {path:?}"))
}

fn init_tracing(level: Option<&str>) {
    let filter = log_filter(level);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--log-level` thắng `RUST_LOG`; không có cả hai thì dùng `info`.
fn log_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn print_report(report: &CheckupReport) -> anyhow::Result<()> {
    let record_json =
        serde_json::to_string_pretty(&report.record).context("Không serialize bản ghi")?;
    let advice = recommend(&report.record);

    println!(
        "Checkup date: {}\nAnomalies: {}\n{}\nNutrition: {:?}\n{}",
        report.record.date,
        report.record.anomalies.len(),
        report.summary(),
        advice,
        record_json
    );

    Ok(())
}
