use crate::domain::constants::{SUMMARY_CSV_FILE, SUMMARY_FILE};
use crate::domain::models::{BatchRunRecord, BatchSummary, RunSummary};
use crate::error::{HkError, HkResult};
use crate::services::pipeline::{self, RunOptions};
use crate::services::scoring::round_to;
use crate::services::{storage, validation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ERROR_LEVEL: &str = "ERROR";

/// `*.json` files directly inside `dir`, in lexical order.
pub fn collect_inputs(dir: &Path) -> HkResult<Vec<PathBuf>> {
    let rd = std::fs::read_dir(dir).map_err(|e| HkError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in rd {
        let path = entry.map_err(|e| HkError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|x| x == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn input_title(path: &Path, stem: &str) -> String {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
        .and_then(|v| v.get("title").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| stem.to_string())
}

fn success_row(stem: &str, file: &str, title: String, s: RunSummary) -> BatchRunRecord {
    BatchRunRecord {
        run_id: stem.to_string(),
        input_file: file.to_string(),
        title,
        report_id: Some(s.report_id),
        certification_level: s.certification_level.as_str().to_string(),
        hci: Some(s.hci),
        evid_effective: Some(s.evid_effective),
        inferred_ratio: Some(s.inferred_ratio),
        flags: s.flags,
    }
}

fn error_row(stem: &str, file: &str, title: String, err: &HkError) -> BatchRunRecord {
    BatchRunRecord {
        run_id: stem.to_string(),
        input_file: file.to_string(),
        title,
        report_id: Some(ERROR_LEVEL.to_string()),
        certification_level: ERROR_LEVEL.to_string(),
        hci: None,
        evid_effective: None,
        inferred_ratio: None,
        flags: vec![err.to_string()],
    }
}

fn mean(values: impl Iterator<Item = f64>, places: i32) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| round_to(sum / n as f64, places))
}

pub fn summarize(runs: Vec<BatchRunRecord>) -> BatchSummary {
    let mut counts_by_level: BTreeMap<String, usize> = BTreeMap::new();
    for r in &runs {
        *counts_by_level.entry(r.certification_level.clone()).or_default() += 1;
    }
    BatchSummary {
        total_runs: runs.len(),
        counts_by_level,
        avg_hci: mean(runs.iter().filter_map(|r| r.hci), 3),
        avg_evid_effective: mean(runs.iter().filter_map(|r| r.evid_effective), 3),
        avg_inferred_ratio: mean(runs.iter().filter_map(|r| r.inferred_ratio), 4),
        runs,
    }
}

/// Flat row for `summary.csv`; flags are `|`-joined and missing numbers are empty.
#[derive(Serialize)]
struct CsvRow<'a> {
    run_id: &'a str,
    input_file: &'a str,
    title: &'a str,
    report_id: Option<&'a str>,
    certification_level: &'a str,
    hci: Option<f64>,
    evid_effective: Option<f64>,
    inferred_ratio: Option<f64>,
    flags: String,
}

pub fn summary_csv(summary: &BatchSummary) -> HkResult<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    for r in &summary.runs {
        w.serialize(CsvRow {
            run_id: &r.run_id,
            input_file: &r.input_file,
            title: &r.title,
            report_id: r.report_id.as_deref(),
            certification_level: &r.certification_level,
            hci: r.hci,
            evid_effective: r.evid_effective,
            inferred_ratio: r.inferred_ratio,
            flags: r.flags.join("|"),
        })?;
    }
    w.into_inner().map_err(|e| HkError::io(SUMMARY_CSV_FILE, e.into_error()))
}

/// Runs every input into `<output>/runs/<stem>` against one shared ledger and
/// writes `summary.json` and `summary.csv` under `<output>`. A bad input
/// becomes an `ERROR` row; a broken or unreadable ledger aborts the whole batch.
pub fn run_batch(
    inputs: &Path,
    output: &Path,
    ledger_path: &Path,
    overwrite: bool,
) -> HkResult<BatchSummary> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        return Err(HkError::EmptyBatch(inputs.to_path_buf()));
    }
    info!(inputs = files.len(), output = %output.display(), "batch started");

    let mut rows = Vec::with_capacity(files.len());
    for file in &files {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = input_title(file, &stem);
        let opts = RunOptions {
            run_id: None,
            overwrite,
        };

        let result = validation::load_report(file).and_then(|report| {
            pipeline::run_report(
                &report,
                &pipeline::default_run_dir(output, &stem),
                ledger_path,
                &opts,
            )
        });
        match result {
            Ok(summary) => rows.push(success_row(&stem, &name, title, summary)),
            Err(e @ (HkError::LedgerIntegrity { .. } | HkError::LedgerParse { .. })) => {
                return Err(e)
            }
            Err(e) => {
                warn!(input = %name, error = %e, "batch input failed");
                rows.push(error_row(&stem, &name, title, &e));
            }
        }
    }

    let summary = summarize(rows);
    let json = serde_json::to_string_pretty(&summary)?;
    let csv = summary_csv(&summary)?;
    storage::write_atomic(&output.join(SUMMARY_FILE), json.as_bytes())?;
    storage::write_atomic(&output.join(SUMMARY_CSV_FILE), &csv)?;
    info!(
        total = summary.total_runs,
        avg_hci = ?summary.avg_hci,
        "batch complete"
    );
    Ok(summary)
}
