//! Service layer: the scoring engine plus its recording and output helpers.
//!
//! ## Service map
//! - `validation.rs`: input parsing, defaults and field-named rejections.
//! - `classifier.rs`: per-claim evidence type and absence-assertion flags.
//! - `scoring.rs`: inferred ratio, EVID ceiling and HCI.
//! - `certification.rs`: ordered tier rule table.
//! - `audit.rs`: canonical payload and content hash.
//! - `ledger.rs`: hash-chained `ledger.jsonl` read/verify/append.
//! - `artifacts.rs`: evidence, score, report and audit documents.
//! - `pipeline.rs`: one full run with staged publication; dry-run scoring.
//! - `batch.rs`: directory runs and `summary.json`.
//! - `storage.rs`: config file, ledger path resolution, atomic writes.
//! - `ids.rs`: run/audit/entry ids and timestamps.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Engine stages (`classifier` through `audit`) are pure.
//! - Side effects live in `ledger`, `storage`, `pipeline` and `batch`.
//! - Keep command handlers thin; delegate to services.

pub mod artifacts;
pub mod audit;
pub mod batch;
pub mod certification;
pub mod classifier;
pub mod ids;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod storage;
pub mod validation;
