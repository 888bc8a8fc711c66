//! Append-only, hash-chained run ledger (`ledger.jsonl`).
//!
//! Each entry's `chain_hash` is `sha256(canonical payload || previous chain hash)`,
//! with [`GENESIS_HASH`] standing in for the previous hash of the first entry.
//! A [`Ledger`] handle is opened (read + verified), appended to once, and
//! consumed by the write. The file is replaced via write-then-rename so readers
//! never observe a partial write.

use crate::domain::constants::GENESIS_HASH;
use crate::domain::models::{CertificationLevel, ChainVerification, LedgerEntry};
use crate::error::{HkError, HkResult};
use crate::services::{audit, ids, storage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Every stored field except the two chain hashes, in storage order.
#[derive(Serialize)]
struct EntryPayload<'a> {
    entry_id: &'a str,
    timestamp: &'a str,
    report_id: &'a str,
    audit_id: &'a str,
    event_type: &'a str,
    certification_level: CertificationLevel,
    hci: f64,
    evid_effective: f64,
    inferred_ratio: f64,
    author_model: &'a str,
    human_reviewer: Option<&'a str>,
    notes: &'a str,
    prev_entry_id: Option<&'a str>,
}

pub fn entry_payload(entry: &LedgerEntry) -> HkResult<String> {
    let payload = EntryPayload {
        entry_id: &entry.entry_id,
        timestamp: &entry.timestamp,
        report_id: &entry.report_id,
        audit_id: &entry.audit_id,
        event_type: &entry.event_type,
        certification_level: entry.certification_level,
        hci: entry.hci,
        evid_effective: entry.evid_effective,
        inferred_ratio: entry.inferred_ratio,
        author_model: &entry.author_model,
        human_reviewer: entry.human_reviewer.as_deref(),
        notes: &entry.notes,
        prev_entry_id: entry.prev_entry_id.as_deref(),
    };
    Ok(serde_json::to_string(&payload)?)
}

pub fn chain_hash(payload: &str, previous_hash: &str) -> String {
    let mut buf = String::with_capacity(payload.len() + previous_hash.len());
    buf.push_str(payload);
    buf.push_str(previous_hash);
    audit::sha256_hex(buf.as_bytes())
}

/// Chain hashes recomputed from genesis, ignoring what is stored.
pub fn recompute_chain(entries: &[LedgerEntry]) -> HkResult<Vec<String>> {
    let mut prev = GENESIS_HASH.to_string();
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let h = chain_hash(&entry_payload(entry)?, &prev);
        out.push(h.clone());
        prev = h;
    }
    Ok(out)
}

pub fn verify_chain(entries: &[LedgerEntry]) -> HkResult<ChainVerification> {
    let recomputed = recompute_chain(entries)?;
    let mut prev: &str = GENESIS_HASH;
    for (i, (entry, expected)) in entries.iter().zip(&recomputed).enumerate() {
        let problem = if entry.prev_chain_hash != prev {
            Some(format!(
                "entry {} has broken chain link (expected prev: {}, got: {})",
                entry.entry_id, prev, entry.prev_chain_hash
            ))
        } else if &entry.chain_hash != expected {
            Some(format!(
                "entry {} has invalid chain hash (stored: {}, recomputed: {})",
                entry.entry_id, entry.chain_hash, expected
            ))
        } else {
            None
        };
        if let Some(msg) = problem {
            return Ok(ChainVerification {
                valid: false,
                total_entries: entries.len(),
                verified_entries: i,
                first_invalid_index: Some(i),
                error_message: Some(msg),
                head_hash: prev.to_string(),
            });
        }
        prev = expected.as_str();
    }
    Ok(ChainVerification {
        valid: true,
        total_entries: entries.len(),
        verified_entries: entries.len(),
        first_invalid_index: None,
        error_message: None,
        head_hash: prev.to_string(),
    })
}

/// Reads every entry without checking the chain. A missing file is an empty ledger.
pub fn read_entries(path: &Path) -> HkResult<Vec<LedgerEntry>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let raw = std::fs::read_to_string(path).map_err(|e| HkError::io(path, e))?;
    let mut out = Vec::new();
    for (i, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(line).map_err(|e| HkError::LedgerParse {
            path: path.to_path_buf(),
            line: i + 1,
            reason: e.to_string(),
        })?;
        out.push(entry);
    }
    Ok(out)
}

/// Outcome fields of one run, before ids and hashes are assigned.
#[derive(Debug, Clone)]
pub struct LedgerDraft {
    pub report_id: String,
    pub audit_id: String,
    pub certification_level: CertificationLevel,
    pub hci: f64,
    pub evid_effective: f64,
    pub inferred_ratio: f64,
    pub author_model: String,
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
    head: String,
}

impl Ledger {
    /// Reads and verifies the whole ledger. A broken chain is fatal.
    pub fn open(path: &Path) -> HkResult<Self> {
        let entries = read_entries(path)?;
        let check = verify_chain(&entries)?;
        if !check.valid {
            return Err(HkError::LedgerIntegrity {
                path: path.to_path_buf(),
                index: check.first_invalid_index.unwrap_or(0),
                reason: check.error_message.unwrap_or_default(),
            });
        }
        debug!(path = %path.display(), entries = entries.len(), "ledger verified");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            head: check.head_hash,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn head_hash(&self) -> &str {
        &self.head
    }

    /// Builds the next entry linked to the current head. Nothing is written.
    pub fn prepare(&self, draft: LedgerDraft) -> HkResult<LedgerEntry> {
        let mut entry = LedgerEntry {
            entry_id: ids::ledger_entry_id(),
            timestamp: ids::now_rfc3339(),
            report_id: draft.report_id,
            audit_id: draft.audit_id,
            event_type: "CREATED".to_string(),
            certification_level: draft.certification_level,
            hci: draft.hci,
            evid_effective: draft.evid_effective,
            inferred_ratio: draft.inferred_ratio,
            author_model: draft.author_model,
            human_reviewer: None,
            notes: "Initial pipeline run.".to_string(),
            prev_entry_id: self.entries.last().map(|e| e.entry_id.clone()),
            prev_chain_hash: self.head.clone(),
            chain_hash: String::new(),
        };
        entry.chain_hash = chain_hash(&entry_payload(&entry)?, &self.head);
        Ok(entry)
    }

    /// Writes the full ledger plus `entry` to a sibling temp file, syncs it and
    /// renames it over the ledger. On error the original file is untouched.
    pub fn commit(mut self, entry: LedgerEntry) -> HkResult<LedgerEntry> {
        self.entries.push(entry.clone());
        let mut body = String::new();
        for e in &self.entries {
            body.push_str(&serde_json::to_string(e)?);
            body.push('\n');
        }
        storage::write_atomic(&self.path, body.as_bytes())?;

        info!(
            path = %self.path.display(),
            entry = %entry.entry_id,
            chain_hash = %entry.chain_hash,
            "ledger entry appended"
        );
        Ok(entry)
    }

    pub fn append(self, draft: LedgerDraft) -> HkResult<LedgerEntry> {
        let entry = self.prepare(draft)?;
        self.commit(entry)
    }
}
