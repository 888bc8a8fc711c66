use chrono::{Datelike, SecondsFormat, Utc};
use rand::Rng;

const ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
        .collect()
}

/// RFC 3339 UTC with a `Z` suffix.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn report_id() -> String {
    format!("HK-{}-{}", Utc::now().year(), random_suffix(6))
}

pub fn audit_id() -> String {
    format!("AUD-{}-{}", Utc::now().year(), random_suffix(8))
}

pub fn ledger_entry_id() -> String {
    format!("LED-{}-{}", Utc::now().timestamp_millis(), random_suffix(4))
}
