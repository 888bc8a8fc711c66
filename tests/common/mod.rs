#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(work.join("inputs")).expect("create work dir");
        Self {
            _tmp: tmp,
            home,
            work,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("humanklu");
        cmd.env("HOME", &self.home)
            .env_remove("RUST_LOG")
            .current_dir(&self.work);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.work.join(rel)
    }

    pub fn arg(&self, rel: &str) -> String {
        self.path(rel).to_string_lossy().into_owned()
    }

    pub fn write_input(&self, name: &str, body: &Value) -> String {
        let path = self.work.join("inputs").join(name);
        fs::write(&path, serde_json::to_string_pretty(body).expect("serialize input"))
            .expect("write input");
        path.to_string_lossy().into_owned()
    }

    pub fn write_config(&self, toml: &str) {
        let dir = self.home.join(".config/humanklu");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("config.toml"), toml).expect("write config");
    }

    pub fn ledger_lines(&self, rel: &str) -> Vec<Value> {
        let raw = fs::read_to_string(self.path(rel)).unwrap_or_default();
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("ledger line is json"))
            .collect()
    }
}

pub fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("read artifact");
    serde_json::from_str(&raw).expect("artifact is json")
}

pub fn dims(evid: f64, rest: f64) -> Value {
    json!({
        "EVID": {"score": evid, "rationale": "evidence quality"},
        "MECH": {"score": rest, "rationale": "mechanism"},
        "INC":  {"score": rest, "rationale": "incentives"},
        "RISK": {"score": rest, "rationale": "risk"},
        "SPEC": {"score": rest, "rationale": "specificity"}
    })
}

pub fn verified_claim(i: usize) -> Value {
    json!({
        "claim_id": format!("CLM-{:03}", i),
        "text": format!("Benchmark {} reproduced on published hardware", i),
        "evidence_type": "VERIFIED",
        "source": {"type": "WEB", "uri": format!("https://example.com/bench/{}", i), "title": "Bench"}
    })
}

/// EVID 9, others 8, ten verified claims: HK-PRO at HCI 8.2.
pub fn pro_report() -> Value {
    json!({
        "title": "Edge inference accelerator review",
        "topic": "Hardware",
        "summary": "Throughput and power measurements.",
        "author": {"model_version": "model-2026-01", "organization": "Acme Labs"},
        "dimensions": dims(9.0, 8.0),
        "hallucination_flags": [],
        "claims": (1..=10).map(verified_claim).collect::<Vec<_>>()
    })
}

/// No claims at all: ratio 1.0 caps EVID to 6.5 and lands on HK-REVIEWED.
pub fn zero_claims_report() -> Value {
    json!({
        "title": "Unsourced market outlook",
        "dimensions": dims(9.0, 9.0),
        "claims": []
    })
}

pub fn hallucinated_report() -> Value {
    let mut r = pro_report();
    r["title"] = json!("Report with fabricated citation");
    r["hallucination_flags"] = json!(["Cited paper does not exist"]);
    r
}

pub fn absence_report() -> Value {
    let mut r = pro_report();
    r["title"] = json!("Firmware supply chain review");
    r["claims"][3] = json!({
        "text": "There is no third-party audit of the bootloader",
        "evidence_type": "VERIFIED"
    });
    r
}
