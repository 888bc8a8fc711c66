use assert_cmd::cargo::cargo_bin_cmd;
use jsonschema::JSONSchema;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn run_json(home: &Path, args: &[&str]) -> Value {
    let mut cmd = cargo_bin_cmd!("humanklu");
    cmd.env("HOME", home).current_dir(home).arg("--json").args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("valid json output")
}

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("{schema_name} validation failed: {}", msgs.join(" | "));
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_inputs(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    let dims = |evid: f64| {
        json!({
            "EVID": {"score": evid, "rationale": "r"}, "MECH": {"score": 8.0, "rationale": "r"},
            "INC": {"score": 8.0, "rationale": "r"}, "RISK": {"score": 8.0, "rationale": "r"},
            "SPEC": {"score": 8.0, "rationale": "r"}
        })
    };
    fs::write(
        dir.join("01_mixed.json"),
        json!({
            "title": "Mixed evidence report",
            "author": {"model_version": "model-a"},
            "dimensions": dims(9.0),
            "claims": [
                {"text": "Signed releases since 2023", "evidence_type": "VERIFIED",
                 "source": {"type": "WEB", "uri": "https://example.com/releases", "title": "Releases"}},
                {"text": "There is no public audit of the updater", "evidence_type": "VERIFIED"},
                {"text": "Likely reuses the vendor SDK", "source_url": "https://example.com/sdk"}
            ]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("02_institutional.json"),
        json!({
            "title": "Institutional grade report",
            "dimensions": {
                "EVID": {"score": 9.0}, "MECH": {"score": 8.5}, "INC": {"score": 8.5},
                "RISK": {"score": 8.5}, "SPEC": {"score": 8.5}
            },
            "claims": [{"text": "Audited by two firms", "evidence_type": "VERIFIED",
                        "source": {"type": "REPORT", "uri": "https://example.com/a", "title": "Audit"}}]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(dir.join("03_invalid.json"), json!({"title": "No dimensions"}).to_string()).unwrap();
}

#[test]
fn contracts_check() {
    let tmp = TempDir::new().unwrap();
    let home = tmp.path().join("home");
    let inputs = tmp.path().join("inputs");
    let out = tmp.path().join("batch");
    fs::create_dir_all(&home).unwrap();
    write_inputs(&inputs);

    let batch = run_json(
        &home,
        &[
            "batch",
            "--inputs",
            inputs.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ],
    );
    assert_eq!(batch["ok"], true);
    validate("batch_summary.schema.json", &batch["data"]);
    validate("batch_summary.schema.json", &read(&out.join("summary.json")));

    for run in ["01_mixed", "02_institutional"] {
        let dir = out.join("runs").join(run);
        validate("evidence.schema.json", &read(&dir.join("evidence.json")));
        validate("sci_score.schema.json", &read(&dir.join("sci_score.json")));
        validate("audit.schema.json", &read(&dir.join("humanklu_audit.json")));
    }

    let inst = read(&out.join("runs/02_institutional/humanklu_audit.json"));
    assert_eq!(inst["certification_level"], "HK-INSTITUTIONAL");
    assert_eq!(inst["institutional_requires_two_reviews"], true);

    let ledger_path = out.join("ledger.jsonl");
    let raw = fs::read_to_string(&ledger_path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        validate("ledger_entry.schema.json", &serde_json::from_str(line).unwrap());
    }

    let listed = run_json(&home, &["--ledger", ledger_path.to_str().unwrap(), "ledger", "list"]);
    for entry in listed["data"].as_array().unwrap() {
        validate("ledger_entry.schema.json", entry);
    }
}
