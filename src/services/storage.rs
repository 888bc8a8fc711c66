use crate::domain::constants::LEDGER_FILE;
use crate::domain::models::ConfigFile;
use crate::error::{HkError, HkResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

fn config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config/humanklu/config.toml"))
}

pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = std::fs::read_to_string(&path)?;
    let cfg: ConfigFile = toml::from_str(&raw)?;
    debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

fn configured_ledger(flag: Option<&Path>, config: &ConfigFile) -> Option<PathBuf> {
    flag.map(Path::to_path_buf).or_else(|| {
        config
            .general
            .ledger_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    })
}

/// `--ledger` wins, then the configured path, then the batch layout
/// (`<batch>/runs/<run>` shares `<batch>/ledger.jsonl`), then the working dir.
pub fn resolve_ledger_path(flag: Option<&Path>, config: &ConfigFile, output: &Path) -> PathBuf {
    if let Some(p) = configured_ledger(flag, config) {
        return p;
    }
    match output.parent().and_then(Path::parent) {
        Some(root) if !root.as_os_str().is_empty() => root.join(LEDGER_FILE),
        _ => PathBuf::from(LEDGER_FILE),
    }
}

pub fn resolve_batch_ledger_path(
    flag: Option<&Path>,
    config: &ConfigFile,
    output_root: &Path,
) -> PathBuf {
    configured_ledger(flag, config).unwrap_or_else(|| output_root.join(LEDGER_FILE))
}

/// Ledger for commands with no run folder to anchor on.
pub fn resolve_standalone_ledger_path(flag: Option<&Path>, config: &ConfigFile) -> PathBuf {
    configured_ledger(flag, config).unwrap_or_else(|| PathBuf::from(LEDGER_FILE))
}

/// Write-then-rename for a single file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> HkResult<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| HkError::io(&dir, e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| HkError::io(&dir, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| HkError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| HkError::io(path, e.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A fully written run folder waiting in a hidden sibling directory.
/// Dropping it without [`StagedRun::publish`] discards every file.
#[derive(Debug)]
pub struct StagedRun {
    staging: TempDir,
    target: PathBuf,
    overwrite: bool,
}

/// Writes every file into a staging directory next to `target`. Refuses an
/// existing target unless `overwrite` is set.
pub fn stage_run(target: &Path, files: &[(&str, &[u8])], overwrite: bool) -> HkResult<StagedRun> {
    if target.exists() && !overwrite {
        return Err(HkError::RunExists(target.to_path_buf()));
    }
    let parent = parent_dir(target);
    std::fs::create_dir_all(&parent).map_err(|e| HkError::io(&parent, e))?;
    let staging = tempfile::Builder::new()
        .prefix(".hk-staging-")
        .tempdir_in(&parent)
        .map_err(|e| HkError::io(&parent, e))?;

    for (name, bytes) in files {
        let path = staging.path().join(name);
        std::fs::write(&path, bytes).map_err(|e| HkError::io(&path, e))?;
    }
    debug!(target = %target.display(), files = files.len(), "run staged");
    Ok(StagedRun {
        staging,
        target: target.to_path_buf(),
        overwrite,
    })
}

impl StagedRun {
    /// Moves the staged folder onto the target with a single rename.
    pub fn publish(self) -> HkResult<PathBuf> {
        if self.target.exists() {
            if !self.overwrite {
                return Err(HkError::RunExists(self.target));
            }
            std::fs::remove_dir_all(&self.target).map_err(|e| HkError::io(&self.target, e))?;
        }
        std::fs::rename(self.staging.path(), &self.target)
            .map_err(|e| HkError::io(&self.target, e))?;
        Ok(self.target)
    }
}
