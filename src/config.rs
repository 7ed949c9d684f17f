//! Deployment configuration and state files for the `heat-claims` CLI
//!
//! The fixed wire constants are not configurable; only role holders and the
//! initial halt flag are.
//!
//! Every read-modify-write of a state or attestation file runs under an
//! exclusive advisory lock on a sibling `<file>.lock`, so concurrent
//! processes sharing one file are serialized.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256};
use anyhow::{bail, Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::access::{RoleTable, SystemStatus};
use crate::constants::PUBLIC_INPUT_COUNT;
use crate::engine::HeatEngine;
use crate::state::HeatState;
use crate::verifier::{AttestedProofVerifier, ProofVerifier};

/// Genesis configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatConfig {
    /// Assigns roles and halts/resumes the system
    pub owner: Address,
    /// Runs fee collection
    pub fee_collector: Address,
    /// Receives the treasury share
    pub treasury: Address,
    /// Start halted, e.g. until the verifier is wired up
    #[serde(default)]
    pub halted: bool,
}

impl HeatConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: HeatConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config JSON: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() {
            bail!("owner must not be the zero address");
        }
        if self.treasury.is_zero() {
            bail!("treasury must not be the zero address");
        }
        Ok(())
    }

    pub fn roles(&self) -> RoleTable {
        RoleTable::new(self.owner, self.fee_collector, self.treasury)
    }

    /// Empty state with the configured roles and status
    pub fn genesis(&self) -> HeatState {
        let mut state = HeatState::new(self.roles());
        if self.halted {
            state.status = SystemStatus::Halted;
        }
        state
    }
}

/// Load a state snapshot and check its accounting before use
pub fn load_state(path: &Path) -> Result<HeatState> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    let state: HeatState = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse state JSON: {}", path.display()))?;

    if !state.is_consistent() {
        bail!("State file {} fails the supply audit", path.display());
    }
    Ok(state)
}

pub fn save_state(path: &Path, state: &HeatState) -> Result<()> {
    write_json(path, state)
}

/// Write then rename so a crash never leaves a truncated file
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Exclusive advisory lock guarding one data file; released on drop
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until the lock for `target` is held
    pub fn acquire(target: &Path) -> Result<Self> {
        let path = lock_path(target);
        create_parent(&path)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("Failed to lock: {}", path.display()))?;
        log::debug!("acquired {}", path.display());
        Ok(Self { file, path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            log::warn!("failed to release {}: {}", self.path.display(), e);
        }
    }
}

fn lock_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Run `op` against the state in `state_path` as one locked
/// load / run / audit / save cycle.
///
/// The state is saved even when `op` fails: a claim rejected at the supply
/// ceiling has still consumed its nullifier. Failed gates write nothing, so
/// saving is harmless otherwise.
pub fn with_locked_engine<V, T, F>(state_path: &Path, verifier: V, op: F) -> Result<T>
where
    V: ProofVerifier + 'static,
    F: FnOnce(&HeatEngine) -> Result<T>,
{
    let _lock = FileLock::acquire(state_path)?;
    let engine = HeatEngine::from_state(load_state(state_path)?, verifier);

    let outcome = op(&engine);

    let state = engine.snapshot();
    if !state.is_consistent() {
        bail!("Refusing to save state that fails the supply audit");
    }
    save_state(state_path, &state)?;
    outcome
}

/// Write a genesis state, refusing to replace an existing one unless `force`
pub fn init_state(config: &HeatConfig, state_path: &Path, force: bool) -> Result<()> {
    let _lock = FileLock::acquire(state_path)?;
    if state_path.exists() && !force {
        bail!(
            "State file already exists: {} (use --force to overwrite)",
            state_path.display()
        );
    }
    save_state(state_path, &config.genesis())
}

/// Add one proof digest to the attestation file, creating it if missing.
/// Returns the digest and the number of attestations now recorded.
pub fn record_attestation(
    path: &Path,
    proof: &[u8],
    public_inputs: &[B256; PUBLIC_INPUT_COUNT],
) -> Result<(B256, usize)> {
    let _lock = FileLock::acquire(path)?;
    let mut verifier = load_attestations(path.exists().then_some(path))?;
    let digest = verifier.attest(proof, public_inputs);
    write_json(path, &verifier)?;
    Ok((digest, verifier.len()))
}

/// Load the list of attested proof digests; a missing file means none
pub fn load_attestations(path: Option<&Path>) -> Result<AttestedProofVerifier> {
    let Some(path) = path else {
        return Ok(AttestedProofVerifier::new());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read attestation file: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse attestation JSON: {}", path.display()))
}
