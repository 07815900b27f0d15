//! Session configuration: what to fish, where, and what to do when the
//! inventory fills up.
//!
//! The on-disk form ([`SessionConfig`], TOML) names catalog entries and is
//! intended to be edited by humans. It is resolved once, before the machine
//! is constructed, into [`ResolvedConfig`]; configuration errors are rejected
//! here and never surface as a runtime error state.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::catalog::{BankLocation, FishType, FishingLocation, FishingMethod};

/// What to do when the inventory is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageFullPolicy {
    /// Drop everything caught and keep fishing (power fishing).
    Drop,
    /// Walk to the configured bank.
    WalkToBank,
    /// Use a recognized bank-teleport item if one is carried.
    BankTeleportItem,
    /// Teleport to the anchor nearest the bank.
    FastTravel,
}

/// How to get back to the fishing spot after banking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnPolicy {
    Walk,
    FastTravel,
    /// Use a carried teleport item; treated as already arrived by this core.
    TeleportItem,
}

/// Operator-facing session configuration (TOML).
///
/// Missing fields default to a low-requirement power-fishing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Catalog name of the fishing location.
    pub location: String,
    /// Catalog name of the fishing method (spot type).
    pub method: String,
    /// Catalog name of the fish attributed to caught items.
    pub target_fish: String,
    /// Catalog name of the bank; may be empty when the policy is `drop`.
    pub bank: String,
    pub storage_full_policy: StorageFullPolicy,
    pub return_policy: ReturnPolicy,
    /// Carried but not acted on by this core; boost use is a fallback no-op.
    pub use_boost_potions: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            location: "Draynor Village".to_string(),
            method: "Net/Bait (Low)".to_string(),
            target_fish: "Raw shrimps".to_string(),
            bank: "Draynor Village".to_string(),
            storage_full_policy: StorageFullPolicy::Drop,
            return_policy: ReturnPolicy::Walk,
            use_boost_potions: false,
        }
    }
}

impl SessionConfig {
    /// Resolve catalog references and check cross-field invariants.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        if self.location.trim().is_empty() {
            return Err(anyhow!("location must be set"));
        }
        if self.method.trim().is_empty() {
            return Err(anyhow!("method must be set"));
        }
        let fishing = FishingLocation::by_name(&self.location)
            .ok_or_else(|| anyhow!("unknown fishing location {:?}", self.location))?;
        let method = FishingMethod::by_name(&self.method)
            .ok_or_else(|| anyhow!("unknown fishing method {:?}", self.method))?;
        let target = FishType::by_name(&self.target_fish)
            .ok_or_else(|| anyhow!("unknown fish {:?}", self.target_fish))?;
        if !method.yields(target) {
            return Err(anyhow!(
                "method {:?} does not yield {:?}",
                method.name,
                target.name
            ));
        }

        let bank = if self.bank.trim().is_empty() {
            None
        } else {
            Some(
                BankLocation::by_name(&self.bank)
                    .ok_or_else(|| anyhow!("unknown bank {:?}", self.bank))?,
            )
        };
        if self.storage_full_policy != StorageFullPolicy::Drop && bank.is_none() {
            return Err(anyhow!(
                "storage_full_policy {:?} requires a bank",
                self.storage_full_policy
            ));
        }

        Ok(ResolvedConfig {
            fishing,
            method,
            target,
            bank,
            storage_full_policy: self.storage_full_policy,
            return_policy: self.return_policy,
            use_boost_potions: self.use_boost_potions,
        })
    }
}

/// Catalog-backed configuration the machine runs with. Read-only for the
/// lifetime of a run.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConfig {
    pub fishing: &'static FishingLocation,
    pub method: &'static FishingMethod,
    pub target: &'static FishType,
    pub bank: Option<&'static BankLocation>,
    pub storage_full_policy: StorageFullPolicy,
    pub return_policy: ReturnPolicy,
    pub use_boost_potions: bool,
}

/// Load a session config from a TOML file.
///
/// If the file is missing, returns `SessionConfig::default()`.
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    if !path.exists() {
        return Ok(SessionConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SessionConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SessionConfig) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves() {
        let resolved = SessionConfig::default().resolve().expect("resolve");
        assert_eq!(resolved.fishing.name, "Draynor Village");
        assert_eq!(resolved.target.name, "Raw shrimps");
        assert!(resolved.bank.is_some());
    }

    #[test]
    fn unknown_location_is_rejected() {
        let cfg = SessionConfig {
            location: "Atlantis".to_string(),
            ..SessionConfig::default()
        };
        let err = cfg.resolve().unwrap_err();
        assert!(err.to_string().contains("unknown fishing location"));
    }

    #[test]
    fn banking_policy_without_bank_is_rejected() {
        let cfg = SessionConfig {
            bank: String::new(),
            storage_full_policy: StorageFullPolicy::WalkToBank,
            ..SessionConfig::default()
        };
        let err = cfg.resolve().unwrap_err();
        assert!(err.to_string().contains("requires a bank"));
    }

    #[test]
    fn drop_policy_without_bank_is_fine() {
        let cfg = SessionConfig {
            bank: String::new(),
            storage_full_policy: StorageFullPolicy::Drop,
            ..SessionConfig::default()
        };
        let resolved = cfg.resolve().expect("resolve");
        assert!(resolved.bank.is_none());
    }

    #[test]
    fn method_must_yield_target_fish() {
        let cfg = SessionConfig {
            target_fish: "Raw shark".to_string(),
            ..SessionConfig::default()
        };
        let err = cfg.resolve().unwrap_err();
        assert!(err.to_string().contains("does not yield"));
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, SessionConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("session.toml");
        let cfg = SessionConfig {
            location: "Catherby".to_string(),
            method: "Harpoon".to_string(),
            target_fish: "Raw tuna".to_string(),
            bank: "Catherby".to_string(),
            storage_full_policy: StorageFullPolicy::WalkToBank,
            return_policy: ReturnPolicy::Walk,
            use_boost_potions: false,
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }
}
