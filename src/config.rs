//! Viewer configuration and the handful of locale-dependent labels.
//!
//! Resolution order: built-in defaults, then a YAML file (`BGRVIEW_CONFIG`, or
//! `bgrview.yaml` in the working directory when present), then the
//! `BGRVIEW_MASTER_DATA` / `BGRVIEW_LOCALE` environment overrides. CLI flags
//! are applied last by the caller.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::dmglog::Attribution;
use crate::data::registry::DEFAULT_MASTER_DATA_PATH;

pub const CONFIG_ENV: &str = "BGRVIEW_CONFIG";
pub const MASTER_DATA_ENV: &str = "BGRVIEW_MASTER_DATA";
pub const LOCALE_ENV: &str = "BGRVIEW_LOCALE";
pub const DEFAULT_CONFIG_FILE: &str = "bgrview.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ja" | "jp" => Ok(Self::Ja),
            _ => Err(ConfigError::InvalidValue {
                field: "locale",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated text.
    #[default]
    Table,
    Csv,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" | "tsv" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            _ => Err(ConfigError::InvalidValue {
                field: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub master_data: PathBuf,
    pub locale: Locale,
    pub attribution: Attribution,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master_data: PathBuf::from(DEFAULT_MASTER_DATA_PATH),
            locale: Locale::default(),
            attribution: Attribution::default(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Load from the process environment and working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let explicit = lookup(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.is_file().then_some(local)
        });
        let mut config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_path(&path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = lookup(MASTER_DATA_ENV).filter(|v| !v.trim().is_empty()) {
            self.master_data = PathBuf::from(path);
        }
        if let Some(locale) = lookup(LOCALE_ENV).filter(|v| !v.trim().is_empty()) {
            self.locale = locale.parse()?;
        }
        Ok(())
    }

    pub fn labels(&self) -> Labels {
        Labels::for_locale(self.locale)
    }
}

/// Display tokens that differ between locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub hp: &'static str,
    pub critical: &'static str,
    pub hit: &'static str,
    pub auto: &'static str,
    pub manual: &'static str,
    pub checkpoint: &'static str,
    pub sp: &'static str,
    pub summon_auto: &'static str,
    pub skill_auto: &'static str,
    pub actor: &'static str,
    pub skill: &'static str,
    pub hits: &'static str,
    pub unit: &'static str,
    pub damage_taken: &'static str,
    pub taken_counts: &'static str,
    pub damage_given: &'static str,
    pub given_counts: &'static str,
    pub equipment: &'static str,
    pub buffs: &'static str,
}

impl Labels {
    pub const EN: Labels = Labels {
        hp: "HP:",
        critical: "critical",
        hit: "hit",
        auto: "auto",
        manual: "manual",
        checkpoint: "checkpoint",
        sp: "SP",
        summon_auto: "summon",
        skill_auto: "skill",
        actor: "actor",
        skill: "skill name",
        hits: "hits",
        unit: "unit",
        damage_taken: "damage taken",
        taken_counts: "taken (crit/hit/miss)",
        damage_given: "damage given",
        given_counts: "given (crit/hit)",
        equipment: "equipment",
        buffs: "buffs",
    };

    pub const JA: Labels = Labels {
        hp: "HP：",
        critical: "クリティカル",
        hit: "命中",
        auto: "自動",
        manual: "手動",
        checkpoint: "累計ダメージ",
        sp: "SP",
        summon_auto: "召喚",
        skill_auto: "スキル",
        actor: "行動者",
        skill: "スキル名",
        hits: "対象",
        unit: "ユニット",
        damage_taken: "被ダメ",
        taken_counts: "被(クリ/命中/ミス)",
        damage_given: "与ダメ",
        given_counts: "与(クリ/命中)",
        equipment: "装備",
        buffs: "バフ",
    };

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::EN,
            Locale::Ja => Self::JA,
        }
    }

    pub fn auto_flag(&self, flag: bool) -> &'static str {
        if flag {
            self.auto
        } else {
            self.manual
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::EN
    }
}
