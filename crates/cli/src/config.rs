use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use saldo_core::MatchConfig;
use saldo_recon::{EligibilityFilter, KnownPattern, KnownPatternTable, LedgerOptions};
use serde::Deserialize;

/// Run configuration, loaded from an optional TOML file. Every field
/// has a compiled-in default, so a missing file or a partial file both
/// work.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default, rename = "known_pattern")]
    pub known_patterns: Vec<KnownPattern>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Account whose transactions are reconciled against receipts.
    #[serde(default = "default_account")]
    pub account: String,
    /// Description prefixes that mark a transaction as reconcilable.
    #[serde(default = "default_description_patterns")]
    pub description_patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    #[serde(default = "default_window")]
    pub date_window_days: i64,
    /// Amount tolerance in cents.
    #[serde(default = "default_tolerance")]
    pub amount_tolerance: i64,
    #[serde(default = "default_high")]
    pub confidence_high: u32,
    #[serde(default = "default_low")]
    pub confidence_low: u32,
    /// Drop ledger rows without a category hint before dedup.
    #[serde(default = "default_skip_blank_hint")]
    pub skip_blank_hint: bool,
}

fn default_account() -> String {
    "Chase Sapphire".to_string()
}

fn default_description_patterns() -> Vec<String> {
    vec!["Amazon".to_string(), "AMZN".to_string(), "Amzn".to_string()]
}

fn default_window() -> i64 {
    MatchConfig::default().date_window_days
}

fn default_tolerance() -> i64 {
    MatchConfig::default().amount_tolerance_cents
}

fn default_high() -> u32 {
    MatchConfig::default().confidence_high
}

fn default_low() -> u32 {
    MatchConfig::default().confidence_low
}

fn default_skip_blank_hint() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            account: default_account(),
            description_patterns: default_description_patterns(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            date_window_days: default_window(),
            amount_tolerance: default_tolerance(),
            confidence_high: default_high(),
            confidence_low: default_low(),
            skip_blank_hint: default_skip_blank_hint(),
        }
    }
}

impl RunConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            date_window_days: self.matching.date_window_days,
            amount_tolerance_cents: self.matching.amount_tolerance,
            confidence_high: self.matching.confidence_high,
            confidence_low: self.matching.confidence_low,
        }
    }

    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            skip_blank_hint: self.matching.skip_blank_hint,
        }
    }

    pub fn eligibility_filter(&self) -> EligibilityFilter {
        EligibilityFilter {
            account: self.filter.account.clone(),
            description_patterns: self.filter.description_patterns.clone(),
        }
    }

    /// The configured pattern table, or the built-in one when the file
    /// declares none.
    pub fn pattern_table(&self) -> KnownPatternTable {
        if self.known_patterns.is_empty() {
            KnownPatternTable::default()
        } else {
            KnownPatternTable::new(self.known_patterns.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_without_file() {
        let config = RunConfig::load(None).unwrap();
        assert_eq!(config.filter.account, "Chase Sapphire");
        assert_eq!(config.match_config(), MatchConfig::default());
        assert!(config.matching.skip_blank_hint);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[matching]\nconfidence_high = 70\nskip_blank_hint = false\n"
        )
        .unwrap();
        let config = RunConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.match_config().confidence_high, 70);
        assert_eq!(config.match_config().confidence_low, 40);
        assert!(!config.ledger_options().skip_blank_hint);
        assert_eq!(config.filter.description_patterns.len(), 3);
    }

    #[test]
    fn known_patterns_override_builtins() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[[known_pattern]]\npattern = \"Amazon Music\"\nclean_name = \"Amazon Music - Subscription\"\n"
        )
        .unwrap();
        let config = RunConfig::load(Some(file.path())).unwrap();
        let table = config.pattern_table();
        assert_eq!(
            table.lookup("AMAZON MUSIC 1X2Y3"),
            Some("Amazon Music - Subscription")
        );
        assert_eq!(table.lookup("Amazon Prime"), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[matching]\nconfidence = 70\n").unwrap();
        assert!(RunConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_errors() {
        assert!(RunConfig::load(Some(Path::new("/nonexistent/saldo.toml"))).is_err());
    }
}
