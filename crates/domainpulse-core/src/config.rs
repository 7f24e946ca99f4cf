#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Path of the CSV export the record store is loaded from.
    pub data_path: String,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
    pub engine: EngineConfig,
}

/// Knobs of the comparison engine. Kept separate from [`Config`] so tests and
/// other hosts can build an engine without touching the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// A domain is a significant decline when its change is at or below
    /// `-decline_threshold_pct`.
    pub decline_threshold_pct: f64,
    pub tie_break: TieBreak,
}

/// How domains with bit-identical values for the selected metric are ordered
/// when ranks are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Keep the order in which domains first appear in the snapshot.
    #[default]
    FirstSeen,
    /// Compare the remaining metrics descending, then fall back to first-seen.
    SecondaryMetrics,
}

impl TieBreak {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "" | "first_seen" => Ok(Self::FirstSeen),
            "secondary_metrics" => Ok(Self::SecondaryMetrics),
            other => Err(format!(
                "invalid tie break '{other}': expected first_seen or secondary_metrics"
            )),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 100,
            decline_threshold_pct: 10.0,
            tie_break: TieBreak::FirstSeen,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            default_top_n: std::env::var("DOMAINPULSE_DEFAULT_TOP_N")
                .unwrap_or_else(|_| defaults.default_top_n.to_string())
                .parse()
                .map_err(|e| format!("invalid DOMAINPULSE_DEFAULT_TOP_N: {e}"))?,
            max_top_n: std::env::var("DOMAINPULSE_MAX_TOP_N")
                .unwrap_or_else(|_| defaults.max_top_n.to_string())
                .parse()
                .map_err(|e| format!("invalid DOMAINPULSE_MAX_TOP_N: {e}"))?,
            decline_threshold_pct: std::env::var("DOMAINPULSE_DECLINE_THRESHOLD_PCT")
                .unwrap_or_else(|_| defaults.decline_threshold_pct.to_string())
                .parse()
                .map_err(|e| format!("invalid DOMAINPULSE_DECLINE_THRESHOLD_PCT: {e}"))?,
            tie_break: TieBreak::parse(
                &std::env::var("DOMAINPULSE_TIE_BREAK").unwrap_or_default(),
            )?,
        };
        engine.validate()?;

        Ok(Self {
            port: std::env::var("DOMAINPULSE_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_path: std::env::var("DOMAINPULSE_DATA_PATH")
                .unwrap_or_else(|_| "./data/domain_data.csv".to_string()),
            cors_origins: std::env::var("DOMAINPULSE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            engine,
        })
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_top_n == 0 {
            return Err("default top N must be at least 1".to_string());
        }
        if self.default_top_n > self.max_top_n {
            return Err(format!(
                "default top N ({}) exceeds max top N ({})",
                self.default_top_n, self.max_top_n
            ));
        }
        if !self.decline_threshold_pct.is_finite() || self.decline_threshold_pct < 0.0 {
            return Err("decline threshold must be a non-negative number".to_string());
        }
        Ok(())
    }
}
