use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Highest sample rate a user may request; out-of-range input is clamped to it.
pub const MAX_SAMPLE_RATE_HZ: u32 = 50;

/// Sample rate used until configured otherwise.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 20;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        if let Some((key, value)) = parse_dotenv_line(line)
            // Only set if not already set (env vars take precedence)
            && std::env::var(key).is_err()
        {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let mut value = value.trim();

    // Remove surrounding quotes if present
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value = &value[1..value.len() - 1];
    }
    Some((key, value))
}

/// Parse user-entered sample rate text.
///
/// Returns `None` when the text is not a number, in which case the caller
/// keeps its previous rate. Zero, negative and too-high rates clamp to
/// [`MAX_SAMPLE_RATE_HZ`].
pub fn parse_sample_rate(text: &str) -> Option<u32> {
    let hz: i64 = text.trim().parse().ok()?;
    if hz <= 0 || hz > i64::from(MAX_SAMPLE_RATE_HZ) {
        return Some(MAX_SAMPLE_RATE_HZ);
    }
    Some(hz as u32)
}

/// Minimum interval between accepted samples for a rate; zero disables throttling.
pub fn update_interval_for(hz: u32) -> Duration {
    if hz == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(u64::from(1000 / hz))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Target sample rate per sensor in Hz.
    pub target_hz: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Shortest wait before a one-shot sensor fires.
    pub trigger_min_secs: u64,
    /// Longest wait before a one-shot sensor fires.
    pub trigger_max_secs: u64,
    /// List secondary sensors next to the defaults.
    pub include_duplicates: bool,
    /// Fixed seed for reproducible signals.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig {
                target_hz: DEFAULT_SAMPLE_RATE_HZ,
            },
            simulation: SimulationConfig {
                trigger_min_secs: 3,
                trigger_max_secs: 10,
                include_duplicates: true,
                seed: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(rate) = lookup("SENSOR_TARGET_HZ")
            && let Some(hz) = parse_sample_rate(&rate)
        {
            config.monitor.target_hz = hz;
        }

        // Simulation configuration
        if let Some(secs) = lookup("SENSOR_SIM_TRIGGER_MIN_SECS")
            && let Ok(s) = secs.parse()
        {
            config.simulation.trigger_min_secs = s;
        }
        if let Some(secs) = lookup("SENSOR_SIM_TRIGGER_MAX_SECS")
            && let Ok(s) = secs.parse()
        {
            config.simulation.trigger_max_secs = s;
        }
        if let Some(flag) = lookup("SENSOR_SIM_DUPLICATES")
            && let Ok(f) = flag.parse()
        {
            config.simulation.include_duplicates = f;
        }
        if let Some(seed) = lookup("SENSOR_SIM_SEED")
            && let Ok(s) = seed.parse()
        {
            config.simulation.seed = Some(s);
        }

        config
    }

    /// Throttle interval matching the configured target rate.
    pub fn update_target(&self) -> Duration {
        update_interval_for(self.monitor.target_hz)
    }
}
