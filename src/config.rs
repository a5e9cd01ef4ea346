//! JSON configuration for a simulation run. Every field may be omitted.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::logger::LogLevel;
use crate::model::durations::DurationRanges;
use crate::model::item::Position;
use crate::model::simulation::LineSettings;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the duration stream; omit for a fresh stream each run
    pub seed: Option<u64>,
    pub initial_speed: f64,
    /// How often the terminal driver ticks and redraws
    pub tick_rate_ms: u64,
    pub durations: DurationRanges,
    pub layout: LayoutConfig,
    pub transfer: TransferConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub ws1_station: Position,
    pub ws2_entry: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub easing: f64,
    pub snap_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Log file, appended to. The terminal UI logs only here.
    pub file: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed: None,
            initial_speed: 1.0,
            tick_rate_ms: 16,
            durations: DurationRanges::default(),
            layout: LayoutConfig::default(),
            transfer: TransferConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let line = LineSettings::default();
        LayoutConfig {
            ws1_station: line.ws1_station,
            ws2_entry: line.ws2_entry,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        let line = LineSettings::default();
        TransferConfig {
            easing: line.easing,
            snap_distance: line.snap_distance,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LogLevel::Info,
            file: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(config_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let path = Path::new(config_path);
        if !path.exists() {
            return Err(format!("Config file not found at {}", config_path).into());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.durations.first_invalid() {
            return Err(format!("Duration range '{}' has min greater than max", name));
        }
        if !self.initial_speed.is_finite() || self.initial_speed <= 0.0 {
            return Err(format!("initial_speed must be positive, got {}", self.initial_speed));
        }
        if self.tick_rate_ms == 0 {
            return Err("tick_rate_ms must be at least 1".to_string());
        }
        if !(self.transfer.easing > 0.0 && self.transfer.easing <= 1.0) {
            return Err(format!("transfer.easing must be in (0, 1], got {}", self.transfer.easing));
        }
        if !self.transfer.snap_distance.is_finite() || self.transfer.snap_distance < 0.0 {
            return Err(format!(
                "transfer.snap_distance must be non-negative, got {}",
                self.transfer.snap_distance
            ));
        }
        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn line_settings(&self) -> LineSettings {
        LineSettings {
            initial_speed: self.initial_speed,
            ws1_station: self.layout.ws1_station,
            ws2_entry: self.layout.ws2_entry,
            easing: self.transfer.easing,
            snap_distance: self.transfer.snap_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::durations::MinuteRange;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn empty_object_gives_defaults() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.durations.production, MinuteRange::new(65, 85));
        assert_eq!(config.line_settings(), LineSettings::default());
        assert_eq!(config.tick_rate(), Duration::from_millis(16));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let json = serde_json::json!({
            "seed": 42,
            "initial_speed": 5.0,
            "durations": { "setup": { "min": 1, "max": 2 } },
            "layout": { "ws2_entry": { "x": 10.0, "y": 20.0 } },
            "log": { "level": "debug", "file": "line.log" }
        });
        let config = SimulationConfig::from_json(&json.to_string()).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.durations.setup, MinuteRange::new(1, 2));
        assert_eq!(config.durations.processing, MinuteRange::new(30, 45));
        assert_eq!(config.layout.ws2_entry, Position::new(10.0, 20.0));
        assert_eq!(config.layout.ws1_station, LayoutConfig::default().ws1_station);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.file.as_deref(), Some("line.log"));
        assert_eq!(config.line_settings().initial_speed, 5.0);
    }

    #[test]
    fn rejects_reversed_range() {
        let json = r#"{ "durations": { "processing": { "min": 45, "max": 30 } } }"#;
        let err = SimulationConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("processing"));
    }

    #[test]
    fn rejects_bad_speed_and_easing() {
        assert!(SimulationConfig::from_json(r#"{ "initial_speed": 0 }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "transfer": { "easing": 1.5 } }"#).is_err());
        assert!(SimulationConfig::from_json(r#"{ "tick_rate_ms": 0 }"#).is_err());
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("workshopsim_test_{}.json", timestamp));
        std::fs::write(&path, r#"{ "seed": 7, "tick_rate_ms": 50 }"#).unwrap();

        let config = SimulationConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tick_rate(), Duration::from_millis(50));
        let _ = std::fs::remove_file(&path);

        let err = SimulationConfig::load(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
