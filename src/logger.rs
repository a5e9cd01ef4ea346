use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::config::LogConfig;
use crate::model::time::{Event, EventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    #[serde(alias = "warn")]
    Warning = 2,
    Error = 3,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub struct Logger {
    min_level: LogLevel,
    log_file: Option<Arc<Mutex<std::fs::File>>>,
    console_output: bool,
}

impl Logger {
    /// Console output only
    pub fn new(min_level: LogLevel) -> Self {
        Logger {
            min_level,
            log_file: None,
            console_output: true,
        }
    }

    /// Console and file output
    pub fn with_file(min_level: LogLevel, file_path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        Ok(Logger {
            min_level,
            log_file: Some(Arc::new(Mutex::new(file))),
            console_output: true,
        })
    }

    /// Build from the `log` config section. With `console` off and no file
    /// configured the logger is silent.
    pub fn from_config(config: &LogConfig, console: bool) -> std::io::Result<Self> {
        let mut logger = match &config.file {
            Some(path) => Logger::with_file(config.level, path)?,
            None => Logger::new(config.level),
        };
        logger.set_console_output(console);
        Ok(logger)
    }

    pub fn set_console_output(&mut self, enabled: bool) {
        self.console_output = enabled;
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level && (self.console_output || self.log_file.is_some())
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let formatted = format!("[{}] [{}] {}", timestamp, level.as_str(), message);

        if self.console_output {
            eprintln!("{}", formatted);
        }

        if let Some(file) = &self.log_file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{}", formatted);
            }
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Item milestones at info, the steps in between at debug
    pub fn event(&self, event: &Event) {
        let (level, message) = describe_event(event);
        self.log(level, &message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(LogLevel::Info)
    }
}

fn describe_event(event: &Event) -> (LogLevel, String) {
    let at = event.time.as_minutes();
    match event.event_type {
        EventType::ItemScheduled { item_id } => (
            LogLevel::Info,
            format!("t={:.1}: P{} scheduled in WS1", at, item_id),
        ),
        EventType::ProductionComplete { item_id } => (
            LogLevel::Debug,
            format!("t={:.1}: P{} produced", at, item_id),
        ),
        EventType::TransferStarted { item_id } => (
            LogLevel::Debug,
            format!("t={:.1}: P{} transferring to WS2", at, item_id),
        ),
        EventType::QueuedForWs2 { item_id, queue_len } => (
            LogLevel::Debug,
            format!("t={:.1}: P{} queued for WS2 (queue {})", at, item_id, queue_len),
        ),
        EventType::ProcessingStarted { item_id } => (
            LogLevel::Debug,
            format!("t={:.1}: P{} processing in WS2", at, item_id),
        ),
        EventType::ProcessingComplete { item_id } => (
            LogLevel::Info,
            format!("t={:.1}: P{} finished", at, item_id),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::time::SimulationTime;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_logger_default() {
        let logger = Logger::default();
        assert_eq!(logger.min_level, LogLevel::Info);
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.enabled(LogLevel::Error));
    }

    #[test]
    fn level_names_parse_from_config() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warning);
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
        assert!(serde_json::from_str::<LogLevel>("\"loud\"").is_err());
    }

    #[test]
    fn silent_without_console_or_file() {
        let logger = Logger::from_config(&LogConfig::default(), false).unwrap();
        assert!(!logger.enabled(LogLevel::Error));
    }

    #[test]
    fn milestones_log_at_info() {
        let finished = Event::new(
            SimulationTime::new(118.0),
            EventType::ProcessingComplete { item_id: 1 },
        );
        assert_eq!(
            describe_event(&finished),
            (LogLevel::Info, "t=118.0: P1 finished".to_string())
        );
        let queued = Event::new(
            SimulationTime::new(78.0),
            EventType::QueuedForWs2 { item_id: 1, queue_len: 2 },
        );
        assert_eq!(describe_event(&queued).0, LogLevel::Debug);
    }

    #[test]
    fn file_sink_appends_formatted_lines() {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("workshopsim_log_{}.log", timestamp));
        let config = LogConfig {
            level: LogLevel::Info,
            file: Some(path.to_str().unwrap().to_string()),
        };
        let logger = Logger::from_config(&config, false).unwrap();
        logger.debug("hidden");
        logger.warning("WS2 queue growing");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("hidden"));
        assert!(contents.contains("[WARNING] WS2 queue growing"));
        let _ = std::fs::remove_file(path);
    }
}
