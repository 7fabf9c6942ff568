//! Structured logging for probe runs
//!
//! - Leveled, structured entries with correlation ids and a session id
//! - Console output in human, JSON or compact form
//! - Optional append-only file sink mirroring everything at INFO and above
//! - [`ProbeLogger`] for probe lifecycle events, each tagged with its metric

use crate::error::{AppError, ProbeError, Result};
use crate::models::metrics::RawSample;
use crate::models::Config;
use crate::types::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID tying related events together
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: BTreeMap<String, serde_json::Value>,
}

/// Append-only log file shared by every logger of a session
#[derive(Debug, Clone)]
pub struct FileSink {
    file: Arc<Mutex<File>>,
}

impl FileSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AppError::io(format!("Cannot open log file {}: {}", path.display(), e)))?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

/// Leveled structured logger
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    console: bool,
    name: String,
    file: Option<FileSink>,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            console: true,
            name,
            file: None,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Logger whose level, format and color follow the configuration.
    ///
    /// An explicit `log_level` wins over the verbose/debug switches.
    pub fn with_config(name: String, config: &Config) -> Self {
        let switched = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        let min_level = config
            .log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(switched);

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            console: true,
            name,
            file: None,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Mirror entries into `sink`
    pub fn with_file_sink(mut self, sink: FileSink) -> Self {
        self.file = Some(sink);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Enable or silence console output; the file sink is unaffected
    pub fn set_console(&mut self, console: bool) {
        self.console = console;
    }

    pub async fn set_session_id(&self, session_id: String) {
        self.context.write().await.session_id = Some(session_id);
    }

    /// Field attached to every subsequent entry
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.context
                .write()
                .await
                .context_fields
                .insert(key.to_string(), json_value);
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: &str) -> LogEntryBuilder {
        self.log(LogLevel::Fatal, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Lowest level the file sink records
    fn file_level(&self) -> LogLevel {
        self.min_level.min(LogLevel::Info)
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        let to_console = self.console && self.would_log(entry.level);
        let to_file = self.file.is_some() && entry.level >= self.file_level();
        if !to_console && !to_file {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry
                    .fields
                    .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            for (key, value) in &context.context_fields {
                entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        if to_file {
            if let Some(sink) = &self.file {
                sink.write_line(&self.format_file(&entry));
            }
        }

        if to_console {
            let output = match self.format {
                LogFormat::Console => self.format_console(&entry),
                LogFormat::Json => self.format_json(&entry),
                LogFormat::Compact => self.format_compact(&entry),
            };
            if entry.level >= LogLevel::Warn {
                let _ = writeln!(io::stderr(), "{}", output);
            } else {
                let _ = writeln!(io::stdout(), "{}", output);
            }
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), entry.level.as_str(), LogLevel::reset_code())
        } else {
            format!("{:>5}", entry.level.as_str())
        };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        let fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "session_id")
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        if !fields.is_empty() {
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        serde_json::to_string(entry).unwrap_or_else(|_| {
            format!("{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}", entry.message)
        })
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        format!(
            "{} {} {}: {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }

    /// `timestamp - LEVEL - message`, plus the metric tag when present
    fn format_file(&self, entry: &LogEntry) -> String {
        let mut line = format!(
            "{} - {} - {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
            entry.level.as_str(),
            entry.message
        );
        if let Some(serde_json::Value::String(metric)) = entry.fields.get("metric") {
            line.push_str(&format!(" [metric={}]", metric));
        }
        line
    }
}

/// Builder for a single entry; nothing is written until [`log`](Self::log)
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Tag the entry with the metric it concerns
    pub fn metric(self, metric: Metric) -> Self {
        self.field("metric", metric.as_str())
    }

    pub fn elapsed(self, elapsed: Duration) -> Self {
        self.field("elapsed_ms", elapsed.as_secs_f64() * 1000.0)
    }

    pub fn probe_error(self, error: &ProbeError) -> Self {
        self.field("error_category", error.category())
            .field("error", error.to_string())
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_recoverable", error.is_recoverable())
            .field("error_exit_code", error.exit_code())
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// One probe's execution as seen by the log
#[derive(Debug, Clone)]
pub struct ProbeSpan {
    pub metric: Metric,
    pub correlation_id: String,
    started: Instant,
}

impl ProbeSpan {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Logger for probe lifecycle events
#[derive(Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Logger::with_config("PROBE".to_string(), config))
    }

    /// Logger that writes nothing to the console
    pub fn quiet() -> Self {
        let mut logger = Logger::new("PROBE".to_string());
        logger.set_console(false);
        Self::new(logger)
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn run_started(&self, target: &str, metrics: &[Metric]) {
        let names: Vec<&str> = metrics.iter().map(Metric::as_str).collect();
        self.logger
            .info(&format!("Starting network tests against {}", target))
            .field("target", target)
            .field("metrics", &names)
            .log()
            .await;
    }

    pub async fn run_completed(&self, populated: usize, requested: usize, elapsed: Duration) {
        self.logger
            .info(&format!(
                "Network tests finished: {} of {} metrics produced a result",
                populated, requested
            ))
            .field("populated", populated)
            .field("requested", requested)
            .elapsed(elapsed)
            .log()
            .await;
    }

    /// Announce a probe and open its span
    pub async fn probe_started(&self, metric: Metric, budget: Option<Duration>) -> ProbeSpan {
        let span = ProbeSpan {
            metric,
            correlation_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
        };

        self.logger
            .info(&format!("Starting {} measurement...", metric))
            .metric(metric)
            .correlation_id(&span.correlation_id)
            .field("budget_ms", budget.map(|b| b.as_millis() as u64))
            .log()
            .await;

        span
    }

    pub async fn probe_succeeded(&self, span: &ProbeSpan, headline: &str) {
        self.logger
            .info(&format!("{} measurement completed: {}", span.metric, headline))
            .metric(span.metric)
            .correlation_id(&span.correlation_id)
            .field("state", "succeeded")
            .elapsed(span.elapsed())
            .log()
            .await;
    }

    pub async fn probe_failed(&self, span: &ProbeSpan, error: &ProbeError) {
        self.logger
            .error(&format!("{} measurement failed: {}", span.metric, error))
            .metric(span.metric)
            .correlation_id(&span.correlation_id)
            .field("state", "failed")
            .probe_error(error)
            .elapsed(span.elapsed())
            .log()
            .await;
    }

    pub async fn probe_timed_out(&self, span: &ProbeSpan, budget: Duration) {
        self.logger
            .error(&format!(
                "{} measurement timed out after {:.1} seconds",
                span.metric,
                budget.as_secs_f64()
            ))
            .metric(span.metric)
            .correlation_id(&span.correlation_id)
            .field("state", "timed_out")
            .field("budget_ms", budget.as_millis() as u64)
            .elapsed(span.elapsed())
            .log()
            .await;
    }

    /// Individual sample failures are expected noise; debug level only
    pub async fn samples_collected(&self, span: &ProbeSpan, samples: &[RawSample]) {
        let values: Vec<f64> = samples.iter().filter_map(RawSample::value).collect();
        self.logger
            .debug(&describe_samples(span.metric, samples))
            .metric(span.metric)
            .correlation_id(&span.correlation_id)
            .field("failed_samples", samples.len() - values.len())
            .field("total_samples", samples.len())
            .field("values", &values)
            .log()
            .await;
    }
}

/// `latency: 2 of 3 samples succeeded [20.00 ms, 21.50 ms]`
fn describe_samples(metric: Metric, samples: &[RawSample]) -> String {
    let succeeded: Vec<String> = samples
        .iter()
        .filter_map(|sample| {
            let value = sample.value()?;
            let unit = sample.unit()?;
            Some(format!("{:.2} {}", value, unit.suffix()))
        })
        .collect();

    format!(
        "{}: {} of {} samples succeeded [{}]",
        metric,
        succeeded.len(),
        samples.len(),
        succeeded.join(", ")
    )
}

/// Issues loggers that share one session id and file sink
pub struct LoggerFactory {
    config: Config,
    session_id: String,
    file: Option<FileSink>,
}

impl LoggerFactory {
    /// Opens the configured log file, if any
    pub fn new(config: Config) -> Result<Self> {
        let file = match config.log_file.as_deref() {
            Some(path) => Some(FileSink::open(path)?),
            None => None,
        };

        Ok(Self {
            config,
            session_id: Uuid::new_v4().to_string(),
            file,
        })
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let mut logger = Logger::with_config(name.to_string(), &self.config);
        if let Some(sink) = &self.file {
            logger = logger.with_file_sink(sink.clone());
        }
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::new(self.create_logger("PROBE").await)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            logger: "TEST".to_string(),
            correlation_id: Some("0123456789abcdef".to_string()),
            fields: {
                let mut map = BTreeMap::new();
                map.insert("metric".to_string(), serde_json::Value::String("latency".to_string()));
                map
            },
        }
    }

    fn quiet_logger(name: &str) -> Logger {
        let mut logger = Logger::new(name.to_string());
        logger.set_console(false);
        logger
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str(" info ").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_logger_with_config_levels() {
        let debug = Config {
            debug: true,
            enable_color: false,
            ..Default::default()
        };
        let logger = Logger::with_config("TEST".to_string(), &debug);
        assert_eq!(logger.level(), LogLevel::Debug);
        assert_eq!(logger.format, LogFormat::Json);
        assert!(!logger.use_color);

        let verbose = Config { verbose: true, ..Default::default() };
        assert_eq!(Logger::with_config("T".into(), &verbose).level(), LogLevel::Info);

        assert_eq!(Logger::with_config("T".into(), &Config::default()).level(), LogLevel::Warn);

        let explicit = Config {
            verbose: true,
            log_level: Some("error".to_string()),
            ..Default::default()
        };
        assert_eq!(Logger::with_config("T".into(), &explicit).level(), LogLevel::Error);
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(LogLevel::Warn);

        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Fatal));
    }

    #[test]
    fn test_log_formats() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_color(false);
        let entry = entry(LogLevel::Info, "Latency measurement completed");

        let console = logger.format_console(&entry);
        assert!(console.contains(" INFO [TEST] Latency measurement completed"));
        assert!(console.contains("[01234567]"));
        assert!(console.contains("metric=\"latency\""));

        let json: serde_json::Value = serde_json::from_str(&logger.format_json(&entry)).unwrap();
        assert_eq!(json["level"], "Info");
        assert_eq!(json["fields"]["metric"], "latency");

        let compact = logger.format_compact(&entry);
        assert!(compact.contains(" I TEST: Latency"));

        let file = logger.format_file(&entry);
        assert!(file.contains(" - INFO - Latency measurement completed [metric=latency]"));
    }

    #[tokio::test]
    async fn test_session_and_context_fields() {
        let logger = quiet_logger("TEST");
        logger.set_session_id("session-1".to_string()).await;
        logger.add_context_field("target", "8.8.8.8").await;

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some("session-1"));
        assert!(context.context_fields.contains_key("target"));
    }

    #[tokio::test]
    async fn test_file_sink_records_info_and_above() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("network_test.log");

        let mut logger = quiet_logger("TEST").with_file_sink(FileSink::open(&path).unwrap());
        logger.set_level(LogLevel::Warn);

        logger.debug("hidden detail").log().await;
        logger.info("Starting latency measurement...").metric(Metric::Latency).log().await;
        logger.error("MTU measurement failed").log().await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("hidden detail"));
        assert!(contents.contains("INFO - Starting latency measurement... [metric=latency]"));
        assert!(contents.contains("ERROR - MTU measurement failed"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_probe_logger_lifecycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("probe.log");
        let sink = FileSink::open(&path).unwrap();
        let probe_logger = ProbeLogger::new(quiet_logger("PROBE").with_file_sink(sink));

        let span = probe_logger.probe_started(Metric::Jitter, Some(Duration::from_secs(3))).await;
        assert_eq!(span.metric, Metric::Jitter);
        assert!(!span.correlation_id.is_empty());

        probe_logger.probe_failed(&span, &ProbeError::insufficient(2, 1)).await;
        probe_logger.probe_timed_out(&span, Duration::from_secs(3)).await;
        probe_logger.probe_succeeded(&span, "4.00ms").await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Starting jitter measurement..."));
        assert!(contents.contains("jitter measurement failed: insufficient samples"));
        assert!(contents.contains("jitter measurement timed out after 3.0 seconds"));
        assert!(contents.contains("jitter measurement completed: 4.00ms"));
    }

    #[tokio::test]
    async fn test_logger_factory_shares_session() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            log_file: Some(dir.path().join("npt.log").to_string_lossy().into_owned()),
            ..Default::default()
        };
        let factory = LoggerFactory::new(config).unwrap();

        let logger = factory.create_logger("APP").await;
        assert_eq!(logger.name(), "APP");
        assert!(logger.file.is_some());

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some(factory.session_id()));
    }

    #[test]
    fn test_factory_rejects_unwritable_log_file() {
        let config = Config {
            log_file: Some("/nonexistent-dir/for/sure/npt.log".to_string()),
            ..Default::default()
        };
        assert!(matches!(LoggerFactory::new(config), Err(AppError::Io(_))));
    }

    #[test]
    fn test_describe_samples_lists_successes_with_units() {
        use crate::types::Unit;

        let samples = [
            RawSample::success(20.0, Unit::Milliseconds),
            RawSample::failed("timeout"),
            RawSample::success(21.5, Unit::Milliseconds),
        ];
        assert_eq!(
            describe_samples(Metric::Latency, &samples),
            "latency: 2 of 3 samples succeeded [20.00 ms, 21.50 ms]"
        );
        assert_eq!(
            describe_samples(Metric::Jitter, &[RawSample::failed("x")]),
            "jitter: 0 of 1 samples succeeded []"
        );
    }

    #[test]
    fn test_quiet_probe_logger_writes_nothing() {
        let probe_logger = ProbeLogger::quiet();
        assert!(!probe_logger.logger().console);

        tokio_test::block_on(async {
            let span = probe_logger.probe_started(Metric::Mtu, None).await;
            probe_logger.probe_failed(&span, &ProbeError::unavailable("no socket")).await;
            assert_eq!(span.metric, Metric::Mtu);
        });
    }

    #[test]
    fn test_log_entry_serialization() {
        let original = entry(LogLevel::Warn, "Test");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: LogEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.level, LogLevel::Warn);
        assert_eq!(parsed.message, "Test");
        assert_eq!(parsed.fields.get("metric"), original.fields.get("metric"));
    }
}
