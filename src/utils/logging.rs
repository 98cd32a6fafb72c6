use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::utils::dual_logging::{self, FileLogger};

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// A log entry with timestamp and message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    /// Format for display in the log panel
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Split a compact fmt line ("LEVEL target: message") into its parts
fn parse_compact_line(line: &str) -> (Level, &str, &str) {
    let (level, rest) = [
        ("TRACE ", Level::TRACE),
        ("DEBUG ", Level::DEBUG),
        ("INFO ", Level::INFO),
        ("WARN ", Level::WARN),
        ("ERROR ", Level::ERROR),
    ]
    .iter()
    .find_map(|(prefix, level)| line.strip_prefix(*prefix).map(|rest| (*level, rest.trim_start())))
    .unwrap_or((Level::INFO, line));

    match rest.find(':') {
        // A target never contains spaces
        Some(colon_pos) if !rest[..colon_pos].contains(' ') => {
            (level, &rest[..colon_pos], rest[colon_pos + 1..].trim())
        }
        _ => (level, "general", rest),
    }
}

/// Writer that feeds the ring buffer and, when present, the session log file
#[derive(Clone)]
pub struct DualWriter {
    buffer: LogRingBuffer,
    file_logger: Option<&'static FileLogger>,
}

impl DualWriter {
    pub fn new(buffer: LogRingBuffer, file_logger: Option<&'static FileLogger>) -> Self {
        Self {
            buffer,
            file_logger,
        }
    }
}

impl std::io::Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(message) = std::str::from_utf8(buf) {
            for line in message.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let (level, target, msg) = parse_compact_line(line);
                let entry = LogEntry::new(level, target, msg.to_string());

                if let Some(file_logger) = self.file_logger {
                    file_logger.log(&entry.timestamp, &entry.level, &entry.target, &entry.message);
                }
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file_logger) = self.file_logger {
            file_logger.flush();
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Shared by every call so repeated initialisation reuses one buffer
static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// Initialize tracing for the terminal UI: ring buffer for the log panel
/// plus a session log file. Nothing is written to the terminal.
pub fn init_tracing_with_dual_logging() -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let buffer = LOG_BUFFER.get_or_init(LogRingBuffer::new).clone();
    let file_logger = dual_logging::init_file_logger();
    let dual_writer = DualWriter::new(buffer.clone(), Some(file_logger));

    let fmt_layer = fmt::layer()
        .with_writer(dual_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time() // LogEntry carries its own timestamp
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(target: "ui", "Logging to {}", file_logger.log_path().display());
    }

    buffer
}

/// Initialize plain stderr logging for the one-shot commands
pub fn init_cli_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ring_buffer_caps_entries() {
        let buffer = LogRingBuffer::with_capacity(3);
        for i in 0..5 {
            buffer.push(LogEntry::new(Level::INFO, "test", format!("m{}", i)));
        }
        assert_eq!(buffer.len(), 3);

        let recent: Vec<String> = buffer
            .get_recent(10)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(recent, vec!["m2", "m3", "m4"]);

        let last_two: Vec<String> = buffer
            .get_recent(2)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(last_two, vec!["m3", "m4"]);
    }

    #[test]
    fn test_parse_compact_line() {
        assert_eq!(
            parse_compact_line("WARN api: Search returned 500"),
            (Level::WARN, "api", "Search returned 500")
        );
        assert_eq!(
            parse_compact_line("INFO not a target: text"),
            (Level::INFO, "general", "not a target: text")
        );
        assert_eq!(
            parse_compact_line("plain text"),
            (Level::INFO, "general", "plain text")
        );
    }

    #[test]
    fn test_dual_writer_without_file_feeds_buffer() {
        let buffer = LogRingBuffer::new();
        let mut writer = DualWriter::new(buffer.clone(), None);
        writer.write_all(b"ERROR export: disk full\n").unwrap();

        let entries = buffer.get_recent(1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, "ERROR");
        assert_eq!(entries[0].target, "export");
        assert_eq!(entries[0].message, "disk full");
        assert!(entries[0].format_for_display().contains("[export] disk full"));
    }
}
