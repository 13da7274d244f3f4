use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

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

    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    // A panic while logging must not take the log down with it
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        if entries.len() >= MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        entries.iter().rev().take(count).rev().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Custom writer that captures logs to our ring buffer
#[derive(Clone)]
pub struct RingBufferWriter {
    buffer: LogRingBuffer,
}

impl RingBufferWriter {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self { buffer }
    }
}

/// Split a compact-format line ("LEVEL target: message") into its parts
fn parse_line(line: &str) -> (Level, &str, &str) {
    let levels = [
        ("TRACE ", Level::TRACE),
        ("DEBUG ", Level::DEBUG),
        ("INFO ", Level::INFO),
        ("WARN ", Level::WARN),
        ("ERROR ", Level::ERROR),
    ];
    let Some((level, rest)) = levels.iter().find_map(|(prefix, level)| {
        line.strip_prefix(prefix)
            .map(|rest| (*level, rest.trim_start()))
    }) else {
        return (Level::INFO, "general", line);
    };

    match rest.split_once(':') {
        // A target never contains spaces
        Some((target, msg)) if !target.contains(' ') => (level, target, msg.trim()),
        _ => (level, "general", rest),
    }
}

impl std::io::Write for RingBufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(message) = std::str::from_utf8(buf) {
            let message = message.trim();
            if !message.is_empty() {
                let (level, target, msg) = parse_line(message);
                self.buffer
                    .push(LogEntry::new(level, target, msg.to_string()));
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingBufferWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Global log buffer accessible throughout the application
static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// Get the global log buffer
pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Initialize tracing with our ring buffer writer.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this twice returns
/// the buffer from the first call.
pub fn init_tracing(default_level: &str) -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(buffer) = get_log_buffer() {
        return buffer;
    }
    let buffer = LOG_BUFFER.get_or_init(LogRingBuffer::new).clone();

    let fmt_layer = fmt::layer()
        .with_writer(RingBufferWriter::new(buffer.clone()))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Another subscriber may already be installed, e.g. by a test harness
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    tracing::debug!(target: "system", "Tracing initialized at {}", default_level);

    buffer
}
