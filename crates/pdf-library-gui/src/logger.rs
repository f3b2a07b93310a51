use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// In-memory logger backing the status line and the log panel
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    max_entries: usize,
}

impl AppLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            max_entries,
        }
    }

    pub fn init(self) -> Result<Self, log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(LevelFilter::Info);
        Ok(self)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Dependencies (wgpu, winit, ...) are noisy at info level
        metadata.level() <= Level::Info
            && (metadata.target().starts_with("pdf_library") || metadata.level() <= Level::Warn)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = LogEntry {
                timestamp: Local::now(),
                level: record.level(),
                message: format!("{}", record.args()),
            };

            let mut entries = self.lock();
            entries.push(entry);

            if entries.len() > self.max_entries {
                let excess = entries.len() - self.max_entries;
                entries.drain(0..excess);
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_keeps_most_recent_entries() {
        let logger = AppLogger::new(2);
        for message in ["one", "two", "three"] {
            logger.log(
                &Record::builder()
                    .level(Level::Info)
                    .target("pdf_library_gui")
                    .args(format_args!("{}", message))
                    .build(),
            );
        }

        let messages: Vec<_> = logger.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["two", "three"]);
    }

    #[test]
    fn test_filters_foreign_info_logs() {
        let logger = AppLogger::new(10);
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("wgpu_core")
                .args(format_args!("adapter"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .target("wgpu_core")
                .args(format_args!("lost device"))
                .build(),
        );
        let messages: Vec<_> = logger.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["lost device"]);
    }
}
