use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

pub const JSON_PATH_ENV: &str = "GESTURE_REPLAY_LOG_JSON_PATH";

/// `log` backend: info and below to stdout, warnings and errors to stderr,
/// and every record as a JSON line when a file is configured.
pub struct Logger {
    level: LevelFilter,
    json_file: Option<Mutex<File>>,
}

impl Logger {
    pub fn from_env(level: LevelFilter) -> Result<Self> {
        let path = std::env::var(JSON_PATH_ENV).ok();
        Self::new(level, path.map(PathBuf::from))
    }

    pub fn new(level: LevelFilter, path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Some(Mutex::new(file))
            }
            None => None,
        };
        Ok(Self { level, json_file })
    }

    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self)).context("logger already installed")?;
        log::set_max_level(level);
        Ok(())
    }

    fn event(&self, level: Level, target: &str, message: &str) {
        let Some(file) = &self.json_file else {
            return;
        };

        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "level": level.as_str().to_ascii_lowercase(),
            "target": target,
            "msg": message,
        });

        if let Ok(mut file) = file.lock() {
            let _ = writeln!(file, "{entry}");
            let _ = file.flush();
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        if record.level() <= Level::Warn {
            eprintln!("[{}] {message}", record.level());
        } else {
            println!("[{}] {message}", record.level());
        }
        self.event(record.level(), record.target(), &message);
    }

    fn flush(&self) {
        if let Some(file) = &self.json_file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
