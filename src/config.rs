//! Environment-driven settings for the `noshow` binary.
//!
//! Supported:
//! - NOSHOW_SCHEMA_PATH   feature schema JSON
//! - NOSHOW_MODEL_PATH    exported model JSON
//! - NOSHOW_STRICT_FIELDS reject record fields the schema does not name
//! - NOSHOW_LOG_MODE      "stderr" | "file" | "auto"
//! - NOSHOW_LOG_FILE      log file path when logging to a file
//!
//! Parsing is best-effort: unset or unparsable values keep the default.

use std::path::PathBuf;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Stderr,
    File,
    /// File when stdout is a terminal, stderr otherwise.
    Auto,
}

impl LogMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stderr" | "stdout" => Some(Self::Stderr),
            "file" => Some(Self::File),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Resolve `Auto` for the current terminal state.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::Stderr => false,
            Self::File => true,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub schema_path: PathBuf,
    pub model_path: PathBuf,
    pub strict_fields: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("models/noshow_schema.json"),
            model_path: PathBuf::from("models/noshow_model.json"),
            strict_fields: false,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("noshow.log"),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

impl Settings {
    /// Load settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("NOSHOW_SCHEMA_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.schema_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("NOSHOW_MODEL_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.model_path = PathBuf::from(v);
        }
        if let Some(strict) = lookup("NOSHOW_STRICT_FIELDS").as_deref().and_then(parse_bool) {
            cfg.strict_fields = strict;
        }
        if let Some(mode) = lookup("NOSHOW_LOG_MODE").as_deref().and_then(LogMode::parse) {
            cfg.log_mode = mode;
        }
        if let Some(v) = lookup("NOSHOW_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            cfg.log_file = PathBuf::from(v);
        }

        cfg
    }
}
