//! Configuration parsing from `~/.flushrc`
//!
//! The file holds `KEY=VALUE` lines (`#` comments, optional `export ` prefix,
//! optional quotes). Environment variables with the same names win over the
//! file:
//! - FLUSH_BANNER (always, never)
//! - FLUSH_PROMPT_SEPARATOR (text printed after the working directory)
//! - FLUSH_PROMPT_COLOR (none, green, cyan, yellow, blue, magenta)
//! - FLUSH_LOG (tracing filter directive; logging is off when unset)
//! - FLUSH_LOG_FILE (where log lines go)

use nu_ansi_term::Color;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const KEYS: &[&str] = &[
    "FLUSH_BANNER",
    "FLUSH_PROMPT_SEPARATOR",
    "FLUSH_PROMPT_COLOR",
    "FLUSH_LOG",
    "FLUSH_LOG_FILE",
];

pub const DEFAULT_PROMPT_SEPARATOR: &str = ": ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerShow {
    #[default]
    Always,
    Never,
}

impl BannerShow {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "never" | "off" | "false" | "0" => BannerShow::Never,
            _ => BannerShow::Always,
        }
    }
}

fn parse_color(s: &str) -> Option<Color> {
    match s.to_lowercase().as_str() {
        "green" => Some(Color::Green),
        "cyan" => Some(Color::Cyan),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Purple),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub banner: BannerShow,
    pub prompt_separator: String,
    /// `None` prints the prompt uncolored.
    pub prompt_color: Option<Color>,
    pub log_filter: Option<String>,
    pub log_file: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            banner: BannerShow::Always,
            prompt_separator: DEFAULT_PROMPT_SEPARATOR.to_string(),
            prompt_color: None,
            log_filter: None,
            log_file: home().join(".flush.log"),
        }
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl ShellConfig {
    /// rc file (unless skipped) with environment overrides applied on top.
    pub fn load(skip_rc: bool) -> Self {
        let mut config = if skip_rc {
            ShellConfig::default()
        } else {
            Self::from_file(&Self::rc_path()).unwrap_or_default()
        };
        config.apply_env(|key| env::var(key).ok());
        config
    }

    pub fn rc_path() -> PathBuf {
        home().join(".flushrc")
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Some(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut config = ShellConfig::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            if let Some((key, value)) = parse_assignment(line) {
                config.set(&key, &unquote(&value));
            }
        }

        config
    }

    /// Override settings from `lookup`, normally the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for &key in KEYS {
            if let Some(value) = lookup(key) {
                self.set(key, &value);
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match key {
            "FLUSH_BANNER" => self.banner = BannerShow::from_str(value),
            "FLUSH_PROMPT_SEPARATOR" => self.prompt_separator = value.to_string(),
            "FLUSH_PROMPT_COLOR" => self.prompt_color = parse_color(value),
            "FLUSH_LOG" => {
                self.log_filter = Some(value.trim().to_string()).filter(|v| !v.is_empty())
            }
            "FLUSH_LOG_FILE" if !value.is_empty() => self.log_file = expand_home(value),
            _ => {}
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home().join(rest),
        None => PathBuf::from(path),
    }
}

fn parse_assignment(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();

    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    Some((key.to_string(), value.trim().to_string()))
}

/// Remove surrounding quotes from a value
fn unquote(s: &str) -> String {
    let s = s.trim();

    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].to_string();
        }
    }

    s.to_string()
}
