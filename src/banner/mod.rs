//! Startup banner
//!
//! Clears the terminal, then greets the user by login name.

use nu_ansi_term::Color;
use std::env;
use std::io::{self, Write};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[J";
const TITLE: &str = "****Welcome to flush****";
const UNKNOWN_USER: &str = "unknown";

/// `$USER`, then the account name reported by the OS.
pub fn current_user() -> Option<String> {
    env::var("USER")
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| whoami::username_os().into_string().ok())
        .filter(|name| !name.is_empty())
}

pub fn render(user: Option<&str>, color: Option<Color>) -> String {
    let title = match color {
        Some(color) => color.bold().paint(TITLE).to_string(),
        None => TITLE.to_string(),
    };

    format!(
        "{}{}\n\nUser is: @{}\n",
        CLEAR_SCREEN,
        title,
        user.unwrap_or(UNKNOWN_USER)
    )
}

pub fn display_banner(color: Option<Color>) -> io::Result<()> {
    let user = current_user();
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(user.as_deref(), color).as_bytes())?;
    stdout.flush()
}
