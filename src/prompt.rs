use crate::config::ShellConfig;
use nu_ansi_term::Color;
use reedline::{Prompt, PromptHistorySearch, PromptHistorySearchStatus};
use std::borrow::Cow;
use std::env;

/// `<cwd><separator>`, with `?` standing in for an unreadable directory.
#[derive(Debug, Clone)]
pub struct FlushPrompt {
    separator: String,
    color: Option<Color>,
}

impl FlushPrompt {
    pub fn new(separator: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            separator: separator.into(),
            color,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(config.prompt_separator.clone(), config.prompt_color)
    }

    /// The prompt text without any styling.
    pub fn render(&self) -> String {
        let cwd = env::current_dir()
            .map(|cwd| cwd.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        format!("{}{}", cwd, self.separator)
    }

    fn styled(&self) -> String {
        match self.color {
            Some(color) => color.paint(self.render()).to_string(),
            None => self.render(),
        }
    }
}

impl Default for FlushPrompt {
    fn default() -> Self {
        Self::from_config(&ShellConfig::default())
    }
}

impl Prompt for FlushPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Owned(self.styled())
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}
