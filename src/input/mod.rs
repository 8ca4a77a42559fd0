//! Where input lines come from
//!
//! [`EditorSource`] drives reedline when stdin is a terminal;
//! [`BufReadSource`] reads any buffered reader (pipes, files, tests) and
//! never prints a prompt.

use crate::prompt::FlushPrompt;
use reedline::{Reedline, Signal};
use std::io::{self, BufRead};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One line, possibly still carrying its terminator.
    Line(String),
    /// Ctrl-C at the prompt or a read cut short by a signal.
    Interrupted,
    EndOfInput,
}

pub trait LineSource {
    fn read_line(&mut self, prompt: &FlushPrompt) -> io::Result<ReadOutcome>;
}

/// Interactive line editor.
pub struct EditorSource {
    editor: Reedline,
}

impl EditorSource {
    pub fn new() -> Self {
        Self {
            editor: Reedline::create(),
        }
    }
}

impl Default for EditorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &FlushPrompt) -> io::Result<ReadOutcome> {
        match self.editor.read_line(prompt) {
            Ok(Signal::Success(buffer)) => Ok(ReadOutcome::Line(buffer)),
            Ok(Signal::CtrlC) => Ok(ReadOutcome::Interrupted),
            Ok(Signal::CtrlD) => Ok(ReadOutcome::EndOfInput),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Interrupted),
            Err(e) => Err(e),
        }
    }
}

pub struct BufReadSource<R> {
    reader: R,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, _prompt: &FlushPrompt) -> io::Result<ReadOutcome> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(ReadOutcome::EndOfInput),
            Ok(_) => Ok(ReadOutcome::Line(line)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Interrupted),
            Err(e) => Err(e),
        }
    }
}
