// Input collaborator. The navigator never reads the terminal directly: it
// holds a `Prompter`, which is the console in the binary and a scripted
// replay in tests.

use std::collections::VecDeque;
use std::io;

/// Blocking line-oriented input.
pub trait Prompter {
    /// Read one line for `message`.
    fn prompt(&mut self, message: &str) -> io::Result<String>;

    /// Read one line without echoing it. Defaults to [`Prompter::prompt`].
    fn prompt_secret(&mut self, message: &str) -> io::Result<String> {
        self.prompt(message)
    }

    /// Called between attempts of [`Prompter::choose`].
    fn reject(&mut self, _raw: &str) {}

    /// Prompt until the answer matches one of `labels` ignoring case and
    /// return the matching label as written in `labels`.
    fn choose(&mut self, message: &str, labels: &[&str]) -> io::Result<String> {
        loop {
            let raw = self.prompt(message)?;
            if let Some(label) = match_label(labels, &raw) {
                return Ok(label.to_string());
            }
            tracing::debug!(input = %raw, "invalid selection");
            self.reject(&raw);
        }
    }
}

/// Canonical member of `labels` equal to `raw` ignoring case and
/// surrounding whitespace.
pub fn match_label<'a>(labels: &[&'a str], raw: &str) -> Option<&'a str> {
    let raw = raw.trim();
    labels.iter().copied().find(|label| label.eq_ignore_ascii_case(raw))
}

/// Replays a fixed list of answers. Running out is an `UnexpectedEof`.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
    rejected: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Every prompt message shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers turned down by [`Prompter::choose`].
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str) -> io::Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input left")
        })
    }

    fn reject(&mut self, raw: &str) {
        self.rejected.push(raw.to_string());
    }
}
