use std::collections::VecDeque;
use std::io::{self, Write};

use menuwalk_cli::api::DataStore;
use menuwalk_cli::auth::AuthGate;
use menuwalk_cli::input::Prompter;
use menuwalk_cli::menu::OperationKey;

/// Gate answering from a fixed list and counting challenges.
#[allow(dead_code)]
pub struct CountingGate {
    answers: VecDeque<bool>,
    pub challenges: usize,
}

#[allow(dead_code)]
impl CountingGate {
    pub fn new(answers: &[bool]) -> Self {
        CountingGate {
            answers: answers.iter().copied().collect(),
            challenges: 0,
        }
    }
}

impl AuthGate for CountingGate {
    fn challenge(&mut self, _: &mut dyn Prompter, _: &mut dyn Write) -> io::Result<bool> {
        self.challenges += 1;
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

/// Data store recording invoked keys and replying with scripted escapes.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingStore {
    pub escapes: VecDeque<bool>,
    pub invoked: Vec<String>,
    pub closed: usize,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn with_escapes(escapes: &[bool]) -> Self {
        RecordingStore {
            escapes: escapes.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl DataStore for RecordingStore {
    fn invoke(
        &mut self,
        key: &OperationKey,
        _: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> anyhow::Result<bool> {
        self.invoked.push(key.to_string());
        writeln!(out, "ran {key}")?;
        Ok(self.escapes.pop_front().unwrap_or(true))
    }

    fn close(&mut self, out: &mut dyn Write) -> anyhow::Result<()> {
        self.closed += 1;
        writeln!(out, "Connection closed.")?;
        Ok(())
    }
}
