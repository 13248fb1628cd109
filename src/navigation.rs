// Navigation engine. Owns the traversal stack (copies of catalog nodes, main
// menu at the bottom) and turns each displayed screen into a push, a pop or
// the end of the session.

use std::io::Write;

use anyhow::Result;

use crate::api::DataStore;
use crate::auth::AuthGate;
use crate::catalog::MenuCatalog;
use crate::input::Prompter;
use crate::menu::{MenuNode, BACK_TEXT, QUIT_TEXT};
use crate::render;

/// What the current screen asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Open the menu (or placeholder) with this title.
    Open(String),
    Back,
    Quit,
    /// Show the same node again (bound operation finished without escaping).
    Stay,
}

impl Selection {
    /// Classify the display text of a chosen option.
    pub fn from_text(text: &str) -> Self {
        if text.eq_ignore_ascii_case(QUIT_TEXT) {
            Selection::Quit
        } else if text.eq_ignore_ascii_case(BACK_TEXT) {
            Selection::Back
        } else {
            Selection::Open(text.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminated,
}

pub struct Navigator<'a> {
    catalog: &'a MenuCatalog,
    stack: Vec<MenuNode>,
    prompter: &'a mut dyn Prompter,
    gate: &'a mut dyn AuthGate,
    store: &'a mut dyn DataStore,
    out: &'a mut dyn Write,
    terminated: bool,
}

impl<'a> Navigator<'a> {
    /// Start a session on a fresh copy of the main menu.
    pub fn new(
        catalog: &'a MenuCatalog,
        prompter: &'a mut dyn Prompter,
        gate: &'a mut dyn AuthGate,
        store: &'a mut dyn DataStore,
        out: &'a mut dyn Write,
    ) -> Self {
        Navigator {
            catalog,
            stack: vec![catalog.main_menu().clone()],
            prompter,
            gate,
            store,
            out,
            terminated: false,
        }
    }

    /// The traversal stack, bottom first.
    pub fn stack(&self) -> &[MenuNode] {
        &self.stack
    }

    pub fn current(&self) -> &MenuNode {
        // the root is never popped
        &self.stack[self.stack.len() - 1]
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Drive the session until the operator quits. The shutdown sequence runs
    /// even when input fails, so the connection is released exactly once.
    pub fn run(mut self) -> Result<()> {
        let outcome = loop {
            match self.step() {
                Ok(Flow::Continue) => continue,
                Ok(Flow::Terminated) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        if !self.terminated {
            let closed = self.shutdown();
            return outcome.and(closed);
        }
        outcome
    }

    /// Display the current node once and apply the resulting transition.
    pub fn step(&mut self) -> Result<Flow> {
        if self.terminated {
            return Ok(Flow::Terminated);
        }
        let selection = self.display_current()?;
        self.apply(selection)
    }

    fn display_current(&mut self) -> Result<Selection> {
        let top = self.stack.len() - 1;
        write!(self.out, "{}", render::title_block(&self.stack[top]))?;

        if self.stack[top].is_restricted() {
            if !self.gate.challenge(&mut *self.prompter, &mut *self.out)? {
                return Ok(Selection::Back);
            }
            self.stack[top].grant_access();
        }

        if let Some(key) = self.stack[top].operation().cloned() {
            tracing::debug!(operation = %key, "dispatching bound operation");
            let escape = self.store.invoke(&key, &mut *self.prompter, &mut *self.out)?;
            return Ok(if escape { Selection::Back } else { Selection::Stay });
        }

        let node = &self.stack[top];
        for line in render::options_block(node.options()) {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;

        let label = self.prompter.choose("Select an option", &node.labels())?;
        let text = node.option_text(&label).unwrap_or_default().to_string();
        writeln!(self.out, "You selected: {text}")?;
        Ok(Selection::from_text(&text))
    }

    /// Apply one transition to the stack.
    pub fn apply(&mut self, selection: Selection) -> Result<Flow> {
        match selection {
            Selection::Quit => {
                self.shutdown()?;
                return Ok(Flow::Terminated);
            }
            Selection::Back => {
                if self.stack.len() > 1 {
                    if let Some(left) = self.stack.pop() {
                        tracing::debug!(menu = left.title(), "back");
                    }
                } else {
                    tracing::debug!("back on the main menu; redisplaying");
                }
            }
            Selection::Open(title) => {
                let node = match self.catalog.lookup(&title) {
                    Some(node) => node.clone(),
                    None => {
                        tracing::debug!(selection = %title, "no menu defined; showing placeholder");
                        MenuNode::placeholder(&title)
                    }
                };
                tracing::debug!(menu = node.title(), depth = self.stack.len() + 1, "push");
                self.stack.push(node);
            }
            Selection::Stay => {}
        }
        Ok(Flow::Continue)
    }

    // The store is closed even when the farewell cannot be written; the
    // first failure is the one reported.
    fn shutdown(&mut self) -> Result<()> {
        self.terminated = true;
        let root = self.catalog.main_menu().title();
        let farewell =
            write!(self.out, "{}", render::farewell(root)).and_then(|_| self.out.flush());
        tracing::info!("session ended");
        let closed = self.store.close(&mut *self.out);
        farewell?;
        closed
    }
}
