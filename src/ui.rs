// Console side of the collaborators: a `dialoguer` prompter for the
// navigator, an `indicatif` spinner around gateway calls, and the startup
// credential prompts.

use std::io;
use std::time::Duration;

use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::input::{match_label, Prompter};

/// Reads from the terminal with `dialoguer`. Empty answers are allowed so
/// the credential gate can detect its "ENTER twice" escape.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn prompt(&mut self, message: &str) -> io::Result<String> {
        Input::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
    }

    fn prompt_secret(&mut self, message: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()
    }

    // `validate_with` keeps the retry loop inside dialoguer so the bad answer
    // is reported under the prompt.
    fn choose(&mut self, message: &str, labels: &[&str]) -> io::Result<String> {
        let raw: String = Input::new()
            .with_prompt(message)
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), String> {
                match match_label(labels, input) {
                    Some(_) => Ok(()),
                    None => Err(format!("Invalid option: \"{input}\"")),
                }
            })
            .interact_text()?;
        Ok(match_label(labels, &raw).unwrap_or_default().to_string())
    }
}

/// Run `f` with a spinner on screen; the spinner is cleared afterwards.
pub fn with_spinner<T>(
    message: &str,
    f: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Data-store credentials from settings, prompting for whatever is missing.
pub fn credentials(
    settings: &Settings,
    prompter: &mut dyn Prompter,
) -> io::Result<(String, String)> {
    let user = match &settings.user {
        Some(user) => user.clone(),
        None => prompter.prompt("UserId  ")?,
    };
    let password = match &settings.password {
        Some(password) => password.clone(),
        None => prompter.prompt_secret("Password")?,
    };
    Ok((user, password))
}
