// Access gate for restricted menus.

use std::io::{self, Write};

use crate::input::Prompter;

/// Decides whether the operator may enter a restricted menu.
pub trait AuthGate {
    /// `Ok(false)` means access was declined and the navigator backs out.
    fn challenge(&mut self, prompter: &mut dyn Prompter, out: &mut dyn Write) -> io::Result<bool>;
}

/// Compares typed credentials against the ones the session connected with.
/// Wrong credentials re-prompt without limit; two empty fields give up.
pub struct CredentialGate {
    user: String,
    password: String,
}

impl CredentialGate {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        CredentialGate {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl AuthGate for CredentialGate {
    fn challenge(
        &mut self,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> io::Result<bool> {
        loop {
            writeln!(
                out,
                "Admin access required. Please enter valid credentials, \
                 or hit ENTER twice to exit.\n"
            )?;
            out.flush()?;
            let user = prompter.prompt("UserID   ")?;
            let password = prompter.prompt_secret("Password ")?;
            writeln!(out)?;

            if user.is_empty() && password.is_empty() {
                tracing::info!("restricted menu declined");
                return Ok(false);
            }
            if user == self.user && password == self.password {
                tracing::info!("restricted menu unlocked");
                return Ok(true);
            }
            tracing::warn!(user = %user, "credential mismatch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedPrompter;

    #[test]
    fn matching_credentials_pass() {
        let mut gate = CredentialGate::new("admin", "secret");
        let mut prompter = ScriptedPrompter::new(["admin", "secret"]);
        let mut out = Vec::new();
        assert!(gate.challenge(&mut prompter, &mut out).unwrap());
    }

    #[test]
    fn retries_until_match_without_limit() {
        let mut gate = CredentialGate::new("admin", "secret");
        let mut prompter = ScriptedPrompter::new([
            "admin", "wrong", "", "secret", "Admin", "secret", "admin", "secret",
        ]);
        let mut out = Vec::new();
        assert!(gate.challenge(&mut prompter, &mut out).unwrap());
        assert_eq!(prompter.remaining(), 0);
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("Admin access required").count(), 4);
    }

    #[test]
    fn two_empty_fields_escape() {
        let mut gate = CredentialGate::new("admin", "secret");
        let mut prompter = ScriptedPrompter::new(["x", "y", "", ""]);
        let mut out = Vec::new();
        assert!(!gate.challenge(&mut prompter, &mut out).unwrap());
    }
}
