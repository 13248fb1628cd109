// Data-store connection: a small blocking HTTP client for the gateway that
// fronts the database, plus the `DataStore` seam the navigator calls for
// menus bound to an operation. Query logic lives behind the gateway; this
// side only answers the gateway's questions and prints what it sends back.

use std::io::Write;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::input::Prompter;
use crate::menu::{MenuOption, OperationKey, BACK_LABEL, BACK_TEXT};
use crate::{render, ui};

/// What the navigator needs from the data store.
pub trait DataStore {
    /// Run the operation bound to a menu. `Ok(true)` asks the navigator to
    /// back out of that menu; `Ok(false)` redisplays it.
    fn invoke(
        &mut self,
        key: &OperationKey,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> Result<bool>;

    /// Release the connection. Called once, when the session ends.
    fn close(&mut self, out: &mut dyn Write) -> Result<()>;
}

/// One round trip of an operation: send every answer given so far, get
/// back either the next question or the final rows.
pub trait Gateway {
    fn run(&mut self, key: &OperationKey, answers: &[String]) -> Result<OperationReply>;
}

/// Blocking gateway client holding the session token once connected.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Response of `POST /session`.
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub token: String,
}

/// A question the gateway asks before it can finish an operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "input", rename_all = "lowercase")]
pub enum Step {
    /// Pick one of `choices`; the back entry leaves the operation.
    Choice {
        #[serde(default)]
        prompt: Option<String>,
        choices: Vec<String>,
        #[serde(default)]
        back_text: Option<String>,
    },
    /// Type a value, e.g. a `YYYY-MM` month or a new column value. An empty
    /// answer leaves the operation.
    Text { prompt: String },
}

/// Body of `POST /operations/{key}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct OperationRequest {
    pub answers: Vec<String>,
}

/// Reply of `POST /operations/{key}`. Rows and message may accompany a
/// further step (row details before a column pick, a format complaint
/// before re-asking for a date).
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct OperationReply {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub next: Option<Step>,
}

impl OperationReply {
    /// Cell values as display text. Strings lose their JSON quotes.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "NULL".into(),
        other => other.to_string(),
    }
}

/// Fail with the server's body when the status is not a success.
fn check(res: Response, what: &str) -> Result<Response> {
    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().unwrap_or_else(|_| "".into());
        anyhow::bail!("{what} failed: {status} - {txt}");
    }
    Ok(res)
}

impl ApiClient {
    /// Build an unconnected client for `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build a client and open a session with the given credentials.
    pub fn connect(base_url: &str, user: &str, password: &str) -> Result<Self> {
        let mut api = Self::new(base_url)?;
        api.open_session(user, password)?;
        tracing::info!(gateway = %api.base_url, "connected");
        Ok(api)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // keys look like `sql#4`; the `#` must not start a fragment
    fn operation_url(&self, key: &OperationKey) -> String {
        self.url(&format!("operations/{}", urlencoding::encode(key.as_str())))
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(t) = &self.token {
            let val = HeaderValue::from_str(&format!("Bearer {t}"))
                .context("Session token is not a valid header value")?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }

    fn open_session(&mut self, user: &str, password: &str) -> Result<()> {
        let basic = STANDARD.encode(format!("{user}:{password}"));
        let res = self
            .client
            .post(self.url("session"))
            .header(AUTHORIZATION, format!("Basic {basic}"))
            .send()
            .context("Failed to reach the data gateway")?;
        let session: SessionResponse = check(res, "Connect")?
            .json()
            .context("Parsing session response json")?;
        self.token = Some(session.token);
        Ok(())
    }

    /// Send the answers collected so far for one operation.
    pub fn post_operation(&self, key: &OperationKey, answers: &[String]) -> Result<OperationReply> {
        let body = OperationRequest {
            answers: answers.to_vec(),
        };
        let res = self
            .client
            .post(self.operation_url(key))
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .context("Failed to send operation request")?;
        check(res, "Operation")?
            .json()
            .context("Parsing operation reply json")
    }

    /// End the session. Returns false when there was nothing to close.
    pub fn disconnect(&mut self) -> Result<bool> {
        if self.token.is_none() {
            return Ok(false);
        }
        let res = self
            .client
            .delete(self.url("session"))
            .headers(self.auth_headers()?)
            .send()
            .context("Failed to send disconnect request");
        self.token = None;
        check(res?, "Disconnect")?;
        Ok(true)
    }
}

impl Gateway for ApiClient {
    fn run(&mut self, key: &OperationKey, answers: &[String]) -> Result<OperationReply> {
        ui::with_spinner("Running...", || self.post_operation(key, answers))
    }
}

/// Choices listed `1..n`, followed by a Back entry.
pub fn choice_options(choices: &[String], back_text: &str) -> Vec<MenuOption> {
    choices
        .iter()
        .enumerate()
        .map(|(i, text)| MenuOption {
            label: (i + 1).to_string(),
            text: text.clone(),
        })
        .chain(std::iter::once(MenuOption {
            label: BACK_LABEL.to_string(),
            text: back_text.to_string(),
        }))
        .collect()
}

fn report_failure(out: &mut dyn Write, key: &OperationKey, err: anyhow::Error) -> Result<bool> {
    tracing::warn!(operation = %key, error = %err, "operation failed");
    writeln!(out, "Operation failed: {err:#}\n")?;
    Ok(true)
}

fn print_reply(reply: &OperationReply, out: &mut dyn Write) -> Result<()> {
    if !reply.title.is_empty() {
        writeln!(out, "{}\n", reply.title)?;
    }
    let finished = reply.next.is_none();
    if !reply.rows.is_empty() || (finished && !reply.columns.is_empty()) {
        write!(out, "{}", render::result_rows(&reply.columns, &reply.text_rows()))?;
    }
    if let Some(message) = &reply.message {
        writeln!(out, "{message}")?;
        if finished {
            write!(out, "{}", render::border('-', 0, 1))?;
        }
    }
    Ok(())
}

/// Drive one operation to completion against `gateway`.
///
/// Returns the escape signal: `true` when the operator backed out, when the
/// gateway failed, or when the operation finished without asking anything
/// (a one-shot report); `false` when it finished after at least one answer,
/// so the menu is shown again for another pass.
pub fn run_operation<G: Gateway + ?Sized>(
    gateway: &mut G,
    key: &OperationKey,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<bool> {
    let mut answers: Vec<String> = Vec::new();
    loop {
        let reply = match gateway.run(key, &answers) {
            Ok(reply) => reply,
            Err(err) => return report_failure(out, key, err),
        };
        print_reply(&reply, out)?;

        let answer = match reply.next {
            None => {
                out.flush()?;
                return Ok(answers.is_empty());
            }
            Some(Step::Choice {
                prompt,
                choices,
                back_text,
            }) => {
                let options = choice_options(&choices, back_text.as_deref().unwrap_or(BACK_TEXT));
                for line in render::options_block(&options) {
                    writeln!(out, "{line}")?;
                }
                writeln!(out)?;
                out.flush()?;

                let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                let message = prompt.as_deref().unwrap_or("Select an option");
                let label = prompter.choose(message, &labels)?;
                if label == BACK_LABEL {
                    return Ok(true);
                }
                let text = options
                    .iter()
                    .find(|o| o.label == label)
                    .map(|o| o.text.clone())
                    .unwrap_or_default();
                writeln!(out, "You selected: {text}\n")?;
                text
            }
            Some(Step::Text { prompt }) => {
                out.flush()?;
                let text = prompter.prompt(&prompt)?;
                if text.trim().is_empty() {
                    return Ok(true);
                }
                writeln!(out)?;
                text
            }
        };
        tracing::debug!(operation = %key, step = answers.len() + 1, "answered");
        answers.push(answer);
    }
}

impl DataStore for ApiClient {
    fn invoke(
        &mut self,
        key: &OperationKey,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
    ) -> Result<bool> {
        run_operation(self, key, prompter, out)
    }

    fn close(&mut self, out: &mut dyn Write) -> Result<()> {
        if self.disconnect()? {
            writeln!(out, "Connection closed.")?;
            tracing::info!("connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedPrompter;
    use crate::menu::MenuNode;
    use std::collections::VecDeque;

    /// Replies from a script and records the answers of every round trip.
    struct FakeGateway {
        replies: VecDeque<Result<OperationReply>>,
        calls: Vec<Vec<String>>,
    }

    impl FakeGateway {
        fn new(replies: Vec<Result<OperationReply>>) -> Self {
            FakeGateway {
                replies: replies.into(),
                calls: Vec::new(),
            }
        }
    }

    impl Gateway for FakeGateway {
        fn run(&mut self, _: &OperationKey, answers: &[String]) -> Result<OperationReply> {
            self.calls.push(answers.to_vec());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no reply scripted")))
        }
    }

    fn key(raw: &str) -> OperationKey {
        MenuNode::build(false, "x", &[raw]).operation().cloned().unwrap()
    }

    fn reply(json: &str) -> Result<OperationReply> {
        Ok(serde_json::from_str(json).unwrap())
    }

    const PICK_FACILITY: &str =
        r#"{"next":{"input":"choice","choices":["North Plant","South Plant"]}}"#;
    const FACILITY_ROW: &str = r#"{"columns":["Name","Capacity"],"rows":[["North Plant",1200]]}"#;

    #[test]
    fn operation_url_encodes_the_key() {
        let api = ApiClient::new("http://localhost:3001/").unwrap();
        assert_eq!(
            api.operation_url(&key("sql#4")),
            "http://localhost:3001/operations/sql%234"
        );
    }

    #[test]
    fn cells_render_without_json_quotes() {
        let reply: OperationReply = serde_json::from_str(
            r#"{"columns":["Name","Flow","Note"],"rows":[["Plant A",1250.5,null]]}"#,
        )
        .unwrap();
        assert_eq!(reply.text_rows(), vec![vec!["Plant A", "1250.5", "NULL"]]);
        assert!(reply.next.is_none());
    }

    #[test]
    fn choices_end_with_back() {
        let options = choice_options(&["North".into(), "South".into()], "Back to Menu");
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "B"]);
        assert_eq!(options[2].text, "Back to Menu");
    }

    #[test]
    fn choosing_back_escapes_without_running() {
        let mut gateway = FakeGateway::new(vec![reply(PICK_FACILITY)]);
        let mut prompter = ScriptedPrompter::new(["b"]);
        let mut out = Vec::new();
        let escape = run_operation(&mut gateway, &key("sql#1"), &mut prompter, &mut out).unwrap();
        assert!(escape);
        assert_eq!(gateway.calls.len(), 1);
    }

    #[test]
    fn report_without_questions_runs_once_and_backs_out() {
        let mut gateway = FakeGateway::new(vec![reply(FACILITY_ROW)]);
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut out = Vec::new();
        let escape = run_operation(&mut gateway, &key("sql#9"), &mut prompter, &mut out).unwrap();
        assert!(escape);
        assert_eq!(gateway.calls, vec![Vec::<String>::new()]);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Name:     North Plant"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn pick_shows_rows_and_stays() {
        let mut gateway = FakeGateway::new(vec![reply(PICK_FACILITY), reply(FACILITY_ROW)]);
        let mut prompter = ScriptedPrompter::new(["1"]);
        let mut out = Vec::new();
        let escape = run_operation(&mut gateway, &key("sql#1"), &mut prompter, &mut out).unwrap();
        assert!(!escape);
        assert_eq!(gateway.calls[1], vec!["North Plant".to_string()]);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("You selected: North Plant"));
        assert!(shown.contains("Capacity: 1200"));
    }

    #[test]
    fn gateway_failure_reports_and_backs_out() {
        let mut gateway = FakeGateway::new(vec![
            reply(PICK_FACILITY),
            Err(anyhow::anyhow!("gateway unreachable")),
        ]);
        let mut prompter = ScriptedPrompter::new(["2"]);
        let mut out = Vec::new();
        let escape = run_operation(&mut gateway, &key("sql#1"), &mut prompter, &mut out).unwrap();
        assert!(escape);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Operation failed: gateway unreachable"));
    }

    #[test]
    fn update_walks_row_column_and_typed_value() {
        let mut gateway = FakeGateway::new(vec![
            reply(PICK_FACILITY),
            reply(
                r#"{"columns":["Name","Capacity"],"rows":[["South Plant",800]],
                    "next":{"input":"choice","choices":["Name","Capacity"],
                            "back_text":"Back to Menu"}}"#,
            ),
            reply(r#"{"next":{"input":"text","prompt":"Enter a new value for Capacity"}}"#),
            reply(r#"{"message":"Capacity for South Plant has been successfully updated."}"#),
        ]);
        let mut prompter = ScriptedPrompter::new(["2", "2", "950"]);
        let mut out = Vec::new();
        let escape = run_operation(&mut gateway, &key("sql#8"), &mut prompter, &mut out).unwrap();
        assert!(!escape);
        assert_eq!(gateway.calls[3], vec!["South Plant", "Capacity", "950"]);
        assert_eq!(prompter.asked()[2], "Enter a new value for Capacity");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("B. Back to Menu"));
        assert!(shown.contains("Capacity for South Plant has been successfully updated."));
    }

    #[test]
    fn back_to_menu_on_a_later_step_escapes() {
        let mut gateway = FakeGateway::new(vec![
            reply(PICK_FACILITY),
            reply(r#"{"next":{"input":"choice","choices":["Name"],"back_text":"Back to Menu"}}"#),
        ]);
        let mut prompter = ScriptedPrompter::new(["1", "B"]);
        let mut out = Vec::new();
        assert!(run_operation(&mut gateway, &key("sql#8"), &mut prompter, &mut out).unwrap());
    }

    #[test]
    fn typed_parameter_is_reasked_until_accepted() {
        let ask = r#"{"next":{"input":"text","prompt":"Enter a month (YYYY-MM)"}}"#;
        let mut gateway = FakeGateway::new(vec![
            reply(ask),
            reply(
                r#"{"message":"Invalid format, use YYYY-MM.",
                    "next":{"input":"text","prompt":"Enter a month (YYYY-MM)"}}"#,
            ),
            reply(r#"{"title":"Average consumption","columns":["Gallons"],"rows":[[1.5]]}"#),
        ]);
        let mut prompter = ScriptedPrompter::new(["March", "2021-03"]);
        let mut out = Vec::new();
        let escape = run_operation(&mut gateway, &key("sql#5"), &mut prompter, &mut out).unwrap();
        assert!(!escape);
        assert_eq!(gateway.calls[2], vec!["March", "2021-03"]);
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Invalid format, use YYYY-MM."));
        assert!(shown.contains("Average consumption"));
    }

    #[test]
    fn empty_typed_value_escapes() {
        let mut gateway = FakeGateway::new(vec![reply(
            r#"{"next":{"input":"text","prompt":"Enter a month (YYYY-MM)"}}"#,
        )]);
        let mut prompter = ScriptedPrompter::new([""]);
        let mut out = Vec::new();
        assert!(run_operation(&mut gateway, &key("sql#5"), &mut prompter, &mut out).unwrap());
    }

    #[test]
    fn closing_an_unconnected_client_prints_nothing() {
        let mut api = ApiClient::new("http://localhost:3001").unwrap();
        let mut out = Vec::new();
        api.close(&mut out).unwrap();
        assert!(out.is_empty());
        assert!(!api.disconnect().unwrap());
    }
}
