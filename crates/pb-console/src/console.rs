//! The interactive command console

use std::sync::Arc;

use pb_core::{AppState, ClipboardService, DisplayChannel, DisplayKind};
use tokio::sync::Mutex;
use tracing::debug;

use crate::eval::{EvalSession, EvalValue};

/// Interactive evaluator sharing only the display channel with the rest of
/// the system.
pub struct CommandConsole {
    channel: Arc<DisplayChannel>,
    clipboard: Arc<dyn ClipboardService>,
    session: Mutex<EvalSession>,
}

impl CommandConsole {
    pub fn new(
        channel: Arc<DisplayChannel>,
        clipboard: Arc<dyn ClipboardService>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            channel,
            clipboard,
            session: Mutex::new(EvalSession::new(state)),
        }
    }

    /// Submit one command.
    ///
    /// Blank input is ignored. Otherwise the command is echoed as a `meta`
    /// entry, then tried as an expression and, on failure, as a statement
    /// sequence. If both fail, the expression-mode error is the one
    /// surfaced; the statement-mode error is discarded.
    pub async fn submit(&self, input: &str) {
        let cmd = input.trim();
        if cmd.is_empty() {
            return;
        }
        self.channel.meta(format!("> {cmd}"));

        let mut session = self.session.lock().await;
        match session.eval_expression(cmd).await {
            Ok(value) => {
                if !value.is_unit() {
                    self.append(&[value], DisplayKind::Log);
                }
            }
            Err(expr_err) => {
                if let Err(stmt_err) = session.eval_statements(cmd).await {
                    debug!(target: "console", %stmt_err, "statement mode also failed; discarding");
                    self.append(&[EvalValue::Str(expr_err.to_string())], DisplayKind::Err);
                }
            }
        }
    }

    /// Format `values` and append exactly one entry of `kind`.
    ///
    /// Compound values are structurally pretty-printed, falling back to
    /// plain coercion if serialization fails; multiple values are joined
    /// with a single space.
    pub fn append(&self, values: &[EvalValue], kind: DisplayKind) {
        let text = values
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(" ");
        self.channel.append(text, kind);
    }

    /// Remove all display entries.
    pub fn clear(&self) {
        self.channel.clear();
    }

    /// Copy the whole display log to the clipboard.
    ///
    /// Appends exactly one entry per call: a `meta` confirmation on success
    /// or an `err` entry on failure.
    pub async fn copy_all(&self) {
        let text = self
            .channel
            .entries()
            .iter()
            .map(|e| e.text.clone())
            .collect::<Vec<_>>()
            .join("\n");
        match self.clipboard.write_text(&text).await {
            Ok(()) => self.channel.meta("\u{1F4CB} Copied to clipboard"),
            Err(err) => {
                debug!(target: "console", %err, "clipboard write failed");
                self.channel.error("Failed to copy");
            }
        }
    }
}

fn format_value(value: &EvalValue) -> String {
    if value.is_compound() {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}
