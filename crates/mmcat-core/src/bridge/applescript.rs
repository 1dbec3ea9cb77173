//! AppleScript bridge to MoneyMoney
//!
//! Runs `osascript -e <script>` once per operation and waits for it to exit.
//! No timeout is applied: a hung MoneyMoney (e.g. a locked database waiting
//! for its password) stalls the run.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::TransactionId;

use super::export::parse_export;
use super::{ExportPayload, FinanceBridge};

/// Drives MoneyMoney through `osascript`
#[derive(Debug, Clone)]
pub struct AppleScriptBridge {
    program: String,
    application: String,
}

impl AppleScriptBridge {
    /// Bridge to MoneyMoney via the system `osascript`
    pub fn new() -> Self {
        Self {
            program: "osascript".to_string(),
            application: "MoneyMoney".to_string(),
        }
    }

    /// Use a different interpreter binary (it is invoked as `<program> -e <script>`)
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            ..Self::new()
        }
    }

    /// Script exporting a category since a date as plist
    pub fn export_script(&self, category_id: &str, from: NaiveDate) -> String {
        format!(
            r#"tell application "{}" to export transactions from category "{}" from date "{}" as "plist""#,
            escape_applescript(&self.application),
            escape_applescript(category_id),
            from.format("%Y-%m-%d"),
        )
    }

    /// Script setting one transaction's category by name
    ///
    /// MoneyMoney ids are integers and go into the script unquoted, so
    /// anything else is rejected rather than spliced into the source.
    pub fn set_category_script(&self, id: &TransactionId, category: &str) -> Result<String> {
        let raw = id.as_str();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidData(format!(
                "Transaction id '{}' is not numeric",
                raw
            )));
        }
        Ok(format!(
            r#"tell application "{}" to set transaction id {} category to "{}""#,
            escape_applescript(&self.application),
            raw,
            escape_applescript(category),
        ))
    }

    /// Run a script, returning stdout on success
    async fn run(&self, script: &str) -> Result<Vec<u8>> {
        debug!(program = %self.program, script = %script, "Running AppleScript");

        let output = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::Bridge(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            }));
        }

        Ok(output.stdout)
    }
}

impl Default for AppleScriptBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FinanceBridge for AppleScriptBridge {
    async fn export_transactions(
        &self,
        category_id: &str,
        from: NaiveDate,
    ) -> Result<ExportPayload> {
        let stdout = self.run(&self.export_script(category_id, from)).await?;

        if stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(ExportPayload::NoData);
        }

        Ok(ExportPayload::Transactions(parse_export(&stdout)?))
    }

    async fn set_category(&self, id: &TransactionId, category: &str) -> Result<()> {
        let script = self.set_category_script(id, category)?;
        self.run(&script).await?;
        Ok(())
    }
}

/// Escape text for use inside an AppleScript string literal
pub fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
