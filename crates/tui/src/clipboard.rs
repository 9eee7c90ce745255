//! System clipboard hand-off.
//!
//! There is no portable clipboard API in the terminal, so the report is
//! piped into whichever clipboard tool the platform provides.

use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::{io::AsyncWriteExt, process::Command};

/// Candidate clipboard commands, tried in order.
const CLIPBOARD_TOOLS: [(&str, &[&str]); 4] = [
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

/// Copy `text` to the system clipboard, returning the name of the tool
/// that accepted it.
pub async fn copy(text: String) -> Result<&'static str> {
    let mut last_error = None;

    for (tool, args) in CLIPBOARD_TOOLS {
        let spawned = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            // Tool not installed; try the next one.
            Err(_) => continue,
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .with_context(|| format!("failed to write to {tool} stdin"))?;
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .with_context(|| format!("failed to wait for {tool}"))?;
        if output.status.success() {
            return Ok(tool);
        }
        last_error = Some(anyhow!(
            "{tool} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    Err(last_error.unwrap_or_else(|| {
        anyhow!("no clipboard tool found (tried wl-copy, xclip, xsel, pbcopy)")
    }))
}
