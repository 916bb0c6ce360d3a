use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread;
use std::{collections::HashMap, env};
use tracing::{info, warn};

pub struct SubmitMsg {
    pub outcome: Result<JsonValue, String>,
}

fn expand_cmdline_env(cmdline: &str, env_map: &HashMap<String, String>) -> String {
    // Expand ${VAR}; unknown variables expand to nothing
    let re = Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("static pattern");
    re.replace_all(cmdline, |caps: &regex::Captures| {
        let v = env_map.get(&caps[1]).cloned().unwrap_or_default();
        // Quote if contains whitespace to keep it a single arg in shlex::split
        if v.chars().any(|c| c.is_whitespace()) {
            let escaped = v.replace('"', "\\\"");
            return format!("\"{escaped}\"");
        }
        v
    })
    .to_string()
}

/// Pipe `payload` into the submit command and read its reply.
///
/// JSON on stdout comes back as-is; anything else is wrapped as a JSON string.
pub fn run_submit_cmd(cmdline: &str, payload: &str) -> Result<JsonValue> {
    let env_map: HashMap<String, String> = env::vars().collect();
    let expanded = expand_cmdline_env(cmdline, &env_map);
    let parts = shlex::split(&expanded).ok_or_else(|| anyhow!("Failed to parse command line"))?;
    if parts.is_empty() {
        return Err(anyhow!("Empty command line"));
    }
    let program = &parts[0];
    let args = &parts[1..];
    let mut child = Command::new(program)
        .args(args)
        .env("FORMSET_TUI_JSON", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning {expanded}"))?;
    // Feed stdin from its own thread so a command echoing a large payload cannot fill
    // stdout while we are still writing.
    let writer = child.stdin.take().map(|mut stdin| {
        let bytes = payload.as_bytes().to_vec();
        thread::spawn(move || stdin.write_all(&bytes))
    });
    let output = child
        .wait_with_output()
        .with_context(|| format!("waiting for {expanded}"))?;
    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            // The command may exit without reading all of its input.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e).context("writing payload to submit command"),
            Err(_) => return Err(anyhow!("payload writer thread panicked")),
        }
    }
    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(anyhow!("Command failed: {}\n{}", cmdline, err));
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(serde_json::from_str(&text).unwrap_or(JsonValue::String(text)))
}

pub fn spawn_submit(cmdline: String, payload: String, tx: Sender<SubmitMsg>) {
    thread::spawn(move || {
        let outcome = run_submit_cmd(&cmdline, &payload).map_err(|e| format!("{e:#}"));
        match &outcome {
            Ok(_) => info!(cmd = %cmdline, "submit command finished"),
            Err(e) => warn!(cmd = %cmdline, error = %e, "submit command failed"),
        }
        let _ = tx.send(SubmitMsg { outcome });
    });
}
