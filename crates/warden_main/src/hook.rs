use std::io::Read;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use warden_app::SecurityFilter;
use warden_domain::Operation;

/// One tool call as delivered by the agent's pre-tool-use hook.
#[derive(Debug, Default, Deserialize)]
pub struct HookEnvelope {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
}

/// Run the one-shot hook: read an envelope, check its paths, pick an exit
/// code.
///
/// 0 allows the tool call, 2 blocks it with the reason on stderr. Anything
/// that goes wrong inside the adapter also exits 2: an envelope we cannot
/// understand is an envelope we cannot vouch for.
pub fn run<R: Read>(filter: &SecurityFilter, mut input: R) -> i32 {
    let mut raw = String::new();
    if let Err(error) = input.read_to_string(&mut raw) {
        eprintln!("Blocked by hook adapter: unreadable input: {error}");
        return 2;
    }

    let envelope: HookEnvelope = match serde_json::from_str(&raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            eprintln!("Blocked by hook adapter: malformed tool-call envelope: {error}");
            return 2;
        }
    };

    let Some(op) = Operation::from_tool_name(&envelope.tool_name) else {
        debug!(tool = %envelope.tool_name, "unrecognized tool, nothing to check");
        return 0;
    };

    let paths = extract_paths(&envelope.tool_name, &envelope.tool_input);
    if paths.is_empty() {
        return 0;
    }

    let batch = filter.check_many(op, &paths);
    match batch.denied() {
        Some(denied) => {
            eprintln!("{}", denied.decision.reason);
            2
        }
        None => 0,
    }
}

/// Candidate paths named by a tool call.
pub fn extract_paths(tool_name: &str, tool_input: &Value) -> Vec<String> {
    match tool_name {
        "Read" | "Write" | "Edit" | "MultiEdit" | "NotebookEdit" | "read_file" | "write_file"
        | "edit_file" => {
            let mut paths = Vec::new();
            push_string(&mut paths, tool_input.get("file_path"));
            if let Some(edits) = tool_input.get("edits").and_then(Value::as_array) {
                for edit in edits {
                    push_string(&mut paths, edit.get("file_path"));
                }
            }
            paths
        }
        // Glob and Grep are only path-checked when they name a directory;
        // the pattern alone touches nothing.
        "Glob" | "Grep" => {
            let mut paths = Vec::new();
            push_string(&mut paths, tool_input.get("path"));
            paths
        }
        "Bash" => tool_input
            .get("command")
            .and_then(Value::as_str)
            .map(bash_candidates)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn push_string(paths: &mut Vec<String>, value: Option<&Value>) {
    if let Some(path) = value.and_then(Value::as_str) {
        if !path.is_empty() {
            paths.push(path.to_string());
        }
    }
}

/// Best-effort path extraction from a shell command.
///
/// Tokens are split with shell quoting rules; flags are skipped and the
/// rest qualify when they contain `/` or start with `~` or `.`.
/// Over-production is fine (the filter only gets stricter); a command that
/// fails to tokenize contributes no candidates.
fn bash_candidates(command: &str) -> Vec<String> {
    let Ok(tokens) = shell_words::split(command) else {
        return Vec::new();
    };

    tokens
        .into_iter()
        .filter(|token| !token.starts_with('-'))
        .filter(|token| token.contains('/') || token.starts_with('~') || token.starts_with('.'))
        .collect()
}
