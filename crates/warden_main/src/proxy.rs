use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use warden_app::SecurityFilter;
use warden_domain::Operation;

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// JSON-RPC 2.0 request structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    fn result(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    fn error(id: Option<Value>, code: i64, message: &str, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.to_string(), data }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckParams {
    op: Operation,
    path: String,
    #[serde(default)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CheckManyParams {
    op: Operation,
    paths: Vec<String>,
    #[serde(default)]
    base_dir: Option<PathBuf>,
}

/// What a single input line asks the loop to do next.
enum Outcome {
    Reply(JsonRpcResponse),
    Quiet,
    Shutdown(Option<JsonRpcResponse>),
}

/// Long-lived JSON-RPC proxy over the filter facade.
///
/// One request per `\n`-terminated line, responses likewise, processed
/// sequentially in arrival order. Facade failures never become JSON-RPC
/// errors: they are already deny decisions, and deny decisions are
/// successful results.
pub struct Proxy {
    filter: SecurityFilter,
}

impl Proxy {
    pub fn new(filter: SecurityFilter) -> Self {
        Self { filter }
    }

    /// Run the loop until stdin EOF or a `shutdown` request.
    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> anyhow::Result<()> {
        for line in reader.lines() {
            let line = line.context("failed to read request line")?;
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_line(&line) {
                Outcome::Reply(response) => write_response(&mut writer, &response)?,
                Outcome::Quiet => {}
                Outcome::Shutdown(response) => {
                    if let Some(response) = response {
                        write_response(&mut writer, &response)?;
                    }
                    debug!("shutdown requested, closing");
                    return Ok(());
                }
            }
        }

        debug!("stdin closed, closing");
        Ok(())
    }

    fn handle_line(&self, line: &str) -> Outcome {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(error) => {
                warn!(%error, "unparseable request line");
                return Outcome::Reply(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    "Parse error",
                    None,
                ));
            }
        };

        // Requests without an id are notifications and never get replies.
        let is_notification = request.id.is_none();
        debug!(method = %request.method, notification = is_notification, "request");

        if request.method == "shutdown" {
            let reply = (!is_notification)
                .then(|| JsonRpcResponse::result(request.id, Value::Null));
            return Outcome::Shutdown(reply);
        }
        if is_notification {
            return Outcome::Quiet;
        }

        let response = match request.method.as_str() {
            "check" => self.handle_check(request.id, request.params),
            "check_many" => self.handle_check_many(request.id, request.params),
            method => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                "Method not found",
                Some(json!({ "method": method })),
            ),
        };
        Outcome::Reply(response)
    }

    fn handle_check(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CheckParams = match parse_params(params) {
            Ok(params) => params,
            Err(details) => return invalid_params(id, details),
        };

        let decision = self
            .filter
            .check_in(params.op, &params.path, params.base_dir.as_deref());
        JsonRpcResponse::result(id, serde_json::to_value(decision).unwrap_or(Value::Null))
    }

    fn handle_check_many(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CheckManyParams = match parse_params(params) {
            Ok(params) => params,
            Err(details) => return invalid_params(id, details),
        };

        let batch =
            self.filter
                .check_many_in(params.op, &params.paths, params.base_dir.as_deref());
        JsonRpcResponse::result(id, serde_json::to_value(batch).unwrap_or(Value::Null))
    }
}

fn parse_params<P: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<P, String> {
    serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|error| error.to_string())
}

fn invalid_params(id: Option<Value>, details: String) -> JsonRpcResponse {
    JsonRpcResponse::error(
        id,
        INVALID_PARAMS,
        "Invalid params",
        Some(json!({ "details": details })),
    )
}

fn write_response<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()> {
    let serialized =
        serde_json::to_string(response).context("failed to serialize response")?;
    writeln!(writer, "{serialized}").context("failed to write response")?;
    writer.flush().context("failed to flush response")?;
    Ok(())
}
