use super::transport::{Framing, Incoming, read_message, write_message};
use crate::error::Result;
use primerforge::engine::backend::DesignEngine;
use primerforge::engine::config::DesignOverrides;
use primerforge::{DesignError, PrimerDesigner};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::{debug, info, warn};

const MCP_PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "primerforge_mcp";
const SERVER_TITLE: &str = "PrimerForge MCP";

const TOOL_DESIGN: &str = "design_primers";
const TOOL_TROUBLESHOOT: &str = "troubleshoot_primers";

#[derive(Debug, Clone, PartialEq)]
enum DispatchOutcome {
    NoResponse,
    Response(Value),
    Exit,
}

#[derive(Debug, Clone, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Flattened overrides accept any key, so callers screen with [`unknown_argument_keys`] first.
#[derive(Debug, Deserialize)]
struct DesignToolArgs {
    sequence: String,
    #[serde(flatten)]
    overrides: DesignOverrides,
}

pub struct McpServer<E> {
    designer: PrimerDesigner<E>,
    defaults: DesignOverrides,
}

impl<E: DesignEngine> McpServer<E> {
    /// `defaults` sit underneath every call's own arguments.
    pub fn new(designer: PrimerDesigner<E>, defaults: DesignOverrides) -> Self {
        Self { designer, defaults }
    }

    pub fn serve<R: BufRead, W: Write>(&self, reader: &mut R, writer: &mut W) -> Result<()> {
        while let Some(incoming) = read_message(reader)? {
            let (outcome, framing) = match incoming {
                Incoming::Message(message, framing) => (self.handle_message(&message), framing),
                Incoming::Malformed(reason, framing) => {
                    warn!("Discarding malformed MCP message: {}", reason);
                    (
                        DispatchOutcome::Response(jsonrpc_error(
                            None,
                            -32700,
                            "Parse error",
                            Some(json!({ "details": reason })),
                        )),
                        framing,
                    )
                }
            };
            match outcome {
                DispatchOutcome::NoResponse => {}
                DispatchOutcome::Response(value) => write_message(writer, &value, framing)?,
                DispatchOutcome::Exit => {
                    info!("Received exit notification.");
                    return Ok(());
                }
            }
        }
        info!("Input stream closed; stopping MCP server.");
        Ok(())
    }

    fn handle_message(&self, message: &Value) -> DispatchOutcome {
        let Some(obj) = message.as_object() else {
            return DispatchOutcome::Response(jsonrpc_error(
                None,
                -32600,
                "Invalid Request: expected JSON object",
                None,
            ));
        };
        let id = obj.get("id").cloned();
        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            return DispatchOutcome::Response(jsonrpc_error(
                id,
                -32600,
                "Invalid Request: missing method field",
                Some(message.clone()),
            ));
        };
        debug!(method, "Handling MCP request.");

        match method {
            "initialize" => {
                let Some(id) = id else {
                    return DispatchOutcome::Response(jsonrpc_error(
                        None,
                        -32600,
                        "Invalid Request: initialize requires id",
                        None,
                    ));
                };
                DispatchOutcome::Response(jsonrpc_response(
                    id,
                    json!({
                        "protocolVersion": MCP_PROTOCOL_VERSION,
                        "capabilities": { "tools": { "listChanged": false } },
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "title": SERVER_TITLE,
                            "version": env!("CARGO_PKG_VERSION")
                        }
                    }),
                ))
            }
            "notifications/initialized" => DispatchOutcome::NoResponse,
            "ping" | "shutdown" => match id {
                Some(id) => DispatchOutcome::Response(jsonrpc_response(id, json!({}))),
                None => DispatchOutcome::NoResponse,
            },
            "tools/list" => match id {
                Some(id) => {
                    DispatchOutcome::Response(jsonrpc_response(id, json!({ "tools": tool_list() })))
                }
                None => DispatchOutcome::NoResponse,
            },
            "tools/call" => {
                let Some(id) = id else {
                    return DispatchOutcome::NoResponse;
                };
                let params = obj.get("params").cloned().unwrap_or_else(|| json!({}));
                match serde_json::from_value::<ToolCallParams>(params) {
                    Ok(call) => DispatchOutcome::Response(jsonrpc_response(id, self.call_tool(call))),
                    Err(err) => DispatchOutcome::Response(jsonrpc_error(
                        Some(id),
                        -32602,
                        "Invalid params for tools/call",
                        Some(json!({ "details": err.to_string() })),
                    )),
                }
            }
            "exit" => DispatchOutcome::Exit,
            _ => match id {
                Some(id) => DispatchOutcome::Response(jsonrpc_error(
                    Some(id),
                    -32601,
                    &format!("Method '{method}' not found"),
                    None,
                )),
                None => DispatchOutcome::NoResponse,
            },
        }
    }

    fn call_tool(&self, call: ToolCallParams) -> Value {
        let troubleshoot = match call.name.as_str() {
            TOOL_DESIGN => false,
            TOOL_TROUBLESHOOT => true,
            other => {
                return tool_error("unknown_tool", &format!("Unknown tool '{other}'"));
            }
        };

        let arguments = if call.arguments.is_null() {
            json!({})
        } else {
            call.arguments
        };
        let unknown = unknown_argument_keys(&arguments);
        if !unknown.is_empty() {
            return tool_error(
                "invalid_arguments",
                &format!("Unknown argument(s): {}", unknown.join(", ")),
            );
        }
        let args = match serde_json::from_value::<DesignToolArgs>(arguments) {
            Ok(args) => args,
            Err(err) => return tool_error("invalid_arguments", &err.to_string()),
        };
        let overrides = self.defaults.clone().merged_with(&args.overrides);

        info!(tool = %call.name, "Running MCP tool call.");
        let outcome = if troubleshoot {
            self.designer.troubleshoot(&args.sequence, &overrides)
        } else {
            self.designer.design(&args.sequence, &overrides)
        };

        match outcome {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => tool_result_json(value, false),
                Err(err) => tool_error("internal", &err.to_string()),
            },
            Err(err) => design_error_result(&err),
        }
    }
}

pub fn run_stdio_server<E: DesignEngine>(server: &McpServer<E>) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = BufWriter::new(stdout.lock());
    server.serve(&mut reader, &mut writer)
}

fn design_error_result(err: &DesignError) -> Value {
    warn!(kind = %err.kind(), "Tool call failed: {}", err);
    tool_error(err.kind().as_str(), &err.to_string())
}

fn tool_error(kind: &str, message: &str) -> Value {
    tool_result_json(json!({ "error": { "kind": kind, "message": message } }), true)
}

fn tool_result_json(value: Value, is_error: bool) -> Value {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": value,
        "isError": is_error
    })
}

fn jsonrpc_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn jsonrpc_error(id: Option<Value>, code: i64, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message
    });
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({
        "jsonrpc": "2.0",
        "id": id.unwrap_or(Value::Null),
        "error": error
    })
}

fn override_properties() -> Value {
    json!({
        "primer_size_min": { "type": "integer", "minimum": 1, "default": 20, "description": "Minimum primer length in bases." },
        "primer_size_opt": { "type": "integer", "minimum": 1, "default": 25, "description": "Optimal primer length in bases." },
        "primer_size_max": { "type": "integer", "minimum": 1, "default": 30, "description": "Maximum primer length in bases." },
        "primer_tm_min": { "type": "number", "default": 64.0, "description": "Minimum melting temperature (°C)." },
        "primer_tm_opt": { "type": "number", "default": 65.0, "description": "Optimal melting temperature (°C)." },
        "primer_tm_max": { "type": "number", "default": 66.0, "description": "Maximum melting temperature (°C)." },
        "gc_clamp": { "type": "integer", "minimum": 0, "default": 2, "description": "Required G/C bases at the 3' end." },
        "target_start": { "type": "integer", "minimum": 0, "description": "Target start (0-based); defaults to the [n] marker position." },
        "target_length": { "type": "integer", "minimum": 0, "description": "Target length; defaults to 1." },
        "num_return": { "type": "integer", "minimum": 1, "default": 5, "description": "Maximum number of primer pairs to return." }
    })
}

/// Keys in `arguments` that the tool schema does not declare.
fn unknown_argument_keys(arguments: &Value) -> Vec<String> {
    let schema = tool_schema();
    let Some(declared) = schema["properties"].as_object() else {
        return Vec::new();
    };
    arguments
        .as_object()
        .map(|given| {
            given
                .keys()
                .filter(|key| !declared.contains_key(key.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn tool_schema() -> Value {
    let mut properties = override_properties();
    properties["sequence"] = json!({
        "type": "string",
        "description": "Template DNA (ATGCN) containing exactly one [n] marker at the target position."
    });
    json!({
        "type": "object",
        "properties": properties,
        "required": ["sequence"]
    })
}

fn tool_list() -> Value {
    json!([
        {
            "name": TOOL_DESIGN,
            "title": "Design primers",
            "description": "Design PCR primer pairs flanking the [n] target with the given constraints. An empty result is returned as is.",
            "inputSchema": tool_schema()
        },
        {
            "name": TOOL_TROUBLESHOOT,
            "title": "Design primers with troubleshooting",
            "description": "Design PCR primer pairs, relaxing the GC clamp (2, 1, 0) and then widening the Tm range by 1 °C until pairs are found.",
            "inputSchema": tool_schema()
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use primerforge::core::models::primer::{PrimerFeatures, PrimerPair};
    use primerforge::engine::backend::{EngineOutcome, EngineRequest};
    use primerforge::engine::config::DesignParameters;
    use primerforge::engine::error::EngineError;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Finds pairs only once the GC clamp drops to `succeed_at_gc` or below.
    struct ClampSensitiveEngine {
        succeed_at_gc: Option<u32>,
        fail: bool,
        seen: Mutex<Vec<DesignParameters>>,
    }

    impl ClampSensitiveEngine {
        fn new(succeed_at_gc: Option<u32>) -> Self {
            Self {
                succeed_at_gc,
                fail: false,
                seen: Mutex::default(),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(None)
            }
        }
    }

    fn primer(start: usize, sequence: &str) -> PrimerFeatures {
        PrimerFeatures {
            start,
            length: sequence.len(),
            tm: 64.8,
            gc_percent: 50.0,
            self_any: 0.0,
            self_end: 0.0,
            mispriming: 0.0,
            sequence: sequence.to_string(),
        }
    }

    impl DesignEngine for ClampSensitiveEngine {
        fn design(&self, request: &EngineRequest<'_>) -> std::result::Result<EngineOutcome, EngineError> {
            self.seen.lock().unwrap().push(request.parameters.clone());
            if self.fail {
                return Err(EngineError::Reported("SEQUENCE_TARGET beyond end of sequence".into()));
            }
            match self.succeed_at_gc {
                Some(gc) if request.parameters.gc_clamp <= gc => {
                    let pairs = (0..request.parameters.num_return as usize)
                        .map(|rank| PrimerPair {
                            rank,
                            left: primer(2 + rank, "ACGTACGTACGTACGTACGT"),
                            right: primer(150, "TGCATGCATGCATGCATGCA"),
                            product_size: 149,
                            penalty: 0.5,
                        })
                        .collect();
                    Ok(EngineOutcome::from_pairs(pairs))
                }
                _ => Ok(EngineOutcome::NoPairs),
            }
        }
    }

    fn new_server(engine: ClampSensitiveEngine) -> McpServer<ClampSensitiveEngine> {
        McpServer::new(PrimerDesigner::new(engine), DesignOverrides::new())
    }

    fn template() -> String {
        format!("{}[n]{}", "ACGT".repeat(10), "ACGT".repeat(40))
    }

    fn call(server: &McpServer<ClampSensitiveEngine>, name: &str, arguments: Value) -> Value {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        });
        match server.handle_message(&request) {
            DispatchOutcome::Response(value) => value,
            other => panic!("Expected a response, got {other:?}"),
        }
    }

    #[test]
    fn initialize_and_tools_list_over_a_session() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "method": "exit"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ]
        .iter()
        .map(|v| format!("{v}\n"))
        .collect::<String>();

        let mut reader = Cursor::new(input.into_bytes());
        let mut output = Vec::new();
        server.serve(&mut reader, &mut output).unwrap();

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["result"]["serverInfo"]["name"], SERVER_NAME);
        let names: Vec<_> = replies[1]["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec![TOOL_DESIGN, TOOL_TROUBLESHOOT]);
    }

    #[test]
    fn content_length_requests_get_framed_replies() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let body = serde_json::to_vec(&json!({"jsonrpc": "2.0", "id": 9, "method": "ping"})).unwrap();
        let mut input = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
        input.extend(body);

        let mut output = Vec::new();
        server.serve(&mut Cursor::new(input), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let (header, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(header.starts_with("Content-Length: "));
        let reply: Value = serde_json::from_str(body).unwrap();
        assert_eq!(reply["id"], 9);
    }

    #[test]
    fn design_tool_returns_structured_result() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let reply = call(&server, TOOL_DESIGN, json!({ "sequence": template(), "num_return": 3 }));
        assert_eq!(reply.pointer("/result/isError"), Some(&json!(false)));
        let content = &reply["result"]["structuredContent"];
        assert_eq!(content["num_returned"], 3);
        assert_eq!(content["troubleshooting_applied"], Value::Null);
        assert_eq!(content["pairs"][0]["left_primer"]["sequence"], "ACGTACGTACGTACGTACGT");
    }

    #[test]
    fn design_tool_does_not_relax_constraints() {
        let server = new_server(ClampSensitiveEngine::new(Some(1)));
        let reply = call(&server, TOOL_DESIGN, json!({ "sequence": template() }));
        assert_eq!(reply["result"]["structuredContent"]["num_returned"], 0);
        assert_eq!(server.designer.engine().seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn troubleshoot_tool_reports_applied_step() {
        let server = new_server(ClampSensitiveEngine::new(Some(1)));
        let reply = call(&server, TOOL_TROUBLESHOOT, json!({ "sequence": template(), "num_return": 2 }));
        let content = &reply["result"]["structuredContent"];
        assert_eq!(content["troubleshooting_applied"], "gc_clamp_1");
        assert_eq!(content["num_returned"], 2);
        let gc: Vec<u32> = server
            .designer
            .engine()
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.gc_clamp)
            .collect();
        assert_eq!(gc, vec![2, 2, 1]);
    }

    #[test]
    fn troubleshoot_tool_exhaustion_is_not_an_error() {
        let server = new_server(ClampSensitiveEngine::new(None));
        let reply = call(&server, TOOL_TROUBLESHOOT, json!({ "sequence": template() }));
        assert_eq!(reply.pointer("/result/isError"), Some(&json!(false)));
        let content = &reply["result"]["structuredContent"];
        assert_eq!(content["num_returned"], 0);
        assert_eq!(content["troubleshooting_applied"], Value::Null);
        assert!(content["note"].as_str().unwrap().starts_with("No primers found"));
        assert_eq!(content["attempts"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn server_defaults_sit_under_call_arguments() {
        let defaults = DesignOverrides {
            num_return: Some(1),
            gc_clamp: Some(0),
            ..DesignOverrides::new()
        };
        let server = McpServer::new(
            PrimerDesigner::new(ClampSensitiveEngine::new(Some(0))),
            defaults,
        );
        let reply = call(&server, TOOL_DESIGN, json!({ "sequence": template(), "num_return": 4 }));
        assert_eq!(reply["result"]["structuredContent"]["num_returned"], 4);
        assert_eq!(server.designer.engine().seen.lock().unwrap()[0].gc_clamp, 0);
    }

    #[test]
    fn failures_carry_error_kind() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let reply = call(&server, TOOL_DESIGN, json!({ "sequence": "ACGTACGT" }));
        assert_eq!(reply.pointer("/result/isError"), Some(&json!(true)));
        assert_eq!(
            reply.pointer("/result/structuredContent/error/kind"),
            Some(&json!("malformed_input"))
        );

        let reply = call(
            &server,
            TOOL_TROUBLESHOOT,
            json!({ "sequence": template(), "primer_tm_min": 70.0, "primer_tm_max": 60.0 }),
        );
        assert_eq!(
            reply.pointer("/result/structuredContent/error/kind"),
            Some(&json!("invalid_configuration"))
        );
        assert!(server.designer.engine().seen.lock().unwrap().is_empty());

        let failing = new_server(ClampSensitiveEngine::failing());
        let reply = call(&failing, TOOL_TROUBLESHOOT, json!({ "sequence": template() }));
        assert_eq!(
            reply.pointer("/result/structuredContent/error/kind"),
            Some(&json!("engine_invocation"))
        );
        assert_eq!(failing.designer.engine().seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn misspelled_override_is_rejected_before_design() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let reply = call(
            &server,
            TOOL_TROUBLESHOOT,
            json!({ "sequence": template(), "gc_clmap": 0 }),
        );
        assert_eq!(reply.pointer("/result/isError"), Some(&json!(true)));
        assert_eq!(
            reply.pointer("/result/structuredContent/error/kind"),
            Some(&json!("invalid_arguments"))
        );
        let message = reply
            .pointer("/result/structuredContent/error/message")
            .and_then(Value::as_str)
            .unwrap();
        assert!(message.contains("gc_clmap"));
        assert!(server.designer.engine().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn bad_arguments_and_unknown_tools_are_tool_errors() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let reply = call(&server, TOOL_DESIGN, json!({ "gc_clamp": 1 }));
        assert_eq!(
            reply.pointer("/result/structuredContent/error/kind"),
            Some(&json!("invalid_arguments"))
        );

        let reply = call(&server, "align_reads", json!({}));
        assert_eq!(reply.pointer("/result/isError"), Some(&json!(true)));
        assert_eq!(
            reply.pointer("/result/structuredContent/error/kind"),
            Some(&json!("unknown_tool"))
        );
    }

    #[test]
    fn protocol_errors_use_jsonrpc_codes() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let DispatchOutcome::Response(reply) =
            server.handle_message(&json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}))
        else {
            panic!("Expected a response");
        };
        assert_eq!(reply["error"]["code"], -32601);

        let DispatchOutcome::Response(reply) = server.handle_message(&json!([1, 2])) else {
            panic!("Expected a response");
        };
        assert_eq!(reply["error"]["code"], -32600);

        let DispatchOutcome::Response(reply) = server.handle_message(
            &json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"arguments": {}}}),
        ) else {
            panic!("Expected a response");
        };
        assert_eq!(reply["error"]["code"], -32602);

        let mut output = Vec::new();
        server
            .serve(&mut Cursor::new(b"{oops\n".to_vec()), &mut output)
            .unwrap();
        let reply: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(reply["error"]["code"], -32700);
    }

    #[test]
    fn truncated_framed_body_gets_parse_error_reply() {
        let server = new_server(ClampSensitiveEngine::new(Some(2)));
        let input = b"Content-Length: 64\r\n\r\n{\"jsonrpc\":\"2.0\",\"id\":1".to_vec();
        let mut output = Vec::new();
        server.serve(&mut Cursor::new(input), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let (header, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(header.starts_with("Content-Length: "));
        let reply: Value = serde_json::from_str(body).unwrap();
        assert_eq!(reply["error"]["code"], -32700);
    }
}
