use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use crate::api::dto::{AnalyzeParams, OutlineDto};
use crate::application::analyze_tree;
use crate::domain::dialect::Dialect;
use crate::infrastructure::parser_for;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

/// Analysis settings shared by every connection.
#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub max_nesting_depth: usize,
    pub default_dialect: Dialect,
    /// Longest request line accepted, newline included.
    pub max_request_bytes: u64,
}

pub fn start_server(port: u16, settings: ServerSettings) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;

    info!(%address, "API server listening");
    serve(listener, settings)
}

/// Accept connections forever, one thread each.
pub fn serve(listener: TcpListener, settings: ServerSettings) -> Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, settings) {
                        warn!(error = %e, "connection error");
                    }
                });
            }
            Err(e) => error!(error = %e, "accept error"),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream, settings: ServerSettings) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader
            .by_ref()
            .take(settings.max_request_bytes)
            .read_until(b'\n', &mut buf)?;
        if bytes_read == 0 {
            break; // Connection closed
        }
        if buf.last() != Some(&b'\n') && bytes_read as u64 >= settings.max_request_bytes {
            warn!(limit = settings.max_request_bytes, "request too long, discarding");
            discard_line(&mut reader)?;
            let response = json!({
                "status": "error",
                "message": format!("Request exceeds {} bytes", settings.max_request_bytes)
            });
            stream.write_all(serde_json::to_string(&response)?.as_bytes())?;
            stream.write_all(b"\n")?;
            continue;
        }

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match process_command(trimmed, &settings) {
            Ok(data) => json!({
                "status": "success",
                "data": data
            }),
            Err(e) => json!({
                "status": "error",
                "message": format!("{:#}", e)
            }),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;

        if let Ok(req) = serde_json::from_str::<CommandReq>(trimmed) {
            if req.command == "SHUTDOWN" {
                info!("shutdown requested");
                std::process::exit(0);
            }
        }
    }
    Ok(())
}

/// Skip the rest of the current line without buffering it.
fn discard_line(reader: &mut impl BufRead) -> Result<()> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Execute one request line and return the `data` payload.
pub fn process_command(json_str: &str, settings: &ServerSettings) -> Result<serde_json::Value> {
    let req: CommandReq = serde_json::from_str(json_str)
        .context("Invalid JSON format")?;

    match req.command.as_str() {
        "PING" => Ok(json!("PONG")),
        "ANALYZE" => handle_analyze(req.params, settings),
        "SHUTDOWN" => Ok(json!("Shutting down...")),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    }
}

fn handle_analyze(params: Option<serde_json::Value>, settings: &ServerSettings) -> Result<serde_json::Value> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for ANALYZE"))?;
    let params: AnalyzeParams = serde_json::from_value(params)
        .context("Invalid params for ANALYZE")?;

    let dialect = params.dialect.unwrap_or(settings.default_dialect);
    info!(%dialect, bytes = params.source.len(), "analyzing");

    // Fresh parser and reduction state per request.
    let parser = parser_for(dialect, settings.max_nesting_depth);
    let analysis = analyze_tree(parser.as_ref(), &params.source)?;

    Ok(serde_json::to_value(OutlineDto::new(dialect, analysis))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ServerSettings {
        ServerSettings {
            max_nesting_depth: 128,
            default_dialect: Dialect::Js,
            max_request_bytes: 256,
        }
    }

    #[test]
    fn test_ping() {
        let data = process_command(r#"{"command": "PING"}"#, &settings()).unwrap();
        assert_eq!(data, json!("PONG"));
    }

    #[test]
    fn test_analyze_js() {
        let req = r#"{"command": "ANALYZE", "params": {"source": "if (a) { return a; }"}}"#;
        let data = process_command(req, &settings()).unwrap();
        assert_eq!(data["rows"], 2);
        assert_eq!(data["records"][0]["condition"], "a");
        assert_eq!(data["records"][1]["value"], "a");
        assert_eq!(data["ast"]["type"], "Program");
        assert_eq!(data["ast"]["body"][0]["type"], "IfStatement");
        assert_eq!(data["ast"]["body"][0]["test"]["name"], "a");
    }

    #[test]
    fn test_analyze_parse_error() {
        let req = r#"{"command": "ANALYZE", "params": {"source": "if ("}}"#;
        let err = process_command(req, &settings()).unwrap_err();
        assert!(err.to_string().contains("Parse error"), "{}", err);
    }

    #[test]
    fn test_unknown_command() {
        assert!(process_command(r#"{"command": "DOT"}"#, &settings()).is_err());
        assert!(process_command("not json", &settings()).is_err());
    }

    #[test]
    fn test_round_trip_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || serve(listener, settings()));

        let mut stream = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        stream.write_all(b"{\"command\": \"PING\"}\n").unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let resp: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(resp["status"], "success");
        assert_eq!(resp["data"], "PONG");

        line.clear();
        stream.write_all(b"{\"command\": \"ANALYZE\"}\n").unwrap();
        reader.read_line(&mut line).unwrap();
        let resp: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(resp["status"], "error");
    }

    #[test]
    fn test_oversized_request_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || serve(listener, settings()));

        let mut stream = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let source = "x".repeat(1000);
        let request = format!(
            "{{\"command\": \"ANALYZE\", \"params\": {{\"source\": \"{}\"}}}}\n",
            source
        );
        stream.write_all(request.as_bytes()).unwrap();

        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let resp: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(resp["status"], "error");
        assert!(resp["message"].as_str().unwrap().contains("256"));

        // The connection stays usable for the next request.
        line.clear();
        stream.write_all(b"{\"command\": \"PING\"}\n").unwrap();
        reader.read_line(&mut line).unwrap();
        let resp: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(resp["data"], "PONG");
    }
}
