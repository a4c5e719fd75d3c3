#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};

use miz_core::config::CoreConfig;
use miz_core::protocol;
use serde_json::{json, Value};

/// Request id, read up front so even a panicking request can be answered.
fn request_id(line: &str) -> Value {
    serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|req| req.get("id").cloned())
        .unwrap_or(Value::Null)
}

fn main() {
    CoreConfig::from_env().init_logging();
    tracing::debug!("miz-core started");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable request line");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let id = request_id(&line);
        let result = std::panic::catch_unwind(|| protocol::handle(&line));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!(%id, "request handler panicked");
                json!({
                    "id": id,
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
