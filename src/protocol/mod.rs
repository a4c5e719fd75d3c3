use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{CoreError, Result};
use crate::model::document::{Document, FileFormat, LineEnding, Translations};
use crate::model::entry::Entry;
use crate::parsers::{self, campaign};
use crate::services::{archive, encoding, fingerprint, qa, rebuild};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn payload_as<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    let payload = if payload.is_null() {
        json!({})
    } else {
        payload.clone()
    };
    serde_json::from_value(payload)
        .map_err(|e| CoreError::InvalidRequest(format!("invalid payload: {e}")))
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    text: String,
    #[serde(default)]
    format: Option<FileFormat>,
    #[serde(default)]
    translations: Translations,
    #[serde(default)]
    line_ending: Option<LineEnding>,
}

#[derive(Debug, Deserialize)]
struct PathPayload {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ArchivePayload {
    path: PathBuf,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    entry: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    format: Option<FileFormat>,
    #[serde(default)]
    expected_hash: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    translations: Translations,
    #[serde(default)]
    line_ending: Option<LineEnding>,
}

impl ArchivePayload {
    fn output(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.path)
    }

    fn format(&self) -> FileFormat {
        self.format
            .unwrap_or_else(|| archive::format_for_path(&self.path))
    }

    fn read_source(&self) -> Result<Vec<u8>> {
        archive::read_source(&self.path, self.entry.as_deref())
    }

    /// Refuses to go on when the caller's fingerprint no longer matches what is on disk.
    fn check_unchanged(&self, current: &[u8]) -> Result<()> {
        let Some(expected) = self.expected_hash.as_deref() else {
            return Ok(());
        };

        let found = fingerprint::sha256_hex(current);
        if !found.eq_ignore_ascii_case(expected.trim()) {
            return Err(CoreError::HashMismatch {
                entry: self
                    .entry
                    .clone()
                    .unwrap_or_else(|| self.path.display().to_string()),
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }
}

/// An entry as sent to the editor, with its locale split out for campaign keys.
#[derive(Debug, Serialize)]
struct EntryView<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<&'a str>,
}

fn entry_views(doc: &Document) -> Vec<EntryView<'_>> {
    doc.store
        .iter()
        .map(|entry| match doc.format {
            FileFormat::Campaign => {
                let (base, locale) = campaign::split_locale(&entry.key);
                EntryView {
                    entry,
                    base_key: Some(base),
                    locale,
                }
            }
            FileFormat::Dictionary => EntryView {
                entry,
                base_key: None,
                locale: None,
            },
        })
        .collect()
}

fn parse_document(text: &str, format: Option<FileFormat>) -> Document {
    let format = format.unwrap_or_else(|| FileFormat::detect(text));
    parsers::parse(text, format)
}

fn document_json(doc: &Document, text: &str) -> Value {
    json!({
        "format": doc.format,
        "line_ending": doc.line_ending,
        "source_hash": fingerprint::sha256_hex(text.as_bytes()),
        "entries": entry_views(doc),
    })
}

fn parse_text(payload: &Value) -> Result<Value> {
    let p: TextPayload = payload_as(payload)?;
    let doc = parse_document(&p.text, p.format);
    tracing::info!(format = %doc.format, entries = doc.store.len(), "parse_text");
    Ok(document_json(&doc, &p.text))
}

fn rebuild_text(payload: &Value) -> Result<Value> {
    let p: TextPayload = payload_as(payload)?;
    let doc = parse_document(&p.text, p.format);
    let out = rebuild::rebuild_with(
        &doc,
        &p.translations,
        p.line_ending.unwrap_or(doc.line_ending),
    );
    Ok(serde_json::to_value(out)?)
}

fn run_qa(payload: &Value) -> Result<Value> {
    let p: TextPayload = payload_as(payload)?;
    let doc = parse_document(&p.text, p.format);
    Ok(json!({ "issues": qa::run(&doc, &p.translations) }))
}

fn detect_encoding(payload: &Value) -> Result<Value> {
    let p: PathPayload = payload_as(payload)?;
    let result = encoding::detect_from_file(&p.path)?;
    Ok(serde_json::to_value(result)?)
}

fn archive_list(payload: &Value) -> Result<Value> {
    let p: PathPayload = payload_as(payload)?;
    Ok(json!({ "locales": archive::list_locales(&p.path)? }))
}

fn archive_read(payload: &Value) -> Result<Value> {
    let p: ArchivePayload = payload_as(payload)?;
    let bytes = p.read_source()?;
    let label = encoding::resolve_label(&bytes, p.encoding.as_deref());
    let text = encoding::decode(&bytes, Some(label.as_str()))?;
    let doc = parsers::parse(&text, p.format());

    Ok(json!({
        "format": doc.format,
        "encoding": label,
        "line_ending": doc.line_ending,
        // Hash of the bytes as stored, which is what a later write compares against.
        "source_hash": fingerprint::sha256_hex(&bytes),
        "text": text,
        "entries": entry_views(&doc),
    }))
}

fn archive_write(payload: &Value) -> Result<Value> {
    let p: ArchivePayload = payload_as(payload)?;
    let text = p
        .text
        .as_deref()
        .ok_or_else(|| CoreError::InvalidRequest("payload.text is required".into()))?;

    if p.expected_hash.is_some() {
        p.check_unchanged(&p.read_source()?)?;
    }

    let bytes = encoding::encode(text, p.encoding.as_deref())?;
    archive::write_source(&p.path, p.output(), p.entry.as_deref(), &bytes)?;

    Ok(json!({
        "output": p.output(),
        "bytes": bytes.len(),
        "source_hash": fingerprint::sha256_hex(&bytes),
    }))
}

fn archive_apply(payload: &Value) -> Result<Value> {
    let p: ArchivePayload = payload_as(payload)?;
    let original = p.read_source()?;
    p.check_unchanged(&original)?;

    // Written back in the encoding it was read with, BOM included.
    let label = encoding::resolve_label(&original, p.encoding.as_deref());
    let text = encoding::decode(&original, Some(label.as_str()))?;
    let doc = parsers::parse(&text, p.format());
    let out = rebuild::rebuild_with(
        &doc,
        &p.translations,
        p.line_ending.unwrap_or(doc.line_ending),
    );

    let bytes = encoding::encode(&out.text, Some(label.as_str()))?;
    archive::write_source(&p.path, p.output(), p.entry.as_deref(), &bytes)?;

    Ok(json!({
        "output": p.output(),
        "encoding": label,
        "translated": out.translated,
        "line_count_changes": out.line_count_changes,
        "unknown_keys": out.unknown_keys,
        "source_hash": fingerprint::sha256_hex(&bytes),
    }))
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    let result = match Command::from(cmd_str) {
        Command::Ping => Ok(json!({ "message": "miz-core alive" })),
        Command::ParseText => parse_text(payload),
        Command::RebuildText => rebuild_text(payload),
        Command::RunQa => run_qa(payload),
        Command::DetectEncoding => detect_encoding(payload),
        Command::ArchiveList => archive_list(payload),
        Command::ArchiveRead => archive_read(payload),
        Command::ArchiveWrite => archive_write(payload),
        Command::ArchiveApply => archive_apply(payload),
        Command::Unknown => Err(CoreError::InvalidRequest(format!(
            "unknown command: {cmd_str}"
        ))),
    };

    match result {
        Ok(payload) => ok(id, payload),
        Err(e) => {
            tracing::warn!(cmd = cmd_str, error = %e, "request failed");
            err(id, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(req: Value) -> Value {
        serde_json::from_str(&handle(&req.to_string())).unwrap()
    }

    #[test]
    fn ping_echoes_id() {
        let resp = call(json!({ "id": 7, "cmd": "ping" }));
        assert_eq!(resp["id"], 7);
        assert_eq!(resp["status"], "ok");
    }

    #[test]
    fn invalid_json_is_an_error_response() {
        let resp: Value = serde_json::from_str(&handle("{not json")).unwrap();
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "invalid json");
    }

    #[test]
    fn unknown_command() {
        let resp = call(json!({ "id": "x", "cmd": "translate_entries" }));
        assert_eq!(resp["status"], "error");
        assert!(resp["message"].as_str().unwrap().contains("translate_entries"));
    }

    #[test]
    fn missing_text_is_invalid_request() {
        let resp = call(json!({ "id": 1, "cmd": "parse_text", "payload": {} }));
        assert_eq!(resp["status"], "error");
        assert!(resp["message"].as_str().unwrap().starts_with("invalid request"));
    }

    #[test]
    fn parse_text_detects_campaign_and_splits_locale() {
        let text = "campaign = \n{\n    [\"name_RU\"] = \"Флаг\",\n}\n";
        let resp = call(json!({ "id": 1, "cmd": "parse_text", "payload": { "text": text } }));
        let payload = &resp["payload"];
        assert_eq!(payload["format"], "campaign");
        let entry = &payload["entries"][0];
        assert_eq!(entry["key"], "name_RU");
        assert_eq!(entry["base_key"], "name");
        assert_eq!(entry["locale"], "RU");
        assert_eq!(entry["indent"], 4);
        assert_eq!(entry["style"], "quoted");
    }

    #[test]
    fn rebuild_text_applies_translations() {
        let text = "dictionary = \n{\n    [\"note\"] = \"Part one\\\nPart two\",\n} -- end of dictionary\n";
        let resp = call(json!({
            "id": 2,
            "cmd": "rebuild_text",
            "payload": {
                "text": text,
                "translations": { "note": ["Only one line now"] }
            }
        }));
        let payload = &resp["payload"];
        assert_eq!(
            payload["text"],
            "dictionary = \n{\n    [\"note\"] = \"Only one line now\",\n} -- end of dictionary\n"
        );
        assert_eq!(payload["line_count_changes"][0]["original"], 2);
    }

    #[test]
    fn rebuild_text_can_force_crlf() {
        let text = "dictionary = \n{\n[\"k\"] = \"v\",\n} -- end of dictionary\n";
        let resp = call(json!({
            "cmd": "rebuild_text",
            "payload": { "text": text, "line_ending": "crlf" }
        }));
        assert_eq!(
            resp["payload"]["text"],
            "dictionary = \r\n{\r\n[\"k\"] = \"v\",\r\n} -- end of dictionary\r\n"
        );
    }
}
