use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::error::{CoreError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult> {
    let bytes = fs::read(path)?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    if bytes.starts_with(UTF8_BOM) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    // Plain ASCII would otherwise come back as a legacy code page.
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        detector.guess(None, true)
    };
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    // Older Russian localizations were saved in one of the Cyrillic code pages.
    if best == "windows-1251" {
        candidates.push(EncodingCandidate {
            name: "koi8-r".into(),
            confidence: (confidence - 0.15).max(0.0),
        });
        candidates.push(EncodingCandidate {
            name: "ibm866".into(),
            confidence: (confidence - 0.25).max(0.0),
        });
    }

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    let len = text.len();
    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}

fn lookup(label: &str) -> Result<&'static Encoding> {
    match label.trim().to_ascii_lowercase().as_str() {
        "" | "utf-8" | "utf8" | "utf-8-sig" => Ok(UTF_8),
        other => Encoding::for_label(other.as_bytes())
            .ok_or_else(|| CoreError::Decode(format!("unknown encoding label {other}"))),
    }
}

/// The label to read and later write `bytes` with: the caller's, else the detected one.
///
/// BOM input resolves to `utf-8-sig` so the BOM survives a rewrite.
pub fn resolve_label(bytes: &[u8], label: Option<&str>) -> String {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(l) => l.to_string(),
        None => {
            let detected = detect(bytes);
            tracing::debug!(encoding = %detected.best, confidence = detected.confidence, "detected encoding");
            detected.best
        }
    }
}

/// Decodes file bytes with [`resolve_label`]. Any UTF-8 BOM is dropped from the result.
///
/// Bytes that are not valid in the chosen encoding are an error, never replacement characters.
pub fn decode(bytes: &[u8], label: Option<&str>) -> Result<String> {
    let label = resolve_label(bytes, label);
    let encoding = lookup(&label)?;

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(CoreError::Decode(format!("bytes are not valid {}", used.name())));
    }

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Encodes text for writing back. `utf-8-sig` restores the BOM.
pub fn encode(text: &str, label: Option<&str>) -> Result<Vec<u8>> {
    let label = label.unwrap_or("utf-8");
    let encoding = lookup(label)?;

    let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
    if label.trim().eq_ignore_ascii_case("utf-8-sig") {
        out.extend_from_slice(UTF8_BOM);
    }

    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(CoreError::Decode(format!(
            "{} cannot represent every character",
            encoding.name()
        )));
    }
    out.extend_from_slice(&bytes);
    Ok(out)
}
