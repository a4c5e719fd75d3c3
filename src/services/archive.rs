//! Reading and writing the files that hold localization text.
//!
//! A mission (`.miz`) is a ZIP archive with one `dictionary` per locale under `l10n/`.
//! Anything else (campaign `.cmp` files, loose dictionaries) is a plain text file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{CoreError, Result};
use crate::model::document::FileFormat;

pub const DEFAULT_LOCALE: &str = "DEFAULT";
const L10N_DIR: &str = "l10n/";
const DICTIONARY_NAME: &str = "dictionary";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub locale: String,
    pub entry: String,
    pub size: u64,
}

pub fn dictionary_entry(locale: &str) -> String {
    format!("{L10N_DIR}{locale}/{DICTIONARY_NAME}")
}

pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("miz"))
}

/// Format implied by the file name: `.cmp` is a campaign, everything else a dictionary.
pub fn format_for_path(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("cmp") => FileFormat::Campaign,
        _ => FileFormat::Dictionary,
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// Locales that carry a dictionary, sorted with `DEFAULT` first.
pub fn list_locales(path: &Path) -> Result<Vec<LocaleEntry>> {
    let mut archive = open_archive(path)?;
    let mut locales = Vec::new();

    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        let name = file.name();

        let Some(locale) = name
            .strip_prefix(L10N_DIR)
            .and_then(|rest| rest.strip_suffix(DICTIONARY_NAME))
            .and_then(|dir| dir.strip_suffix('/'))
        else {
            continue;
        };

        if locale.is_empty() || locale.contains('/') {
            continue;
        }

        locales.push(LocaleEntry {
            locale: locale.to_string(),
            entry: name.to_string(),
            size: file.size(),
        });
    }

    locales.sort_by(|a, b| {
        (a.locale != DEFAULT_LOCALE, &a.locale).cmp(&(b.locale != DEFAULT_LOCALE, &b.locale))
    });

    tracing::debug!(path = %path.display(), count = locales.len(), "listed locales");
    Ok(locales)
}

pub fn read_entry(path: &Path, entry: &str) -> Result<Vec<u8>> {
    let mut archive = open_archive(path)?;
    let mut file = match archive.by_name(entry) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(CoreError::EntryNotFound(entry.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    // The declared size comes from the archive header, so it is not used as a capacity hint.
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Writes `output` as a copy of the archive at `source` with `entry` replaced by `bytes`.
///
/// Other entries are copied without recompression and keep their order. A missing
/// `entry` is appended. `source` and `output` may be the same path.
pub fn write_entry(source: &Path, output: &Path, entry: &str, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(output);

    let written = copy_with_replacement(source, &tmp, entry, bytes);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    replace_file(&tmp, output)?;
    tracing::info!(output = %output.display(), entry, bytes = bytes.len(), "archive written");
    Ok(())
}

fn copy_with_replacement(source: &Path, dest: &Path, entry: &str, bytes: &[u8]) -> Result<()> {
    let mut archive = open_archive(source)?;
    let mut writer = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let mut replaced = false;
    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        if file.name() == entry {
            drop(file);
            writer.start_file(entry, entry_options())?;
            writer.write_all(bytes)?;
            replaced = true;
        } else {
            writer.raw_copy_file(file)?;
        }
    }

    if !replaced {
        tracing::debug!(entry, "entry not present, appending");
        writer.start_file(entry, entry_options())?;
        writer.write_all(bytes)?;
    }

    let mut inner = writer.finish()?;
    inner.flush()?;
    Ok(())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Reads the text source for `path`: the named archive entry for a `.miz`, the file itself otherwise.
pub fn read_source(path: &Path, entry: Option<&str>) -> Result<Vec<u8>> {
    if is_archive(path) {
        let entry = entry
            .map(str::to_string)
            .unwrap_or_else(|| dictionary_entry(DEFAULT_LOCALE));
        read_entry(path, &entry)
    } else {
        Ok(fs::read(path)?)
    }
}

/// Counterpart of [`read_source`]. For plain files `source` is ignored.
pub fn write_source(source: &Path, output: &Path, entry: Option<&str>, bytes: &[u8]) -> Result<()> {
    if is_archive(source) {
        let entry = entry
            .map(str::to_string)
            .unwrap_or_else(|| dictionary_entry(DEFAULT_LOCALE));
        write_entry(source, output, &entry, bytes)
    } else {
        write_atomic(output, bytes)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&tmp, bytes)?;
    replace_file(&tmp, path)
}

fn replace_file(tmp: &Path, path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "miz".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
