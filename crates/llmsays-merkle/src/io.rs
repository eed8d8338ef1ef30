//! Serde file codec shared by manifests and envelope files.
//!
//! - [`read_json`] / [`write_json`]: pretty JSON.
//! - [`read_cbor`] / [`write_cbor`]: CBOR via `ciborium`.
//! - [`read_auto`] / [`write_auto`]: picked by extension (`.json`, `.cbor`,
//!   case-insensitive). Reads reject anything else; writes fall back to JSON.
//!
//! Writers create missing parent directories.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// On-disk encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON.
    Json,
    /// CBOR.
    Cbor,
}

impl Format {
    /// Format named by `path`'s extension, if recognized.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match ext_lower(path).as_deref() {
            Some("json") => Some(Self::Json),
            Some("cbor") => Some(Self::Cbor),
            _ => None,
        }
    }
}

/// Read a value from JSON.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    read_as(path.as_ref(), Format::Json)
}

/// Write a value as pretty JSON.
pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    write_as(path.as_ref(), value, Format::Json)
}

/// Read a value from CBOR.
pub fn read_cbor<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    read_as(path.as_ref(), Format::Cbor)
}

/// Write a value as CBOR.
pub fn write_cbor<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    write_as(path.as_ref(), value, Format::Cbor)
}

/// Read with the format chosen by extension.
pub fn read_auto<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    match (Format::from_path(path), ext_lower(path)) {
        (Some(format), _) => read_as(path, format),
        (None, Some(other)) => bail!("unsupported extension .{other} (expected .json or .cbor)"),
        (None, None) => bail!("{} has no extension (expected .json or .cbor)", display(path)),
    }
}

/// Write with the format chosen by extension (JSON when unrecognized).
pub fn write_auto<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    write_as(path, value, Format::from_path(path).unwrap_or(Format::Json))
}

fn read_as<T: DeserializeOwned>(path: &Path, format: Format) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", display(path)))?;
    let mut rdr = BufReader::new(f);
    match format {
        Format::Json => serde_json::from_reader(rdr)
            .with_context(|| format!("deserialize JSON {}", display(path))),
        Format::Cbor => ciborium::de::from_reader(&mut rdr)
            .with_context(|| format!("deserialize CBOR {}", display(path))),
    }
}

fn write_as<T: Serialize>(path: &Path, value: &T, format: Format) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", display(path)))?;
    let mut w = BufWriter::new(f);
    match format {
        Format::Json => serde_json::to_writer_pretty(&mut w, value).context("serialize JSON")?,
        Format::Cbor => ciborium::ser::into_writer(value, &mut w).context("serialize CBOR")?,
    }
    w.flush().with_context(|| format!("flush {}", display(path)))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(dir)))?;
        }
    }
    Ok(())
}

#[inline]
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[inline]
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
