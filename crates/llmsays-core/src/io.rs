//! File and stdin helpers for envelopes, fragment sets and disclosures.
//!
//! `-` as a path reads standard input. Files go through the
//! JSON codec in `llmsays_merkle::io`.

use crate::disclosure::Disclosure;
use crate::envelope::{Fragments, VerificationOutcome};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read all bytes from `path`, or stdin when `path` is `-`.
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("read envelope from stdin")?;
        return Ok(buf);
    }
    fs::read(path).with_context(|| format!("open {}", path.display()))
}

/// Read and decode a service reply (either layout).
pub fn read_outcome<P: AsRef<Path>>(path: P) -> Result<VerificationOutcome> {
    let path = path.as_ref();
    let bytes = read_input(path)?;
    VerificationOutcome::from_json(&bytes)
        .with_context(|| format!("decode envelope {}", path.display()))
}

/// Read a `{thinking, response}` fragment set.
pub fn read_fragments<P: AsRef<Path>>(path: P) -> Result<Fragments> {
    read_json(path)
}

/// Read a disclosure.
pub fn read_disclosure<P: AsRef<Path>>(path: P) -> Result<Disclosure> {
    read_json(path)
}

/// Write any serializable value as pretty JSON, creating parent directories.
pub fn write_json_pretty<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    llmsays_merkle::io::write_json(path, value)
}

fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
    let path = path.as_ref();
    if path.as_os_str() == "-" {
        let bytes = read_input(path)?;
        return serde_json::from_slice(&bytes).context("deserialize JSON from stdin");
    }
    llmsays_merkle::io::read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/fragments.json");
        let f = Fragments {
            thinking: vec!["t".into()],
            response: vec!["r".into()],
        };
        write_json_pretty(&path, &f).unwrap();
        assert_eq!(read_fragments(&path).unwrap(), f);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_outcome("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
