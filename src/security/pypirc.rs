//! Minimal reader for `.pypirc` credential files
//!
//! `.pypirc` is an INI file. Only what token lookup needs is supported:
//! `[section]` headers, `key = value` / `key: value` pairs and `#` / `;`
//! comment lines.

use secrecy::SecretString;
use std::path::Path;

/// Look up `key` in `[section]` of INI text
///
/// Keys are matched case-insensitively, section names exactly. An empty value
/// counts as absent.
pub fn lookup(text: &str, section: &str, key: &str) -> Option<String> {
    let mut in_section = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == section;
            continue;
        }

        if !in_section {
            continue;
        }

        let Some(split) = line.find(['=', ':']) else {
            continue;
        };
        let (name, value) = (line[..split].trim(), line[split + 1..].trim());
        if name.eq_ignore_ascii_case(key) && !value.is_empty() {
            return Some(value.to_string());
        }
    }

    None
}

/// Read the `password` of `section` from the credential file at `path`
///
/// A missing or unreadable file resolves to `None`.
pub fn read_password(path: &Path, section: &str) -> Option<SecretString> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "credential file not readable");
            return None;
        }
    };
    lookup(&text, section, "password").map(SecretString::from)
}
