//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::validation("from-file", format!("invalid JSON: {e}")))
}

/// Collect `--set` pairs into a JSON object.
///
/// Values are strings unless the key ends in `:` (`quantidade:=10`), which
/// parses the value as JSON. Blank string values are left out.
pub fn set_pairs_to_map(pairs: &[(String, String)]) -> Result<Map<String, Value>, CliError> {
    let mut map = Map::new();
    for (key, value) in pairs {
        if let Some(key) = key.strip_suffix(':') {
            let parsed = serde_json::from_str(value)
                .map_err(|e| CliError::validation(key, format!("invalid JSON value: {e}")))?;
            map.insert(key.to_owned(), parsed);
        } else if !value.trim().is_empty() {
            map.insert(key.clone(), Value::String(value.clone()));
        }
    }
    Ok(map)
}

/// The JSON object given by `--set` pairs or `--from-file`.
pub fn payload(
    set: &[(String, String)],
    from_file: Option<&Path>,
) -> Result<Map<String, Value>, CliError> {
    match from_file {
        Some(path) => match read_json_file(path)? {
            Value::Object(map) => Ok(map),
            _ => Err(CliError::validation("from-file", "expected a JSON object")),
        },
        None => set_pairs_to_map(set),
    }
}

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::validation(field, format!("'{value}' is not a YYYY-MM-DD date")))
}

pub fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_pairs_keep_strings_and_parse_raw_json() {
        let pairs = vec![
            ("nome".to_owned(), "Dipirona".to_owned()),
            ("quantidade:".to_owned(), "10".to_owned()),
            ("cnpj".to_owned(), "12345678000190".to_owned()),
            ("descricao".to_owned(), "  ".to_owned()),
        ];
        let map = set_pairs_to_map(&pairs).unwrap();
        assert_eq!(map["nome"], Value::String("Dipirona".into()));
        assert_eq!(map["quantidade"], Value::from(10));
        assert_eq!(map["cnpj"], Value::String("12345678000190".into()));
        assert!(!map.contains_key("descricao"));
    }

    #[test]
    fn bad_raw_json_names_the_field() {
        let pairs = vec![("quantidade:".to_owned(), "dez".to_owned())];
        let err = set_pairs_to_map(&pairs).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "quantidade"));
    }

    #[test]
    fn payload_reads_object_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"data_perda": "2024-03-01", "motivo": "Quebra"}"#)
            .unwrap();
        let map = payload(&[], Some(file.path())).unwrap();
        assert_eq!(map["motivo"], Value::String("Quebra".into()));
    }

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            parse_date("from", "2024-02-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert!(parse_date("from", "01/02/2024").is_err());
    }
}
