//! Record loader for the JSON resources
//!
//! A resource is decoded record by record so that one bad entry does not
//! take the rest of the file down with it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{LoadError, RecordError};
use crate::models::{Dance, Formation, RawSetlist, RoleSet};

/// A top-level record in one of the JSON resources
pub trait Record: DeserializeOwned {
    /// Singular noun used in log lines
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Record for Dance {
    const KIND: &'static str = "dance";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Formation {
    const KIND: &'static str = "formation";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for RoleSet {
    const KIND: &'static str = "role set";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for RawSetlist {
    const KIND: &'static str = "setlist";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Decode one record, rejecting blank ids
pub fn decode_record<T: Record>(position: usize, value: Value) -> Result<T, RecordError> {
    let record: T = serde_json::from_value(value).map_err(|source| RecordError::Malformed {
        kind: T::KIND,
        position,
        source,
    })?;

    if record.id().trim().is_empty() {
        return Err(RecordError::MissingId {
            kind: T::KIND,
            position,
        });
    }

    Ok(record)
}

/// Split a resource payload into its raw JSON records
pub fn parse_payload(resource: &'static str, payload: Option<&str>) -> Result<Vec<Value>, LoadError> {
    let text = payload.ok_or(LoadError::Unavailable { resource })?;
    let value: Value = serde_json::from_str(text)
        .map_err(|source| LoadError::InvalidJson { resource, source })?;

    match value {
        Value::Array(values) => Ok(values),
        _ => Err(LoadError::NotAnArray { resource }),
    }
}

/// Decode every well-formed record, skipping and logging the rest
pub fn decode_records<T: Record>(values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let records: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match decode_record(position, value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping {}", e);
                None
            }
        })
        .collect();

    if records.len() < total {
        log::warn!(
            "Loaded {} of {} {} records",
            records.len(),
            total,
            T::KIND
        );
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_records_are_skipped() {
        let values = parse_payload(
            "dances.json",
            Some(r#"[{"id": "a", "title": "A"}, {"title": "no id"}, {"id": ""}, 42, {"id": "b", "calls": "oops"}]"#),
        )
        .unwrap();

        let dances: Vec<Dance> = decode_records(values);

        assert_eq!(dances.len(), 1);
        assert_eq!(dances[0].id, "a");
    }

    #[test]
    fn test_non_array_payload_is_a_load_failure() {
        let err = parse_payload("formations.json", Some(r#"{"id": "x"}"#)).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray { .. }));

        let err = parse_payload("formations.json", Some("not json")).unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson { .. }));

        let err = parse_payload("formations.json", None).unwrap_err();
        assert!(matches!(err, LoadError::Unavailable { .. }));
    }
}
