//! Records: ordered keys shared across rows, and the values of each row.

use crate::error::RecordError;

/// Check that a key can double as a `\VAR{}` placeholder name
///
/// Keys must start with an ASCII letter and contain only ASCII letters and
/// digits. Underscores break LaTeX, hyphens and spaces break the template
/// variable syntax.
pub fn is_identifier_safe(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// One worksheet row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 0-based position of the row among the data rows
    pub index: usize,
    /// Field values, positionally matching the record set's keys
    pub values: Vec<String>,
}

impl Record {
    /// Value at a 1-based field position
    pub fn field(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Short label for progress output (the first two fields)
    pub fn label(&self) -> String {
        self.values
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Keys plus every record of a worksheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSet {
    keys: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Build a record set, checking that every row is as wide as the keys
    pub fn new(keys: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RecordError> {
        let expected = keys.len();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, values)| {
                if values.len() == expected {
                    Ok(Record { index, values })
                } else {
                    Err(RecordError::RaggedRow {
                        row: index + 1,
                        expected,
                        found: values.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { keys, records })
    }

    /// Build a record set whose keys must all be identifier-safe
    pub fn with_safe_keys(keys: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RecordError> {
        if let Some(bad) = keys.iter().find(|k| !is_identifier_safe(k)) {
            return Err(RecordError::UnsafeKey(bad.clone()));
        }
        Self::new(keys, rows)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn width(&self) -> usize {
        self.keys.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identifier_safe() {
        assert!(is_identifier_safe("FullName"));
        assert!(is_identifier_safe("ID"));
        assert!(is_identifier_safe("Q1a"));
        assert!(!is_identifier_safe(""));
        assert!(!is_identifier_safe("Full name"));
        assert!(!is_identifier_safe("full-name"));
        assert!(!is_identifier_safe("full_name"));
        assert!(!is_identifier_safe("1st"));
    }

    #[test]
    fn test_record_set_new() {
        let set = RecordSet::new(row(&["ID", "Name"]), vec![row(&["7", "Bob"])]).unwrap();
        assert_eq!(set.width(), 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].field(2), Some("Bob"));
        assert_eq!(set.records()[0].field(0), None);
        assert_eq!(set.records()[0].field(3), None);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = RecordSet::new(
            row(&["ID", "Name"]),
            vec![row(&["7", "Bob"]), row(&["8"])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            RecordError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_unsafe_key_rejected() {
        let err = RecordSet::with_safe_keys(row(&["ID", "Full_Name"]), vec![]).unwrap_err();
        assert_eq!(err, RecordError::UnsafeKey("Full_Name".to_string()));
    }

    #[test]
    fn test_label() {
        let record = Record {
            index: 0,
            values: row(&["5", "Ann Lee", "S100"]),
        };
        assert_eq!(record.label(), "5 Ann Lee");
    }
}
