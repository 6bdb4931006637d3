//! Composite resource identifiers
//!
//! Nested resources are addressed by several IDs at once (organization,
//! project, cluster, ...). To hand such an address to an external state store,
//! or to accept one at import time, the IDs are flattened into one string:
//!
//! ```text
//! id=<v>,cluster_id=<v>,project_id=<v>,organization_id=<v>
//! ```

use thiserror::Error;

pub const ID: &str = "id";
pub const CLUSTER_ID: &str = "cluster_id";
pub const PROJECT_ID: &str = "project_id";
pub const ORGANIZATION_ID: &str = "organization_id";

const FIELD_DELIMITER: char = ',';
const VALUE_DELIMITER: char = '=';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The field is absent, or present with an empty value
    #[error("ID '{field}' is missing or was passed incorrectly, expected format: {expected}")]
    Missing { field: String, expected: String },

    #[error("expected {expected} ID fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("malformed ID segment '{segment}', expected name=value")]
    Malformed { segment: String },

    #[error("unexpected ID field '{field}'")]
    UnexpectedField { field: String },

    #[error("ID field '{field}' appears more than once")]
    DuplicateField { field: String },

    /// A `,` anywhere, or a `=` inside a field name
    #[error("ID field '{field}' contains a reserved character")]
    ReservedCharacter { field: String },

    #[error("composite ID needs at least one field")]
    Empty,
}

/// An ordered set of named IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    fields: Vec<(String, String)>,
}

impl CompositeId {
    /// Build from (name, value) pairs, keeping their order
    pub fn new<I, N, V>(fields: I) -> Result<Self, IdError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let fields: Vec<(String, String)> = fields
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .collect();

        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        check_names(&names)?;

        for (name, value) in &fields {
            if value.contains(FIELD_DELIMITER) {
                return Err(IdError::ReservedCharacter {
                    field: name.clone(),
                });
            }
        }

        check_values(&names, |name| {
            fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        })?;

        Ok(Self { fields })
    }

    /// Value of a field, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a field that must be present
    pub fn require(&self, name: &str) -> Result<&str, IdError> {
        self.get(name).ok_or_else(|| IdError::Missing {
            field: name.to_string(),
            expected: self.expected_format(),
        })
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Canonical string form
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(n, v)| format!("{}{}{}", n, VALUE_DELIMITER, v))
            .collect::<Vec<_>>()
            .join(&FIELD_DELIMITER.to_string())
    }

    fn expected_format(&self) -> String {
        let names: Vec<&str> = self.names().collect();
        expected_format(&names)
    }
}

impl std::fmt::Display for CompositeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Encode (name, value) pairs in the order given
pub fn encode(fields: &[(&str, &str)]) -> Result<String, IdError> {
    Ok(CompositeId::new(fields.iter().copied())?.encode())
}

/// Decode a composite ID, expecting exactly the `expected` field names
///
/// Segments are matched by name, so their order in `input` does not matter;
/// the result is ordered like `expected`.
pub fn decode(input: &str, expected: &[&str]) -> Result<CompositeId, IdError> {
    check_names(expected)?;

    let segments: Vec<&str> = input.split(FIELD_DELIMITER).collect();
    if segments.len() != expected.len() {
        return Err(IdError::FieldCount {
            expected: expected.len(),
            found: segments.len(),
        });
    }

    let mut parsed: Vec<(&str, &str)> = Vec::with_capacity(segments.len());
    for segment in segments {
        let (name, value) = segment
            .split_once(VALUE_DELIMITER)
            .ok_or_else(|| IdError::Malformed {
                segment: segment.to_string(),
            })?;
        if !expected.contains(&name) {
            return Err(IdError::UnexpectedField {
                field: name.to_string(),
            });
        }
        if parsed.iter().any(|(n, _)| *n == name) {
            return Err(IdError::DuplicateField {
                field: name.to_string(),
            });
        }
        parsed.push((name, value));
    }

    check_values(expected, |name| {
        parsed.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    })?;

    // every expected name was found above, so this cannot miss
    CompositeId::new(expected.iter().map(|name| {
        let value = parsed
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .unwrap_or_default();
        (*name, value)
    }))
}

/// Field names must be non-empty, unique and free of delimiters
fn check_names(names: &[&str]) -> Result<(), IdError> {
    if names.is_empty() {
        return Err(IdError::Empty);
    }
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() || name.contains([FIELD_DELIMITER, VALUE_DELIMITER]) {
            return Err(IdError::ReservedCharacter {
                field: name.to_string(),
            });
        }
        if names[..i].contains(name) {
            return Err(IdError::DuplicateField {
                field: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Shared by encode and decode: every expected field has a non-empty value
fn check_values<'a>(
    expected: &[&str],
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Result<(), IdError> {
    for name in expected {
        match lookup(name) {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(IdError::Missing {
                    field: name.to_string(),
                    expected: expected_format(expected),
                });
            }
        }
    }
    Ok(())
}

fn expected_format(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("{}=<value>", n))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER_SCOPED: [&str; 4] = [ID, CLUSTER_ID, PROJECT_ID, ORGANIZATION_ID];

    #[test]
    fn test_encode_canonical_form() {
        let encoded = encode(&[
            (ID, "100"),
            (CLUSTER_ID, "200"),
            (PROJECT_ID, "300"),
            (ORGANIZATION_ID, "400"),
        ])
        .unwrap();

        assert_eq!(
            encoded,
            "id=100,cluster_id=200,project_id=300,organization_id=400"
        );
    }

    #[test]
    fn test_round_trip() {
        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![(ORGANIZATION_ID, "o")],
            vec![(ID, "p-1"), (ORGANIZATION_ID, "0f4e8a52-6d1c-4bb4-9c3b-8f0cbe7d1a11")],
            vec![
                (ID, "ffffffff-aaaa-1414-eeee-000000000000"),
                (CLUSTER_ID, "c"),
                (PROJECT_ID, "p"),
                (ORGANIZATION_ID, "o"),
            ],
            vec![("bucket_id", "dHJhdmVsLXNhbXBsZQ"), (ID, "b")],
        ];

        for fields in cases {
            let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
            let decoded = decode(&encode(&fields).unwrap(), &names).unwrap();
            let expected = CompositeId::new(fields.iter().copied()).unwrap();
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn test_decode_tolerates_reordering() {
        let decoded = decode(
            "organization_id=400,project_id=300,id=100,cluster_id=200",
            &CLUSTER_SCOPED,
        )
        .unwrap();

        assert_eq!(decoded.get(ID), Some("100"));
        assert_eq!(decoded.get(CLUSTER_ID), Some("200"));
        assert_eq!(decoded.get(PROJECT_ID), Some("300"));
        assert_eq!(decoded.get(ORGANIZATION_ID), Some("400"));
        // result follows the expected order
        let names: Vec<&str> = decoded.names().collect();
        assert_eq!(names, CLUSTER_SCOPED);
    }

    #[test]
    fn test_decode_field_count_mismatch() {
        assert_eq!(
            decode("id=100,project_id=300,organization_id=400", &CLUSTER_SCOPED),
            Err(IdError::FieldCount {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            decode("id=1,cluster_id=2,project_id=3,organization_id=4,extra=5", &CLUSTER_SCOPED),
            Err(IdError::FieldCount {
                expected: 4,
                found: 5
            })
        );
    }

    #[test]
    fn test_missing_and_empty_reported_identically() {
        let empty_on_decode = decode(
            "id=100,cluster_id=,project_id=300,organization_id=400",
            &CLUSTER_SCOPED,
        )
        .unwrap_err();
        let empty_on_encode = encode(&[
            (ID, "100"),
            (CLUSTER_ID, ""),
            (PROJECT_ID, "300"),
            (ORGANIZATION_ID, "400"),
        ])
        .unwrap_err();

        assert_eq!(empty_on_decode, empty_on_encode);
        assert!(matches!(empty_on_decode, IdError::Missing { ref field, .. } if field == CLUSTER_ID));

        let missing = CompositeId::new([(ID, "1")])
            .unwrap()
            .require(CLUSTER_ID)
            .unwrap_err();
        assert!(matches!(missing, IdError::Missing { ref field, .. } if field == CLUSTER_ID));
    }

    #[test]
    fn test_decode_rejects_unknown_and_duplicate_fields() {
        assert_eq!(
            decode("id=1,bucket_id=2,project_id=3,organization_id=4", &CLUSTER_SCOPED),
            Err(IdError::UnexpectedField {
                field: "bucket_id".to_string()
            })
        );
        assert_eq!(
            decode("id=1,id=2,project_id=3,organization_id=4", &CLUSTER_SCOPED),
            Err(IdError::DuplicateField {
                field: "id".to_string()
            })
        );
    }

    #[test]
    fn test_decode_malformed_segment() {
        assert_eq!(
            decode("id=1,cluster_id,project_id=3,organization_id=4", &CLUSTER_SCOPED),
            Err(IdError::Malformed {
                segment: "cluster_id".to_string()
            })
        );
        assert!(matches!(
            decode("", &[ID]),
            Err(IdError::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_splits_on_first_equals_only() {
        let decoded = decode("id=a=b,organization_id==o", &[ID, ORGANIZATION_ID]).unwrap();
        assert_eq!(decoded.get(ID), Some("a=b"));
        assert_eq!(decoded.get(ORGANIZATION_ID), Some("=o"));
        assert_eq!(decoded.encode(), "id=a=b,organization_id==o");
    }

    #[test]
    fn test_whitespace_is_kept_verbatim() {
        let fields = [(ID, " a "), (ORGANIZATION_ID, "o\t")];
        let decoded = decode(&encode(&fields).unwrap(), &[ID, ORGANIZATION_ID]).unwrap();
        assert_eq!(decoded, CompositeId::new(fields).unwrap());
        assert_eq!(decoded.get(ID), Some(" a "));

        // whitespace-only is a value, in both directions
        assert_eq!(encode(&[(ID, "  ")]), Ok("id=  ".to_string()));
        assert_eq!(decode("id=  ", &[ID]).unwrap().get(ID), Some("  "));

        // names are matched exactly
        assert_eq!(
            decode(" id=a", &[ID]),
            Err(IdError::UnexpectedField {
                field: " id".to_string()
            })
        );
    }

    #[test]
    fn test_encode_rejects_reserved_characters() {
        assert_eq!(
            encode(&[(ID, "a,b")]),
            Err(IdError::ReservedCharacter {
                field: "id".to_string()
            })
        );
        assert!(matches!(
            encode(&[("na=me", "v")]),
            Err(IdError::ReservedCharacter { .. })
        ));
        assert_eq!(encode(&[(ID, "a=b")]), Ok("id=a=b".to_string()));
        assert_eq!(encode(&[]), Err(IdError::Empty));
    }

    #[test]
    fn test_display_is_canonical() {
        let id = CompositeId::new([(ID, "c1"), (PROJECT_ID, "p1"), (ORGANIZATION_ID, "o1")]).unwrap();
        assert_eq!(id.to_string(), "id=c1,project_id=p1,organization_id=o1");
        assert_eq!(id.require(PROJECT_ID), Ok("p1"));
    }
}
