//! Predicate, text-search, sort, and projection evaluation over documents.
//!
//! Values arrive from the query string as strings; comparisons coerce a
//! string to a number when the stored value is numeric, and to an instant
//! when both sides parse as RFC 3339 timestamps. Unknown fields and unknown
//! operator keys silently match nothing, mirroring a lenient document store.

use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::{Map, Value};

use crate::query::{Projection, SortKey};
use crate::store::{Document, ID_FIELD};

pub(crate) fn matches(document: &Document, predicate: &Map<String, Value>) -> bool {
    predicate
        .iter()
        .all(|(field, clause)| clause_matches(document.get(field), clause))
}

fn clause_matches(stored: Option<&Value>, clause: &Value) -> bool {
    match clause {
        Value::Object(clauses) if clauses.keys().all(|key| key.starts_with('$')) => clauses
            .iter()
            .all(|(op, argument)| operator_matches(op, stored, argument)),
        _ => equality_matches(stored, clause),
    }
}

fn operator_matches(op: &str, stored: Option<&Value>, argument: &Value) -> bool {
    match op {
        "$gt" => ordering_matches(stored, argument, |ordering| ordering == Ordering::Greater),
        "$gte" => ordering_matches(stored, argument, |ordering| ordering != Ordering::Less),
        "$lt" => ordering_matches(stored, argument, |ordering| ordering == Ordering::Less),
        "$lte" => ordering_matches(stored, argument, |ordering| ordering != Ordering::Greater),
        "$in" => match argument {
            Value::Array(members) => members
                .iter()
                .any(|member| equality_matches(stored, member)),
            _ => false,
        },
        _ => false,
    }
}

fn ordering_matches(
    stored: Option<&Value>,
    argument: &Value,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    stored
        .and_then(|value| compare_values(value, argument))
        .is_some_and(accept)
}

fn equality_matches(stored: Option<&Value>, expected: &Value) -> bool {
    match stored {
        None => false,
        // An array field matches when any member does, so `industry=Banking`
        // finds jobs listing several industries.
        Some(Value::Array(members)) => members
            .iter()
            .any(|member| values_equal(member, expected)),
        Some(value) => values_equal(value, expected),
    }
}

fn values_equal(stored: &Value, expected: &Value) -> bool {
    if stored == expected {
        return true;
    }
    match (as_number(stored), as_number(expected)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Total comparison between a stored value and a query argument. `None`
/// when the two are incomparable, which makes range operators no-op. Numeric
/// coercion first, then timestamps, then plain string ordering.
fn compare_values(stored: &Value, argument: &Value) -> Option<Ordering> {
    if let (Some(left), Some(right)) = (as_number(stored), as_number(argument)) {
        return left.partial_cmp(&right);
    }
    if let (Value::String(left), Value::String(right)) = (stored, argument) {
        if let (Ok(left), Ok(right)) = (
            DateTime::parse_from_rfc3339(left),
            DateTime::parse_from_rfc3339(right),
        ) {
            return Some(left.cmp(&right));
        }
        return Some(left.as_str().cmp(right.as_str()));
    }
    None
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Case-insensitive quoted-phrase containment over the collection's indexed
/// text fields. String fields and arrays of strings both participate.
pub(crate) fn text_matches(document: &Document, fields: &[String], phrase: &str) -> bool {
    let needle = phrase.to_lowercase();
    fields.iter().any(|field| match document.get(field) {
        Some(Value::String(text)) => text.to_lowercase().contains(&needle),
        Some(Value::Array(members)) => members.iter().any(|member| {
            member
                .as_str()
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        }),
        _ => false,
    })
}

/// Multi-key sort. Documents missing a sort field order after those that
/// carry it, regardless of direction.
pub(crate) fn sort_documents(documents: &mut [Document], keys: &[SortKey]) {
    documents.sort_by(|left, right| {
        for key in keys {
            let ordering = match (left.get(&key.field), right.get(&key.field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => {
                    let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
                    if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Apply a projection; inclusive projections always keep the document id.
pub(crate) fn project(document: Document, projection: &Projection) -> Document {
    match projection {
        Projection::All => document,
        Projection::Include(fields) => document
            .into_iter()
            .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|field| field == key))
            .collect(),
        Projection::Exclude(fields) => document
            .into_iter()
            .filter(|(key, _)| !fields.iter().any(|field| field == key))
            .collect(),
    }
}
