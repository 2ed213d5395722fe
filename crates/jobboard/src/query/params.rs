use std::collections::BTreeMap;

/// Value of one query parameter. Repeated keys collect into `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    fn push(&mut self, value: String) {
        match self {
            ParamValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = ParamValue::Many(vec![first, value]);
            }
            ParamValue::Many(values) => values.push(value),
        }
    }

    /// First value regardless of arity.
    pub fn first(&self) -> &str {
        match self {
            ParamValue::One(value) => value,
            ParamValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Flat, untrusted name/value mapping parsed from a request's query pairs.
///
/// Arbitrary keys are permitted; interpretation happens inside the filter
/// builder stages, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: BTreeMap<String, ParamValue>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.append(key.into(), value.into());
        }
        map
    }

    pub fn append(&mut self, key: String, value: String) {
        match self.entries.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.entries.insert(key, ParamValue::One(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Single-valued lookup used by the control-key stages; empty strings are
    /// treated as absent, matching the original API's behavior.
    pub fn single(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(ParamValue::first)
            .filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
