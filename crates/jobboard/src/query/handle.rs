use serde_json::{Map, Value};

/// Comparison operator tokens recognized inside bracketed filter keys, e.g.
/// `salary[gte]=50000`. Only exact, whole-token matches qualify; anything
/// else passes through as a literal field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CompareOp {
    pub fn parse_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    /// Store-native operator key, sigil-prefixed.
    pub fn sigil(self) -> &'static str {
        match self {
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
        }
    }
}

/// One sort key; `-field` on the wire means descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: raw.to_string(),
                descending: false,
            },
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Field projection applied to materialized documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every stored field.
    #[default]
    All,
    /// Only the named fields (plus the document id).
    Include(Vec<String>),
    /// Everything except the named fields.
    Exclude(Vec<String>),
}

/// Quoted-phrase free-text restriction evaluated against a collection's
/// indexed text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub phrase: String,
}

/// Opaque handle for a pending, refinable retrieval against one collection.
///
/// Each refinement consumes the handle and returns it further constrained;
/// nothing touches the store until the caller materializes the handle through
/// a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionQuery {
    collection: String,
    predicate: Map<String, Value>,
    search: Option<TextSearch>,
    sort: Vec<SortKey>,
    projection: Projection,
    skip: usize,
    limit: Option<usize>,
}

impl CollectionQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            predicate: Map::new(),
            search: None,
            sort: Vec::new(),
            projection: Projection::All,
            skip: 0,
            limit: None,
        }
    }

    /// Merge a predicate into the existing restriction. Clauses on the same
    /// field compose; a later equality clause on a field replaces an earlier
    /// one, matching last-write-wins on the underlying document.
    pub fn restrict(mut self, predicate: Map<String, Value>) -> Self {
        for (field, clause) in predicate {
            self.predicate.insert(field, clause);
        }
        self
    }

    /// Apply a free-text phrase restriction, composed with (not replacing)
    /// the field predicate.
    pub fn search_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.search = Some(TextSearch {
            phrase: phrase.into(),
        });
        self
    }

    pub fn order_by(mut self, keys: Vec<SortKey>) -> Self {
        self.sort = keys;
        self
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Skip-then-limit windowing.
    pub fn window(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn predicate(&self) -> &Map<String, Value> {
        &self.predicate
    }

    pub fn search(&self) -> Option<&TextSearch> {
        self.search.as_ref()
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
