//! Staged query filter builder.
//!
//! Translates an untrusted query-parameter mapping into a composable
//! retrieval specification: field predicate, free-text phrase, sort order,
//! projection, and a skip/limit window. The builder stages a description
//! only; materialization happens later through the document store.

mod params;
mod handle;

pub use params::{ParamMap, ParamValue};
pub use handle::{CollectionQuery, CompareOp, Projection, SortKey, TextSearch};

use serde_json::{Map, Value};

use crate::store::VERSION_FIELD;

/// Parameter names consumed as pipeline metadata, never entity filters.
pub const RESERVED_KEYS: [&str; 5] = ["sort", "fields", "q", "limit", "page"];

/// Fixed default sort: most recent posting first.
const DEFAULT_SORT: &str = "-postingDate";

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("malformed filter key '{0}'")]
    MalformedKey(String),
}

/// Per-request builder wrapping one [`CollectionQuery`].
///
/// The five stages are independent and fluent; the canonical order is
/// `filter -> sort -> limit_fields -> search_by_query -> pagination`, which
/// [`ApiFilters::build`] runs in one call. Calling a stage twice re-applies
/// it and may compound (double pagination, for instance); callers own that.
#[derive(Debug, Clone)]
pub struct ApiFilters {
    query: CollectionQuery,
    params: ParamMap,
    max_limit: Option<usize>,
}

impl ApiFilters {
    pub fn new(query: CollectionQuery, params: ParamMap) -> Self {
        Self {
            query,
            params,
            max_limit: None,
        }
    }

    /// Cap the page size accepted from the request. The builder itself
    /// imposes no bound; services install one from configuration.
    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = Some(max_limit);
        self
    }

    /// Translate every non-reserved parameter into a predicate clause.
    ///
    /// Keys shaped `field[op]` where `op` is exactly one of
    /// `gt|gte|lt|lte|in` contribute a sigil-keyed operator clause under
    /// `field`; `field[in]` splits its value on commas. A bare key repeated
    /// in the request becomes an implicit `$in` list. Every other key is an
    /// equality clause passed through uninterpreted. Reserved control-key
    /// names are skipped whether bare (`sort=x`) or bracketed (`sort[gt]=x`).
    /// Empty bracket segments (`[gt]=5`, `field[]=x`) fail the request.
    pub fn filter(mut self) -> Result<Self, QueryError> {
        let mut predicate = Map::new();

        for (key, value) in self.params.iter() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }

            match split_operator_key(key)? {
                // A control-key name can never reach the predicate, not
                // even dressed up as `sort[gt]`.
                Some((field, _)) if RESERVED_KEYS.contains(&field) => continue,
                Some((field, op)) => {
                    let clause = operator_argument(op, value);
                    let entry = predicate
                        .entry(field.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    match entry {
                        Value::Object(clauses) => {
                            clauses.insert(op.sigil().to_string(), clause);
                        }
                        // An earlier equality clause on the same field; the
                        // operator clause supersedes it.
                        other => {
                            let mut clauses = Map::new();
                            clauses.insert(op.sigil().to_string(), clause);
                            *other = Value::Object(clauses);
                        }
                    }
                }
                None => {
                    predicate.insert(key.clone(), equality_clause(value));
                }
            }
        }

        self.query = self.query.restrict(predicate);
        Ok(self)
    }

    /// Apply the `sort` control key, or the fixed `-postingDate` default.
    pub fn sort(mut self) -> Self {
        let keys = match self.params.single("sort") {
            Some(raw) => raw
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(SortKey::parse)
                .collect(),
            None => vec![SortKey::parse(DEFAULT_SORT)],
        };
        self.query = self.query.order_by(keys);
        self
    }

    /// Apply the `fields` projection, or exclude only the store's version
    /// field when absent.
    pub fn limit_fields(mut self) -> Self {
        let projection = match self.params.single("fields") {
            Some(raw) => Projection::Include(
                raw.split(',')
                    .map(str::trim)
                    .filter(|field| !field.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => Projection::Exclude(vec![VERSION_FIELD.to_string()]),
        };
        self.query = self.query.project(projection);
        self
    }

    /// Apply the `q` control key as a quoted-phrase search; hyphens become
    /// spaces so `software-engineer` searches for `software engineer`.
    pub fn search_by_query(mut self) -> Self {
        if let Some(raw) = self.params.single("q") {
            let phrase = raw.replace('-', " ");
            self.query = self.query.search_phrase(phrase);
        }
        self
    }

    /// Apply `page`/`limit` windowing. Missing or non-positive values fall
    /// back to page 1 and a page size of 10; the configured cap, when
    /// installed, clamps the page size.
    pub fn pagination(mut self) -> Self {
        let page = parse_positive(self.params.single("page")).unwrap_or(DEFAULT_PAGE);
        let mut limit = parse_positive(self.params.single("limit")).unwrap_or(DEFAULT_PAGE_SIZE);
        if let Some(max_limit) = self.max_limit {
            limit = limit.min(max_limit);
        }

        // `page` is attacker-controlled and may be any positive i64, so the
        // skip arithmetic must not overflow.
        let skip = page.saturating_sub(1).saturating_mul(limit);
        self.query = self.query.window(skip, limit);
        self
    }

    /// Run the canonical pipeline and yield the final query handle.
    pub fn build(self) -> Result<CollectionQuery, QueryError> {
        Ok(self
            .filter()?
            .sort()
            .limit_fields()
            .search_by_query()
            .pagination()
            .into_query())
    }

    pub fn into_query(self) -> CollectionQuery {
        self.query
    }
}

/// Split `field[token]` keys. `Ok(None)` means the key is a plain field
/// name (including keys with stray brackets, which pass through verbatim);
/// only a recognized operator token produces `Some`.
fn split_operator_key(key: &str) -> Result<Option<(&str, CompareOp)>, QueryError> {
    let Some(open) = key.find('[') else {
        return Ok(None);
    };
    if !key.ends_with(']') {
        return Ok(None);
    }

    let field = &key[..open];
    let token = &key[open + 1..key.len() - 1];
    if field.is_empty() || token.is_empty() {
        return Err(QueryError::MalformedKey(key.to_string()));
    }
    if token.contains('[') || token.contains(']') {
        return Err(QueryError::MalformedKey(key.to_string()));
    }

    Ok(CompareOp::parse_token(token).map(|op| (field, op)))
}

fn operator_argument(op: CompareOp, value: &ParamValue) -> Value {
    match op {
        CompareOp::In => {
            let members = match value {
                ParamValue::One(raw) => split_list(raw),
                ParamValue::Many(raws) => raws.iter().flat_map(|raw| split_list(raw)).collect(),
            };
            Value::Array(members)
        }
        _ => Value::String(value.first().to_string()),
    }
}

fn equality_clause(value: &ParamValue) -> Value {
    match value {
        ParamValue::One(raw) => Value::String(raw.clone()),
        // A bare key supplied more than once matches any of its values.
        ParamValue::Many(raws) => {
            let mut clauses = Map::new();
            clauses.insert(
                CompareOp::In.sigil().to_string(),
                Value::Array(raws.iter().map(|raw| Value::String(raw.clone())).collect()),
            );
            Value::Object(clauses)
        }
    }
}

fn split_list(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| Value::String(part.to_string()))
        .collect()
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
        .map(|value| value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(pairs: &[(&str, &str)]) -> ApiFilters {
        ApiFilters::new(
            CollectionQuery::new("jobs"),
            ParamMap::from_pairs(pairs.iter().copied()),
        )
    }

    #[test]
    fn filter_preserves_plain_keys_and_drops_reserved_ones() {
        let query = filters(&[
            ("industry", "Banking"),
            ("company", "Acme"),
            ("sort", "-salary"),
            ("fields", "title"),
            ("q", "engineer"),
            ("page", "2"),
            ("limit", "5"),
        ])
        .filter()
        .expect("filter stage")
        .into_query();

        let predicate = query.predicate();
        assert_eq!(predicate.len(), 2);
        assert_eq!(predicate.get("industry"), Some(&json!("Banking")));
        assert_eq!(predicate.get("company"), Some(&json!("Acme")));
    }

    #[test]
    fn filter_rewrites_operator_tokens_to_sigil_form() {
        let query = filters(&[("salary[gte]", "50000"), ("positions[lt]", "4")])
            .filter()
            .expect("filter stage")
            .into_query();

        assert_eq!(
            query.predicate().get("salary"),
            Some(&json!({ "$gte": "50000" }))
        );
        assert_eq!(
            query.predicate().get("positions"),
            Some(&json!({ "$lt": "4" }))
        );
    }

    #[test]
    fn filter_combines_operator_clauses_on_one_field() {
        let query = filters(&[("salary[gte]", "30000"), ("salary[lte]", "90000")])
            .filter()
            .expect("filter stage")
            .into_query();

        assert_eq!(
            query.predicate().get("salary"),
            Some(&json!({ "$gte": "30000", "$lte": "90000" }))
        );
    }

    #[test]
    fn filter_splits_in_lists_and_collects_repeated_keys() {
        let query = ApiFilters::new(
            CollectionQuery::new("jobs"),
            ParamMap::from_pairs([
                ("jobType[in]", "Permanent,Internship"),
                ("industry", "Banking"),
                ("industry", "Business"),
            ]),
        )
        .filter()
        .expect("filter stage")
        .into_query();

        assert_eq!(
            query.predicate().get("jobType"),
            Some(&json!({ "$in": ["Permanent", "Internship"] }))
        );
        assert_eq!(
            query.predicate().get("industry"),
            Some(&json!({ "$in": ["Banking", "Business"] }))
        );
    }

    #[test]
    fn filter_passes_unknown_tokens_through_untouched() {
        // `print` contains `in` as a substring; whole-token matching must
        // leave it alone.
        let query = filters(&[("title[print]", "yes"), ("salaryRange", "wide")])
            .filter()
            .expect("filter stage")
            .into_query();

        assert_eq!(query.predicate().get("title[print]"), Some(&json!("yes")));
        assert_eq!(query.predicate().get("salaryRange"), Some(&json!("wide")));
        assert!(query.predicate().get("title").is_none());
    }

    #[test]
    fn filter_drops_reserved_names_used_as_operator_fields() {
        let query = filters(&[
            ("sort[gt]", "5"),
            ("page[in]", "1,2"),
            ("limit[lte]", "9"),
            ("salary[gte]", "50000"),
        ])
        .filter()
        .expect("filter stage")
        .into_query();

        let predicate = query.predicate();
        assert_eq!(predicate.len(), 1);
        assert_eq!(predicate.get("salary"), Some(&json!({ "$gte": "50000" })));
    }

    #[test]
    fn filter_rejects_empty_bracket_segments() {
        let err = filters(&[("[gt]", "5")]).filter().unwrap_err();
        assert_eq!(err, QueryError::MalformedKey("[gt]".to_string()));

        let err = filters(&[("salary[]", "5")]).filter().unwrap_err();
        assert_eq!(err, QueryError::MalformedKey("salary[]".to_string()));
    }

    #[test]
    fn sort_parses_comma_list_with_directions() {
        let query = filters(&[("sort", "salary,-postingDate")]).sort().into_query();
        assert_eq!(
            query.sort_keys(),
            &[
                SortKey::ascending("salary"),
                SortKey::descending("postingDate")
            ]
        );
    }

    #[test]
    fn sort_defaults_to_posting_date_descending() {
        let query = filters(&[]).sort().into_query();
        assert_eq!(query.sort_keys(), &[SortKey::descending("postingDate")]);
    }

    #[test]
    fn limit_fields_projects_named_fields() {
        let query = filters(&[("fields", "title,company")]).limit_fields().into_query();
        assert_eq!(
            query.projection(),
            &Projection::Include(vec!["title".to_string(), "company".to_string()])
        );
    }

    #[test]
    fn limit_fields_defaults_to_excluding_version_field() {
        let query = filters(&[]).limit_fields().into_query();
        assert_eq!(
            query.projection(),
            &Projection::Exclude(vec![VERSION_FIELD.to_string()])
        );
    }

    #[test]
    fn search_by_query_turns_slug_into_phrase() {
        let query = filters(&[("q", "software-engineer")])
            .search_by_query()
            .into_query();
        assert_eq!(
            query.search().map(|search| search.phrase.as_str()),
            Some("software engineer")
        );
    }

    #[test]
    fn pagination_computes_skip_from_page_and_limit() {
        let query = filters(&[("page", "3"), ("limit", "5")]).pagination().into_query();
        assert_eq!(query.skip(), 10);
        assert_eq!(query.limit(), Some(5));
    }

    #[test]
    fn pagination_falls_back_on_missing_or_invalid_values() {
        for params in [
            &[][..],
            &[("page", "abc"), ("limit", "xyz")][..],
            &[("page", "0"), ("limit", "-3")][..],
        ] {
            let query = filters(params).pagination().into_query();
            assert_eq!(query.skip(), 0);
            assert_eq!(query.limit(), Some(10));
        }
    }

    #[test]
    fn pagination_saturates_on_huge_page_numbers() {
        let page = i64::MAX.to_string();
        let query = filters(&[("page", page.as_str()), ("limit", "10")])
            .pagination()
            .into_query();
        assert_eq!(query.skip(), usize::MAX);
        assert_eq!(query.limit(), Some(10));
    }

    #[test]
    fn pagination_clamps_to_installed_cap() {
        let query = filters(&[("limit", "5000")])
            .with_max_limit(100)
            .pagination()
            .into_query();
        assert_eq!(query.limit(), Some(100));
    }

    #[test]
    fn build_runs_the_canonical_pipeline() {
        let query = filters(&[
            ("industry", "Banking"),
            ("salary[gte]", "50000"),
            ("sort", "-postingDate"),
            ("page", "2"),
            ("limit", "5"),
        ])
        .build()
        .expect("pipeline");

        assert_eq!(
            query.predicate().get("salary"),
            Some(&json!({ "$gte": "50000" }))
        );
        assert_eq!(query.sort_keys(), &[SortKey::descending("postingDate")]);
        assert_eq!(query.skip(), 5);
        assert_eq!(query.limit(), Some(5));
        assert_eq!(
            query.projection(),
            &Projection::Exclude(vec![VERSION_FIELD.to_string()])
        );
    }
}
