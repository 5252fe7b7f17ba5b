//! Result materialization
//!
//! A `ResultMaterializer` turns a hit and its stored fields into the
//! wire-format `ResultDocument`. The producer is handed one materializer at
//! construction and never looks at a hit to pick a shape.
//!
//! Document layout, in field order:
//! - stored source fields, or `_id` when no stored source is returned
//! - the score field (`$searchScore` or `$vectorSearchScore`)
//! - `$searchSortValues`, for sorted queries
//! - `$searchSequenceToken`, when a sequence token is attached
//! - `$searchRootDocumentId`, when a root document id is present

use serde_json::{Number, Value};
use shardcursor_core::{Result, ResultDocument, ScoredHit, SequenceToken, SortKey, StoredFields};

/// Relevance score field
pub const SEARCH_SCORE_FIELD: &str = "$searchScore";
/// Vector similarity score field
pub const VECTOR_SEARCH_SCORE_FIELD: &str = "$vectorSearchScore";
/// Sort values field
pub const SORT_VALUES_FIELD: &str = "$searchSortValues";
/// Sequence token field
pub const SEQUENCE_TOKEN_FIELD: &str = "$searchSequenceToken";
/// Root document id field
pub const ROOT_DOCUMENT_ID_FIELD: &str = "$searchRootDocumentId";
/// Document id field
pub const ID_FIELD: &str = "_id";

/// Builds wire documents from hits
pub trait ResultMaterializer: Send + Sync {
    /// Build the document for one hit
    fn build(
        &self,
        hit: &ScoredHit,
        fields: StoredFields,
        sequence_token: Option<&SequenceToken>,
    ) -> Result<ResultDocument>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Relevance search documents, scored under `$searchScore`
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchResultMaterializer;

impl ResultMaterializer for SearchResultMaterializer {
    fn build(
        &self,
        hit: &ScoredHit,
        fields: StoredFields,
        sequence_token: Option<&SequenceToken>,
    ) -> Result<ResultDocument> {
        materialize(SEARCH_SCORE_FIELD, hit, fields, sequence_token)
    }

    fn name(&self) -> &str {
        "search"
    }
}

/// Vector search documents, scored under `$vectorSearchScore`
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorSearchResultMaterializer;

impl ResultMaterializer for VectorSearchResultMaterializer {
    fn build(
        &self,
        hit: &ScoredHit,
        fields: StoredFields,
        sequence_token: Option<&SequenceToken>,
    ) -> Result<ResultDocument> {
        materialize(VECTOR_SEARCH_SCORE_FIELD, hit, fields, sequence_token)
    }

    fn name(&self) -> &str {
        "vector_search"
    }
}

fn materialize(
    score_field: &str,
    hit: &ScoredHit,
    fields: StoredFields,
    sequence_token: Option<&SequenceToken>,
) -> Result<ResultDocument> {
    let mut doc = ResultDocument::new();

    match fields.stored_source {
        Some(source) => {
            for (name, value) in source {
                doc.insert(name, value);
            }
        }
        None => {
            if let Some(id) = fields.id {
                doc.insert(ID_FIELD, id);
            }
        }
    }

    doc.insert(score_field, float_value(f64::from(hit.score)));

    if let Some(sort_values) = &hit.sort_values {
        let values = sort_values.iter().map(sort_key_value).collect();
        doc.insert(SORT_VALUES_FIELD, Value::Array(values));
    }

    if let Some(token) = sequence_token {
        doc.insert(SEQUENCE_TOKEN_FIELD, Value::String(token.encode()?));
    }

    if let Some(root_id) = fields.root_document_id {
        doc.insert(ROOT_DOCUMENT_ID_FIELD, root_id);
    }

    Ok(doc)
}

// Non-finite floats have no JSON number form
fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn sort_key_value(key: &SortKey) -> Value {
    match key {
        SortKey::Null => Value::Null,
        SortKey::Bool(b) => Value::Bool(*b),
        SortKey::Int(i) => Value::from(*i),
        SortKey::Float(f) => float_value(*f),
        SortKey::Str(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn id_only(id: &str) -> StoredFields {
        StoredFields {
            id: Some(json!(id)),
            ..StoredFields::default()
        }
    }

    #[test]
    fn test_search_document_shape() {
        let hit = ScoredHit::new(3, 0.5);
        let doc = SearchResultMaterializer.build(&hit, id_only("a"), None).unwrap();
        let names: Vec<_> = doc.field_names().collect();
        assert_eq!(names, vec!["_id", "$searchScore"]);
        assert_eq!(doc.get("$searchScore"), Some(&json!(0.5)));
    }

    #[test]
    fn test_vector_document_uses_similarity_field() {
        let hit = ScoredHit::new(3, 0.25);
        let doc = VectorSearchResultMaterializer
            .build(&hit, id_only("a"), None)
            .unwrap();
        assert_eq!(doc.get("$vectorSearchScore"), Some(&json!(0.25)));
        assert_eq!(doc.get("$searchScore"), None);
    }

    #[test]
    fn test_stored_source_replaces_id() {
        let mut source = Map::new();
        source.insert("_id".into(), json!(9));
        source.insert("title".into(), json!("hello"));
        let fields = StoredFields {
            id: Some(json!("ignored")),
            stored_source: Some(source),
            root_document_id: Some(json!("root")),
        };
        let doc = SearchResultMaterializer
            .build(&ScoredHit::new(0, 1.0), fields, None)
            .unwrap();
        assert_eq!(doc.get("_id"), Some(&json!(9)));
        assert_eq!(doc.get("title"), Some(&json!("hello")));
        assert_eq!(doc.get("$searchRootDocumentId"), Some(&json!("root")));
    }

    #[test]
    fn test_sort_values_and_token() {
        let hit = ScoredHit::new(4, 1.0)
            .with_sort_values(vec![SortKey::Int(3), SortKey::Str("x".into()), SortKey::Null]);
        let token = SequenceToken::for_hit(&hit, Some(json!("a")));
        let doc = SearchResultMaterializer
            .build(&hit, id_only("a"), Some(&token))
            .unwrap();
        assert_eq!(doc.get("$searchSortValues"), Some(&json!([3, "x", null])));
        let wire = doc.get("$searchSequenceToken").and_then(Value::as_str).unwrap();
        assert_eq!(SequenceToken::decode(wire).unwrap(), token);
    }

    #[test]
    fn test_non_finite_values_become_null() {
        assert_eq!(sort_key_value(&SortKey::Float(f64::NAN)), Value::Null);
        assert_eq!(float_value(f64::INFINITY), Value::Null);
        assert_eq!(float_value(2.0), json!(2.0));
    }
}
