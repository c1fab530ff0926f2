//! Autocomplete candidates for the declaration number input

use crate::models::Document;

/// Declaration numbers of every document starting with `partial_query`,
/// in source order. Searches the full set, not the filtered view.
pub fn suggest(documents: &[Document], partial_query: &str) -> Vec<String> {
    if partial_query.is_empty() {
        return Vec::new();
    }

    documents
        .iter()
        .filter(|doc| doc.declaration_number.as_str().starts_with(partial_query))
        .map(|doc| doc.declaration_number.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::sample_documents;

    #[test]
    fn test_empty_query_has_no_suggestions() {
        assert!(suggest(&sample_documents(), "").is_empty());
    }

    #[test]
    fn test_prefix_match() {
        let docs = sample_documents();
        assert_eq!(suggest(&docs, "11"), vec!["1112233445566"]);
        assert_eq!(suggest(&docs, "1"), vec!["1234567890123", "1112233445566"]);
    }

    #[test]
    fn test_prefix_is_anchored() {
        // "0123" occurs inside two numbers but starts none of them
        assert!(suggest(&sample_documents(), "0123").is_empty());
    }

    #[test]
    fn test_suggestions_are_exactly_prefix_matches() {
        let docs = sample_documents();
        for query in ["9", "98", "123", "1112233445566", "x"] {
            let expected: Vec<String> = docs
                .iter()
                .map(|doc| doc.declaration_number.to_string())
                .filter(|number| number.starts_with(query))
                .collect();
            assert_eq!(suggest(&docs, query), expected, "query {}", query);
        }
    }
}
