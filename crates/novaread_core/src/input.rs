//! crates/novaread_core/src/input.rs
//!
//! Free-text list input (genres, tags) as it arrives from forms, and the one
//! function that turns it into the canonical stored list.

use serde::{Deserialize, Serialize};

/// A list field as submitted: either a comma-delimited string typed into a form,
/// or an already-split list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Delimited(String),
}

impl ListInput {
    /// Resolves the input to a trimmed, order-preserving list without empty items.
    pub fn normalize(self) -> Vec<String> {
        match self {
            ListInput::Items(items) => normalize_items(items),
            ListInput::Delimited(raw) => normalize_items(raw.split(',')),
        }
    }
}

impl Default for ListInput {
    fn default() -> Self {
        ListInput::Items(Vec::new())
    }
}

impl From<&str> for ListInput {
    fn from(raw: &str) -> Self {
        ListInput::Delimited(raw.to_string())
    }
}

impl From<String> for ListInput {
    fn from(raw: String) -> Self {
        ListInput::Delimited(raw)
    }
}

impl From<Vec<String>> for ListInput {
    fn from(items: Vec<String>) -> Self {
        ListInput::Items(items)
    }
}

impl From<Vec<&str>> for ListInput {
    fn from(items: Vec<&str>) -> Self {
        ListInput::Items(items.into_iter().map(str::to_string).collect())
    }
}

fn normalize_items<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_genres_are_trimmed_in_order() {
        let genres = ListInput::from("Action, Fantasy, Sci-Fi").normalize();
        assert_eq!(genres, vec!["Action", "Fantasy", "Sci-Fi"]);
    }

    #[test]
    fn list_items_go_through_the_same_rules() {
        let tags = ListInput::from(vec!["  Magic ", "", "Cultivation"]).normalize();
        assert_eq!(tags, vec!["Magic", "Cultivation"]);
    }

    #[test]
    fn blank_input_yields_empty_list() {
        assert!(ListInput::from(" , ,").normalize().is_empty());
        assert!(ListInput::default().normalize().is_empty());
    }

    #[test]
    fn deserializes_either_shape() {
        let raw: ListInput = serde_json::from_str("\"a, b\"").unwrap();
        let list: ListInput = serde_json::from_str("[\"a\", \" b\"]").unwrap();
        assert_eq!(raw.normalize(), list.normalize());
    }
}
