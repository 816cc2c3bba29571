// src/core/link_spec.rs

use crate::models::LinkSpec;
use std::convert::Infallible;
use std::str::FromStr;

/// Removes exactly one layer of surrounding double quotes.
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

impl LinkSpec {
    /// Parses a link selector such as `auth`, `auth.Login` or `"api tests"."Create User,Delete User"`.
    ///
    /// # Grammar
    /// - The string is split on the first `.` into collection and item list.
    /// - Each side loses one layer of surrounding double quotes.
    /// - The item list is split on `,`; items are trimmed and empty items dropped.
    ///
    /// This is a total function: degenerate input such as `.` yields an empty
    /// collection with no items instead of an error.
    pub fn parse(raw: &str) -> Self {
        let Some((collection, rest)) = raw.split_once('.') else {
            return Self {
                collection: strip_quotes(raw).to_string(),
                items: Vec::new(),
            };
        };

        let items = strip_quotes(rest)
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            collection: strip_quotes(collection).to_string(),
            items,
        }
    }
}

impl FromStr for LinkSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection_only() {
        let spec = LinkSpec::parse("smoke");
        assert_eq!(spec.collection, "smoke");
        assert!(spec.items.is_empty());
    }

    #[test]
    fn test_parse_items_preserve_order_and_drop_empties() {
        let spec = LinkSpec::parse("c.i1, ,i2,");
        assert_eq!(spec.collection, "c");
        assert_eq!(spec.items, vec!["i1", "i2"]);
    }

    #[test]
    fn test_parse_trailing_dot_gives_empty_items() {
        let spec = LinkSpec::parse("auth.");
        assert_eq!(spec, LinkSpec::parse("auth"));
        assert_eq!(spec.items, Vec::<String>::new());
    }

    #[test]
    fn test_parse_strips_exactly_one_quote_layer() {
        let spec = LinkSpec::parse("\"a b\".\"c,d\"");
        assert_eq!(spec.collection, "a b");
        assert_eq!(spec.items, vec!["c", "d"]);

        let nested = LinkSpec::parse("\"\"x\"\"");
        assert_eq!(nested.collection, "\"x\"");
    }

    #[test]
    fn test_parse_splits_on_first_dot_only() {
        let spec = LinkSpec::parse("api.v1.Users");
        assert_eq!(spec.collection, "api");
        assert_eq!(spec.items, vec!["v1.Users"]);
    }

    #[test]
    fn test_parse_bare_dot_is_degenerate_not_error() {
        let spec: LinkSpec = ".".parse().unwrap();
        assert_eq!(spec.collection, "");
        assert!(spec.items.is_empty());
    }

    #[test]
    fn test_display_matches_selector_grammar() {
        assert_eq!(LinkSpec::parse("auth. Login ,Refresh").to_string(), "auth.Login,Refresh");
        assert_eq!(LinkSpec::parse("smoke").to_string(), "smoke");
    }
}
