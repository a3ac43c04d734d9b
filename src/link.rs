//! Parser for `Link` response headers
//!
//! Handles the `<url>; rel="next"; ...` form used by paginated APIs. Entries
//! that cannot be read are skipped; a header with no readable entry parses to
//! an empty set of relations.

use std::collections::HashMap;

/// One `<url>; key=value` entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub url: String,
    pub params: HashMap<String, String>,
}

/// Relations found in a `Link` header, keyed by `rel` value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRels {
    rels: HashMap<String, LinkEntry>,
}

impl LinkRels {
    pub fn get(&self, rel: &str) -> Option<&LinkEntry> {
        self.rels.get(rel)
    }

    /// URL of the `rel="next"` entry
    pub fn next(&self) -> Option<&str> {
        self.get("next").map(|entry| entry.url.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }
}

/// Parse a `Link` header value
///
/// An entry with several space separated `rel` values is registered under
/// each of them. Entries without a `rel` parameter are ignored.
pub fn parse_link_header(header: &str) -> LinkRels {
    let mut rels = HashMap::new();

    for part in split_entries(header) {
        let Some(entry) = parse_entry(part) else {
            continue;
        };
        let Some(rel) = entry.params.get("rel").cloned() else {
            continue;
        };
        for name in rel.split_whitespace() {
            rels.insert(name.to_string(), entry.clone());
        }
    }

    LinkRels { rels }
}

/// Split on commas that are outside `<...>` and quoted strings
fn split_entries(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_url = false;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '<' if !in_quotes => in_url = true,
            '>' if !in_quotes => in_url = false,
            '"' if !in_url => in_quotes = !in_quotes,
            ',' if !in_url && !in_quotes => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn parse_entry(part: &str) -> Option<LinkEntry> {
    let part = part.trim();
    let rest = part.strip_prefix('<')?;
    let close = rest.find('>')?;
    let url = rest[..close].trim();
    if url.is_empty() {
        return None;
    }

    let mut params = HashMap::new();
    for param in rest[close + 1..].split(';') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (key, value) = param.split_once('=')?;
        let value = value.trim().trim_matches('"');
        params.insert(key.trim().to_ascii_lowercase(), value.to_string());
    }

    Some(LinkEntry {
        url: url.to_string(),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_relation() {
        let rels = parse_link_header(
            r#"<https://api.mapbox.com/datasets/v1/u/d/features?start=abc&limit=100>; rel="next""#,
        );
        assert_eq!(
            rels.next(),
            Some("https://api.mapbox.com/datasets/v1/u/d/features?start=abc&limit=100")
        );
    }

    #[test]
    fn test_multiple_entries() {
        let rels = parse_link_header(
            r#"<https://x.test/?page=1>; rel="prev", <https://x.test/?page=3>; rel="next""#,
        );
        assert_eq!(rels.len(), 2);
        assert_eq!(rels.get("prev").unwrap().url, "https://x.test/?page=1");
        assert_eq!(rels.next(), Some("https://x.test/?page=3"));
    }

    #[test]
    fn test_comma_inside_url() {
        let rels = parse_link_header(r#"<https://x.test/?ids=1,2,3>; rel="next""#);
        assert_eq!(rels.next(), Some("https://x.test/?ids=1,2,3"));
    }

    #[test]
    fn test_space_separated_rels() {
        let rels = parse_link_header(r#"<https://x.test/last>; rel="next last""#);
        assert_eq!(rels.next(), Some("https://x.test/last"));
        assert_eq!(rels.get("last").unwrap().url, "https://x.test/last");
    }

    #[test]
    fn test_unquoted_rel_and_extra_params() {
        let rels = parse_link_header("<https://x.test/2>; rel=next; title=\"Page 2\"");
        let entry = rels.get("next").unwrap();
        assert_eq!(entry.params.get("title").map(String::as_str), Some("Page 2"));
    }

    #[test]
    fn test_missing_rel_is_empty() {
        let rels = parse_link_header("<https://x.test/2>");
        assert!(rels.is_empty());
        assert_eq!(rels.next(), None);
    }

    #[test]
    fn test_garbage_is_empty() {
        assert!(parse_link_header("not a link header").is_empty());
        assert!(parse_link_header("").is_empty());
        assert!(parse_link_header("<>; rel=next").is_empty());
        assert!(parse_link_header("<https://x.test/2>; rel").is_empty());
    }
}
