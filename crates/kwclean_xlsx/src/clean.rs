//! Keyword canonicalization and set aggregation.

use std::collections::BTreeSet;

/// Canonicalize one raw keyword; missing input yields an empty string.
///
/// Trims surrounding whitespace, lower-cases, then replaces `"--"` with `"-"`
/// and `"  "` with `" "`. Each replacement is a single non-overlapping pass,
/// so longer runs only shrink once: `"---"` becomes `"--"`.
pub fn clean_keyword(keyword: Option<&str>) -> String {
    let Some(c_keyword) = keyword else {
        return String::new();
    };

    c_keyword
        .trim()
        .to_lowercase()
        .replace("--", "-")
        .replace("  ", " ")
}

/// Clean, drop empties, deduplicate and sort raw keywords.
///
/// Ordering is ascending by code point and independent of input order.
pub fn aggregate_keywords<'a, I>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let set_keywords: BTreeSet<String> = keywords
        .into_iter()
        .map(clean_keyword)
        .filter(|c_keyword| !c_keyword.is_empty())
        .collect();

    set_keywords.into_iter().collect()
}

/// [`aggregate_keywords`] over owned raw values, as produced by the reader.
pub fn aggregate_raw_keywords(raw_keywords: &[String]) -> Vec<String> {
    aggregate_keywords(raw_keywords.iter().map(|c_raw| Some(c_raw.as_str())))
}
