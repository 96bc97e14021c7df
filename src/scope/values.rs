//! Parsing of sort-order and target-type lists.

use crate::domain::{SortOrder, TargetType};
use crate::error::ExportError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Inclusive ranges written as `a..b` or `a-b`.
static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*(?:\.\.|-)\s*(\d+)$").expect("valid range regex"));

/// Upper bound on how many values one range may expand to.
const MAX_RANGE_LEN: i64 = 10_000;

/// Parse `"0,1,5..8"` into sort orders, keeping first-seen order and dropping repeats.
pub fn parse_sort_orders(input: &str) -> Result<Vec<SortOrder>, ExportError> {
    let mut values = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(caps) = RANGE_RE.captures(part) {
            let start = parse_bound(&caps[1], part)?;
            let end = parse_bound(&caps[2], part)?;
            if start > end {
                return Err(ExportError::config(format!(
                    "Invalid sort type range '{part}': start {start} is greater than end {end}"
                )));
            }
            if end - start >= MAX_RANGE_LEN {
                return Err(ExportError::config(format!(
                    "Sort type range '{part}' expands to more than {MAX_RANGE_LEN} values"
                )));
            }
            values.extend((start..=end).map(SortOrder));
            continue;
        }
        let value = part.parse::<i64>().map_err(|_| {
            ExportError::config(format!("Invalid sort type entry '{part}'. Use numbers or ranges like 0..20"))
        })?;
        values.push(SortOrder(value));
    }

    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(*v));
    if values.is_empty() {
        return Err(ExportError::config("No sort types given"));
    }
    Ok(values)
}

/// Parse a comma-separated `targetType` allowlist such as `"102,103,120"`.
pub fn parse_target_types(input: &str) -> Result<BTreeSet<TargetType>, ExportError> {
    input.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map(TargetType)
                .map_err(|_| ExportError::config(format!("Invalid target type entry '{part}'")))
        })
        .collect()
}

fn parse_bound(raw: &str, part: &str) -> Result<i64, ExportError> {
    raw.parse::<i64>()
        .map_err(|_| ExportError::config(format!("Invalid sort type range '{part}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(values: &[i64]) -> Vec<SortOrder> {
        values.iter().copied().map(SortOrder).collect()
    }

    #[test]
    fn expands_inclusive_ranges_in_both_spellings() {
        assert_eq!(parse_sort_orders("0..2").unwrap(), orders(&[0, 1, 2]));
        assert_eq!(parse_sort_orders("3-5").unwrap(), orders(&[3, 4, 5]));
        assert_eq!(parse_sort_orders("7..7").unwrap(), orders(&[7]));
    }

    #[test]
    fn keeps_first_seen_order_and_drops_repeats() {
        assert_eq!(parse_sort_orders("10, 0..2, 1, 100").unwrap(), orders(&[10, 0, 1, 2, 100]));
    }

    #[test]
    fn rejects_reversed_and_non_numeric_ranges() {
        let reversed = parse_sort_orders("5..1").unwrap_err();
        assert!(matches!(reversed, ExportError::Configuration(_)));
        assert!(reversed.to_string().contains("greater than"));

        assert!(matches!(parse_sort_orders("a..3"), Err(ExportError::Configuration(_))));
        assert!(matches!(parse_sort_orders("1..x"), Err(ExportError::Configuration(_))));
        assert!(matches!(parse_sort_orders("fast"), Err(ExportError::Configuration(_))));
    }

    #[test]
    fn rejects_empty_sort_list() {
        assert!(matches!(parse_sort_orders(" , "), Err(ExportError::Configuration(_))));
    }

    #[test]
    fn rejects_oversized_range() {
        assert!(parse_sort_orders("0..100000").is_err());
    }

    #[test]
    fn parses_target_type_allowlist() {
        let types = parse_target_types("120, 102,103,").unwrap();
        assert_eq!(types, BTreeSet::from([TargetType(102), TargetType(103), TargetType(120)]));
        assert!(parse_target_types("102,word").is_err());
    }
}
