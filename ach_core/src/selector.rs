/*!
 * Reads the user's numbered selection off one line of input.
 */
use std::collections::HashSet;

use crate::index::PkgRecord;
use crate::query::Query;
use crate::read_input;

/* STRUCTS */
#[derive(Debug, Default)]
pub struct Selection {
    /// 1-based selection numbers, deduplicated, first-seen order.
    pub numbers: Vec<usize>,
    pub invalid: Vec<String>,
}

/**
 * Parses one line of whitespace-separated selection numbers against a
 * result list of {max} entries. Bad tokens are collected instead of
 * aborting the line, so "1 x 3" still selects 1 and 3.
 */
pub fn parse_selection(input: &str, max: usize) -> Selection {
    let mut selection = Selection::default();
    let mut seen: HashSet<usize> = HashSet::new();

    for token in input.split_whitespace() {
        match token.parse::<usize>() {
            Ok(number) if number >= 1 && number <= max => {
                if seen.insert(number) {
                    selection.numbers.push(number);
                }
            }
            _ => selection.invalid.push(token.to_string()),
        }
    }
    return selection;
}

/// Prompts for a selection and resolves it against {query}.
/// Invalid tokens are reported one by one; EOF reads as an empty
/// selection.
pub fn prompt_selection(query: &Query) -> Vec<PkgRecord> {
    let input = match read_input("Packages to install (e.g. 1 2 3): ") {
        Some(input) => input,
        None => {
            println!();
            return Vec::new();
        }
    };

    let selection = parse_selection(&input, query.len());
    for token in &selection.invalid {
        eprintln!("Invalid selection: {token}");
    }

    return selection.numbers.iter()
        .filter_map(|&number| query.get(number - 1))
        .map(|ranked| ranked.pkg.clone())
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_valid_tokens() {
        let selection = parse_selection("1 2 3", 3);
        assert_eq!(selection.numbers, vec![1, 2, 3]);
        assert!(selection.invalid.is_empty());
    }

    #[test]
    fn test_bad_tokens_are_collected_not_fatal() {
        let selection = parse_selection("0 4 x", 3);
        assert!(selection.numbers.is_empty());
        assert_eq!(selection.invalid, vec!["0", "4", "x"]);

        // A bad token does not poison its neighbors.
        let selection = parse_selection("1 x 3", 3);
        assert_eq!(selection.numbers, vec![1, 3]);
        assert_eq!(selection.invalid, vec!["x"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let selection = parse_selection("2 2", 3);
        assert_eq!(selection.numbers, vec![2]);
        assert!(selection.invalid.is_empty());
    }

    #[test]
    fn test_order_and_whitespace() {
        let selection = parse_selection("  3\t1 ", 3);
        assert_eq!(selection.numbers, vec![3, 1]);
    }

    #[test]
    fn test_empty_line_selects_nothing() {
        let selection = parse_selection("", 3);
        assert!(selection.numbers.is_empty());
        assert!(selection.invalid.is_empty());
    }
}
