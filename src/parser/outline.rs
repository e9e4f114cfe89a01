//! Indented category outline.
//!
//! ```text
//! Networks
//! 	Wireless
//! 		12
//! 		12_1
//! 	Wired
//! 		3
//! Security
//! 	7
//! ```
//!
//! A line without indentation starts a top-level category. An indented line
//! is a question reference if it looks like `N` or `N_M`, otherwise it opens
//! a subcategory under the closest shallower category.

use crate::decode::normalize_text;
use crate::model::Category;

/// Columns per indentation level when spaces are used instead of tabs.
const SPACES_PER_LEVEL: usize = 4;

/// Parses the outline section into a category tree.
pub fn parse_outline(text: &str, debug: bool) -> Vec<Category> {
    let mut roots = Vec::new();
    let mut open: Vec<Category> = Vec::new();

    for line in text.lines() {
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        let depth = indent_depth(line);

        if depth == 0 {
            close_until(&mut open, &mut roots, 0);
            open.push(Category::new(normalize_text(entry), 0));
            continue;
        }

        if open.is_empty() {
            if debug {
                log::debug!("outline: indented line before any category: {:?}", entry);
            }
            continue;
        }

        if is_question_ref(entry) {
            if let Some(current) = open.last_mut() {
                current.question_ids.push(entry.to_string());
            }
        } else {
            close_until(&mut open, &mut roots, depth);
            open.push(Category::new(normalize_text(entry), depth));
        }
    }

    close_until(&mut open, &mut roots, 0);
    roots
}

/// Closes every open category at `depth` or deeper, attaching each to its
/// parent (or to `roots` when it has none).
fn close_until(open: &mut Vec<Category>, roots: &mut Vec<Category>, depth: usize) {
    while open.last().is_some_and(|top| top.level >= depth) {
        let Some(closed) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.subcategories.push(closed),
            None => roots.push(closed),
        }
    }
}

/// Depth of a line's leading whitespace: one per tab, one per started run
/// of four spaces.
fn indent_depth(line: &str) -> usize {
    let mut tabs: usize = 0;
    let mut spaces: usize = 0;
    for c in line.chars() {
        match c {
            '\t' => tabs += 1,
            ' ' => spaces += 1,
            _ => break,
        }
    }
    tabs + spaces.div_ceil(SPACES_PER_LEVEL)
}

/// Returns true for `N` or `N_M` where both parts are digits.
fn is_question_ref(entry: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match entry.split_once('_') {
        Some((major, minor)) => all_digits(major) && all_digits(minor),
        None => all_digits(entry),
    }
}
