//! # Response Interpreter
//!
//! Turns the free-form text a language model returns for a company prompt into
//! a cleaned summary and an ordered list of product names.
//!
//! ## Strategies
//!
//! Three strategies are tried in order and the first one that recognizes the
//! text wins:
//!
//! 1. `InlineEnumeration` - "... The product names include X, Y and Z."
//! 2. `LabeledList` - "Products: X, Y"
//! 3. `Lines` - first non-empty line is the summary, the second one the list
//!
//! Interpretation is a pure function of its input and never fails. Text with
//! no recognizable structure still yields a summary (the first line, or the
//! trimmed input) and an empty product list.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// "product name(s) include|are <list>", optionally preceded by a determiner
static INLINE_ENUMERATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\b(?:the|its|their|our)\s+)?product names? (?:include|are)\s*([^.\n]+)")
        .unwrap()
});

/// "Product(s): <list>" anywhere in the text
static LABELED_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Products?:\s*([^.\n]+)").unwrap());

/// Label at the start of a fallback product line
static LABEL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Products?:\s*").unwrap());

static LIST_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*").unwrap());

/// Whole-word "and" between or in front of list items
static CONJUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s+)and(?:\s+|$)").unwrap());

/// Summary and products extracted from one model response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Company summary, trimmed
    pub summary: String,

    /// Product names in order of appearance, never empty strings
    pub products: Vec<String>,
}

/// The strategy that produced a [`ParseResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// "product names include|are X, Y and Z"
    InlineEnumeration,
    /// "Products: X, Y"
    LabeledList,
    /// Line-based fallback
    Lines,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::InlineEnumeration => "inline enumeration",
            Strategy::LabeledList => "labeled list",
            Strategy::Lines => "line fallback",
        };
        f.write_str(name)
    }
}

/// Interpret a model response
pub fn interpret(text: &str) -> ParseResult {
    interpret_with_strategy(text).1
}

/// Interpret a model response and report which strategy matched
pub fn interpret_with_strategy(text: &str) -> (Strategy, ParseResult) {
    if let Some(result) = match_inline_enumeration(text) {
        (Strategy::InlineEnumeration, result)
    } else if let Some(result) = match_labeled_list(text) {
        (Strategy::LabeledList, result)
    } else {
        (Strategy::Lines, split_lines(text))
    }
}

fn match_inline_enumeration(text: &str) -> Option<ParseResult> {
    let captures = INLINE_ENUMERATION_RE.captures(text)?;
    let start = captures.get(0)?.start();
    let list = captures.get(1)?.as_str();

    let products = LIST_SEPARATOR_RE
        .split(list)
        .flat_map(|item| CONJUNCTION_RE.split(item))
        .filter_map(non_empty_item)
        .collect();

    Some(ParseResult {
        summary: summary_before(text, start),
        products,
    })
}

fn match_labeled_list(text: &str) -> Option<ParseResult> {
    let captures = LABELED_LIST_RE.captures(text)?;
    let start = captures.get(0)?.start();
    let list = captures.get(1)?.as_str();

    Some(ParseResult {
        summary: summary_before(text, start),
        products: split_list(list),
    })
}

fn split_lines(text: &str) -> ParseResult {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let summary = lines.next().unwrap_or_else(|| text.trim()).to_string();
    let products = lines
        .next()
        .map(|line| split_list(&LABEL_PREFIX_RE.replace(line, "")))
        .unwrap_or_default();

    ParseResult { summary, products }
}

/// Text before `end`, trimmed, with one trailing period removed
fn summary_before(text: &str, end: usize) -> String {
    let head = text[..end].trim();
    head.strip_suffix('.').unwrap_or(head).trim_end().to_string()
}

fn split_list(list: &str) -> Vec<String> {
    LIST_SEPARATOR_RE
        .split(list)
        .filter_map(non_empty_item)
        .collect()
}

fn non_empty_item(item: &str) -> Option<String> {
    let item = item.trim();
    (!item.is_empty()).then(|| item.to_string())
}
