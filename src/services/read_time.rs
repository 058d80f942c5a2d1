//! Reading-time estimation
//!
//! Pure, deterministic estimate of how long a post takes to read, derived
//! from its raw markdown. Each content element carries a cost in seconds;
//! the sum is converted to minutes, rounded up, with a floor of one
//! minute.
//!
//! Costs:
//! - CJK ideograph: 0.171 s (≈350 chars/min)
//! - Latin word (code stripped first): 0.333 s (≈180 words/min)
//! - code block line: 4x the ideograph rate — code reads slowly
//! - image: 12 s
//! - math expression (block or inline): 15 s
//! - table row: 10 s
//! - list item: 3 s

use once_cell::sync::Lazy;
use regex::Regex;

static CJK_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4e00}-\u{9fff}]").expect("valid regex"));
static LATIN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]+").expect("valid regex"));
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").expect("valid regex"));
static MATH_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$[^$]+\$\$").expect("valid regex"));
static MATH_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[^\n$]+\$").expect("valid regex"));
static TABLE_ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\|.*\|$").expect("valid regex"));
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:[-*+•]|\d+\.)\s+.*$").expect("valid regex"));

const CJK_SECONDS: f64 = 0.171;
const WORD_SECONDS: f64 = 0.333;
const CODE_LINE_SECONDS: f64 = CJK_SECONDS * 4.0;
const IMAGE_SECONDS: f64 = 12.0;
const MATH_SECONDS: f64 = 15.0;
const TABLE_ROW_SECONDS: f64 = 10.0;
const LIST_ITEM_SECONDS: f64 = 3.0;

/// Estimate reading time in minutes for raw markdown content.
///
/// Always returns at least 1; empty or whitespace-only input short-circuits
/// without running any of the patterns.
pub fn estimate_minutes(markdown: &str) -> i64 {
    if markdown.trim().is_empty() {
        return 1;
    }

    let cjk_count = CJK_CHAR.find_iter(markdown).count();

    // Words are counted with code stripped so identifiers in snippets do
    // not inflate the prose estimate; code is charged per line instead.
    let without_blocks = CODE_BLOCK.replace_all(markdown, "");
    let without_code = INLINE_CODE.replace_all(&without_blocks, "");
    let word_count = LATIN_WORD.find_iter(&without_code).count();

    let code_line_count: usize = CODE_BLOCK
        .find_iter(markdown)
        .map(|m| m.as_str().split('\n').count())
        .sum();

    let image_count = IMAGE.find_iter(markdown).count();

    // Strip block math first, then scan for inline math; this keeps an
    // inline `$...$` from matching inside or adjacent to a `$$...$$` pair.
    let math_block_count = MATH_BLOCK.find_iter(markdown).count();
    let without_math_blocks = MATH_BLOCK.replace_all(markdown, "");
    let math_inline_count = MATH_INLINE.find_iter(&without_math_blocks).count();
    let math_count = math_block_count + math_inline_count;

    let table_row_count = TABLE_ROW.find_iter(markdown).count();
    let list_item_count = LIST_ITEM.find_iter(markdown).count();

    let seconds = cjk_count as f64 * CJK_SECONDS
        + word_count as f64 * WORD_SECONDS
        + code_line_count as f64 * CODE_LINE_SECONDS
        + image_count as f64 * IMAGE_SECONDS
        + math_count as f64 * MATH_SECONDS
        + table_row_count as f64 * TABLE_ROW_SECONDS
        + list_item_count as f64 * LIST_ITEM_SECONDS;

    ((seconds / 60.0).ceil() as i64).max(1)
}
