/*!
 * Extraction and validation of generated SQL.
 *
 * The model is asked for exactly one fenced code block holding a SELECT
 * statement. Only the first fenced block of the output is considered; the
 * query it holds must be a SELECT and is returned without its trailing `;`.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{NoQueryReason, TranslationError};
use crate::translation::prompts::REFUSAL_SENTINEL;

/// First triple-backtick delimited region, non-greedy
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)```").expect("valid fence regex"));

/// Language labels that may follow the opening fence on their own line
static LANGUAGE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:[a-z]*sql|postgres|sqlite|text)$").expect("valid label regex"));

/// Stray `SQL` token left at the start of the block body
static LEADING_SQL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^sql(?:\s+|$)").expect("valid token regex"));

static SELECT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^select\b").expect("valid select regex"));

/// Extract the validated SELECT statement from generated text.
///
/// # Errors
/// * `NoQueryFound` when there is no fenced block, the block is empty, or the
///   model answered with the refusal sentinel
/// * `NotASelectStatement` when the block holds anything but a SELECT
pub fn extract_sql(generated: &str) -> Result<String, TranslationError> {
    let Some(captures) = FENCED_BLOCK.captures(generated) else {
        let reason = if is_refusal(generated) {
            NoQueryReason::Refused
        } else {
            NoQueryReason::MissingFence
        };
        return Err(TranslationError::NoQueryFound(reason));
    };

    let body = strip_language_label(&captures[1]).trim();

    // Some models repeat the language tag inside the block ("```\nSQL SELECT ...")
    let body = match LEADING_SQL_TOKEN.find(body) {
        Some(token) => body[token.end()..].trim_start(),
        None => body,
    };

    if body.is_empty() {
        return Err(TranslationError::NoQueryFound(NoQueryReason::EmptyFence));
    }

    if is_refusal(body) {
        return Err(TranslationError::NoQueryFound(NoQueryReason::Refused));
    }

    if !SELECT_PREFIX.is_match(body) {
        return Err(TranslationError::NotASelectStatement);
    }

    let query = body.strip_suffix(';').unwrap_or(body).trim_end();

    // A second statement after the SELECT would otherwise be returned intact
    if has_statement_separator(query) {
        return Err(TranslationError::NotASelectStatement);
    }

    Ok(query.to_string())
}

/// Whether `query` holds a `;` outside single- or double-quoted literals.
///
/// Doubled quotes (`'it''s'`) close and reopen the literal, which leaves the
/// scan in the right state.
fn has_statement_separator(query: &str) -> bool {
    let mut quote: Option<char> = None;
    for c in query.chars() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, ';') => return true,
            _ => {}
        }
    }
    false
}

/// Drop a language label written on the opening fence line (```` ```sql ````)
fn strip_language_label(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first_line, rest)) if LANGUAGE_LABEL.is_match(first_line.trim()) => rest,
        _ => body,
    }
}

/// Whether `text` is the model's refusal, optionally quoted or fenced
pub fn is_refusal(text: &str) -> bool {
    let cleaned = text
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c.is_whitespace())
        .replace('\u{2019}', "'")
        .to_lowercase();
    let sentinel = REFUSAL_SENTINEL.trim_end_matches('.').to_lowercase();

    cleaned.starts_with(&sentinel)
}
