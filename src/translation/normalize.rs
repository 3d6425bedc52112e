/*!
 * Accent removal for user questions.
 *
 * Schema identifiers are stored without diacritics (`usuario`, `codigo`),
 * while questions are typed naturally (`usuário`, `código`).
 */

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Replace every accented character with its base character.
///
/// Applies canonical decomposition and drops the combining marks.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}
