//! Text normalization and similarity heuristics for ad copy.
//!
//! Provides pure functions used throughout validation and generation:
//! - Word-boundary-safe formatting to field character limits
//! - Policy sanitization (caps, punctuation, forbidden characters)
//! - Quote stripping that preserves contractions
//! - DKI token scanning
//! - Headline similarity detection per Google Ads policy heuristics

use adforge_model::PolicyConfig;

/// Quote characters stripped from ad text. Apostrophes inside words
/// (contractions) are not quotes and survive.
const QUOTE_CHARS: [char; 5] = ['"', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Promotional adjectives that make two headlines interchangeable when
/// they are the only difference ("Best Quality Service" vs "Top Quality
/// Service").
const PROMO_ADJECTIVES: [&str; 8] = [
    "best", "top", "#1", "greatest", "finest", "premier", "leading", "ultimate",
];

/// A `{KeyWord:default}` insertion token found in ad text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkiToken {
    /// The full token including braces, as written
    pub raw: String,
    /// The keyword literal between `{` and `:` (casing preserved)
    pub keyword: String,
    /// The default text after `:`
    pub default_text: String,
    /// Byte offset of the opening brace
    pub start: usize,
}

impl DkiToken {
    /// Whether the keyword literal uses Google's canonical mixed casing.
    pub fn has_canonical_casing(&self) -> bool {
        self.keyword == "KeyWord"
    }
}

/// Scan text for DKI insertion tokens, in order of appearance.
///
/// Only brace groups whose head reads "keyword" (any casing) followed
/// by a colon are treated as tokens; other brace groups are plain text.
pub fn find_dki_tokens(text: &str) -> Vec<DkiToken> {
    let mut tokens = Vec::new();
    let mut search_from = 0;

    while let Some(open_rel) = text[search_from..].find('{') {
        let open = search_from + open_rel;
        let Some(close_rel) = text[open..].find('}') else {
            break;
        };
        let close = open + close_rel;
        let inner = &text[open + 1..close];

        if let Some((head, tail)) = inner.split_once(':') {
            if head.eq_ignore_ascii_case("keyword") {
                tokens.push(DkiToken {
                    raw: text[open..=close].to_string(),
                    keyword: head.to_string(),
                    default_text: tail.to_string(),
                    start: open,
                });
            }
        }
        search_from = close + 1;
    }

    tokens
}

/// Character count as Google Ads counts it.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Collapse runs of whitespace and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate at a word boundary so the result never exceeds `max`
/// characters. A single word longer than `max` is hard-cut.
pub fn truncate_to_words(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }

    let mut result = String::new();
    for word in text.split_whitespace() {
        let candidate_len = if result.is_empty() {
            char_len(word)
        } else {
            char_len(&result) + 1 + char_len(word)
        };
        if candidate_len <= max {
            if !result.is_empty() {
                result.push(' ');
            }
            result.push_str(word);
        } else {
            break;
        }
    }

    if result.is_empty() {
        return text.chars().take(max).collect();
    }
    result
}

/// Title-case every word. Used for keyword injection, not for user
/// text (which goes through `sanitize_ad_text` instead).
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first letter of each word that starts lowercase,
/// without ever lowercasing anything (acronyms and contractions keep
/// their shape).
fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if first.is_lowercase() => {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                }
                _ => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a headline: trim, house-style capitalization, word-boundary
/// truncation to the headline limit. The result is guaranteed to fit.
pub fn format_headline(text: &str, policy: &PolicyConfig) -> String {
    let cleaned = capitalize_words(&collapse_whitespace(text));
    truncate_to_words(&cleaned, policy.limits.headline)
}

/// Format a description: same contract as `format_headline` at the
/// description limit, capitalizing only the leading character.
pub fn format_description(text: &str, policy: &PolicyConfig) -> String {
    let cleaned = collapse_whitespace(text);
    let mut chars = cleaned.chars();
    let capitalized = match chars.next() {
        Some(first) if first.is_lowercase() => {
            first.to_uppercase().collect::<String>() + chars.as_str()
        }
        _ => cleaned,
    };
    truncate_to_words(&capitalized, policy.limits.description)
}

/// Remove DKI tokens from plain (non-DKI) text.
pub fn strip_dki_tokens(text: &str) -> String {
    let tokens = find_dki_tokens(text);
    if tokens.is_empty() {
        return text.to_string();
    }
    let mut result = text.to_string();
    for token in tokens.iter().rev() {
        result.replace_range(token.start..token.start + token.raw.len(), "");
    }
    result
}

/// Collapse runs of identical punctuation (`!!!` -> `!`, `???` -> `?`).
fn collapse_repeated_punctuation(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if matches!(c, '!' | '?' | '.' | ',') && prev == Some(c) {
            continue;
        }
        result.push(c);
        prev = Some(c);
    }
    result
}

/// Google allows at most one exclamation mark per text field; keep the
/// first and drop the rest.
fn limit_exclamations(text: &str) -> String {
    let mut seen = false;
    text.chars()
        .filter(|&c| {
            if c == '!' {
                if seen {
                    return false;
                }
                seen = true;
            }
            true
        })
        .collect()
}

/// Collapse runs of 2+ identical consecutive words, case-insensitively.
fn collapse_repeated_words(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if let Some(last) = kept.last() {
            if last.eq_ignore_ascii_case(word) {
                continue;
            }
        }
        kept.push(word);
    }
    kept.join(" ")
}

/// Convert ALL-CAPS words to title case, leaving allowlisted acronyms
/// unchanged.
fn fix_all_caps(text: &str, policy: &PolicyConfig) -> String {
    text.split_whitespace()
        .map(|word| {
            let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
            let is_caps_run = letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase());
            let core: String = letters.iter().collect();

            if is_caps_run && !policy.is_acronym(&core) {
                // Title-case the word in place, preserving punctuation
                let mut seen_letter = false;
                word.chars()
                    .map(|c| {
                        if c.is_alphabetic() {
                            if seen_letter {
                                c.to_lowercase().next().unwrap_or(c)
                            } else {
                                seen_letter = true;
                                c
                            }
                        } else {
                            c
                        }
                    })
                    .collect()
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove quote characters. Straight single quotes survive only as
/// apostrophes, i.e. flanked by alphanumerics on both sides.
fn strip_quote_chars(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if QUOTE_CHARS.contains(&c) {
            continue;
        }
        if c == '\'' {
            let before = i.checked_sub(1).map(|j| chars[j]);
            let after = chars.get(i + 1).copied();
            let is_apostrophe = before.is_some_and(|b| b.is_alphanumeric())
                && after.is_some_and(|a| a.is_alphanumeric());
            if !is_apostrophe {
                continue;
            }
        }
        result.push(c);
    }
    result
}

/// Strip forbidden characters, replace slashes with a policy-safe
/// separator, collapse repeated punctuation and repeated words, and
/// enforce the one-exclamation budget. One stage of `sanitize_ad_text`,
/// exposed so the auto-fixer can log it as an individual step.
pub fn collapse_repetition(text: &str, policy: &PolicyConfig) -> String {
    let mut out = text.to_string();
    out.retain(|c| !policy.forbidden_chars.contains(&c));
    out = out.replace('/', "-");
    out = collapse_repeated_punctuation(&out);
    out = limit_exclamations(&out);
    out = collapse_repeated_words(&out);
    collapse_whitespace(&out)
}

/// Convert ALL-CAPS runs to title case, preserving allowlisted
/// acronyms. One stage of `sanitize_ad_text`, exposed for the
/// auto-fixer.
pub fn normalize_case(text: &str, policy: &PolicyConfig) -> String {
    collapse_whitespace(&fix_all_caps(text, policy))
}

/// Sanitize plain ad text against Google Ads editorial policy.
///
/// Idempotent: sanitizing already-sanitized text returns it unchanged.
pub fn sanitize_ad_text(text: &str, policy: &PolicyConfig) -> String {
    // Quotes go first: stripping them can expose adjacent duplicate
    // words, which the repetition stage must then see.
    let out = strip_dki_tokens(text);
    let out = strip_quote_chars(&out);
    let out = collapse_repetition(&out, policy);
    normalize_case(&out, policy)
}

/// Sanitize a field of a DKI ad: same pipeline as `sanitize_ad_text`
/// but insertion tokens survive verbatim instead of being stripped.
pub fn sanitize_ad_text_preserving_dki(text: &str, policy: &PolicyConfig) -> String {
    let tokens = find_dki_tokens(text);
    if tokens.is_empty() {
        return sanitize_ad_text(text, policy);
    }

    // Swap tokens for sentinels that pass through the pipeline
    // untouched, sanitize, then restore.
    let mut masked = text.to_string();
    for (i, token) in tokens.iter().enumerate().rev() {
        masked.replace_range(
            token.start..token.start + token.raw.len(),
            &format!("zqTok{i}z"),
        );
    }
    let mut sanitized = sanitize_ad_text(&masked, policy);
    for (i, token) in tokens.iter().enumerate() {
        sanitized = sanitized.replace(&format!("zqTok{i}z"), &token.raw);
    }
    sanitized
}

/// Remove wrapping and internal quote characters without altering
/// interior apostrophes. Unlike `sanitize_ad_text` this leaves DKI
/// tokens and everything else alone.
pub fn strip_quotes_from_ad_text(text: &str) -> String {
    collapse_whitespace(&strip_quote_chars(text))
}

fn tokens_lower(text: &str) -> Vec<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Trailing-plural normalization: "plumbers" and "plumber" compare
/// equal, as do "services" and "service".
fn strip_plural(word: &str) -> &str {
    if word.len() > 4 && word.ends_with("es") {
        &word[..word.len() - 2]
    } else if word.len() > 3 && word.ends_with('s') {
        &word[..word.len() - 1]
    } else {
        word
    }
}

/// Decide whether two headlines are "substantially similar" under
/// Google Ads policy heuristics.
///
/// This is deliberately lexical, not semantic: false negatives are
/// preferred over false positives that would block valid diverse
/// headlines sharing a keyword. Two headlines are similar when any of
/// the following holds:
/// - normalized strings are identical
/// - both have 3+ words and share their leading 2-word prefix
/// - they differ only in a promotional adjective
/// - one is a simple pluralization of the other
pub fn are_headlines_similar(a: &str, b: &str) -> bool {
    let a_norm = a.trim().to_lowercase();
    let b_norm = b.trim().to_lowercase();
    if a_norm == b_norm {
        return true;
    }

    let a_tokens = tokens_lower(&a_norm);
    let b_tokens = tokens_lower(&b_norm);
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return false;
    }

    // Shared opening prefix on longer headlines
    if a_tokens.len() >= 3 && b_tokens.len() >= 3 && a_tokens[..2] == b_tokens[..2] {
        return true;
    }

    // Same template, different promotional adjective
    let is_promo = |w: &str| PROMO_ADJECTIVES.contains(&w);
    if a_tokens.iter().any(|w| is_promo(w)) && b_tokens.iter().any(|w| is_promo(w)) {
        let a_rest: Vec<&String> = a_tokens.iter().filter(|w| !is_promo(w)).collect();
        let b_rest: Vec<&String> = b_tokens.iter().filter(|w| !is_promo(w)).collect();
        if !a_rest.is_empty() && a_rest == b_rest {
            return true;
        }
    }

    // Pluralization-only difference
    if a_tokens.len() == b_tokens.len() {
        let plural_equal = a_tokens
            .iter()
            .zip(b_tokens.iter())
            .all(|(x, y)| x == y || strip_plural(x) == strip_plural(y));
        if plural_equal {
            return true;
        }
    }

    false
}
