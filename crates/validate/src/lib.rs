//! Policy validation for Google Ads text ads.
//!
//! Validates headlines, descriptions, DKI syntax, phone numbers, and
//! business names against hard limits and policy patterns, aggregating
//! blocking errors and non-blocking warnings into report objects.
//!
//! Validators never fail for malformed-but-well-typed input; they
//! always return a report with an explicit valid flag and itemized
//! reasons, so the surrounding layer can surface them verbatim.

use adforge_model::{
    AdStrength, CallOnlyAd, CallOnlyReport, DkiAd, DkiSyntaxReport, PhoneValidation, PolicyConfig,
    ValidationReport, Violation,
};
use adforge_text::{are_headlines_similar, find_dki_tokens};

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Map headline/description utilization to an ad strength rating.
///
/// Thresholds come from the policy table, not hardcoded here; see
/// `StrengthThresholds`.
fn score_strength(
    valid: bool,
    headline_count: usize,
    description_count: usize,
    policy: &PolicyConfig,
) -> AdStrength {
    let t = &policy.strength;
    if !valid {
        AdStrength::Poor
    } else if headline_count >= t.excellent_min_headlines
        && description_count >= t.excellent_min_descriptions
    {
        AdStrength::Excellent
    } else if headline_count >= t.good_min_headlines {
        AdStrength::Good
    } else {
        AdStrength::Average
    }
}

/// Validate a Responsive Search Ad's headlines, descriptions, and
/// optional display path against counts, lengths, and the pairwise
/// similarity rule.
pub fn validate_rsa(
    headlines: &[String],
    descriptions: &[String],
    display_path: &[String],
    policy: &PolicyConfig,
) -> ValidationReport {
    let limits = &policy.limits;
    let mut report = ValidationReport::default();

    if headlines.len() < limits.headline_min_count {
        report.headline_errors.push(Violation::structural(format!(
            "RSA requires minimum {} headlines (found {})",
            limits.headline_min_count,
            headlines.len()
        )));
    }
    if headlines.len() > limits.headline_max_count {
        report.headline_errors.push(Violation::structural(format!(
            "RSA allows maximum {} headlines (found {})",
            limits.headline_max_count,
            headlines.len()
        )));
    }
    if descriptions.len() < limits.description_min_count {
        report.description_errors.push(Violation::structural(format!(
            "RSA requires minimum {} descriptions (found {})",
            limits.description_min_count,
            descriptions.len()
        )));
    }
    if descriptions.len() > limits.description_max_count {
        report.description_errors.push(Violation::structural(format!(
            "RSA allows maximum {} descriptions (found {})",
            limits.description_max_count,
            descriptions.len()
        )));
    }

    for (i, headline) in headlines.iter().enumerate() {
        let len = char_len(headline);
        if len > limits.headline {
            report.headline_errors.push(Violation::length(format!(
                "Headline {} exceeds {} characters ({}): \"{}\"",
                i + 1,
                limits.headline,
                len,
                headline
            )));
        }
    }
    for (i, description) in descriptions.iter().enumerate() {
        let len = char_len(description);
        if len > limits.description {
            report.description_errors.push(Violation::length(format!(
                "Description {} exceeds {} characters ({})",
                i + 1,
                limits.description,
                len
            )));
        }
    }

    // Pairwise similarity across all headlines
    for i in 0..headlines.len() {
        for j in (i + 1)..headlines.len() {
            if are_headlines_similar(&headlines[i], &headlines[j]) {
                report.headline_errors.push(Violation::similarity(format!(
                    "Headlines \"{}\" and \"{}\" are too similar",
                    headlines[i], headlines[j]
                )));
            }
        }
    }

    if display_path.len() > limits.display_path_segments {
        report.headline_errors.push(Violation::structural(format!(
            "Display path allows maximum {} segments (found {})",
            limits.display_path_segments,
            display_path.len()
        )));
    }
    for (i, segment) in display_path.iter().enumerate() {
        let len = char_len(segment);
        if len > limits.display_path {
            report.headline_errors.push(Violation::length(format!(
                "Display path segment {} exceeds {} characters ({})",
                i + 1,
                limits.display_path,
                len
            )));
        }
    }

    if headlines.len() < policy.strength.excellent_min_headlines {
        report.warnings.push(format!(
            "Add more headlines for better ad strength ({} of {} used)",
            headlines.len(),
            limits.headline_max_count
        ));
    }
    if descriptions.len() < policy.strength.excellent_min_descriptions {
        report.warnings.push(format!(
            "Add more descriptions for better ad strength ({} of {} used)",
            descriptions.len(),
            limits.description_max_count
        ));
    }
    if display_path.is_empty() {
        report
            .warnings
            .push("Display path unused; add up to 2 path segments".to_string());
    }

    report.valid =
        report.headline_errors.is_empty() && report.description_errors.is_empty();
    report.ad_strength = score_strength(report.valid, headlines.len(), descriptions.len(), policy);
    report
}

/// Validate DKI token syntax in one text field against `field_limit`
/// (the fully-expanded worst case must fit the field).
pub fn validate_dki_field(text: &str, field_limit: usize) -> DkiSyntaxReport {
    let mut report = DkiSyntaxReport {
        valid: true,
        syntax_valid: true,
        default_text_valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let tokens = find_dki_tokens(text);
    if tokens.is_empty() {
        return report;
    }

    if tokens.len() > 1 {
        report.syntax_valid = false;
        report.errors.push(Violation::syntax(
            "Only one DKI insertion allowed per text field",
        ));
    }

    for token in &tokens {
        if !token.has_canonical_casing() {
            report.syntax_valid = false;
            report.errors.push(Violation::syntax(format!(
                "DKI keyword must use canonical casing {{KeyWord:...}} (found \"{{{}:...}}\")",
                token.keyword
            )));
        }

        if token.default_text.trim().is_empty() {
            report.default_text_valid = false;
            report
                .errors
                .push(Violation::syntax("DKI default text cannot be empty"));
        } else {
            // Worst case: the keyword falls back to its own default
            let expanded = text.replacen(&token.raw, &token.default_text, 1);
            if char_len(&expanded) > field_limit {
                report.default_text_valid = false;
                report.errors.push(Violation::length(format!(
                    "Expanded text exceeds {} character limit ({} with default text inserted)",
                    field_limit,
                    char_len(&expanded)
                )));
            }
        }

        // Wrapping quotes around the token
        let before = text[..token.start].chars().next_back();
        let after = text[token.start + token.raw.len()..].chars().next();
        let is_quote = |c: char| matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}');
        if before.is_some_and(is_quote) && after.is_some_and(is_quote) {
            report.syntax_valid = false;
            report.errors.push(Violation::syntax(
                "DKI insertion must not be enclosed in quotes",
            ));
        }

        // Article/vowel mismatch reads badly when the default is used
        let preceding_word = text[..token.start]
            .split_whitespace()
            .next_back()
            .map(str::to_lowercase);
        let starts_with_vowel = token
            .default_text
            .chars()
            .next()
            .is_some_and(|c| "aeiouAEIOU".contains(c));
        if preceding_word.as_deref() == Some("a") && starts_with_vowel {
            report.warnings.push(format!(
                "Grammar issue: article \"a\" before default text \"{}\"",
                token.default_text
            ));
        }
    }

    report.valid = report.errors.is_empty();
    report
}

/// Validate DKI syntax in a headline field (the common case; spec
/// limits DKI headlines to the standard headline budget).
pub fn validate_dki_syntax(text: &str, policy: &PolicyConfig) -> DkiSyntaxReport {
    validate_dki_field(text, policy.limits.headline)
}

/// Validate a whole DKI ad: per-field syntax plus the ad-wide rule
/// that at most one insertion token exists across all fields.
pub fn validate_dki_ad(ad: &DkiAd, policy: &PolicyConfig) -> ValidationReport {
    let limits = &policy.limits;
    let mut report = ValidationReport::default();

    for (i, headline) in ad.headlines.iter().enumerate() {
        let len = char_len(headline);
        if len > limits.headline && find_dki_tokens(headline).is_empty() {
            report.headline_errors.push(Violation::length(format!(
                "Headline {} exceeds {} characters ({})",
                i + 1,
                limits.headline,
                len
            )));
        }
        let field = validate_dki_field(headline, limits.headline);
        report.headline_errors.extend(field.errors);
        report.warnings.extend(field.warnings);
    }
    for (i, description) in ad.descriptions.iter().enumerate() {
        let len = char_len(description);
        if len > limits.description && find_dki_tokens(description).is_empty() {
            report.description_errors.push(Violation::length(format!(
                "Description {} exceeds {} characters ({})",
                i + 1,
                limits.description,
                len
            )));
        }
        let field = validate_dki_field(description, limits.description);
        report.description_errors.extend(field.errors);
        report.warnings.extend(field.warnings);
    }

    let total_tokens: usize = ad
        .headlines
        .iter()
        .chain(ad.descriptions.iter())
        .map(|field| find_dki_tokens(field).len())
        .sum();
    if total_tokens > 1 {
        report.headline_errors.push(Violation::syntax(format!(
            "Only one DKI insertion allowed per ad (found {})",
            total_tokens
        )));
    }

    report.valid =
        report.headline_errors.is_empty() && report.description_errors.is_empty();
    report.ad_strength =
        score_strength(report.valid, ad.headlines.len(), ad.descriptions.len(), policy);
    report
}

/// Validate a phone number for Call-Only use: US 10-digit (optionally
/// with country code 1), not premium-rate, not an obvious fake.
pub fn validate_phone_number(phone: &str, policy: &PolicyConfig) -> PhoneValidation {
    let digits: Vec<u8> = phone
        .chars()
        .filter(|c| c.is_ascii_digit())
        .map(|c| c as u8 - b'0')
        .collect();

    let national: &[u8] = match digits.len() {
        0..=9 => return PhoneValidation::rejected("Phone number is too short"),
        10 => &digits,
        11 if digits[0] == 1 => &digits[1..],
        11 => {
            return PhoneValidation::rejected("11-digit numbers must start with country code 1")
        }
        _ => return PhoneValidation::rejected("Phone number is too long"),
    };

    let to_str = |slice: &[u8]| -> String { slice.iter().map(|d| (d + b'0') as char).collect() };
    let area = to_str(&national[..3]);
    let exchange = to_str(&national[3..6]);

    if policy.premium_prefixes.contains(&area) || policy.premium_prefixes.contains(&exchange) {
        return PhoneValidation::rejected("Premium-rate phone numbers are not allowed");
    }

    if national.iter().all(|&d| d == national[0]) {
        return PhoneValidation::rejected("Phone number appears to be fake");
    }

    let ascending = national
        .windows(2)
        .all(|w| (w[0] + 1) % 10 == w[1]);
    let descending = national
        .windows(2)
        .all(|w| (w[1] + 1) % 10 == w[0]);
    if ascending || descending {
        return PhoneValidation::rejected("Phone number appears to be fake");
    }

    // 555 area code is reserved for fictional use
    if area == "555" {
        return PhoneValidation::rejected("Phone number appears to be fake");
    }

    PhoneValidation::ok()
}

fn contains_cta_word(headlines: &[String], policy: &PolicyConfig) -> bool {
    headlines.iter().any(|h| {
        let lower = h.to_lowercase();
        policy
            .cta_words
            .iter()
            .any(|cta| lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == cta))
    })
}

fn business_name_violation(name: &str, policy: &PolicyConfig) -> Option<Violation> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some(Violation::structural("Business name is required"));
    }
    if char_len(trimmed) > policy.limits.business_name {
        return Some(Violation::length(format!(
            "Business name exceeds {} characters ({})",
            policy.limits.business_name,
            char_len(trimmed)
        )));
    }

    let lower = trimmed.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    for promo in &policy.promotional_words {
        let hit = if promo.chars().all(|c| c.is_alphanumeric()) {
            words.contains(&promo.as_str())
        } else {
            // "#1", "24/7" and friends can attach to other characters
            lower.contains(promo.as_str())
        };
        if hit {
            return Some(Violation::policy(format!(
                "Business name contains promotional text (\"{}\")",
                promo
            )));
        }
    }

    if words.len() == 1 && policy.generic_service_terms.contains(&words[0].to_string()) {
        return Some(Violation::policy(
            "Business name uses generic service terms instead of a brand name",
        ));
    }

    None
}

/// Validate a Call-Only ad. `business_name_valid` and `phone_valid`
/// are reported separately from `valid` so callers can isolate those
/// failure modes.
pub fn validate_call_only_ad(ad: &CallOnlyAd, policy: &PolicyConfig) -> CallOnlyReport {
    let limits = &policy.limits;
    let mut report = CallOnlyReport {
        valid: false,
        business_name_valid: true,
        phone_valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    if ad.headlines.len() != limits.call_headline_count {
        report.errors.push(Violation::structural(format!(
            "Call-Only ads require exactly {} headlines (found {})",
            limits.call_headline_count,
            ad.headlines.len()
        )));
    }
    if ad.descriptions.len() != limits.call_description_count {
        report.errors.push(Violation::structural(format!(
            "Call-Only ads require exactly {} descriptions (found {})",
            limits.call_description_count,
            ad.descriptions.len()
        )));
    }

    for (i, headline) in ad.headlines.iter().enumerate() {
        let len = char_len(headline);
        if len > limits.headline {
            report.errors.push(Violation::length(format!(
                "Headline {} exceeds {} characters ({})",
                i + 1,
                limits.headline,
                len
            )));
        }
    }
    for (i, description) in ad.descriptions.iter().enumerate() {
        let len = char_len(description);
        if len > limits.description {
            report.errors.push(Violation::length(format!(
                "Description {} exceeds {} characters ({})",
                i + 1,
                limits.description,
                len
            )));
        }
    }

    if !contains_cta_word(&ad.headlines, policy) {
        report.errors.push(Violation::policy(
            "Headlines must include a call-to-action word (e.g. \"Call\" or \"Tap\")",
        ));
    }

    if let Some(violation) = business_name_violation(&ad.business_name, policy) {
        report.business_name_valid = false;
        report.errors.push(violation);
    }

    let phone = validate_phone_number(&ad.phone_number, policy);
    if !phone.valid {
        report.phone_valid = false;
        let reason = phone.reason.unwrap_or_else(|| "Invalid phone number".into());
        if reason.contains("Premium-rate") {
            report.errors.push(Violation::policy(
                "Premium-rate phone numbers are not allowed for Call-Only ads",
            ));
        } else {
            report
                .errors
                .push(Violation::policy(format!("Invalid phone number: {}", reason)));
        }
    }

    if ad.verification_url.trim().is_empty() {
        report
            .errors
            .push(Violation::structural("Verification URL is required"));
    } else {
        match url::Url::parse(&ad.verification_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                report.errors.push(Violation::policy(format!(
                    "Verification URL must be a valid absolute URL (found \"{}\")",
                    ad.verification_url
                )));
            }
        }
    }

    report.valid = report.errors.is_empty();
    report
}
