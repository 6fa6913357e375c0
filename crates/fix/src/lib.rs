//! Deterministic auto-repair for non-compliant ads.
//!
//! Takes a raw ad with violations and rewrites it into a best-effort
//! compliant form, logging every transformation into a `FixReport`.
//! The fixer never fabricates new semantic content and never fails for
//! malformed input: anything it cannot normalize is left unchanged and
//! recorded as a warning requiring manual review.

use adforge_model::{AdType, CallOnlyAd, DkiAd, FixReport, PolicyConfig, RawAd};
use adforge_text::{
    collapse_repetition, find_dki_tokens, normalize_case, strip_dki_tokens,
    strip_quotes_from_ad_text, truncate_to_words,
};
use adforge_validate::{validate_call_only_ad, validate_dki_ad, validate_rsa};
use tracing::debug;

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Swap DKI tokens for inert sentinels so a text transform cannot
/// mangle them, apply the transform, then restore the tokens.
fn around_dki_tokens(text: &str, transform: impl Fn(&str) -> String) -> String {
    let tokens = find_dki_tokens(text);
    if tokens.is_empty() {
        return transform(text);
    }
    let mut masked = text.to_string();
    for (i, token) in tokens.iter().enumerate().rev() {
        masked.replace_range(
            token.start..token.start + token.raw.len(),
            &format!("zqTok{i}z"),
        );
    }
    let mut out = transform(&masked);
    for (i, token) in tokens.iter().enumerate() {
        out = out.replace(&format!("zqTok{i}z"), &token.raw);
    }
    out
}

/// Run the ordered fix pipeline over one text field. Each step is
/// idempotent and logged individually when it changes the field.
fn fix_text_field(
    label: &str,
    value: &mut String,
    limit: usize,
    preserve_dki: bool,
    policy: &PolicyConfig,
    report: &mut FixReport,
) {
    // 1. Wrapping/internal quote characters
    let stripped = strip_quotes_from_ad_text(value);
    if stripped != *value {
        report.record(format!("{label}: removed quote characters"));
        *value = stripped;
    }

    // 2. Embedded DKI tokens have no meaning in plain text fields
    if !preserve_dki {
        let without_tokens = strip_dki_tokens(value);
        if without_tokens != *value {
            report.record(format!("{label}: removed embedded DKI token"));
            *value = without_tokens;
        }
    }

    // 2b. Repeated punctuation/words, forbidden characters
    let collapsed = if preserve_dki {
        around_dki_tokens(value, |t| collapse_repetition(t, policy))
    } else {
        collapse_repetition(value, policy)
    };
    if collapsed != *value {
        report.record(format!(
            "{label}: collapsed repeated punctuation/words and stripped forbidden characters"
        ));
        *value = collapsed;
    }

    // 3. ALL-CAPS to title case, acronyms preserved
    let cased = if preserve_dki {
        around_dki_tokens(value, |t| normalize_case(t, policy))
    } else {
        normalize_case(value, policy)
    };
    if cased != *value {
        report.record(format!("{label}: converted all-caps text to title case"));
        *value = cased;
    }

    // 4. Word-boundary truncation to the field limit. A field whose
    //    DKI token alone exceeds the limit is left for manual review.
    if char_len(value) > limit {
        let truncated = truncate_to_words(value, limit);
        if preserve_dki && find_dki_tokens(value).len() != find_dki_tokens(&truncated).len() {
            report.warn(format!(
                "{label}: exceeds {limit} characters but truncation would cut the DKI token; manual review required"
            ));
        } else {
            report.record(format!(
                "{label}: truncated to {limit} characters at word boundary"
            ));
            *value = truncated;
        }
    }
}

/// Prepend the https scheme when missing. Unparseable URLs are left
/// unchanged and flagged.
fn fix_url(label: &str, value: &mut String, report: &mut FixReport) {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        report.warn(format!("{label} is empty; manual review required"));
        return;
    }
    let mut candidate = trimmed.clone();
    if !candidate.starts_with("http://") && !candidate.starts_with("https://") {
        candidate = format!("https://{candidate}");
    }
    match url::Url::parse(&candidate) {
        Ok(_) => {
            if candidate != *value {
                report.record(format!("{label}: added https:// scheme"));
                *value = candidate;
            }
        }
        Err(_) => {
            report.warn(format!(
                "{label} could not be parsed as a URL (\"{value}\"); manual review required"
            ));
        }
    }
}

fn fix_display_path(path: &mut Vec<String>, policy: &PolicyConfig, report: &mut FixReport) {
    let limits = &policy.limits;
    if path.len() > limits.display_path_segments {
        path.truncate(limits.display_path_segments);
        report.record(format!(
            "display path: dropped segments beyond the first {}",
            limits.display_path_segments
        ));
    }
    for (i, segment) in path.iter_mut().enumerate() {
        if char_len(segment) > limits.display_path {
            *segment = truncate_to_words(segment, limits.display_path);
            report.record(format!(
                "display path {}: truncated to {} characters",
                i + 1,
                limits.display_path
            ));
        }
    }
}

/// Re-run the validator matching the ad type; residual violations the
/// pipeline could not fix become warnings instead of being dropped.
fn record_residual_violations(ad: &RawAd, policy: &PolicyConfig, report: &mut FixReport) {
    match ad.ad_type {
        AdType::Rsa => {
            let validation =
                validate_rsa(&ad.headlines, &ad.descriptions, &ad.display_path, policy);
            for error in validation.errors() {
                report.warn(format!("Manual review required: {}", error.message));
            }
        }
        AdType::Dki => {
            let dki = DkiAd {
                headlines: ad.headlines.clone(),
                descriptions: ad.descriptions.clone(),
                final_url: ad.final_url.clone().unwrap_or_default(),
                display_path: ad.display_path.clone(),
            };
            let validation = validate_dki_ad(&dki, policy);
            for error in validation.errors() {
                report.warn(format!("Manual review required: {}", error.message));
            }
        }
        AdType::CallOnly => {
            let call = CallOnlyAd {
                business_name: ad.business_name.clone().unwrap_or_default(),
                headlines: ad.headlines.clone(),
                descriptions: ad.descriptions.clone(),
                phone_number: ad.phone_number.clone().unwrap_or_default(),
                verification_url: ad.final_url.clone().unwrap_or_default(),
                display_path: ad.display_path.clone(),
            };
            let validation = validate_call_only_ad(&call, policy);
            for error in &validation.errors {
                report.warn(format!("Manual review required: {}", error.message));
            }
        }
    }
}

/// Validate and deterministically repair a single ad.
///
/// The pipeline is idempotent: running the fixer over its own output
/// applies zero further fixes.
pub fn validate_and_fix_ad(raw: &RawAd, policy: &PolicyConfig) -> (RawAd, FixReport) {
    let mut ad = raw.clone();
    let mut report = FixReport::default();
    let limits = &policy.limits;
    let preserve_dki = ad.ad_type == AdType::Dki;

    for (i, headline) in ad.headlines.iter_mut().enumerate() {
        fix_text_field(
            &format!("headline {}", i + 1),
            headline,
            limits.headline,
            preserve_dki,
            policy,
            &mut report,
        );
    }
    for (i, description) in ad.descriptions.iter_mut().enumerate() {
        fix_text_field(
            &format!("description {}", i + 1),
            description,
            limits.description,
            preserve_dki,
            policy,
            &mut report,
        );
    }

    if let Some(name) = ad.business_name.as_mut() {
        let stripped = strip_quotes_from_ad_text(name);
        if stripped != *name {
            report.record("business name: removed quote characters");
            *name = stripped;
        }
        if char_len(name) > limits.business_name {
            *name = truncate_to_words(name, limits.business_name);
            report.record(format!(
                "business name: truncated to {} characters at word boundary",
                limits.business_name
            ));
        }
    }

    if let Some(url) = ad.final_url.as_mut() {
        fix_url("final URL", url, &mut report);
    }

    fix_display_path(&mut ad.display_path, policy, &mut report);

    record_residual_violations(&ad, policy, &mut report);

    debug!(
        fixes = report.fixed,
        warnings = report.warnings.len(),
        "auto-fix pass complete"
    );
    (ad, report)
}

/// Batch form of `validate_and_fix_ad`; the report aggregates fix
/// counts and warnings across all ads in input order.
pub fn validate_and_fix_ads(raws: &[RawAd], policy: &PolicyConfig) -> (Vec<RawAd>, FixReport) {
    let mut ads = Vec::with_capacity(raws.len());
    let mut report = FixReport::default();
    for raw in raws {
        let (ad, ad_report) = validate_and_fix_ad(raw, policy);
        ads.push(ad);
        report.merge(ad_report);
    }
    (ads, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn policy() -> PolicyConfig {
        PolicyConfig::default()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn problematic_rsa() -> RawAd {
        RawAd {
            ad_type: AdType::Rsa,
            headlines: strings(&[
                "\"Emergency Plumber!!!\"",
                "BEST PLUMBING SERVICE @#$",
                "This headline is way too long and exceeds the thirty character limit",
            ]),
            descriptions: strings(&[
                "Professional {KeyWord:plumbing} services available 24/7. Licensed and insured professionals.",
                "\"Get fast fast reliable plumbing repairs\"",
            ]),
            final_url: Some("smithplumbing.com".into()),
            display_path: vec!["very-long-path-name".into()],
            business_name: None,
            phone_number: None,
        }
    }

    #[test]
    fn test_fixes_common_violations() {
        let (fixed, report) = validate_and_fix_ad(&problematic_rsa(), &policy());

        assert!(report.fixed > 0);
        assert!(!report.fixes.is_empty());

        assert!(!fixed.headlines[0].contains('"'));
        assert!(!fixed.headlines[0].contains("!!!"));
        assert!(!fixed.headlines[1].contains('@'));
        assert!(!fixed.headlines[1].contains('#'));
        assert_eq!(fixed.headlines[1], "Best Plumbing Service");
        assert!(fixed.headlines[2].chars().count() <= 30);

        // Embedded token stripped from a plain RSA description
        assert!(!fixed.descriptions[0].contains("{KeyWord:"));
        assert!(fixed.descriptions[0].contains("24-7"));
        assert!(!fixed.descriptions[1].contains("fast fast"));

        assert!(fixed.final_url.as_deref().unwrap().starts_with("https://"));
        assert!(fixed.display_path[0].chars().count() <= 15);
    }

    #[test]
    fn test_quoted_all_caps_overlength_headline_scenario() {
        let raw = RawAd {
            ad_type: AdType::Rsa,
            headlines: strings(&[
                "\"EMERGENCY PLUMBING REPAIR SERVICE AVAILABLE NOW\"",
                "Fast Drain Cleaning",
                "Licensed & Insured Team",
            ]),
            descriptions: strings(&["Professional service", "Licensed and insured"]),
            final_url: Some("smithplumbing.com/contact".into()),
            display_path: vec![],
            business_name: None,
            phone_number: None,
        };
        let (fixed, report) = validate_and_fix_ad(&raw, &policy());

        let headline = &fixed.headlines[0];
        assert!(!headline.contains('"'));
        assert!(headline.chars().count() <= 30);
        assert_eq!(headline, "Emergency Plumbing Repair");
        assert!(fixed.final_url.as_deref().unwrap().starts_with("https://"));
        assert!(!report.fixes.is_empty());
    }

    #[test]
    fn test_fixer_is_idempotent() {
        let p = policy();
        let batch = vec![problematic_rsa()];
        let (fixed_once, first) = validate_and_fix_ads(&batch, &p);
        assert!(first.fixed > 0);

        let (fixed_twice, second) = validate_and_fix_ads(&fixed_once, &p);
        assert_eq!(second.fixed, 0, "second pass fixes: {:?}", second.fixes);
        assert_eq!(fixed_once, fixed_twice);
    }

    #[test]
    fn test_dki_token_survives_fixing() {
        let raw = RawAd {
            ad_type: AdType::Dki,
            headlines: strings(&[
                "\"{KeyWord:Plumbing}\"",
                "Smith Experts Near You",
                "Get Your Free Quote",
            ]),
            descriptions: strings(&[
                "Looking for {KeyWord:Plumbing}? Expert service at fair prices!!!",
                "Trusted professionals. Same-day service available.",
            ]),
            final_url: Some("https://smithplumbing.com".into()),
            display_path: vec![],
            business_name: None,
            phone_number: None,
        };
        let (fixed, report) = validate_and_fix_ad(&raw, &policy());

        assert_eq!(fixed.headlines[0], "{KeyWord:Plumbing}");
        assert!(fixed.descriptions[0].contains("{KeyWord:Plumbing}"));
        assert!(!fixed.descriptions[0].contains("!!!"));
        assert!(report.fixes.iter().any(|f| f.contains("quote")));
    }

    #[test]
    fn test_residual_violations_become_warnings() {
        let raw = RawAd {
            ad_type: AdType::Rsa,
            headlines: strings(&["Only Headline", "Second Headline"]),
            descriptions: strings(&["Professional service", "Licensed and insured"]),
            final_url: Some("https://example.com".into()),
            display_path: vec![],
            business_name: None,
            phone_number: None,
        };
        let (_, report) = validate_and_fix_ad(&raw, &policy());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("Manual review required") && w.contains("minimum 3 headlines")));
    }

    #[test]
    fn test_call_only_residuals_surface() {
        let raw = RawAd {
            ad_type: AdType::CallOnly,
            headlines: strings(&["Call Now", "Fast Service"]),
            descriptions: strings(&["Professional service", "Licensed and insured"]),
            final_url: Some("https://example.com".into()),
            display_path: vec![],
            business_name: Some("Best Plumbing".into()),
            phone_number: Some("1-900-555-0123".into()),
        };
        let (_, report) = validate_and_fix_ad(&raw, &policy());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("promotional text")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("Premium-rate phone numbers")));
    }

    #[test]
    fn test_empty_ad_never_panics() {
        let raw = RawAd {
            ad_type: AdType::Rsa,
            headlines: vec![],
            descriptions: vec![],
            final_url: None,
            display_path: vec![],
            business_name: None,
            phone_number: None,
        };
        let (fixed, report) = validate_and_fix_ad(&raw, &policy());
        assert!(fixed.headlines.is_empty());
        assert_eq!(report.fixed, 0);
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn test_unparseable_url_left_unchanged_with_warning() {
        let mut raw = problematic_rsa();
        raw.final_url = Some("ht tp://not a url".into());
        let (fixed, report) = validate_and_fix_ad(&raw, &policy());
        assert_eq!(fixed.final_url.as_deref(), Some("ht tp://not a url"));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("could not be parsed")));
    }
}
