//! Universal ad generator built on a four-pillar content strategy.
//!
//! Headlines are drawn round-robin from four template pools (authority,
//! urgency, value, local/industry) so every generated ad carries a mix
//! of angles. Each candidate passes through the same sanitization and
//! similarity rules the validator enforces, so well-formed input yields
//! ads that validate cleanly on the first attempt.

use adforge_model::{
    AdInput, CallOnlyAd, DkiAd, Pillar, PillarBreakdown, PolicyConfig, ResponsiveSearchAd,
};
use adforge_text::{
    are_headlines_similar, format_description, format_headline, sanitize_ad_text, title_case,
    truncate_to_words,
};
use tracing::debug;

/// Strip match-type decorations from a raw keyword: `[exact]`,
/// `"phrase"`, and the legacy `+modified` prefix.
pub fn clean_keyword(keyword: &str) -> String {
    let mut kw = keyword.trim();
    if kw.len() >= 2 && kw.starts_with('[') && kw.ends_with(']') {
        kw = &kw[1..kw.len() - 1];
    }
    if kw.len() >= 2 && kw.starts_with('"') && kw.ends_with('"') {
        kw = &kw[1..kw.len() - 1];
    }
    kw = kw.strip_prefix('+').unwrap_or(kw);
    kw.trim().to_string()
}

fn clean_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|kw| clean_keyword(kw))
        .filter(|kw| !kw.is_empty())
        .collect()
}

/// Map a "general" industry tag to a concrete vertical using the first
/// keyword's lexical signal. Deliberately a handful of substring rules,
/// not a trained classifier.
pub fn classify_vertical(industry: &str, keywords: &[String]) -> String {
    let industry = industry.trim().to_lowercase();
    if !industry.is_empty() && industry != "general" {
        return industry;
    }
    if let Some(first) = keywords.first() {
        let kw = first.to_lowercase();
        if kw.contains("plumb") {
            return "plumbing".to_string();
        }
        if kw.contains("electric") {
            return "electrical".to_string();
        }
        if kw.contains("hvac") {
            return "hvac".to_string();
        }
    }
    if industry.is_empty() {
        "general".to_string()
    } else {
        industry
    }
}

fn host_label(base: &str) -> Option<String> {
    let candidate = if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("https://{base}")
    };
    let parsed = url::Url::parse(&candidate).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next()?;
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Business name with fallback derivation: the input name when present,
/// otherwise the first DNS label of the base URL host (minus `www.`),
/// title-cased, otherwise the title-cased industry. Always capped at
/// the business-name limit on a word boundary.
pub fn derive_business_name(input: &AdInput, policy: &PolicyConfig) -> String {
    let limit = policy.limits.business_name;
    let trimmed = input.business_name.trim();
    if !trimmed.is_empty() {
        return truncate_to_words(trimmed, limit);
    }
    if let Some(label) = input.base_url.as_deref().and_then(host_label) {
        return truncate_to_words(&title_case(&label), limit);
    }
    truncate_to_words(&title_case(&input.industry), limit)
}

fn build_final_url(input: &AdInput) -> String {
    match input
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|base| !base.is_empty())
    {
        Some(base) => {
            let with_scheme = if base.starts_with("http://") || base.starts_with("https://") {
                base.to_string()
            } else {
                format!("https://{base}")
            };
            with_scheme.trim_end_matches('/').to_string()
        }
        None => "https://example.com".to_string(),
    }
}

fn build_display_path(main_kw: &str, input: &AdInput, policy: &PolicyConfig) -> Vec<String> {
    let limit = policy.limits.display_path;
    let head = main_kw.split_whitespace().next().unwrap_or("Services");
    let mut seg1: String = title_case(head).chars().take(limit).collect();
    if seg1.is_empty() {
        seg1 = "Services".to_string();
    }
    let seg2: String = match input.location.as_deref().map(str::trim) {
        Some(loc) if !loc.is_empty() => loc
            .split_whitespace()
            .next()
            .unwrap_or("Services")
            .chars()
            .take(limit)
            .collect(),
        _ => "Services".to_string(),
    };
    vec![seg1, seg2]
}

struct GenerationContext {
    main_kw_title: String,
    second_kw_title: Option<String>,
    vertical: String,
    business_name: String,
    location: Option<String>,
}

fn authority_candidates(ctx: &GenerationContext) -> Vec<String> {
    let mut out = vec![
        "Licensed & Insured".to_string(),
        "5-Star Rated Service".to_string(),
        "Trusted Since 2010".to_string(),
        "A+ BBB Rating".to_string(),
        "Over 10,000 Happy Customers".to_string(),
    ];
    let v = ctx.vertical.as_str();
    if v.contains("plumb") || v.contains("electric") || v.contains("hvac") || v.contains("roof") {
        out.push("Veteran Owned Business".to_string());
    }
    if v.contains("legal") || v.contains("lawyer") {
        out.push("No Fee Unless We Win".to_string());
    }
    if v.contains("medical") || v.contains("dental") || v.contains("health") {
        out.push("Board Certified Care".to_string());
    }
    if v.contains("saas") || v.contains("software") || v.contains("tech") {
        out.push("SOC2 Type II Certified".to_string());
    }
    if v.contains("market") || v.contains("seo") || v.contains("agency") {
        out.push("Google Premier Partner".to_string());
    }
    out
}

fn urgency_candidates(ctx: &GenerationContext) -> Vec<String> {
    let mut out = vec![
        "Same-Day Service Available".to_string(),
        "Fast Response Guaranteed".to_string(),
        "Open Nights & Weekends".to_string(),
    ];
    let v = ctx.vertical.as_str();
    if v.contains("plumb") || v.contains("electric") || v.contains("hvac") || v.contains("roof") {
        out.insert(0, "24-7 Emergency Service".to_string());
        out.push("Emergency Help Available Now".to_string());
    }
    if v.contains("saas") || v.contains("software") {
        out.push("Get Started In Minutes".to_string());
    }
    out
}

fn value_candidates() -> Vec<String> {
    vec![
        "Get Your Free Quote".to_string(),
        "Upfront Honest Pricing".to_string(),
        "Free Estimates Today".to_string(),
        "Book Now Save More".to_string(),
        "Satisfaction Guaranteed".to_string(),
        "Claim Your Discount".to_string(),
    ]
}

/// Translate a stated audience pain point into a benefit headline.
fn pain_solution(pain_point: &str) -> String {
    let pain = pain_point.to_lowercase();
    if pain.contains("time") || pain.contains("slow") || pain.contains("wait") {
        "Get Results Fast".to_string()
    } else if pain.contains("cost") || pain.contains("expensive") || pain.contains("price") {
        "Affordable Solutions".to_string()
    } else if pain.contains("quality") || pain.contains("poor") || pain.contains("bad") {
        "Premium Quality Always".to_string()
    } else if pain.contains("trust") || pain.contains("scam") || pain.contains("reliable") {
        "Trusted By Thousands".to_string()
    } else {
        "We Solve Your Problems".to_string()
    }
}

fn industry_benefits(vertical: &str, kw_title: &str) -> Vec<String> {
    let v = vertical;
    if v.contains("plumb") {
        return vec![
            "Fix Your Leak Fast".to_string(),
            "Stop Water Damage Today".to_string(),
            "Lower Your Water Bills".to_string(),
            "End Drain Problems Fast".to_string(),
        ];
    }
    if v.contains("electric") {
        return vec![
            "Stop Flickering Lights".to_string(),
            "Upgrade Your Wiring".to_string(),
            "Prevent Electrical Fires".to_string(),
            "Lower Energy Bills Now".to_string(),
        ];
    }
    if v.contains("hvac") {
        return vec![
            "Stay Comfortable Always".to_string(),
            "Fix AC Problems Fast".to_string(),
            "End Heating Issues Today".to_string(),
            "Lower Energy Costs Now".to_string(),
        ];
    }
    if v.contains("roof") {
        return vec![
            "Stop Roof Leaks Today".to_string(),
            "Protect Your Home Now".to_string(),
            "Extend Roof Lifespan".to_string(),
        ];
    }
    if v.contains("legal") || v.contains("lawyer") {
        return vec![
            "Protect Your Rights Now".to_string(),
            "Get Fair Compensation".to_string(),
            "Win Your Case Today".to_string(),
        ];
    }
    if v.contains("dental") {
        return vec![
            "Smile With Confidence".to_string(),
            "Pain-Free Dental Care".to_string(),
            "End Tooth Pain Today".to_string(),
        ];
    }
    if v.contains("saas") || v.contains("software") {
        return vec![
            "Automate Your Workflow".to_string(),
            "Save Hours Every Week".to_string(),
            "Boost Team Productivity".to_string(),
        ];
    }
    if v.contains("market") || v.contains("seo") {
        return vec![
            "Double Your Traffic".to_string(),
            "More Leads Every Month".to_string(),
            "Outrank Your Competitors".to_string(),
        ];
    }
    vec![
        format!("Get Results With {kw_title}"),
        format!("{kw_title} Done Right"),
        format!("Quality {kw_title} Results"),
    ]
}

fn local_candidates(ctx: &GenerationContext) -> Vec<String> {
    let kw = &ctx.main_kw_title;
    let mut out = vec![
        format!("{kw} Services"),
        format!("Professional {kw}"),
        format!("Expert {kw} Help"),
        format!("{kw} Near You"),
    ];
    if let Some(location) = &ctx.location {
        out.push(format!("{location} {kw}"));
    }
    if let Some(second) = &ctx.second_kw_title {
        out.push(format!("{second} Experts"));
    }
    out.extend(industry_benefits(&ctx.vertical, kw));
    out
}

fn push_headline(
    pillar: Pillar,
    headline: String,
    headlines: &mut Vec<String>,
    breakdown: &mut PillarBreakdown,
) {
    match pillar {
        Pillar::Authority => breakdown.authority.push(headline.clone()),
        Pillar::Urgency => breakdown.urgency.push(headline.clone()),
        Pillar::Value => breakdown.value.push(headline.clone()),
        Pillar::Local => breakdown.local.push(headline.clone()),
    }
    headlines.push(headline);
}

fn build_descriptions(
    ctx: &GenerationContext,
    input: &AdInput,
    policy: &PolicyConfig,
) -> Vec<String> {
    let kw = &ctx.main_kw_title;
    let business = &ctx.business_name;
    let usp = input
        .unique_value_proposition
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("quality service and expert solutions");
    let pain = input
        .audience_pain_point
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("finding reliable service");
    let location_phrase = ctx
        .location
        .as_deref()
        .map(|loc| format!(" in {loc}"))
        .unwrap_or_default();

    let drafts = [
        format!(
            "Looking for {kw}? {business} offers {usp}. Get your free quote today and see the difference."
        ),
        format!(
            "Tired of {pain}? Our expert team delivers proven results. Licensed, insured, and trusted by thousands."
        ),
        format!(
            "Save on your first {kw} service. Limited time offer. Book now and get same-day availability."
        ),
        format!(
            "Imagine having reliable {kw}{location_phrase} done right the first time. That's what {business} delivers every day."
        ),
    ];

    let mut descriptions: Vec<String> = drafts
        .iter()
        .map(|draft| format_description(&sanitize_ad_text(draft, policy), policy))
        .filter(|d| !d.is_empty())
        .collect();

    while descriptions.len() < policy.limits.description_min_count {
        let fallback = format_description(
            &format!("Professional {kw} services. Contact us today for expert solutions."),
            policy,
        );
        if descriptions.contains(&fallback) {
            descriptions.push(format_description(
                "Quality service guaranteed. Get your free quote now.",
                policy,
            ));
            break;
        }
        descriptions.push(fallback);
    }

    descriptions.truncate(policy.limits.description_max_count);
    descriptions
}

fn generation_context(input: &AdInput, policy: &PolicyConfig) -> (GenerationContext, Vec<String>) {
    let keywords = clean_keywords(&input.keywords);
    let vertical = classify_vertical(&input.industry, &keywords);
    let main_kw = keywords
        .first()
        .cloned()
        .unwrap_or_else(|| vertical.clone());
    let second_kw_title = keywords
        .get(1)
        .filter(|kw| !kw.eq_ignore_ascii_case(&main_kw))
        .map(|kw| title_case(kw));
    let ctx = GenerationContext {
        main_kw_title: title_case(&main_kw),
        second_kw_title,
        vertical,
        business_name: derive_business_name(input, policy),
        location: input
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };
    (ctx, keywords)
}

/// Generate a Responsive Search Ad from a business profile.
///
/// Targets the maximum headline count while keeping every pair of
/// headlines non-similar; well-formed input yields an ad that passes
/// RSA validation without fixing.
pub fn generate_universal_rsa(input: &AdInput, policy: &PolicyConfig) -> ResponsiveSearchAd {
    let (ctx, keywords) = generation_context(input, policy);
    let max = policy.limits.headline_max_count;

    let mut value_pool = value_candidates();
    if let Some(pain) = input
        .audience_pain_point
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        value_pool.push(pain_solution(pain));
    }

    let pools = [
        (Pillar::Local, local_candidates(&ctx)),
        (Pillar::Authority, authority_candidates(&ctx)),
        (Pillar::Urgency, urgency_candidates(&ctx)),
        (Pillar::Value, value_pool),
    ];

    let mut headlines: Vec<String> = Vec::new();
    let mut breakdown = PillarBreakdown::default();

    // Round-robin across pillars so the final set mixes all four angles
    // even when the cap cuts generation short.
    let mut iters: Vec<(Pillar, std::vec::IntoIter<String>)> = pools
        .into_iter()
        .map(|(pillar, pool)| (pillar, pool.into_iter()))
        .collect();
    let mut exhausted = false;
    while headlines.len() < max && !exhausted {
        exhausted = true;
        for (pillar, iter) in iters.iter_mut() {
            if headlines.len() >= max {
                break;
            }
            let Some(candidate) = iter.next() else {
                continue;
            };
            exhausted = false;
            let formatted = format_headline(&sanitize_ad_text(&candidate, policy), policy);
            if formatted.is_empty()
                || headlines.iter().any(|h| are_headlines_similar(h, &formatted))
            {
                continue;
            }
            push_headline(*pillar, formatted, &mut headlines, &mut breakdown);
        }
    }

    // Keyword-rotated fallbacks when the pillar pools could not reach
    // the cap without similarity collisions.
    let kw_titles: Vec<String> = if keywords.is_empty() {
        vec![title_case(&ctx.vertical)]
    } else {
        keywords.iter().map(|kw| title_case(kw)).collect()
    };
    let fallbacks: [fn(&str) -> String; 8] = [
        |kw| format!("{kw} Experts"),
        |kw| format!("Best {kw} Team"),
        |kw| format!("{kw} Specialists"),
        |kw| format!("Top {kw} Pros"),
        |kw| format!("Reliable {kw}"),
        |kw| format!("Certified {kw}"),
        |kw| format!("Award Winning {kw}"),
        |kw| format!("Affordable {kw}"),
    ];
    for (i, template) in fallbacks.iter().enumerate() {
        if headlines.len() >= max {
            break;
        }
        let kw = &kw_titles[i % kw_titles.len()];
        let formatted = format_headline(&sanitize_ad_text(&template(kw), policy), policy);
        if formatted.is_empty() || headlines.iter().any(|h| are_headlines_similar(h, &formatted)) {
            continue;
        }
        push_headline(Pillar::Local, formatted, &mut headlines, &mut breakdown);
    }

    // Degenerate inputs still get the structural minimum.
    if headlines.len() < policy.limits.headline_min_count {
        let last_resorts = [
            format!("{} Service", ctx.business_name),
            format!("Professional {}", title_case(&ctx.vertical)),
            "Contact Us Today".to_string(),
        ];
        for candidate in last_resorts {
            if headlines.len() >= policy.limits.headline_min_count {
                break;
            }
            let formatted = format_headline(&sanitize_ad_text(&candidate, policy), policy);
            if formatted.is_empty()
                || headlines.iter().any(|h| are_headlines_similar(h, &formatted))
            {
                continue;
            }
            push_headline(Pillar::Local, formatted, &mut headlines, &mut breakdown);
        }
    }

    let descriptions = build_descriptions(&ctx, input, policy);
    debug!(
        headlines = headlines.len(),
        descriptions = descriptions.len(),
        vertical = %ctx.vertical,
        "generated responsive search ad"
    );

    ResponsiveSearchAd {
        headlines,
        descriptions,
        display_path: build_display_path(&ctx.main_kw_title, input, policy),
        final_url: build_final_url(input),
        pillar_breakdown: breakdown,
    }
}

/// Build a `{KeyWord:default}` headline token from the primary keyword.
/// The default text is title-cased and shortened to the default-text
/// budget, preferring the first two keyword words over a hard cut.
pub fn build_dki_headline(keyword: &str, policy: &PolicyConfig) -> String {
    let clean = clean_keyword(keyword);
    let max = policy.limits.dki_default_max;
    let mut default_text = if clean.chars().count() <= max {
        title_case(&clean)
    } else {
        let two: Vec<&str> = clean.split_whitespace().take(2).collect();
        title_case(&two.join(" ")).chars().take(max).collect()
    };
    if default_text.is_empty() {
        default_text = "Our Services".to_string();
    }
    format!("{{KeyWord:{default_text}}}")
}

/// Generate a Dynamic Keyword Insertion ad: one DKI token in the first
/// headline, plain text everywhere else.
pub fn generate_universal_dki(input: &AdInput, policy: &PolicyConfig) -> DkiAd {
    let (ctx, keywords) = generation_context(input, policy);
    let main_kw = keywords
        .first()
        .cloned()
        .unwrap_or_else(|| ctx.vertical.clone());
    let kw = &ctx.main_kw_title;
    let business = &ctx.business_name;

    let headlines = vec![
        build_dki_headline(&main_kw, policy),
        format_headline(&sanitize_ad_text(&format!("{business} Experts"), policy), policy),
        format_headline("Get Your Free Quote", policy),
    ];
    let descriptions = vec![
        format_description(
            &sanitize_ad_text(
                &format!(
                    "Looking for {kw}? {business} offers expert service at fair prices. Licensed & insured. Call now!"
                ),
                policy,
            ),
            policy,
        ),
        format_description(
            &sanitize_ad_text(
                &format!(
                    "Trusted {kw} professionals. 5-star rated. Same-day service available. Get your free estimate today."
                ),
                policy,
            ),
            policy,
        ),
    ];

    debug!(token = %headlines[0], "generated DKI ad");
    DkiAd {
        headlines,
        descriptions,
        final_url: build_final_url(input),
        display_path: build_display_path(&ctx.main_kw_title, input, policy),
    }
}

/// Generate a Call-Only ad. The phone number is taken from the input
/// verbatim; when absent the field is left empty for the caller to
/// supply, never fabricated.
pub fn generate_universal_call_ad(input: &AdInput, policy: &PolicyConfig) -> CallOnlyAd {
    let (ctx, _) = generation_context(input, policy);
    let kw = &ctx.main_kw_title;
    let business = ctx.business_name.clone();

    // Reserve room for the CTA suffix so truncation can never cut the
    // required call-to-action out of the headline.
    let cta_suffix = " - Call Now";
    let kw_room = policy
        .limits
        .headline
        .saturating_sub(cta_suffix.chars().count());
    let kw_part = truncate_to_words(kw, kw_room);
    let headlines = vec![
        format!("{kw_part}{cta_suffix}"),
        "24-7 Service Available".to_string(),
    ];

    let descriptions = vec![
        format_description(
            &sanitize_ad_text(
                &format!(
                    "Professional {kw} services. Licensed & insured. Free estimates. Call now for fast help."
                ),
                policy,
            ),
            policy,
        ),
        format_description(
            &sanitize_ad_text(
                &format!(
                    "{business} - Your trusted {kw} experts. Fast response. Fair prices. Satisfaction guaranteed."
                ),
                policy,
            ),
            policy,
        ),
    ];

    CallOnlyAd {
        business_name: business,
        headlines,
        descriptions,
        phone_number: input.phone_number.clone().unwrap_or_default(),
        verification_url: build_final_url(input),
        display_path: build_display_path(&ctx.main_kw_title, input, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adforge_validate::{validate_call_only_ad, validate_dki_ad, validate_rsa};
    use adforge_model::AdStrength;
    use pretty_assertions::assert_eq;

    fn policy() -> PolicyConfig {
        PolicyConfig::default()
    }

    fn plumbing_input() -> AdInput {
        AdInput::new("plumbing")
            .with_keywords(vec![
                "emergency plumber seattle".to_string(),
                "drain cleaning".to_string(),
            ])
            .with_base_url("https://smithplumbing.com")
    }

    #[test]
    fn test_clean_keyword_strips_match_type_decorations() {
        assert_eq!(clean_keyword("[exact match]"), "exact match");
        assert_eq!(clean_keyword("\"phrase match\""), "phrase match");
        assert_eq!(clean_keyword("+modified"), "modified");
        assert_eq!(clean_keyword("  plain keyword  "), "plain keyword");
        assert_eq!(clean_keyword(""), "");
    }

    #[test]
    fn test_vertical_classifier() {
        assert_eq!(
            classify_vertical("general", &["emergency plumber".to_string()]),
            "plumbing"
        );
        assert_eq!(
            classify_vertical("general", &["electrician near me".to_string()]),
            "electrical"
        );
        assert_eq!(
            classify_vertical("general", &["hvac repair".to_string()]),
            "hvac"
        );
        assert_eq!(
            classify_vertical("general", &["tax advice".to_string()]),
            "general"
        );
        assert_eq!(classify_vertical("Legal", &[]), "legal");
    }

    #[test]
    fn test_business_name_derived_from_url_host() {
        let p = policy();
        let input = plumbing_input();
        assert_eq!(derive_business_name(&input, &p), "Smithplumbing");

        let with_www = AdInput::new("plumbing").with_base_url("www.acmedrains.com");
        assert_eq!(derive_business_name(&with_www, &p), "Acmedrains");

        let explicit = AdInput::new("plumbing").with_business_name("Smith Plumbing LLC");
        assert_eq!(derive_business_name(&explicit, &p), "Smith Plumbing LLC");

        let nothing = AdInput::new("plumbing");
        assert_eq!(derive_business_name(&nothing, &p), "Plumbing");
    }

    #[test]
    fn test_generated_rsa_passes_validation_unmodified() {
        let p = policy();
        let ad = generate_universal_rsa(&plumbing_input(), &p);

        let report = validate_rsa(&ad.headlines, &ad.descriptions, &ad.display_path, &p);
        assert!(report.valid, "errors: {:?}", report.errors().collect::<Vec<_>>());
        assert_eq!(report.ad_strength, AdStrength::Excellent);

        assert!(ad.headlines.len() >= 10);
        assert!(ad.headlines.len() <= 15);
        assert!(ad.descriptions.len() >= 3);
        assert!(ad.final_url.starts_with("https://"));
    }

    #[test]
    fn test_generated_rsa_mixes_all_pillars() {
        let ad = generate_universal_rsa(&plumbing_input(), &policy());
        let breakdown = &ad.pillar_breakdown;
        assert!(!breakdown.authority.is_empty());
        assert!(!breakdown.urgency.is_empty());
        assert!(!breakdown.value.is_empty());
        assert!(!breakdown.local.is_empty());

        let attributed = breakdown.authority.len()
            + breakdown.urgency.len()
            + breakdown.value.len()
            + breakdown.local.len();
        assert_eq!(attributed, ad.headlines.len());
    }

    #[test]
    fn test_generated_headlines_are_pairwise_diverse() {
        let ad = generate_universal_rsa(&plumbing_input(), &policy());
        for (i, a) in ad.headlines.iter().enumerate() {
            for b in ad.headlines.iter().skip(i + 1) {
                assert!(
                    !are_headlines_similar(a, b),
                    "similar pair: {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_rsa_degrades_gracefully_without_keywords() {
        let p = policy();
        let input = AdInput::new("plumbing").with_business_name("Smith Plumbing");
        let ad = generate_universal_rsa(&input, &p);

        let report = validate_rsa(&ad.headlines, &ad.descriptions, &ad.display_path, &p);
        assert!(report.valid);
        assert!(ad.headlines.len() >= 3);
        assert_eq!(ad.final_url, "https://example.com");
    }

    #[test]
    fn test_dki_headline_respects_default_budget() {
        let p = policy();
        assert_eq!(
            build_dki_headline("emergency plumber", &p),
            "{KeyWord:Emergency Plumber}"
        );
        // Long keywords fall back to the first two words
        assert_eq!(
            build_dki_headline("emergency plumber seattle wa", &p),
            "{KeyWord:Emergency Plumber}"
        );
        assert_eq!(build_dki_headline("[drain cleaning]", &p), "{KeyWord:Drain Cleaning}");
    }

    #[test]
    fn test_generated_dki_ad_is_valid() {
        let p = policy();
        let ad = generate_universal_dki(&plumbing_input(), &p);

        assert_eq!(ad.headlines[0], "{KeyWord:Emergency Plumber}");
        let report = validate_dki_ad(&ad, &p);
        assert!(report.valid, "errors: {:?}", report.errors().collect::<Vec<_>>());

        // One token across the whole ad
        let token_count: usize = ad
            .headlines
            .iter()
            .chain(ad.descriptions.iter())
            .map(|f| adforge_text::find_dki_tokens(f).len())
            .sum();
        assert_eq!(token_count, 1);
    }

    #[test]
    fn test_generated_call_ad_is_valid_with_phone() {
        let p = policy();
        let input = plumbing_input()
            .with_business_name("Smith Plumbing")
            .with_phone_number("(206) 555-0123");
        let ad = generate_universal_call_ad(&input, &p);

        assert_eq!(ad.headlines[0], "Emergency Plumber - Call Now");
        let report = validate_call_only_ad(&ad, &p);
        assert!(report.valid, "errors: {:?}", report.errors);
        assert!(report.business_name_valid);
        assert!(report.phone_valid);
    }

    #[test]
    fn test_call_ad_never_fabricates_phone_number() {
        let p = policy();
        let ad = generate_universal_call_ad(&plumbing_input(), &p);
        assert!(ad.phone_number.is_empty());

        let report = validate_call_only_ad(&ad, &p);
        assert!(!report.phone_valid);
    }

    #[test]
    fn test_call_headline_keeps_cta_for_long_keywords() {
        let p = policy();
        let input = AdInput::new("plumbing").with_keywords(vec![
            "emergency water heater replacement contractor".to_string(),
        ]);
        let ad = generate_universal_call_ad(&input, &p);
        assert!(ad.headlines[0].chars().count() <= 30);
        assert!(ad.headlines[0].to_lowercase().contains("call"));
    }

    #[test]
    fn test_display_path_segments_fit() {
        let p = policy();
        let input = plumbing_input().with_location("Seattle Metro Area");
        let ad = generate_universal_rsa(&input, &p);
        assert_eq!(ad.display_path.len(), 2);
        assert_eq!(ad.display_path[0], "Emergency");
        assert_eq!(ad.display_path[1], "Seattle");
        for segment in &ad.display_path {
            assert!(segment.chars().count() <= 15);
        }
    }
}
