//! Core domain model for the adforge ad compliance engine.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `AdInput`: The business/industry profile the generator consumes
//! - `ResponsiveSearchAd`, `DkiAd`, `CallOnlyAd`: The three ad archetypes
//! - `ValidationReport` / `FixReport`: Structured compliance reports
//! - `PolicyConfig`: The injected table of Google Ads policy constants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Google's qualitative ad strength rating, reproduced as a heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdStrength {
    /// Below minimum requirements
    Poor,
    /// Valid but only partial use of available slots
    Average,
    /// Near-max distinct content
    Good,
    /// Max headlines/descriptions with no similarity warnings
    Excellent,
}

impl Default for AdStrength {
    fn default() -> Self {
        Self::Poor
    }
}

impl AdStrength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Average => "Average",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

/// Category of a blocking validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Wrong count of headlines/descriptions/fields
    Structural,
    /// Field exceeds its character limit
    Length,
    /// Two headlines judged substantially similar
    Similarity,
    /// Malformed DKI token
    Syntax,
    /// Premium-rate phone, promotional business name, etc.
    Policy,
}

/// A single blocking validation error with its category and a
/// human-readable message suitable for verbatim display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Structural,
            message: message.into(),
        }
    }

    pub fn length(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Length,
            message: message.into(),
        }
    }

    pub fn similarity(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Similarity,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Syntax,
            message: message.into(),
        }
    }

    pub fn policy(message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::Policy,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Input profile for the universal ad generator.
///
/// Keywords are recommended but the generator degrades to generic
/// phrasing when they are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdInput {
    /// Industry tag ("plumbing", "legal", "general", ...)
    pub industry: String,

    /// Keyword strings, highest-priority first
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Unique value proposition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_value_proposition: Option<String>,

    /// The pain point the audience searches to solve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_pain_point: Option<String>,

    /// Business name; derived from the base URL host when empty
    #[serde(default)]
    pub business_name: String,

    /// Service location (city or region)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Landing page base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Business phone number for Call-Only ads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl AdInput {
    pub fn new(industry: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            ..Default::default()
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_business_name(mut self, name: impl Into<String>) -> Self {
        self.business_name = name.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }
}

/// One of the four content-generation strategies used to diversify
/// generated headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    /// Licensed, certified, experienced
    Authority,
    /// 24-7, same-day, emergency
    Urgency,
    /// Free estimate, pricing, guarantee
    Value,
    /// Keyword- and location-injected phrasing
    Local,
}

impl Pillar {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authority => "Authority",
            Self::Urgency => "Urgency",
            Self::Value => "Value",
            Self::Local => "Local",
        }
    }
}

/// Which headlines each pillar contributed, in generation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PillarBreakdown {
    pub authority: Vec<String>,
    pub urgency: Vec<String>,
    pub value: Vec<String>,
    pub local: Vec<String>,
}

/// A Google Responsive Search Ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiveSearchAd {
    /// 3-15 headlines, each within the headline character limit
    pub headlines: Vec<String>,

    /// 2-4 descriptions, each within the description character limit
    pub descriptions: Vec<String>,

    /// 0-2 vanity path segments shown after the domain
    #[serde(default)]
    pub display_path: Vec<String>,

    pub final_url: String,

    /// Pillar attribution for every generated headline
    #[serde(default)]
    pub pillar_breakdown: PillarBreakdown,
}

/// A Dynamic Keyword Insertion ad. At most one `{KeyWord:default}` token
/// may appear across the whole ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DkiAd {
    /// Up to 3 headline slots
    pub headlines: Vec<String>,

    /// Up to 2 description slots
    pub descriptions: Vec<String>,

    pub final_url: String,

    #[serde(default)]
    pub display_path: Vec<String>,
}

/// A Call-Only ad whose primary CTA is a phone call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallOnlyAd {
    /// Real business name, not a generic service term
    pub business_name: String,

    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,

    /// Validated, non-premium-rate phone number
    pub phone_number: String,

    pub verification_url: String,

    #[serde(default)]
    pub display_path: Vec<String>,
}

/// Which archetype a raw ad belongs to; selects the validator the
/// auto-fixer re-runs after its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    Rsa,
    Dki,
    CallOnly,
}

/// An ad in the shape the auto-fixer operates on: every text field
/// present and mutable, nothing yet guaranteed compliant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAd {
    pub ad_type: AdType,

    #[serde(default)]
    pub headlines: Vec<String>,

    #[serde(default)]
    pub descriptions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,

    #[serde(default)]
    pub display_path: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl From<ResponsiveSearchAd> for RawAd {
    fn from(ad: ResponsiveSearchAd) -> Self {
        Self {
            ad_type: AdType::Rsa,
            headlines: ad.headlines,
            descriptions: ad.descriptions,
            final_url: Some(ad.final_url),
            display_path: ad.display_path,
            business_name: None,
            phone_number: None,
        }
    }
}

impl From<DkiAd> for RawAd {
    fn from(ad: DkiAd) -> Self {
        Self {
            ad_type: AdType::Dki,
            headlines: ad.headlines,
            descriptions: ad.descriptions,
            final_url: Some(ad.final_url),
            display_path: ad.display_path,
            business_name: None,
            phone_number: None,
        }
    }
}

impl From<CallOnlyAd> for RawAd {
    fn from(ad: CallOnlyAd) -> Self {
        Self {
            ad_type: AdType::CallOnly,
            headlines: ad.headlines,
            descriptions: ad.descriptions,
            final_url: Some(ad.verification_url),
            display_path: ad.display_path,
            business_name: Some(ad.business_name),
            phone_number: Some(ad.phone_number),
        }
    }
}

/// Result of validating a Responsive Search Ad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,

    /// Blocking errors against individual headlines or the headline set
    #[serde(default)]
    pub headline_errors: Vec<Violation>,

    /// Blocking errors against individual descriptions or the set
    #[serde(default)]
    pub description_errors: Vec<Violation>,

    /// Non-blocking recommendations
    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default)]
    pub ad_strength: AdStrength,
}

impl ValidationReport {
    /// All blocking errors, headline errors first.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.headline_errors
            .iter()
            .chain(self.description_errors.iter())
    }
}

/// Result of validating DKI token syntax in one text field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DkiSyntaxReport {
    pub valid: bool,

    /// Token shape and casing are canonical
    pub syntax_valid: bool,

    /// Default text is non-empty and fits the expanded budget
    pub default_text_valid: bool,

    #[serde(default)]
    pub errors: Vec<Violation>,

    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Result of validating a Call-Only ad. The business-name and phone
/// flags are segregated from `valid` so callers can isolate those
/// failure modes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOnlyReport {
    pub valid: bool,
    pub business_name_valid: bool,
    pub phone_valid: bool,

    #[serde(default)]
    pub errors: Vec<Violation>,

    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Result of validating a phone number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneValidation {
    pub valid: bool,

    /// Why the number was rejected, when it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PhoneValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Log of the transformations the auto-fixer applied to one ad.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixReport {
    /// Number of individual fixes applied
    pub fixed: usize,

    /// Human-readable description of every fix, in application order
    #[serde(default)]
    pub fixes: Vec<String>,

    /// Residual issues the fixer could not resolve without fabricating
    /// content; these require manual review
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl FixReport {
    pub fn record(&mut self, fix: impl Into<String>) {
        self.fixed += 1;
        self.fixes.push(fix.into());
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn merge(&mut self, other: FixReport) {
        self.fixed += other.fixed;
        self.fixes.extend(other.fixes);
        self.warnings.extend(other.warnings);
    }
}

/// Character limits for every ad field, per Google Ads Editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterLimits {
    pub headline: usize,
    pub description: usize,
    pub display_path: usize,
    pub display_path_segments: usize,
    pub headline_min_count: usize,
    pub headline_max_count: usize,
    pub description_min_count: usize,
    pub description_max_count: usize,
    pub call_headline_count: usize,
    pub call_description_count: usize,
    pub business_name: usize,
    pub dki_default_max: usize,
}

impl Default for CharacterLimits {
    fn default() -> Self {
        Self {
            headline: 30,
            description: 90,
            display_path: 15,
            display_path_segments: 2,
            headline_min_count: 3,
            headline_max_count: 15,
            description_min_count: 2,
            description_max_count: 4,
            call_headline_count: 2,
            call_description_count: 2,
            business_name: 25,
            dki_default_max: 18,
        }
    }
}

/// Thresholds mapping headline/description counts to an `AdStrength`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthThresholds {
    /// Minimum headline count for Excellent
    pub excellent_min_headlines: usize,
    /// Minimum description count for Excellent
    pub excellent_min_descriptions: usize,
    /// Minimum headline count for Good
    pub good_min_headlines: usize,
}

impl Default for StrengthThresholds {
    fn default() -> Self {
        Self {
            excellent_min_headlines: 10,
            excellent_min_descriptions: 3,
            good_min_headlines: 7,
        }
    }
}

/// The static table of policy constants, read-only after construction.
///
/// Injected into every validator/normalizer call so alternate tables
/// (e.g. stricter future limits) can be unit-tested without touching
/// call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub limits: CharacterLimits,
    pub strength: StrengthThresholds,

    /// All-caps words preserved during case normalization
    pub acronyms: Vec<String>,

    /// Superlatives/promotional terms forbidden in business names
    pub promotional_words: Vec<String>,

    /// Generic single-word service nouns that indicate a placeholder
    /// rather than a real business name
    pub generic_service_terms: Vec<String>,

    /// Premium-rate area/exchange prefixes rejected outright
    pub premium_prefixes: Vec<String>,

    /// Special characters stripped during sanitization
    pub forbidden_chars: Vec<char>,

    /// Call-to-action words required in Call-Only headlines
    pub cta_words: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            limits: CharacterLimits::default(),
            strength: StrengthThresholds::default(),
            acronyms: ["EPA", "OSHA", "HVAC", "BBB", "LLC", "USA", "ASAP", "CPR", "ADA"]
                .map(String::from)
                .to_vec(),
            promotional_words: ["best", "#1", "top", "cheapest", "greatest", "24/7", "24-7"]
                .map(String::from)
                .to_vec(),
            generic_service_terms: [
                "plumber",
                "plumbing",
                "electrician",
                "lawyer",
                "dentist",
                "contractor",
                "roofer",
                "locksmith",
                "cleaner",
                "service",
            ]
            .map(String::from)
            .to_vec(),
            premium_prefixes: ["900", "976", "550"].map(String::from).to_vec(),
            forbidden_chars: vec!['@', '#', '$', '%', '^', '*', '(', ')', '~', '<', '>', '|'],
            cta_words: ["call", "tap"].map(String::from).to_vec(),
        }
    }
}

/// Errors raised when loading an externally supplied policy table.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("limit '{0}' must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("headline count range is inverted ({min} > {max})")]
    InvertedHeadlineRange { min: usize, max: usize },
    #[error("description count range is inverted ({min} > {max})")]
    InvertedDescriptionRange { min: usize, max: usize },
}

impl PolicyConfig {
    /// Sanity-check a table loaded from configuration. The built-in
    /// `Default` table always passes.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let l = &self.limits;
        for (name, value) in [
            ("headline", l.headline),
            ("description", l.description),
            ("display_path", l.display_path),
            ("business_name", l.business_name),
            ("dki_default_max", l.dki_default_max),
        ] {
            if value == 0 {
                return Err(PolicyError::ZeroLimit(name));
            }
        }
        if l.headline_min_count > l.headline_max_count {
            return Err(PolicyError::InvertedHeadlineRange {
                min: l.headline_min_count,
                max: l.headline_max_count,
            });
        }
        if l.description_min_count > l.description_max_count {
            return Err(PolicyError::InvertedDescriptionRange {
                min: l.description_min_count,
                max: l.description_max_count,
            });
        }
        Ok(())
    }

    /// Case-insensitive acronym lookup.
    pub fn is_acronym(&self, word: &str) -> bool {
        self.acronyms.iter().any(|a| a.eq_ignore_ascii_case(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_match_google_ads_editor() {
        let limits = CharacterLimits::default();
        assert_eq!(limits.headline, 30);
        assert_eq!(limits.description, 90);
        assert_eq!(limits.display_path, 15);
        assert_eq!(limits.headline_min_count, 3);
        assert_eq!(limits.headline_max_count, 15);
        assert_eq!(limits.description_min_count, 2);
        assert_eq!(limits.description_max_count, 4);
        assert_eq!(limits.call_headline_count, 2);
        assert_eq!(limits.call_description_count, 2);
        assert_eq!(limits.business_name, 25);
    }

    #[test]
    fn test_default_policy_validates() {
        assert!(PolicyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut policy = PolicyConfig::default();
        policy.limits.headline_min_count = 20;
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvertedHeadlineRange { min: 20, max: 15 })
        ));
    }

    #[test]
    fn test_ad_input_builder() {
        let input = AdInput::new("plumbing")
            .with_keywords(vec!["emergency plumber".into()])
            .with_business_name("Smith Plumbing")
            .with_location("Seattle");
        assert_eq!(input.industry, "plumbing");
        assert_eq!(input.business_name, "Smith Plumbing");
        assert_eq!(input.location.as_deref(), Some("Seattle"));
    }

    #[test]
    fn test_raw_ad_round_trips_through_serde() {
        let raw = RawAd {
            ad_type: AdType::Rsa,
            headlines: vec!["Emergency Plumber".into()],
            descriptions: vec!["Licensed and insured.".into()],
            final_url: Some("https://smithplumbing.com".into()),
            display_path: vec!["Plumber".into()],
            business_name: None,
            phone_number: None,
        };
        let json = serde_json::to_string(&raw).unwrap();
        let parsed: RawAd = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, raw);
    }

    #[test]
    fn test_fix_report_merge() {
        let mut report = FixReport::default();
        report.record("headline 1: removed wrapping quotes");

        let mut other = FixReport::default();
        other.record("final URL: added https:// scheme");
        other.warn("phone number missing");

        report.merge(other);
        assert_eq!(report.fixed, 2);
        assert_eq!(report.fixes.len(), 2);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_acronym_lookup_is_case_insensitive() {
        let policy = PolicyConfig::default();
        assert!(policy.is_acronym("EPA"));
        assert!(policy.is_acronym("epa"));
        assert!(!policy.is_acronym("SERVICE"));
    }
}
