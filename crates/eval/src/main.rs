//! Evaluation CLI for exercising ad generation, validation, and fixing.
//!
//! Usage:
//!     eval generate plumbing --keywords "emergency plumber seattle" --base-url smithplumbing.com
//!     eval validate ads.json --format json
//!     eval fix ads.json

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use adforge_fix::validate_and_fix_ads;
use adforge_generate::{generate_universal_call_ad, generate_universal_dki, generate_universal_rsa};
use adforge_model::{AdInput, AdType, CallOnlyAd, DkiAd, PolicyConfig, RawAd, Violation};
use adforge_validate::{validate_call_only_ad, validate_dki_ad, validate_rsa};

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Generate and validate Google Ads copy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON policy table overriding the built-in defaults
    #[arg(long)]
    policy: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum AdKind {
    Rsa,
    Dki,
    Call,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an ad from a business profile
    Generate {
        /// Industry tag ("plumbing", "legal", "general", ...)
        industry: String,

        /// Keywords, comma-separated, highest priority first
        #[arg(short, long)]
        keywords: Option<String>,

        /// Business name (derived from the base URL host when omitted)
        #[arg(short, long)]
        business_name: Option<String>,

        /// Service location
        #[arg(short, long)]
        location: Option<String>,

        /// Landing page base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Business phone number (Call-Only ads)
        #[arg(long)]
        phone: Option<String>,

        /// Ad archetype to generate
        #[arg(short = 't', long, value_enum, default_value = "rsa")]
        ad_type: AdKind,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate ads from a JSON file (single ad object or array)
    Validate {
        /// Path to the JSON file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Auto-fix ads from a JSON file and report every change
    Fix {
        /// Path to the JSON file
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adforge=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let policy = match &cli.policy {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading policy table {}", path.display()))?;
            let policy: PolicyConfig =
                serde_json::from_str(&raw).context("parsing policy table")?;
            policy.validate().context("invalid policy table")?;
            policy
        }
        None => PolicyConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            industry,
            keywords,
            business_name,
            location,
            base_url,
            phone,
            ad_type,
            format,
        } => {
            let input = build_input(
                industry,
                keywords,
                business_name,
                location,
                base_url,
                phone,
            );
            run_generate(&input, ad_type, &format, &policy)?;
        }
        Commands::Validate { file, format } => {
            run_validate(&file, &format, &policy)?;
        }
        Commands::Fix { file, format } => {
            run_fix(&file, &format, &policy)?;
        }
    }

    Ok(())
}

fn build_input(
    industry: String,
    keywords: Option<String>,
    business_name: Option<String>,
    location: Option<String>,
    base_url: Option<String>,
    phone: Option<String>,
) -> AdInput {
    let keywords: Vec<String> = keywords
        .map(|s| {
            s.split(',')
                .map(|kw| kw.trim().to_string())
                .filter(|kw| !kw.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut input = AdInput::new(industry).with_keywords(keywords);
    if let Some(name) = business_name {
        input = input.with_business_name(name);
    }
    if let Some(location) = location {
        input = input.with_location(location);
    }
    if let Some(url) = base_url {
        input = input.with_base_url(url);
    }
    if let Some(phone) = phone {
        input = input.with_phone_number(phone);
    }
    input
}

fn run_generate(input: &AdInput, kind: AdKind, format: &str, policy: &PolicyConfig) -> Result<()> {
    match kind {
        AdKind::Rsa => {
            let ad = generate_universal_rsa(input, policy);
            let report = validate_rsa(&ad.headlines, &ad.descriptions, &ad.display_path, policy);
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&ad)?);
                return Ok(());
            }
            println!("Responsive Search Ad ({})", report.ad_strength.label());
            println!("---");
            println!("Headlines:");
            for (i, headline) in ad.headlines.iter().enumerate() {
                println!("  {:2}. {}", i + 1, headline);
            }
            println!("Descriptions:");
            for (i, description) in ad.descriptions.iter().enumerate() {
                println!("  {:2}. {}", i + 1, description);
            }
            println!("Final URL: {}", ad.final_url);
            println!("Display path: /{}", ad.display_path.join("/"));
            print_violations(report.errors());
            print_warnings(&report.warnings);
        }
        AdKind::Dki => {
            let ad = generate_universal_dki(input, policy);
            let report = validate_dki_ad(&ad, policy);
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&ad)?);
                return Ok(());
            }
            println!("Dynamic Keyword Insertion Ad");
            println!("---");
            for (i, headline) in ad.headlines.iter().enumerate() {
                println!("  H{}: {}", i + 1, headline);
            }
            for (i, description) in ad.descriptions.iter().enumerate() {
                println!("  D{}: {}", i + 1, description);
            }
            println!("Final URL: {}", ad.final_url);
            print_violations(report.errors());
            print_warnings(&report.warnings);
        }
        AdKind::Call => {
            let ad = generate_universal_call_ad(input, policy);
            let report = validate_call_only_ad(&ad, policy);
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&ad)?);
                return Ok(());
            }
            println!("Call-Only Ad");
            println!("---");
            println!("Business: {}", ad.business_name);
            for (i, headline) in ad.headlines.iter().enumerate() {
                println!("  H{}: {}", i + 1, headline);
            }
            for (i, description) in ad.descriptions.iter().enumerate() {
                println!("  D{}: {}", i + 1, description);
            }
            if ad.phone_number.is_empty() {
                println!("Phone: (none supplied)");
            } else {
                println!("Phone: {}", ad.phone_number);
            }
            println!("Verification URL: {}", ad.verification_url);
            print_violations(report.errors.iter());
            print_warnings(&report.warnings);
        }
    }
    Ok(())
}

/// Accept either a single ad object or an array of them.
fn read_ads(path: &PathBuf) -> Result<Vec<RawAd>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    let ads = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(ads)
}

fn run_validate(file: &PathBuf, format: &str, policy: &PolicyConfig) -> Result<()> {
    let ads = read_ads(file)?;

    if format == "json" {
        let mut reports = Vec::new();
        for ad in &ads {
            reports.push(validate_raw(ad, policy));
        }
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let mut all_valid = true;
    for (i, ad) in ads.iter().enumerate() {
        let report = validate_raw(ad, policy);
        println!("Ad {}: {}", i + 1, if report.valid { "VALID" } else { "INVALID" });
        if let Some(strength) = &report.ad_strength {
            println!("  Strength: {strength}");
        }
        for error in &report.errors {
            println!("  error: {}", error.message);
        }
        for warning in &report.warnings {
            println!("  warning: {warning}");
        }
        all_valid &= report.valid;
    }

    println!("---");
    println!("Total: {} ads", ads.len());
    if !all_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn run_fix(file: &PathBuf, format: &str, policy: &PolicyConfig) -> Result<()> {
    let ads = read_ads(file)?;
    let (fixed, report) = validate_and_fix_ads(&ads, policy);

    if format == "json" {
        let output = serde_json::json!({
            "ads": fixed,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for fix in &report.fixes {
        println!("fixed: {fix}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    println!("---");
    println!("{} fixes across {} ads", report.fixed, fixed.len());
    println!("{}", serde_json::to_string_pretty(&fixed)?);
    Ok(())
}

/// Flattened per-ad validation outcome, uniform across the three ad
/// archetypes so batch output serializes consistently.
#[derive(serde::Serialize)]
struct AdReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ad_strength: Option<String>,
    errors: Vec<Violation>,
    warnings: Vec<String>,
}

fn validate_raw(ad: &RawAd, policy: &PolicyConfig) -> AdReport {
    match ad.ad_type {
        AdType::Rsa => {
            let report = validate_rsa(&ad.headlines, &ad.descriptions, &ad.display_path, policy);
            AdReport {
                valid: report.valid,
                ad_strength: Some(report.ad_strength.label().to_string()),
                errors: report.errors().cloned().collect(),
                warnings: report.warnings,
            }
        }
        AdType::Dki => {
            let dki = DkiAd {
                headlines: ad.headlines.clone(),
                descriptions: ad.descriptions.clone(),
                final_url: ad.final_url.clone().unwrap_or_default(),
                display_path: ad.display_path.clone(),
            };
            let report = validate_dki_ad(&dki, policy);
            AdReport {
                valid: report.valid,
                ad_strength: None,
                errors: report.errors().cloned().collect(),
                warnings: report.warnings,
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
            let report = validate_call_only_ad(&call, policy);
            AdReport {
                valid: report.valid,
                ad_strength: None,
                errors: report.errors,
                warnings: report.warnings,
            }
        }
    }
}

fn print_violations<'a>(errors: impl Iterator<Item = &'a Violation>) {
    for error in errors {
        println!("  error: {}", error.message);
    }
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("  warning: {warning}");
    }
}
