//! Package version normalization.
//!
//! Upstream specification documents carry free-form version strings (`v1.2.3-beta`,
//! `1.0`, `2.0.0-rc.1+build`, `v1_oas3`, ...). Packages are tagged with a version that
//! Composer accepts, so every raw string is rewritten into
//! `<major>[.<minor>[.<patch>[.<build>]]][-<stability>[<n>[.<n>...]]]`.
//!
//! [`PackageVersion::normalize`] is total: any input yields a valid version, and a
//! normalized version normalizes to itself.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Used when the raw string carries no leading number at all.
pub const FALLBACK_VERSION: &str = "0.0.0";

const MAX_NUMERIC_PARTS: usize = 4;

/// Recognized stability keywords and their canonical spelling, longest first.
const STABILITY_KEYWORDS: &[(&str, &str)] = &[
    ("alpha", "alpha"),
    ("beta", "beta"),
    ("patch", "patch"),
    ("dev", "dev"),
    ("pl", "patch"),
    ("rc", "rc"),
    ("a", "alpha"),
    ("b", "beta"),
    ("c", "rc"),
    ("p", "patch"),
];

fn version_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^\d+(\.\d+){0,3}(-(alpha|beta|rc|patch)(\d+(\.\d+)*)?|-dev)?$")
            .expect("version grammar is a valid regex")
    })
}

/// A version string accepted by the package manager
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageVersion(String);

impl PackageVersion {
    /// Rewrite an arbitrary upstream version into the package version grammar
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let unprefixed = lowered.strip_prefix('v').unwrap_or(&lowered);
        let without_build = unprefixed.split('+').next().unwrap_or_default();

        let (numbers, rest) = split_numeric_core(without_build);
        if numbers.is_empty() {
            return Self(FALLBACK_VERSION.to_string());
        }

        let mut version = numbers.join(".");
        if let Some(suffix) = stability_suffix(rest) {
            version.push_str(&suffix);
        }

        debug_assert!(Self::is_valid(&version), "normalized {:?} to {:?}", raw, version);
        Self(version)
    }

    /// Whether `candidate` already matches the package version grammar
    pub fn is_valid(candidate: &str) -> bool {
        version_grammar().is_match(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn leading_digits(input: &str) -> usize {
    input.bytes().take_while(u8::is_ascii_digit).count()
}

fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Splits `1.2.3-beta` into `["1", "2", "3"]` and `-beta`
fn split_numeric_core(input: &str) -> (Vec<String>, &str) {
    let mut numbers = Vec::new();
    let mut rest = input;

    loop {
        let len = leading_digits(rest);
        if len == 0 {
            break;
        }
        if numbers.len() < MAX_NUMERIC_PARTS {
            numbers.push(strip_leading_zeros(&rest[..len]));
        }
        rest = &rest[len..];

        match rest.strip_prefix('.') {
            Some(next) if leading_digits(next) > 0 => rest = next,
            _ => break,
        }
    }

    (numbers, rest)
}

fn stability_suffix(rest: &str) -> Option<String> {
    let rest = rest
        .strip_prefix(|c: char| matches!(c, '-' | '.' | '_'))
        .unwrap_or(rest);

    let (keyword, canonical) = STABILITY_KEYWORDS.iter().find(|(keyword, _)| {
        rest.strip_prefix(keyword).is_some_and(|after| {
            after.is_empty() || after.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-')
        })
    })?;

    if *canonical == "dev" {
        return Some("-dev".to_string());
    }

    let numbers = stability_numbers(&rest[keyword.len()..]);
    Some(format!("-{}{}", canonical, numbers.join(".")))
}

fn stability_numbers(input: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut rest = input;

    loop {
        let candidate = rest
            .strip_prefix(|c: char| c == '.' || c == '-')
            .unwrap_or(rest);
        let len = leading_digits(candidate);
        if len == 0 {
            break;
        }
        numbers.push(strip_leading_zeros(&candidate[..len]));
        rest = &candidate[len..];
    }

    numbers
}
