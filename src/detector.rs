//! Regex-based PII detection
//!
//! A fixed table of `(kind, pattern, confidence)` rules, evaluated
//! independently over the full text in declared order. Matches from
//! different rules are never merged: a substring that satisfies two
//! patterns yields two matches.
//!
//! Digits and word boundaries are ASCII-only: `[0-9]` instead of `\d` and
//! `(?-u:\b)` instead of `\b`, so non-Latin digits are not PII and an
//! accented letter directly before a number still counts as a boundary.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RedactError, Result};
use crate::types::{PiiKind, PiiMatch};

/// A single detection rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRule {
    pub kind: PiiKind,
    pub pattern: String,
    pub confidence: f64,
}

/// Built-in rules, in evaluation order
pub fn default_rules() -> Vec<DetectionRule> {
    vec![
        DetectionRule {
            kind: PiiKind::Email,
            pattern: r"(?-u:\b)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}(?-u:\b)".to_string(),
            confidence: 0.95,
        },
        DetectionRule {
            kind: PiiKind::Ssn,
            pattern: r"(?-u:\b)[0-9]{3}-?[0-9]{2}-?[0-9]{4}(?-u:\b)".to_string(),
            confidence: 0.90,
        },
        DetectionRule {
            kind: PiiKind::Phone,
            pattern: r"(\+?1?[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}(?-u:\b)".to_string(),
            confidence: 0.85,
        },
        DetectionRule {
            kind: PiiKind::CreditCard,
            pattern: r"(?-u:\b)(?:[0-9]{4}[-\s]?){3}[0-9]{4}(?-u:\b)".to_string(),
            confidence: 0.90,
        },
        DetectionRule {
            kind: PiiKind::ZipCode,
            pattern: r"(?-u:\b)[0-9]{5}(?:-[0-9]{4})?(?-u:\b)".to_string(),
            confidence: 0.70,
        },
    ]
}

/// Compiled rule table
pub struct PatternMatcher {
    rules: Vec<(PiiKind, Regex, f64)>,
}

impl PatternMatcher {
    /// Compile the given rules
    pub fn new(rules: &[DetectionRule]) -> Result<Self> {
        let compiled = rules
            .iter()
            .map(|rule| {
                if !(0.0..=1.0).contains(&rule.confidence) {
                    return Err(RedactError::Config(format!(
                        "{}: confidence {} outside [0, 1]",
                        rule.kind, rule.confidence
                    )));
                }
                let regex = Regex::new(&rule.pattern).map_err(|e| {
                    RedactError::Config(format!("Invalid pattern for {}: {}", rule.kind, e))
                })?;
                Ok((rule.kind, regex, rule.confidence))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules: compiled })
    }

    /// Compile the built-in rule table
    pub fn with_default_rules() -> Result<Self> {
        Self::new(&default_rules())
    }

    /// Find every match, ordered by start offset
    ///
    /// Ties keep rule declaration order (the sort is stable).
    pub fn detect(&self, text: &str) -> Vec<PiiMatch> {
        let mut matches = Vec::new();

        for (kind, regex, confidence) in &self.rules {
            for mat in regex.find_iter(text) {
                matches.push(PiiMatch {
                    kind: *kind,
                    value: mat.as_str().to_string(),
                    start: mat.start(),
                    end: mat.end(),
                    confidence: *confidence,
                });
            }
        }

        matches.sort_by_key(|m| m.start);
        matches
    }

    /// Kinds in evaluation order
    pub fn kinds(&self) -> Vec<PiiKind> {
        self.rules.iter().map(|(kind, _, _)| *kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PatternMatcher {
        PatternMatcher::with_default_rules().unwrap()
    }

    #[test]
    fn test_email_and_ssn() {
        let text = "My email is john.doe@example.com and my SSN is 123-45-6789";
        let matches = matcher().detect(text);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].kind, PiiKind::Email);
        assert_eq!(matches[0].value, "john.doe@example.com");
        assert_eq!(matches[0].start, text.find("john").unwrap());
        assert_eq!(matches[0].end, matches[0].start + "john.doe@example.com".len());
        assert_eq!(matches[0].confidence, 0.95);

        assert_eq!(matches[1].kind, PiiKind::Ssn);
        assert_eq!(matches[1].value, "123-45-6789");
        assert_eq!(matches[1].start, text.find("123-45").unwrap());
    }

    #[test]
    fn test_no_pii() {
        let matches = matcher().detect("The quick brown fox jumps over the lazy dog.");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(matcher().detect("").is_empty());
    }

    #[test]
    fn test_phone_formats() {
        let m = matcher();
        for phone in ["(555) 123-4567", "555.123.4567", "+1 555 123 4567"] {
            let text = format!("call {phone} today");
            let found = m.detect(&text);
            assert!(
                found.iter().any(|x| x.kind == PiiKind::Phone),
                "no phone match in {text:?}: {found:?}"
            );
        }
    }

    #[test]
    fn test_credit_card() {
        let matches = matcher().detect("card 4111-1111-1111-1111 on file");
        let card: Vec<_> = matches
            .iter()
            .filter(|m| m.kind == PiiKind::CreditCard)
            .collect();
        assert_eq!(card.len(), 1);
        assert_eq!(card[0].value, "4111-1111-1111-1111");
        assert_eq!(card[0].confidence, 0.90);
    }

    #[test]
    fn test_zip_codes() {
        let matches = matcher().detect("Minneapolis, MN 55401 or 55402");
        let zips: Vec<_> = matches
            .iter()
            .filter(|m| m.kind == PiiKind::ZipCode)
            .map(|m| m.value.as_str())
            .collect();
        assert_eq!(zips, vec!["55401", "55402"]);
    }

    #[test]
    fn test_overlapping_kinds_are_all_kept() {
        // ZIP+4 also satisfies the unseparated SSN shape
        let text = "ship to 55401-1234";
        let matches = matcher().detect(text);

        let kinds: Vec<_> = matches.iter().map(|m| m.kind).collect();
        assert!(kinds.contains(&PiiKind::Ssn));
        assert!(kinds.contains(&PiiKind::ZipCode));
        assert!(matches[0].overlaps(&matches[1]));
    }

    #[test]
    fn test_sorted_by_start() {
        let text = "55401 then a@b.io then 123-45-6789";
        let matches = matcher().detect(text);
        let starts: Vec<_> = matches.iter().map(|m| m.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(matches[0].kind, PiiKind::ZipCode);
    }

    #[test]
    fn test_email_is_case_insensitive_by_class() {
        let matches = matcher().detect("JANE@EXAMPLE.ORG");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PiiKind::Email);
    }

    #[test]
    fn test_offsets_are_bytes_after_multibyte_text() {
        let text = "naïve café: a@b.io";
        let matches = matcher().detect(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "a@b.io");
    }

    #[test]
    fn test_non_ascii_digits_ignored() {
        assert!(matcher().detect("ref ١٢٣٤٥").is_empty());
        assert!(matcher().detect("tel ١٢٣-٤٥-٦٧٨٩").is_empty());
    }

    #[test]
    fn test_boundary_after_accented_letter() {
        let text = "café12345 and résumé123-45-6789";
        let found: Vec<_> = matcher()
            .detect(text)
            .into_iter()
            .map(|m| (m.kind, m.value))
            .collect();
        assert_eq!(
            found,
            vec![
                (PiiKind::ZipCode, "12345".to_string()),
                (PiiKind::Ssn, "123-45-6789".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let rules = vec![DetectionRule {
            kind: PiiKind::Email,
            pattern: "(unclosed".into(),
            confidence: 0.5,
        }];
        assert!(matches!(
            PatternMatcher::new(&rules),
            Err(RedactError::Config(_))
        ));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let rules = vec![DetectionRule {
            kind: PiiKind::ZipCode,
            pattern: r"\d{5}".into(),
            confidence: 1.5,
        }];
        assert!(PatternMatcher::new(&rules).is_err());
    }

    #[test]
    fn test_kinds_in_declared_order() {
        assert_eq!(
            matcher().kinds(),
            vec![
                PiiKind::Email,
                PiiKind::Ssn,
                PiiKind::Phone,
                PiiKind::CreditCard,
                PiiKind::ZipCode
            ]
        );
    }
}
