use std::collections::BTreeSet;

use regex::Regex;
use serde::Deserialize;

use crate::error::Result;
use crate::models::LedgerRow;

/// Tag fixed by the bank/credit adapter.
pub const CREDIT_TAG: &str = "credit";
/// Tag carried by manual balancing entries.
pub const ADJUST_TAG: &str = "adjust";
/// Fallback when no rule matches.
pub const DEFAULT_TAG: &str = "other";

fn default_match_type() -> String {
    "contains".to_string()
}

/// One ordered matcher -> tag pair from tag_rules.json.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRule {
    pub pattern: String,
    pub tag: String,
    #[serde(default = "default_match_type")]
    pub match_type: String,
}

fn rule_matches(text: &str, rule: &TagRule) -> bool {
    match rule.match_type.as_str() {
        "contains" => text.to_uppercase().contains(&rule.pattern.to_uppercase()),
        "regex" => Regex::new(&rule.pattern)
            .map(|re| re.is_match(text))
            .unwrap_or(false),
        _ => false,
    }
}

/// Ordered rule table, loaded once at startup and immutable for the run.
#[derive(Debug, Clone, Default)]
pub struct TagRuleSet {
    rules: Vec<TagRule>,
}

impl TagRuleSet {
    pub fn new(rules: Vec<TagRule>) -> Self {
        Self { rules }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    /// First matching rule's tag, testing counterparty before note.
    pub fn lookup(&self, counterparty: Option<&str>, note: Option<&str>) -> Option<&str> {
        for text in [counterparty, note].into_iter().flatten() {
            for rule in &self.rules {
                if rule_matches(text, rule) {
                    return Some(&rule.tag);
                }
            }
        }
        None
    }

    /// Resolution order, first match wins: adapter-assigned tag, then the
    /// rule table, then the default. Runs once per row before merge.
    pub fn resolve(&self, row: &LedgerRow) -> String {
        if let Some(tag) = &row.tag {
            return tag.clone();
        }
        self.lookup(row.counterparty.as_deref(), row.note.as_deref())
            .unwrap_or(DEFAULT_TAG)
            .to_string()
    }

    /// Closed tag vocabulary: the fixed tags plus every tag a rule can
    /// assign. Manual updates must stay within this set.
    pub fn vocabulary(&self) -> BTreeSet<String> {
        let mut tags: BTreeSet<String> =
            [CREDIT_TAG, ADJUST_TAG, DEFAULT_TAG].iter().map(|t| t.to_string()).collect();
        tags.extend(self.rules.iter().map(|r| r.tag.clone()));
        tags
    }

    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.vocabulary().contains(tag)
    }
}
