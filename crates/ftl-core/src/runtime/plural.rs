//! CLDR plural categories

use std::fmt;

use dashmap::DashMap;
use intl_pluralrules::{PluralCategory as CldrCategory, PluralRuleType, PluralRules as CldrRules};
use serde::{Deserialize, Serialize};
use tracing::debug;
use unic_langid::LanguageIdentifier;

use super::value::NumberValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// Name as written in a variant key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CldrCategory> for PluralCategory {
    fn from(category: CldrCategory) -> Self {
        match category {
            CldrCategory::ZERO => PluralCategory::Zero,
            CldrCategory::ONE => PluralCategory::One,
            CldrCategory::TWO => PluralCategory::Two,
            CldrCategory::FEW => PluralCategory::Few,
            CldrCategory::MANY => PluralCategory::Many,
            CldrCategory::OTHER => PluralCategory::Other,
        }
    }
}

/// Cardinal ("3 items") or ordinal ("3rd item") rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralKind {
    #[default]
    Cardinal,
    Ordinal,
}

impl PluralKind {
    fn rule_type(self) -> PluralRuleType {
        match self {
            PluralKind::Cardinal => PluralRuleType::CARDINAL,
            PluralKind::Ordinal => PluralRuleType::ORDINAL,
        }
    }
}

/// Plural category oracle used by select expressions.
pub trait PluralRules: Send + Sync {
    fn category_for(&self, number: &NumberValue, locale: &LanguageIdentifier) -> PluralCategory;
}

/// CLDR rules from `intl_pluralrules`, loaded once per locale and kind.
///
/// Unsupported locales fall back to their bare language, then to
/// [`PluralCategory::Other`] for every number.
#[derive(Default)]
pub struct CldrPluralRules {
    cache: DashMap<(LanguageIdentifier, PluralKind), Option<CldrRules>>,
}

impl CldrPluralRules {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(locale: &LanguageIdentifier, kind: PluralKind) -> Option<CldrRules> {
        if let Ok(rules) = CldrRules::create(locale.clone(), kind.rule_type()) {
            return Some(rules);
        }
        let language = LanguageIdentifier::from_parts(locale.language, None, None, &[]);
        match CldrRules::create(language, kind.rule_type()) {
            Ok(rules) => Some(rules),
            Err(err) => {
                debug!("No {:?} plural rules for {}: {}", kind, locale, err);
                None
            }
        }
    }
}

impl fmt::Debug for CldrPluralRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CldrPluralRules")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl PluralRules for CldrPluralRules {
    fn category_for(&self, number: &NumberValue, locale: &LanguageIdentifier) -> PluralCategory {
        let kind = number.options.kind;
        let entry = self
            .cache
            .entry((locale.clone(), kind))
            .or_insert_with(|| Self::load(locale, kind));
        let Some(rules) = entry.value() else {
            return PluralCategory::Other;
        };

        let formatted = number.format();
        let operand = formatted.trim_start_matches('-');
        rules
            .select(operand)
            .map(PluralCategory::from)
            .unwrap_or(PluralCategory::Other)
    }
}
