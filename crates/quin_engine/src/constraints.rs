//! Category constraint validator.
//!
//! Rejects questions whose predicate cannot apply to the category's
//! entity kind: material questions for people, political questions for
//! animals, biological questions for inanimate objects. Patterns come
//! from the category pack and are also used to sanity-check externally
//! supplied "recommended" questions before they are surfaced.

use regex::Regex;
use tracing::{debug, warn};

use crate::registry::CategoryPack;

/// Compiled forbidden-pattern matcher for one category.
#[derive(Debug)]
pub struct ConstraintValidator {
    category: String,
    patterns: Vec<Regex>,
    appropriate_domains: Vec<String>,
}

impl ConstraintValidator {
    /// Compile a pack's forbidden patterns.
    ///
    /// Registry loading already validates custom packs, so a compile
    /// failure here means a hand-built pack; the bad pattern is skipped
    /// with a warning rather than failing the game turn.
    pub fn for_pack(pack: &CategoryPack) -> Self {
        let mut patterns = Vec::with_capacity(pack.forbidden_patterns.len());
        for raw in &pack.forbidden_patterns {
            match Regex::new(raw) {
                Ok(re) => patterns.push(re),
                Err(e) => {
                    warn!(
                        "Constraints: skipping bad pattern '{}' for '{}': {}",
                        raw, pack.name, e
                    );
                }
            }
        }
        Self {
            category: pack.name.clone(),
            patterns,
            appropriate_domains: pack.appropriate_domains.clone(),
        }
    }

    /// True when the question is applicable to this category.
    pub fn validate(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        for pattern in &self.patterns {
            if pattern.is_match(&lowered) {
                debug!(
                    "Constraints: '{}' rejected for '{}' by /{}/",
                    text, self.category, pattern
                );
                return false;
            }
        }
        true
    }

    /// Canonical predicate domains that make sense for this category.
    pub fn appropriate_domains(&self) -> &[String] {
        &self.appropriate_domains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CategoryRegistry;

    fn validator(category: &str) -> ConstraintValidator {
        let registry = CategoryRegistry::builtin();
        ConstraintValidator::for_pack(registry.pack(category))
    }

    #[test]
    fn test_material_questions_rejected_for_people() {
        let v = validator("world leaders");
        assert!(!v.validate("Is it made of metal?"));
        assert!(!v.validate("Does it run on a battery?"));
        assert!(!v.validate("What colour is it?"));
    }

    #[test]
    fn test_geography_questions_allowed_for_people() {
        let v = validator("world leaders");
        assert!(v.validate("Are they from Europe?"));
        assert!(v.validate("Are they still alive?"));
    }

    #[test]
    fn test_political_questions_rejected_for_animals() {
        let v = validator("animals");
        assert!(!v.validate("Were they elected president?"));
        assert!(!v.validate("Is their career in politics?"));
        assert!(v.validate("Is it a mammal?"));
    }

    #[test]
    fn test_biological_questions_rejected_for_objects() {
        let v = validator("objects");
        assert!(!v.validate("Is it alive?"));
        assert!(!v.validate("Does it eat plants?"));
        assert!(v.validate("Is it made of metal?"));
    }

    #[test]
    fn test_default_pack_allows_everything() {
        let v = validator("unheard-of category");
        assert!(v.validate("Is it made of metal?"));
        assert!(v.validate("Is it alive?"));
    }
}
