//! Immutable category registry.
//!
//! Everything the engine knows about a category lives in one
//! [`CategoryPack`]: the candidate question pool, inference rules,
//! forbidden predicate patterns, guess thresholds, and fallback
//! templates. Packs are plain data keyed by category name - adding a
//! category never touches engine control flow. Custom packs can be
//! merged over the built-ins from TOML.

use std::collections::BTreeMap;

use quin_common::Answer;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What kind of entity a category's members are. Drives guess casing
/// and which predicate families are definitionally applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Animal,
    Object,
    Generic,
}

/// One canonical yes/no question template in a category's pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolQuestion {
    pub text: String,
    /// Sub-population labels eliminated when the answer is Yes.
    #[serde(default)]
    pub eliminates_on_yes: Vec<String>,
    /// Sub-population labels eliminated when the answer is No.
    #[serde(default)]
    pub eliminates_on_no: Vec<String>,
    /// Prior estimate of the fraction of category members that satisfy
    /// the predicate. A ranking input, not a calibrated probability.
    pub split_ratio: f64,
    #[serde(default)]
    pub priority: i32,
}

/// Maps a confirmed answer about a keyword to derived atomic predicates.
/// Rules are purely additive; later rules never retract earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRule {
    /// Rule fires when the question contains any of these keywords.
    pub keywords: Vec<String>,
    /// Polarity the rule fires on (Yes or No).
    pub on: Answer,
    pub predicates: Vec<String>,
}

/// Thresholds controlling the Questioning -> Guessing transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessThresholds {
    pub min_questions: usize,
    pub max_remaining: usize,
    pub late_game_threshold: usize,
}

impl Default for GuessThresholds {
    fn default() -> Self {
        Self {
            min_questions: 6,
            max_remaining: 2,
            late_game_threshold: 12,
        }
    }
}

/// Fallback question template with a single `{slot}` placeholder,
/// filled from the pack's slot value lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackTemplate {
    pub text: String,
    pub slot: String,
}

/// Extra semantic-group cluster contributed by a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticGroup {
    pub name: String,
    pub words: Vec<String>,
}

/// Complete per-category data pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPack {
    pub name: String,
    pub entity_kind: EntityKind,
    #[serde(default)]
    pub pool: Vec<PoolQuestion>,
    #[serde(default)]
    pub inference_rules: Vec<InferenceRule>,
    /// Regex patterns for predicates definitionally inapplicable to
    /// this category's entity kind.
    #[serde(default)]
    pub forbidden_patterns: Vec<String>,
    /// Predicate domains that make sense for this category. Named
    /// after built-in semantic groups where one exists.
    #[serde(default)]
    pub appropriate_domains: Vec<String>,
    #[serde(default)]
    pub thresholds: GuessThresholds,
    #[serde(default)]
    pub fallback_templates: Vec<FallbackTemplate>,
    #[serde(default)]
    pub slot_values: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub semantic_groups: Vec<SemanticGroup>,
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid category pack TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("invalid forbidden pattern '{pattern}' in category '{category}': {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("split ratio {ratio} out of (0, 1) for '{question}' in category '{category}'")]
    SplitRatioOutOfRange {
        category: String,
        question: String,
        ratio: f64,
    },
}

/// Immutable mapping from category name to its pack, with a generic
/// default pack for unknown categories.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    packs: BTreeMap<String, CategoryPack>,
    default_pack: CategoryPack,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// On-disk shape for custom packs: repeated `[[category]]` tables.
#[derive(Debug, Deserialize)]
struct PackFile {
    #[serde(default)]
    category: Vec<CategoryPack>,
}

impl CategoryRegistry {
    /// Registry with the built-in packs: animals, world leaders,
    /// objects, plus the generic default.
    pub fn builtin() -> Self {
        let mut packs = BTreeMap::new();
        for pack in [animals_pack(), world_leaders_pack(), objects_pack()] {
            packs.insert(pack.name.clone(), pack);
        }
        Self {
            packs,
            default_pack: generic_pack(),
        }
    }

    /// Built-ins plus custom packs parsed from TOML. Custom packs are
    /// validated (regex compile, split ratio range) and override
    /// built-ins with the same name.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::builtin();
        registry.merge_toml_str(toml_str)?;
        Ok(registry)
    }

    /// Merge custom packs into this registry. Fails fast on malformed
    /// pack data - this is the config boundary, not game input.
    pub fn merge_toml_str(&mut self, toml_str: &str) -> Result<(), RegistryError> {
        let file: PackFile = toml::from_str(toml_str)?;
        for pack in file.category {
            validate_pack(&pack)?;
            self.packs.insert(pack.name.clone(), pack);
        }
        Ok(())
    }

    /// Pack for a category, or the generic default for unknown names.
    /// Unknown categories degrade, they never fail.
    pub fn pack(&self, category: &str) -> &CategoryPack {
        let key = category.trim().to_lowercase();
        match self.packs.get(&key) {
            Some(pack) => pack,
            None => {
                warn!("Registry: unknown category '{}', using default pack", category);
                &self.default_pack
            }
        }
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(|k| k.as_str())
    }
}

fn validate_pack(pack: &CategoryPack) -> Result<(), RegistryError> {
    for pattern in &pack.forbidden_patterns {
        if let Err(source) = regex::Regex::new(pattern) {
            return Err(RegistryError::InvalidPattern {
                category: pack.name.clone(),
                pattern: pattern.clone(),
                source,
            });
        }
    }
    for q in &pack.pool {
        if !(q.split_ratio > 0.0 && q.split_ratio < 1.0) {
            return Err(RegistryError::SplitRatioOutOfRange {
                category: pack.name.clone(),
                question: q.text.clone(),
                ratio: q.split_ratio,
            });
        }
    }
    Ok(())
}

// === Built-in packs ===
//
// Keyword tables and split ratios are versioned data: behavioral parity
// (including known quirks) matters more than linguistic completeness.

fn pool(entries: &[(&str, &[&str], &[&str], f64, i32)]) -> Vec<PoolQuestion> {
    entries
        .iter()
        .map(|(text, on_yes, on_no, split_ratio, priority)| PoolQuestion {
            text: text.to_string(),
            eliminates_on_yes: on_yes.iter().map(|s| s.to_string()).collect(),
            eliminates_on_no: on_no.iter().map(|s| s.to_string()).collect(),
            split_ratio: *split_ratio,
            priority: *priority,
        })
        .collect()
}

fn rules(entries: &[(&[&str], Answer, &[&str])]) -> Vec<InferenceRule> {
    entries
        .iter()
        .map(|(keywords, on, predicates)| InferenceRule {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            on: *on,
            predicates: predicates.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

fn templates(entries: &[(&str, &str)]) -> Vec<FallbackTemplate> {
    entries
        .iter()
        .map(|(text, slot)| FallbackTemplate {
            text: text.to_string(),
            slot: slot.to_string(),
        })
        .collect()
}

fn slots(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(slot, values)| {
            (
                slot.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn animals_pack() -> CategoryPack {
    CategoryPack {
        name: "animals".to_string(),
        entity_kind: EntityKind::Animal,
        pool: pool(&[
            ("Is it a mammal?", &["birds", "reptiles", "fish"], &["mammals"], 0.4, 10),
            ("Is it larger than a person?", &["small animals"], &["large animals"], 0.3, 9),
            ("Does it live in water?", &["land animals"], &["aquatic animals"], 0.2, 8),
            ("Does it eat other animals?", &["herbivores"], &["carnivores"], 0.35, 7),
            ("Can it fly?", &["flightless animals"], &["flying animals"], 0.25, 7),
            ("Is it commonly kept as a pet?", &["wild animals"], &["pets"], 0.3, 6),
            ("Is it a reptile?", &["mammals", "birds", "fish"], &["reptiles"], 0.15, 5),
        ]),
        inference_rules: rules(&[
            (
                &["mammal"],
                Answer::Yes,
                &["is_animal", "is_living", "not_bird", "not_reptile", "not_fish"],
            ),
            (&["mammal"], Answer::No, &["not_mammal"]),
            (
                &["bird"],
                Answer::Yes,
                &["is_animal", "is_living", "is_bird", "not_mammal", "not_reptile", "not_fish"],
            ),
            (&["bird"], Answer::No, &["not_bird"]),
            (
                &["reptile"],
                Answer::Yes,
                &["is_animal", "is_living", "is_reptile", "not_mammal", "not_bird", "not_fish"],
            ),
            (&["reptile"], Answer::No, &["not_reptile"]),
            (
                &["fish"],
                Answer::Yes,
                &["is_animal", "is_living", "is_fish", "lives_in_water", "not_mammal", "not_bird", "not_reptile"],
            ),
            (&["fish"], Answer::No, &["not_fish"]),
            (&["fly"], Answer::Yes, &["can_fly"]),
            (&["fly"], Answer::No, &["cannot_fly"]),
            (&["water", "ocean", "sea"], Answer::Yes, &["lives_in_water"]),
            (&["water", "ocean", "sea"], Answer::No, &["not_aquatic"]),
            (&["pet", "domestic"], Answer::Yes, &["is_domestic"]),
            (&["pet", "domestic"], Answer::No, &["not_domestic"]),
            (&["living", "alive"], Answer::No, &["not_animal", "not_plant"]),
        ]),
        forbidden_patterns: strings(&[
            r"\b(president|prime minister|elected|politic\w*|government)\b",
            r"\b(career|job|profession|salary)\b",
            r"\b(married|spouse|divorced)\b",
        ]),
        appropriate_domains: strings(&[
            "habitat",
            "size",
            "diet",
            "animal_class",
            "domesticity",
        ]),
        thresholds: GuessThresholds::default(),
        fallback_templates: templates(&[
            ("Does it live in {habitat}?", "habitat"),
            ("Is it known for its {trait}?", "trait"),
        ]),
        slot_values: slots(&[
            (
                "habitat",
                &["the ocean", "a forest", "the desert", "grasslands", "the mountains"],
            ),
            ("trait", &["speed", "strength", "intelligence", "coloring"]),
        ]),
        semantic_groups: Vec::new(),
    }
}

fn world_leaders_pack() -> CategoryPack {
    CategoryPack {
        name: "world leaders".to_string(),
        entity_kind: EntityKind::Person,
        pool: pool(&[
            ("Are they still alive?", &["deceased leaders"], &["living leaders"], 0.3, 10),
            ("Are they from Europe?", &["non-European leaders"], &["European leaders"], 0.35, 9),
            ("Did they lead their country during a war?", &["peacetime leaders"], &["wartime leaders"], 0.4, 8),
            ("Are they a woman?", &["male leaders"], &["female leaders"], 0.2, 8),
            ("Did they hold office in the last fifty years?", &["historical leaders"], &["recent leaders"], 0.5, 7),
            ("Were they elected democratically?", &["unelected leaders"], &["elected leaders"], 0.5, 6),
            ("Did they lead a country in Asia?", &["non-Asian leaders"], &["Asian leaders"], 0.25, 5),
        ]),
        inference_rules: rules(&[
            (&["alive", "living"], Answer::Yes, &["is_living", "is_person"]),
            (&["alive", "living"], Answer::No, &["is_deceased", "is_person"]),
            (&["woman", "female"], Answer::Yes, &["is_female"]),
            (&["woman", "female"], Answer::No, &["is_male"]),
            (&["europe"], Answer::Yes, &["from_europe", "not_asia", "not_africa", "not_america"]),
            (&["europe"], Answer::No, &["not_europe"]),
            (&["asia"], Answer::Yes, &["from_asia", "not_europe", "not_africa", "not_america"]),
            (&["asia"], Answer::No, &["not_asia"]),
            (&["war"], Answer::Yes, &["wartime_leader"]),
            (&["war"], Answer::No, &["peacetime_leader"]),
            (&["elected", "democrat"], Answer::Yes, &["democratic_leader"]),
            (&["elected", "democrat"], Answer::No, &["not_democratic"]),
        ]),
        forbidden_patterns: strings(&[
            r"\bmade of\b",
            r"\b(metal|plastic|wood|wooden|glass|material)\b",
            r"\b(electronic|electricity|battery|plug)\b",
            r"\bcolou?r\b",
            r"\b(mammal|reptile|species|breed)\b",
            r"\bfit in\b",
        ]),
        appropriate_domains: strings(&[
            "geography",
            "era",
            "gender",
            "leadership",
            "achievement",
            "life_status",
        ]),
        thresholds: GuessThresholds {
            min_questions: 5,
            max_remaining: 2,
            late_game_threshold: 12,
        },
        fallback_templates: templates(&[
            ("Did they serve in the {decade}?", "decade"),
            ("Are they known for {achievement}?", "achievement"),
            ("Did they lead a country in {region}?", "region"),
        ]),
        slot_values: slots(&[
            ("decade", &["1940s", "1960s", "1980s", "2000s"]),
            (
                "achievement",
                &["a major reform", "winning a war", "a peace agreement", "an economic boom"],
            ),
            (
                "region",
                &["Africa", "South America", "the Middle East", "Scandinavia"],
            ),
        ]),
        semantic_groups: Vec::new(),
    }
}

fn objects_pack() -> CategoryPack {
    CategoryPack {
        name: "objects".to_string(),
        entity_kind: EntityKind::Object,
        pool: pool(&[
            ("Is it electronic?", &["non-electronic objects"], &["electronics"], 0.4, 10),
            ("Can you hold it in one hand?", &["large objects"], &["handheld objects"], 0.5, 9),
            ("Is it found in most households?", &["specialty objects"], &["household objects"], 0.45, 8),
            ("Is it made of metal?", &["non-metal objects"], &["metal objects"], 0.35, 7),
            ("Is it used for entertainment?", &["practical objects"], &["entertainment objects"], 0.3, 6),
            ("Is it older than a hundred years as an invention?", &["modern inventions"], &["old inventions"], 0.2, 5),
        ]),
        inference_rules: rules(&[
            (
                &["electronic", "electricity"],
                Answer::Yes,
                &["is_electronic", "is_artificial", "not_living"],
            ),
            (&["electronic", "electricity"], Answer::No, &["not_electronic"]),
            (&["metal"], Answer::Yes, &["is_metal"]),
            (&["metal"], Answer::No, &["not_metal"]),
            (&["hand"], Answer::Yes, &["is_small"]),
            (&["hand"], Answer::No, &["is_large"]),
            (&["household"], Answer::Yes, &["is_household"]),
            (&["household"], Answer::No, &["not_household"]),
            (&["living", "alive"], Answer::No, &["not_animal", "not_plant"]),
        ]),
        forbidden_patterns: strings(&[
            r"\b(alive|living|breathe\w*|die|dies)\b",
            r"\b(eat|eats|diet|carnivore|herbivore)\b",
            r"\b(mammal|reptile|bird|fish|species)\b",
            r"\b(married|elected|politic\w*)\b",
        ]),
        appropriate_domains: strings(&["size", "material", "electronics", "function", "color"]),
        thresholds: GuessThresholds::default(),
        fallback_templates: templates(&[
            ("Would you find it in {room}?", "room"),
            ("Is it mostly made of {material}?", "material"),
        ]),
        slot_values: slots(&[
            ("room", &["a kitchen", "an office", "a garage", "a bathroom"]),
            ("material", &["plastic", "metal", "wood", "glass"]),
        ]),
        semantic_groups: Vec::new(),
    }
}

fn generic_pack() -> CategoryPack {
    CategoryPack {
        name: "default".to_string(),
        entity_kind: EntityKind::Generic,
        pool: pool(&[
            ("Is it a living thing?", &["inanimate things"], &["living things"], 0.5, 10),
            ("Is it man-made?", &["natural things"], &["man-made things"], 0.5, 9),
            ("Is it bigger than a microwave?", &["small things"], &["big things"], 0.45, 8),
            ("Would most people recognize it?", &["obscure things"], &["famous things"], 0.7, 6),
            ("Is it associated with a particular country?", &["global things"], &["local things"], 0.4, 5),
        ]),
        inference_rules: rules(&[
            (&["living", "alive"], Answer::Yes, &["is_living"]),
            (&["living", "alive"], Answer::No, &["not_animal", "not_plant"]),
            (&["man-made", "manmade"], Answer::Yes, &["is_artificial", "not_living"]),
            (&["man-made", "manmade"], Answer::No, &["is_natural"]),
        ]),
        forbidden_patterns: Vec::new(),
        appropriate_domains: strings(&["size", "function", "geography"]),
        thresholds: GuessThresholds::default(),
        fallback_templates: templates(&[("Is it associated with {context}?", "context")]),
        slot_values: slots(&[("context", &["work", "leisure", "travel", "nature"])]),
        semantic_groups: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_categories_present() {
        let reg = CategoryRegistry::builtin();
        let names: Vec<&str> = reg.category_names().collect();
        assert!(names.contains(&"animals"));
        assert!(names.contains(&"world leaders"));
        assert!(names.contains(&"objects"));
    }

    #[test]
    fn test_unknown_category_degrades_to_default() {
        let reg = CategoryRegistry::builtin();
        let pack = reg.pack("submarine sandwiches");
        assert_eq!(pack.name, "default");
        assert_eq!(pack.entity_kind, EntityKind::Generic);
        assert!(!pack.pool.is_empty());
    }

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        let reg = CategoryRegistry::builtin();
        assert_eq!(reg.pack("World Leaders").name, "world leaders");
        assert_eq!(reg.pack("  ANIMALS ").name, "animals");
    }

    #[test]
    fn test_builtin_packs_pass_validation() {
        let reg = CategoryRegistry::builtin();
        for name in ["animals", "world leaders", "objects", "nonsense"] {
            validate_pack(reg.pack(name)).expect("builtin pack must validate");
        }
    }

    #[test]
    fn test_merge_custom_pack_from_toml() {
        let toml_str = r#"
            [[category]]
            name = "capital cities"
            entity_kind = "generic"
            appropriate_domains = ["geography", "size"]

            [[category.pool]]
            text = "Is it in Europe?"
            split_ratio = 0.3
            priority = 10

            [[category.inference_rules]]
            keywords = ["europe"]
            on = "yes"
            predicates = ["in_europe"]
        "#;
        let reg = CategoryRegistry::from_toml_str(toml_str).expect("valid pack");
        let pack = reg.pack("capital cities");
        assert_eq!(pack.pool.len(), 1);
        assert_eq!(pack.thresholds.min_questions, 6);
    }

    #[test]
    fn test_bad_regex_in_custom_pack_is_rejected() {
        let toml_str = r#"
            [[category]]
            name = "broken"
            entity_kind = "object"
            forbidden_patterns = ["[unclosed"]
        "#;
        let err = CategoryRegistry::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPattern { .. }));
    }

    #[test]
    fn test_out_of_range_split_ratio_is_rejected() {
        let toml_str = r#"
            [[category]]
            name = "broken"
            entity_kind = "object"

            [[category.pool]]
            text = "Is it impossible?"
            split_ratio = 1.5
        "#;
        let err = CategoryRegistry::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, RegistryError::SplitRatioOutOfRange { .. }));
    }
}
