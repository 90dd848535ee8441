//! Rules catalogue: symbolic game-design names ↔ compact numeric codes.
//!
//! Codes are positions inside the catalogue's lists, so the catalogue file
//! is the single source of truth for every code the builder writes.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BuildError, BuildResult};
use crate::model::{
    Family, MAX_EQUIPMENT_SLOTS, MAX_EXTENDED_ATTRIBUTES, MAX_HABILITIES,
    MAX_ITEM_GLOBAL_ATTRIBUTES, MAX_SYMPTOMS,
};

/// A (possibly type-scoped) code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Type(Family),
    /// Classes registered under one type of the family.
    Class(Family, u8),
    /// Local attributes registered under one type of the family.
    Attribute(Family, u8),
    ItemGlobalAttribute,
    ExtendedAttribute,
    Hability,
    Symptom,
    EquipmentSlot,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Type(family) => write!(f, "{family} type"),
            Category::Class(family, ty) => write!(f, "{family} class (type {ty})"),
            Category::Attribute(family, ty) => write!(f, "{family} attribute (type {ty})"),
            Category::ItemGlobalAttribute => f.write_str("item global attribute"),
            Category::ExtendedAttribute => f.write_str("extended attribute"),
            Category::Hability => f.write_str("hability"),
            Category::Symptom => f.write_str("symptom"),
            Category::EquipmentSlot => f.write_str("equipment slot"),
        }
    }
}

/// Queries the compilers make against the catalogue.
pub trait Rules {
    /// Code registered for `name`, compared case-insensitively.
    fn code_of(&self, category: Category, name: &str) -> Option<i32>;

    fn name_of(&self, category: Category, index: usize) -> Option<&str>;

    fn count_of(&self, category: Category) -> usize;

    /// Whether scene objects of this type hold items.
    fn is_container(&self, scene_obj_type: u8) -> bool;
}

/// Resolve `name` to a code inside `[0, count_of(category))`.
///
/// Anything else is fatal: later attribute lookups are scoped by the code.
pub fn resolve(
    rules: &dyn Rules,
    category: Category,
    section: &str,
    key: &str,
    name: &str,
) -> BuildResult<u8> {
    let count = rules.count_of(category);
    rules
        .code_of(category, name)
        .and_then(|code| usize::try_from(code).ok())
        .filter(|code| *code < count)
        .and_then(|code| u8::try_from(code).ok())
        .ok_or_else(|| BuildError::UnknownCode {
            section: section.to_string(),
            key: key.to_string(),
            category: category.to_string(),
            name: name.to_string(),
        })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeRules {
    pub name: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub container: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FamilyRules {
    #[serde(default)]
    pub types: Vec<TypeRules>,
}

/// JSON-backed catalogue.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesCatalogue {
    pub floor: FamilyRules,
    pub wall: FamilyRules,
    pub scene_obj: FamilyRules,
    pub item: FamilyRules,
    pub criature: FamilyRules,
    pub roof: FamilyRules,
    pub item_global_attributes: Vec<String>,
    pub extended_attributes: Vec<String>,
    pub habilities: Vec<String>,
    pub symptoms: Vec<String>,
    pub equipment_slots: Vec<String>,
}

impl RulesCatalogue {
    pub fn load(path: &Path) -> BuildResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> BuildResult<Self> {
        let rules: RulesCatalogue =
            serde_json::from_str(json).map_err(|e| BuildError::Rules(e.to_string()))?;
        rules.check()?;
        Ok(rules)
    }

    fn family(&self, family: Family) -> &FamilyRules {
        match family {
            Family::Floor => &self.floor,
            Family::Wall => &self.wall,
            Family::SceneObj => &self.scene_obj,
            Family::Item => &self.item,
            Family::Criature => &self.criature,
            Family::Roof => &self.roof,
        }
    }

    fn type_rules(&self, family: Family, ty: u8) -> Option<&TypeRules> {
        self.family(family).types.get(ty as usize)
    }

    /// Names registered for a category, empty if the scope is unknown.
    fn names(&self, category: Category) -> Vec<&str> {
        fn strs(v: &[String]) -> Vec<&str> {
            v.iter().map(String::as_str).collect()
        }
        match category {
            Category::Type(family) => self
                .family(family)
                .types
                .iter()
                .map(|t| t.name.as_str())
                .collect(),
            Category::Class(family, ty) => self
                .type_rules(family, ty)
                .map(|t| strs(&t.classes))
                .unwrap_or_default(),
            Category::Attribute(family, ty) => self
                .type_rules(family, ty)
                .map(|t| strs(&t.attributes))
                .unwrap_or_default(),
            Category::ItemGlobalAttribute => strs(&self.item_global_attributes),
            Category::ExtendedAttribute => strs(&self.extended_attributes),
            Category::Hability => strs(&self.habilities),
            Category::Symptom => strs(&self.symptoms),
            Category::EquipmentSlot => strs(&self.equipment_slots),
        }
    }

    /// Every list must fit its engine-wide maximum and hold unique names.
    fn check(&self) -> BuildResult<()> {
        let mut lists: Vec<(Category, usize)> = vec![
            (Category::ItemGlobalAttribute, MAX_ITEM_GLOBAL_ATTRIBUTES),
            (Category::ExtendedAttribute, MAX_EXTENDED_ATTRIBUTES),
            (Category::Hability, MAX_HABILITIES),
            (Category::Symptom, MAX_SYMPTOMS),
            (Category::EquipmentSlot, MAX_EQUIPMENT_SLOTS),
        ];
        for family in Family::ALL {
            let types = self.family(family).types.len();
            if types > u8::MAX as usize {
                return Err(BuildError::Rules(format!(
                    "{types} {family} types registered, at most 255 allowed"
                )));
            }
            lists.push((Category::Type(family), u8::MAX as usize));
            for ty in 0..types as u8 {
                lists.push((Category::Class(family, ty), u8::MAX as usize));
                lists.push((Category::Attribute(family, ty), family.max_attributes()));
            }
        }

        for (category, max) in lists {
            let names = self.names(category);
            if names.len() > max {
                return Err(BuildError::Rules(format!(
                    "{} entries registered as {category}, at most {max} allowed",
                    names.len()
                )));
            }
            let mut seen = HashSet::new();
            for name in names {
                if !seen.insert(name.to_ascii_lowercase()) {
                    return Err(BuildError::Rules(format!(
                        "`{name}` is registered twice as {category}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Rules for RulesCatalogue {
    fn code_of(&self, category: Category, name: &str) -> Option<i32> {
        self.names(category)
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .and_then(|i| i32::try_from(i).ok())
    }

    fn name_of(&self, category: Category, index: usize) -> Option<&str> {
        match category {
            Category::Type(family) => self
                .family(family)
                .types
                .get(index)
                .map(|t| t.name.as_str()),
            Category::Class(family, ty) => self
                .type_rules(family, ty)
                .and_then(|t| t.classes.get(index))
                .map(String::as_str),
            Category::Attribute(family, ty) => self
                .type_rules(family, ty)
                .and_then(|t| t.attributes.get(index))
                .map(String::as_str),
            Category::ItemGlobalAttribute => {
                self.item_global_attributes.get(index).map(String::as_str)
            }
            Category::ExtendedAttribute => self.extended_attributes.get(index).map(String::as_str),
            Category::Hability => self.habilities.get(index).map(String::as_str),
            Category::Symptom => self.symptoms.get(index).map(String::as_str),
            Category::EquipmentSlot => self.equipment_slots.get(index).map(String::as_str),
        }
    }

    fn count_of(&self, category: Category) -> usize {
        self.names(category).len()
    }

    fn is_container(&self, scene_obj_type: u8) -> bool {
        self.type_rules(Family::SceneObj, scene_obj_type)
            .is_some_and(|t| t.container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "scene_obj": { "types": [
            { "name": "Furniture", "classes": ["Table"] },
            { "name": "Chest", "container": true, "classes": ["Wooden", "Iron"], "attributes": ["Lock"] }
        ] },
        "equipment_slots": ["RightHand", "LeftHand"]
    }"#;

    #[test]
    fn codes_are_positions_and_case_insensitive() {
        let rules = RulesCatalogue::from_json(JSON).unwrap();
        let ty = Category::Type(Family::SceneObj);
        assert_eq!(rules.code_of(ty, "chest"), Some(1));
        assert_eq!(rules.code_of(ty, "Barrel"), None);
        assert_eq!(rules.count_of(ty), 2);
        assert_eq!(rules.name_of(Category::Class(Family::SceneObj, 1), 1), Some("Iron"));
        assert_eq!(rules.count_of(Category::Class(Family::SceneObj, 7)), 0);
        assert_eq!(rules.count_of(Category::EquipmentSlot), 2);
    }

    #[test]
    fn container_comes_from_the_type() {
        let rules = RulesCatalogue::from_json(JSON).unwrap();
        assert!(!rules.is_container(0));
        assert!(rules.is_container(1));
        assert!(!rules.is_container(9));
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let rules = RulesCatalogue::from_json(JSON).unwrap();
        let cat = Category::Class(Family::SceneObj, 0);
        assert_eq!(resolve(&rules, cat, "Obj", "Class", "TABLE").unwrap(), 0);
        let err = resolve(&rules, cat, "Obj", "Class", "Iron").unwrap_err();
        assert!(matches!(err, BuildError::UnknownCode { .. }), "{err}");
    }

    #[test]
    fn oversized_or_duplicate_lists_are_rejected() {
        let too_many = r#"{ "floor": { "types": [
            { "name": "Grass", "attributes": ["a", "b", "c", "d", "e"] } ] } }"#;
        assert!(RulesCatalogue::from_json(too_many).is_err());

        let dup = r#"{ "habilities": ["Steal", "steal"] }"#;
        assert!(RulesCatalogue::from_json(dup).is_err());
    }
}
