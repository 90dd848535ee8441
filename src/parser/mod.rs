//! Structured text reader: section/key documents with typed accessors.
//!
//! A document is a set of named sections, each a set of `key = value`
//! entries. Names and keys are compared case-insensitively; the original
//! spelling is kept for diagnostics and for anything written to disk.

pub mod lexer;
pub mod value;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{BuildError, ParseError, ReadError};
use lexer::{Lexer, Token};
pub use value::{Alpha, FromValue, Ident, Position, Rgb};

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: String,
    line: usize,
}

/// One `[Section]` of a document.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    entries: HashMap<String, Entry>,
}

impl Section {
    fn new(name: String) -> Self {
        Self {
            name,
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Optional read: `Ok(None)` when the key is absent, an error when it is
    /// present but cannot be read as `T`.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<Option<T>, ReadError> {
        let Some(entry) = self.entries.get(&key.to_ascii_lowercase()) else {
            return Ok(None);
        };
        T::from_value(&entry.value)
            .map(Some)
            .ok_or_else(|| ReadError::Malformed {
                section: self.name.clone(),
                key: entry.key.clone(),
                expected: T::EXPECTED,
                found: entry.value.clone(),
                line: entry.line,
            })
    }

    /// Optional read falling back to `default` when the key is absent.
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> Result<T, ReadError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Mandatory read.
    pub fn require<T: FromValue>(&self, key: &str) -> Result<T, ReadError> {
        self.get(key)?.ok_or_else(|| ReadError::MissingKey {
            section: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// `(key, value)` pairs in source order.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.line);
        entries
            .into_iter()
            .map(|e| (e.key.as_str(), e.value.as_str()))
            .collect()
    }

    /// Whether any key starts with `prefix` (case-insensitive).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.to_ascii_lowercase();
        self.entries.keys().any(|k| k.starts_with(&prefix))
    }
}

/// A parsed source document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    // keyed by lower-cased name; BTreeMap gives a stable iteration order
    sections: BTreeMap<String, Section>,
}

impl Document {
    pub fn parse(src: &str) -> Result<Document, ParseError> {
        let mut doc = Document::default();
        let mut current: Option<String> = None;

        for tok in Lexer::new(src) {
            let (line, tok) = tok.map_err(|e| ParseError {
                line: e.line,
                message: e.message,
            })?;

            match tok {
                Token::Section(name) => {
                    let folded = name.to_ascii_lowercase();
                    if doc.sections.contains_key(&folded) {
                        return Err(ParseError {
                            line,
                            message: format!("duplicate section [{name}]"),
                        });
                    }
                    doc.sections.insert(folded.clone(), Section::new(name));
                    current = Some(folded);
                }
                Token::Entry { key, value } => {
                    let section = current
                        .as_ref()
                        .and_then(|s| doc.sections.get_mut(s))
                        .ok_or_else(|| ParseError {
                            line,
                            message: format!("`{key}` appears before any section"),
                        })?;
                    let folded = key.to_ascii_lowercase();
                    if section.entries.contains_key(&folded) {
                        return Err(ParseError {
                            line,
                            message: format!("duplicate key `{key}` in [{}]", section.name),
                        });
                    }
                    section.entries.insert(folded, Entry { key, value, line });
                }
            }
        }

        Ok(doc)
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Document, BuildError> {
        let src = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Document::parse(&src).map_err(|source| BuildError::Parse {
            file: path.to_path_buf(),
            source,
        })
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(&name.to_ascii_lowercase())
    }

    /// Mandatory section lookup.
    pub fn require_section(&self, name: &str) -> Result<&Section, ReadError> {
        self.section(name).ok_or_else(|| ReadError::MissingSection {
            section: name.to_string(),
        })
    }

    /// All sections, ordered by case-folded name.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.values().map(Section::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "
[wall.Stone]
Animation = stone_anim
Interactive = yes
Attribute[Hardness] = 12

[Floor.Grass]
Name = \"Grass\"
";

    #[test]
    fn sections_iterate_case_insensitively_sorted() {
        let doc = Document::parse(SRC).unwrap();
        let names: Vec<_> = doc.section_names().collect();
        assert_eq!(names, vec!["Floor.Grass", "wall.Stone"]);
    }

    #[test]
    fn optional_reads_distinguish_absent_from_malformed() {
        let doc = Document::parse(SRC).unwrap();
        let wall = doc.section("WALL.STONE").unwrap();

        assert_eq!(wall.get::<bool>("interactive"), Ok(Some(true)));
        assert_eq!(wall.get::<bool>("Transparent"), Ok(None));
        assert_eq!(wall.get_or::<i64>("attribute[hardness]", 0), Ok(12));

        let err = wall.get::<i64>("Animation").unwrap_err();
        assert!(matches!(err, ReadError::Malformed { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn mandatory_read_reports_missing_key() {
        let doc = Document::parse(SRC).unwrap();
        let floor = doc.section("floor.grass").unwrap();
        assert_eq!(
            floor.require::<String>("Animation"),
            Err(ReadError::MissingKey {
                section: "Floor.Grass".into(),
                key: "Animation".into()
            })
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        assert!(Document::parse("[A]\n[a]").is_err());
        assert!(Document::parse("[A]\nX = 1\nx = 2").is_err());
        assert!(Document::parse("X = 1").is_err());
    }

    #[test]
    fn entries_keep_source_order() {
        let doc = Document::parse(SRC).unwrap();
        let wall = doc.section("wall.stone").unwrap();
        let keys: Vec<_> = wall.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Animation", "Interactive", "Attribute[Hardness]"]);
    }
}
