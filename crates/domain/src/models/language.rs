//! Language-keyed text fields.
//!
//! Stored text fields (`description`, `about`, `question`) are maps from
//! language code to string. The map keeps its pairs in JSON document order,
//! so the "first value" fallback used when a requested language is missing
//! is deterministic: first pair in, first pair out.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An ordered sequence of (language, text) pairs, serialized as a JSON map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageMap(Vec<(String, String)>);

impl LanguageMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or replaces the text for a language, keeping first-insert order.
    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        let language = language.into();
        let text = text.into();
        if let Some(entry) = self.0.iter_mut().find(|(lang, _)| *lang == language) {
            entry.1 = text;
        } else {
            self.0.push((language, text));
        }
    }

    /// Returns the text for an exact language match.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, text)| text.as_str())
    }

    /// Returns the text for a language, falling back to the first stored
    /// pair, then to the empty string.
    pub fn resolve(&self, language: &str) -> &str {
        self.get(language)
            .or_else(|| self.0.first().map(|(_, text)| text.as_str()))
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(lang, text)| (lang.as_str(), text.as_str()))
    }
}

impl<L, T> FromIterator<(L, T)> for LanguageMap
where
    L: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        let mut map = LanguageMap::new();
        for (lang, text) in iter {
            map.insert(lang, text);
        }
        map
    }
}

impl Serialize for LanguageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (lang, text) in &self.0 {
            map.serialize_entry(lang, text)?;
        }
        map.end()
    }
}

struct LanguageMapVisitor;

impl<'de> Visitor<'de> for LanguageMapVisitor {
    type Value = LanguageMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of language codes to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = LanguageMap::new();
        while let Some((lang, text)) = access.next_entry::<String, String>()? {
            map.insert(lang, text);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for LanguageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LanguageMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let map: LanguageMap = [("en", "Hello"), ("fr", "Bonjour")].into_iter().collect();
        assert_eq!(map.get("fr"), Some("Bonjour"));
        assert_eq!(map.resolve("fr"), "Bonjour");
    }

    #[test]
    fn test_fallback_is_first_entry() {
        let map: LanguageMap = [("fr", "Bonjour"), ("en", "Hello")].into_iter().collect();
        assert_eq!(map.get("de"), None);
        assert_eq!(map.resolve("de"), "Bonjour");
    }

    #[test]
    fn test_empty_fallback() {
        let map = LanguageMap::new();
        assert_eq!(map.resolve("en"), "");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map: LanguageMap = [("en", "Hello"), ("fr", "Bonjour")].into_iter().collect();
        map.insert("en", "Hi");
        assert_eq!(map.get("en"), Some("Hi"));
        // Replacement must not change the fallback order.
        assert_eq!(map.resolve("de"), "Hi");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let json = r#"{"fr":"Bonjour","en":"Hello","es":"Hola"}"#;
        let map: LanguageMap = serde_json::from_str(json).unwrap();
        assert_eq!(map.resolve("de"), "Bonjour");
        assert_eq!(serde_json::to_string(&map).unwrap(), json);
    }

    #[test]
    fn test_serializes_as_map() {
        let map: LanguageMap = [("en", "Hello")].into_iter().collect();
        let value = serde_json::to_value(&map).unwrap();
        assert!(value.is_object());
        assert_eq!(value["en"], "Hello");
    }
}
