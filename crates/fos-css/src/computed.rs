//! Computed style values

use std::collections::BTreeMap;

use crate::Declaration;
use crate::properties::PropertyId;

/// Style values for one element, keyed by lowercase property name.
///
/// Depending on how it was produced this is either the computed view
/// (inheritance applied) or the specified view, which may still hold the
/// literal `inherit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    values: BTreeMap<String, String>,
}

impl ComputedStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style holding the initial value of every known property
    pub fn initial() -> Self {
        let mut style = Self::new();
        for id in PropertyId::ALL {
            style.set(id.name(), id.initial_value());
        }
        style
    }

    /// Value of a property, if present
    pub fn get(&self, property: &str) -> Option<&str> {
        match self.values.get(property) {
            Some(v) => Some(v.as_str()),
            None => self.values.get(&property.to_ascii_lowercase()).map(String::as_str),
        }
    }

    /// Value of a known property
    pub fn value(&self, id: PropertyId) -> Option<&str> {
        self.values.get(id.name()).map(String::as_str)
    }

    pub fn set(&mut self, property: &str, value: &str) {
        self.values.insert(property.to_ascii_lowercase(), value.to_string());
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.values.remove(&property.to_ascii_lowercase())
    }

    /// Apply a declaration, overriding any earlier value
    pub fn apply_declaration(&mut self, decl: &Declaration) {
        self.set(&decl.property, &decl.value);
    }

    /// `display`, defaulting to the initial value
    pub fn display(&self) -> &str {
        self.value(PropertyId::Display).unwrap_or(PropertyId::Display.initial_value())
    }

    /// `visibility`, defaulting to the initial value
    pub fn visibility(&self) -> &str {
        self.value(PropertyId::Visibility).unwrap_or(PropertyId::Visibility.initial_value())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ComputedStyle {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (property, value) in iter {
            style.set(property, value);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let style = ComputedStyle::initial();
        assert_eq!(style.display(), "inline");
        assert_eq!(style.visibility(), "visible");
        assert_eq!(style.get("opacity"), Some("1"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let style: ComputedStyle = [("Display", "none")].into_iter().collect();
        assert_eq!(style.get("display"), Some("none"));
        assert_eq!(style.get("DISPLAY"), Some("none"));
        assert_eq!(style.get("visibility"), None);
        assert_eq!(style.visibility(), "visible");
    }
}
