//! CSS Property Definitions
//!
//! Properties with known initial values and inheritance behaviour. Any other
//! property is carried through by name without interpretation.

/// Property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyId {
    Display,
    Visibility,
    Opacity,
    Overflow,
    Position,
    Color,
}

impl PropertyId {
    /// Every property with a known initial value
    pub const ALL: [PropertyId; 6] = [
        Self::Display,
        Self::Visibility,
        Self::Opacity,
        Self::Overflow,
        Self::Position,
        Self::Color,
    ];

    /// Parse a property name into a PropertyId
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "display" => Self::Display,
            "visibility" => Self::Visibility,
            "opacity" => Self::Opacity,
            "overflow" => Self::Overflow,
            "position" => Self::Position,
            "color" => Self::Color,
            _ => return None,
        })
    }

    /// CSS property name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Visibility => "visibility",
            Self::Opacity => "opacity",
            Self::Overflow => "overflow",
            Self::Position => "position",
            Self::Color => "color",
        }
    }

    /// Whether the computed value passes from parent to child by default
    pub fn is_inherited(&self) -> bool {
        matches!(self, Self::Visibility | Self::Color)
    }

    /// Initial value as serialized CSS
    pub fn initial_value(&self) -> &'static str {
        match self {
            Self::Display => "inline",
            Self::Visibility => "visible",
            Self::Opacity => "1",
            Self::Overflow => "visible",
            Self::Position => "static",
            Self::Color => "canvastext",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for id in PropertyId::ALL {
            assert_eq!(PropertyId::from_name(id.name()), Some(id));
        }
        assert_eq!(PropertyId::from_name("Visibility"), Some(PropertyId::Visibility));
        assert_eq!(PropertyId::from_name("--custom"), None);
    }

    #[test]
    fn test_inheritance() {
        assert!(PropertyId::Visibility.is_inherited());
        assert!(!PropertyId::Display.is_inherited());
    }
}
