//! fOS CSS Style System
//!
//! Inline declaration parsing, user-agent defaults and computed style
//! resolution for the properties visibility checks depend on.

mod parser;
mod cascade;
mod computed;
pub mod properties;

pub use parser::CssParser;
pub use cascade::StyleResolver;
pub use computed::ComputedStyle;
pub use properties::PropertyId;

/// Parse the body of a `style` attribute
pub fn parse_declarations(css: &str) -> Result<Vec<Declaration>, CssError> {
    CssParser::new().parse_declarations(css)
}

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercase property name
    pub property: String,
    /// Serialized value
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str) -> Self {
        Self {
            property: property.to_ascii_lowercase(),
            value: value.to_string(),
            important: false,
        }
    }
}

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },
}
