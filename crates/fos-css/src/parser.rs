//! CSS Parser using lightningcss
//!
//! Parses declaration blocks into our internal representation.

use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::stylesheet::ParserOptions;

use crate::{CssError, Declaration};

/// CSS Parser
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a declaration block such as a `style` attribute value
    pub fn parse_declarations(&self, css: &str) -> Result<Vec<Declaration>, CssError> {
        if css.trim().is_empty() {
            return Ok(Vec::new());
        }

        let block = DeclarationBlock::parse_string(css, ParserOptions::default())
            .map_err(|e| CssError::ParseError {
                line: 0,
                message: format!("{:?}", e),
            })?;

        let mut result = Vec::new();

        for decl in block.declarations.iter() {
            if let Some(converted) = self.convert_declaration(decl, false) {
                result.push(converted);
            }
        }

        for decl in block.important_declarations.iter() {
            if let Some(converted) = self.convert_declaration(decl, true) {
                result.push(converted);
            }
        }

        tracing::trace!("Parsed {} declarations", result.len());
        Ok(result)
    }

    fn convert_declaration(&self, decl: &Property, important: bool) -> Option<Declaration> {
        let property = match decl {
            Property::Unparsed(unparsed) => unparsed.property_id.name().to_ascii_lowercase(),
            other => other.property_id().name().to_ascii_lowercase(),
        };

        let value = decl.value_to_css_string(PrinterOptions::default()).ok()?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        // CSS-wide keywords are case-insensitive
        let value = match value.to_ascii_lowercase().as_str() {
            keyword @ ("inherit" | "initial" | "unset") => keyword.to_string(),
            _ => value.to_string(),
        };

        Some(Declaration { property, value, important })
    }
}
