//! Text units and range endpoints.

use serde::{Deserialize, Serialize};

/// A unit of text that ranges can be expanded to or moved by.
///
/// Units are ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextUnit {
    /// A single user-perceived character.
    Character,
    /// A run of text sharing the same format attributes.
    Format,
    /// A word.
    Word,
    /// A visual line.
    Line,
    /// A paragraph.
    Paragraph,
    /// A page.
    Page,
    /// The whole document.
    Document,
}

impl TextUnit {
    /// Short name used in log output.
    pub fn as_str(self) -> &'static str {
        match self {
            TextUnit::Character => "character",
            TextUnit::Format => "format",
            TextUnit::Word => "word",
            TextUnit::Line => "line",
            TextUnit::Paragraph => "paragraph",
            TextUnit::Page => "page",
            TextUnit::Document => "document",
        }
    }
}

/// One end of a text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// The start of the range.
    Start,
    /// The end of the range.
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_order_finest_first() {
        assert!(TextUnit::Character < TextUnit::Word);
        assert!(TextUnit::Line < TextUnit::Paragraph);
        assert!(TextUnit::Paragraph < TextUnit::Document);
    }
}
