//! Behavior for word-processor documents exposed through UI Automation.
//!
//! These documents differ from the base behavior in a handful of ways:
//!
//! - page elements carry their page number in their automation id, and every
//!   format field of a linearization is stamped with the first field's page;
//! - footnote and endnote markers are untyped custom controls;
//! - list structure is suppressed (only bullet and number glyphs remain);
//! - graphics carry generated names that should not be spoken;
//! - vertical tabs stand in for line breaks, and a bell character marks the
//!   end of every table row;
//! - format annotations of whole chunks can be wrong, so text is always split
//!   at the first declared unit;
//! - the provider sometimes returns an ancestor among a range's children;
//! - ranges on links and table cells never fully collapse;
//! - editable wrappers surround most inner content.

use horizon_doctext_core::{Error, Result, TextModelConfig, TextUnit};
use regex::Regex;

use crate::behavior::{DocumentBehavior, NodePlacement};
use crate::dedupe::eliminate_duplicates;
use crate::extract::apply_word_field_rules;
use crate::field::{FieldCommand, FieldRecord};
use crate::linearize::backfill_page_number;
use crate::node::NodeInfo;
use crate::role::Role;

/// Line separator some documents (HTML mail in particular) use instead of
/// carriage returns.
pub const VERTICAL_TAB: char = '\u{0B}';

/// Invisible marker at the end of each table row.
pub const ROW_END_MARKER: char = '\u{07}';

/// Replace vertical tabs with carriage returns and drop row-end markers.
pub fn clean_sentinels(text: &str) -> String {
    text.chars()
        .filter(|&c| c != ROW_END_MARKER)
        .map(|c| if c == VERTICAL_TAB { '\r' } else { c })
        .collect()
}

/// Document behavior for word-processor documents.
#[derive(Debug, Clone)]
pub struct WordDocument {
    page_pattern: Regex,
    content_wrapper_prefix: String,
}

impl WordDocument {
    /// Build the behavior from a configuration.
    pub fn new(config: &TextModelConfig) -> Result<Self> {
        let page_pattern = Regex::new(&config.page_id_pattern)
            .map_err(|e| Error::invalid_pattern(config.page_id_pattern.clone(), e))?;
        Ok(Self {
            page_pattern,
            content_wrapper_prefix: config.content_wrapper_prefix.clone(),
        })
    }
}

impl DocumentBehavior for WordDocument {
    fn adjust_role(&self, role: Role) -> Role {
        // Footnote and endnote bodies have no role; present their text as editable text.
        if role == Role::Unknown {
            Role::EditableText
        } else {
            role
        }
    }

    fn adjust_control_field(
        &self,
        node: &NodeInfo,
        field: &mut FieldRecord,
        _placement: NodePlacement,
    ) {
        apply_word_field_rules(node, field, &self.page_pattern);
    }

    fn clean_text(&self, text: String) -> String {
        if text.contains([VERTICAL_TAB, ROW_END_MARKER]) {
            clean_sentinels(&text)
        } else {
            text
        }
    }

    fn first_split_units<'u>(
        &self,
        requested: Option<&'u [TextUnit]>,
        declared: &'u [TextUnit],
    ) -> Option<&'u [TextUnit]> {
        match requested {
            None if !declared.is_empty() => Some(declared),
            other => other,
        }
    }

    fn finish_commands(&self, commands: &mut Vec<FieldCommand>) {
        backfill_page_number(commands);
        eliminate_duplicates(commands);
    }

    fn is_sentinel(&self, raw_character: &str) -> bool {
        let mut chars = raw_character.chars();
        chars.next() == Some(ROW_END_MARKER) && chars.next().is_none()
    }

    fn empty_text_is_collapsed(&self) -> bool {
        true
    }

    fn is_content_wrapper(&self, node: &NodeInfo) -> bool {
        node.role == Role::EditableText
            && node.automation_id.starts_with(&self.content_wrapper_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RuntimeId;

    fn word() -> WordDocument {
        WordDocument::new(&TextModelConfig::default()).unwrap()
    }

    #[test]
    fn test_clean_sentinels() {
        assert_eq!(clean_sentinels("line1\u{0B}line2\u{07}"), "line1\rline2");
        assert_eq!(word().clean_text("\u{07}".to_string()), "");
        assert_eq!(word().clean_text("plain".to_string()), "plain");
    }

    #[test]
    fn test_unknown_role_becomes_editable_text() {
        assert_eq!(word().adjust_role(Role::Unknown), Role::EditableText);
        assert_eq!(word().adjust_role(Role::Table), Role::Table);
    }

    #[test]
    fn test_first_split_forced_only_without_override() {
        let declared = [TextUnit::Format, TextUnit::Word];
        let requested = [TextUnit::Character];
        let doc = word();

        assert_eq!(doc.first_split_units(None, &declared), Some(&declared[..]));
        assert_eq!(
            doc.first_split_units(Some(&requested), &declared),
            Some(&requested[..])
        );
        assert_eq!(doc.first_split_units(None, &[]), None);
    }

    #[test]
    fn test_row_end_is_sentinel() {
        let doc = word();
        assert!(doc.is_sentinel("\u{07}"));
        assert!(!doc.is_sentinel("\u{07}x"));
        assert!(!doc.is_sentinel("a"));
        assert!(!doc.is_sentinel(""));
    }

    #[test]
    fn test_content_wrapper_detection() {
        let doc = word();
        let wrapper = NodeInfo::new(RuntimeId::new([1]), Role::EditableText)
            .with_automation_id("UIA_AutomationId_Word_Content_4");
        let link = NodeInfo::new(RuntimeId::new([2]), Role::Link)
            .with_automation_id("UIA_AutomationId_Word_Content_5");

        assert!(doc.is_content_wrapper(&wrapper));
        assert!(!doc.is_content_wrapper(&link));
    }

    #[test]
    fn test_bad_pattern_is_error() {
        let config = TextModelConfig {
            page_id_pattern: "[".to_string(),
            ..Default::default()
        };
        let err = WordDocument::new(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
