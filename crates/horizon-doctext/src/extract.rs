//! Control field extraction.
//!
//! Base extraction turns a node snapshot into a [`FieldRecord`] carrying its
//! role, states, name, description and identity. Document types then
//! augment that record through [`DocumentBehavior::adjust_control_field`].

use horizon_doctext_core::logging::targets;
use regex::Regex;

use crate::behavior::{DocumentBehavior, NodePlacement};
use crate::field::{FieldRecord, keys};
use crate::node::NodeInfo;
use crate::provider::ControlType;
use crate::role::{Role, State};

/// Base field for a node, before any document-specific rule.
pub fn base_control_field(node: &NodeInfo, placement: NodePlacement) -> FieldRecord {
    let mut field = FieldRecord::control(node.role, node.runtime_id.clone());
    field.states = node.states.clone();

    if let Some(name) = node.non_empty_name() {
        field.set(keys::NAME, name);
    }
    if let Some(description) = node.non_empty_description() {
        field.set(keys::DESCRIPTION, description);
    }
    if placement.embedded {
        field.set(keys::EMBEDDED, true);
    }
    if placement.start_of_node {
        field.set(keys::START_OF_NODE, true);
    }
    if placement.end_of_node {
        field.set(keys::END_OF_NODE, true);
    }

    field
}

/// Base extraction followed by the document's overrides.
pub fn extract_control_field<B>(
    node: &NodeInfo,
    placement: NodePlacement,
    behavior: &B,
) -> FieldRecord
where
    B: DocumentBehavior + ?Sized,
{
    let mut field = base_control_field(node, placement);
    behavior.adjust_control_field(node, &mut field, placement);
    field
}

/// Field rules for word-processor documents.
///
/// Applied in order:
/// 1. Page elements (automation id matching `page_pattern`) get a
///    `page-number` taken from the id's last `_`-separated segment.
/// 2. Otherwise, named custom controls (footnote and endnote markers) become
///    links whose `content` is the name.
/// 3. Lists and editable text are read-only; lists are presented as editable
///    text so list entry and exit are not announced.
/// 4. Graphics are labelled with their description before their name, since
///    providers often synthesize generic names such as "rectangle".
pub fn apply_word_field_rules(node: &NodeInfo, field: &mut FieldRecord, page_pattern: &Regex) {
    if page_pattern.is_match(&node.automation_id) {
        let page = node.automation_id.rsplit('_').next().unwrap_or_default();
        tracing::trace!(
            target: targets::EXTRACT,
            runtime_id = %node.runtime_id,
            page,
            "page element"
        );
        field.set(keys::PAGE_NUMBER, page);
    } else if node.control_type == Some(ControlType::Custom)
        && let Some(name) = node.non_empty_name()
    {
        field.set(keys::CONTENT, name);
        field.role = Role::Link;
    }

    if matches!(node.role, Role::List | Role::EditableText) {
        field.states.insert(State::ReadOnly);
        if node.role == Role::List {
            field.role = Role::EditableText;
        }
    }

    if node.role == Role::Graphic {
        let label = field
            .take_non_empty(keys::DESCRIPTION)
            .or_else(|| node.non_empty_description().map(str::to_string))
            .or_else(|| field.take_non_empty(keys::NAME))
            .or_else(|| node.non_empty_name().map(str::to_string));
        if let Some(label) = label {
            field.set(keys::VALUE, label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RuntimeId;

    fn page_pattern() -> Regex {
        Regex::new(horizon_doctext_core::config::DEFAULT_PAGE_ID_PATTERN).unwrap()
    }

    fn extract(node: &NodeInfo) -> FieldRecord {
        let mut field = base_control_field(node, NodePlacement::default());
        apply_word_field_rules(node, &mut field, &page_pattern());
        field
    }

    #[test]
    fn test_page_number_from_automation_id() {
        let node = NodeInfo::new(RuntimeId::new([1]), Role::Group)
            .with_automation_id("UIA_AutomationId_Word_Page_12");
        let field = extract(&node);
        assert_eq!(field.page_number(), Some("12"));
        assert_eq!(field.role, Role::Group);
    }

    #[test]
    fn test_footnote_marker_becomes_link() {
        let node = NodeInfo::new(RuntimeId::new([2]), Role::EditableText)
            .with_control_type(ControlType::Custom)
            .with_name("1");
        let field = extract(&node);
        assert_eq!(field.role, Role::Link);
        assert_eq!(field.get_str(keys::CONTENT), Some("1"));
        // Node role is editable text, so the read-only rule still applies.
        assert!(field.states.contains(State::ReadOnly));
    }

    #[test]
    fn test_unnamed_custom_control_untouched() {
        let node = NodeInfo::new(RuntimeId::new([3]), Role::Unknown)
            .with_control_type(ControlType::Custom);
        let field = extract(&node);
        assert_eq!(field.role, Role::Unknown);
        assert!(!field.contains(keys::CONTENT));
    }

    #[test]
    fn test_page_rule_wins_over_custom_control() {
        let node = NodeInfo::new(RuntimeId::new([4]), Role::Unknown)
            .with_control_type(ControlType::Custom)
            .with_automation_id("UIA_AutomationId_Word_Page_2")
            .with_name("Page 2");
        let field = extract(&node);
        assert_eq!(field.page_number(), Some("2"));
        assert_eq!(field.role, Role::Unknown);
        assert!(!field.contains(keys::CONTENT));
    }

    #[test]
    fn test_list_demoted_to_read_only_editable_text() {
        let node = NodeInfo::new(RuntimeId::new([5]), Role::List);
        let field = extract(&node);
        assert_eq!(field.role, Role::EditableText);
        assert!(field.states.contains(State::ReadOnly));
    }

    #[test]
    fn test_graphic_prefers_description() {
        let node = NodeInfo::new(RuntimeId::new([6]), Role::Graphic)
            .with_name("rectangle")
            .with_description("Quarterly revenue chart");
        let field = extract(&node);
        assert_eq!(field.get_str(keys::VALUE), Some("Quarterly revenue chart"));
        assert!(!field.contains(keys::DESCRIPTION));
        // Name is only consumed when no description exists.
        assert_eq!(field.get_str(keys::NAME), Some("rectangle"));
    }

    #[test]
    fn test_graphic_falls_back_to_name() {
        let node = NodeInfo::new(RuntimeId::new([7]), Role::Graphic).with_name("Logo");
        let field = extract(&node);
        assert_eq!(field.get_str(keys::VALUE), Some("Logo"));
        assert!(!field.contains(keys::NAME));
    }

    #[test]
    fn test_placement_flags() {
        let node = NodeInfo::new(RuntimeId::new([8]), Role::Link);
        let placement = NodePlacement {
            embedded: false,
            start_of_node: true,
            end_of_node: false,
        };
        let field = base_control_field(&node, placement);
        assert!(field.contains(keys::START_OF_NODE));
        assert!(!field.contains(keys::END_OF_NODE));
    }
}
