//! Roles and states attached to document fields.

use std::collections::BTreeSet;
use std::fmt;

use crate::provider::ControlType;

/// The role of a node in the linearized document.
///
/// This is the fixed vocabulary fields are annotated with. Provider control
/// types are mapped onto it by [`Role::from_control_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[non_exhaustive]
pub enum Role {
    /// A node with no specific role.
    #[default]
    Unknown,

    /// The document itself.
    Document,

    /// An editable text region.
    EditableText,

    /// Static text.
    StaticText,

    /// A paragraph.
    Paragraph,

    /// A heading.
    Heading,

    /// A hyperlink, footnote or endnote reference.
    Link,

    /// An image or drawing.
    Graphic,

    /// A list of items.
    List,

    /// An item within a list.
    ListItem,

    /// A table.
    Table,

    /// A row within a table.
    TableRow,

    /// A cell within a table.
    TableCell,

    /// A column header.
    TableColumnHeader,

    /// A row header.
    TableRowHeader,

    /// A page header or footer band.
    Header,

    /// A generic grouping.
    Group,

    /// A pane.
    Pane,

    /// A push button.
    Button,

    /// A checkbox.
    CheckBox,

    /// A combo box.
    ComboBox,
}

impl Role {
    /// Base role for a provider control type.
    pub fn from_control_type(control_type: ControlType) -> Self {
        match control_type {
            ControlType::Document => Role::Document,
            ControlType::Edit => Role::EditableText,
            ControlType::Text => Role::StaticText,
            ControlType::Hyperlink => Role::Link,
            ControlType::Image => Role::Graphic,
            ControlType::List => Role::List,
            ControlType::ListItem => Role::ListItem,
            ControlType::Table => Role::Table,
            ControlType::DataGrid => Role::Table,
            ControlType::DataItem => Role::TableCell,
            ControlType::Header => Role::TableRow,
            ControlType::HeaderItem => Role::TableColumnHeader,
            ControlType::Group => Role::Group,
            ControlType::Pane => Role::Pane,
            ControlType::Button => Role::Button,
            ControlType::CheckBox => Role::CheckBox,
            ControlType::ComboBox => Role::ComboBox,
            ControlType::Custom | ControlType::Other(_) => Role::Unknown,
        }
    }

    /// Short name used in debug output.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unknown => "unknown",
            Role::Document => "document",
            Role::EditableText => "editable-text",
            Role::StaticText => "static-text",
            Role::Paragraph => "paragraph",
            Role::Heading => "heading",
            Role::Link => "link",
            Role::Graphic => "graphic",
            Role::List => "list",
            Role::ListItem => "list-item",
            Role::Table => "table",
            Role::TableRow => "table-row",
            Role::TableCell => "table-cell",
            Role::TableColumnHeader => "table-column-header",
            Role::TableRowHeader => "table-row-header",
            Role::Header => "header",
            Role::Group => "group",
            Role::Pane => "pane",
            Role::Button => "button",
            Role::CheckBox => "checkbox",
            Role::ComboBox => "combo-box",
        }
    }

    /// Convert to AccessKit's Role enum.
    #[cfg(feature = "accesskit")]
    pub fn to_accesskit_role(self) -> accesskit::Role {
        use accesskit::Role as AkRole;
        match self {
            Role::Unknown => AkRole::Unknown,
            Role::Document => AkRole::Document,
            Role::EditableText => AkRole::MultilineTextInput,
            Role::StaticText => AkRole::Label,
            Role::Paragraph => AkRole::Paragraph,
            Role::Heading => AkRole::Heading,
            Role::Link => AkRole::Link,
            Role::Graphic => AkRole::Image,
            Role::List => AkRole::List,
            Role::ListItem => AkRole::ListItem,
            Role::Table => AkRole::Table,
            Role::TableRow => AkRole::Row,
            Role::TableCell => AkRole::Cell,
            Role::TableColumnHeader => AkRole::ColumnHeader,
            Role::TableRowHeader => AkRole::RowHeader,
            Role::Header | Role::Group => AkRole::Group,
            Role::Pane => AkRole::Pane,
            Role::Button => AkRole::Button,
            Role::CheckBox => AkRole::CheckBox,
            Role::ComboBox => AkRole::ComboBox,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "accesskit")]
impl From<Role> for accesskit::Role {
    fn from(role: Role) -> Self {
        role.to_accesskit_role()
    }
}

/// A state flag carried by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    /// The node can take keyboard focus.
    Focusable,
    /// The node has keyboard focus.
    Focused,
    /// The node's content cannot be edited.
    ReadOnly,
    /// The node is selected.
    Selected,
    /// The node is the target of a link.
    Linked,
    /// The node is not visible.
    Invisible,
}

impl State {
    /// Short name used in debug output.
    pub fn as_str(self) -> &'static str {
        match self {
            State::Focusable => "focusable",
            State::Focused => "focused",
            State::ReadOnly => "read-only",
            State::Selected => "selected",
            State::Linked => "linked",
            State::Invisible => "invisible",
        }
    }
}

/// An ordered set of [`State`] flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StateSet(BTreeSet<State>);

impl StateSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state. Returns false if it was already present.
    pub fn insert(&mut self, state: State) -> bool {
        self.0.insert(state)
    }

    /// Remove a state. Returns false if it was absent.
    pub fn remove(&mut self, state: State) -> bool {
        self.0.remove(&state)
    }

    pub fn contains(&self, state: State) -> bool {
        self.0.contains(&state)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(State::as_str).collect();
        f.write_str(&names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_control_has_no_base_role() {
        assert_eq!(Role::from_control_type(ControlType::Custom), Role::Unknown);
        assert_eq!(
            Role::from_control_type(ControlType::Other(50_999)),
            Role::Unknown
        );
    }

    #[test]
    fn test_state_set_display_is_ordered() {
        let states: StateSet = [State::ReadOnly, State::Focusable].into_iter().collect();
        assert_eq!(states.to_string(), "focusable,read-only");
        assert_eq!(states.len(), 2);
    }

    #[cfg(feature = "accesskit")]
    #[test]
    fn test_accesskit_mapping() {
        assert_eq!(accesskit::Role::from(Role::Link), accesskit::Role::Link);
        assert_eq!(Role::TableCell.to_accesskit_role(), accesskit::Role::Cell);
    }
}
