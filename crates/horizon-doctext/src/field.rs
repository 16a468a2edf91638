//! Field records and the commands of a linearized document.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use static_assertions::assert_impl_all;

use crate::provider::{FormatAttributes, RuntimeId};
use crate::role::{Role, StateSet};

/// Well-known attribute names.
pub mod keys {
    /// Page the field belongs to.
    pub const PAGE_NUMBER: &str = "page-number";
    /// Content to present instead of the field's text (footnote markers).
    pub const CONTENT: &str = "content";
    /// Value of the field (graphic labels).
    pub const VALUE: &str = "value";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    /// The linearized range starts at the start of this node.
    pub const START_OF_NODE: &str = "start-of-node";
    /// The linearized range ends at the end of this node.
    pub const END_OF_NODE: &str = "end-of-node";
    /// The node is an embedded object.
    pub const EMBEDDED: &str = "embedded";
}

/// A field attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Structural annotation attached to a span of the linearized document.
///
/// `role` and `states` are always present. Everything else lives in the
/// attribute map, keyed by the names in [`keys`] or by format attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldRecord {
    pub role: Role,
    pub states: StateSet,
    pub runtime_id: Option<RuntimeId>,
    attributes: BTreeMap<String, FieldValue>,
}

impl FieldRecord {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    /// A control field for the element with the given identity.
    pub fn control(role: Role, runtime_id: RuntimeId) -> Self {
        Self {
            role,
            runtime_id: Some(runtime_id),
            ..Default::default()
        }
    }

    /// A format field holding the given text attributes.
    pub fn format(attributes: FormatAttributes) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k, FieldValue::Text(v)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.attributes.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.attributes.remove(key)
    }

    /// Remove a text attribute and return it if non-empty.
    pub fn take_non_empty(&mut self, key: &str) -> Option<String> {
        match self.attributes.remove(key) {
            Some(FieldValue::Text(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn page_number(&self) -> Option<&str> {
        self.get_str(keys::PAGE_NUMBER)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One element of the linearized document.
///
/// A `ControlStart` and its matching `ControlEnd` share the same
/// `Arc<FieldRecord>`; pairing is by pointer identity, not by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCommand {
    ControlStart(Arc<FieldRecord>),
    ControlEnd(Arc<FieldRecord>),
    FormatChange(FieldRecord),
    Text(String),
}

assert_impl_all!(FieldCommand: Send, Sync);
assert_impl_all!(FieldRecord: Send, Sync);

impl FieldCommand {
    /// The field carried by this command, if any.
    pub fn field(&self) -> Option<&FieldRecord> {
        match self {
            FieldCommand::ControlStart(f) | FieldCommand::ControlEnd(f) => Some(f),
            FieldCommand::FormatChange(f) => Some(f),
            FieldCommand::Text(_) => None,
        }
    }

    /// The shared control field of a start or end command.
    pub fn control_field(&self) -> Option<&Arc<FieldRecord>> {
        match self {
            FieldCommand::ControlStart(f) | FieldCommand::ControlEnd(f) => Some(f),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FieldCommand::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_control_start(&self) -> bool {
        matches!(self, FieldCommand::ControlStart(_))
    }

    pub fn is_control_end(&self) -> bool {
        matches!(self, FieldCommand::ControlEnd(_))
    }
}

/// Build a matched start/end pair for `field`.
pub fn control_pair(field: FieldRecord) -> (FieldCommand, FieldCommand) {
    let field = Arc::new(field);
    (
        FieldCommand::ControlStart(field.clone()),
        FieldCommand::ControlEnd(field),
    )
}

/// Concatenate the text payloads of `commands` in order.
pub fn concat_text(commands: &[FieldCommand]) -> String {
    commands.iter().filter_map(FieldCommand::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_pair_shares_identity() {
        let (start, end) = control_pair(FieldRecord::control(Role::Link, RuntimeId::new([1])));
        let a = start.control_field().unwrap();
        let b = end.control_field().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_take_non_empty_skips_empty_values() {
        let mut field = FieldRecord::new(Role::Graphic);
        field.set(keys::DESCRIPTION, "");
        field.set(keys::NAME, "Chart of sales");

        assert_eq!(field.take_non_empty(keys::DESCRIPTION), None);
        assert!(!field.contains(keys::DESCRIPTION));
        assert_eq!(
            field.take_non_empty(keys::NAME).as_deref(),
            Some("Chart of sales")
        );
    }

    #[test]
    fn test_concat_text() {
        let commands = vec![
            FieldCommand::FormatChange(FieldRecord::default()),
            FieldCommand::Text("foo".into()),
            FieldCommand::Text("bar".into()),
        ];
        assert_eq!(concat_text(&commands), "foobar");
    }
}
