//! The external tree provider capability.
//!
//! The accessibility tree is owned by an external provider. This module
//! describes the minimum set of operations the document text model consumes.
//! Ranges and elements are opaque handles: the model clones and borrows them
//! for the duration of a single call and always re-queries the provider rather
//! than caching tree state across calls.
//!
//! Every operation may fail with [`Error::ProviderUnavailable`] when the
//! provider's transport breaks. Absent attributes are `Ok(None)`, never errors.
//!
//! [`Error::ProviderUnavailable`]: horizon_doctext_core::Error::ProviderUnavailable

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use horizon_doctext_core::{Endpoint, Result, TextUnit};

/// Provider control types the text model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    Document,
    Edit,
    Text,
    Hyperlink,
    Image,
    List,
    ListItem,
    Table,
    DataGrid,
    DataItem,
    Header,
    HeaderItem,
    Group,
    Pane,
    Button,
    CheckBox,
    ComboBox,
    /// The provider's "custom control" type. Footnote and endnote markers are
    /// exposed this way.
    Custom,
    /// Any other provider-specific control type id.
    Other(i32),
}

/// Identifies a cached element attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    AutomationId,
    ControlType,
    Name,
    Description,
    IsKeyboardFocusable,
    HasKeyboardFocus,
    IsReadOnly,
}

/// A cached attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Str(String),
    Bool(bool),
    ControlType(ControlType),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_control_type(&self) -> Option<ControlType> {
        match self {
            AttributeValue::ControlType(ct) => Some(*ct),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<ControlType> for AttributeValue {
    fn from(value: ControlType) -> Self {
        AttributeValue::ControlType(value)
    }
}

/// Provider-assigned element identity: a short sequence of integers.
///
/// Unique among live elements of one traversal. Used to detect duplicate
/// control spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(Vec<i32>);

impl RuntimeId {
    pub fn new(parts: impl Into<Vec<i32>>) -> Self {
        Self(parts.into())
    }

    pub fn parts(&self) -> &[i32] {
        &self.0
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(i32::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// Text format attributes of a range, keyed by attribute name
/// (for example `font-name` or `bold`).
pub type FormatAttributes = BTreeMap<String, String>;

/// Result of querying the format attributes of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatQuery {
    /// Every character in the range shares these attributes.
    Uniform(FormatAttributes),
    /// The range spans differing attributes.
    Mixed,
}

impl FormatQuery {
    pub fn is_mixed(&self) -> bool {
        matches!(self, FormatQuery::Mixed)
    }
}

/// The external accessibility tree, consumed as an opaque capability.
pub trait TreeProvider {
    /// A span over document content.
    type Range: Clone + fmt::Debug;
    /// A node of the tree.
    type Element: Clone + fmt::Debug;

    /// Compare an endpoint of `a` with an endpoint of `b`.
    fn compare(
        &self,
        a: &Self::Range,
        a_endpoint: Endpoint,
        b: &Self::Range,
        b_endpoint: Endpoint,
    ) -> Result<Ordering>;

    /// Text covered by the range, truncated to `max_length` characters if given.
    fn text(&self, range: &Self::Range, max_length: Option<usize>) -> Result<String>;

    /// Grow or shrink the range so it covers exactly the unit containing its start.
    fn expand_to_unit(&self, range: &mut Self::Range, unit: TextUnit) -> Result<()>;

    /// Move the whole range by `count` units. Returns the number of units moved.
    fn move_by_unit(&self, range: &mut Self::Range, unit: TextUnit, count: i32) -> Result<i32>;

    /// Move one endpoint by `count` units. Returns the number of units moved.
    fn move_endpoint_by_unit(
        &self,
        range: &mut Self::Range,
        endpoint: Endpoint,
        unit: TextUnit,
        count: i32,
    ) -> Result<i32>;

    /// Move `endpoint` of `range` to `source_endpoint` of `source`.
    fn set_endpoint(
        &self,
        range: &mut Self::Range,
        endpoint: Endpoint,
        source: &Self::Range,
        source_endpoint: Endpoint,
    ) -> Result<()>;

    /// Whether the provider reports the range as collapsed.
    fn is_degenerate(&self, range: &Self::Range) -> Result<bool>;

    /// Format attributes of the range.
    fn format(&self, range: &Self::Range) -> Result<FormatQuery>;

    /// Annotation objects (comments and the like) anchored at the range.
    fn annotations(&self, range: &Self::Range) -> Result<Vec<Self::Element>>;

    /// Elements embedded in the range, in document order. One-shot per call.
    fn children(&self, range: &Self::Range) -> Result<Vec<Self::Element>>;

    /// The deepest element whose span contains the whole range.
    fn enclosing_element(&self, range: &Self::Range) -> Result<Self::Element>;

    /// The document root element.
    fn root_element(&self) -> Result<Self::Element>;

    fn parent(&self, element: &Self::Element) -> Result<Option<Self::Element>>;

    fn previous_sibling(&self, element: &Self::Element) -> Result<Option<Self::Element>>;

    /// The span of content covered by an element.
    fn element_range(&self, element: &Self::Element) -> Result<Self::Range>;

    /// Provider identity of an element.
    fn runtime_id(&self, element: &Self::Element) -> Result<RuntimeId>;

    /// A cached attribute of an element. Absent values are `Ok(None)`.
    fn attribute(&self, element: &Self::Element, id: AttributeId) -> Result<Option<AttributeValue>>;

    /// Full text of an element.
    fn element_text(&self, element: &Self::Element) -> Result<String> {
        let range = self.element_range(element)?;
        self.text(&range, None)
    }

    /// Both endpoints of `a` and `b` compare equal.
    fn ranges_equal(&self, a: &Self::Range, b: &Self::Range) -> Result<bool> {
        let starts = self.compare(a, Endpoint::Start, b, Endpoint::Start)?;
        let ends = self.compare(a, Endpoint::End, b, Endpoint::End)?;
        Ok(starts == Ordering::Equal && ends == Ordering::Equal)
    }

    /// A collapsed copy of `range` positioned at `endpoint`.
    fn collapsed(&self, range: &Self::Range, endpoint: Endpoint) -> Result<Self::Range> {
        let mut collapsed = range.clone();
        let other = match endpoint {
            Endpoint::Start => Endpoint::End,
            Endpoint::End => Endpoint::Start,
        };
        self.set_endpoint(&mut collapsed, other, range, endpoint)?;
        Ok(collapsed)
    }

    /// Read a string attribute, treating absent and non-string values as `None`.
    fn string_attribute(&self, element: &Self::Element, id: AttributeId) -> Result<Option<String>> {
        let value = self.attribute(element, id)?;
        Ok(value.and_then(|value| value.as_str().map(str::to_string)))
    }
}

/// A key gesture forwarded to the document surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyGesture {
    pub key: Key,
    pub shift: bool,
}

/// Keys the browse-mode document intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Other(u32),
}

impl KeyGesture {
    pub fn tab() -> Self {
        Self {
            key: Key::Tab,
            shift: false,
        }
    }

    pub fn shift_tab() -> Self {
        Self {
            key: Key::Tab,
            shift: true,
        }
    }

    /// Tab or shift+tab.
    pub fn is_tab(&self) -> bool {
        self.key == Key::Tab
    }
}

/// The live editing surface behind a document: its selection and raw input.
pub trait SelectionSurface: TreeProvider {
    /// The current selection.
    fn selection(&self) -> Result<Self::Range>;

    /// Forward a raw input gesture to the surface unmodified.
    fn send_gesture(&self, gesture: &KeyGesture) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_id_display() {
        assert_eq!(RuntimeId::new([42, 7, 3]).to_string(), "42.7.3");
    }

    #[test]
    fn test_attribute_value_accessors() {
        let value = AttributeValue::from("UIA_AutomationId_Word_Page_3");
        assert_eq!(value.as_str(), Some("UIA_AutomationId_Word_Page_3"));
        assert_eq!(value.as_bool(), None);
        assert_eq!(
            AttributeValue::from(ControlType::Custom).as_control_type(),
            Some(ControlType::Custom)
        );
    }
}
