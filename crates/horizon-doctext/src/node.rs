//! Short-lived snapshots of provider elements.

use horizon_doctext_core::Result;

use crate::behavior::DocumentBehavior;
use crate::provider::{AttributeId, ControlType, RuntimeId, TreeProvider};
use crate::role::{Role, State, StateSet};

/// Cached attributes of one element, read once per traversal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub runtime_id: RuntimeId,
    /// Empty when the provider reports none.
    pub automation_id: String,
    pub control_type: Option<ControlType>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Role after document-specific correction.
    pub role: Role,
    pub states: StateSet,
}

impl NodeInfo {
    /// A bare node with the given identity and role, used when building
    /// nodes by hand.
    pub fn new(runtime_id: RuntimeId, role: Role) -> Self {
        Self {
            runtime_id,
            automation_id: String::new(),
            control_type: None,
            name: None,
            description: None,
            role,
            states: StateSet::new(),
        }
    }

    pub fn with_automation_id(mut self, automation_id: impl Into<String>) -> Self {
        self.automation_id = automation_id.into();
        self
    }

    pub fn with_control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = Some(control_type);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.states.insert(state);
        self
    }

    /// The name, if present and non-empty.
    pub fn non_empty_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// The description, if present and non-empty.
    pub fn non_empty_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

/// An element together with its range and cached attributes.
///
/// Created per traversal step and dropped after field extraction.
#[derive(Debug, Clone)]
pub struct TreeNode<E, R> {
    pub element: E,
    pub range: R,
    pub info: NodeInfo,
}

impl<E: Clone, R> TreeNode<E, R> {
    /// Snapshot `element`, applying the document's role correction.
    pub fn fetch<P, B>(provider: &P, element: &E, behavior: &B) -> Result<Self>
    where
        P: TreeProvider<Element = E, Range = R>,
        B: DocumentBehavior + ?Sized,
    {
        let runtime_id = provider.runtime_id(element)?;
        let automation_id = provider
            .string_attribute(element, AttributeId::AutomationId)?
            .unwrap_or_default();
        let control_type = provider
            .attribute(element, AttributeId::ControlType)?
            .and_then(|v| v.as_control_type());
        let name = provider.string_attribute(element, AttributeId::Name)?;
        let description = provider.string_attribute(element, AttributeId::Description)?;

        let mut states = StateSet::new();
        for (id, state) in [
            (AttributeId::IsKeyboardFocusable, State::Focusable),
            (AttributeId::HasKeyboardFocus, State::Focused),
            (AttributeId::IsReadOnly, State::ReadOnly),
        ] {
            if provider.attribute(element, id)?.and_then(|v| v.as_bool()) == Some(true) {
                states.insert(state);
            }
        }

        let base_role = control_type.map_or(Role::Unknown, Role::from_control_type);
        let info = NodeInfo {
            runtime_id,
            automation_id,
            control_type,
            name,
            description,
            role: behavior.adjust_role(base_role),
            states,
        };

        Ok(Self {
            element: element.clone(),
            range: provider.element_range(element)?,
            info,
        })
    }
}
