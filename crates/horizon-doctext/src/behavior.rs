//! Per-document-type override hooks.
//!
//! The text model implements base linearization, navigation and browse-mode
//! rules once. Document types that need different behavior implement
//! [`DocumentBehavior`] and override only the hooks they care about; every
//! hook has a default that leaves the base behavior unchanged.
//!
//! ```ignore
//! struct PlainDocument;
//! impl DocumentBehavior for PlainDocument {}
//!
//! struct NoisyProvider;
//! impl DocumentBehavior for NoisyProvider {
//!     fn clean_text(&self, text: String) -> String {
//!         text.replace('\u{0}', "")
//!     }
//! }
//! ```

use horizon_doctext_core::TextUnit;

use crate::field::{FieldCommand, FieldRecord};
use crate::node::NodeInfo;
use crate::role::Role;

/// Where a node sits relative to the range being linearized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodePlacement {
    /// The node is an embedded object inside its parent's text.
    pub embedded: bool,
    /// The range starts at the node's start.
    pub start_of_node: bool,
    /// The range ends at the node's end.
    pub end_of_node: bool,
}

/// Override hook table for one document type.
pub trait DocumentBehavior {
    /// Correct the role derived from the provider's control type.
    fn adjust_role(&self, role: Role) -> Role {
        role
    }

    /// Augment a control field after base extraction.
    fn adjust_control_field(
        &self,
        _node: &NodeInfo,
        _field: &mut FieldRecord,
        _placement: NodePlacement,
    ) {
    }

    /// Transform every chunk of text read from the provider.
    fn clean_text(&self, text: String) -> String {
        text
    }

    /// Choose the units for the first split of a text range.
    ///
    /// `requested` is the caller's explicit override, `declared` the configured
    /// format units. Returning `None` leaves the range unsplit unless its
    /// format turns out to be mixed.
    fn first_split_units<'u>(
        &self,
        requested: Option<&'u [TextUnit]>,
        _declared: &'u [TextUnit],
    ) -> Option<&'u [TextUnit]> {
        requested
    }

    /// Post-process the full command sequence before it is returned.
    fn finish_commands(&self, _commands: &mut Vec<FieldCommand>) {}

    /// Whether a single character of raw provider text is a structural
    /// sentinel that navigation should step over.
    fn is_sentinel(&self, _raw_character: &str) -> bool {
        false
    }

    /// Treat a range with no readable text as collapsed even when the
    /// provider does not.
    fn empty_text_is_collapsed(&self) -> bool {
        false
    }

    /// Whether a node is a provider-injected wrapper with no navigational
    /// value of its own.
    fn is_content_wrapper(&self, _node: &NodeInfo) -> bool {
        false
    }
}

/// A document type with no overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDocument;

impl DocumentBehavior for GenericDocument {}
