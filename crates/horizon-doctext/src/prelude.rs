//! Prelude module for Horizon Doctext.
//!
//! ```ignore
//! use horizon_doctext::prelude::*;
//! ```

// ============================================================================
// Configuration and Errors
// ============================================================================

pub use crate::{Endpoint, Error, Result, TextModelConfig, TextUnit};

// ============================================================================
// Provider Capability
// ============================================================================

pub use crate::provider::{
    AttributeId, AttributeValue, ControlType, KeyGesture, RuntimeId, SelectionSurface, TreeProvider,
};

// ============================================================================
// Text Model
// ============================================================================

pub use crate::behavior::{DocumentBehavior, GenericDocument};
pub use crate::field::{FieldCommand, FieldRecord};
pub use crate::linearize::{FormatOptions, Linearization};
pub use crate::model::TextModel;
pub use crate::navigator::{Cursor, UnitNavigator};
pub use crate::role::{Role, State};
pub use crate::word::WordDocument;

// ============================================================================
// Browse Mode
// ============================================================================

pub use crate::browse::{BrowsePolicy, DocumentBrowsePolicy, PassThroughReason, TabOutcome};
