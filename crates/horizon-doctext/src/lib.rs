//! Horizon Doctext - a linear, navigable text model over accessibility trees.
//!
//! Word-processor documents are exposed by an external accessibility tree
//! that this crate does not own. The document text model walks that tree and
//! presents it as one ordered stream of text runs and structural field
//! markers, removes the duplicate spans some providers emit, moves a cursor
//! by text units while stepping over invisible sentinels, and decides how
//! browse mode treats individual nodes.
//!
//! # Example
//!
//! ```ignore
//! use horizon_doctext::prelude::*;
//!
//! let config = TextModelConfig::default();
//! let word = WordDocument::new(&config)?;
//! let model = TextModel::new(&provider, &word, &config);
//!
//! let linear = model.linearize(&range, &FormatOptions::new())?;
//! println!("{}", linear.text);
//!
//! let mut cursor = Cursor::new(caret);
//! model.move_cursor(&mut cursor, TextUnit::Character, 1, None)?;
//! ```

pub use horizon_doctext_core::*;

pub mod behavior;
pub mod browse;
pub mod comment;
pub mod debug;
pub mod dedupe;
pub mod extract;
pub mod field;
pub mod linearize;
pub mod memory;
pub mod model;
pub mod navigator;
pub mod node;
pub mod prelude;
pub mod provider;
pub mod role;
pub mod word;

pub use behavior::{DocumentBehavior, GenericDocument, NodePlacement};
pub use browse::{
    BrowsePolicy, DefaultBrowsePolicy, DocumentBrowsePolicy, PassThroughReason, TabOutcome,
};
pub use comment::CommentReport;
pub use dedupe::{StructureIssue, eliminate_duplicates, validate_nesting};
pub use field::{FieldCommand, FieldRecord, FieldValue};
pub use linearize::{FormatOptions, Linearization};
pub use model::TextModel;
pub use navigator::{Cursor, Direction, UnitNavigator};
pub use node::{NodeInfo, TreeNode};
pub use provider::{SelectionSurface, TreeProvider};
pub use role::{Role, State, StateSet};
pub use word::WordDocument;
