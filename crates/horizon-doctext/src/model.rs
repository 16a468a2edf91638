//! The document text model: a provider, a behavior table and a configuration.

use horizon_doctext_core::logging::targets;
use horizon_doctext_core::{Result, TextModelConfig};

use crate::behavior::DocumentBehavior;
use crate::node::TreeNode;
use crate::provider::TreeProvider;

/// Borrowed view over one document.
///
/// A `TextModel` owns nothing: the tree belongs to the provider, the
/// behavior table and configuration belong to the caller. Every operation
/// re-queries the provider, so a model can be created per request and dropped
/// afterwards.
pub struct TextModel<'a, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    provider: &'a P,
    behavior: &'a B,
    config: &'a TextModelConfig,
}

impl<'a, P, B> TextModel<'a, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    pub fn new(provider: &'a P, behavior: &'a B, config: &'a TextModelConfig) -> Self {
        Self {
            provider,
            behavior,
            config,
        }
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    pub fn behavior(&self) -> &'a B {
        self.behavior
    }

    pub fn config(&self) -> &'a TextModelConfig {
        self.config
    }

    /// Readable text of a range, with the document's text cleanup applied.
    pub fn text(&self, range: &P::Range) -> Result<String> {
        let raw = self.raw_text(range)?;
        Ok(self.behavior.clean_text(raw))
    }

    /// Text of a range exactly as the provider reports it.
    pub(crate) fn raw_text(&self, range: &P::Range) -> Result<String> {
        self.provider
            .text(range, self.config.max_text_length)
            .inspect_err(|e| tracing::warn!(target: targets::PROVIDER, "text query failed: {e}"))
    }

    /// Snapshot an element.
    pub fn node(&self, element: &P::Element) -> Result<TreeNode<P::Element, P::Range>> {
        TreeNode::fetch(self.provider, element, self.behavior)
            .inspect_err(|e| tracing::warn!(target: targets::PROVIDER, "node snapshot failed: {e}"))
    }
}
