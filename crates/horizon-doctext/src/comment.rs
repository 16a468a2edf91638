//! Reporting the comment anchored at the caret.

use std::fmt;

use horizon_doctext_core::logging::targets;
use horizon_doctext_core::{Result, TextUnit};

use crate::behavior::DocumentBehavior;
use crate::model::TextModel;
use crate::provider::{AttributeId, SelectionSurface, TreeProvider};

/// Name of the container that holds a document's comment elements.
pub const COMMENT_CONTAINER_NAME: &str = "Comment";

/// A comment, its author and its date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentReport {
    pub text: String,
    pub author: String,
    pub date: String,
}

impl fmt::Display for CommentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} on {}", self.text, self.author, self.date)
    }
}

impl<P, B> TextModel<'_, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    /// The comment anchored at the character under `caret`, if any.
    ///
    /// Comment bodies live inside a container named `Comment`; the element
    /// before the body carries the date as its name, and the one before that
    /// the author.
    pub fn comment_at(&self, caret: &P::Range) -> Result<Option<CommentReport>> {
        let provider = self.provider();
        let mut character = caret.clone();
        provider.expand_to_unit(&mut character, TextUnit::Character)?;

        for annotation in provider.annotations(&character)? {
            let Some(parent) = provider.parent(&annotation)? else {
                continue;
            };
            let name = provider.string_attribute(&parent, AttributeId::Name)?;
            if name.as_deref() != Some(COMMENT_CONTAINER_NAME) {
                continue;
            }

            let body = provider.element_text(&annotation)?;
            let text = self.behavior().clean_text(body);
            let date_element = provider.previous_sibling(&annotation)?;
            let date = match &date_element {
                Some(element) => self.name_of(element)?,
                None => String::new(),
            };
            let author = match &date_element {
                Some(element) => match provider.previous_sibling(element)? {
                    Some(author) => self.name_of(&author)?,
                    None => String::new(),
                },
                None => String::new(),
            };

            tracing::debug!(target: targets::PROVIDER, %author, %date, "comment at caret");
            return Ok(Some(CommentReport { text, author, date }));
        }

        Ok(None)
    }

    fn name_of(&self, element: &P::Element) -> Result<String> {
        Ok(self
            .provider()
            .string_attribute(element, AttributeId::Name)?
            .unwrap_or_default())
    }
}

impl<P, B> TextModel<'_, P, B>
where
    P: SelectionSurface,
    B: DocumentBehavior + ?Sized,
{
    /// The comment anchored at the current caret.
    pub fn current_comment(&self) -> Result<Option<CommentReport>> {
        let caret = self.provider().selection()?;
        self.comment_at(&caret)
    }
}
