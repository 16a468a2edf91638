//! Linearization of a tree range into text and field commands.
//!
//! The walk emits, in document order:
//!
//! 1. a `ControlStart` for each ancestor of the range's enclosing element,
//!    outermost first (the document root itself is not emitted);
//! 2. the range's content: text between child elements as `FormatChange` +
//!    `Text` pairs, and each child element as a `ControlStart`, its own
//!    content, and a `ControlEnd`;
//! 3. the ancestors' `ControlEnd`s, innermost first.
//!
//! The document behavior then post-processes the sequence, and the result is
//! checked for balanced nesting.

use std::cmp::Ordering;
use std::sync::Arc;

use horizon_doctext_core::logging::{span_names, targets};
use horizon_doctext_core::{Endpoint, Result, TextUnit};

use crate::behavior::{DocumentBehavior, NodePlacement};
use crate::dedupe::{StructureIssue, validate_nesting};
use crate::extract::extract_control_field;
use crate::field::{FieldCommand, FieldRecord, concat_text, keys};
use crate::model::TextModel;
use crate::node::TreeNode;
use crate::provider::{FormatQuery, RuntimeId, TreeProvider};

/// Options for a single linearization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Explicit split units. When `None`, the document decides how the first
    /// split is made.
    pub units: Option<Vec<TextUnit>>,
    /// Emit the enclosing element's ancestor chain around the content.
    pub include_ancestors: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            units: None,
            include_ancestors: true,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split text by exactly these units, coarsest first.
    pub fn units(mut self, units: impl Into<Vec<TextUnit>>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn without_ancestors(mut self) -> Self {
        self.include_ancestors = false;
        self
    }
}

/// The output of [`TextModel::linearize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linearization {
    /// Commands in document order.
    pub commands: Vec<FieldCommand>,
    /// Concatenated text payloads.
    pub text: String,
    /// Nesting problems left after post-processing.
    pub issues: Vec<StructureIssue>,
}

impl Linearization {
    pub fn is_well_formed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Copy the first command's `page-number` onto every format field.
///
/// All or nothing: when the first command carries no page number, no field
/// gains one. Returns the page number that was applied.
pub fn backfill_page_number(commands: &mut [FieldCommand]) -> Option<String> {
    let page = commands
        .first()
        .and_then(FieldCommand::field)
        .and_then(FieldRecord::page_number)
        .map(str::to_string)?;

    for command in commands.iter_mut() {
        if let FieldCommand::FormatChange(field) = command {
            field.set(keys::PAGE_NUMBER, page.clone());
        }
    }
    Some(page)
}

impl<P, B> TextModel<'_, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    /// Linearize `range` into an ordered sequence of field commands.
    ///
    /// Structural problems the document's post-processing cannot repair are
    /// reported in [`Linearization::issues`]; the best-effort sequence is
    /// still returned. Provider failures abort the call.
    pub fn linearize(&self, range: &P::Range, options: &FormatOptions) -> Result<Linearization> {
        let span = tracing::debug_span!(target: targets::LINEARIZE, span_names::LINEARIZE);
        let _guard = span.enter();

        let mut walk = Walk {
            model: self,
            commands: Vec::new(),
            chain: Vec::new(),
            reemitted: Vec::new(),
            units: options.units.as_deref(),
        };

        let ancestors = if options.include_ancestors {
            walk.ancestors(range)?
        } else {
            Vec::new()
        };

        let mut open = Vec::with_capacity(ancestors.len());
        for node in &ancestors {
            let placement = walk.placement(range, &node.range)?;
            let field = extract_control_field(&node.info, placement, self.behavior());
            let field = Arc::new(field);
            let start = FieldCommand::ControlStart(field.clone());
            walk.commands.push(start);
            walk.chain.push(node.info.runtime_id.clone());
            open.push(field);
        }

        walk.content(range, 0)?;

        for field in open.into_iter().rev() {
            walk.commands.push(FieldCommand::ControlEnd(field));
        }

        let mut commands = walk.commands;
        self.behavior().finish_commands(&mut commands);

        let issues = validate_nesting(&commands);
        for issue in &issues {
            tracing::warn!(target: targets::DEDUPE, "malformed structure: {issue}");
        }

        let text = concat_text(&commands);
        tracing::debug!(
            target: targets::LINEARIZE,
            commands = commands.len(),
            chars = text.chars().count(),
            "linearized"
        );

        Ok(Linearization {
            commands,
            text,
            issues,
        })
    }

    /// Split `range` into consecutive pieces of one unit each.
    ///
    /// The last piece is clipped to the end of `range`. Stops early if the
    /// provider fails to advance.
    pub fn chunks_by_unit(&self, range: &P::Range, unit: TextUnit) -> Result<Vec<P::Range>> {
        let provider = self.provider();
        let mut chunks = Vec::new();
        let mut current = provider.collapsed(range, Endpoint::Start)?;

        loop {
            let moved = provider.move_endpoint_by_unit(&mut current, Endpoint::End, unit, 1)?;
            let end = provider.compare(&current, Endpoint::End, range, Endpoint::End)?;
            if moved == 0 || end != Ordering::Less || provider.is_degenerate(&current)? {
                provider.set_endpoint(&mut current, Endpoint::End, range, Endpoint::End)?;
                if !provider.is_degenerate(&current)? {
                    chunks.push(current);
                }
                break;
            }
            let next = provider.collapsed(&current, Endpoint::End)?;
            chunks.push(current);
            current = next;
        }

        Ok(chunks)
    }
}

struct Walk<'m, 'a, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    model: &'m TextModel<'a, P, B>,
    commands: Vec<FieldCommand>,
    /// Runtime ids of the open control fields, outermost first.
    chain: Vec<RuntimeId>,
    /// Ancestors currently being walked a second time because the provider
    /// reported them as their own descendant.
    reemitted: Vec<RuntimeId>,
    units: Option<&'m [TextUnit]>,
}

impl<P, B> Walk<'_, '_, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    /// Snapshot the enclosing element and its ancestors, outermost first.
    fn ancestors(&self, range: &P::Range) -> Result<Vec<TreeNode<P::Element, P::Range>>> {
        let provider = self.model.provider();
        let root_id = provider.runtime_id(&provider.root_element()?)?;
        let max_depth = self.model.config().max_depth;

        let mut ancestors = Vec::new();
        let mut current = Some(provider.enclosing_element(range)?);
        while let Some(element) = current {
            let node = self.model.node(&element)?;
            if node.info.runtime_id == root_id {
                break;
            }
            if ancestors.len() >= max_depth {
                tracing::warn!(target: targets::LINEARIZE, max_depth, "ancestor chain truncated");
                break;
            }
            current = provider.parent(&element)?;
            ancestors.push(node);
        }

        ancestors.reverse();
        Ok(ancestors)
    }

    fn placement(&self, range: &P::Range, node_range: &P::Range) -> Result<NodePlacement> {
        let provider = self.model.provider();
        Ok(NodePlacement {
            embedded: provider.is_degenerate(node_range)?,
            start_of_node: provider.compare(range, Endpoint::Start, node_range, Endpoint::Start)?
                == Ordering::Equal,
            end_of_node: provider.compare(range, Endpoint::End, node_range, Endpoint::End)?
                == Ordering::Equal,
        })
    }

    /// Emit the content of `range`: children as control spans, everything
    /// between them as formatted text.
    fn content(&mut self, range: &P::Range, depth: usize) -> Result<()> {
        let model = self.model;
        let provider = model.provider();

        let children = if depth >= model.config().max_depth {
            tracing::warn!(target: targets::LINEARIZE, depth, "maximum depth reached, flattening");
            Vec::new()
        } else {
            provider.children(range)?
        };

        let mut cursor = provider.collapsed(range, Endpoint::Start)?;

        for child in children {
            let node = model.node(&child)?;

            let mut clipped = node.range.clone();
            if provider.compare(&clipped, Endpoint::Start, range, Endpoint::Start)?
                == Ordering::Less
            {
                provider.set_endpoint(&mut clipped, Endpoint::Start, range, Endpoint::Start)?;
            }
            if provider.compare(&clipped, Endpoint::End, range, Endpoint::End)?
                == Ordering::Greater
            {
                provider.set_endpoint(&mut clipped, Endpoint::End, range, Endpoint::End)?;
            }
            if provider.compare(&clipped, Endpoint::Start, &clipped, Endpoint::End)?
                == Ordering::Greater
            {
                tracing::trace!(
                    target: targets::LINEARIZE,
                    runtime_id = %node.info.runtime_id,
                    "child outside range"
                );
                continue;
            }
            if provider.compare(&clipped, Endpoint::Start, &cursor, Endpoint::Start)?
                == Ordering::Less
            {
                tracing::trace!(
                    target: targets::LINEARIZE,
                    runtime_id = %node.info.runtime_id,
                    "child overlaps emitted content"
                );
                continue;
            }

            let id = node.info.runtime_id.clone();
            let repeated = self.chain.contains(&id);
            if repeated && self.reemitted.contains(&id) {
                tracing::trace!(
                    target: targets::LINEARIZE,
                    runtime_id = %id,
                    "ancestor already re-emitted"
                );
                continue;
            }

            let mut gap = cursor.clone();
            provider.set_endpoint(&mut gap, Endpoint::End, &clipped, Endpoint::Start)?;
            self.text(&gap)?;

            let placement = self.placement(&clipped, &node.range)?;
            let field = extract_control_field(&node.info, placement, model.behavior());
            let field = Arc::new(field);
            let start = FieldCommand::ControlStart(field.clone());
            self.commands.push(start);

            self.chain.push(id.clone());
            if repeated {
                self.reemitted.push(id);
            }
            let walked = self.content(&clipped, depth + 1);
            if repeated {
                self.reemitted.pop();
            }
            self.chain.pop();
            walked?;

            self.commands.push(FieldCommand::ControlEnd(field));
            cursor = provider.collapsed(&clipped, Endpoint::End)?;
        }

        let mut tail = cursor;
        provider.set_endpoint(&mut tail, Endpoint::End, range, Endpoint::End)?;
        self.text(&tail)
    }

    /// Emit the text of `range` as formatted chunks.
    fn text(&mut self, range: &P::Range) -> Result<()> {
        let model = self.model;
        if model.provider().is_degenerate(range)? {
            return Ok(());
        }

        let declared = model.config().format_units.as_slice();
        match model
            .behavior()
            .first_split_units(self.units, declared)
            .and_then(<[TextUnit]>::split_first)
        {
            Some((unit, further)) => {
                for chunk in model.chunks_by_unit(range, *unit)? {
                    self.chunk(&chunk, further)?;
                }
                Ok(())
            }
            None => self.chunk(range, declared),
        }
    }

    /// Emit one chunk, splitting further while its format is mixed and finer
    /// units remain.
    fn chunk(&mut self, range: &P::Range, further: &[TextUnit]) -> Result<()> {
        let model = self.model;
        let format = model.provider().format(range)?;

        if format.is_mixed()
            && let Some((unit, rest)) = further.split_first()
        {
            for sub in model.chunks_by_unit(range, *unit)? {
                self.chunk(&sub, rest)?;
            }
            return Ok(());
        }

        let text = model.text(range)?;
        if text.is_empty() {
            return Ok(());
        }

        let field = match format {
            FormatQuery::Uniform(attributes) => FieldRecord::format(attributes),
            FormatQuery::Mixed => FieldRecord::default(),
        };
        self.commands.push(FieldCommand::FormatChange(field));
        self.commands.push(FieldCommand::Text(text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn test_backfill_from_first_field() {
        let mut page = FieldRecord::control(Role::Group, RuntimeId::new([1]));
        page.set(keys::PAGE_NUMBER, "4");
        let (start, end) = crate::field::control_pair(page);

        let mut commands = vec![
            start,
            FieldCommand::FormatChange(FieldRecord::default()),
            FieldCommand::Text("a".into()),
            FieldCommand::FormatChange(FieldRecord::default()),
            FieldCommand::Text("b".into()),
            end,
        ];

        assert_eq!(backfill_page_number(&mut commands).as_deref(), Some("4"));
        let pages: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                FieldCommand::FormatChange(f) => f.page_number(),
                _ => None,
            })
            .collect();
        assert_eq!(pages, vec!["4", "4"]);
    }

    #[test]
    fn test_backfill_without_page_changes_nothing() {
        let mut commands = vec![
            FieldCommand::FormatChange(FieldRecord::default()),
            FieldCommand::Text("a".into()),
        ];
        let before = commands.clone();
        assert_eq!(backfill_page_number(&mut commands), None);
        assert_eq!(commands, before);
    }

    #[test]
    fn test_backfill_on_text_first_is_noop() {
        let mut commands = vec![FieldCommand::Text("a".into())];
        assert_eq!(backfill_page_number(&mut commands), None);
    }
}
