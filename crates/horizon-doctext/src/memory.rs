//! An in-memory tree provider.
//!
//! [`MemoryDocument`] holds a flat text buffer and a tree of elements over
//! byte ranges of it. It implements [`TreeProvider`] and
//! [`SelectionSurface`], so documents can be linearized and navigated without
//! a live accessibility connection.
//!
//! ```ignore
//! let mut builder = MemoryDocument::builder();
//! let page = ElementSpec::new(ControlType::Group).automation_id("UIA_AutomationId_Word_Page_1");
//! builder.open(page);
//! builder.text("See note ");
//! builder.leaf(ElementSpec::new(ControlType::Custom).name("1"), "1");
//! builder.close();
//! let document = builder.build();
//! ```
//!
//! Element ranges are taken from the text written while they are open. An
//! element whose range equals its only child's is reached through the child
//! when walking by range, as with real providers.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use horizon_doctext_core::logging::targets;
use horizon_doctext_core::{Endpoint, Error, Result, TextUnit};
use parking_lot::{Mutex, RwLock};
use unicode_segmentation::UnicodeSegmentation;

use crate::comment::COMMENT_CONTAINER_NAME;
use crate::provider::{
    AttributeId, AttributeValue, ControlType, FormatAttributes, FormatQuery, KeyGesture, RuntimeId,
    SelectionSurface, TreeProvider,
};

/// Runtime id prefix shared by every element of a memory document.
const RUNTIME_ID_PREFIX: i32 = 42;

/// A byte span of a [`MemoryDocument`]'s text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryRange {
    start: usize,
    end: usize,
}

impl MemoryRange {
    /// A range between two offsets, in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A collapsed range at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn endpoint(&self, endpoint: Endpoint) -> usize {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    /// Move one endpoint, dragging the other along if they would cross.
    fn set(&mut self, endpoint: Endpoint, offset: usize) {
        match endpoint {
            Endpoint::Start => {
                self.start = offset;
                self.end = self.end.max(offset);
            }
            Endpoint::End => {
                self.end = offset;
                self.start = self.start.min(offset);
            }
        }
    }
}

/// Handle to an element of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// The document root.
    pub const ROOT: ElementId = ElementId(0);

    /// The element's runtime id component.
    fn runtime_index(self) -> Result<i32> {
        i32::try_from(self.0).map_err(|_| {
            let message = format!("element {} is outside the runtime id range", self.0);
            Error::provider("runtime_id", message)
        })
    }
}

/// Attributes of an element added through [`MemoryDocumentBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    control_type: ControlType,
    automation_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    focusable: bool,
    focused: bool,
    read_only: bool,
}

impl ElementSpec {
    pub fn new(control_type: ControlType) -> Self {
        Self {
            control_type,
            automation_id: None,
            name: None,
            description: None,
            focusable: false,
            focused: false,
            read_only: false,
        }
    }

    pub fn automation_id(mut self, id: impl Into<String>) -> Self {
        self.automation_id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    spec: ElementSpec,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    range: MemoryRange,
    /// Text of elements that live outside the document body.
    detached_text: Option<String>,
}

impl ElementData {
    fn is_detached(&self) -> bool {
        self.detached_text.is_some()
    }
}

#[derive(Debug, Clone)]
struct FormatRun {
    range: MemoryRange,
    attributes: FormatAttributes,
}

/// Builds a [`MemoryDocument`] in document order.
#[derive(Debug)]
pub struct MemoryDocumentBuilder {
    text: String,
    elements: Vec<ElementData>,
    open: Vec<ElementId>,
    runs: Vec<FormatRun>,
    annotations: Vec<(MemoryRange, ElementId)>,
    comments: Option<ElementId>,
    reemitted: Vec<(ElementId, ElementId)>,
    tab_stops: Vec<ElementId>,
}

impl Default for MemoryDocumentBuilder {
    fn default() -> Self {
        let root = ElementData {
            spec: ElementSpec::new(ControlType::Document).automation_id("Body"),
            parent: None,
            children: Vec::new(),
            range: MemoryRange::default(),
            detached_text: None,
        };
        Self {
            text: String::new(),
            elements: vec![root],
            open: vec![ElementId::ROOT],
            runs: Vec::new(),
            annotations: Vec::new(),
            comments: None,
            reemitted: Vec::new(),
            tab_stops: Vec::new(),
        }
    }
}

impl MemoryDocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> ElementId {
        self.open.last().copied().unwrap_or(ElementId::ROOT)
    }

    fn add(&mut self, parent: ElementId, data: ElementData) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(data);
        self.elements[parent.0].children.push(id);
        id
    }

    /// Append text to the innermost open element.
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Append text carrying the given format attributes.
    pub fn formatted_text(&mut self, text: &str, attributes: FormatAttributes) -> &mut Self {
        let start = self.text.len();
        self.text.push_str(text);
        self.runs.push(FormatRun {
            range: MemoryRange::new(start, self.text.len()),
            attributes,
        });
        self
    }

    /// Open a child of the innermost open element. Text written until the
    /// matching [`close`](Self::close) belongs to it.
    pub fn open(&mut self, spec: ElementSpec) -> ElementId {
        let offset = self.text.len();
        let parent = self.current();
        let id = self.add(
            parent,
            ElementData {
                spec,
                parent: Some(parent),
                children: Vec::new(),
                range: MemoryRange::caret(offset),
                detached_text: None,
            },
        );
        self.open.push(id);
        id
    }

    /// Close the innermost open element. The root is never closed.
    pub fn close(&mut self) -> &mut Self {
        if self.open.len() > 1
            && let Some(id) = self.open.pop()
        {
            self.elements[id.0].range.end = self.text.len();
        }
        self
    }

    /// An element holding exactly `text`.
    pub fn leaf(&mut self, spec: ElementSpec, text: &str) -> ElementId {
        let id = self.open(spec);
        self.text(text);
        self.close();
        id
    }

    /// An embedded object occupying no text.
    pub fn embedded(&mut self, spec: ElementSpec) -> ElementId {
        let id = self.open(spec);
        self.close();
        id
    }

    /// Append `anchor` as document text with a comment annotated on it.
    ///
    /// The comment body is placed in a detached container named `Comment`,
    /// preceded by an author element and a date element.
    pub fn comment(&mut self, anchor: &str, body: &str, author: &str, date: &str) -> &mut Self {
        let start = self.text.len();
        self.text.push_str(anchor);
        let anchor_range = MemoryRange::new(start, self.text.len());

        let container = match self.comments {
            Some(container) => container,
            None => {
                let container = self.add(
                    ElementId::ROOT,
                    ElementData {
                        spec: ElementSpec::new(ControlType::Group).name(COMMENT_CONTAINER_NAME),
                        parent: Some(ElementId::ROOT),
                        children: Vec::new(),
                        range: MemoryRange::default(),
                        detached_text: Some(String::new()),
                    },
                );
                self.comments = Some(container);
                container
            }
        };

        let mut detached = |spec: ElementSpec, text: &str| {
            self.add(
                container,
                ElementData {
                    spec,
                    parent: Some(container),
                    children: Vec::new(),
                    range: MemoryRange::default(),
                    detached_text: Some(text.to_string()),
                },
            )
        };
        detached(ElementSpec::new(ControlType::Text).name(author), author);
        detached(ElementSpec::new(ControlType::Text).name(date), date);
        let body_spec = ElementSpec::new(ControlType::Edit).name("Comment text");
        let body = detached(body_spec, body);

        self.annotations.push((anchor_range, body));
        self
    }

    /// Make the provider report `ancestor` among the children of ranges
    /// enclosed by `host`, reproducing the ancestor re-emission defect.
    pub fn reemit_ancestor(&mut self, host: ElementId, ancestor: ElementId) -> &mut Self {
        self.reemitted.push((host, ancestor));
        self
    }

    /// Make `element` a stop for tab gestures, in the order added.
    pub fn tab_stop(&mut self, element: ElementId) -> &mut Self {
        self.tab_stops.push(element);
        self
    }

    /// Finish the document, closing any elements still open.
    pub fn build(mut self) -> MemoryDocument {
        while self.open.len() > 1 {
            self.close();
        }
        self.elements[0].range = MemoryRange::new(0, self.text.len());

        let mut tab_stops: Vec<MemoryRange> = self
            .tab_stops
            .iter()
            .map(|id| self.elements[id.0].range)
            .collect();
        tab_stops.sort_by_key(|r| (r.start, r.end));

        MemoryDocument {
            text: self.text,
            elements: self.elements,
            runs: self.runs,
            annotations: self.annotations,
            reemitted: self.reemitted,
            tab_stops,
            selection: RwLock::new(MemoryRange::caret(0)),
            gestures: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
        }
    }
}

/// A complete document held in memory.
#[derive(Debug)]
pub struct MemoryDocument {
    text: String,
    elements: Vec<ElementData>,
    runs: Vec<FormatRun>,
    annotations: Vec<(MemoryRange, ElementId)>,
    reemitted: Vec<(ElementId, ElementId)>,
    tab_stops: Vec<MemoryRange>,
    selection: RwLock<MemoryRange>,
    gestures: Mutex<Vec<KeyGesture>>,
    connected: AtomicBool,
}

impl MemoryDocument {
    pub fn builder() -> MemoryDocumentBuilder {
        MemoryDocumentBuilder::new()
    }

    /// A document consisting of plain text only.
    pub fn from_text(text: &str) -> Self {
        let mut builder = Self::builder();
        builder.text(text);
        builder.build()
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// The range spanning the whole document.
    pub fn document_range(&self) -> MemoryRange {
        MemoryRange::new(0, self.text.len())
    }

    /// The range of an element, without the connection check.
    pub fn range_of(&self, element: ElementId) -> Option<MemoryRange> {
        self.elements.get(element.0).map(|e| e.range)
    }

    pub fn set_selection(&self, range: MemoryRange) {
        *self.selection.write() = range;
    }

    /// Gestures received through [`SelectionSurface::send_gesture`].
    pub fn sent_gestures(&self) -> Vec<KeyGesture> {
        self.gestures.lock().clone()
    }

    /// Make every subsequent call fail as if the provider had gone away.
    pub fn disconnect(&self) {
        tracing::debug!(target: targets::PROVIDER, "memory document disconnected");
        self.connected.store(false, AtomicOrdering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, AtomicOrdering::SeqCst);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.connected.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(Error::provider(
                operation,
                "document is no longer available",
            ))
        }
    }

    fn data(&self, element: &ElementId, operation: &'static str) -> Result<&ElementData> {
        self.check(operation)?;
        self.elements
            .get(element.0)
            .ok_or_else(|| Error::provider(operation, format!("unknown element {}", element.0)))
    }

    fn clamp(&self, range: &MemoryRange) -> MemoryRange {
        let len = self.text.len();
        MemoryRange::new(range.start.min(len), range.end.min(len))
    }

    /// Sorted unit boundaries, always including `0` and the text length.
    fn boundaries(&self, unit: TextUnit) -> Vec<usize> {
        let text = self.text.as_str();
        let len = text.len();
        let mut bounds = vec![0];

        match unit {
            TextUnit::Character => {
                bounds.extend(text.grapheme_indices(true).map(|(i, _)| i));
            }
            TextUnit::Word => {
                bounds.extend(
                    text.split_word_bound_indices()
                        .filter(|(_, segment)| !segment.chars().all(char::is_whitespace))
                        .map(|(i, _)| i),
                );
            }
            TextUnit::Line => bounds.extend(break_offsets(text, &['\n', '\r', '\u{0B}'])),
            TextUnit::Paragraph => bounds.extend(break_offsets(text, &['\n', '\r'])),
            TextUnit::Format => {
                for run in &self.runs {
                    bounds.push(run.range.start);
                    bounds.push(run.range.end);
                }
            }
            TextUnit::Page | TextUnit::Document => {}
        }

        bounds.push(len);
        bounds.retain(|&b| b <= len);
        bounds.sort_unstable();
        bounds.dedup();
        bounds
    }

    fn format_at(&self, offset: usize) -> Option<&FormatAttributes> {
        self.runs
            .iter()
            .rev()
            .find(|run| run.range.start <= offset && offset < run.range.end)
            .map(|run| &run.attributes)
    }

    /// Deepest attached element containing `range`.
    fn enclosing(&self, range: &MemoryRange) -> ElementId {
        let mut current = ElementId::ROOT;
        'descend: loop {
            for &child in &self.elements[current.0].children {
                let data = &self.elements[child.0];
                if data.is_detached() || data.range.is_empty() {
                    continue;
                }
                if data.range.start <= range.start && range.end <= data.range.end {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }
}

/// Offsets just after each break character, treating `\r\n` as one break.
fn break_offsets<'t>(text: &'t str, breaks: &'t [char]) -> impl Iterator<Item = usize> + 't {
    text.char_indices().filter_map(move |(i, c)| {
        if !breaks.contains(&c) {
            return None;
        }
        if c == '\r' && text[i + 1..].starts_with('\n') {
            return None;
        }
        Some(i + c.len_utf8())
    })
}

impl TreeProvider for MemoryDocument {
    type Range = MemoryRange;
    type Element = ElementId;

    fn compare(
        &self,
        a: &MemoryRange,
        a_endpoint: Endpoint,
        b: &MemoryRange,
        b_endpoint: Endpoint,
    ) -> Result<Ordering> {
        self.check("compare")?;
        Ok(a.endpoint(a_endpoint).cmp(&b.endpoint(b_endpoint)))
    }

    fn text(&self, range: &MemoryRange, max_length: Option<usize>) -> Result<String> {
        self.check("text")?;
        let range = self.clamp(range);
        let text = self
            .text
            .get(range.start..range.end)
            .ok_or_else(|| Error::provider("text", "range is not on a character boundary"))?;
        Ok(match max_length {
            Some(max) => text.chars().take(max).collect(),
            None => text.to_string(),
        })
    }

    fn expand_to_unit(&self, range: &mut MemoryRange, unit: TextUnit) -> Result<()> {
        self.check("expand_to_unit")?;
        let bounds = self.boundaries(unit);
        let len = self.text.len();
        let position = range.start.min(len);
        if position == len {
            *range = MemoryRange::caret(len);
            return Ok(());
        }
        let index = bounds.partition_point(|&b| b <= position) - 1;
        *range = MemoryRange::new(bounds[index], bounds[index + 1]);
        Ok(())
    }

    fn move_by_unit(&self, range: &mut MemoryRange, unit: TextUnit, count: i32) -> Result<i32> {
        self.check("move_by_unit")?;
        let bounds = self.boundaries(unit);
        let degenerate = range.is_empty();
        let position = range.start.min(self.text.len());
        let floor = bounds.partition_point(|&b| b <= position) - 1;
        // Non-degenerate ranges cover a whole unit, so they may not start at the end.
        let last = if degenerate {
            bounds.len() - 1
        } else {
            bounds.len().saturating_sub(2)
        };

        let mut index = floor;
        let mut moved = 0;
        if count > 0 {
            while moved < count && index < last {
                index += 1;
                moved += 1;
            }
        } else if count < 0 {
            if bounds[floor] < position {
                moved -= 1;
            }
            while moved > count && index > 0 {
                index -= 1;
                moved -= 1;
            }
        }

        if moved == 0 {
            return Ok(0);
        }
        let start = bounds[index];
        *range = if degenerate || index + 1 >= bounds.len() {
            MemoryRange::caret(start)
        } else {
            MemoryRange::new(start, bounds[index + 1])
        };
        Ok(moved)
    }

    fn move_endpoint_by_unit(
        &self,
        range: &mut MemoryRange,
        endpoint: Endpoint,
        unit: TextUnit,
        count: i32,
    ) -> Result<i32> {
        self.check("move_endpoint_by_unit")?;
        let bounds = self.boundaries(unit);
        let mut position = range.endpoint(endpoint).min(self.text.len());
        let mut moved = 0;

        while moved < count {
            match bounds.iter().find(|&&b| b > position) {
                Some(&next) => position = next,
                None => break,
            }
            moved += 1;
        }
        while moved > count {
            match bounds.iter().rev().find(|&&b| b < position) {
                Some(&previous) => position = previous,
                None => break,
            }
            moved -= 1;
        }

        if moved != 0 {
            range.set(endpoint, position);
        }
        Ok(moved)
    }

    fn set_endpoint(
        &self,
        range: &mut MemoryRange,
        endpoint: Endpoint,
        source: &MemoryRange,
        source_endpoint: Endpoint,
    ) -> Result<()> {
        self.check("set_endpoint")?;
        range.set(endpoint, source.endpoint(source_endpoint));
        Ok(())
    }

    fn is_degenerate(&self, range: &MemoryRange) -> Result<bool> {
        self.check("is_degenerate")?;
        Ok(range.is_empty())
    }

    fn format(&self, range: &MemoryRange) -> Result<FormatQuery> {
        self.check("format")?;
        let range = self.clamp(range);
        let empty = FormatAttributes::new();

        let mut points = vec![range.start];
        for run in &self.runs {
            for offset in [run.range.start, run.range.end] {
                if range.start < offset && offset < range.end {
                    points.push(offset);
                }
            }
        }

        let first = self.format_at(range.start).unwrap_or(&empty);
        for point in points {
            if self.format_at(point).unwrap_or(&empty) != first {
                return Ok(FormatQuery::Mixed);
            }
        }
        Ok(FormatQuery::Uniform(first.clone()))
    }

    fn annotations(&self, range: &MemoryRange) -> Result<Vec<ElementId>> {
        self.check("annotations")?;
        let end = range.end.max(range.start + 1);
        Ok(self
            .annotations
            .iter()
            .filter(|(anchor, _)| anchor.start < end && range.start < anchor.end)
            .map(|(_, element)| *element)
            .collect())
    }

    fn children(&self, range: &MemoryRange) -> Result<Vec<ElementId>> {
        self.check("children")?;
        let range = self.clamp(range);
        let host = self.enclosing(&range);

        let mut children: Vec<ElementId> = self
            .reemitted
            .iter()
            .filter(|(h, _)| *h == host)
            .map(|(_, ancestor)| *ancestor)
            .collect();

        for &child in &self.elements[host.0].children {
            let data = &self.elements[child.0];
            if data.is_detached() {
                continue;
            }
            let child_range = data.range;
            let overlaps = if child_range.is_empty() {
                range.start <= child_range.start && child_range.start < range.end
            } else {
                child_range.start < range.end && range.start < child_range.end
            };
            if overlaps {
                children.push(child);
            }
        }
        Ok(children)
    }

    fn enclosing_element(&self, range: &MemoryRange) -> Result<ElementId> {
        self.check("enclosing_element")?;
        Ok(self.enclosing(&self.clamp(range)))
    }

    fn root_element(&self) -> Result<ElementId> {
        self.check("root_element")?;
        Ok(ElementId::ROOT)
    }

    fn parent(&self, element: &ElementId) -> Result<Option<ElementId>> {
        Ok(self.data(element, "parent")?.parent)
    }

    fn previous_sibling(&self, element: &ElementId) -> Result<Option<ElementId>> {
        let Some(parent) = self.data(element, "previous_sibling")?.parent else {
            return Ok(None);
        };
        let siblings = &self.elements[parent.0].children;
        Ok(siblings
            .iter()
            .position(|id| id == element)
            .and_then(|pos| pos.checked_sub(1))
            .map(|pos| siblings[pos]))
    }

    fn element_range(&self, element: &ElementId) -> Result<MemoryRange> {
        Ok(self.data(element, "element_range")?.range)
    }

    fn element_text(&self, element: &ElementId) -> Result<String> {
        let data = self.data(element, "element_text")?;
        match &data.detached_text {
            Some(text) => Ok(text.clone()),
            None => self.text(&data.range, None),
        }
    }

    fn runtime_id(&self, element: &ElementId) -> Result<RuntimeId> {
        self.data(element, "runtime_id")?;
        let index = element.runtime_index()?;
        Ok(RuntimeId::new([RUNTIME_ID_PREFIX, index]))
    }

    fn attribute(&self, element: &ElementId, id: AttributeId) -> Result<Option<AttributeValue>> {
        let spec = &self.data(element, "attribute")?.spec;
        Ok(match id {
            AttributeId::AutomationId => spec.automation_id.clone().map(AttributeValue::Str),
            AttributeId::ControlType => Some(AttributeValue::ControlType(spec.control_type)),
            AttributeId::Name => spec.name.clone().map(AttributeValue::Str),
            AttributeId::Description => spec.description.clone().map(AttributeValue::Str),
            AttributeId::IsKeyboardFocusable => Some(AttributeValue::Bool(spec.focusable)),
            AttributeId::HasKeyboardFocus => Some(AttributeValue::Bool(spec.focused)),
            AttributeId::IsReadOnly => Some(AttributeValue::Bool(spec.read_only)),
        })
    }
}

impl SelectionSurface for MemoryDocument {
    fn selection(&self) -> Result<MemoryRange> {
        self.check("selection")?;
        Ok(*self.selection.read())
    }

    /// Tab moves the selection to the next tab stop, shift+tab to the
    /// previous one. Other gestures are only recorded.
    fn send_gesture(&self, gesture: &KeyGesture) -> Result<()> {
        self.check("send_gesture")?;
        self.gestures.lock().push(*gesture);
        if !gesture.is_tab() {
            return Ok(());
        }

        let mut selection = self.selection.write();
        let current = selection.start;
        let stops = &self.tab_stops;
        let target = if gesture.shift {
            stops.iter().rev().find(|stop| stop.start < current)
        } else {
            stops.iter().find(|stop| stop.start > current)
        };
        if let Some(stop) = target {
            *selection = *stop;
        }
        Ok(())
    }
}
