//! Unit-based caret and selection movement.

use horizon_doctext_core::logging::{span_names, targets};
use horizon_doctext_core::{Endpoint, Result, TextUnit};

use crate::behavior::DocumentBehavior;
use crate::linearize::{FormatOptions, Linearization};
use crate::model::TextModel;
use crate::provider::TreeProvider;

/// Direction of the last move made by a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn of(count: i32) -> Option<Self> {
        match count.signum() {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Backward),
            _ => None,
        }
    }

    fn step(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// A range owned by one navigation request.
///
/// Moves replace the range only when they succeed, so a provider failure
/// leaves the cursor at its last valid position.
#[derive(Debug, Clone)]
pub struct Cursor<R> {
    range: R,
    direction: Option<Direction>,
    collapsed: Option<bool>,
}

impl<R> Cursor<R> {
    pub fn new(range: R) -> Self {
        Self {
            range,
            direction: None,
            collapsed: None,
        }
    }

    pub fn range(&self) -> &R {
        &self.range
    }

    pub fn into_range(self) -> R {
        self.range
    }

    /// Direction of the last successful move.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Collapse state from the last [`TextModel::is_collapsed`] query, cleared
    /// by every move.
    pub fn last_collapsed(&self) -> Option<bool> {
        self.collapsed
    }

    fn replace(&mut self, range: R, count: i32) {
        self.range = range;
        self.direction = Direction::of(count).or(self.direction);
        self.collapsed = None;
    }
}

impl<P, B> TextModel<'_, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    /// Move `cursor` by `count` units (negative moves backward).
    ///
    /// With an `endpoint`, only that end of the range moves and no sentinel
    /// handling applies. Without one, the whole range moves and then steps
    /// over any sentinel it lands on, one unit at a time in the same
    /// direction, stopping on the sentinel if no further move is possible.
    ///
    /// Returns the number of units the initial move covered; `0` means the
    /// cursor is already at a boundary.
    pub fn move_cursor(
        &self,
        cursor: &mut Cursor<P::Range>,
        unit: TextUnit,
        count: i32,
        endpoint: Option<Endpoint>,
    ) -> Result<i32> {
        let span = tracing::trace_span!(
            target: targets::NAVIGATE,
            span_names::MOVE,
            unit = unit.as_str(),
            count
        );
        let _guard = span.enter();
        let provider = self.provider();

        let mut range = cursor.range.clone();
        if let Some(endpoint) = endpoint {
            let moved = provider.move_endpoint_by_unit(&mut range, endpoint, unit, count)?;
            if moved != 0 {
                cursor.replace(range, count);
            }
            return Ok(moved);
        }

        let moved = provider.move_by_unit(&mut range, unit, count)?;
        if moved == 0 {
            return Ok(0);
        }

        let step = Direction::of(moved).map_or(count.signum(), Direction::step);
        let limit = self.config().sentinel_skip_limit;
        let mut skipped = 0;
        while self.is_on_sentinel(&range)? {
            if skipped >= limit {
                tracing::warn!(target: targets::NAVIGATE, limit, "too many consecutive sentinels");
                break;
            }
            let mut next = range.clone();
            if provider.move_by_unit(&mut next, unit, step)? == 0 {
                tracing::trace!(target: targets::NAVIGATE, "sentinel at document boundary");
                break;
            }
            range = next;
            skipped += 1;
        }
        if skipped > 0 {
            tracing::trace!(target: targets::NAVIGATE, skipped, "skipped sentinels");
        }

        cursor.replace(range, moved);
        Ok(moved)
    }

    /// Whether the cursor is collapsed, recording the answer on the cursor.
    pub fn is_collapsed(&self, cursor: &mut Cursor<P::Range>) -> Result<bool> {
        let collapsed = self.is_range_collapsed(&cursor.range)?;
        cursor.collapsed = Some(collapsed);
        Ok(collapsed)
    }

    /// Provider collapse state, corrected to `true` for ranges without
    /// readable text when the document asks for it.
    pub fn is_range_collapsed(&self, range: &P::Range) -> Result<bool> {
        if self.provider().is_degenerate(range)? {
            return Ok(true);
        }
        if self.behavior().empty_text_is_collapsed() {
            return Ok(self.text(range)?.is_empty());
        }
        Ok(false)
    }

    /// Whether the character at the start of `range` is a sentinel.
    fn is_on_sentinel(&self, range: &P::Range) -> Result<bool> {
        let mut character = range.clone();
        self.provider()
            .expand_to_unit(&mut character, TextUnit::Character)?;
        let raw = self.raw_text(&character)?;
        Ok(self.behavior().is_sentinel(&raw))
    }
}

/// A model paired with a cursor it moves.
pub struct UnitNavigator<'m, 'a, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    model: &'m TextModel<'a, P, B>,
    cursor: Cursor<P::Range>,
}

impl<'m, 'a, P, B> UnitNavigator<'m, 'a, P, B>
where
    P: TreeProvider,
    B: DocumentBehavior + ?Sized,
{
    pub fn new(model: &'m TextModel<'a, P, B>, range: P::Range) -> Self {
        Self {
            model,
            cursor: Cursor::new(range),
        }
    }

    pub fn cursor(&self) -> &Cursor<P::Range> {
        &self.cursor
    }

    pub fn range(&self) -> &P::Range {
        self.cursor.range()
    }

    /// Move the whole range, skipping sentinels.
    pub fn move_by(&mut self, unit: TextUnit, count: i32) -> Result<i32> {
        self.model.move_cursor(&mut self.cursor, unit, count, None)
    }

    /// Move one endpoint.
    pub fn move_endpoint(&mut self, endpoint: Endpoint, unit: TextUnit, count: i32) -> Result<i32> {
        self.model
            .move_cursor(&mut self.cursor, unit, count, Some(endpoint))
    }

    /// Expand the range to the unit containing its start.
    pub fn expand(&mut self, unit: TextUnit) -> Result<()> {
        let mut range = self.cursor.range.clone();
        self.model.provider().expand_to_unit(&mut range, unit)?;
        self.cursor.range = range;
        self.cursor.collapsed = None;
        Ok(())
    }

    /// Collapse the range onto one of its endpoints.
    pub fn collapse(&mut self, endpoint: Endpoint) -> Result<()> {
        let provider = self.model.provider();
        let range = provider.collapsed(&self.cursor.range, endpoint)?;
        self.cursor.range = range;
        self.cursor.collapsed = None;
        Ok(())
    }

    pub fn is_collapsed(&mut self) -> Result<bool> {
        self.model.is_collapsed(&mut self.cursor)
    }

    pub fn text(&self) -> Result<String> {
        self.model.text(&self.cursor.range)
    }

    pub fn linearize(&self, options: &FormatOptions) -> Result<Linearization> {
        self.model.linearize(&self.cursor.range, options)
    }

    pub fn into_cursor(self) -> Cursor<P::Range> {
        self.cursor
    }
}
