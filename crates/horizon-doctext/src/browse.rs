//! Browse-mode focus and pass-through policy, and tab gesture handling.

use std::thread;
use std::time::Instant;

use horizon_doctext_core::Result;
use horizon_doctext_core::logging::{span_names, targets};

use crate::behavior::DocumentBehavior;
use crate::model::TextModel;
use crate::node::NodeInfo;
use crate::provider::{KeyGesture, SelectionSurface};
use crate::role::{Role, State};

/// Why browse mode is asking whether to pass input through to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PassThroughReason {
    /// Focus moved to the node.
    #[default]
    Focus,
    /// The caret moved into the node.
    Caret,
    /// The node was reached by single-letter quick navigation.
    QuickNav,
}

/// Decides how browse mode treats individual nodes.
pub trait BrowsePolicy {
    /// Whether moving the browse cursor onto `node` should also move system focus.
    fn should_set_focus_to(&self, node: &NodeInfo) -> bool;

    /// Whether keystrokes should go straight to `node` instead of browse mode.
    fn should_pass_through(&self, node: &NodeInfo, reason: PassThroughReason) -> bool;
}

/// Policy used when a document has no special rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBrowsePolicy;

impl DefaultBrowsePolicy {
    fn is_interactive(node: &NodeInfo) -> bool {
        match node.role {
            Role::EditableText => !node.states.contains(State::ReadOnly),
            Role::ComboBox => true,
            _ => false,
        }
    }
}

impl BrowsePolicy for DefaultBrowsePolicy {
    fn should_set_focus_to(&self, node: &NodeInfo) -> bool {
        node.states.contains(State::Focusable)
    }

    fn should_pass_through(&self, node: &NodeInfo, reason: PassThroughReason) -> bool {
        match reason {
            PassThroughReason::QuickNav => false,
            PassThroughReason::Focus => Self::is_interactive(node),
            PassThroughReason::Caret => {
                Self::is_interactive(node) && node.states.contains(State::Focused)
            }
        }
    }
}

/// A base policy with the document's content wrappers excluded.
///
/// Wrappers are never focused and never passed through; every other node
/// is decided by the base policy.
#[derive(Debug)]
pub struct DocumentBrowsePolicy<'b, B: ?Sized, P = DefaultBrowsePolicy> {
    behavior: &'b B,
    base: P,
}

impl<'b, B> DocumentBrowsePolicy<'b, B>
where
    B: DocumentBehavior + ?Sized,
{
    pub fn new(behavior: &'b B) -> Self {
        Self {
            behavior,
            base: DefaultBrowsePolicy,
        }
    }
}

impl<'b, B, P> DocumentBrowsePolicy<'b, B, P>
where
    B: DocumentBehavior + ?Sized,
    P: BrowsePolicy,
{
    pub fn with_base(behavior: &'b B, base: P) -> Self {
        Self { behavior, base }
    }

    pub fn base(&self) -> &P {
        &self.base
    }
}

impl<B, P> BrowsePolicy for DocumentBrowsePolicy<'_, B, P>
where
    B: DocumentBehavior + ?Sized,
    P: BrowsePolicy,
{
    fn should_set_focus_to(&self, node: &NodeInfo) -> bool {
        if self.behavior.is_content_wrapper(node) {
            tracing::trace!(
                target: targets::BROWSE,
                automation_id = %node.automation_id,
                "content wrapper not focusable"
            );
            return false;
        }
        self.base.should_set_focus_to(node)
    }

    fn should_pass_through(&self, node: &NodeInfo, reason: PassThroughReason) -> bool {
        if self.behavior.is_content_wrapper(node) {
            return false;
        }
        self.base.should_pass_through(node, reason)
    }
}

/// Result of forwarding a tab gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabOutcome<R> {
    /// The selection moved to a non-collapsed range that should be announced.
    Announce(R),
    /// The selection moved but is collapsed; nothing to announce.
    Collapsed(R),
    /// The selection did not change before the timeout.
    Unchanged,
}

impl<R> TabOutcome<R> {
    pub fn announcement(&self) -> Option<&R> {
        match self {
            TabOutcome::Announce(range) => Some(range),
            _ => None,
        }
    }
}

impl<P, B> TextModel<'_, P, B>
where
    P: SelectionSurface,
    B: DocumentBehavior + ?Sized,
{
    /// Forward a tab or shift+tab gesture and wait for the selection to move.
    ///
    /// The selection is polled until it differs from the one captured before
    /// the gesture was sent, or until the configured timeout elapses. Other
    /// gestures are forwarded without waiting.
    pub fn handle_tab_gesture(&self, gesture: &KeyGesture) -> Result<TabOutcome<P::Range>> {
        let provider = self.provider();
        if !gesture.is_tab() {
            provider.send_gesture(gesture)?;
            return Ok(TabOutcome::Unchanged);
        }

        let tab = &self.config().tab;
        let span = tracing::debug_span!(
            target: targets::BROWSE,
            span_names::TAB_WAIT,
            shift = gesture.shift
        );
        let _guard = span.enter();

        let before = provider.selection()?;
        provider.send_gesture(gesture)?;

        let deadline = Instant::now() + tab.timeout();
        let current = loop {
            let current = provider.selection()?;
            if !provider.ranges_equal(&before, &current)? {
                break current;
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(target: targets::BROWSE, "selection unchanged after tab");
                return Ok(TabOutcome::Unchanged);
            }
            thread::sleep(tab.poll_interval().min(deadline - now));
        };

        if self.is_range_collapsed(&current)? {
            Ok(TabOutcome::Collapsed(current))
        } else {
            Ok(TabOutcome::Announce(current))
        }
    }
}
