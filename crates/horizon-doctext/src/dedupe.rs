//! Duplicate control span elimination and nesting validation.
//!
//! Some providers return a higher ancestor among a range's children (for
//! example a table inside its own header cell). The walk does not loop, but
//! the ancestor's control span is emitted a second time inside itself. These
//! re-emissions are detected by runtime id within the currently open ancestor
//! chain and removed, start and end together, by field identity.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use horizon_doctext_core::logging::targets;

use crate::field::{FieldCommand, FieldRecord};
use crate::provider::RuntimeId;

/// A nesting problem left in a command sequence.
///
/// These are reported alongside best-effort output and never abort a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureIssue {
    /// A `ControlEnd` whose start is not open.
    UnmatchedEnd { index: usize },
    /// A `ControlEnd` that closes an outer field while inner fields are still open.
    MismatchedEnd { index: usize, unclosed: usize },
    /// Fields still open at the end of the sequence.
    UnclosedStart { count: usize },
}

impl fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedEnd { index } => write!(f, "control end at {index} has no open start"),
            Self::MismatchedEnd { index, unclosed } => {
                write!(f, "control end at {index} skips {unclosed} open field(s)")
            }
            Self::UnclosedStart { count } => write!(f, "{count} control field(s) never closed"),
        }
    }
}

/// Remove control spans whose runtime id is already open in the ancestor chain.
///
/// Only the repeated member is removed, together with its own end command;
/// matching is by `Arc` identity so equal-valued fields elsewhere in the
/// document are untouched. Returns the number of spans removed.
pub fn eliminate_duplicates(commands: &mut Vec<FieldCommand>) -> usize {
    let mut open: Vec<Arc<FieldRecord>> = Vec::new();
    let mut seen: HashMap<RuntimeId, usize> = HashMap::new();
    let mut pending: Vec<Arc<FieldRecord>> = Vec::new();

    for command in commands.iter() {
        match command {
            FieldCommand::ControlStart(field) => {
                if let Some(id) = &field.runtime_id {
                    let count = seen.entry(id.clone()).or_default();
                    if *count > 0 {
                        tracing::debug!(
                            target: targets::DEDUPE,
                            runtime_id = %id,
                            role = %field.role,
                            "duplicate ancestor span"
                        );
                        pending.push(field.clone());
                    }
                    *count += 1;
                }
                open.push(field.clone());
            }
            FieldCommand::ControlEnd(field) => {
                if let Some(pos) = open.iter().rposition(|f| Arc::ptr_eq(f, field)) {
                    for closed in open.drain(pos..) {
                        release(&mut seen, &closed);
                    }
                }
            }
            FieldCommand::FormatChange(_) | FieldCommand::Text(_) => {}
        }
    }

    if pending.is_empty() {
        return 0;
    }

    commands.retain(|command| {
        command
            .control_field()
            .is_none_or(|field| !pending.iter().any(|p| Arc::ptr_eq(p, field)))
    });
    pending.len()
}

fn release(seen: &mut HashMap<RuntimeId, usize>, field: &FieldRecord) {
    if let Some(id) = &field.runtime_id
        && let Some(count) = seen.get_mut(id)
    {
        *count = count.saturating_sub(1);
        if *count == 0 {
            seen.remove(id);
        }
    }
}

/// Check that starts and ends form a fully matched nesting.
pub fn validate_nesting(commands: &[FieldCommand]) -> Vec<StructureIssue> {
    let mut issues = Vec::new();
    let mut open: Vec<&Arc<FieldRecord>> = Vec::new();

    for (index, command) in commands.iter().enumerate() {
        match command {
            FieldCommand::ControlStart(field) => open.push(field),
            FieldCommand::ControlEnd(field) => {
                match open.iter().rposition(|f| Arc::ptr_eq(f, field)) {
                    Some(pos) if pos + 1 == open.len() => {
                        open.pop();
                    }
                    Some(pos) => {
                        issues.push(StructureIssue::MismatchedEnd {
                            index,
                            unclosed: open.len() - pos - 1,
                        });
                        open.truncate(pos);
                    }
                    None => issues.push(StructureIssue::UnmatchedEnd { index }),
                }
            }
            FieldCommand::FormatChange(_) | FieldCommand::Text(_) => {}
        }
    }

    if !open.is_empty() {
        issues.push(StructureIssue::UnclosedStart { count: open.len() });
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldRecord, concat_text};
    use crate::role::Role;

    fn field(role: Role, id: i32) -> Arc<FieldRecord> {
        Arc::new(FieldRecord::control(role, RuntimeId::new([id])))
    }

    fn text(t: &str) -> FieldCommand {
        FieldCommand::Text(t.to_string())
    }

    #[test]
    fn test_removes_reemitted_ancestor() {
        let a = field(Role::Table, 1);
        let a_dup = field(Role::Table, 1);
        let b = field(Role::TableCell, 2);

        let mut commands = vec![
            FieldCommand::ControlStart(a.clone()),
            text("foo"),
            FieldCommand::ControlStart(a_dup.clone()),
            FieldCommand::ControlStart(b.clone()),
            text("bar"),
            FieldCommand::ControlEnd(b.clone()),
            FieldCommand::ControlEnd(a_dup.clone()),
            FieldCommand::ControlEnd(a.clone()),
        ];

        assert_eq!(eliminate_duplicates(&mut commands), 1);
        assert_eq!(
            commands,
            vec![
                FieldCommand::ControlStart(a.clone()),
                text("foo"),
                FieldCommand::ControlStart(b.clone()),
                text("bar"),
                FieldCommand::ControlEnd(b),
                FieldCommand::ControlEnd(a.clone()),
            ]
        );
        assert!(Arc::ptr_eq(commands[0].control_field().unwrap(), &a));
        assert!(validate_nesting(&commands).is_empty());
    }

    #[test]
    fn test_siblings_with_same_id_are_kept() {
        // Same runtime id, but the first span is closed before the second opens.
        let first = field(Role::Link, 5);
        let second = field(Role::Link, 5);
        let mut commands = vec![
            FieldCommand::ControlStart(first.clone()),
            text("one"),
            FieldCommand::ControlEnd(first),
            FieldCommand::ControlStart(second.clone()),
            text("two"),
            FieldCommand::ControlEnd(second),
        ];
        let before = commands.clone();

        assert_eq!(eliminate_duplicates(&mut commands), 0);
        assert_eq!(commands, before);
    }

    #[test]
    fn test_equal_values_are_not_removed_by_value() {
        // The duplicate is a distinct Arc with the same value as an unrelated
        // later span; only the duplicate's own pair goes.
        let outer = field(Role::Group, 9);
        let dup = field(Role::Group, 9);
        let mut commands = vec![
            FieldCommand::ControlStart(outer.clone()),
            FieldCommand::ControlStart(dup.clone()),
            text("x"),
            FieldCommand::ControlEnd(dup),
            FieldCommand::ControlEnd(outer.clone()),
        ];

        eliminate_duplicates(&mut commands);
        assert_eq!(commands.len(), 3);
        assert!(Arc::ptr_eq(commands[0].control_field().unwrap(), &outer));
        assert!(Arc::ptr_eq(commands[2].control_field().unwrap(), &outer));
    }

    #[test]
    fn test_elimination_is_idempotent() {
        let a = field(Role::Table, 1);
        let a_dup = field(Role::Table, 1);
        let c = field(Role::TableCell, 3);
        let c_dup = field(Role::TableCell, 3);
        let mut commands = vec![
            FieldCommand::ControlStart(a.clone()),
            FieldCommand::ControlStart(c.clone()),
            FieldCommand::ControlStart(a_dup.clone()),
            FieldCommand::ControlStart(c_dup.clone()),
            text("cell"),
            FieldCommand::ControlEnd(c_dup),
            FieldCommand::ControlEnd(a_dup),
            FieldCommand::ControlEnd(c),
            FieldCommand::ControlEnd(a),
        ];

        assert_eq!(eliminate_duplicates(&mut commands), 2);
        let once = commands.clone();
        assert_eq!(eliminate_duplicates(&mut commands), 0);
        assert_eq!(commands, once);
        assert_eq!(concat_text(&commands), "cell");
    }

    #[test]
    fn test_fields_without_runtime_id_are_ignored() {
        let anonymous = Arc::new(FieldRecord::new(Role::Group));
        let mut commands = vec![
            FieldCommand::ControlStart(anonymous.clone()),
            FieldCommand::ControlStart(anonymous.clone()),
            FieldCommand::ControlEnd(anonymous.clone()),
            FieldCommand::ControlEnd(anonymous),
        ];
        assert_eq!(eliminate_duplicates(&mut commands), 0);
        assert_eq!(commands.len(), 4);
    }

    #[test]
    fn test_validate_reports_problems() {
        let a = field(Role::Group, 1);
        let b = field(Role::Group, 2);
        let stray = field(Role::Group, 3);

        let commands = vec![
            FieldCommand::ControlStart(a.clone()),
            FieldCommand::ControlStart(b.clone()),
            FieldCommand::ControlEnd(a.clone()),
            FieldCommand::ControlEnd(stray),
            FieldCommand::ControlStart(b),
        ];

        assert_eq!(
            validate_nesting(&commands),
            vec![
                StructureIssue::MismatchedEnd {
                    index: 2,
                    unclosed: 1,
                },
                StructureIssue::UnmatchedEnd { index: 3 },
                StructureIssue::UnclosedStart { count: 1 },
            ]
        );
    }
}
