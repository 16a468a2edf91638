//! Tree rendering of field command sequences for logs and test diagnostics.
//!
//! ```ignore
//! let linear = model.linearize(&range, &FormatOptions::new())?;
//! tracing::trace!("{}", FieldStreamDebug::new(&linear.commands));
//! ```
//!
//! Produces output such as:
//!
//! ```text
//! group [1.4] page-number=3
//! ├── "Intro "
//! └── link [1.9] content=1
//! │  └── "1"
//! ```

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::field::{FieldCommand, FieldRecord, FieldValue};

/// Style options for field tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed lines.
    Compact,
}

/// Configuration for field tree output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show runtime ids of control fields.
    pub show_ids: bool,
    /// Show control field attributes.
    pub show_attributes: bool,
    /// Show format field attributes before each text run.
    pub show_formats: bool,
    /// Maximum depth rendered (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_attributes: true,
            show_formats: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything, including format fields.
    pub fn detailed() -> Self {
        Self {
            show_formats: true,
            ..Default::default()
        }
    }

    /// Roles and text only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_attributes: false,
            show_formats: false,
            ..Default::default()
        }
    }
}

enum Node<'c> {
    Control {
        field: &'c Arc<FieldRecord>,
        children: Vec<Node<'c>>,
    },
    Text {
        format: Option<&'c FieldRecord>,
        text: &'c str,
    },
}

/// Renders a field command sequence as an indented tree.
///
/// Ends without a matching open start are ignored; starts that are never
/// closed extend to the end of the sequence.
pub struct FieldStreamDebug<'c> {
    commands: &'c [FieldCommand],
    options: TreeFormatOptions,
}

impl<'c> FieldStreamDebug<'c> {
    pub fn new(commands: &'c [FieldCommand]) -> Self {
        Self::with_options(commands, TreeFormatOptions::default())
    }

    pub fn with_options(commands: &'c [FieldCommand], options: TreeFormatOptions) -> Self {
        Self { commands, options }
    }

    fn build(&self) -> Vec<Node<'c>> {
        // Each open control carries the children collected so far.
        let mut stack: Vec<(&'c Arc<FieldRecord>, Vec<Node<'c>>)> = Vec::new();
        let mut roots = Vec::new();
        let mut format = None;

        fn push<'c>(
            stack: &mut [(&'c Arc<FieldRecord>, Vec<Node<'c>>)],
            roots: &mut Vec<Node<'c>>,
            node: Node<'c>,
        ) {
            match stack.last_mut() {
                Some((_, children)) => children.push(node),
                None => roots.push(node),
            }
        }

        for command in self.commands {
            match command {
                FieldCommand::ControlStart(field) => stack.push((field, Vec::new())),
                FieldCommand::ControlEnd(field) => {
                    let Some(pos) = stack.iter().rposition(|(f, _)| Arc::ptr_eq(f, field)) else {
                        continue;
                    };
                    while stack.len() > pos {
                        if let Some((field, children)) = stack.pop() {
                            push(&mut stack, &mut roots, Node::Control { field, children });
                        }
                    }
                }
                FieldCommand::FormatChange(field) => format = Some(field),
                FieldCommand::Text(text) => {
                    let node = Node::Text {
                        format: format.take(),
                        text: text.as_str(),
                    };
                    push(&mut stack, &mut roots, node);
                }
            }
        }
        while let Some((field, children)) = stack.pop() {
            push(&mut stack, &mut roots, Node::Control { field, children });
        }
        roots
    }

    fn write_nodes(&self, out: &mut impl Write, nodes: &[Node<'_>], depth: usize) -> fmt::Result {
        if let Some(max) = self.options.max_depth
            && depth > max
        {
            return Ok(());
        }
        let count = nodes.len();
        for (i, node) in nodes.iter().enumerate() {
            let prefix = self.build_prefix(depth, i + 1 == count);
            match node {
                Node::Control { field, children } => {
                    out.write_str(&prefix)?;
                    out.write_str(field.role.as_str())?;
                    if self.options.show_ids
                        && let Some(id) = &field.runtime_id
                    {
                        write!(out, " [{id}]")?;
                    }
                    if self.options.show_attributes {
                        if !field.states.is_empty() {
                            write!(out, " ({})", field.states)?;
                        }
                        write_attributes(out, field)?;
                    }
                    out.write_char('\n')?;
                    self.write_nodes(out, children, depth + 1)?;
                }
                Node::Text { format, text } => {
                    out.write_str(&prefix)?;
                    write!(out, "{text:?}")?;
                    if self.options.show_formats
                        && let Some(format) = format
                    {
                        out.write_str(" {")?;
                        write_attributes(out, format)?;
                        out.write_str(" }")?;
                    }
                    out.write_char('\n')?;
                }
            }
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("│", "├── ", "└── "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        if depth == 0 {
            return prefix;
        }
        for _ in 0..depth - 1 {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }
}

fn write_attributes(out: &mut impl Write, field: &FieldRecord) -> fmt::Result {
    for (key, value) in field.attributes() {
        match value {
            FieldValue::Text(text) => write!(out, " {key}={text}")?,
            FieldValue::Bool(flag) => write!(out, " {key}={flag}")?,
        }
    }
    Ok(())
}

impl fmt::Display for FieldStreamDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots = self.build();
        if roots.is_empty() {
            return f.write_str("(empty)\n");
        }
        self.write_nodes(f, &roots, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{control_pair, keys};
    use crate::provider::RuntimeId;
    use crate::role::Role;

    fn sample() -> Vec<FieldCommand> {
        let mut page = FieldRecord::control(Role::Group, RuntimeId::new([1, 4]));
        page.set(keys::PAGE_NUMBER, "3");
        let (page_start, page_end) = control_pair(page);
        let link = FieldRecord::control(Role::Link, RuntimeId::new([1, 9]));
        let (link_start, link_end) = control_pair(link);

        vec![
            page_start,
            FieldCommand::FormatChange(FieldRecord::default()),
            FieldCommand::Text("Intro ".into()),
            link_start,
            FieldCommand::FormatChange(FieldRecord::default()),
            FieldCommand::Text("1".into()),
            link_end,
            page_end,
        ]
    }

    #[test]
    fn test_unicode_tree() {
        let commands = sample();
        let rendered = FieldStreamDebug::new(&commands).to_string();
        assert_eq!(
            rendered,
            "group [1.4] page-number=3\n\
             \u{251c}\u{2500}\u{2500} \"Intro \"\n\
             \u{2514}\u{2500}\u{2500} link [1.9]\n\
             \u{2502}  \u{2514}\u{2500}\u{2500} \"1\"\n"
        );
    }

    #[test]
    fn test_minimal_ascii() {
        let commands = sample();
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let rendered = FieldStreamDebug::with_options(&commands, options).to_string();
        assert_eq!(rendered, "group\n+-- \"Intro \"\n`-- link\n|  `-- \"1\"\n");
    }

    #[test]
    fn test_empty_and_unbalanced() {
        assert_eq!(FieldStreamDebug::new(&[]).to_string(), "(empty)\n");

        let (start, _) = control_pair(FieldRecord::new(Role::Table));
        let commands = vec![start, FieldCommand::Text("x".into())];
        let options = TreeFormatOptions {
            style: TreeStyle::Compact,
            ..TreeFormatOptions::minimal()
        };
        assert_eq!(
            FieldStreamDebug::with_options(&commands, options).to_string(),
            "table\n- \"x\"\n"
        );
    }
}
