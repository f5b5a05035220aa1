use std::fmt;

use crate::types::Node;

/// Deterministic tree serialization for test comparisons.
/// Not a public stable format and not a markup renderer: one line per node,
/// two-space indentation, attribute order as built.
#[derive(Debug)]
pub struct TreeSnapshot {
    lines: Vec<String>,
}

impl TreeSnapshot {
    pub fn new(root: &Node) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn walk_snapshot(node: &Node, indent_level: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(indent_level);
    match node {
        Node::Fragment { children } => {
            lines.push(format!("{indent}fragment"));
            for child in children {
                walk_snapshot(child, indent_level + 1, lines);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            let mut line = format!("{indent}element {name}");
            for (attr_name, value) in attributes {
                line.push_str(&format!(" {attr_name}={value}"));
            }
            lines.push(line);
            for child in children {
                walk_snapshot(child, indent_level + 1, lines);
            }
        }
        Node::Text { text } => {
            lines.push(format!("{indent}text {text:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{div, span};
    use crate::scope::{fragment, text};
    use crate::{empty, BuildResult};

    #[test]
    fn snapshot_lines_follow_document_order() {
        let tree = fragment(|| -> BuildResult<()> {
            div(crate::attrs![id: "x"], || -> BuildResult<()> {
                span("hi", empty)?;
                text("world")?;
                Ok(())
            })?;
            Ok(())
        })
        .expect("build succeeds");

        let snapshot = TreeSnapshot::new(&tree);
        assert_eq!(
            snapshot.as_lines(),
            [
                "fragment",
                "  element div id=x",
                "    element span",
                "      text \"hi\"",
                "    text \"world\"",
            ]
        );
    }
}
