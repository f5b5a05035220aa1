use crate::types::Node;

/// Depth-first search for the first element with the given name.
pub fn find_element<'a>(node: &'a Node, target: &str) -> Option<&'a Node> {
    if node.is_element_named(target) {
        return Some(node);
    }
    for child in node.children() {
        if let Some(found) = find_element(child, target) {
            return Some(found);
        }
    }
    None
}

/// Calls `visitor` for every node in the tree, parents before children.
pub fn visit(node: &Node, visitor: &mut impl FnMut(&Node)) {
    visitor(node);
    for child in node.children() {
        visit(child, visitor);
    }
}

/// Collects all text leaves of the subtree, in document order.
pub fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(text),
        Node::Fragment { children } | Node::Element { children, .. } => {
            for child in children {
                collect_text(child, out);
            }
        }
    }
}

/// Number of element nodes in the subtree (fragments and text excluded).
pub fn count_elements(node: &Node) -> usize {
    let mut count = 0;
    visit(node, &mut |node| {
        if matches!(node, Node::Element { .. }) {
            count += 1;
        }
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{div, span};
    use crate::scope::{fragment, text};
    use crate::{empty, BuildResult};

    fn sample() -> Node {
        fragment(|| -> BuildResult<()> {
            div(crate::attrs![id: "outer"], || -> BuildResult<()> {
                span("hi", empty)?;
                text("world")?;
                Ok(())
            })?;
            Ok(())
        })
        .expect("sample build")
    }

    #[test]
    fn find_element_searches_depth_first() {
        let tree = sample();
        let span = find_element(&tree, "span").expect("span found");
        assert_eq!(span.direct_text(), "hi");
        assert!(find_element(&tree, "table").is_none());
    }

    #[test]
    fn collect_text_walks_in_document_order() {
        let tree = sample();
        let mut out = String::new();
        collect_text(&tree, &mut out);
        assert_eq!(out, "hiworld");
    }

    #[test]
    fn count_elements_ignores_fragments_and_text() {
        let tree = sample();
        assert_eq!(count_elements(&tree), 2);
    }
}
