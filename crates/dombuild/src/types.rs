use std::fmt;

use url::Url;

use crate::registry::{AttrType, TagKind};

/// Handle to a node inside the build in progress.
///
/// Handles index the building thread's arena and are informational once the
/// build has finished; detached subtrees are obtained with
/// [`fragment`](crate::fragment), not through handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Anonymous root: the result of a `fragment` build, or a detached
    /// subtree appended wholesale into another tree.
    Fragment { children: Vec<Node> },
    Element {
        name: String,
        kind: TagKind,
        attributes: Vec<(String, AttrValue)>,
        children: Vec<Node>,
    },
    Text { text: String },
}

impl Node {
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, target: &str) -> bool {
        match self {
            Node::Element { name, .. } => name.eq_ignore_ascii_case(target),
            _ => false,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Fragment { children } | Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn attr(&self, target: &str) -> Option<&AttrValue> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name == target)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Concatenated text of the node's direct text children.
    pub fn direct_text(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            if let Node::Text { text } = child {
                out.push_str(text);
            }
        }
        out
    }
}

/// Typed attribute value.
///
/// The variant set matches [`AttrType`]; schemas validate by variant, so a
/// `u32`-style class count and a class name string are different attribute
/// types, not different spellings of one.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Uri(Url),
}

impl AttrValue {
    pub fn type_of(&self) -> AttrType {
        match self {
            AttrValue::Str(_) => AttrType::Str,
            AttrValue::Int(_) => AttrType::Int,
            AttrValue::Float(_) => AttrType::Float,
            AttrValue::Bool(_) => AttrType::Bool,
            AttrValue::Uri(_) => AttrType::Uri,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(value) => f.write_str(value),
            AttrValue::Int(value) => write!(f, "{value}"),
            AttrValue::Float(value) => write!(f, "{value}"),
            AttrValue::Bool(value) => write!(f, "{value}"),
            AttrValue::Uri(value) => f.write_str(value.as_str()),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Url> for AttrValue {
    fn from(value: Url) -> Self {
        AttrValue::Uri(value)
    }
}

/// Ordered attribute collection with unique names.
///
/// Insertion order is preserved (attributes are pairs, not a map); setting an
/// existing name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attrs(Vec<(String, AttrValue)>);

impl From<()> for Attrs {
    fn from(_: ()) -> Self {
        Attrs::new()
    }
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn into_pairs(self) -> Vec<(String, AttrValue)> {
        self.0
    }
}

/// Immediate child supplied as a call argument, appended before any
/// body-produced children.
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    Text(String),
    Node(Node),
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<Node> for Child {
    fn from(value: Node) -> Self {
        Child::Node(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrs_preserve_insertion_order_and_replace_in_place() {
        let attrs = Attrs::new()
            .set("id", "x")
            .set("class", "note")
            .set("id", "y");
        let names: Vec<&str> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["id", "class"]);
        assert_eq!(attrs.get("id"), Some(&AttrValue::Str("y".to_string())));
    }

    #[test]
    fn attr_value_types_follow_variants() {
        assert_eq!(AttrValue::from("a").type_of(), AttrType::Str);
        assert_eq!(AttrValue::from(3).type_of(), AttrType::Int);
        assert_eq!(AttrValue::from(true).type_of(), AttrType::Bool);
        let url = Url::parse("http://example.com/").expect("url");
        assert_eq!(AttrValue::from(url).type_of(), AttrType::Uri);
    }

    #[test]
    fn direct_text_skips_nested_elements() {
        let node = Node::Element {
            name: "p".to_string(),
            kind: TagKind::OptionalEnd,
            attributes: Vec::new(),
            children: vec![
                Node::Text { text: "a".to_string() },
                Node::Element {
                    name: "b".to_string(),
                    kind: TagKind::Normal,
                    attributes: Vec::new(),
                    children: vec![Node::Text { text: "deep".to_string() }],
                },
                Node::Text { text: "c".to_string() },
            ],
        };
        assert_eq!(node.direct_text(), "ac");
    }
}
