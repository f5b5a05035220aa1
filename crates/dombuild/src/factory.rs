//! Factory protocol: one generic entry point behind every element function.
//!
//! A call resolves its kind in the build's registry, validates attributes,
//! constructs the node, attaches it to the current context, appends the
//! immediate-child arguments, runs the body with the node installed as the
//! context, and finally runs the kind's validation hook. Attachment happens
//! before the body runs, so sibling order always equals call order.

use crate::error::{BuildError, BuildResult};
use crate::registry::{AttributeRule, Registry, TagSpec};
use crate::scope::{self, Activation};
use crate::types::{AttrValue, Attrs, Child, Node, NodeId};

/// Canonical no-op body for elements built without nested content.
pub fn empty() {}

/// Builds an element of the registered kind `name`.
///
/// `args` carries the attribute set and any immediate children; `body` runs
/// with the new element as the current context. Use [`empty`] when there is
/// no nested content.
pub fn element<A, F, R>(name: &str, args: A, body: F) -> BuildResult<NodeId>
where
    A: Into<ElementArgs>,
    F: FnOnce() -> R,
    R: Into<BodyValue>,
{
    let _activation = Activation::acquire_ambient();
    let registry = scope::current_registry();
    let spec = registry
        .lookup(name)
        .ok_or_else(|| BuildError::UnknownKind {
            name: name.to_string(),
        })?;
    let args = args.into();
    let attributes = validate_attributes(&registry, name, spec, args.attrs)?;

    let index = scope::attach_element(name, spec.kind, attributes)?;
    for child in args.children {
        scope::attach_child_value(index, child)?;
    }

    match scope::with_current(index, body).into() {
        BodyValue::Done => {}
        BodyValue::Text(_) => {
            return Err(BuildError::Script {
                tag: name.to_string(),
            });
        }
        BodyValue::Failed(error) => return Err(error),
    }

    if let Some(hook) = spec.validate {
        // The node stays attached even when its hook rejects it; the error
        // propagates, the tree keeps the defective node.
        scope::with_view(index, |view| hook(view))?;
    }

    Ok(NodeId(index as u32))
}

/// Attribute-only entry point used by void-element wrappers.
pub fn void_element<A>(name: &str, attrs: A) -> BuildResult<NodeId>
where
    A: Into<Attrs>,
{
    element(name, attrs.into(), empty)
}

fn validate_attributes(
    registry: &Registry,
    tag: &str,
    spec: &TagSpec,
    attrs: Attrs,
) -> BuildResult<Vec<(String, AttrValue)>> {
    let pairs = attrs.into_pairs();
    let Some(schema) = &spec.attributes else {
        // Elements without a schema accept any attribute.
        return Ok(pairs);
    };
    for (name, value) in &pairs {
        match registry.resolve_attribute(schema, name) {
            AttributeRule::AnyType => {}
            AttributeRule::Accepted(accepted) => {
                if !accepted.contains(&value.type_of()) {
                    return Err(BuildError::AttributeType {
                        tag: tag.to_string(),
                        attribute: name.clone(),
                        found: value.type_of(),
                    });
                }
            }
            AttributeRule::Undeclared => {
                return Err(BuildError::UnknownAttribute {
                    tag: tag.to_string(),
                    attribute: name.clone(),
                });
            }
        }
    }
    Ok(pairs)
}

/// Classification of a body closure's trailing expression.
///
/// A body that evaluates to a bare string is caller misuse: string children
/// go through `text(..)`, and silently dropping the value would hide the
/// mistake. Nested build results flow through so `?`-style bodies propagate
/// failures.
pub enum BodyValue {
    Done,
    Text(String),
    Failed(BuildError),
}

impl From<()> for BodyValue {
    fn from(_: ()) -> Self {
        BodyValue::Done
    }
}

impl From<&str> for BodyValue {
    fn from(value: &str) -> Self {
        BodyValue::Text(value.to_string())
    }
}

impl From<String> for BodyValue {
    fn from(value: String) -> Self {
        BodyValue::Text(value)
    }
}

impl From<NodeId> for BodyValue {
    fn from(_: NodeId) -> Self {
        BodyValue::Done
    }
}

impl<T: Into<BodyValue>> From<Result<T, BuildError>> for BodyValue {
    fn from(value: Result<T, BuildError>) -> Self {
        match value {
            Ok(inner) => inner.into(),
            Err(error) => BodyValue::Failed(error),
        }
    }
}

/// Attribute set and immediate children of an element call, resolved by
/// argument type at compile time.
#[derive(Debug, Default)]
pub struct ElementArgs {
    pub attrs: Attrs,
    pub children: Vec<Child>,
}

impl From<()> for ElementArgs {
    fn from(_: ()) -> Self {
        ElementArgs::default()
    }
}

impl From<Attrs> for ElementArgs {
    fn from(attrs: Attrs) -> Self {
        ElementArgs {
            attrs,
            children: Vec::new(),
        }
    }
}

impl From<&str> for ElementArgs {
    fn from(value: &str) -> Self {
        ElementArgs {
            attrs: Attrs::new(),
            children: vec![Child::from(value)],
        }
    }
}

impl From<String> for ElementArgs {
    fn from(value: String) -> Self {
        ElementArgs {
            attrs: Attrs::new(),
            children: vec![Child::from(value)],
        }
    }
}

impl From<Node> for ElementArgs {
    fn from(value: Node) -> Self {
        ElementArgs {
            attrs: Attrs::new(),
            children: vec![Child::from(value)],
        }
    }
}

impl From<Vec<Child>> for ElementArgs {
    fn from(children: Vec<Child>) -> Self {
        ElementArgs {
            attrs: Attrs::new(),
            children,
        }
    }
}

impl From<(Attrs, &str)> for ElementArgs {
    fn from((attrs, value): (Attrs, &str)) -> Self {
        ElementArgs {
            attrs,
            children: vec![Child::from(value)],
        }
    }
}

impl From<(Attrs, String)> for ElementArgs {
    fn from((attrs, value): (Attrs, String)) -> Self {
        ElementArgs {
            attrs,
            children: vec![Child::from(value)],
        }
    }
}

impl From<(Attrs, Node)> for ElementArgs {
    fn from((attrs, value): (Attrs, Node)) -> Self {
        ElementArgs {
            attrs,
            children: vec![Child::from(value)],
        }
    }
}

impl From<(Attrs, Vec<Child>)> for ElementArgs {
    fn from((attrs, children): (Attrs, Vec<Child>)) -> Self {
        ElementArgs { attrs, children }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AttrSchema, AttrType, TagKind};
    use crate::scope::{fragment, fragment_with, text, BuildConfig};
    use crate::types::Node;
    use std::sync::Arc;

    fn child_names(node: &Node) -> Vec<String> {
        node.children()
            .iter()
            .map(|child| match child {
                Node::Element { name, .. } => name.clone(),
                Node::Text { .. } => "#text".to_string(),
                Node::Fragment { .. } => "#fragment".to_string(),
            })
            .collect()
    }

    #[test]
    fn sibling_order_equals_call_order() {
        let tree = fragment(|| -> BuildResult<()> {
            element("div", (), empty)?;
            element("span", (), || -> BuildResult<()> {
                element("em", (), empty)?;
                Ok(())
            })?;
            element("p", (), empty)?;
            Ok(())
        })
        .expect("build succeeds");
        assert_eq!(child_names(&tree), ["div", "span", "p"]);
    }

    #[test]
    fn unknown_kind_fails_the_call() {
        let result = fragment(|| element("blink", (), empty));
        assert_eq!(
            result,
            Err(BuildError::UnknownKind {
                name: "blink".to_string()
            })
        );
    }

    #[test]
    fn immediate_children_precede_body_children() {
        let tree = fragment(|| {
            element("div", "first", || -> BuildResult<()> {
                text("second")?;
                Ok(())
            })
        })
        .expect("build succeeds");
        let div = &tree.children()[0];
        assert_eq!(div.direct_text(), "firstsecond");
    }

    #[test]
    fn bare_string_body_is_a_script_error() {
        let result = fragment(|| element("div", (), || "oops"));
        assert_eq!(
            result,
            Err(BuildError::Script {
                tag: "div".to_string()
            })
        );
    }

    #[test]
    fn nested_failure_propagates_through_the_body() {
        let result = fragment(|| element("div", (), || element("blink", (), empty)));
        assert_eq!(
            result,
            Err(BuildError::UnknownKind {
                name: "blink".to_string()
            })
        );
    }

    #[test]
    fn attribute_type_mismatch_names_the_offender() {
        let attrs = Attrs::new().set("href", 42);
        let result = fragment(|| element("a", attrs.clone(), empty));
        assert_eq!(
            result,
            Err(BuildError::AttributeType {
                tag: "a".to_string(),
                attribute: "href".to_string(),
                found: AttrType::Int,
            })
        );
    }

    #[test]
    fn undeclared_attribute_fails_on_schema_elements_only() {
        let bogus = Attrs::new().set("bogus", "x");
        let result = fragment(|| element("a", bogus.clone(), empty));
        assert_eq!(
            result,
            Err(BuildError::UnknownAttribute {
                tag: "a".to_string(),
                attribute: "bogus".to_string(),
            })
        );
        // div declares no schema and accepts anything.
        let tree = fragment(|| element("div", bogus, empty)).expect("schema-free build");
        assert_eq!(child_names(&tree), ["div"]);
    }

    #[test]
    fn void_elements_reject_children_on_every_route() {
        let structural = Err(BuildError::Structural {
            tag: "br".to_string(),
        });

        // Via the body.
        let via_body = fragment(|| element("br", (), || text("x")));
        assert_eq!(via_body, structural);

        // Via an immediate child argument.
        let via_arg = fragment(|| element("br", "x", empty));
        assert_eq!(via_arg, structural);

        // Via `append` while the void element is current.
        let via_append = fragment(|| {
            element("br", (), || {
                crate::scope::append(Node::Text {
                    text: "x".to_string(),
                })
            })
        });
        assert_eq!(via_append, structural);

        // A childless build is fine.
        let tree = fragment(|| element("br", (), empty)).expect("childless void builds");
        assert!(tree.children()[0].children().is_empty());
    }

    #[test]
    fn hook_failure_propagates_but_leaves_the_node_attached() {
        fn demand_label(view: &crate::scope::NodeView<'_>) -> Result<(), BuildError> {
            if view.has_element_child("label") {
                Ok(())
            } else {
                Err(BuildError::Validation {
                    tag: view.name().to_string(),
                    message: "requires a <label> child".to_string(),
                })
            }
        }

        let mut registry = Registry::new();
        registry.insert(
            "field",
            crate::registry::TagSpec::new(TagKind::Normal).with_validate(demand_label),
        );
        registry.insert("label", crate::registry::TagSpec::new(TagKind::Normal));
        let config = BuildConfig {
            registry: Arc::new(registry),
        };

        let tree = fragment_with(config.clone(), || {
            let failed = element("field", (), empty);
            assert_eq!(
                failed,
                Err(BuildError::Validation {
                    tag: "field".to_string(),
                    message: "requires a <label> child".to_string(),
                })
            );
        })
        .expect("outer build survives the hook failure");
        // Attach-before-validate: the rejected node is still in the tree.
        assert_eq!(child_names(&tree), ["field"]);

        let tree = fragment_with(config, || {
            element("field", (), || element("label", (), empty))
        })
        .expect("satisfied hook");
        assert_eq!(child_names(&tree), ["field"]);
    }

    #[test]
    fn uri_attributes_accept_strings_and_urls() {
        let by_string = Attrs::new().set("href", "http://example.com/");
        fragment(|| element("a", by_string, empty)).expect("string href");

        let url = url::Url::parse("http://example.com/").expect("url");
        let by_url = Attrs::new().set("href", url);
        fragment(|| element("a", by_url, empty)).expect("url href");
    }

    #[test]
    fn schema_elements_accept_data_and_aria_attributes() {
        let attrs = Attrs::new().set("data-track", 7).set("aria-label", "go");
        fragment(|| element("a", attrs, empty)).expect("wildcard attributes");
    }

    #[test]
    fn custom_schema_rule_is_scoped_to_its_registry() {
        let mut registry = Registry::new();
        registry.insert(
            "gauge",
            TagSpec::new(TagKind::Normal)
                .with_attributes(AttrSchema::new().declare("level", &[AttrType::Int])),
        );
        let config = BuildConfig {
            registry: Arc::new(registry),
        };

        let ok = fragment_with(config.clone(), || {
            element("gauge", Attrs::new().set("level", 3), empty)
        });
        assert!(ok.is_ok());

        let bad = fragment_with(config, || {
            element("gauge", Attrs::new().set("level", "high"), empty)
        });
        assert_eq!(
            bad,
            Err(BuildError::AttributeType {
                tag: "gauge".to_string(),
                attribute: "level".to_string(),
                found: AttrType::Str,
            })
        );
    }
}
