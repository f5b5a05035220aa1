//! Build scope: the implicit-parent mechanism.
//!
//! Each thread carries at most one build in progress. The build owns a node
//! arena and a stack of open node indices; "the node currently being built"
//! is the top of that stack. Installing a context for a body closure is
//! scoped acquisition: a drop guard restores the previous context on every
//! exit path, including early `?` returns and panics.
//!
//! Builds on different threads never observe each other's context; the only
//! shared state is the registry, which is read-only once populated.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::{BuildError, BuildResult};
use crate::factory::BodyValue;
use crate::registry::{Registry, TagKind};
use crate::types::{AttrValue, Child, Node, NodeId};

/// Per-build settings.
#[derive(Clone)]
pub struct BuildConfig {
    pub registry: Arc<Registry>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            registry: Arc::clone(crate::html::registry()),
        }
    }
}

thread_local! {
    static BUILD: RefCell<Option<BuildState>> = const { RefCell::new(None) };
}

struct BuildState {
    arena: NodeArena,
    /// Stack of open node indices; the last entry is the current context.
    open: Vec<usize>,
    /// Implicit anonymous root collecting nodes built outside any context.
    root: usize,
    registry: Arc<Registry>,
}

impl BuildState {
    fn new(registry: Arc<Registry>) -> Self {
        let mut arena = NodeArena::default();
        let root = arena.push(ArenaNode::Fragment { children: Vec::new() });
        Self {
            arena,
            open: Vec::new(),
            root,
            registry,
        }
    }

    fn target(&self) -> usize {
        self.open.last().copied().unwrap_or(self.root)
    }
}

/// Ensures a build state exists for the duration of a call.
///
/// The outermost acquirer owns the state and tears it down on drop, which is
/// also what keeps a degenerate top-level call (no enclosing `fragment`) from
/// leaking state: it gets a throwaway anonymous root, and whatever it builds
/// there is lost when the call returns.
pub(crate) struct Activation {
    created: bool,
}

impl Activation {
    pub(crate) fn acquire(config: BuildConfig) -> Self {
        BUILD.with(|build| {
            let mut build = build.borrow_mut();
            if build.is_none() {
                *build = Some(BuildState::new(config.registry));
                Activation { created: true }
            } else {
                // A nested acquisition inherits the ambient build, including
                // its registry.
                Activation { created: false }
            }
        })
    }

    pub(crate) fn acquire_ambient() -> Self {
        Self::acquire(BuildConfig::default())
    }
}

impl Drop for Activation {
    fn drop(&mut self) {
        if self.created {
            BUILD.with(|build| {
                *build.borrow_mut() = None;
            });
        }
    }
}

/// Installs `index` as the current context for the duration of `f`.
///
/// Restoration is handled by a guard, not by code after the call, so it
/// holds on every exit path out of `f`.
pub(crate) fn with_current<R>(index: usize, f: impl FnOnce() -> R) -> R {
    BUILD.with(|build| {
        let mut build = build.borrow_mut();
        build
            .as_mut()
            .expect("context installed without an active build")
            .open
            .push(index);
    });
    log::trace!(target: "dombuild.scope", "open context #{index}");
    let _guard = ContextGuard { index };
    f()
}

struct ContextGuard {
    index: usize,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        BUILD.with(|build| {
            let mut build = build.borrow_mut();
            if let Some(state) = build.as_mut() {
                let popped = state.open.pop();
                debug_assert_eq!(
                    popped,
                    Some(self.index),
                    "open-context stack must unwind in call order"
                );
            }
        });
        log::trace!(target: "dombuild.scope", "close context #{}", self.index);
    }
}

/// Nesting depth of the calling thread's build; 0 when no context is open.
pub fn depth() -> usize {
    BUILD.with(|build| build.borrow().as_ref().map_or(0, |state| state.open.len()))
}

/// Handle of the node currently being built, if a context is open.
pub fn current() -> Option<NodeId> {
    BUILD.with(|build| {
        build
            .borrow()
            .as_ref()
            .and_then(|state| state.open.last().copied())
            .map(|index| NodeId(index as u32))
    })
}

/// Appends a text leaf to the current context.
pub fn text(value: impl Into<String>) -> BuildResult<()> {
    let _activation = Activation::acquire_ambient();
    with_state(|state| {
        let text = value.into();
        log::trace!(target: "dombuild.scope", "append text ({} bytes)", text.len());
        let index = state.arena.push(ArenaNode::Text { text });
        state.arena.add_child(state.target(), index)
    })
}

/// Appends a previously built (detached) node to the current context.
pub fn append(node: Node) -> BuildResult<()> {
    let _activation = Activation::acquire_ambient();
    with_state(|state| {
        let index = state.arena.push(ArenaNode::Import { node });
        state.arena.add_child(state.target(), index)
    })
}

/// Builds a detached tree: runs `body` with a fresh anonymous root as the
/// current context and returns the completed `Node::Fragment`.
pub fn fragment<F, R>(body: F) -> BuildResult<Node>
where
    F: FnOnce() -> R,
    R: Into<BodyValue>,
{
    fragment_with(BuildConfig::default(), body)
}

/// Like [`fragment`], with an explicit configuration. The configuration takes
/// effect only when this call starts the thread's build; a nested call
/// inherits the ambient build's registry.
pub fn fragment_with<F, R>(config: BuildConfig, body: F) -> BuildResult<Node>
where
    F: FnOnce() -> R,
    R: Into<BodyValue>,
{
    let _activation = Activation::acquire(config);
    let index = with_state(|state| {
        Ok(state.arena.push(ArenaNode::Fragment { children: Vec::new() }))
    })?;
    match with_current(index, body).into() {
        BodyValue::Done => {}
        BodyValue::Text(_) => {
            return Err(BuildError::Script {
                tag: "fragment".to_string(),
            });
        }
        BodyValue::Failed(error) => return Err(error),
    }
    with_state(|state| Ok(state.arena.extract(index)))
}

/// Runs `f` against the active build state. Callers must hold an
/// [`Activation`].
fn with_state<R>(f: impl FnOnce(&mut BuildState) -> BuildResult<R>) -> BuildResult<R> {
    BUILD.with(|build| {
        let mut build = build.borrow_mut();
        let state = build.as_mut().expect("build state active");
        f(state)
    })
}

pub(crate) fn current_registry() -> Arc<Registry> {
    BUILD.with(|build| {
        build
            .borrow()
            .as_ref()
            .map(|state| Arc::clone(&state.registry))
            .expect("build state active")
    })
}

/// Creates an element node and attaches it to the current context.
pub(crate) fn attach_element(
    name: &str,
    kind: TagKind,
    attributes: Vec<(String, AttrValue)>,
) -> BuildResult<usize> {
    with_state(|state| {
        let target = state.target();
        log::trace!(target: "dombuild.scope", "append <{name}> to #{target}");
        let index = state.arena.push(ArenaNode::Element {
            name: name.to_string(),
            kind,
            attributes,
            children: Vec::new(),
        });
        state.arena.add_child(target, index)?;
        Ok(index)
    })
}

/// Attaches an immediate-child argument to `parent`.
pub(crate) fn attach_child_value(parent: usize, child: Child) -> BuildResult<()> {
    with_state(|state| {
        let index = match child {
            Child::Text(text) => state.arena.push(ArenaNode::Text { text }),
            Child::Node(node) => state.arena.push(ArenaNode::Import { node }),
        };
        state.arena.add_child(parent, index)
    })
}

/// Runs `f` against a read-only view of the node at `index`.
///
/// The view borrows the build state, so `f` must not call back into build
/// operations; validation hooks are read-only by contract.
pub(crate) fn with_view<R>(index: usize, f: impl FnOnce(&NodeView<'_>) -> R) -> R {
    BUILD.with(|build| {
        let build = build.borrow();
        let state = build.as_ref().expect("build state active");
        let view = NodeView {
            arena: &state.arena,
            index,
        };
        f(&view)
    })
}

/// Read-only view of an in-arena node, handed to validation hooks.
pub struct NodeView<'a> {
    arena: &'a NodeArena,
    index: usize,
}

impl NodeView<'_> {
    pub fn name(&self) -> &str {
        match &self.arena.nodes[self.index] {
            ArenaNode::Element { name, .. } => name,
            _ => "",
        }
    }

    pub fn kind(&self) -> Option<TagKind> {
        match &self.arena.nodes[self.index] {
            ArenaNode::Element { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn attribute(&self, target: &str) -> Option<&AttrValue> {
        match &self.arena.nodes[self.index] {
            ArenaNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(name, _)| name == target)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn child_count(&self) -> usize {
        self.arena.nodes[self.index]
            .child_indices()
            .map_or(0, |children| children.len())
    }

    /// Element name of the `i`-th child; `None` for text leaves and imported
    /// fragments.
    pub fn child_name(&self, i: usize) -> Option<&str> {
        let child = *self.arena.nodes[self.index].child_indices()?.get(i)?;
        match &self.arena.nodes[child] {
            ArenaNode::Element { name, .. } => Some(name),
            ArenaNode::Import { node } => node.name(),
            _ => None,
        }
    }

    pub fn has_element_child(&self, target: &str) -> bool {
        (0..self.child_count()).any(|i| self.child_name(i) == Some(target))
    }
}

#[derive(Debug)]
enum ArenaNode {
    Fragment {
        children: Vec<usize>,
    },
    Element {
        name: String,
        kind: TagKind,
        attributes: Vec<(String, AttrValue)>,
        children: Vec<usize>,
    },
    Text {
        text: String,
    },
    /// Prebuilt owned subtree appended wholesale.
    Import {
        node: Node,
    },
    /// Slot left behind once a detached subtree has been extracted.
    Hollow,
}

impl ArenaNode {
    fn child_indices(&self) -> Option<&[usize]> {
        match self {
            ArenaNode::Fragment { children } | ArenaNode::Element { children, .. } => {
                Some(children)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<ArenaNode>,
}

impl NodeArena {
    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent: usize, child: usize) -> BuildResult<()> {
        match &mut self.nodes[parent] {
            ArenaNode::Fragment { children } => {
                children.push(child);
                Ok(())
            }
            ArenaNode::Element {
                name,
                kind,
                children,
                ..
            } => {
                if kind.is_void() {
                    return Err(BuildError::Structural { tag: name.clone() });
                }
                children.push(child);
                Ok(())
            }
            _ => unreachable!("append target cannot hold children"),
        }
    }

    /// Moves the subtree rooted at `index` out of the arena as an owned tree.
    ///
    /// Iterative postorder: the first visit of a node schedules it for
    /// construction and descends; by the second visit all of its descendants
    /// sit on `built_nodes`, with its direct children as the last
    /// `child_count` entries in original order.
    fn extract(&mut self, index: usize) -> Node {
        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let mut children = Vec::with_capacity(n);
            for _ in 0..n {
                children.push(built.pop().expect("child built before parent"));
            }
            children.reverse();
            children
        }

        let mut built_nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<(usize, bool)> = vec![(index, false)];

        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));
                // Children pushed in reverse so they are visited, and thus
                // land on `built_nodes`, in original order.
                if let Some(children) = self.nodes[node_index].child_indices() {
                    for &child in children.iter().rev() {
                        stack.push((child, false));
                    }
                }
                continue;
            }

            let node = match std::mem::replace(&mut self.nodes[node_index], ArenaNode::Hollow) {
                ArenaNode::Fragment { children } => Node::Fragment {
                    children: take_children(children.len(), &mut built_nodes),
                },
                ArenaNode::Element {
                    name,
                    kind,
                    attributes,
                    children,
                } => Node::Element {
                    name,
                    kind,
                    attributes,
                    children: take_children(children.len(), &mut built_nodes),
                },
                ArenaNode::Text { text } => Node::Text { text },
                ArenaNode::Import { node } => node,
                ArenaNode::Hollow => unreachable!("extracted slot reached during extraction"),
            };
            built_nodes.push(node);
        }

        debug_assert_eq!(built_nodes.len(), 1, "extraction builds exactly one root");
        built_nodes.pop().expect("extraction built a root")
    }
}
