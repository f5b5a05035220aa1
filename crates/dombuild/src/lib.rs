//! Declarative tree building with implicit context.
//!
//! Nested calls and closures construct a node tree without threading a
//! parent reference: a builder call appends its node to whatever element's
//! body it lexically runs inside.
//!
//! ```
//! use dombuild::html::{div, span};
//! use dombuild::{attrs, empty, fragment, text, BuildResult};
//!
//! let tree = dombuild::fragment(|| -> BuildResult<()> {
//!     div(attrs![id: "x"], || -> BuildResult<()> {
//!         span("hi", empty)?;
//!         text("world")?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! assert_eq!(tree.children().len(), 1);
//! # Ok::<(), dombuild::BuildError>(())
//! ```

#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod dom_utils;
pub mod html;

mod error;
mod factory;
mod registry;
mod scope;
mod types;

pub use crate::error::{BuildError, BuildResult};
pub use crate::factory::{element, empty, void_element, BodyValue, ElementArgs};
pub use crate::registry::{
    AttrSchema, AttrType, AttributeRule, Registry, TagKind, TagSpec, ValidateHook,
};
pub use crate::scope::{
    append, current, depth, fragment, fragment_with, text, BuildConfig, NodeView,
};
pub use crate::types::{AttrValue, Attrs, Child, Node, NodeId};
