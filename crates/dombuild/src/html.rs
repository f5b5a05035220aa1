//! Default element catalog: a compact HTML subset.
//!
//! One `html_tags!` invocation declares the whole catalog and yields both
//! the registry entries and one typed factory function per tag. Normal and
//! optional-end tags take `(args, body)`; void tags take attributes only,
//! so a child-bearing call on them does not typecheck. The generic
//! [`element`] entry point remains available for dynamic tag names and
//! enforces the same rules at runtime.
//!
//! Attribute idents map underscores to hyphens (`http_equiv` → `http-equiv`).

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{BuildError, BuildResult};
use crate::factory::{element, void_element, BodyValue, ElementArgs};
use crate::registry::{AttrSchema, AttrType, Registry, TagKind, TagSpec};
use crate::scope::NodeView;
use crate::types::{Attrs, NodeId};

/// Ordered attribute construction: `attrs![id: "x", data_role: "nav"]`.
#[macro_export]
macro_rules! attrs {
    () => { $crate::Attrs::new() };
    ( $( $name:ident : $value:expr ),+ $(,)? ) => {
        $crate::Attrs::new()
            $( .set(stringify!($name).replace('_', "-"), $value) )+
    };
}

macro_rules! html_tags {
    ( $( $name:ident => $kind:ident { $( $attr:ident : [ $( $ty:ident ),* $(,)? ] ),* $(,)? } );* $(;)? ) => {
        fn catalog() -> Registry {
            let mut registry = Registry::new().with_global_attributes(global_attributes());
            $(
                registry.insert(
                    stringify!($name),
                    html_tags!(@spec $kind, html_tags!(@schema $( $attr : [ $( $ty ),* ] ),*)),
                );
            )*
            registry
        }

        $( html_tags!(@function $name, $kind); )*
    };

    (@schema) => { None };
    (@schema $( $attr:ident : [ $( $ty:ident ),* ] ),+ ) => {
        Some(
            AttrSchema::new()
                $( .declare(stringify!($attr).replace('_', "-"), &[ $( AttrType::$ty ),* ]) )+
        )
    };

    (@spec Void, $schema:expr) => {{
        let spec = TagSpec::new(TagKind::Void).with_validate(ensure_childless);
        match $schema {
            Some(schema) => spec.with_attributes(schema),
            None => spec,
        }
    }};
    (@spec $kind:ident, $schema:expr) => {{
        let spec = TagSpec::new(TagKind::$kind);
        match $schema {
            Some(schema) => spec.with_attributes(schema),
            None => spec,
        }
    }};

    (@function $name:ident, Void) => {
        #[doc = concat!("Builds a childless `<", stringify!($name), ">` element.")]
        pub fn $name<A>(attrs: A) -> BuildResult<NodeId>
        where
            A: Into<Attrs>,
        {
            void_element(stringify!($name), attrs)
        }
    };
    (@function $name:ident, $kind:ident) => {
        #[doc = concat!("Builds a `<", stringify!($name), ">` element.")]
        pub fn $name<A, F, R>(args: A, body: F) -> BuildResult<NodeId>
        where
            A: Into<ElementArgs>,
            F: FnOnce() -> R,
            R: Into<BodyValue>,
        {
            element(stringify!($name), args, body)
        }
    };
}

fn ensure_childless(view: &NodeView<'_>) -> Result<(), BuildError> {
    if view.child_count() == 0 {
        Ok(())
    } else {
        Err(BuildError::Structural {
            tag: view.name().to_string(),
        })
    }
}

fn global_attributes() -> AttrSchema {
    AttrSchema::new()
        .declare("id", &[AttrType::Str])
        .declare("class", &[AttrType::Str])
        .declare("style", &[AttrType::Str])
        .declare("title", &[AttrType::Str])
        .declare("lang", &[AttrType::Str])
        .declare("dir", &[AttrType::Str])
        .declare("hidden", &[AttrType::Bool])
        .declare("tabindex", &[AttrType::Int])
}

html_tags! {
    a => Normal { href: [Str, Uri], target: [Str], rel: [Str], name: [Str] };
    abbr => Normal {};
    area => Void { href: [Str, Uri], alt: [Str], target: [Str] };
    article => Normal {};
    aside => Normal {};
    b => Normal {};
    base => Void { href: [Str, Uri], target: [Str] };
    blockquote => Normal {};
    body => OptionalEnd {};
    br => Void {};
    button => Normal { name: [Str], value: [Str], disabled: [Bool] };
    code => Normal {};
    col => Void {};
    colgroup => OptionalEnd {};
    dd => OptionalEnd {};
    div => Normal {};
    dl => Normal {};
    dt => OptionalEnd {};
    em => Normal {};
    embed => Void { src: [Str, Uri] };
    figure => Normal {};
    footer => Normal {};
    form => Normal { action: [Str, Uri], method: [Str], name: [Str] };
    h1 => Normal {};
    h2 => Normal {};
    h3 => Normal {};
    h4 => Normal {};
    h5 => Normal {};
    h6 => Normal {};
    head => OptionalEnd {};
    header => Normal {};
    hr => Void {};
    html => Normal {};
    i => Normal {};
    iframe => Normal { src: [Str, Uri], width: [Int], height: [Int] };
    img => Void { src: [Str, Uri], alt: [Str], width: [Int], height: [Int] };
    input => Void { name: [Str], value: [Str, Int, Float], checked: [Bool], disabled: [Bool] };
    label => Normal {};
    li => OptionalEnd {};
    link => Void { href: [Str, Uri], rel: [Str], media: [Str] };
    main => Normal {};
    meta => Void { charset: [Str], name: [Str], content: [Str], http_equiv: [Str] };
    nav => Normal {};
    ol => Normal {};
    option => OptionalEnd {};
    p => OptionalEnd {};
    pre => Normal {};
    script => Normal { src: [Str, Uri], defer: [Bool] };
    section => Normal {};
    select => Normal { name: [Str], disabled: [Bool] };
    small => Normal {};
    span => Normal {};
    strong => Normal {};
    table => Normal {};
    tbody => OptionalEnd {};
    td => OptionalEnd {};
    textarea => Normal { name: [Str], rows: [Int], cols: [Int] };
    th => OptionalEnd {};
    thead => OptionalEnd {};
    title => Normal {};
    tr => OptionalEnd {};
    ul => Normal {};
}

static HTML: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(catalog()));

/// The default catalog, shared by every build that does not supply its own
/// registry.
pub fn registry() -> &'static Arc<Registry> {
    &HTML
}
