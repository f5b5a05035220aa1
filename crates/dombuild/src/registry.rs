//! Element kind registry.
//!
//! Maps an element name to its structural category, its attribute schema,
//! and its validation hook. A registry is populated once before any build
//! runs against it and is read-only afterwards, so it can be shared freely
//! between concurrent builds.

use std::collections::HashMap;
use std::fmt;

use crate::error::BuildError;
use crate::scope::NodeView;

/// Structural category: which closing/nesting discipline an element follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    Normal,
    /// Closing marker is optional downstream (`<p>`, `<li>`, `<body>`).
    /// Purely a formatting concern; no structural constraint here.
    OptionalEnd,
    /// May never contain children (`<br>`, `<img>`).
    Void,
}

impl TagKind {
    pub fn is_void(self) -> bool {
        matches!(self, TagKind::Void)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrType {
    Str,
    Int,
    Float,
    Bool,
    Uri,
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrType::Str => "string",
            AttrType::Int => "integer",
            AttrType::Float => "float",
            AttrType::Bool => "boolean",
            AttrType::Uri => "uri",
        };
        f.write_str(name)
    }
}

/// Post-construction validation hook; runs after the element's body has
/// completed and its context has been restored.
pub type ValidateHook = fn(&NodeView<'_>) -> Result<(), BuildError>;

/// Closed attribute schema: the declared names and, per name, the set of
/// accepted value types. An element without a schema accepts any attribute.
#[derive(Clone, Debug, Default)]
pub struct AttrSchema {
    entries: Vec<(String, Vec<AttrType>)>,
}

impl AttrSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(mut self, name: impl Into<String>, accepted: &[AttrType]) -> Self {
        self.entries.push((name.into(), accepted.to_vec()));
        self
    }

    pub fn accepted_types(&self, name: &str) -> Option<&[AttrType]> {
        self.entries
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, accepted)| accepted.as_slice())
    }
}

#[derive(Clone, Debug)]
pub struct TagSpec {
    pub kind: TagKind,
    pub attributes: Option<AttrSchema>,
    pub validate: Option<ValidateHook>,
}

impl TagSpec {
    pub fn new(kind: TagKind) -> Self {
        Self {
            kind,
            attributes: None,
            validate: None,
        }
    }

    pub fn with_attributes(mut self, schema: AttrSchema) -> Self {
        self.attributes = Some(schema);
        self
    }

    pub fn with_validate(mut self, hook: ValidateHook) -> Self {
        self.validate = Some(hook);
        self
    }
}

/// Name → spec lookup plus the global attribute schema shared by every
/// element that declares a schema of its own.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    tags: HashMap<String, TagSpec>,
    global: AttrSchema,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_attributes(mut self, global: AttrSchema) -> Self {
        self.global = global;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: TagSpec) {
        self.tags.insert(name.into(), spec);
    }

    pub fn lookup(&self, name: &str) -> Option<&TagSpec> {
        self.tags.get(name)
    }

    pub fn global_attributes(&self) -> &AttrSchema {
        &self.global
    }

    /// Accepted types for `attribute` on an element with `schema`, consulting
    /// the element's own declarations first, then the global set. `data-*`
    /// and `aria-*` names are accepted on any element with any value type.
    pub fn resolve_attribute<'a>(
        &'a self,
        schema: &'a AttrSchema,
        attribute: &str,
    ) -> AttributeRule<'a> {
        if attribute.starts_with("data-") || attribute.starts_with("aria-") {
            return AttributeRule::AnyType;
        }
        if let Some(accepted) = schema.accepted_types(attribute) {
            return AttributeRule::Accepted(accepted);
        }
        match self.global.accepted_types(attribute) {
            Some(accepted) => AttributeRule::Accepted(accepted),
            None => AttributeRule::Undeclared,
        }
    }
}

pub enum AttributeRule<'a> {
    Accepted(&'a [AttrType]),
    AnyType,
    Undeclared,
}
