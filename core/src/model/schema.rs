#![deny(missing_docs)]

//! # Schema Trees
//!
//! Request/response and component bodies are trees of `SchemaNode`. Pointers to
//! named Components are `Reference` leaves that the resolver binds in place.

use crate::error::AppResult;
use crate::model::component::Component;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Primitive JSON types understood by the type-expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `object` (free-form)
    Object,
}

impl Primitive {
    /// Parses a primitive keyword. Returns `None` for anything else, which the
    /// extractor then treats as a Component name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Primitive::String),
            "integer" => Some(Primitive::Integer),
            "number" => Some(Primitive::Number),
            "boolean" => Some(Primitive::Boolean),
            "object" => Some(Primitive::Object),
            _ => None,
        }
    }

    /// JSON Schema `type` keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "object",
        }
    }
}

/// A symbolic pointer to a Component.
///
/// `binding` stays empty until the Reference Resolver has matched `target`
/// against the Component Table. References to the same Component share one
/// `Arc`. The cell is set through `&self` so references inside shared
/// Component bodies can be bound as well; the first binding sticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Name of the target Component.
    pub target: String,
    binding: OnceLock<Arc<Component>>,
}

impl Reference {
    /// Creates an unbound reference.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            binding: OnceLock::new(),
        }
    }

    /// Binds this reference to `component` unless it is already bound, and
    /// returns the binding in effect.
    pub fn bind(&self, component: &Arc<Component>) -> &Arc<Component> {
        self.binding.get_or_init(|| Arc::clone(component))
    }

    /// The bound Component, if any.
    pub fn bound(&self) -> Option<&Arc<Component>> {
        self.binding.get()
    }

    /// Whether the resolver has bound this reference.
    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Property schema.
    pub schema: SchemaNode,
    /// Whether the property is listed under `required`.
    pub required: bool,
    /// Optional description.
    pub description: Option<String>,
}

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A primitive with an optional `format`.
    Primitive {
        /// JSON type.
        kind: Primitive,
        /// Format hint, e.g. `int64`, `uuid`.
        format: Option<String>,
    },
    /// `[]T`
    Array(Box<SchemaNode>),
    /// `map[T]`: string keys, `T` values.
    Map(Box<SchemaNode>),
    /// An inline object with ordered properties.
    Object(Vec<Property>),
    /// A pointer to a Component.
    Ref(Reference),
}

impl SchemaNode {
    /// Shorthand for a primitive without format.
    pub fn primitive(kind: Primitive) -> Self {
        SchemaNode::Primitive { kind, format: None }
    }

    /// Shorthand for an unbound reference.
    pub fn reference(target: impl Into<String>) -> Self {
        SchemaNode::Ref(Reference::new(target))
    }

    /// All references in the tree, in depth-first declaration order.
    pub fn references(&self) -> Vec<&Reference> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a Reference>) {
        match self {
            SchemaNode::Primitive { .. } => {}
            SchemaNode::Array(inner) | SchemaNode::Map(inner) => inner.collect_references(out),
            SchemaNode::Object(props) => {
                for prop in props {
                    prop.schema.collect_references(out);
                }
            }
            SchemaNode::Ref(r) => out.push(r),
        }
    }

    /// Visits every reference mutably, depth-first, stopping at the first error.
    pub fn try_visit_references_mut<F>(&mut self, visit: &mut F) -> AppResult<()>
    where
        F: FnMut(&mut Reference) -> AppResult<()>,
    {
        match self {
            SchemaNode::Primitive { .. } => Ok(()),
            SchemaNode::Array(inner) | SchemaNode::Map(inner) => {
                inner.try_visit_references_mut(visit)
            }
            SchemaNode::Object(props) => {
                for prop in props.iter_mut() {
                    prop.schema.try_visit_references_mut(visit)?;
                }
                Ok(())
            }
            SchemaNode::Ref(r) => visit(r),
        }
    }

    /// Whether any reference reachable from the tree is still unbound,
    /// following bindings into Component bodies.
    pub fn has_unresolved(&self) -> bool {
        self.references().iter().any(|r| match r.bound() {
            Some(component) => component.schema.has_unresolved(),
            None => true,
        })
    }
}

impl fmt::Display for SchemaNode {
    /// Renders the node back into type-expression syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Primitive { kind, format } => match format {
                Some(fmt_hint) => write!(f, "{}({})", kind.as_str(), fmt_hint),
                None => write!(f, "{}", kind.as_str()),
            },
            SchemaNode::Array(inner) => write!(f, "[]{}", inner),
            SchemaNode::Map(inner) => write!(f, "map[{}]", inner),
            SchemaNode::Object(props) => write!(f, "object{{{} properties}}", props.len()),
            SchemaNode::Ref(r) => write!(f, "{}", r.target),
        }
    }
}
