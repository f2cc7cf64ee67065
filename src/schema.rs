//! Declarative schema registration.
//!
//! A schema is the explicit Rust counterpart of a declarative class body:
//! an ordered field table built by calling registration methods inside
//! [`ConfigDef::declare`]. Field order is declaration order; the loader
//! walks the table in that order when it turns the schema into a
//! [`Config`](crate::Config) node.

use std::any::TypeId;

use crate::spec::{Arg, ChildSpec, Spec, SpecKind};
use crate::value::Locals;

/// A declarative configuration schema.
///
/// Implementors describe their object graph by registering named specs in
/// [`declare`](ConfigDef::declare). The type itself is never instantiated;
/// its `TypeId` is the schema's identity, which is what lets two parents
/// that embed the same child schema (with equal local inputs) share one
/// configuration node.
///
/// # Examples
///
/// ```rust
/// use specwire::{object, prototype, CallArgs, ConfigDef, Schema, Value};
///
/// struct BasicConfig;
///
/// impl ConfigDef for BasicConfig {
///     fn declare(schema: &mut Schema) {
///         let x = schema.field("x", object(1i64));
///         schema.field(
///             "y",
///             prototype(|args: &CallArgs| Ok(Value::new(*args.get::<i64>(0)? + 1)))
///                 .named("succ")
///                 .arg(&x),
///         );
///     }
/// }
/// ```
pub trait ConfigDef: 'static {
    /// Registers this schema's fields in declaration order.
    fn declare(schema: &mut Schema);
}

/// A reusable bag of keyword arguments.
///
/// Not a resolvable field: registering one on a schema exists only so a
/// set of shared kwargs can sit next to the fields that splat it via
/// [`Call::kwargs`](crate::Call::kwargs). The loader skips helper bags.
#[derive(Default, Clone)]
pub struct Kwargs {
    entries: Vec<(String, Arg)>,
}

impl Kwargs {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyword entry.
    pub fn set(mut self, name: &str, arg: impl Into<Arg>) -> Self {
        self.entries.push((name.to_string(), arg.into()));
        self
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Arg)> {
        self.entries
    }
}

/// One declared schema field.
pub(crate) enum FieldDecl {
    /// A resolvable spec (leaf or child config).
    Spec(Spec),
    /// An auxiliary partial-kwargs bag; skipped by the loader.
    Helper(#[allow(dead_code)] Kwargs),
}

/// Ordered field table built by [`ConfigDef::declare`].
pub struct Schema {
    fields: Vec<(String, FieldDecl)>,
}

impl Schema {
    pub(crate) fn of(declare: fn(&mut Schema)) -> Self {
        let mut schema = Self { fields: Vec::new() };
        declare(&mut schema);
        schema
    }

    /// Registers a leaf field and returns its spec handle.
    ///
    /// The returned handle shares the field's spec id, so it can be used
    /// as an argument (`.arg(&handle)`) or an attribute-reference root
    /// (`handle.attr("x")`) by later fields.
    pub fn field(&mut self, name: &str, spec: impl Into<Spec>) -> Spec {
        let spec = spec.into();
        self.fields
            .push((name.to_string(), FieldDecl::Spec(spec.clone())));
        spec
    }

    /// Registers a nested child config constructed from schema `C` with
    /// the given local inputs, and returns its spec handle.
    ///
    /// Attribute references off the handle reach into the child:
    /// `child.attr("x")` depends on field `x` of the child node.
    pub fn child<C: ConfigDef>(&mut self, name: &str, locals: Locals) -> Spec {
        let spec = Spec::new(SpecKind::Child(ChildSpec {
            schema: TypeId::of::<C>(),
            schema_name: std::any::type_name::<C>(),
            declare: C::declare,
            locals,
        }));
        self.fields
            .push((name.to_string(), FieldDecl::Spec(spec.clone())));
        spec
    }

    /// Registers an auxiliary partial-kwargs bag.
    ///
    /// The bag is returned for splatting into callable specs; it is not a
    /// resolvable field and the loader skips it.
    pub fn kwargs(&mut self, name: &str, bag: Kwargs) -> Kwargs {
        self.fields
            .push((name.to_string(), FieldDecl::Helper(bag.clone())));
        bag
    }

    pub(crate) fn into_fields(self) -> Vec<(String, FieldDecl)> {
        self.fields
    }
}
