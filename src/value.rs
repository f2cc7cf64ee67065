//! Type-erased values and input bags.
//!
//! Everything the container materializes flows through [`Value`]: a cheaply
//! clonable, type-erased `Arc` with the concrete type name retained for
//! diagnostics. Types that want to participate in attribute-future chains
//! (`spec.attr("field")`) opt in via [`AttrAccess`] and are wrapped with
//! [`Value::with_attrs`] so the container can project attributes off them
//! at resolution time.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erased shared value storage.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Attribute projection for materialized objects.
///
/// Implemented by user types whose attributes can be referenced before the
/// object exists, e.g. `singleton(..).arg(engine.attr("port"))`. The
/// container calls [`attr`](AttrAccess::attr) once the owning object has
/// been materialized; returning `None` surfaces as a descriptive lookup
/// error naming the missing attribute.
///
/// # Examples
///
/// ```rust
/// use specwire::{AttrAccess, Value};
///
/// struct Engine { port: u16 }
///
/// impl AttrAccess for Engine {
///     fn attr(&self, name: &str) -> Option<Value> {
///         match name {
///             "port" => Some(Value::new(self.port)),
///             _ => None,
///         }
///     }
/// }
///
/// let v = Value::with_attrs(Engine { port: 5432 });
/// assert_eq!(*v.attr("port").unwrap().downcast::<u16>().unwrap(), 5432);
/// assert!(v.attr("missing").is_none());
/// ```
pub trait AttrAccess: Send + Sync {
    /// Returns the named attribute of this object, or `None` if it has no
    /// such attribute.
    fn attr(&self, name: &str) -> Option<Value>;
}

/// A dynamically typed value produced by spec materialization.
///
/// Clones share the underlying allocation, so singleton semantics are
/// observable through [`Value::ptr_eq`]. The concrete type name is carried
/// for error messages; the payload is recovered with [`Value::downcast`].
///
/// # Examples
///
/// ```rust
/// use specwire::Value;
///
/// let a = Value::new(42i64);
/// let b = a.clone();
/// assert!(a.ptr_eq(&b));
/// assert_eq!(*a.downcast::<i64>().unwrap(), 42);
/// assert!(a.downcast::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Value {
    inner: AnyArc,
    type_name: &'static str,
    attrs: Option<Arc<dyn AttrAccess>>,
}

impl Value {
    /// Wraps a concrete value without attribute projection.
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            attrs: None,
        }
    }

    /// Wraps a value that supports attribute projection via [`AttrAccess`].
    pub fn with_attrs<T: AttrAccess + 'static>(value: T) -> Self {
        let arc = Arc::new(value);
        Self {
            inner: arc.clone(),
            type_name: std::any::type_name::<T>(),
            attrs: Some(arc),
        }
    }

    /// Wraps an already-shared value, preserving its allocation identity.
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
            attrs: None,
        }
    }

    /// Attempts to recover the concrete payload.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    /// Returns true if the payload is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        (*self.inner).type_id() == TypeId::of::<T>()
    }

    /// `TypeId` of the wrapped payload.
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Concrete type name of the wrapped payload, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Allocation identity: true if both values share the same payload.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Projects a named attribute, if the payload supports [`AttrAccess`].
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.attrs.as_ref()?.attr(name)
    }

    /// True if the payload opted into attribute projection.
    pub fn has_attrs(&self) -> bool {
        self.attrs.is_some()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name)
            .finish()
    }
}

/// Primitive local-input value.
///
/// Local inputs are supplied at the point a parent declares a child config
/// and take part in the locator's construction cache key, so they are
/// restricted to a small hashable primitive domain.
#[derive(Debug, Clone)]
pub enum InputValue {
    /// Boolean input
    Bool(bool),
    /// Integer input
    Int(i64),
    /// Floating-point input (hashed and compared by bit pattern)
    Float(f64),
    /// String input
    Str(String),
}

impl InputValue {
    /// `TypeId` of the natural Rust type this input resolves to.
    pub(crate) fn type_id(&self) -> TypeId {
        match self {
            InputValue::Bool(_) => TypeId::of::<bool>(),
            InputValue::Int(_) => TypeId::of::<i64>(),
            InputValue::Float(_) => TypeId::of::<f64>(),
            InputValue::Str(_) => TypeId::of::<String>(),
        }
    }

    /// Type name for diagnostics.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            InputValue::Bool(_) => "bool",
            InputValue::Int(_) => "i64",
            InputValue::Float(_) => "f64",
            InputValue::Str(_) => "alloc::string::String",
        }
    }

    /// Converts into the type-erased value the loader stores.
    pub(crate) fn to_value(&self) -> Value {
        match self {
            InputValue::Bool(b) => Value::new(*b),
            InputValue::Int(i) => Value::new(*i),
            InputValue::Float(x) => Value::new(*x),
            InputValue::Str(s) => Value::new(s.clone()),
        }
    }
}

impl PartialEq for InputValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (InputValue::Bool(a), InputValue::Bool(b)) => a == b,
            (InputValue::Int(a), InputValue::Int(b)) => a == b,
            (InputValue::Float(a), InputValue::Float(b)) => a.to_bits() == b.to_bits(),
            (InputValue::Str(a), InputValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for InputValue {}

impl Hash for InputValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            InputValue::Bool(b) => {
                0u8.hash(state);
                b.hash(state);
            }
            InputValue::Int(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            InputValue::Float(x) => {
                2u8.hash(state);
                x.to_bits().hash(state);
            }
            InputValue::Str(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl From<bool> for InputValue {
    fn from(v: bool) -> Self {
        InputValue::Bool(v)
    }
}

impl From<i64> for InputValue {
    fn from(v: i64) -> Self {
        InputValue::Int(v)
    }
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Float(v)
    }
}

impl From<&str> for InputValue {
    fn from(v: &str) -> Self {
        InputValue::Str(v.to_string())
    }
}

impl From<String> for InputValue {
    fn from(v: String) -> Self {
        InputValue::Str(v)
    }
}

/// Global-input values supplied at the root resolution call.
///
/// Propagated to every descendant config declaring an input of the same
/// name. Extra names no schema consumes are rejected by
/// [`resolve`](crate::resolve).
///
/// # Examples
///
/// ```rust
/// use specwire::GlobalInputs;
///
/// let inputs = GlobalInputs::new()
///     .set("name", "prod".to_string())
///     .set("replicas", 3i64);
/// ```
#[derive(Default)]
pub struct GlobalInputs {
    values: HashMap<String, Value>,
}

impl GlobalInputs {
    /// Creates an empty input bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a concrete input value under `name`.
    pub fn set<T: Send + Sync + 'static>(mut self, name: &str, value: T) -> Self {
        self.values.insert(name.to_string(), Value::new(value));
        self
    }

    /// Adds a pre-built [`Value`] under `name`.
    pub fn set_value(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub(crate) fn into_map(self) -> HashMap<String, Value> {
        self.values
    }
}

/// Local-input values a parent supplies when declaring a child config.
///
/// Part of the child-construction cache key: two parents declaring the same
/// child schema with equal locals share one configuration node.
///
/// # Examples
///
/// ```rust
/// use specwire::Locals;
///
/// let locals = Locals::new().set("x", 1i64).set("label", "db");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Locals {
    entries: Vec<(String, InputValue)>,
}

impl Locals {
    /// Creates an empty local-input bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primitive input value under `name`.
    pub fn set(mut self, name: &str, value: impl Into<InputValue>) -> Self {
        self.entries.push((name.to_string(), value.into()));
        self
    }

    pub(crate) fn get(&self, name: &str) -> Option<&InputValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Entries sorted by name, for use as a cache-key component.
    pub(crate) fn sorted(&self) -> Vec<(String, InputValue)> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
