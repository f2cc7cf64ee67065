//! Specs: deferred, declarative recipes for values.
//!
//! A [`Spec`] describes how to obtain a value without producing it. Schemas
//! are bags of named specs; the [`Container`](crate::Container) walks them
//! lazily and materializes values on demand. Constructors in this module are
//! the only entry points user schemas call:
//!
//! - [`object`] — pass a fully-realized value through verbatim
//! - [`global_input`] / [`local_input`] — placeholders for caller-supplied
//!   values (root resolution time vs. child declaration time)
//! - [`prototype`] / [`singleton`] — deferred callable invocations
//!   (recomputed every request vs. cached once per container)
//! - [`forward`] — alias another spec's eventual value
//! - [`singleton_list`] / [`singleton_dict`] — cached collection helpers
//!
//! Dependencies between specs are expressed with [`Arg`]s: a `&Spec`
//! becomes a by-id reference, a moved `Spec` an anonymous inline recipe,
//! and [`Spec::attr`] a deferred attribute projection ([`AttrRef`]) that
//! the container resolves after materializing its root.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ConfigError, ConfigResult};
use crate::id::{next_spec_id, SpecId};
use crate::value::{InputValue, Value};

/// Target callable signature for [`prototype`] and [`singleton`] specs.
pub(crate) type TargetFn = Arc<dyn Fn(&CallArgs) -> ConfigResult<Value> + Send + Sync>;

/// Caching policy of a callable spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallPolicy {
    /// Re-invoked on every resolution request.
    Prototype,
    /// Invoked at most once per container lifetime, cached by spec id.
    Singleton,
}

/// Which input bag a placeholder draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputScope {
    Global,
    Local,
}

impl InputScope {
    pub(crate) fn tag(self) -> &'static str {
        match self {
            InputScope::Global => "Global",
            InputScope::Local => "Local",
        }
    }
}

/// Declared expected type of an input, checked at load time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expected {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl Expected {
    pub(crate) fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

/// Input placeholder awaiting a caller-supplied value.
#[derive(Clone)]
pub(crate) struct InputSpec {
    pub(crate) scope: InputScope,
    pub(crate) expected: Option<Expected>,
    pub(crate) default: Option<Value>,
}

/// Deferred callable invocation with spec-valued arguments.
#[derive(Clone)]
pub(crate) struct CallableSpec {
    pub(crate) policy: CallPolicy,
    pub(crate) target: TargetFn,
    pub(crate) target_name: String,
    pub(crate) args: Vec<Arg>,
    pub(crate) kwargs: Vec<(String, Arg)>,
    pub(crate) lazy_kwargs: Option<Arg>,
}

impl CallableSpec {
    /// Copy with replaced arguments; same policy and target.
    ///
    /// Used by the resolver to substitute materialized arguments for
    /// spec-valued ones without mutating the original declaration.
    pub(crate) fn copy_with(&self, args: Vec<Arg>, kwargs: Vec<(String, Arg)>) -> Self {
        Self {
            policy: self.policy,
            target: self.target.clone(),
            target_name: self.target_name.clone(),
            args,
            kwargs,
            lazy_kwargs: None,
        }
    }

    /// Invokes the target over fully-concrete arguments.
    ///
    /// Every argument must already be an [`Arg::Value`]; target failures
    /// are wrapped with the callable's identity for diagnosis.
    pub(crate) fn instantiate(&self) -> ConfigResult<Value> {
        let mut pos = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            match arg {
                Arg::Value(v) => pos.push(v.clone()),
                _ => {
                    return Err(ConfigError::Resolution(format!(
                        "unresolved positional argument for {}",
                        self.target_name
                    )))
                }
            }
        }
        let mut kw = IndexMap::with_capacity(self.kwargs.len());
        for (name, arg) in &self.kwargs {
            match arg {
                Arg::Value(v) => {
                    kw.insert(name.clone(), v.clone());
                }
                _ => {
                    return Err(ConfigError::Resolution(format!(
                        "unresolved keyword argument {:?} for {}",
                        name, self.target_name
                    )))
                }
            }
        }

        let call_args = CallArgs { pos, kw };
        (self.target)(&call_args).map_err(|err| ConfigError::Construction {
            target: self.target_name.clone(),
            message: err.to_string(),
        })
    }
}

/// Nested-schema declaration: identity plus local-input arguments.
#[derive(Clone)]
pub(crate) struct ChildSpec {
    pub(crate) schema: TypeId,
    pub(crate) schema_name: &'static str,
    pub(crate) declare: fn(&mut crate::schema::Schema),
    pub(crate) locals: crate::value::Locals,
}

/// Spec variants; see module docs for the capability each represents.
#[derive(Clone)]
pub(crate) enum SpecKind {
    Object(Value),
    Input(InputSpec),
    Call(CallableSpec),
    Attr(AttrRef),
    Child(ChildSpec),
}

impl SpecKind {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            SpecKind::Object(_) => "object",
            SpecKind::Input(input) => match input.scope {
                InputScope::Global => "global-input",
                InputScope::Local => "local-input",
            },
            SpecKind::Call(call) => match call.policy {
                CallPolicy::Prototype => "prototype",
                CallPolicy::Singleton => "singleton",
            },
            SpecKind::Attr(_) => "attr-future",
            SpecKind::Child(_) => "child-config",
        }
    }
}

/// A deferred, declarative description of how to obtain a value.
///
/// Specs are immutable after construction; the one sanctioned mutation path
/// is a configuration node's field assignment, which replaces the whole
/// spec while preserving its [`SpecId`]. Cloning a spec shares its id —
/// the clone names the same logical slot.
///
/// # Examples
///
/// ```rust
/// use specwire::object;
///
/// let x = object(1i64);
/// let same_slot = x.clone();
/// assert_eq!(x.id(), same_slot.id());
///
/// // Depend on attribute "port" of whatever `x` eventually produces.
/// let port = x.attr("port");
/// let nested = port.attr("number"); // path extension by copy
/// ```
#[derive(Clone)]
pub struct Spec {
    id: SpecId,
    kind: SpecKind,
}

impl Spec {
    pub(crate) fn new(kind: SpecKind) -> Self {
        Self {
            id: next_spec_id(),
            kind,
        }
    }

    /// Rebinds this spec to an existing slot id.
    ///
    /// Loader/perturbation internal: used when an input spec is converted
    /// into an object spec and when a field assignment replaces a spec, so
    /// references captured against the original id stay valid.
    pub(crate) fn with_id(mut self, id: SpecId) -> Self {
        self.id = id;
        self
    }

    /// This spec's slot identity.
    pub fn id(&self) -> SpecId {
        self.id
    }

    /// A deferred reference to attribute `name` of this spec's eventual
    /// value, usable as an argument or a field before resolution.
    pub fn attr(&self, name: &str) -> AttrRef {
        AttrRef {
            root: self.id,
            path: vec![name.to_string()],
        }
    }

    pub(crate) fn kind(&self) -> &SpecKind {
        &self.kind
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("id", &self.id)
            .field("kind", &self.kind.kind_name())
            .finish()
    }
}

/// Deferred attribute projection off a not-yet-resolved spec.
///
/// "The value obtained by taking attribute path `path` off whatever
/// resolves from spec `root`." Chaining [`AttrRef::attr`] extends the path
/// by copy; the original is untouched. Resolved by the container after
/// materializing the root: nested-config hops go through the child node,
/// object hops through [`AttrAccess`](crate::AttrAccess).
#[derive(Debug, Clone)]
pub struct AttrRef {
    pub(crate) root: SpecId,
    pub(crate) path: Vec<String>,
}

impl AttrRef {
    /// Extends the attribute path, returning a new reference.
    pub fn attr(&self, name: &str) -> AttrRef {
        let mut path = self.path.clone();
        path.push(name.to_string());
        AttrRef {
            root: self.root,
            path,
        }
    }
}

/// An argument to a callable spec.
///
/// Arguments are resolved recursively at materialization time; anything
/// that is not a spec, reference, attribute future, or container of those
/// passes through unchanged as a literal.
#[derive(Clone)]
pub enum Arg {
    /// Concrete literal value, passed through unchanged.
    Value(Value),
    /// Reference to a named spec slot by id (produced from `&Spec`).
    Ref(SpecId),
    /// Anonymous inline spec, materialized in place.
    Spec(Box<Spec>),
    /// Deferred attribute projection.
    Attr(AttrRef),
    /// Ordered sequence resolved element-wise into `Vec<Value>`.
    List(Vec<Arg>),
    /// Ordered mapping resolved value-wise into `IndexMap<String, Value>`.
    Map(Vec<(String, Arg)>),
}

impl Arg {
    /// Wraps an arbitrary literal.
    pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Arg::Value(Value::new(value))
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Ref(id) => f.debug_tuple("Ref").field(id).finish(),
            Arg::Spec(s) => f.debug_tuple("Spec").field(s).finish(),
            Arg::Attr(a) => f.debug_tuple("Attr").field(a).finish(),
            Arg::List(items) => f.debug_tuple("List").field(&items.len()).finish(),
            Arg::Map(entries) => f.debug_tuple("Map").field(&entries.len()).finish(),
        }
    }
}

impl From<&Spec> for Arg {
    fn from(spec: &Spec) -> Self {
        Arg::Ref(spec.id())
    }
}

impl From<Spec> for Arg {
    fn from(spec: Spec) -> Self {
        Arg::Spec(Box::new(spec))
    }
}

impl From<Call> for Arg {
    fn from(call: Call) -> Self {
        Arg::Spec(Box::new(call.spec()))
    }
}

impl From<AttrRef> for Arg {
    fn from(attr: AttrRef) -> Self {
        Arg::Attr(attr)
    }
}

impl From<&AttrRef> for Arg {
    fn from(attr: &AttrRef) -> Self {
        Arg::Attr(attr.clone())
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Value(Value::new(v))
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Value(Value::new(v))
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Value(Value::new(v))
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Value(Value::new(v.to_string()))
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Value(Value::new(v))
    }
}

/// Resolved arguments handed to a callable target.
///
/// Positional arguments keep declaration order; keyword arguments keep
/// insertion order (lazy-kwargs entries are merged last and overwrite
/// same-named explicit keywords).
///
/// # Examples
///
/// ```rust
/// use specwire::{prototype, CallArgs, Value};
///
/// let add = prototype(|args: &CallArgs| {
///     let x = *args.get::<i64>(0)?;
///     let offset = *args.kw_as::<i64>("offset")?;
///     Ok(Value::new(x + offset))
/// });
/// ```
pub struct CallArgs {
    pos: Vec<Value>,
    kw: IndexMap<String, Value>,
}

impl CallArgs {
    /// All positional arguments in order.
    pub fn positional(&self) -> &[Value] {
        &self.pos
    }

    /// Positional argument at `idx`.
    pub fn pos(&self, idx: usize) -> ConfigResult<&Value> {
        self.pos.get(idx).ok_or_else(|| {
            ConfigError::Resolution(format!("missing positional argument {}", idx))
        })
    }

    /// Positional argument at `idx`, downcast to `T`.
    pub fn get<T: Send + Sync + 'static>(&self, idx: usize) -> ConfigResult<Arc<T>> {
        let value = self.pos(idx)?;
        value.downcast::<T>().ok_or_else(|| {
            ConfigError::Resolution(format!(
                "positional argument {} is {}, expected {}",
                idx,
                value.type_name(),
                std::any::type_name::<T>()
            ))
        })
    }

    /// Keyword argument `name`.
    pub fn kw(&self, name: &str) -> ConfigResult<&Value> {
        self.kw.get(name).ok_or_else(|| {
            ConfigError::Resolution(format!("missing keyword argument {:?}", name))
        })
    }

    /// Keyword argument `name`, downcast to `T`.
    pub fn kw_as<T: Send + Sync + 'static>(&self, name: &str) -> ConfigResult<Arc<T>> {
        let value = self.kw(name)?;
        value.downcast::<T>().ok_or_else(|| {
            ConfigError::Resolution(format!(
                "keyword argument {:?} is {}, expected {}",
                name,
                value.type_name(),
                std::any::type_name::<T>()
            ))
        })
    }

    /// Keyword argument `name`, if present.
    pub fn opt_kw(&self, name: &str) -> Option<&Value> {
        self.kw.get(name)
    }

    /// All keyword arguments in insertion order.
    pub fn kwargs(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.kw.iter()
    }

    /// Keyword arguments as an owned ordered map.
    pub fn keyword_map(&self) -> IndexMap<String, Value> {
        self.kw.clone()
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    /// True if no positional arguments were given.
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

/// Builder for [`prototype`] and [`singleton`] specs.
///
/// Chain [`arg`](Call::arg) / [`kwarg`](Call::kwarg) to attach spec-valued
/// arguments, then convert into a [`Spec`] (implicitly wherever
/// `impl Into<Spec>` is accepted, or explicitly via [`Call::spec`]).
pub struct Call {
    policy: CallPolicy,
    target: TargetFn,
    target_name: String,
    args: Vec<Arg>,
    kwargs: Vec<(String, Arg)>,
    lazy_kwargs: Option<Arg>,
}

impl Call {
    fn new<F>(policy: CallPolicy, target: F) -> Self
    where
        F: Fn(&CallArgs) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        Self {
            policy,
            target: Arc::new(target),
            target_name: std::any::type_name::<F>().to_string(),
            args: Vec::new(),
            kwargs: Vec::new(),
            lazy_kwargs: None,
        }
    }

    /// Sets the diagnostic name reported in construction errors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.target_name = name.into();
        self
    }

    /// Appends a positional argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a keyword argument.
    pub fn kwarg(mut self, name: &str, arg: impl Into<Arg>) -> Self {
        self.kwargs.push((name.to_string(), arg.into()));
        self
    }

    /// Appends all entries of a partial-kwargs bag.
    pub fn kwargs(mut self, bag: crate::schema::Kwargs) -> Self {
        self.kwargs.extend(bag.into_entries());
        self
    }

    /// Sets a deferred keyword mapping, resolved at materialization time
    /// and merged into the keyword arguments. Lazy entries overwrite
    /// same-named explicit keywords.
    pub fn lazy_kwargs(mut self, arg: impl Into<Arg>) -> Self {
        self.lazy_kwargs = Some(arg.into());
        self
    }

    /// Finalizes into a spec, allocating its id.
    pub fn spec(self) -> Spec {
        Spec::new(SpecKind::Call(CallableSpec {
            policy: self.policy,
            target: self.target,
            target_name: self.target_name,
            args: self.args,
            kwargs: self.kwargs,
            lazy_kwargs: self.lazy_kwargs,
        }))
    }
}

impl From<Call> for Spec {
    fn from(call: Call) -> Self {
        call.spec()
    }
}

impl From<AttrRef> for Spec {
    fn from(attr: AttrRef) -> Self {
        Spec::new(SpecKind::Attr(attr))
    }
}

// Non-spec values assigned to a config field are wrapped into object
// specs; these conversions are what lets `config.set("x", 2)` read like
// the perturbation it is.
impl From<Value> for Spec {
    fn from(value: Value) -> Self {
        Spec::new(SpecKind::Object(value))
    }
}

impl From<bool> for Spec {
    fn from(v: bool) -> Self {
        object(v)
    }
}

impl From<i64> for Spec {
    fn from(v: i64) -> Self {
        object(v)
    }
}

impl From<f64> for Spec {
    fn from(v: f64) -> Self {
        object(v)
    }
}

impl From<&str> for Spec {
    fn from(v: &str) -> Self {
        object(v.to_string())
    }
}

impl From<String> for Spec {
    fn from(v: String) -> Self {
        object(v)
    }
}

/// Spec passing a fully-instantiated value through verbatim.
///
/// # Examples
///
/// ```rust
/// use specwire::{object, ConfigDef, Schema};
///
/// struct FooConfig;
/// impl ConfigDef for FooConfig {
///     fn declare(schema: &mut Schema) {
///         schema.field("x", object(1i64));
///     }
/// }
/// ```
pub fn object<T: Send + Sync + 'static>(value: T) -> Spec {
    Spec::new(SpecKind::Object(Value::new(value)))
}

/// Like [`object`], for a pre-built [`Value`] (e.g. one carrying an
/// [`AttrAccess`](crate::AttrAccess) projector).
pub fn object_value(value: Value) -> Spec {
    Spec::new(SpecKind::Object(value))
}

/// Spec for a required caller input supplied at root resolution time.
///
/// The value must be a `T`; a mismatch or a missing input fails resolution
/// with an input error naming the field.
pub fn global_input<T: Send + Sync + 'static>() -> Spec {
    Spec::new(SpecKind::Input(InputSpec {
        scope: InputScope::Global,
        expected: Some(Expected::of::<T>()),
        default: None,
    }))
}

/// [`global_input`] with a fallback used when the caller supplies nothing.
pub fn global_input_with_default<T: Send + Sync + 'static>(default: T) -> Spec {
    Spec::new(SpecKind::Input(InputSpec {
        scope: InputScope::Global,
        expected: Some(Expected::of::<T>()),
        default: Some(Value::new(default)),
    }))
}

/// Spec for a required input supplied by the parent config when it
/// declares the child (see [`Locals`](crate::Locals)).
///
/// `T` must be one of the primitive local-input types: `bool`, `i64`,
/// `f64`, or `String`.
pub fn local_input<T: Send + Sync + 'static>() -> Spec {
    Spec::new(SpecKind::Input(InputSpec {
        scope: InputScope::Local,
        expected: Some(Expected::of::<T>()),
        default: None,
    }))
}

/// [`local_input`] with a fallback used when the parent supplies nothing.
///
/// The expected type is taken from the default's input-value form, so a
/// `&str` default declares a `String` field.
pub fn local_input_with_default<T: Into<InputValue>>(default: T) -> Spec {
    let default = default.into();
    Spec::new(SpecKind::Input(InputSpec {
        scope: InputScope::Local,
        expected: Some(Expected {
            id: default.type_id(),
            name: default.type_name(),
        }),
        default: Some(default.to_value()),
    }))
}

/// Spec describing a callable invocation with no caching: re-invoked on
/// every resolution request.
///
/// # Examples
///
/// ```rust
/// use specwire::{object, prototype, CallArgs, ConfigDef, Schema, Value};
///
/// struct FooConfig;
/// impl ConfigDef for FooConfig {
///     fn declare(schema: &mut Schema) {
///         let x = schema.field("x", object(1i64));
///         schema.field(
///             "y",
///             prototype(|args: &CallArgs| {
///                 Ok(Value::new(*args.get::<i64>(0)? + *args.kw_as::<i64>("offset")?))
///             })
///             .named("calc_offset")
///             .arg(&x)
///             .kwarg("offset", 1i64),
///         );
///     }
/// }
/// ```
pub fn prototype<F>(target: F) -> Call
where
    F: Fn(&CallArgs) -> ConfigResult<Value> + Send + Sync + 'static,
{
    Call::new(CallPolicy::Prototype, target)
}

/// Spec describing a callable invocation cached once per container: the
/// target runs at most once per spec id, and every request returns the
/// same value identity.
pub fn singleton<F>(target: F) -> Call
where
    F: Fn(&CallArgs) -> ConfigResult<Value> + Send + Sync + 'static,
{
    Call::new(CallPolicy::Singleton, target)
}

/// Spec that simply forwards to another spec's eventual value.
///
/// Often useful as a switch: declare `x = forward(&x0)`, then perturb the
/// field to `forward(&x1)` before freezing to redirect every dependent.
/// Accepts anything an argument accepts, including attribute references.
pub fn forward(target: impl Into<Arg>) -> Spec {
    prototype(|args: &CallArgs| Ok(args.pos(0)?.clone()))
        .named("forward")
        .arg(target)
        .spec()
}

/// Singleton spec collecting its arguments into a `Vec<Value>`, cached per
/// config field.
///
/// # Examples
///
/// ```rust
/// use specwire::{object, singleton_list, Arg, ConfigDef, Schema};
///
/// struct FooConfig;
/// impl ConfigDef for FooConfig {
///     fn declare(schema: &mut Schema) {
///         let x = schema.field("x", object(1i64));
///         let y = schema.field("y", object(2i64));
///         schema.field("values", singleton_list([Arg::from(&x), Arg::from(&y)]));
///     }
/// }
/// ```
pub fn singleton_list<I>(items: I) -> Spec
where
    I: IntoIterator<Item = Arg>,
{
    let mut call =
        singleton(|args: &CallArgs| Ok(Value::new(args.positional().to_vec()))).named("list");
    for item in items {
        call = call.arg(item);
    }
    call.spec()
}

/// Singleton spec collecting named arguments into an ordered
/// `IndexMap<String, Value>`, cached per config field.
pub fn singleton_dict<'a, I>(entries: I) -> Spec
where
    I: IntoIterator<Item = (&'a str, Arg)>,
{
    let mut call = singleton(|args: &CallArgs| Ok(Value::new(args.keyword_map()))).named("dict");
    for (name, arg) in entries {
        call = call.kwarg(name, arg);
    }
    call.spec()
}

/// [`singleton_dict`] unioned over a base mapping: the base argument must
/// resolve to an `IndexMap<String, Value>` (e.g. an [`Arg::Map`] or a
/// reference to another dict field), and the named entries overwrite
/// same-named base keys.
pub fn singleton_dict_with_base<'a, I>(base: impl Into<Arg>, entries: I) -> Spec
where
    I: IntoIterator<Item = (&'a str, Arg)>,
{
    let mut call = singleton(|args: &CallArgs| {
        let base = args.get::<IndexMap<String, Value>>(0)?;
        let mut merged = (*base).clone();
        for (name, value) in args.kwargs() {
            merged.insert(name.clone(), value.clone());
        }
        Ok(Value::new(merged))
    })
    .named("dict")
    .arg(base);
    for (name, arg) in entries {
        call = call.kwarg(name, arg);
    }
    call.spec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_slot_id() {
        let x = object(1i64);
        assert_eq!(x.id(), x.clone().id());
    }

    #[test]
    fn attr_ref_extends_by_copy() {
        let x = object(1i64);
        let a = x.attr("a");
        let ab = a.attr("b");
        assert_eq!(a.path, vec!["a"]);
        assert_eq!(ab.path, vec!["a", "b"]);
        assert_eq!(ab.root, x.id());
    }

    #[test]
    fn ref_arg_vs_anonymous_arg() {
        let x = object(1i64);
        let id = x.id();
        match Arg::from(&x) {
            Arg::Ref(got) => assert_eq!(got, id),
            other => panic!("expected Ref, got {:?}", other),
        }
        match Arg::from(x) {
            Arg::Spec(spec) => assert_eq!(spec.id(), id),
            other => panic!("expected Spec, got {:?}", other),
        }
    }

    #[test]
    fn instantiate_requires_concrete_args() {
        let call = prototype(|args: &CallArgs| Ok(args.pos(0)?.clone()))
            .arg(Arg::Ref(0))
            .spec();
        let SpecKind::Call(callable) = call.kind() else {
            panic!("expected callable");
        };
        assert!(callable.instantiate().is_err());
    }

    #[test]
    fn construction_error_names_target() {
        let call = prototype(|args: &CallArgs| Ok(args.pos(0)?.clone()))
            .named("needs_one_arg")
            .spec();
        let SpecKind::Call(callable) = call.kind() else {
            panic!("expected callable");
        };
        match callable.instantiate() {
            Err(ConfigError::Construction { target, .. }) => {
                assert_eq!(target, "needs_one_arg");
            }
            other => panic!("expected construction error, got {:?}", other.map(|_| ())),
        }
    }
}
