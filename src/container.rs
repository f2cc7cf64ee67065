//! Lazy, memoizing resolution over a frozen configuration tree.
//!
//! [`build_container`] claims a [`Config`], freezes it, and wraps it in a
//! [`Container`]. Nothing is instantiated up front: each request walks the
//! spec graph on demand, recursing through arguments depth-first. Singleton
//! results are cached per spec id; because perturbation transplants the
//! original id onto the replacement spec, caching and identity behave the
//! same whether a field was perturbed or not.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::{Config, Field};
use crate::error::{ConfigError, ConfigResult};
use crate::id::SpecId;
use crate::spec::{Arg, AttrRef, CallPolicy, CallableSpec, Spec, SpecKind};
use crate::value::Value;

struct ContainerInner {
    root: Config,
    cache: RwLock<HashMap<SpecId, Value>>,
}

/// Resolver over a frozen config tree.
///
/// Cloning shares the container and its singleton cache. Values come back
/// as type-erased [`Value`]s; downcast at the call site.
///
/// # Examples
///
/// ```rust
/// use specwire::{
///     build_container, object, resolve, singleton, CallArgs, ConfigDef, GlobalInputs,
///     Schema, Value,
/// };
///
/// struct FooConfig;
/// impl ConfigDef for FooConfig {
///     fn declare(schema: &mut Schema) {
///         let x = schema.field("x", object(2i64));
///         schema.field(
///             "doubled",
///             singleton(|args: &CallArgs| Ok(Value::new(*args.get::<i64>(0)? * 2)))
///                 .named("double")
///                 .arg(&x),
///         );
///     }
/// }
///
/// let config = resolve::<FooConfig>(GlobalInputs::new()).unwrap();
/// let container = build_container(config).unwrap();
/// let doubled = container.get("doubled").unwrap();
/// assert_eq!(*doubled.downcast::<i64>().unwrap(), 4);
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

/// Claims `config` for resolution: freezes the whole tree and returns its
/// container.
///
/// A config can back at most one container; a second claim fails with a
/// frozen error. Freezing via [`Config::freeze`] beforehand is fine — the
/// claim itself is what cannot repeat.
pub fn build_container(config: Config) -> ConfigResult<Container> {
    config.mark_container_built()?;
    debug!(schema = config.schema_name(), "container built");
    Ok(Container {
        inner: Arc::new(ContainerInner {
            root: config,
            cache: RwLock::new(HashMap::new()),
        }),
    })
}

impl Container {
    /// Resolves the value at a dotted path from the root node.
    ///
    /// Path components descend through child configs while they name
    /// children; the first leaf component resolves its spec, and any
    /// remaining components project attributes off the resolved value.
    /// A path ending on a child name yields a [`ConfigProxy`] value.
    pub fn get(&self, path: &str) -> ConfigResult<Value> {
        get_path(&self.inner, &self.inner.root, path)
    }

    /// Like [`get`](Container::get), falling back to `default` when the
    /// path does not resolve.
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// True if the dotted path names a declared field (leaf or child).
    /// Attribute projections past a leaf are not statically known and
    /// report false.
    pub fn contains(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('.').collect();
        let mut node = self.inner.root.clone();
        let Some((last, dirs)) = parts.split_last() else {
            return false;
        };
        for part in dirs {
            match node.lookup(part) {
                Some(Field::Child(child)) => node = child,
                _ => return false,
            }
        }
        node.contains_name(last)
    }

    /// Proxy over the root config node.
    pub fn config(&self) -> ConfigProxy {
        ConfigProxy {
            inner: self.inner.clone(),
            node: self.inner.root.clone(),
        }
    }

    /// Drops every cached singleton; subsequent requests re-invoke targets.
    pub fn clear(&self) {
        self.inner.cache.write().unwrap().clear();
        debug!("singleton cache cleared");
    }
}

/// Read-only view of one config node through its container.
///
/// Resolving a child field yields one of these (wrapped in a [`Value`]),
/// and attribute paths rooted at a child hop through it; it is also handy
/// for exploring a container interactively.
#[derive(Clone)]
pub struct ConfigProxy {
    inner: Arc<ContainerInner>,
    node: Config,
}

impl ConfigProxy {
    /// Resolves the value at a dotted path from this node.
    pub fn get(&self, path: &str) -> ConfigResult<Value> {
        get_path(&self.inner, &self.node, path)
    }

    /// Sorted field names of this node.
    pub fn keys(&self) -> Vec<String> {
        self.node.keys()
    }

    /// Display name of this node's schema.
    pub fn schema_name(&self) -> &'static str {
        self.node.schema_name()
    }
}

fn get_path(inner: &Arc<ContainerInner>, node: &Config, path: &str) -> ConfigResult<Value> {
    let parts: Vec<&str> = path.split('.').collect();
    let mut node = node.clone();
    for (i, part) in parts.iter().enumerate() {
        let last = i + 1 == parts.len();
        match node.lookup(part) {
            Some(Field::Child(child)) => {
                if last {
                    return Ok(Value::new(ConfigProxy {
                        inner: Arc::clone(inner),
                        node: child,
                    }));
                }
                node = child;
            }
            Some(Field::Spec(spec)) => {
                let mut value = resolve_spec(inner, &node, &spec)?;
                for seg in &parts[i + 1..] {
                    value = project(&value, seg)?;
                }
                return Ok(value);
            }
            None => {
                return Err(ConfigError::AttrLookup {
                    owner: node.schema_name().to_string(),
                    attr: part.to_string(),
                })
            }
        }
    }
    Err(ConfigError::Resolution("empty field path".to_string()))
}

fn get_field(inner: &Arc<ContainerInner>, node: &Config, name: &str) -> ConfigResult<Value> {
    match node.lookup(name) {
        Some(Field::Spec(spec)) => resolve_spec(inner, node, &spec),
        Some(Field::Child(child)) => Ok(Value::new(ConfigProxy {
            inner: Arc::clone(inner),
            node: child,
        })),
        None => Err(ConfigError::AttrLookup {
            owner: node.schema_name().to_string(),
            attr: name.to_string(),
        }),
    }
}

fn resolve_spec(inner: &Arc<ContainerInner>, owner: &Config, spec: &Spec) -> ConfigResult<Value> {
    match spec.kind() {
        SpecKind::Object(value) => Ok(value.clone()),
        SpecKind::Call(callable) => match callable.policy {
            CallPolicy::Prototype => materialize(inner, owner, callable),
            CallPolicy::Singleton => {
                let id = spec.id();
                if let Some(value) = inner.cache.read().unwrap().get(&id) {
                    trace!(spec_id = id, "singleton cache hit");
                    return Ok(value.clone());
                }
                // Never hold the cache lock while invoking a target.
                let value = materialize(inner, owner, callable)?;
                let mut cache = inner.cache.write().unwrap();
                Ok(cache.entry(id).or_insert(value).clone())
            }
        },
        SpecKind::Attr(attr) => resolve_attr(inner, owner, attr),
        SpecKind::Input(input) => Err(ConfigError::Resolution(format!(
            "unprocessed {}-input spec",
            input.scope.tag().to_lowercase()
        ))),
        SpecKind::Child(child) => Err(ConfigError::Resolution(format!(
            "child config {} cannot be resolved as an anonymous spec",
            child.schema_name
        ))),
    }
}

/// Resolves every argument to a concrete value, merges lazy kwargs, and
/// invokes the target.
fn materialize(
    inner: &Arc<ContainerInner>,
    owner: &Config,
    callable: &CallableSpec,
) -> ConfigResult<Value> {
    let mut args = Vec::with_capacity(callable.args.len());
    for arg in &callable.args {
        args.push(Arg::Value(resolve_arg(inner, owner, arg)?));
    }
    let mut kwargs: Vec<(String, Arg)> = Vec::with_capacity(callable.kwargs.len());
    for (name, arg) in &callable.kwargs {
        kwargs.push((name.clone(), Arg::Value(resolve_arg(inner, owner, arg)?)));
    }

    if let Some(lazy) = &callable.lazy_kwargs {
        let resolved = resolve_arg(inner, owner, lazy)?;
        let map = resolved
            .downcast::<IndexMap<String, Value>>()
            .ok_or_else(|| {
                ConfigError::Resolution(format!(
                    "lazy kwargs for {} must resolve to a keyword map, got {}",
                    callable.target_name,
                    resolved.type_name()
                ))
            })?;
        // Lazy entries overwrite same-named explicit keywords.
        for (name, value) in map.iter() {
            match kwargs.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = Arg::Value(value.clone()),
                None => kwargs.push((name.clone(), Arg::Value(value.clone()))),
            }
        }
    }

    callable.copy_with(args, kwargs).instantiate()
}

fn resolve_arg(inner: &Arc<ContainerInner>, owner: &Config, arg: &Arg) -> ConfigResult<Value> {
    match arg {
        Arg::Value(value) => Ok(value.clone()),
        Arg::Ref(id) => resolve_id(inner, owner, *id),
        // A spec whose id is registered as a field resolves through that
        // field, so a perturbed replacement wins over the moved handle.
        // Otherwise it is an anonymous inline spec; anonymous singletons
        // still cache by their own spec id inside resolve_spec.
        Arg::Spec(spec) => {
            let registered = owner
                .find_owner(spec.id())
                .or_else(|| inner.root.find_owner(spec.id()));
            match registered {
                Some((node, name)) => get_field(inner, &node, &name),
                None => resolve_spec(inner, owner, spec),
            }
        }
        Arg::Attr(attr) => resolve_attr(inner, owner, attr),
        Arg::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(resolve_arg(inner, owner, item)?);
            }
            Ok(Value::new(values))
        }
        Arg::Map(entries) => {
            let mut map = IndexMap::with_capacity(entries.len());
            for (name, entry) in entries {
                map.insert(name.clone(), resolve_arg(inner, owner, entry)?);
            }
            Ok(Value::new(map))
        }
    }
}

/// Resolves a by-id reference: finds the owning node (the requesting node
/// or one of its descendants, falling back to the whole tree for
/// cross-config forwards) and resolves its current field. Lookup goes
/// through the field name, so a perturbed replacement is what resolves.
fn resolve_id(inner: &Arc<ContainerInner>, owner: &Config, id: SpecId) -> ConfigResult<Value> {
    let (node, name) = owner
        .find_owner(id)
        .or_else(|| inner.root.find_owner(id))
        .ok_or_else(|| {
            ConfigError::Resolution(format!("no config field registered for spec id {}", id))
        })?;
    get_field(inner, &node, &name)
}

fn resolve_attr(inner: &Arc<ContainerInner>, owner: &Config, attr: &AttrRef) -> ConfigResult<Value> {
    let mut value = resolve_id(inner, owner, attr.root)?;
    for seg in &attr.path {
        value = project(&value, seg)?;
    }
    Ok(value)
}

/// One attribute hop: child-config proxies descend through the tree,
/// anything else goes through the value's attribute projector.
fn project(value: &Value, name: &str) -> ConfigResult<Value> {
    if let Some(proxy) = value.downcast::<ConfigProxy>() {
        return get_field(&proxy.inner, &proxy.node, name);
    }
    value.attr(name).ok_or_else(|| ConfigError::AttrLookup {
        owner: value.type_name().to_string(),
        attr: name.to_string(),
    })
}
