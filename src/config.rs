//! Configuration nodes: loading, perturbation, and freezing.
//!
//! [`resolve`] walks a declared schema into a runtime tree of
//! [`Config`] nodes. Each node owns its leaf specs and its child nodes;
//! child construction goes through a locator cache so that two parents
//! embedding the same child schema with the same local inputs share one
//! node instance — the property that makes singleton identity hold across
//! multiple views of the same subtree.
//!
//! Lifecycle per node: `unloaded → loaded → frozen` (terminal). Between
//! load and freeze, existing leaf fields may be reassigned ("perturbed");
//! the replacement spec inherits the field's original spec id so earlier
//! captured references and caches stay coherent. Handing the tree to a
//! container freezes it.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::id::SpecId;
use crate::schema::{ConfigDef, FieldDecl, Schema};
use crate::spec::{ChildSpec, Expected, InputScope, InputSpec, Spec, SpecKind};
use crate::value::{GlobalInputs, InputValue, Locals, Value};

/// A leaf-or-child lookup result within one node.
pub(crate) enum Field {
    Spec(Spec),
    Child(Config),
}

pub(crate) struct ConfigNode {
    schema_name: &'static str,
    specs: IndexMap<String, Spec>,
    children: IndexMap<String, Config>,
    /// Inverse index: spec id back to the field name within this node.
    keys: HashMap<SpecId, String>,
    /// This node's own global-input declarations, keyed by name to the
    /// declaring schema's identity for collision checks.
    global_inputs: HashMap<String, TypeId>,
    loaded: bool,
    frozen: bool,
    container_built: bool,
}

/// A loaded configuration node.
///
/// Cloning the handle shares the node; the locator relies on this to hand
/// the same child node to every parent that declares it. All mutation goes
/// through [`Config::set`] until the node is frozen.
///
/// # Examples
///
/// ```rust
/// use specwire::{forward, object, resolve, ConfigDef, GlobalInputs, Schema};
///
/// struct FooConfig;
/// impl ConfigDef for FooConfig {
///     fn declare(schema: &mut Schema) {
///         let x0 = schema.field("x0", object(1i64));
///         schema.field("x1", object(2i64));
///         schema.field("x", forward(&x0));
///     }
/// }
///
/// let config = resolve::<FooConfig>(GlobalInputs::new()).unwrap();
/// config.set("x1", object(3i64)).unwrap();
/// config.freeze();
/// assert!(config.set("x1", object(4i64)).is_err());
/// ```
#[derive(Clone)]
pub struct Config {
    inner: Arc<RwLock<ConfigNode>>,
}

impl Config {
    /// Display name of the schema this node was loaded from.
    pub fn schema_name(&self) -> &'static str {
        self.inner.read().unwrap().schema_name
    }

    /// Sorted listing of this node's field names (leaves and children).
    pub fn keys(&self) -> Vec<String> {
        let node = self.inner.read().unwrap();
        let mut keys: Vec<String> = node
            .specs
            .keys()
            .chain(node.children.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// True once the node has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.inner.read().unwrap().frozen
    }

    /// Looks up the spec at a dotted path.
    ///
    /// Intermediate components descend through child configs; a path that
    /// continues past a leaf field yields a deferred attribute-reference
    /// spec rooted at that leaf (the pre-materialization reading of
    /// "field `x` of whatever `foo` produces").
    pub fn spec(&self, path: &str) -> ConfigResult<Spec> {
        let parts: Vec<&str> = path.split('.').collect();
        let mut node = self.clone();
        for (i, part) in parts.iter().enumerate() {
            let last = i + 1 == parts.len();
            match node.lookup(part) {
                Some(Field::Child(child)) => {
                    if last {
                        return Err(ConfigError::Resolution(format!(
                            "{:?} is a child config, not a leaf field",
                            part
                        )));
                    }
                    node = child;
                }
                Some(Field::Spec(spec)) => {
                    if last {
                        return Ok(spec);
                    }
                    let mut attr = spec.attr(parts[i + 1]);
                    for seg in &parts[i + 2..] {
                        attr = attr.attr(seg);
                    }
                    return Ok(Spec::from(attr));
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

    /// Returns the child config node at a dotted path of child names.
    pub fn child(&self, path: &str) -> ConfigResult<Config> {
        let mut node = self.clone();
        for part in path.split('.') {
            match node.lookup(part) {
                Some(Field::Child(child)) => node = child,
                Some(Field::Spec(_)) => {
                    return Err(ConfigError::Resolution(format!(
                        "{:?} is a leaf field, not a child config",
                        part
                    )))
                }
                None => {
                    return Err(ConfigError::AttrLookup {
                        owner: node.schema_name().to_string(),
                        attr: part.to_string(),
                    })
                }
            }
        }
        Ok(node)
    }

    /// Perturbs the leaf field at a dotted path.
    ///
    /// Anything convertible into a [`Spec`] is accepted; plain values wrap
    /// into object specs. The replacement inherits the field's original
    /// spec id, so references captured before the perturbation resolve to
    /// the new value afterwards.
    ///
    /// Fails with a frozen error after freezing, a new-key error for
    /// undeclared names, a set-child error for child-config names, and a
    /// perturb-spec error when the path tries to descend through a leaf.
    pub fn set(&self, path: &str, value: impl Into<Spec>) -> ConfigResult<()> {
        let parts: Vec<&str> = path.split('.').collect();
        let mut node = self.clone();
        for part in &parts[..parts.len().saturating_sub(1)] {
            match node.lookup(part) {
                Some(Field::Child(child)) => node = child,
                Some(Field::Spec(_)) => {
                    return Err(ConfigError::PerturbSpec(format!(
                        "{:?} is a spec, not a child config; if you'd like to perturb a \
                         value used by a spec, promote it to be a config field and \
                         perturb the config instead",
                        part
                    )))
                }
                None => {
                    return Err(ConfigError::AttrLookup {
                        owner: node.schema_name().to_string(),
                        attr: part.to_string(),
                    })
                }
            }
        }
        let name = parts.last().copied().unwrap_or_default();
        node.set_field(name, value.into())
    }

    /// Freezes this node and every descendant, preventing any further
    /// perturbation. Idempotent.
    pub fn freeze(&self) {
        let children: Vec<Config> = {
            let mut node = self.inner.write().unwrap();
            if node.frozen {
                return;
            }
            node.frozen = true;
            debug!(schema = node.schema_name, "config frozen");
            node.children.values().cloned().collect()
        };
        for child in children {
            child.freeze();
        }
    }

    fn set_field(&self, name: &str, spec: Spec) -> ConfigResult<()> {
        let mut node = self.inner.write().unwrap();
        if node.frozen {
            return Err(ConfigError::Frozen(format!("key={:?}", name)));
        }
        if !node.specs.contains_key(name) && node.loaded {
            if node.children.contains_key(name) {
                return Err(ConfigError::SetChildConfig(format!("key={:?}", name)));
            }
            return Err(ConfigError::NewKey(format!("key={:?}", name)));
        }
        if matches!(spec.kind(), SpecKind::Child(_)) {
            return Err(ConfigError::SetChildConfig(format!(
                "key={:?}: child configs are structurally fixed",
                name
            )));
        }
        let old_id = match node.specs.get(name) {
            Some(old) => old.id(),
            None => {
                return Err(ConfigError::NewKey(format!("key={:?}", name)));
            }
        };
        trace!(key = name, spec_id = old_id, "field perturbed");
        node.specs.insert(name.to_string(), spec.with_id(old_id));
        Ok(())
    }

    /// Claims the node for a container: freezes the whole subtree and
    /// rejects a second claim.
    pub(crate) fn mark_container_built(&self) -> ConfigResult<()> {
        {
            let mut node = self.inner.write().unwrap();
            if node.container_built {
                return Err(ConfigError::Frozen(
                    "config already handed to a container".to_string(),
                ));
            }
            node.container_built = true;
        }
        self.freeze();
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Field> {
        let node = self.inner.read().unwrap();
        if let Some(child) = node.children.get(name) {
            return Some(Field::Child(child.clone()));
        }
        node.specs.get(name).cloned().map(Field::Spec)
    }

    /// Finds which node (this one or a descendant) owns the given spec id,
    /// returning the node and the field name. Depth-first in declaration
    /// order, self before children.
    pub(crate) fn find_owner(&self, id: SpecId) -> Option<(Config, String)> {
        let children: Vec<Config> = {
            let node = self.inner.read().unwrap();
            if let Some(name) = node.keys.get(&id) {
                return Some((self.clone(), name.clone()));
            }
            node.children.values().cloned().collect()
        };
        children.into_iter().find_map(|child| child.find_owner(id))
    }

    pub(crate) fn contains_name(&self, name: &str) -> bool {
        let node = self.inner.read().unwrap();
        node.specs.contains_key(name) || node.children.contains_key(name)
    }

    /// Recursively gathers every global-input name in this subtree.
    ///
    /// Two distinct schemas binding the same name is a collision (two
    /// unrelated inputs accidentally sharing a name); the same schema's
    /// declaration reappearing through multiple parent paths, including
    /// loads under different local inputs, is the legitimate shared case
    /// and is deduplicated.
    fn collect_global_input_keys(
        &self,
        acc: &mut HashMap<String, TypeId>,
    ) -> ConfigResult<()> {
        let children: Vec<Config> = {
            let node = self.inner.read().unwrap();
            for (name, origin) in &node.global_inputs {
                if let Some(existing) = acc.get(name) {
                    if existing != origin {
                        return Err(ConfigError::Input(format!(
                            "found global input collision: {:?}",
                            name
                        )));
                    }
                }
                acc.insert(name.clone(), *origin);
            }
            node.children.values().cloned().collect()
        };
        for child in children {
            child.collect_global_input_keys(acc)?;
        }
        Ok(())
    }
}

/// Construction-time cache of child nodes.
///
/// Keyed by (schema identity, local-input kwargs): equal declarations
/// reuse the already-built node, which is what makes singletons inside a
/// shared child visible identically to every embedding parent.
pub(crate) struct Locator {
    globals: HashMap<String, Value>,
    cache: HashMap<ChildKey, Config>,
}

#[derive(PartialEq, Eq, Hash)]
struct ChildKey {
    schema: TypeId,
    locals: Vec<(String, InputValue)>,
}

impl Locator {
    fn new(globals: HashMap<String, Value>) -> Self {
        Self {
            globals,
            cache: HashMap::new(),
        }
    }

    fn get(&mut self, child: &ChildSpec) -> ConfigResult<Config> {
        let key = ChildKey {
            schema: child.schema,
            locals: child.locals.sorted(),
        };
        if let Some(config) = self.cache.get(&key) {
            trace!(schema = child.schema_name, "child config reused");
            return Ok(config.clone());
        }
        let config = load_node(child, self)?;
        self.cache.insert(key, config.clone());
        Ok(config)
    }
}

/// Walks a schema's field table into a loaded node.
fn load_node(child: &ChildSpec, locator: &mut Locator) -> ConfigResult<Config> {
    let schema = Schema::of(child.declare);
    let mut node = ConfigNode {
        schema_name: child.schema_name,
        specs: IndexMap::new(),
        children: IndexMap::new(),
        keys: HashMap::new(),
        global_inputs: HashMap::new(),
        loaded: false,
        frozen: false,
        container_built: false,
    };

    for (name, decl) in schema.into_fields() {
        let spec = match decl {
            // Partial-kwargs helpers are not resolvable fields.
            FieldDecl::Helper(_) => continue,
            FieldDecl::Spec(spec) => spec,
        };
        if name.is_empty() {
            return Err(ConfigError::InvalidSchema(format!(
                "empty field name in {}",
                child.schema_name
            )));
        }
        if node.specs.contains_key(&name) || node.children.contains_key(&name) {
            return Err(ConfigError::InvalidSchema(format!(
                "duplicate field {:?} in {}",
                name, child.schema_name
            )));
        }

        node.keys.insert(spec.id(), name.clone());

        let input = match spec.kind() {
            SpecKind::Input(input) => Some(input.clone()),
            _ => None,
        };
        let spec = match input {
            Some(input) => {
                let id = spec.id();
                match input.scope {
                    InputScope::Global => {
                        node.global_inputs.insert(name.clone(), child.schema);
                        process_input(&name, id, &input, locator.globals.get(&name))?
                    }
                    InputScope::Local => {
                        let supplied = child.locals.get(&name).map(local_value);
                        process_input(&name, id, &input, supplied.as_ref())?
                    }
                }
            }
            None => spec,
        };

        let child_decl = match spec.kind() {
            SpecKind::Child(child_spec) => Some(child_spec.clone()),
            _ => None,
        };
        match child_decl {
            Some(child_spec) => {
                let config = locator.get(&child_spec)?;
                node.children.insert(name, config);
            }
            None => {
                node.specs.insert(name, spec);
            }
        }
    }

    node.loaded = true;
    debug!(
        schema = node.schema_name,
        fields = node.specs.len(),
        children = node.children.len(),
        "config node loaded"
    );
    Ok(Config {
        inner: Arc::new(RwLock::new(node)),
    })
}

fn local_value(input: &InputValue) -> Value {
    input.to_value()
}

/// Converts an input spec into an object spec holding the resolved value,
/// transplanting the original spec id so existing references still
/// resolve correctly.
fn process_input(
    name: &str,
    id: SpecId,
    input: &InputSpec,
    supplied: Option<&Value>,
) -> ConfigResult<Spec> {
    let tag = input.scope.tag();
    let value = match supplied {
        Some(value) => value.clone(),
        None => match &input.default {
            Some(default) => default.clone(),
            None => {
                return Err(ConfigError::Input(format!(
                    "{} input not set: {:?}",
                    tag, name
                )))
            }
        },
    };
    check_type(&value, input.expected.as_ref(), tag)?;
    Ok(Spec::from(value).with_id(id))
}

fn check_type(value: &Value, expected: Option<&Expected>, tag: &str) -> ConfigResult<()> {
    if let Some(expected) = expected {
        if value.type_id() != expected.id {
            return Err(ConfigError::Input(format!(
                "{} input mismatch types: {} is not {}",
                tag,
                value.type_name(),
                expected.name
            )));
        }
    }
    Ok(())
}

/// Loads schema `C` into a configuration tree.
///
/// The one sanctioned way to turn a declared schema into a usable node.
/// Global inputs propagate to every descendant schema declaring a field
/// of the same name; missing required inputs, type mismatches, name
/// collisions across unrelated declarations, and extra inputs nothing
/// consumes all fail with an input error.
///
/// # Examples
///
/// ```rust
/// use specwire::{global_input_with_default, resolve, ConfigDef, GlobalInputs, Schema};
///
/// struct EngineConfig;
/// impl ConfigDef for EngineConfig {
///     fn declare(schema: &mut Schema) {
///         schema.field("db_address", global_input_with_default("ava-db".to_string()));
///     }
/// }
///
/// let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
/// assert_eq!(config.keys(), vec!["db_address"]);
/// ```
pub fn resolve<C: ConfigDef>(inputs: GlobalInputs) -> ConfigResult<Config> {
    let mut locator = Locator::new(inputs.into_map());
    let root = ChildSpec {
        schema: TypeId::of::<C>(),
        schema_name: std::any::type_name::<C>(),
        declare: C::declare,
        locals: Locals::new(),
    };
    let config = locator.get(&root)?;

    let mut consumed = HashMap::new();
    config.collect_global_input_keys(&mut consumed)?;
    let mut extra: Vec<&String> = locator
        .globals
        .keys()
        .filter(|name| !consumed.contains_key(*name))
        .collect();
    extra.sort();
    if !extra.is_empty() {
        return Err(ConfigError::Input(format!(
            "provided extra global inputs not specified in configs: {:?}",
            extra
        )));
    }

    Ok(config)
}
