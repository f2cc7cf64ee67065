//! # specwire
//!
//! Declarative dependency injection: describe how values relate once, in a
//! schema, then resolve them lazily through a container.
//!
//! ## Features
//!
//! - **Deferred specs**: objects, inputs, prototypes, singletons, forwards,
//!   and collection helpers, none of which run anything at declaration time
//! - **Stable spec identity**: cloning a spec shares its slot id, and
//!   perturbing a config field transplants the id onto the replacement
//! - **Shared child configs**: nesting the same schema with the same local
//!   inputs yields one node, so singleton identity holds across parents
//! - **Perturb-then-freeze**: swap any declared field before freezing
//!   (ideal for tests), with the whole tree locked once a container claims it
//! - **Attribute futures**: depend on a field of a value that does not
//!   exist yet, resolved after its root materializes
//!
//! ## Quick Start
//!
//! ```rust
//! use specwire::{
//!     build_container, global_input_with_default, resolve, singleton, CallArgs,
//!     ConfigDef, GlobalInputs, Schema, Value,
//! };
//!
//! #[derive(Debug)]
//! struct Engine {
//!     db_address: String,
//! }
//!
//! struct EngineConfig;
//! impl ConfigDef for EngineConfig {
//!     fn declare(schema: &mut Schema) {
//!         let db_address = schema.field(
//!             "db_address",
//!             global_input_with_default("ava-db".to_string()),
//!         );
//!         schema.field(
//!             "engine",
//!             singleton(|args: &CallArgs| {
//!                 Ok(Value::new(Engine {
//!                     db_address: (*args.get::<String>(0)?).clone(),
//!                 }))
//!             })
//!             .named("Engine")
//!             .arg(&db_address),
//!         );
//!     }
//! }
//!
//! let config = resolve::<EngineConfig>(
//!     GlobalInputs::new().set("db_address", "prod-db".to_string()),
//! )?;
//! config.freeze();
//!
//! let container = build_container(config)?;
//! let engine = container.get("engine")?.downcast::<Engine>().unwrap();
//! assert_eq!(engine.db_address, "prod-db");
//! # Ok::<(), specwire::ConfigError>(())
//! ```
//!
//! ## Spec Kinds
//!
//! - [`object`]: pass a fully-realized value through verbatim
//! - [`global_input`] / [`local_input`]: caller-supplied placeholders
//!   (root resolution time vs. child declaration time)
//! - [`prototype`]: re-invoked on every request
//! - [`singleton`]: invoked at most once per container, cached by spec id
//! - [`forward`]: alias another spec's eventual value
//! - [`singleton_list`] / [`singleton_dict`]: cached collections
//!
//! ## Perturbation
//!
//! ```rust
//! use specwire::{forward, object, resolve, ConfigDef, GlobalInputs, Schema};
//!
//! struct FooConfig;
//! impl ConfigDef for FooConfig {
//!     fn declare(schema: &mut Schema) {
//!         let real = schema.field("real", object("real".to_string()));
//!         schema.field("mock", object("mock".to_string()));
//!         schema.field("active", forward(&real));
//!     }
//! }
//!
//! let config = resolve::<FooConfig>(GlobalInputs::new())?;
//! // Redirect everything depending on "active" at the mock instead.
//! let mock = config.spec("mock")?;
//! config.set("active", forward(&mock))?;
//! config.freeze();
//! # Ok::<(), specwire::ConfigError>(())
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod schema;
pub mod spec;
pub mod value;

mod id;

pub use config::{resolve, Config};
pub use container::{build_container, ConfigProxy, Container};
pub use error::{ConfigError, ConfigResult};
pub use id::SpecId;
pub use schema::{ConfigDef, Kwargs, Schema};
pub use spec::{
    forward, global_input, global_input_with_default, local_input, local_input_with_default,
    object, object_value, prototype, singleton, singleton_dict, singleton_dict_with_base,
    singleton_list, Arg, AttrRef, Call, CallArgs, Spec,
};
pub use value::{AnyArc, AttrAccess, GlobalInputs, InputValue, Locals, Value};

#[cfg(test)]
mod tests {
    use super::*;

    struct SmokeConfig;
    impl ConfigDef for SmokeConfig {
        fn declare(schema: &mut Schema) {
            let x = schema.field("x", object(1i64));
            schema.field(
                "y",
                prototype(|args: &CallArgs| Ok(Value::new(*args.get::<i64>(0)? + 1)))
                    .named("incr")
                    .arg(&x),
            );
        }
    }

    #[test]
    fn declare_resolve_and_get() {
        let config = resolve::<SmokeConfig>(GlobalInputs::new()).unwrap();
        assert_eq!(config.keys(), vec!["x", "y"]);
        let container = build_container(config).unwrap();
        assert_eq!(*container.get("y").unwrap().downcast::<i64>().unwrap(), 2);
    }
}
