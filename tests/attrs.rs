use specwire::{
    build_container, prototype, resolve, singleton, AttrAccess, CallArgs, ConfigDef, ConfigError,
    GlobalInputs, Locals, Schema, Value,
};

struct Db {
    address: String,
    port: u16,
}

impl AttrAccess for Db {
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "address" => Some(Value::new(self.address.clone())),
            "port" => Some(Value::new(self.port)),
            _ => None,
        }
    }
}

struct Engine {
    db: Value,
}

impl AttrAccess for Engine {
    fn attr(&self, name: &str) -> Option<Value> {
        match name {
            "db" => Some(self.db.clone()),
            _ => None,
        }
    }
}

struct EngineConfig;

impl ConfigDef for EngineConfig {
    fn declare(schema: &mut Schema) {
        let db = schema.field(
            "db",
            singleton(|_: &CallArgs| {
                Ok(Value::with_attrs(Db {
                    address: "ava-db".to_string(),
                    port: 5432,
                }))
            })
            .named("Db"),
        );
        let engine = schema.field(
            "engine",
            singleton(|args: &CallArgs| Ok(Value::with_attrs(Engine { db: args.pos(0)?.clone() })))
                .named("Engine")
                .arg(&db),
        );
        // Depend on an attribute of a value that does not exist yet.
        schema.field(
            "banner",
            prototype(|args: &CallArgs| {
                Ok(Value::new(format!("db at {}", args.get::<String>(0)?)))
            })
            .named("banner")
            .arg(db.attr("address")),
        );
        schema.field(
            "deep_port",
            prototype(|args: &CallArgs| Ok(args.pos(0)?.clone()))
                .named("deep_port")
                .arg(engine.attr("db").attr("port")),
        );
        schema.field(
            "missing",
            prototype(|args: &CallArgs| Ok(args.pos(0)?.clone()))
                .named("missing")
                .arg(db.attr("hostname")),
        );
    }
}

#[test]
fn test_attr_future_resolves_after_root() {
    let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    assert_eq!(
        *container.get("banner").unwrap().downcast::<String>().unwrap(),
        "db at ava-db"
    );
}

#[test]
fn test_attr_future_tracks_perturbed_field() {
    let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
    config
        .set(
            "db",
            specwire::object_value(Value::with_attrs(Db {
                address: "replica-db".to_string(),
                port: 6000,
            })),
        )
        .unwrap();

    let container = build_container(config).unwrap();
    assert_eq!(
        *container.get("banner").unwrap().downcast::<String>().unwrap(),
        "db at replica-db"
    );
}

#[test]
fn test_attr_future_chains() {
    let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    assert_eq!(
        *container.get("deep_port").unwrap().downcast::<u16>().unwrap(),
        5432
    );
}

#[test]
fn test_missing_attr_names_owner() {
    let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    match container.get("missing") {
        Err(ConfigError::AttrLookup { owner, attr }) => {
            assert!(owner.contains("Db"), "got owner: {}", owner);
            assert_eq!(attr, "hostname");
        }
        other => panic!("expected attr-lookup error, got {:?}", other),
    }
}

#[test]
fn test_dotted_get_projects_attrs() {
    let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    assert_eq!(
        *container
            .get("engine.db.address")
            .unwrap()
            .downcast::<String>()
            .unwrap(),
        "ava-db"
    );
}

#[test]
fn test_config_spec_through_leaf_defers() {
    // A dotted config lookup that passes through a leaf yields a spec
    // usable anywhere a dependency is.
    let config = resolve::<EngineConfig>(GlobalInputs::new()).unwrap();
    let port_spec = config.spec("db.port").unwrap();
    config.set("deep_port", port_spec).unwrap();

    let container = build_container(config).unwrap();
    assert_eq!(
        *container.get("deep_port").unwrap().downcast::<u16>().unwrap(),
        5432
    );
}

#[test]
fn test_attr_path_through_child_config() {
    struct InnerConfig;
    impl ConfigDef for InnerConfig {
        fn declare(schema: &mut Schema) {
            schema.field(
                "db",
                singleton(|_: &CallArgs| {
                    Ok(Value::with_attrs(Db {
                        address: "inner-db".to_string(),
                        port: 6000,
                    }))
                })
                .named("Db"),
            );
        }
    }
    struct OuterConfig;
    impl ConfigDef for OuterConfig {
        fn declare(schema: &mut Schema) {
            let inner = schema.child::<InnerConfig>("inner", Locals::new());
            schema.field(
                "address",
                prototype(|args: &CallArgs| Ok(args.pos(0)?.clone()))
                    .named("address")
                    .arg(inner.attr("db").attr("address")),
            );
        }
    }

    let config = resolve::<OuterConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    assert_eq!(
        *container.get("address").unwrap().downcast::<String>().unwrap(),
        "inner-db"
    );
}
