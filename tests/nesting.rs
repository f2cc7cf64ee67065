use specwire::{
    build_container, forward, local_input, local_input_with_default, object, resolve, singleton,
    CallArgs, ConfigDef, ConfigError, GlobalInputs, Locals, Schema, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};

static TOKENS_BUILT: AtomicUsize = AtomicUsize::new(0);

struct BaseConfig;

impl ConfigDef for BaseConfig {
    fn declare(schema: &mut Schema) {
        schema.field(
            "token",
            singleton(|_: &CallArgs| {
                TOKENS_BUILT.fetch_add(1, Ordering::SeqCst);
                Ok(Value::new("token".to_string()))
            })
            .named("Token"),
        );
    }
}

struct ParentAConfig;

impl ConfigDef for ParentAConfig {
    fn declare(schema: &mut Schema) {
        let base = schema.child::<BaseConfig>("base", Locals::new());
        // Cross-config alias: field of a child's eventual value.
        schema.field("token_alias", forward(base.attr("token")));
    }
}

struct ParentBConfig;

impl ConfigDef for ParentBConfig {
    fn declare(schema: &mut Schema) {
        schema.child::<BaseConfig>("base", Locals::new());
    }
}

struct GrandParentConfig;

impl ConfigDef for GrandParentConfig {
    fn declare(schema: &mut Schema) {
        schema.child::<ParentAConfig>("parent_a", Locals::new());
        schema.child::<ParentBConfig>("parent_b", Locals::new());
    }
}

struct ScaledConfig;

impl ConfigDef for ScaledConfig {
    fn declare(schema: &mut Schema) {
        let factor = schema.field("factor", local_input::<i64>());
        schema.field("offset", local_input_with_default(100i64));
        schema.field(
            "scaled",
            singleton(|args: &CallArgs| Ok(Value::new(*args.get::<i64>(0)? * 10)))
                .named("scale")
                .arg(&factor),
        );
    }
}

struct ScalesConfig;

impl ConfigDef for ScalesConfig {
    fn declare(schema: &mut Schema) {
        schema.child::<ScaledConfig>("small", Locals::new().set("factor", 2i64));
        schema.child::<ScaledConfig>("big", Locals::new().set("factor", 3i64));
        schema.child::<ScaledConfig>("small_again", Locals::new().set("factor", 2i64));
    }
}

#[test]
fn test_shared_child_shares_singletons() {
    let config = resolve::<GrandParentConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    let a = container.get("parent_a.base.token").unwrap();
    let b = container.get("parent_b.base.token").unwrap();
    assert!(a.ptr_eq(&b)); // One node, one cache entry
}

#[test]
fn test_cross_config_forward() {
    let config = resolve::<GrandParentConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    let alias = container.get("parent_a.token_alias").unwrap();
    let direct = container.get("parent_b.base.token").unwrap();
    assert!(alias.ptr_eq(&direct));
}

#[test]
fn test_child_path_yields_proxy() {
    let config = resolve::<GrandParentConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    let proxy = container.get("parent_a.base").unwrap();
    let proxy = proxy.downcast::<specwire::ConfigProxy>().unwrap();
    assert_eq!(proxy.keys(), vec!["token"]);
    assert_eq!(
        *proxy.get("token").unwrap().downcast::<String>().unwrap(),
        "token"
    );
}

#[test]
fn test_dotted_get_matches_manual_chain() {
    let config = resolve::<GrandParentConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    let dotted = container.get("parent_a.base.token").unwrap();

    let parent = container.get("parent_a").unwrap();
    let parent = parent.downcast::<specwire::ConfigProxy>().unwrap();
    let base = parent.get("base").unwrap();
    let base = base.downcast::<specwire::ConfigProxy>().unwrap();
    let manual = base.get("token").unwrap();

    assert!(dotted.ptr_eq(&manual));
}

#[test]
fn test_locals_distinguish_child_nodes() {
    let config = resolve::<ScalesConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    assert_eq!(
        *container.get("small.scaled").unwrap().downcast::<i64>().unwrap(),
        20
    );
    assert_eq!(
        *container.get("big.scaled").unwrap().downcast::<i64>().unwrap(),
        30
    );

    // Same schema, same locals: the exact same node and cache entry.
    let small = container.get("small.scaled").unwrap();
    let again = container.get("small_again.scaled").unwrap();
    assert!(small.ptr_eq(&again));

    // Different locals get distinct nodes.
    let big = container.get("big.scaled").unwrap();
    assert!(!small.ptr_eq(&big));
}

#[test]
fn test_local_default_applies() {
    let config = resolve::<ScalesConfig>(GlobalInputs::new()).unwrap();
    let container = build_container(config).unwrap();

    assert_eq!(
        *container.get("small.offset").unwrap().downcast::<i64>().unwrap(),
        100
    );
}

#[test]
fn test_config_child_accessor() {
    let config = resolve::<GrandParentConfig>(GlobalInputs::new()).unwrap();
    let base_a = config.child("parent_a.base").unwrap();
    let base_b = config.child("parent_b.base").unwrap();
    assert_eq!(base_a.keys(), base_b.keys());

    match config.child("parent_a.token_alias") {
        Err(ConfigError::Resolution(_)) => {}
        other => panic!("expected resolution error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_perturb_shared_child_visible_to_all_parents() {
    let config = resolve::<GrandParentConfig>(GlobalInputs::new()).unwrap();
    config
        .set("parent_a.base.token", object("perturbed".to_string()))
        .unwrap();

    let container = build_container(config).unwrap();
    assert_eq!(
        *container
            .get("parent_b.base.token")
            .unwrap()
            .downcast::<String>()
            .unwrap(),
        "perturbed"
    );
}
