use specwire::{ConfigError, ConfigResult};

#[test]
fn test_display_formats() {
    let cases: Vec<(ConfigError, &str)> = vec![
        (
            ConfigError::InvalidSchema("duplicate field \"x\"".to_string()),
            "Invalid schema: duplicate field \"x\"",
        ),
        (
            ConfigError::Resolution("no config field registered for spec id 7".to_string()),
            "Resolution error: no config field registered for spec id 7",
        ),
        (
            ConfigError::Frozen("key=\"x\"".to_string()),
            "Cannot perturb frozen config: key=\"x\"",
        ),
        (
            ConfigError::Input("Global input not set: \"name\"".to_string()),
            "Input error: Global input not set: \"name\"",
        ),
        (
            ConfigError::NewKey("key=\"y\"".to_string()),
            "Cannot add new keys to a loaded config: key=\"y\"",
        ),
        (
            ConfigError::SetChildConfig("key=\"child\"".to_string()),
            "Cannot set child config: key=\"child\"",
        ),
        (
            ConfigError::PerturbSpec("\"x\" is a spec".to_string()),
            "Cannot set on a spec: \"x\" is a spec",
        ),
        (
            ConfigError::Construction {
                target: "Engine".to_string(),
                message: "bad port".to_string(),
            },
            "Construction failed for Engine: bad port",
        ),
        (
            ConfigError::AttrLookup {
                owner: "Engine".to_string(),
                attr: "hostname".to_string(),
            },
            "Engine: no attribute \"hostname\"",
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn test_error_is_std_error() {
    fn assert_error<E: std::error::Error>(_: &E) {}
    let err = ConfigError::Resolution("x".to_string());
    assert_error(&err);
}

#[test]
fn test_result_alias_propagates() {
    fn inner() -> ConfigResult<i64> {
        Err(ConfigError::Input("missing".to_string()))
    }
    fn outer() -> ConfigResult<i64> {
        let v = inner()?;
        Ok(v + 1)
    }

    assert!(matches!(outer(), Err(ConfigError::Input(_))));
}

#[test]
fn test_errors_clone_for_reporting() {
    let err = ConfigError::Construction {
        target: "Engine".to_string(),
        message: "bad port".to_string(),
    };
    let copy = err.clone();
    assert_eq!(err.to_string(), copy.to_string());
}
