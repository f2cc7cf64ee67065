//! Error types for schema loading, perturbation, and container resolution.

use std::fmt;

/// Configuration-graph errors
///
/// Represents the error conditions that can occur while loading a schema
/// into a configuration node, perturbing it, or materializing values
/// through a [`Container`](crate::Container).
///
/// All failures are raised synchronously at the point of detection and
/// propagate to the caller; the library performs no retries. Failures
/// during load/resolve abort the entire resolution, while failures during
/// a container `get` abort only that call — the container and its caches
/// stay valid for unrelated keys.
///
/// # Examples
///
/// ```rust
/// use specwire::{ConfigDef, ConfigError, GlobalInputs, Schema, global_input, resolve};
///
/// struct NeedsName;
/// impl ConfigDef for NeedsName {
///     fn declare(schema: &mut Schema) {
///         schema.field("name", global_input::<String>());
///     }
/// }
///
/// match resolve::<NeedsName>(GlobalInputs::new()) {
///     Err(ConfigError::Input(msg)) => assert!(msg.contains("name")),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Malformed schema declaration (duplicate field names, empty names,
    /// a reference to a field that does not exist)
    InvalidSchema(String),
    /// Unrecognized spec kind or dangling spec-id reference met during
    /// resolution; a schema-authoring defect
    Resolution(String),
    /// Attempted mutation of a node after it was handed to a container
    Frozen(String),
    /// Missing, extra, colliding, or type-mismatched global/local input
    Input(String),
    /// Attempted to add a field not present in the declared schema
    NewKey(String),
    /// Attempted to reassign a child-config slot; children are structurally
    /// fixed and only their leaf fields may be perturbed
    SetChildConfig(String),
    /// Attempted to mutate a spec's own fields outside the config
    /// field-assignment protocol (e.g. a dotted set path descending
    /// through a leaf spec)
    PerturbSpec(String),
    /// A callable target failed; carries the target identity for diagnosis
    Construction {
        /// Diagnostic name of the failing callable
        target: String,
        /// The underlying failure
        message: String,
    },
    /// An attribute in a forward/alias chain does not exist on the
    /// intermediate resolved object
    AttrLookup {
        /// Schema or value that owns the failed lookup
        owner: String,
        /// The missing attribute name
        attr: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSchema(msg) => write!(f, "Invalid schema: {}", msg),
            ConfigError::Resolution(msg) => write!(f, "Resolution error: {}", msg),
            ConfigError::Frozen(msg) => write!(f, "Cannot perturb frozen config: {}", msg),
            ConfigError::Input(msg) => write!(f, "Input error: {}", msg),
            ConfigError::NewKey(msg) => {
                write!(f, "Cannot add new keys to a loaded config: {}", msg)
            }
            ConfigError::SetChildConfig(msg) => write!(f, "Cannot set child config: {}", msg),
            ConfigError::PerturbSpec(msg) => write!(f, "Cannot set on a spec: {}", msg),
            ConfigError::Construction { target, message } => {
                write!(f, "Construction failed for {}: {}", target, message)
            }
            ConfigError::AttrLookup { owner, attr } => {
                write!(f, "{}: no attribute {:?}", owner, attr)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type for configuration operations
///
/// A convenience alias for `Result<T, ConfigError>` used throughout
/// specwire to reduce boilerplate in function signatures.
pub type ConfigResult<T> = Result<T, ConfigError>;
