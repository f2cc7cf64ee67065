//! Spec identity allocation.
//!
//! Every [`Spec`](crate::Spec) owns exactly one `SpecId`, assigned at
//! construction from a process-wide counter. Two specs describe the same
//! logical slot if and only if they share a `SpecId`; ids are never reused
//! within a process lifetime. Perturbing a configuration field transplants
//! the field's original id onto the replacement spec, which is what keeps
//! forward references and singleton caches valid across overrides.

use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, globally unique, monotonically increasing spec identifier.
///
/// The join key between specs, deferred attribute references, and cached
/// instances. Ordering only needs uniqueness, not unpredictability.
pub type SpecId = u64;

static NEXT_SPEC_ID: AtomicU64 = AtomicU64::new(0);

/// Allocates the next spec id from the shared counter.
///
/// The single counter is shared across all spec variants so an id uniquely
/// names a slot regardless of which constructor produced it.
pub(crate) fn next_spec_id() -> SpecId {
    NEXT_SPEC_ID.fetch_add(1, Ordering::Relaxed)
}
