//! Global symbol registry.
//!
//! Symbols are interned by name, per domain: `symb("x")` called twice
//! returns the *same* node, so assumptions set through one handle are
//! visible through every alias. Scalar and tensor namespaces are
//! independent.
//!
//! Each symbol carries a registry key for O(1) identity comparison; the
//! structural hash uses the name so hashes survive registry resets.

use std::sync::{Arc, LazyLock, RwLock, RwLockWriteGuard};

use rustc_hash::FxHashMap;
use slotmap::{DefaultKey, Key, SlotMap};

use crate::core::assumptions;
use crate::core::error::CasError;
use crate::scalar::ScalarExpr;
use crate::tensor::TensorExpr;

/// Identity of an interned symbol: a registry key plus the shared name.
///
/// Clone-cheap (a key and an `Arc<str>`). Equality and hashing use the key
/// only; ordering is by name so printed sums come out alphabetically.
#[derive(Debug, Clone)]
pub struct SymbolId {
    key: DefaultKey,
    name: Arc<str>,
}

impl SymbolId {
    /// The symbol's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registry key as a raw u64 (for debugging output).
    pub fn id(&self) -> u64 {
        self.key.data().as_ffi()
    }
}

impl PartialEq for SymbolId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SymbolId {}

impl std::hash::Hash for SymbolId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for SymbolId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SymbolId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id().cmp(&other.id()))
    }
}

// ============================================================================
// Registry
// ============================================================================

struct Registry {
    /// Key allocator; the stored name is the reverse mapping.
    records: SlotMap<DefaultKey, Arc<str>>,
    scalars: FxHashMap<String, ScalarExpr>,
    tensors: FxHashMap<String, TensorExpr>,
}

impl Registry {
    fn new() -> Self {
        Registry {
            records: SlotMap::new(),
            scalars: FxHashMap::default(),
            tensors: FxHashMap::default(),
        }
    }
}

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

fn write_registry() -> RwLockWriteGuard<'static, Registry> {
    match REGISTRY.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Get or create the canonical scalar symbol node for `name`.
pub(crate) fn intern_scalar(name: &str) -> ScalarExpr {
    {
        let registry = match REGISTRY.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = registry.scalars.get(name) {
            return existing.clone();
        }
    }
    let mut registry = write_registry();
    // Double-check after taking the write lock.
    if let Some(existing) = registry.scalars.get(name) {
        return existing.clone();
    }
    let shared: Arc<str> = Arc::from(name);
    let key = registry.records.insert(shared.clone());
    let node = ScalarExpr::from_symbol(SymbolId { key, name: shared });
    registry.scalars.insert(name.to_owned(), node.clone());
    node
}

/// Get or create the canonical tensor symbol node for `name` with the
/// given dimension and rank.
///
/// # Errors
/// `ShapeMismatch` when `name` is already registered with a different
/// (dim, rank).
pub(crate) fn intern_tensor(
    name: &str,
    dim: usize,
    rank: usize,
) -> Result<TensorExpr, CasError> {
    {
        let registry = match REGISTRY.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = registry.tensors.get(name) {
            return check_shape(existing, name, dim, rank);
        }
    }
    let mut registry = write_registry();
    if let Some(existing) = registry.tensors.get(name) {
        return check_shape(existing, name, dim, rank);
    }
    let shared: Arc<str> = Arc::from(name);
    let key = registry.records.insert(shared.clone());
    let node = TensorExpr::from_symbol(SymbolId { key, name: shared }, dim, rank);
    registry.tensors.insert(name.to_owned(), node.clone());
    Ok(node)
}

fn check_shape(
    existing: &TensorExpr,
    name: &str,
    dim: usize,
    rank: usize,
) -> Result<TensorExpr, CasError> {
    if existing.dim() == dim && existing.rank() == rank {
        Ok(existing.clone())
    } else {
        Err(CasError::ShapeMismatch {
            op: "tensor symbol",
            detail: format!(
                "'{name}' already registered with dim {} rank {}, requested dim {dim} rank {rank}",
                existing.dim(),
                existing.rank()
            ),
        })
    }
}

/// Number of registered symbols across both domains.
pub fn symbol_count() -> usize {
    let registry = match REGISTRY.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    registry.scalars.len() + registry.tensors.len()
}

/// Drop every registered symbol. Existing handles stay valid; recreating
/// a name afterwards yields a fresh node with a clean assumption set.
pub fn clear_symbols() {
    let mut registry = write_registry();
    registry.scalars.clear();
    registry.tensors.clear();
    registry.records.clear();
    drop(registry);
    assumptions::bump_epoch();
}
