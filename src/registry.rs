//! Process-wide conversion registries
//!
//! Two registries back the planner: the conversion path catalog keyed by
//! `(input kind, output kind)` and the chromatic adaptation method list.
//! Initial discovery is one-shot and safe under concurrent first access
//! (`OnceLock` single-winner). `add`/`remove` may be called at any time
//! but take effect only for converters constructed afterward: planning
//! works on a snapshot, and assembled pipelines own their numeric assets.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use tracing::debug;

use crate::color::{ColorKind, WhitePoint};
use crate::math::adaptation::{adaptation_matrix, CatSpec};
use crate::math::Matrix3x3;
use crate::primitives::{builtin_paths, ConversionPath};

struct Inner {
    paths: Vec<ConversionPath>,
    cats: Vec<CatSpec>,
}

static REGISTRY: OnceLock<RwLock<Inner>> = OnceLock::new();

type CatKey = (&'static str, [u64; 3], [u64; 3]);
static CAT_CACHE: OnceLock<RwLock<HashMap<CatKey, Matrix3x3>>> = OnceLock::new();

fn registry() -> &'static RwLock<Inner> {
    REGISTRY.get_or_init(|| {
        // Drop duplicate (from, to) keys, keeping the first registration
        let mut paths: Vec<ConversionPath> = Vec::new();
        for path in builtin_paths() {
            if !paths.iter().any(|p| p.from == path.from && p.to == path.to) {
                paths.push(path);
            }
        }

        let cats = vec![
            CatSpec::bradford(),
            CatSpec::von_kries(),
            CatSpec::xyz_scaling(),
            CatSpec::cat02(),
            CatSpec::sharp(),
        ];

        debug!(
            paths = paths.len(),
            adaptations = cats.len(),
            "initialized conversion registries"
        );
        RwLock::new(Inner { paths, cats })
    })
}

/// Force registry initialization (idempotent, thread-safe)
pub fn init() {
    let _ = registry();
}

/// A stable view of the registries taken at converter construction
#[derive(Clone)]
pub struct RegistrySnapshot {
    pub paths: Vec<ConversionPath>,
    pub cats: Vec<CatSpec>,
}

impl RegistrySnapshot {
    /// Look up an adaptation method by name
    pub fn cat_by_name(&self, name: &str) -> Option<&CatSpec> {
        self.cats.iter().find(|c| c.name == name)
    }

    /// Look up a direct path between two kinds
    pub fn path(&self, from: ColorKind, to: ColorKind) -> Option<&ConversionPath> {
        self.paths.iter().find(|p| p.from == from && p.to == to)
    }
}

/// Take a snapshot of both registries
pub fn snapshot() -> RegistrySnapshot {
    let inner = registry().read().unwrap_or_else(|e| e.into_inner());
    RegistrySnapshot {
        paths: inner.paths.clone(),
        cats: inner.cats.clone(),
    }
}

/// The registered (input kind, output kind) pairs, in catalog order
pub fn conversion_paths() -> Vec<(ColorKind, ColorKind)> {
    registry()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .paths
        .iter()
        .map(|p| (p.from, p.to))
        .collect()
}

/// The registered chromatic adaptation method names
pub fn chromatic_adaptations() -> Vec<&'static str> {
    registry()
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .cats
        .iter()
        .map(|c| c.name)
        .collect()
}

/// Register a conversion path
///
/// User paths are inserted ahead of the built-ins, so a registered
/// override takes precedence for its (from, to) pair in converters
/// constructed afterward.
pub fn add_conversion_path(path: ConversionPath) {
    let mut inner = registry().write().unwrap_or_else(|e| e.into_inner());
    inner.paths.insert(0, path);
}

/// Remove every path registered for a (from, to) pair
///
/// Returns true if anything was removed. Already-constructed converters
/// are unaffected.
pub fn remove_conversion_path(from: ColorKind, to: ColorKind) -> bool {
    let mut inner = registry().write().unwrap_or_else(|e| e.into_inner());
    let before = inner.paths.len();
    inner.paths.retain(|p| !(p.from == from && p.to == to));
    inner.paths.len() != before
}

/// Register a chromatic adaptation method, replacing any same-named one
pub fn add_chromatic_adaptation(spec: CatSpec) {
    let mut inner = registry().write().unwrap_or_else(|e| e.into_inner());
    inner.cats.retain(|c| c.name != spec.name);
    inner.cats.push(spec);
}

/// Remove a chromatic adaptation method by name
pub fn remove_chromatic_adaptation(name: &str) -> bool {
    let mut inner = registry().write().unwrap_or_else(|e| e.into_inner());
    let before = inner.cats.len();
    inner.cats.retain(|c| c.name != name);
    inner.cats.len() != before
}

/// The combined adaptation matrix for (method, W₁, W₂), cached
pub fn cat_matrix(spec: &CatSpec, from: &WhitePoint, to: &WhitePoint) -> Matrix3x3 {
    let cache = CAT_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    let key: CatKey = (
        spec.name,
        [
            from.xyz.x.to_bits(),
            from.xyz.y.to_bits(),
            from.xyz.z.to_bits(),
        ],
        [to.xyz.x.to_bits(), to.xyz.y.to_bits(), to.xyz.z.to_bits()],
    );

    if let Some(m) = cache.read().unwrap_or_else(|e| e.into_inner()).get(&key) {
        return *m;
    }

    let matrix = adaptation_matrix(spec, from, to);
    cache
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(key, matrix);
    matrix
}
