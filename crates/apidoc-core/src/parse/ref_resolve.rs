use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ResolveError;

/// Resolves `$ref` pointers against the root of a decoded document.
///
/// Only local pointers (`#/...`) are supported. Lookups are pure: the resolver keeps
/// no state between calls, so one instance can be shared by the whole normalization
/// pass.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Follow one pointer. The target is returned as found, even if it is itself
    /// a `$ref` node.
    pub fn lookup(&self, ref_path: &str) -> Result<&'a Value, ResolveError> {
        resolve_ref(ref_path, self.root)
    }

    /// Dereference `node` until the result is no longer a `$ref` node.
    ///
    /// Non-reference nodes are returned unchanged. A chain that comes back to a
    /// pointer it already followed is reported as circular.
    pub fn resolve_value<'n>(&self, node: &'n Value) -> Result<&'n Value, ResolveError>
    where
        'a: 'n,
    {
        let mut current = node;
        let mut visited: HashSet<&'n str> = HashSet::new();
        while let Some(ref_path) = ref_of(current) {
            if !visited.insert(ref_path) {
                return Err(ResolveError::CircularRef(ref_path.to_string()));
            }
            current = self.lookup(ref_path)?;
        }
        Ok(current)
    }

    /// Fully dereference `ref_path`, returning the final non-reference node.
    pub fn resolve_pointer(&self, ref_path: &str) -> Result<&'a Value, ResolveError> {
        let target = self.lookup(ref_path)?;
        match ref_of(target) {
            Some(next) if next == ref_path => Err(ResolveError::CircularRef(ref_path.to_string())),
            Some(_) => self.resolve_value(target),
            None => Ok(target),
        }
    }

    /// Fully dereference `ref_path` and read the target as `T`.
    pub fn resolve<T: DeserializeOwned>(&self, ref_path: &str) -> Result<T, ResolveError> {
        let target = self.resolve_pointer(ref_path)?;
        T::deserialize(target).map_err(|source| ResolveError::InvalidTarget {
            ref_path: ref_path.to_string(),
            source,
        })
    }
}

/// The pointer string of a `{ "$ref": "..." }` node.
pub fn ref_of(node: &Value) -> Option<&str> {
    node.as_object()?.get("$ref")?.as_str()
}

/// Walk a local JSON pointer (`#/a/b/0`) from `root`, one segment at a time.
///
/// Fails on the first missing segment; there is no partial resolution.
pub fn resolve_ref<'a>(ref_path: &str, root: &'a Value) -> Result<&'a Value, ResolveError> {
    let pointer = ref_path
        .strip_prefix('#')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if pointer.is_empty() {
        return Ok(root);
    }
    let pointer = pointer
        .strip_prefix('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;

    let mut current = root;
    for raw in pointer.split('/') {
        let segment = unescape_segment(raw);
        current = match current {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))?;
    }
    Ok(current)
}

/// Undo JSON pointer escaping (`~1` is `/`, `~0` is `~`) and URL percent-encoding.
fn unescape_segment(segment: &str) -> String {
    let decoded = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
    decoded.replace("~1", "/").replace("~0", "~")
}

/// Last segment of a pointer, e.g. `User` for `#/components/schemas/User`.
pub fn ref_name(ref_path: &str) -> &str {
    ref_path.rsplit('/').next().unwrap_or(ref_path)
}
