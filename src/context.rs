//! Immutable per-request context.
//!
//! A [`Context`] is a linked chain of key/value nodes. Adding a value never
//! touches the existing chain — it allocates one new node that points at its
//! parent and returns a handle to it:
//!
//! ```text
//! root ─► UrlParams = [id=42] ─► AuthenticatedUsername = "alice"
//!  ▲               ▲                         ▲
//!  │               │                         └── ctx seen by the handler
//!  │               └── ctx seen by the auth middleware
//!  └── Context::new()
//! ```
//!
//! Lookups walk from the newest node towards the root and stop at the first
//! node carrying the key, so a child can shadow its parent without the parent
//! ever observing the change. Nodes are reference counted and never mutated
//! after creation, which is what makes a `Context` safe to read from any
//! number of tasks without locks.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifies a value stored in a [`Context`].
///
/// The built-in variants are the keys this crate itself reads and writes.
/// Applications that want their own entries use [`Key::Named`] with a
/// `'static` label, so every key in the process is a fixed, immutable token.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    /// Route parameters placed by the router ([`Params`]).
    UrlParams,
    /// Identity attached by the auth middleware (`String`).
    AuthenticatedUsername,
    /// Application-defined entry.
    Named(&'static str),
}

/// A single route parameter, e.g. `id = "42"` for `/users/{id}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Route parameters in the order they appear in the matched path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the value of the first parameter called `name`.
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|p| p.key == name).map(|p| p.value.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param::new(key, value));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Self(params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| Param::new(k, v)).collect())
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

struct Node {
    key: Key,
    value: Arc<dyn Any + Send + Sync>,
    parent: Context,
}

/// Request-scoped values, passed by value down the handler chain.
///
/// Cloning is one atomic increment; the chain itself is shared.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// An empty root context.
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Returns a child context in which `key` maps to `value`.
    ///
    /// `self` is left untouched; every other key still resolves through it.
    #[must_use]
    pub fn with_value<T>(&self, key: Key, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Node {
                key,
                value: Arc::new(value),
                parent: self.clone(),
            })),
        }
    }

    /// Looks up the nearest value stored under `key`.
    ///
    /// Returns `None` when the key is absent or when the nearest value is not
    /// a `T`. A mistyped entry does not fall through to older entries.
    pub fn value<T: Any>(&self, key: Key) -> Option<&T> {
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            if node.key == key {
                return node.value.downcast_ref::<T>();
            }
            cursor = node.parent.head.as_deref();
        }
        None
    }

    /// Returns a child context carrying the router's matched parameters.
    #[must_use]
    pub fn set_url_params(&self, params: Params) -> Self {
        self.with_value(Key::UrlParams, params)
    }

    /// The route parameters placed by the router, if any.
    pub fn url_params(&self) -> Option<&Params> {
        self.value::<Params>(Key::UrlParams)
    }

    /// Number of values reachable from this context, shadowed ones included.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            depth += 1;
            cursor = node.parent.head.as_deref();
        }
        depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            keys.push(node.key);
            cursor = node.parent.head.as_deref();
        }
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        [("id", "42"), ("tab", "posts"), ("id", "shadowed")].into_iter().collect()
    }

    #[test]
    fn by_name_returns_first_match() {
        let p = params();
        assert_eq!(p.by_name("id"), Some("42"));
        assert_eq!(p.by_name("tab"), Some("posts"));
        assert_eq!(p.by_name("missing"), None);
    }

    #[test]
    fn empty_context_has_nothing() {
        let ctx = Context::new();
        assert!(ctx.url_params().is_none());
        assert!(ctx.value::<String>(Key::AuthenticatedUsername).is_none());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn child_does_not_affect_parent() {
        let parent = Context::new().set_url_params(params());
        let child = parent.with_value(Key::AuthenticatedUsername, "alice".to_owned());
        let shadow = child.set_url_params(Params::new());

        assert_eq!(parent.url_params(), Some(&params()));
        assert!(parent.value::<String>(Key::AuthenticatedUsername).is_none());

        assert_eq!(child.url_params(), Some(&params()));
        assert_eq!(
            child.value::<String>(Key::AuthenticatedUsername).map(String::as_str),
            Some("alice")
        );

        assert_eq!(shadow.url_params().map(Params::len), Some(0));
        assert_eq!(shadow.depth(), 3);
        assert_eq!(parent.depth(), 1);
    }

    #[test]
    fn wrong_type_is_not_found() {
        let ctx = Context::new().with_value(Key::UrlParams, "not params");
        assert!(ctx.url_params().is_none());
        assert_eq!(ctx.value::<&str>(Key::UrlParams), Some(&"not params"));
    }

    #[test]
    fn mistyped_entry_shadows_older_entry() {
        let ctx = Context::new()
            .set_url_params(params())
            .with_value(Key::UrlParams, 7_u32);
        assert!(ctx.url_params().is_none());
    }

    #[test]
    fn named_keys_are_distinct() {
        let ctx = Context::new()
            .with_value(Key::Named("tenant"), "acme".to_owned())
            .with_value(Key::Named("region"), "eu".to_owned());
        assert_eq!(ctx.value::<String>(Key::Named("tenant")).map(String::as_str), Some("acme"));
        assert_eq!(ctx.value::<String>(Key::Named("region")).map(String::as_str), Some("eu"));
        assert!(ctx.value::<String>(Key::Named("zone")).is_none());
    }

    #[test]
    fn context_is_shareable_across_threads() {
        let ctx = Context::new().set_url_params(params());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = ctx.clone();
                std::thread::spawn(move || ctx.url_params().and_then(|p| p.by_name("id").map(str::to_owned)))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().as_deref(), Some("42"));
        }
    }
}
