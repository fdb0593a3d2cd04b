//! Initial documents for new stores.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DbResult;

type ProducerFn<T> =
    Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = DbResult<T>> + Send>> + Send>;

/// What a store is seeded with when it has no document yet.
///
/// A producer is only run on an initializing load (no file, or
/// `from_cache = false`) and then exactly once. Degraded loads never run it.
pub enum Defaults<T> {
    Value(T),
    Producer(ProducerFn<T>),
}

impl<T> Defaults<T> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Seed from an async computation, e.g. indexing installed apps.
    pub fn producer<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = DbResult<T>> + Send + 'static,
    {
        Self::Producer(Box::new(move || Box::pin(f())))
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, Self::Producer(_))
    }

    /// The static value, if these defaults have one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Producer(_) => None,
        }
    }

    /// Compute the document, running the producer if there is one.
    pub async fn resolve(self) -> DbResult<T> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Producer(f) => f().await,
        }
    }
}

impl<T: Default> Default for Defaults<T> {
    fn default() -> Self {
        Self::Value(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Defaults<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Document shape of list-oriented stores: `{"items": [...]}`.
///
/// Fields other than `items` are kept in `extra` so an object-shaped seed
/// survives unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemsDoc<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> ItemsDoc<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            extra: Map::new(),
        }
    }
}

impl<T> Default for ItemsDoc<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Seed for a list store: either a bare sequence or an already-wrapped
/// document.
#[derive(Clone, Debug, PartialEq)]
pub enum Items<T> {
    Bare(Vec<T>),
    Wrapped(ItemsDoc<T>),
}

impl<T> Items<T> {
    /// Wrap a bare sequence as `{items}`; pass a wrapped document through.
    pub fn normalize(self) -> ItemsDoc<T> {
        match self {
            Self::Bare(items) => ItemsDoc::new(items),
            Self::Wrapped(doc) => doc,
        }
    }
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Bare(items)
    }
}

impl<T> From<ItemsDoc<T>> for Items<T> {
    fn from(doc: ItemsDoc<T>) -> Self {
        Self::Wrapped(doc)
    }
}

impl<T> Default for Items<T> {
    fn default() -> Self {
        Self::Bare(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn value_resolves_directly() {
        let d = Defaults::value(5);
        assert!(!d.is_producer());
        assert_eq!(d.resolve().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn producer_runs_once_on_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let d = Defaults::producer(move || async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok("made".to_string())
        });
        assert!(d.is_producer());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(d.resolve().await.unwrap(), "made");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn producer_has_no_static_value() {
        let d: Defaults<u8> = Defaults::producer(|| async { Ok(1) });
        assert!(d.into_value().is_none());
        assert_eq!(Defaults::value(2u8).into_value(), Some(2));
    }

    #[test]
    fn bare_items_are_wrapped() {
        let doc = Items::from(vec![1, 2, 3]).normalize();
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn wrapped_items_pass_through() {
        let mut doc = ItemsDoc::new(vec!["a"]);
        doc.extra.insert("version".into(), json!(2));
        let out = Items::from(doc.clone()).normalize();
        assert_eq!(out, doc);
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({"items": ["a"], "version": 2})
        );
    }

    #[test]
    fn items_doc_reads_extra_fields() {
        let doc: ItemsDoc<u32> =
            serde_json::from_value(json!({"items": [7], "note": "hi"})).unwrap();
        assert_eq!(doc.items, vec![7]);
        assert_eq!(doc.extra.get("note"), Some(&json!("hi")));
    }
}
