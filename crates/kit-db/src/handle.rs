use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::adapter::Document;
use crate::error::DbResult;
use crate::store::Store;

enum Backing<T: Document> {
    Live(Store<T>),
    /// The store directory was missing: defaults only, nothing persisted.
    Degraded { path: PathBuf, data: Option<T> },
}

/// The object a load hands back: the in-memory document plus the store's
/// `read` and `write`.
///
/// Typed access goes through [`doc`](Self::doc), [`doc_mut`](Self::doc_mut)
/// and [`update`](Self::update). [`field`](Self::field) and
/// [`set_field`](Self::set_field) address top-level fields by name for
/// callers that only know the JSON shape. Changes stay in memory until
/// [`write`](Self::write).
///
/// Each handle owns its own copy of the document. Two handles on the same
/// key do not see each other's unsaved changes, and whichever writes last
/// replaces the file wholesale.
pub struct Handle<T: Document> {
    backing: Backing<T>,
}

impl<T: Document> Handle<T> {
    pub(crate) fn live(store: Store<T>) -> Self {
        Self {
            backing: Backing::Live(store),
        }
    }

    pub(crate) fn degraded(path: PathBuf, data: T) -> Self {
        Self {
            backing: Backing::Degraded {
                path,
                data: Some(data),
            },
        }
    }

    /// True when the handle is not backed by a file.
    pub fn is_degraded(&self) -> bool {
        matches!(self.backing, Backing::Degraded { .. })
    }

    /// Path this handle resolves to, whether or not it is persisted there.
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Live(store) => store.path(),
            Backing::Degraded { path, .. } => Some(path),
        }
    }

    pub fn doc(&self) -> Option<&T> {
        match &self.backing {
            Backing::Live(store) => store.data(),
            Backing::Degraded { data, .. } => data.as_ref(),
        }
    }

    pub fn doc_mut(&mut self) -> Option<&mut T> {
        match &mut self.backing {
            Backing::Live(store) => store.data_mut(),
            Backing::Degraded { data, .. } => data.as_mut(),
        }
    }

    /// Mutate the document in place. Returns `false` if there is no
    /// document to mutate.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        match self.doc_mut() {
            Some(doc) => {
                f(doc);
                true
            }
            None => false,
        }
    }

    /// Replace the whole in-memory document.
    pub fn replace(&mut self, doc: T) {
        match &mut self.backing {
            Backing::Live(store) => store.set_data(doc),
            Backing::Degraded { data, .. } => *data = Some(doc),
        }
    }

    /// Top-level field `name` of the document, or `None` if the document is
    /// missing, not an object, or has no such field.
    ///
    /// Each call serializes the whole document to a [`Value`]. Callers
    /// reading many fields of a large document should use
    /// [`doc`](Self::doc) or [`to_value`](Self::to_value) once instead.
    pub fn field(&self, name: &str) -> Option<Value> {
        let mut value = self.to_value()?;
        value.as_object_mut()?.remove(name)
    }

    /// The whole document as JSON, or `None` before any document is loaded.
    pub fn to_value(&self) -> Option<Value> {
        serde_json::to_value(self.doc()?).ok()
    }

    /// Set top-level field `name` in memory.
    ///
    /// Returns `false` instead of failing when there is no document yet, the
    /// document is not an object, or the new field does not fit `T`.
    pub fn set_field(&mut self, name: &str, value: impl Serialize) -> bool {
        let Some(doc) = self.doc_mut() else {
            debug!(field = name, "set_field before any document was loaded");
            return false;
        };

        let patched = serde_json::to_value(&*doc).and_then(|mut current| {
            let new_value = serde_json::to_value(value)?;
            match current.as_object_mut() {
                Some(obj) => {
                    obj.insert(name.to_string(), new_value);
                    serde_json::from_value::<T>(current).map(Some)
                }
                None => Ok(None),
            }
        });

        match patched {
            Ok(Some(updated)) => {
                *doc = updated;
                true
            }
            Ok(None) => {
                debug!(field = name, "set_field on a non-object document");
                false
            }
            Err(e) => {
                debug!(field = name, error = %e, "set_field rejected");
                false
            }
        }
    }

    /// Reload from disk, dropping unsaved changes. A degraded handle keeps
    /// its defaults.
    pub async fn read(&mut self) -> DbResult<()> {
        match &mut self.backing {
            Backing::Live(store) => store.read().await,
            Backing::Degraded { .. } => Ok(()),
        }
    }

    /// Persist the in-memory document. A degraded handle does nothing.
    pub async fn write(&self) -> DbResult<()> {
        match &self.backing {
            Backing::Live(store) => store.write().await,
            Backing::Degraded { path, .. } => {
                debug!(path = %path.display(), "degraded store; write skipped");
                Ok(())
            }
        }
    }

    /// The underlying store, for callers that want to drive it directly.
    /// Degraded handles have none.
    pub fn into_store(self) -> Option<Store<T>> {
        match self.backing {
            Backing::Live(store) => Some(store),
            Backing::Degraded { .. } => None,
        }
    }

    /// Consume the handle, keeping only the document.
    pub fn into_doc(self) -> Option<T> {
        match self.backing {
            Backing::Live(mut store) => store.take_data(),
            Backing::Degraded { data, .. } => data,
        }
    }
}

impl<T: Document + std::fmt::Debug> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("path", &self.path())
            .field("degraded", &self.is_degraded())
            .field("doc", &self.doc())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        #[serde(default)]
        zoom: u32,
    }

    fn live(doc: Option<Prefs>) -> Handle<Prefs> {
        let mut store = Store::new(Memory::new());
        if let Some(d) = doc {
            store.set_data(d);
        }
        Handle::live(store)
    }

    fn prefs() -> Prefs {
        Prefs { theme: "dark".into(), zoom: 1 }
    }

    #[test]
    fn field_reads() {
        let h = live(Some(prefs()));
        assert_eq!(h.field("theme"), Some(json!("dark")));
        assert_eq!(h.field("missing"), None);
    }

    #[test]
    fn whole_document_as_value() {
        let h = live(Some(prefs()));
        let value = h.to_value().unwrap();
        assert_eq!(value, json!({"theme": "dark", "zoom": 1}));
        assert_eq!(value.get("theme"), h.field("theme").as_ref());
        assert_eq!(live(None).to_value(), None);
    }

    #[test]
    fn set_field_writes_memory() {
        let mut h = live(Some(prefs()));
        assert!(h.set_field("zoom", 3));
        assert_eq!(h.doc().unwrap().zoom, 3);
    }

    #[test]
    fn set_field_before_init_is_false() {
        let mut h = live(None);
        assert!(!h.set_field("theme", "light"));
        assert!(h.doc().is_none());
    }

    #[test]
    fn set_field_with_wrong_type_is_false() {
        let mut h = live(Some(prefs()));
        assert!(!h.set_field("zoom", "huge"));
        assert_eq!(h.doc(), Some(&prefs()));
    }

    #[test]
    fn set_field_on_non_object_is_false() {
        let mut h: Handle<Vec<u8>> = Handle::live({
            let mut s = Store::new(Memory::new());
            s.set_data(vec![1, 2]);
            s
        });
        assert!(!h.set_field("x", 1));
        assert_eq!(h.field("x"), None);
    }

    #[test]
    fn update_closure() {
        let mut h = live(Some(prefs()));
        assert!(h.update(|p| p.theme = "light".into()));
        assert_eq!(h.field("theme"), Some(json!("light")));

        let mut empty = live(None);
        assert!(!empty.update(|p| p.zoom = 9));
    }

    #[tokio::test]
    async fn changes_persist_only_on_write() {
        let mut h = live(Some(prefs()));
        h.write().await.unwrap();
        h.set_field("theme", "light");
        h.read().await.unwrap();
        assert_eq!(h.doc().unwrap().theme, "dark");

        h.set_field("theme", "light");
        h.write().await.unwrap();
        h.read().await.unwrap();
        assert_eq!(h.doc().unwrap().theme, "light");
    }

    #[tokio::test]
    async fn degraded_read_write_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("p.json");
        let mut h = Handle::degraded(path.clone(), prefs());

        assert!(h.is_degraded());
        assert!(h.set_field("zoom", 4));
        h.write().await.unwrap();
        h.read().await.unwrap();
        assert_eq!(h.doc().unwrap().zoom, 4);
        assert!(!path.exists());
        assert_eq!(h.path(), Some(path.as_path()));
        assert!(h.into_store().is_none());
    }

    #[test]
    fn into_store_and_doc() {
        let h = live(Some(prefs()));
        let store = h.into_store().unwrap();
        assert_eq!(store.data(), Some(&prefs()));

        assert_eq!(live(Some(prefs())).into_doc(), Some(prefs()));
    }
}
