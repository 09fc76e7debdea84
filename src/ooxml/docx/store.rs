//! Registry of open documents.
//!
//! Each document sits behind its own mutex, so operations on one document
//! are serialized while different documents proceed in parallel. The map
//! lock is only held to look an entry up, never while a document is used.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::diff::{DiffOptions, DiffReport, compare};
use super::writer::Document;
use crate::ooxml::error::{OoxmlError, Result};

type Handle = Arc<Mutex<Document>>;

/// Open documents keyed by caller-chosen id.
///
/// ```
/// use quince::ooxml::docx::DocumentStore;
///
/// let store = DocumentStore::new();
/// store.create("draft")?;
/// store.with_document_mut("draft", |doc| {
///     doc.add_paragraph("Hello");
/// })?;
/// let count = store.with_document("draft", |doc| doc.paragraph_count())?;
/// assert_eq!(count, 1);
/// store.close("draft")?;
/// # Ok::<(), quince::ooxml::error::OoxmlError>(())
/// ```
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Handle>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new empty document under `id`.
    pub fn create(&self, id: &str) -> Result<()> {
        self.insert(id, Document::new())
    }

    /// Register an existing document under `id`.
    pub fn insert(&self, id: &str, document: Document) -> Result<()> {
        let mut documents = self.documents.write();
        if documents.contains_key(id) {
            return Err(OoxmlError::duplicate("document", id));
        }
        documents.insert(id.to_string(), Arc::new(Mutex::new(document)));
        log::debug!("opened document {id:?}");
        Ok(())
    }

    /// Close a document and hand it back.
    ///
    /// Waits for an operation in progress on it to finish.
    pub fn close(&self, id: &str) -> Result<Document> {
        let handle = self
            .documents
            .write()
            .remove(id)
            .ok_or_else(|| OoxmlError::not_found("document", id))?;
        log::debug!("closed document {id:?}");
        let document = match Arc::try_unwrap(handle) {
            Ok(mutex) => mutex.into_inner(),
            // Another caller still holds a handle; take a copy under its lock.
            Err(shared) => shared.lock().clone(),
        };
        Ok(document)
    }

    /// Ids of the open documents, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn handle(&self, id: &str) -> Result<Handle> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| OoxmlError::not_found("document", id))
    }

    pub fn with_document<T>(&self, id: &str, f: impl FnOnce(&Document) -> T) -> Result<T> {
        let handle = self.handle(id)?;
        let document = handle.lock();
        Ok(f(&document))
    }

    pub fn with_document_mut<T>(&self, id: &str, f: impl FnOnce(&mut Document) -> T) -> Result<T> {
        let handle = self.handle(id)?;
        let mut document = handle.lock();
        Ok(f(&mut document))
    }

    /// Compare two open documents.
    ///
    /// Locks are taken in id order, so concurrent comparisons of the same
    /// pair in opposite directions cannot deadlock.
    pub fn compare(&self, base: &str, other: &str, options: &DiffOptions) -> Result<DiffReport> {
        let a = self.handle(base)?;
        if base == other {
            let doc = a.lock();
            return Ok(compare(&doc, &doc, options));
        }
        let b = self.handle(other)?;

        let (first, second) = if base < other { (&a, &b) } else { (&b, &a) };
        let first = first.lock();
        let second = second.lock();
        let (doc_a, doc_b) = if base < other {
            (&*first, &*second)
        } else {
            (&*second, &*first)
        };
        Ok(compare(doc_a, doc_b, options))
    }

    /// Write an open document to a `.docx` file.
    pub fn save<P: AsRef<Path>>(&self, id: &str, path: P) -> Result<()> {
        let handle = self.handle(id)?;
        let document = handle.lock();
        document.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_lifecycle() {
        let store = DocumentStore::new();
        assert!(store.is_empty());
        store.create("b").unwrap();
        store.create("a").unwrap();
        assert!(matches!(
            store.create("a"),
            Err(OoxmlError::DuplicateIdentifier { .. })
        ));
        assert_eq!(store.list(), ["a", "b"]);

        store
            .with_document_mut("a", |doc| doc.add_paragraph("kept"))
            .unwrap();
        let doc = store.close("a").unwrap();
        assert_eq!(doc.paragraph(0).unwrap().text(), "kept");
        assert!(!store.contains("a"));
        assert!(matches!(store.close("a"), Err(OoxmlError::NotFound { .. })));
        assert!(store.with_document("a", |_| ()).is_err());
    }

    #[test]
    fn test_errors_from_closure_pass_through() {
        let store = DocumentStore::new();
        store.create("d").unwrap();
        let inner = store
            .with_document_mut("d", |doc| doc.delete_paragraph(0))
            .unwrap();
        assert!(matches!(inner, Err(OoxmlError::InvalidIndex { .. })));
    }

    #[test]
    fn test_compare_both_directions() {
        let store = DocumentStore::new();
        let mut base = Document::new();
        base.add_paragraph("same");
        base.add_paragraph("gone");
        let mut other = base.clone();
        other.delete_paragraph(1).unwrap();
        store.insert("x", base).unwrap();
        store.insert("y", other).unwrap();

        let forward = store.compare("x", "y", &DiffOptions::default()).unwrap();
        assert_eq!(forward.summary.deleted, 1);
        let backward = store.compare("y", "x", &DiffOptions::default()).unwrap();
        assert_eq!(backward.summary.added, 1);
        assert!(store.compare("x", "x", &DiffOptions::default()).unwrap().is_identical());
        assert!(store.compare("x", "missing", &DiffOptions::default()).is_err());
    }

    #[test]
    fn test_concurrent_mutations_are_serialized() {
        let store = Arc::new(DocumentStore::new());
        store.create("shared").unwrap();
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..25 {
                        store
                            .with_document_mut("shared", |doc| {
                                doc.add_paragraph(&format!("{i}-{j}"));
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        let count = store
            .with_document("shared", |doc| doc.paragraph_count())
            .unwrap();
        assert_eq!(count, 200);
    }

    #[test]
    fn test_save() {
        let store = DocumentStore::new();
        store.create("s").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.docx");
        store.save("s", &path).unwrap();
        assert!(path.exists());
        assert!(store.save("nope", &path).is_err());
    }
}
