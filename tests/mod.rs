pub mod integration;
pub mod unit;
pub mod fixtures;

use std::path::{Path, PathBuf};

use docanon::InMemoryDocument;

/// Writes `document` as `name` inside `dir` and returns its path.
pub fn write_document(dir: &Path, name: &str, document: &InMemoryDocument) -> PathBuf {
    let path = dir.join(name);
    document.save(&path).unwrap();
    path
}
