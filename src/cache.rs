use crate::error::DataFormatError;
use crate::ingestion::parse_workbook;
use crate::schema::SalesData;
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Lowercase hex SHA-256 of the uploaded bytes; the identity of an upload.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

type CachedParse = std::result::Result<Arc<SalesData>, DataFormatError>;

/// Memoizes workbook parsing by content hash.
///
/// Failures are cached too, so re-submitting the same broken file reports the
/// same error without parsing it again.
#[derive(Debug, Default)]
pub struct IngestionCache {
    entries: HashMap<String, CachedParse>,
    parses: usize,
}

impl IngestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_parse(&mut self, bytes: &[u8]) -> (String, CachedParse) {
        let key = content_hash(bytes);

        if let Some(hit) = self.entries.get(&key) {
            debug!("Ingestion cache hit for {}", &key[..12]);
            return (key, hit.clone());
        }

        debug!("Ingestion cache miss for {}; parsing workbook", &key[..12]);
        self.parses += 1;
        let parsed = parse_workbook(bytes).map(Arc::new);
        self.entries.insert(key.clone(), parsed.clone());
        (key, parsed)
    }

    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.entries.contains_key(&content_hash(bytes))
    }

    /// Number of times a workbook was actually parsed.
    pub fn parse_count(&self) -> usize {
        self.parses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
