//! Identifiers for objects created after load (evaluated blocks, inserted
//! nodes, pasted rules).
//!
//! Identifiers look like `{seed}-{n}` where the seed is the CRC32 of the
//! document URI. A generator can be resumed against an existing tree so
//! that it never hands out an identifier the tree already uses.

use crate::node::NodeRef;
use crate::queries::flatten;
use crc32fast::Hasher;

/// Stable document seed derived from a source URI
pub fn get_document_id(uri: &str) -> String {
    let mut hasher = Hasher::new();
    if !uri.starts_with("file://") {
        hasher.update(b"file://");
    }
    hasher.update(uri.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(uri: &str) -> Self {
        Self::from_seed(get_document_id(uri))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generator for `uri` that continues after the highest sequence number
    /// of this seed found in `root`
    pub fn resume(uri: &str, root: &NodeRef) -> Self {
        let mut ids = Self::new(uri);
        ids.skip_used(root);
        ids
    }

    /// Advances past every identifier of this generator already in `root`
    pub fn skip_used(&mut self, root: &NodeRef) {
        let highest = flatten(root)
            .ids()
            .filter_map(|id| self.sequence_of(id))
            .max()
            .unwrap_or(0);
        self.count = self.count.max(highest);
    }

    pub fn next_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Sequence number of `id` if this generator's seed produced it
    pub fn sequence_of(&self, id: &str) -> Option<u32> {
        id.strip_prefix(self.seed.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
