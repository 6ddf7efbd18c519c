use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

/// Project folders that have uploads whose document is not written yet.
///
/// The editor holds a guard from its first upload until the document write
/// returns. The orphan sweep leaves such folders alone.
#[derive(Debug, Clone, Default)]
pub struct InFlightUploads {
    folders: Arc<DashMap<String, usize>>,
}

impl InFlightUploads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, namespace: &str) -> InFlightGuard {
        *self.folders.entry(namespace.to_string()).or_insert(0) += 1;
        InFlightGuard {
            folders: Arc::clone(&self.folders),
            namespace: namespace.to_string(),
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.folders.contains_key(namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    folders: Arc<DashMap<String, usize>>,
    namespace: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Entry::Occupied(mut entry) = self.folders.entry(self.namespace.clone()) {
            *entry.get_mut() -= 1;
            if *entry.get() == 0 {
                entry.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_stays_marked_until_the_last_guard_drops() {
        let uploads = InFlightUploads::new();
        let first = uploads.begin("projects/u1/site");
        let second = uploads.clone().begin("projects/u1/site");

        drop(first);
        assert!(uploads.contains("projects/u1/site"));

        drop(second);
        assert!(!uploads.contains("projects/u1/site"));
        assert!(uploads.is_empty());
    }
}
