use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics collected during a batch run. Shared by the rayon workers.
#[derive(Default)]
pub struct BatchStats {
    pub documents_processed: AtomicU64,
    pub documents_malformed: AtomicU64,
    pub documents_failed: AtomicU64,
    pub references_extracted: AtomicU64,
    pub untitled_papers: AtomicU64,
    pub outputs_written: AtomicU64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_processed(&self) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_malformed(&self) {
        self.documents_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_references(&self, count: u64) {
        self.references_extracted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_untitled(&self) {
        self.untitled_papers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_outputs(&self) {
        self.outputs_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.documents_processed.load(Ordering::Relaxed)
    }

    pub fn malformed(&self) -> u64 {
        self.documents_malformed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.documents_failed.load(Ordering::Relaxed)
    }

    pub fn references(&self) -> u64 {
        self.references_extracted.load(Ordering::Relaxed)
    }

    pub fn untitled(&self) -> u64 {
        self.untitled_papers.load(Ordering::Relaxed)
    }

    pub fn outputs(&self) -> u64 {
        self.outputs_written.load(Ordering::Relaxed)
    }
}
