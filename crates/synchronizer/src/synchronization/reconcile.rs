use super::collection::RecordCollection;
use super::record::Similarity;

/// Decisions of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Per bestlist record: no stored counterpart, insert it.
    pub insertion_mask: Vec<bool>,
    /// Per stored record: not on the bestlist, delete it.
    pub deletion_mask: Vec<bool>,
    /// `(bestlist index, store index)` pairs describing the same result with drifted
    /// attributes. Candidates for an in-place update.
    pub candidate_pairs: Vec<(usize, usize)>,
}

impl Reconciliation {
    pub fn insertions(&self) -> usize {
        self.insertion_mask.iter().filter(|insert| **insert).count()
    }

    pub fn deletions(&self) -> usize {
        self.deletion_mask.iter().filter(|delete| **delete).count()
    }
}

/// Merge-join of a scraped bestlist against the stored results of the same slice.
///
/// Both collections must be sorted best to worst in the discipline's direction.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    ascending: bool,
    truncated: bool,
    compare_homologation: bool,
}

impl Reconciler {
    pub fn new(ascending: bool) -> Self {
        Self {
            ascending,
            truncated: false,
            compare_homologation: true,
        }
    }

    /// The bestlist hit the page limit, so stored results at or past its last performance are
    /// unknown rather than gone. Better stored results would have been listed and stay deletable.
    pub fn truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Bestlists without the homologation column cannot tell homologated results apart.
    pub fn compare_homologation(mut self, compare: bool) -> Self {
        self.compare_homologation = compare;
        self
    }

    fn better(&self, a: i32, b: i32) -> bool {
        if self.ascending { a < b } else { a > b }
    }

    pub fn reconcile(
        &self,
        bestlist: &RecordCollection,
        store: &RecordCollection,
    ) -> Reconciliation {
        let mut insertion_mask = vec![true; bestlist.len()];
        // manual results are exceptions the bestlist cannot confirm
        let mut deletion_mask: Vec<bool> = store.iter().map(|record| !record.manual).collect();
        let mut candidate_pairs = Vec::new();

        let mut i = 0;
        let mut j = 0;
        while i < bestlist.len() {
            let current = &bestlist[i];

            if i > 0 && bestlist[i - 1].similarity(current, self.compare_homologation)
                == Similarity::Exact
            {
                insertion_mask[i] = false;
                i += 1;
                continue;
            }

            if j >= store.len() {
                i += 1;
                continue;
            }

            let performance = current.performance;
            if self.better(store[j].performance, performance) {
                j += 1;
                continue;
            }
            if self.better(performance, store[j].performance) {
                i += 1;
                continue;
            }

            let mut k = j;
            while k < store.len() && store[k].performance == performance {
                match current.similarity(&store[k], self.compare_homologation) {
                    Similarity::Exact => {
                        insertion_mask[i] = false;
                        deletion_mask[k] = false;
                        if k == j {
                            j += 1;
                        }
                        break;
                    }
                    Similarity::Candidate => candidate_pairs.push((i, k)),
                    Similarity::Unrelated => {}
                }
                k += 1;
            }

            i += 1;
        }

        // past the window edge the bestlist says nothing about a stored result
        if let Some(last) = bestlist.last().filter(|_| self.truncated) {
            for (k, record) in store.iter().enumerate() {
                if !self.better(record.performance, last.performance) {
                    deletion_mask[k] = false;
                }
            }
        }

        Reconciliation {
            insertion_mask,
            deletion_mask,
            candidate_pairs,
        }
    }
}
