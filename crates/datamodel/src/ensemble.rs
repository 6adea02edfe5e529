//! Ensemble forecast values with optional member labels.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use once_cell::race::OnceBox;

use crate::error::EnsembleError;

/// Number of recently constructed label sets kept for reuse.
const LABEL_CACHE_CAPACITY: usize = 64;

static LABEL_CACHE: OnceLock<Mutex<Vec<Labels>>> = OnceLock::new();

/// Ordered member names, shared between ensembles.
///
/// Equal label sets compare equal regardless of whether they share storage.
/// [`Labels::of`] hands back an existing allocation when an equal set was
/// built recently, so thousands of ensembles with the same member names
/// share one buffer.
#[derive(Clone, Default)]
pub struct Labels {
    names: Option<Arc<[String]>>,
}

impl Labels {
    /// An empty label set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a label set, reusing a recently built equal set if one exists.
    pub fn of<S: AsRef<str>>(names: &[S]) -> Self {
        if names.is_empty() {
            return Self::empty();
        }

        let cache = LABEL_CACHE.get_or_init(|| Mutex::new(Vec::new()));
        let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(hit) = cache.iter().find(|cached| cached.matches(names)) {
            return hit.clone();
        }

        let fresh = Self {
            names: Some(names.iter().map(|s| s.as_ref().to_string()).collect()),
        };
        if cache.len() == LABEL_CACHE_CAPACITY {
            cache.remove(0);
        }
        cache.push(fresh.clone());
        fresh
    }

    /// Returns the label names.
    pub fn names(&self) -> &[String] {
        self.names.as_deref().unwrap_or(&[])
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Returns `true` when there are no labels.
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    /// Returns the position of `name`, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names().iter().position(|n| n == name)
    }

    fn matches<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.len() == names.len()
            && self
                .names()
                .iter()
                .zip(names)
                .all(|(a, b)| a.as_str() == b.as_ref())
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        match (&self.names, &other.names) {
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => true,
            _ => self.names() == other.names(),
        }
    }
}

impl Eq for Labels {}

impl fmt::Debug for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Write-once slot for the sorted members.
///
/// Readers that find the slot empty compute a sorted copy and race to
/// publish it. The first publisher wins; losers drop their copy and read the
/// winner's. Nobody blocks, and a published value is never modified.
type SortedSlot = OnceBox<Vec<f64>>;

/// An immutable set of ensemble member values with optional labels.
///
/// Labels, when present, are order-correlated with the members: label `i`
/// names member `i`.
pub struct Ensemble {
    members: Box<[f64]>,
    labels: Labels,
    sorted: Option<SortedSlot>,
}

impl Ensemble {
    /// Creates an unlabelled ensemble. The members are copied.
    pub fn new(members: &[f64]) -> Self {
        Self {
            members: members.into(),
            labels: Labels::empty(),
            sorted: None,
        }
    }

    /// Creates a labelled ensemble.
    ///
    /// `labels` must be empty or have one entry per member.
    pub fn with_labels(members: &[f64], labels: Labels) -> Result<Self, EnsembleError> {
        if !labels.is_empty() && labels.len() != members.len() {
            return Err(EnsembleError::LabelCountMismatch {
                members: members.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            members: members.into(),
            labels,
            sorted: None,
        })
    }

    /// Enables caching of the sorted members.
    ///
    /// Use for ensembles that are ranked repeatedly, e.g. by several
    /// probabilistic metrics over the same pool.
    pub fn with_sorted_cache(mut self) -> Self {
        self.sorted = Some(SortedSlot::new());
        self
    }

    /// Returns the members in their original order.
    pub fn members(&self) -> &[f64] {
        &self.members
    }

    /// Returns the labels (possibly empty).
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Returns `true` when the members carry labels.
    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Returns the member named `label`, if any.
    pub fn member(&self, label: &str) -> Option<f64> {
        self.labels.position(label).map(|i| self.members[i])
    }

    /// Returns the members sorted ascending.
    ///
    /// Borrowed from the cache when caching is enabled, otherwise a fresh
    /// sorted copy.
    pub fn sorted_members(&self) -> Cow<'_, [f64]> {
        match &self.sorted {
            Some(slot) => {
                let sorted = slot.get_or_init(|| Box::new(sort_copy(&self.members)));
                Cow::Borrowed(sorted.as_slice())
            }
            None => Cow::Owned(sort_copy(&self.members)),
        }
    }

    /// Returns a copy without non-finite members. Labels of dropped members
    /// are dropped with them.
    pub fn finite_only(&self) -> Self {
        if self.members.iter().all(|m| m.is_finite()) {
            return self.clone();
        }
        let keep: Vec<usize> = (0..self.members.len())
            .filter(|&i| self.members[i].is_finite())
            .collect();
        let members: Vec<f64> = keep.iter().map(|&i| self.members[i]).collect();
        let labels = if self.has_labels() {
            let names: Vec<&str> = keep
                .iter()
                .map(|&i| self.labels.names()[i].as_str())
                .collect();
            Labels::of(&names)
        } else {
            Labels::empty()
        };
        Self {
            members: members.into(),
            labels,
            sorted: self.sorted.as_ref().map(|_| SortedSlot::new()),
        }
    }
}

fn sort_copy(members: &[f64]) -> Vec<f64> {
    let mut sorted = members.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

impl Clone for Ensemble {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
            labels: self.labels.clone(),
            sorted: self.sorted.as_ref().map(|_| SortedSlot::new()),
        }
    }
}

impl PartialEq for Ensemble {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(other.members.iter())
                .all(|(a, b)| a.total_cmp(b).is_eq())
    }
}

impl fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ensemble")
            .field("members", &self.members)
            .field("labels", &self.labels)
            .finish()
    }
}

impl From<Vec<f64>> for Ensemble {
    fn from(members: Vec<f64>) -> Self {
        Self {
            members: members.into_boxed_slice(),
            labels: Labels::empty(),
            sorted: None,
        }
    }
}
