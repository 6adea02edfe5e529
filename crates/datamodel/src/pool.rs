//! The atomic unit of verification data.

use std::sync::Arc;

use tracing::debug;

use crate::climatology::Climatology;
use crate::error::PoolError;
use crate::metadata::PoolMetadata;

/// An immutable bundle of samples, their metadata, an optional baseline and
/// an optional climatology.
///
/// Built with [`PoolBuilder`], which enforces that:
///
/// - metadata is always present for the main samples;
/// - baseline samples and baseline metadata are both present or both absent;
/// - an attached climatology holds at least one finite value whenever the
///   pool has samples.
///
/// Samples cannot be absent: the element type `T` has no null state.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool<T> {
    samples: Vec<T>,
    metadata: PoolMetadata,
    baseline: Option<Baseline<T>>,
    climatology: Option<Arc<Climatology>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Baseline<T> {
    samples: Vec<T>,
    metadata: PoolMetadata,
}

impl<T> Pool<T> {
    pub fn builder() -> PoolBuilder<T> {
        PoolBuilder::default()
    }

    /// Assembles a pool from parts that already satisfy the invariants.
    pub(crate) fn from_parts(
        samples: Vec<T>,
        metadata: PoolMetadata,
        baseline: Option<(Vec<T>, PoolMetadata)>,
        climatology: Option<Arc<Climatology>>,
    ) -> Self {
        Self {
            samples,
            metadata,
            baseline: baseline.map(|(samples, metadata)| Baseline { samples, metadata }),
            climatology,
        }
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    pub fn baseline_samples(&self) -> Option<&[T]> {
        self.baseline.as_ref().map(|b| &b.samples[..])
    }

    pub fn baseline_metadata(&self) -> Option<&PoolMetadata> {
        self.baseline.as_ref().map(|b| &b.metadata)
    }

    pub fn climatology(&self) -> Option<&Climatology> {
        self.climatology.as_deref()
    }

    pub(crate) fn climatology_handle(&self) -> Option<Arc<Climatology>> {
        self.climatology.clone()
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn has_climatology(&self) -> bool {
        self.climatology.is_some()
    }

    /// Number of main samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Splits the pool into its owned parts.
    pub(crate) fn into_parts(
        self,
    ) -> (
        Vec<T>,
        PoolMetadata,
        Option<(Vec<T>, PoolMetadata)>,
        Option<Arc<Climatology>>,
    ) {
        (
            self.samples,
            self.metadata,
            self.baseline.map(|b| (b.samples, b.metadata)),
            self.climatology,
        )
    }
}

impl<T: Clone> Pool<T> {
    /// The baseline as a pool of its own, sharing this pool's climatology.
    pub fn baseline_data(&self) -> Option<Pool<T>> {
        self.baseline.as_ref().map(|b| Pool {
            samples: b.samples.clone(),
            metadata: b.metadata.clone(),
            baseline: None,
            climatology: self.climatology.clone(),
        })
    }
}

/// Accumulates samples and metadata for a [`Pool`].
#[derive(Debug)]
pub struct PoolBuilder<T> {
    samples: Vec<T>,
    metadata: Option<PoolMetadata>,
    baseline_samples: Option<Vec<T>>,
    baseline_metadata: Option<PoolMetadata>,
    climatology: Option<Arc<Climatology>>,
    mismatch: Option<PoolError>,
}

impl<T> Default for PoolBuilder<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            metadata: None,
            baseline_samples: None,
            baseline_metadata: None,
            climatology: None,
            mismatch: None,
        }
    }
}

impl<T> PoolBuilder<T> {
    pub fn add_data(mut self, samples: impl IntoIterator<Item = T>) -> Self {
        self.samples.extend(samples);
        self
    }

    pub fn add_datum(mut self, sample: T) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn set_metadata(mut self, metadata: PoolMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn add_data_for_baseline(mut self, samples: impl IntoIterator<Item = T>) -> Self {
        self.baseline_samples
            .get_or_insert_with(Vec::new)
            .extend(samples);
        self
    }

    pub fn set_metadata_for_baseline(mut self, metadata: PoolMetadata) -> Self {
        self.baseline_metadata = Some(metadata);
        self
    }

    pub fn set_climatology(mut self, climatology: impl Into<Arc<Climatology>>) -> Self {
        self.climatology = Some(climatology.into());
        self
    }

    /// Appends the samples of another pool.
    ///
    /// Metadata not yet set on the builder is taken from `pool`; metadata
    /// already set must equal the pool's, otherwise `build()` fails with
    /// [`PoolError::MetadataMismatch`]. The same rule applies to the
    /// baseline. The climatology is adopted only when none is set.
    pub fn add_pool(mut self, pool: Pool<T>) -> Self {
        let (samples, metadata, baseline, climatology) = pool.into_parts();
        let existing = self.metadata.take();
        self.metadata = self.merge_metadata(existing, metadata);
        self.samples.extend(samples);

        if let Some((baseline_samples, baseline_metadata)) = baseline {
            let existing = self.baseline_metadata.take();
            self.baseline_metadata = self.merge_metadata(existing, baseline_metadata);
            self.baseline_samples
                .get_or_insert_with(Vec::new)
                .extend(baseline_samples);
        }

        if self.climatology.is_none() {
            self.climatology = climatology;
        }
        self
    }

    fn merge_metadata(
        &mut self,
        existing: Option<PoolMetadata>,
        incoming: PoolMetadata,
    ) -> Option<PoolMetadata> {
        match existing {
            None => Some(incoming),
            Some(existing) => {
                if existing != incoming && self.mismatch.is_none() {
                    self.mismatch = Some(PoolError::MetadataMismatch {
                        expected: existing.to_string(),
                        found: incoming.to_string(),
                    });
                }
                Some(existing)
            }
        }
    }

    /// Validates the accumulated parts and freezes them into a [`Pool`].
    pub fn build(self) -> Result<Pool<T>, PoolError> {
        if let Some(mismatch) = self.mismatch {
            return Err(mismatch);
        }
        let metadata = self.metadata.ok_or(PoolError::MissingMetadata)?;

        let baseline = match (self.baseline_samples, self.baseline_metadata) {
            (Some(samples), Some(metadata)) => Some(Baseline { samples, metadata }),
            (None, None) => None,
            (samples, metadata) => {
                return Err(PoolError::BaselineMismatch {
                    has_samples: samples.is_some(),
                    has_metadata: metadata.is_some(),
                });
            }
        };

        if let Some(climatology) = &self.climatology {
            if !self.samples.is_empty() && climatology.is_empty() {
                return Err(PoolError::EmptyClimatology {
                    samples: self.samples.len(),
                });
            }
        }

        debug!(
            samples = self.samples.len(),
            baseline = baseline.as_ref().map_or(0, |b| b.samples.len()),
            climatology = self.climatology.is_some(),
            "built pool"
        );

        Ok(Pool {
            samples: self.samples,
            metadata,
            baseline,
            climatology: self.climatology,
        })
    }
}
