//! Contingency tables of predicted against observed categories.

use hydroskill_datamodel::{
    ComponentName, DoubleScore, MetricName, Pool, PoolMetadata, ScoreComponent,
};
use tracing::debug;

use crate::error::MetricError;
use crate::{Collectable, Metric};

/// Component order of a 2x2 table when expressed as a [`DoubleScore`].
pub const TWO_BY_TWO_COMPONENTS: [ComponentName; 4] = [
    ComponentName::TruePositives,
    ComponentName::FalsePositives,
    ComponentName::FalseNegatives,
    ComponentName::TrueNegatives,
];

/// Counts of predicted (rows) against observed (columns) categories.
///
/// For a 2x2 table the first category is "event occurred", so row 0 holds
/// true and false positives and row 1 holds false and true negatives.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    categories: usize,
    counts: Vec<f64>,
    metadata: PoolMetadata,
}

/// The four cells of a 2x2 table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cells {
    pub tp: f64,
    pub fp: f64,
    pub fn_: f64,
    pub tn: f64,
}

impl ContingencyTable {
    pub fn two_by_two(tp: f64, fp: f64, fn_: f64, tn: f64, metadata: PoolMetadata) -> Self {
        Self {
            categories: 2,
            counts: vec![tp, fp, fn_, tn],
            metadata,
        }
    }

    /// Counts (observed, predicted) event occurrences.
    pub fn from_pairs(pairs: &[(bool, bool)], metadata: PoolMetadata) -> Self {
        let (mut tp, mut fp, mut fn_, mut tn) = (0u64, 0u64, 0u64, 0u64);
        for &(observed, predicted) in pairs {
            match (observed, predicted) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }
        Self::two_by_two(tp as f64, fp as f64, fn_ as f64, tn as f64, metadata)
    }

    /// An N x N table from its rows (predicted categories).
    pub fn multicategory(
        rows: Vec<Vec<f64>>,
        metadata: PoolMetadata,
    ) -> Result<Self, MetricError> {
        let categories = rows.len();
        if categories < 2 || rows.iter().any(|row| row.len() != categories) {
            let widths: Vec<String> = rows.iter().map(|row| row.len().to_string()).collect();
            return Err(MetricError::ShapeMismatch {
                metric: MetricName::ContingencyTable,
                expected: "a square table with at least two categories".to_string(),
                actual: format!("{categories} row(s) of width {}", widths.join("/")),
            });
        }
        Ok(Self {
            categories,
            counts: rows.into_iter().flatten().collect(),
            metadata,
        })
    }

    /// Rebuilds a 2x2 table from its [`DoubleScore`] form.
    pub fn from_score(score: &DoubleScore) -> Result<Self, MetricError> {
        table_from_score(MetricName::ContingencyTable, score)
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    /// Count for predicted category `row` and observed category `col`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.categories && col < self.categories)
            .then(|| self.counts[row * self.categories + col])
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn row_sum(&self, row: usize) -> f64 {
        let n = self.categories;
        self.counts[row * n..(row + 1) * n].iter().sum()
    }

    pub fn col_sum(&self, col: usize) -> f64 {
        let n = self.categories;
        (0..n).map(|row| self.counts[row * n + col]).sum()
    }

    pub fn diagonal_sum(&self) -> f64 {
        let n = self.categories;
        (0..n).map(|i| self.counts[i * n + i]).sum()
    }

    /// The 2x2 cells, or a shape error naming `metric`.
    pub(crate) fn cells(&self, metric: MetricName) -> Result<Cells, MetricError> {
        if self.categories != 2 {
            return Err(MetricError::ShapeMismatch {
                metric,
                expected: component_list(&TWO_BY_TWO_COMPONENTS),
                actual: format!("{0}x{0} table", self.categories),
            });
        }
        Ok(Cells {
            tp: self.counts[0],
            fp: self.counts[1],
            fn_: self.counts[2],
            tn: self.counts[3],
        })
    }

    /// The 2x2 table as a [`DoubleScore`] with four components.
    pub fn to_score(&self) -> Result<DoubleScore, MetricError> {
        let cells = self.cells(MetricName::ContingencyTable)?;
        let values = [cells.tp, cells.fp, cells.fn_, cells.tn];
        let components = TWO_BY_TWO_COMPONENTS
            .into_iter()
            .zip(values)
            .map(|(name, value)| ScoreComponent {
                name,
                value: Some(value),
            })
            .collect();
        Ok(DoubleScore::new(
            MetricName::ContingencyTable,
            components,
            self.metadata.clone(),
        ))
    }
}

/// Rebuilds a 2x2 table, reporting shape problems against `metric`.
pub(crate) fn table_from_score(
    metric: MetricName,
    score: &DoubleScore,
) -> Result<ContingencyTable, MetricError> {
    let mismatch = || MetricError::ShapeMismatch {
        metric,
        expected: component_list(&TWO_BY_TWO_COMPONENTS),
        actual: component_list(&score.component_names()),
    };

    if score.components().len() != TWO_BY_TWO_COMPONENTS.len() {
        return Err(mismatch());
    }
    let mut values = [0.0; 4];
    for (slot, name) in values.iter_mut().zip(TWO_BY_TWO_COMPONENTS) {
        *slot = score.value(name).ok_or_else(mismatch)?;
    }
    let [tp, fp, fn_, tn] = values;
    Ok(ContingencyTable::two_by_two(
        tp,
        fp,
        fn_,
        tn,
        score.metadata().clone(),
    ))
}

fn component_list(names: &[ComponentName]) -> String {
    names
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds a 2x2 [`ContingencyTable`] from dichotomous pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContingencyTableMetric;

impl Metric<Pool<(bool, bool)>> for ContingencyTableMetric {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        let table = self.intermediate(pool)?;
        self.aggregate(&table)
    }
}

impl Collectable<Pool<(bool, bool)>> for ContingencyTableMetric {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    #[tracing::instrument(skip_all, fields(samples = pool.len()))]
    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        let table = ContingencyTable::from_pairs(pool.samples(), pool.metadata().clone());
        debug!(total = table.total(), "counted contingency table");
        Ok(table)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        table.to_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pool(pairs: Vec<(bool, bool)>) -> Pool<(bool, bool)> {
        Pool::builder()
            .add_data(pairs)
            .set_metadata(PoolMetadata::dimensionless())
            .build()
            .unwrap()
    }

    #[test]
    fn test_counts_cells() {
        let pool = pool(vec![
            (true, true),
            (true, true),
            (false, true),
            (true, false),
            (false, false),
            (false, false),
            (false, false),
        ]);
        let score = ContingencyTableMetric.apply(&pool).unwrap();
        assert_eq!(score.value(ComponentName::TruePositives), Some(2.0));
        assert_eq!(score.value(ComponentName::FalsePositives), Some(1.0));
        assert_eq!(score.value(ComponentName::FalseNegatives), Some(1.0));
        assert_eq!(score.value(ComponentName::TrueNegatives), Some(3.0));
    }

    #[test]
    fn test_cells_sum_to_sample_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [0usize, 1, 13, 250] {
            let pairs: Vec<(bool, bool)> = (0..n).map(|_| (rng.random(), rng.random())).collect();
            let table = ContingencyTable::from_pairs(&pairs, PoolMetadata::dimensionless());
            assert_eq!(table.total(), n as f64);
        }
    }

    #[test]
    fn test_round_trip_through_score() {
        let table =
            ContingencyTable::two_by_two(82.0, 38.0, 23.0, 222.0, PoolMetadata::dimensionless());
        let score = table.to_score().unwrap();
        assert_eq!(ContingencyTable::from_score(&score).unwrap(), table);
    }

    #[test]
    fn test_from_score_rejects_wrong_components() {
        let score = DoubleScore::main(
            MetricName::ThreatScore,
            Some(0.3),
            PoolMetadata::dimensionless(),
        );
        let err = ContingencyTable::from_score(&score).unwrap_err();
        match err {
            MetricError::ShapeMismatch { expected, actual, .. } => {
                assert_eq!(
                    expected,
                    "TRUE_POSITIVES, FALSE_POSITIVES, FALSE_NEGATIVES, TRUE_NEGATIVES"
                );
                assert_eq!(actual, "MAIN");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_multicategory_must_be_square() {
        let err = ContingencyTable::multicategory(
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
            PoolMetadata::dimensionless(),
        )
        .unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_marginals() {
        let table = ContingencyTable::multicategory(
            vec![
                vec![50.0, 91.0, 71.0],
                vec![47.0, 2364.0, 170.0],
                vec![54.0, 205.0, 3288.0],
            ],
            PoolMetadata::dimensionless(),
        )
        .unwrap();
        assert_eq!(table.categories(), 3);
        assert_eq!(table.row_sum(0), 212.0);
        assert_eq!(table.col_sum(0), 151.0);
        assert_eq!(table.diagonal_sum(), 5702.0);
        assert_eq!(table.get(1, 2), Some(170.0));
        assert_eq!(table.get(3, 0), None);
        assert!(table.to_score().is_err());
    }
}
