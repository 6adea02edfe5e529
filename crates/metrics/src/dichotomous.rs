//! Scores derived from a contingency table.
//!
//! Each score accepts dichotomous pairs, a pre-computed [`ContingencyTable`]
//! (through [`Collectable::aggregate`]) or a contingency table in its
//! [`DoubleScore`] form. Zero denominators give a missing value.

use hydroskill_datamodel::{DoubleScore, MetricName, Pool};

use crate::contingency::{ContingencyTable, ContingencyTableMetric, table_from_score};
use crate::error::MetricError;
use crate::{Collectable, Metric, finite_or_missing};

fn single(metric: MetricName, value: f64, table: &ContingencyTable) -> DoubleScore {
    DoubleScore::main(metric, finite_or_missing(value), table.metadata().clone())
}

/// TP / (TP + FN).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityOfDetection;

impl Metric<Pool<(bool, bool)>> for ProbabilityOfDetection {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ProbabilityOfDetection
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        self.aggregate(&self.intermediate(pool)?)
    }
}

impl Metric<DoubleScore> for ProbabilityOfDetection {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ProbabilityOfDetection
    }

    fn apply(&self, table: &DoubleScore) -> Result<DoubleScore, MetricError> {
        self.aggregate(&table_from_score(MetricName::ProbabilityOfDetection, table)?)
    }
}

impl Collectable<Pool<(bool, bool)>> for ProbabilityOfDetection {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        ContingencyTableMetric.intermediate(pool)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::ProbabilityOfDetection;
        let c = table.cells(metric)?;
        Ok(single(metric, c.tp / (c.tp + c.fn_), table))
    }
}

/// FP / (FP + TN), also known as the false alarm rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilityOfFalseDetection;

impl Metric<Pool<(bool, bool)>> for ProbabilityOfFalseDetection {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ProbabilityOfFalseDetection
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        self.aggregate(&self.intermediate(pool)?)
    }
}

impl Metric<DoubleScore> for ProbabilityOfFalseDetection {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ProbabilityOfFalseDetection
    }

    fn apply(&self, table: &DoubleScore) -> Result<DoubleScore, MetricError> {
        self.aggregate(&table_from_score(
            MetricName::ProbabilityOfFalseDetection,
            table,
        )?)
    }
}

impl Collectable<Pool<(bool, bool)>> for ProbabilityOfFalseDetection {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        ContingencyTableMetric.intermediate(pool)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::ProbabilityOfFalseDetection;
        let c = table.cells(metric)?;
        Ok(single(metric, c.fp / (c.fp + c.tn), table))
    }
}

/// TP / (TP + FP + FN), also known as the critical success index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatScore;

impl Metric<Pool<(bool, bool)>> for ThreatScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ThreatScore
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        self.aggregate(&self.intermediate(pool)?)
    }
}

impl Metric<DoubleScore> for ThreatScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ThreatScore
    }

    fn apply(&self, table: &DoubleScore) -> Result<DoubleScore, MetricError> {
        self.aggregate(&table_from_score(MetricName::ThreatScore, table)?)
    }
}

impl Collectable<Pool<(bool, bool)>> for ThreatScore {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        ContingencyTableMetric.intermediate(pool)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::ThreatScore;
        let c = table.cells(metric)?;
        Ok(single(metric, c.tp / (c.tp + c.fp + c.fn_), table))
    }
}

/// Threat score adjusted for hits expected by chance (Gilbert skill score).
#[derive(Debug, Clone, Copy, Default)]
pub struct EquitableThreatScore;

impl Metric<Pool<(bool, bool)>> for EquitableThreatScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::EquitableThreatScore
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        self.aggregate(&self.intermediate(pool)?)
    }
}

impl Metric<DoubleScore> for EquitableThreatScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::EquitableThreatScore
    }

    fn apply(&self, table: &DoubleScore) -> Result<DoubleScore, MetricError> {
        self.aggregate(&table_from_score(MetricName::EquitableThreatScore, table)?)
    }
}

impl Collectable<Pool<(bool, bool)>> for EquitableThreatScore {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        ContingencyTableMetric.intermediate(pool)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::EquitableThreatScore;
        let c = table.cells(metric)?;
        let t = c.tp + c.fp + c.fn_;
        let random_hits = (c.fn_ + c.tp) * (c.fp + c.tp) / (t + c.tn);
        Ok(single(
            metric,
            (c.tp - random_hits) / (t - random_hits),
            table,
        ))
    }
}

/// (TP + FP) / (TP + FN): forecast events per observed event.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyBias;

impl Metric<Pool<(bool, bool)>> for FrequencyBias {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::FrequencyBias
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        self.aggregate(&self.intermediate(pool)?)
    }
}

impl Metric<DoubleScore> for FrequencyBias {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::FrequencyBias
    }

    fn apply(&self, table: &DoubleScore) -> Result<DoubleScore, MetricError> {
        self.aggregate(&table_from_score(MetricName::FrequencyBias, table)?)
    }
}

impl Collectable<Pool<(bool, bool)>> for FrequencyBias {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        ContingencyTableMetric.intermediate(pool)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::FrequencyBias;
        let c = table.cells(metric)?;
        Ok(single(metric, (c.tp + c.fp) / (c.tp + c.fn_), table))
    }
}

/// Peirce skill score (Hanssen-Kuipers discriminant).
///
/// For a 2x2 table this is PoD - PoFD. For an N x N table it is
///
/// ```text
/// (diag / n - sum(row_i * col_i) / n^2) / (1 - sum(col_i^2) / n^2)
/// ```
///
/// which requires a positive total.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeirceSkillScore;

impl PeirceSkillScore {
    fn multicategory(table: &ContingencyTable) -> Result<f64, MetricError> {
        let n = table.total();
        if n <= 0.0 {
            return Err(MetricError::NonPositiveMarginal {
                metric: MetricName::PeirceSkillScore,
                total: n,
            });
        }
        let k = table.categories();
        let n_squared = n * n;
        let row_col: f64 = (0..k).map(|i| table.row_sum(i) * table.col_sum(i)).sum();
        let col_squared: f64 = (0..k).map(|i| table.col_sum(i).powi(2)).sum();
        Ok((table.diagonal_sum() / n - row_col / n_squared) / (1.0 - col_squared / n_squared))
    }
}

impl Metric<Pool<(bool, bool)>> for PeirceSkillScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::PeirceSkillScore
    }

    fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<DoubleScore, MetricError> {
        self.aggregate(&self.intermediate(pool)?)
    }
}

impl Metric<DoubleScore> for PeirceSkillScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::PeirceSkillScore
    }

    fn apply(&self, table: &DoubleScore) -> Result<DoubleScore, MetricError> {
        self.aggregate(&table_from_score(MetricName::PeirceSkillScore, table)?)
    }
}

impl Collectable<Pool<(bool, bool)>> for PeirceSkillScore {
    type Intermediate = ContingencyTable;

    fn collection_of(&self) -> MetricName {
        MetricName::ContingencyTable
    }

    fn intermediate(&self, pool: &Pool<(bool, bool)>) -> Result<ContingencyTable, MetricError> {
        ContingencyTableMetric.intermediate(pool)
    }

    fn aggregate(&self, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::PeirceSkillScore;
        let value = if table.categories() == 2 {
            let c = table.cells(metric)?;
            c.tp / (c.tp + c.fn_) - c.fp / (c.fp + c.tn)
        } else {
            Self::multicategory(table)?
        };
        Ok(single(metric, value, table))
    }
}
