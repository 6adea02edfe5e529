use hydroskill_datamodel::{
    ComponentName, MetricName, Pool, PoolMetadata, Threshold, ThresholdOperator, ThresholdSide,
    slicer,
};
use hydroskill_metrics::{
    ContingencyTableMetric, Metric, MetricCollection, MetricError, ProbabilityOfDetection,
    ThreatScore,
};

fn pairs() -> Vec<(f64, f64)> {
    vec![
        (12.0, 15.0),
        (3.0, 11.0),
        (14.0, 2.0),
        (1.0, 4.0),
        (20.0, 30.0),
        (f64::NAN, 50.0),
        (2.0, 1.0),
    ]
}

#[test]
fn test_threshold_to_scores() {
    let pool = Pool::builder()
        .add_data(pairs())
        .set_metadata(PoolMetadata::dimensionless())
        .build()
        .unwrap();
    let threshold =
        Threshold::value(10.0, ThresholdOperator::Greater, ThresholdSide::Left).unwrap();
    let events = slicer::to_dichotomous(&pool, &threshold).unwrap();

    let table = ContingencyTableMetric.apply(&events).unwrap();
    let cells: f64 = [
        ComponentName::TruePositives,
        ComponentName::FalsePositives,
        ComponentName::FalseNegatives,
        ComponentName::TrueNegatives,
    ]
    .iter()
    .map(|c| table.value(*c).unwrap())
    .sum();
    assert_eq!(cells, events.len() as f64);
    assert_eq!(events.len(), 6);
    assert_eq!(table.value(ComponentName::TruePositives), Some(2.0));
    assert_eq!(table.value(ComponentName::FalsePositives), Some(1.0));
    assert_eq!(table.value(ComponentName::FalseNegatives), Some(1.0));
    assert_eq!(table.value(ComponentName::TrueNegatives), Some(2.0));
    assert_eq!(table.metadata().thresholds().unwrap().event(), &threshold);

    let collection =
        MetricCollection::new(&[MetricName::ProbabilityOfDetection, MetricName::ThreatScore])
            .unwrap();
    let scores = collection.apply(&events).unwrap();
    assert_eq!(scores[0].value(ComponentName::Main), Some(2.0 / 3.0));
    assert_eq!(scores[1].value(ComponentName::Main), Some(0.5));
}

#[test]
fn test_score_rejects_non_table_input() {
    let pool = Pool::builder()
        .add_data([(true, true)])
        .set_metadata(PoolMetadata::dimensionless())
        .build()
        .unwrap();
    let not_a_table = ThreatScore.apply(&pool).unwrap();
    let err = ProbabilityOfDetection.apply(&not_a_table).unwrap_err();
    assert!(matches!(
        err,
        MetricError::ShapeMismatch {
            metric: MetricName::ProbabilityOfDetection,
            ..
        }
    ));
    assert!(err.to_string().contains("received [MAIN]"));
}
