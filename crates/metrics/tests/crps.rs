use approx::assert_relative_eq;
use hydroskill_datamodel::{ComponentName, Ensemble, Pool, PoolMetadata};
use hydroskill_metrics::{
    ContinuousRankedProbabilityScore, ContinuousRankedProbabilitySkillScore, Metric, crps,
};

fn pairs(raw: &[(f64, &[f64])]) -> Vec<(f64, Ensemble)> {
    raw.iter()
        .map(|(observed, members)| (*observed, Ensemble::new(members)))
        .collect()
}

fn five_member_pairs() -> Vec<(f64, Ensemble)> {
    pairs(&[
        (25.7, &[23.0, 43.0, 45.0, 23.0, 54.0]),
        (21.4, &[19.0, 16.0, 57.0, 23.0, 9.0]),
        (32.1, &[23.0, 54.0, 23.0, 12.0, 32.0]),
        (47.0, &[12.0, 54.0, 23.0, 54.0, 78.0]),
        (12.1, &[9.0, 8.0, 5.0, 6.0, 12.0]),
        (43.0, &[23.0, 12.0, 12.0, 34.0, 10.0]),
    ])
}

#[test]
fn test_crps_five_members() {
    let pool = Pool::builder()
        .add_data(five_member_pairs())
        .set_metadata(PoolMetadata::dimensionless())
        .build()
        .unwrap();
    let score = ContinuousRankedProbabilityScore.apply(&pool).unwrap();
    assert_relative_eq!(
        score.value(ComponentName::Main).unwrap(),
        7.63,
        epsilon = 1e-10
    );
}

#[test]
fn test_crps_four_members() {
    let samples = pairs(&[
        (25.7, &[23.0, 43.0, 45.0, 34.0]),
        (21.4, &[19.0, 16.0, 57.0, 23.0]),
        (32.1, &[23.0, 54.0, 23.0, 12.0]),
        (47.0, &[12.0, 54.0, 23.0, 54.0]),
        (12.1, &[9.0, 8.0, 5.0, 6.0]),
        (43.0, &[23.0, 12.0, 12.0, 34.0]),
    ]);
    assert_relative_eq!(crps(&samples).unwrap(), 8.05, epsilon = 1e-10);
}

#[test]
fn test_crps_mixed_member_counts_weighted_by_group_size() {
    let mut samples = five_member_pairs();
    samples.extend(pairs(&[
        (10.0, &[8.0, 9.0, 11.0]),
        (3.0, &[1.0, 4.0, 6.0]),
    ]));
    // (7.63 * 6 + 0.7777... * 2) / 8
    assert_relative_eq!(crps(&samples).unwrap(), 5.916944444444445, epsilon = 1e-10);
}

#[test]
fn test_crps_independent_of_member_order() {
    let samples = pairs(&[(2.5, &[4.0, 1.0, 3.0, 2.0])]);
    let sorted = pairs(&[(2.5, &[1.0, 2.0, 3.0, 4.0])]);
    assert_relative_eq!(crps(&samples).unwrap(), crps(&sorted).unwrap());
}

#[test]
fn test_crpss_against_baseline() {
    let main = &five_member_pairs()[..4];
    let mut baseline = main.to_vec();
    baseline[0] = (25.7, Ensemble::new(&[20.0, 30.0, 40.0, 50.0, 60.0]));

    let pool = Pool::builder()
        .add_data(main.to_vec())
        .set_metadata(PoolMetadata::dimensionless())
        .add_data_for_baseline(baseline)
        .set_metadata_for_baseline(PoolMetadata::dimensionless().with_baseline_flag(true))
        .build()
        .unwrap();
    let score = ContinuousRankedProbabilitySkillScore.apply(&pool).unwrap();
    // 1 - 5.74 / 6.05
    assert_relative_eq!(
        score.value(ComponentName::Main).unwrap(),
        0.05123966942148772,
        epsilon = 1e-10
    );
}
