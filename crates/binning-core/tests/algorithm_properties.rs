//! Numerical properties of the accumulation algorithms.

use binning_core::{Algorithm, BinAlgorithm};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_utils::{assert_approx_eq, assert_slices_approx_eq, lognormal_values};

fn spatial_pass(algorithm: &Algorithm, values: &[f64]) -> Vec<f64> {
    let mut bin = algorithm.create_bin();
    for &v in values {
        algorithm.accumulate_spatial(v, &mut bin);
    }
    if algorithm.needs_finish_spatial() {
        algorithm.finish_spatial(&mut bin);
    }
    bin
}

fn merged(algorithm: &Algorithm, bins: &[&[f64]]) -> Vec<f64> {
    let mut target = algorithm.create_bin();
    for bin in bins {
        algorithm.accumulate_temporal(bin, &mut target);
    }
    target
}

#[test]
fn test_arithmetic_mean_of_one_two_three() {
    let ame = Algorithm::from_name("AME", Some("1")).unwrap();
    let bin = spatial_pass(&ame, &[1.0, 2.0, 3.0]);
    let out = ame.interpret(&bin);

    let direct_mean = (1.0 + 2.0 + 3.0) / 3.0;
    let direct_var = [1.0f64, 2.0, 3.0]
        .iter()
        .map(|v| (v - direct_mean).powi(2))
        .sum::<f64>()
        / 3.0;

    assert_approx_eq!(out[0], 2.0, 1e-12);
    assert_approx_eq!(out[1], (2.0f64 / 3.0).sqrt(), 1e-12);
    assert_approx_eq!(out[1], direct_var.sqrt(), 1e-12);
    assert_eq!(out[2], 3.0);
}

#[test]
fn test_maximum_likelihood_positivity_filter() {
    for coeff in ["0", "0.5", "1", "2"] {
        let ml = Algorithm::from_name("ML", Some(coeff)).unwrap();
        let bin = spatial_pass(&ml, &[-1.0, 0.0, 4.0, 9.0]);
        assert_eq!(bin[2], 2.0, "count with weight_coeff {}", coeff);

        let out = ml.interpret(&bin);
        let expected_median = ((4.0f64.ln() + 9.0f64.ln()) / 2.0).exp();
        assert_approx_eq!(expected_median, 6.0, 1e-12);
        assert_approx_eq!(out[2], 6.0, 1e-9);
        assert_eq!(out[4], 2.0);
    }
}

#[test]
fn test_maximum_likelihood_recovers_lognormal_parameters() {
    let ml = Algorithm::from_name("ML", Some("1")).unwrap();
    let values = lognormal_values(5, 20_000, 0.5, 0.3);
    let out = ml.interpret(&spatial_pass(&ml, &values));
    // median of a log-normal is exp(mu)
    assert_approx_eq!(out[2], 0.5f64.exp(), 0.02);
    assert_approx_eq!(out[0], (0.5 + 0.3f64.powi(2) / 2.0).exp(), 0.02);
}

#[test]
fn test_min_max_self_merge() {
    let min_max = Algorithm::from_name("MIN_MAX", None).unwrap();
    let bin = spatial_pass(&min_max, &[3.5, -2.0, 8.25]);
    assert_eq!(bin, vec![-2.0, 8.25, 3.0]);

    let mut composite = bin.clone();
    min_max.accumulate_temporal(&bin, &mut composite);
    assert_eq!(composite, vec![-2.0, 8.25, 6.0]);
}

#[test]
fn test_temporal_merge_is_associative() {
    let mut rng = StdRng::seed_from_u64(42);
    for name in ["AME", "ML", "MIN_MAX"] {
        let algorithm = Algorithm::from_name(name, Some("0.5")).unwrap();
        for _ in 0..50 {
            let passes: Vec<Vec<f64>> = (0..3)
                .map(|_| {
                    let n = rng.gen_range(0..6);
                    let values: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..100.0)).collect();
                    spatial_pass(&algorithm, &values)
                })
                .collect();
            let (a, b, c) = (passes[0].as_slice(), passes[1].as_slice(), passes[2].as_slice());

            let ab = merged(&algorithm, &[a, b]);
            let left = merged(&algorithm, &[ab.as_slice(), c]);
            let bc = merged(&algorithm, &[b, c]);
            let right = merged(&algorithm, &[a, bc.as_slice()]);

            assert_slices_approx_eq!(&left, &right, 1e-9);
            assert_slices_approx_eq!(
                &algorithm.interpret(&left),
                &algorithm.interpret(&right),
                1e-9
            );
        }
    }
}

#[test]
fn test_merge_with_empty_bin_is_identity() {
    for name in ["AME", "ML", "MIN_MAX"] {
        let algorithm = Algorithm::from_name(name, None).unwrap();
        let bin = spatial_pass(&algorithm, &[2.0, 5.0]);
        let empty = algorithm.create_bin();
        let forward = merged(&algorithm, &[bin.as_slice(), empty.as_slice()]);
        let backward = merged(&algorithm, &[empty.as_slice(), bin.as_slice()]);
        assert_eq!(forward, backward);
        assert_eq!(forward, bin);
    }
}

#[test]
fn test_empty_bins_interpret_to_zero() {
    for name in ["AME", "ML", "MIN_MAX"] {
        let algorithm = Algorithm::from_name(name, None).unwrap();
        let out = algorithm.interpret(&algorithm.create_bin());
        assert_eq!(out.len(), algorithm.num_interpreted_variables());
        assert!(out.iter().all(|&v| v == 0.0), "{}: {:?}", name, out);
    }
}
