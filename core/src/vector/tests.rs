use super::*;

const EPSILON: f32 = 1e-5;

fn approx_eq(left: f32, right: f32) {
    assert!((left - right).abs() < EPSILON, "expected {left} ~= {right}");
}

fn approx_eq_tol(left: f32, right: f32, epsilon: f32) {
    assert!((left - right).abs() < epsilon, "expected {left} ~= {right}");
}

fn deterministic_vector(seed: usize, len: usize) -> Vec<f32> {
    (0..len)
        .map(|index| {
            let mixed = seed
                .wrapping_mul(1_103_515_245)
                .wrapping_add(index.wrapping_mul(12_345))
                .wrapping_add(97);
            let base = (mixed % 10_000) as f32 / 5_000.0;
            base - 1.0
        })
        .collect()
}

fn scalar_dot(left: &[f32], right: &[f32]) -> f32 {
    left.iter().zip(right).map(|(l, r)| l * r).sum()
}

#[test]
fn dot_product_works() {
    let left = [1.0, 2.0, 3.0];
    let right = [4.0, 5.0, 6.0];
    let score = dot_product(&left, &right).expect("dot product should succeed");
    approx_eq(score, 32.0);
    approx_eq(dot_product_unchecked(&left, &right), score);
}

#[test]
fn dot_product_matches_scalar_reference_across_simd_boundaries() {
    for len in [1usize, 7, 8, 9, 16, 17, 128, 129, 512] {
        let left = deterministic_vector(3, len);
        let right = deterministic_vector(11, len);
        let value = dot_product(&left, &right).expect("dot must succeed");
        approx_eq_tol(value, scalar_dot(&left, &right), 1e-3);
    }
}

#[test]
fn prepared_dot_matches_dot_product() {
    for len in [1usize, 2, 3, 7, 8, 9, 16, 17, 64, 65, 127, 128, 129, 512] {
        let query = deterministic_vector(17, len);
        let candidate = deterministic_vector(31, len);
        let prepared = PreparedDotQuery::new(&query);
        assert_eq!(prepared.len(), len);
        let prepared_value = prepared.dot_unchecked(&candidate);
        let reference = dot_product(&query, &candidate).expect("dot must succeed");
        approx_eq_tol(prepared_value, reference, 1e-3);
    }
}

#[test]
fn prepared_dot_rejects_length_mismatch() {
    let prepared = PreparedDotQuery::new(&[1.0, 0.0, 0.0]);
    assert!(prepared.dot(&[1.0, 0.0]).is_none());
    assert_eq!(prepared.dot(&[1.0, 0.0, 0.0]), Some(1.0));
}

#[test]
fn normalize_produces_unit_norm_for_any_scale() {
    for scale in [1e-20f32, 1e-3, 1.0, 42.0, 1e20] {
        let values: Vec<f32> = deterministic_vector(5, 129)
            .into_iter()
            .map(|value| value * scale)
            .collect();
        let normalized = normalize(&values).expect("normalize must succeed");
        let norm = euclidean_norm(&normalized) as f32;
        approx_eq(norm, 1.0);
    }
}

#[test]
fn normalize_preserves_direction() {
    let normalized = normalize(&[3.0, 4.0]).expect("normalize must succeed");
    assert_eq!(normalized, vec![0.6, 0.8]);
}

#[test]
fn normalize_rejects_empty_vector() {
    let error = normalize(&[]).expect_err("must fail");
    assert_eq!(error, VectorError::EmptyVector);
}

#[test]
fn normalize_rejects_zero_norm() {
    let error = normalize(&[0.0, 0.0, 0.0]).expect_err("must fail");
    assert_eq!(error, VectorError::ZeroNorm);
    assert!(try_normalize(&[0.0]).is_none());
}

#[test]
fn normalize_rejects_non_finite_values() {
    let error = normalize(&[1.0, f32::NAN]).expect_err("must fail");
    assert!(matches!(error, VectorError::NonFinite { index: 1, .. }));

    let error = normalize(&[f32::INFINITY]).expect_err("must fail");
    assert!(matches!(error, VectorError::NonFinite { index: 0, .. }));
}

#[test]
fn errors_on_dimension_mismatch() {
    let error = dot_product(&[1.0, 2.0], &[1.0]).expect_err("must fail");
    assert!(matches!(
        error,
        VectorError::DimensionMismatch { left: 2, right: 1 }
    ));
}

#[test]
fn errors_on_empty_vectors() {
    let error = dot_product(&[], &[]).expect_err("must fail");
    assert!(matches!(error, VectorError::EmptyVector));
}
