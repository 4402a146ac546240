//! End-to-end tests for the decomposition, inversion and partial-inverse
//! pipeline.

use moment_fixed_point::{ScaledInteger, ScaledVector};
use moment_linalg::{
    extract_diagonal, extremal_eigenvalue, impose_diagonal, invert_diagonal, invert_unit_lower,
    ldl_decompose, moment_init, partial_inverse, DenseSymmetricSolver, EigenMode, LinalgError,
    Matrix, Orientation, PipelineConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

// =============================================================================
// Helpers
// =============================================================================

/// Random symmetric positive-definite matrix `B·Bᵗ + dim·I`, row-major f64
fn random_spd(dim: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let b: Vec<f64> = (0..dim * dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut a = vec![0.0; dim * dim];
    for i in 0..dim {
        for j in 0..dim {
            let mut sum = 0.0;
            for k in 0..dim {
                sum += b[i * dim + k] * b[j * dim + k];
            }
            a[i * dim + j] = sum + if i == j { dim as f64 } else { 0.0 };
        }
    }
    a
}

/// Decompose a copy of `m` and return unit-lower `L` (row-oriented) and `D`
fn factor(m: &Matrix) -> (Matrix, ScaledVector) {
    let mut l = m.clone();
    ldl_decompose(&mut l).unwrap();
    let mut d = ScaledVector::zeros(m.dim(), 0, m.scale());
    extract_diagonal(&mut l, &mut d, true).unwrap();
    l.reorient();
    (l, d)
}

/// `L · D · Lᵗ`
fn reconstruct(l: &Matrix, d: &ScaledVector) -> Matrix {
    let mut dm = Matrix::new(l.dim(), l.scale(), Orientation::Row).unwrap();
    impose_diagonal(d, &mut dm).unwrap();
    let mut lt = l.clone();
    lt.transpose();
    l.multiply(&dm).unwrap().multiply(&lt).unwrap()
}

fn max_abs_diff(a: &Matrix, b: &Matrix) -> f64 {
    let mut diff = a.clone();
    diff.sub_matrix(b).unwrap();
    diff.to_f64_row_major()
        .into_iter()
        .fold(0.0, |acc, v| acc.max(v.abs()))
}

const HANKEL_4: [f64; 16] = [
    18.0, 22.0, 54.0, 42.0, //
    22.0, 70.0, 86.0, 62.0, //
    54.0, 86.0, 174.0, 134.0, //
    42.0, 62.0, 134.0, 106.0,
];

// =============================================================================
// Section 1: Decomposition
// =============================================================================

mod decomposition_tests {
    use super::*;

    #[test]
    fn test_hankel_4_roundtrip() {
        let m = Matrix::from_f64_row_major(4, 256, Orientation::Column, &HANKEL_4).unwrap();
        let (l, d) = factor(&m);

        assert!(d.iter().all(ScaledInteger::is_positive));
        for row in 0..4 {
            assert_eq!(l.at(row, row), &ScaledInteger::one(256).unwrap());
            for col in (row + 1)..4 {
                assert!(l.at(row, col).is_zero());
            }
        }

        let rebuilt = reconstruct(&l, &d).to_f64_row_major();
        for (got, expected) in rebuilt.iter().zip(HANKEL_4) {
            assert!(
                (got - expected).abs() < 1e-6,
                "reconstruction {} vs {}",
                got,
                expected
            );
        }
    }

    #[test]
    fn test_random_spd_roundtrip_within_scale_bound() {
        for seed in 0..4 {
            let dim = 6 + seed as usize;
            let m = Matrix::from_f64_row_major(dim, 128, Orientation::Column, &random_spd(dim, seed))
                .unwrap();
            let (l, d) = factor(&m);
            let error = max_abs_diff(&reconstruct(&l, &d), &m);
            // A few ulps of 2^-128 per accumulated term
            assert!(error < 1e-30, "seed {}: error {}", seed, error);
        }
    }

    #[test]
    fn test_diagonal_matrix_stays_diagonal() {
        let values = [4.0, 37.0, 98.0];
        let mut source = vec![0.0; 9];
        for (k, v) in values.iter().enumerate() {
            source[k * 3 + k] = *v;
        }
        let mut m = Matrix::from_f64_row_major(3, 256, Orientation::Column, &source).unwrap();
        let original = m.clone();
        ldl_decompose(&mut m).unwrap();
        assert_eq!(m, original);
    }

    #[test]
    fn test_not_positive_definite_is_reported() {
        let mut m =
            Matrix::from_f64_row_major(2, 256, Orientation::Column, &[1.0, 2.0, 2.0, 1.0])
                .unwrap();
        let result = partial_inverse(&mut m, &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(LinalgError::NotPositiveDefinite { pivot: 1 })
        ));
    }

    #[test]
    fn test_insufficient_precision_is_reported() {
        let eps = 2f64.powi(-20);
        let source = [1.0, 1.0, 1.0, 1.0 + eps];

        let mut fine = Matrix::from_f64_row_major(2, 64, Orientation::Column, &source).unwrap();
        assert!(ldl_decompose(&mut fine).is_ok());

        // At 16 fractional bits the perturbation truncates away
        let mut coarse = Matrix::from_f64_row_major(2, 16, Orientation::Column, &source).unwrap();
        assert_eq!(
            ldl_decompose(&mut coarse),
            Err(LinalgError::NotPositiveDefinite { pivot: 1 })
        );
    }
}

// =============================================================================
// Section 2: Container properties
// =============================================================================

mod container_tests {
    use super::*;

    #[test]
    fn test_double_transpose_random() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let values: Vec<f64> = (0..49).map(|_| rng.gen_range(-1e6..1e6)).collect();
        let original = Matrix::from_f64_row_major(7, 96, Orientation::Column, &values).unwrap();
        let mut m = original.clone();
        m.transpose();
        assert_ne!(m, original);
        m.transpose();
        assert_eq!(m, original);
    }

    #[test]
    fn test_diagonal_roundtrip_exact() {
        let original =
            Matrix::from_f64_row_major(5, 128, Orientation::Column, &random_spd(5, 11)).unwrap();
        let mut m = original.clone();
        let mut d = ScaledVector::zeros(5, 0, 128);
        extract_diagonal(&mut m, &mut d, true).unwrap();
        assert_ne!(m, original);
        impose_diagonal(&d, &mut m).unwrap();
        assert_eq!(m, original);
    }
}

// =============================================================================
// Section 3: Inversion
// =============================================================================

mod inversion_tests {
    use super::*;

    fn random_unit_lower(dim: usize, seed: u64, scale: u32) -> Matrix {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut values = vec![0.0; dim * dim];
        for i in 0..dim {
            for j in 0..i {
                values[i * dim + j] = rng.gen_range(-2.0..2.0);
            }
            values[i * dim + i] = 1.0;
        }
        Matrix::from_f64_row_major(dim, scale, Orientation::Row, &values).unwrap()
    }

    #[test]
    fn test_l_times_inverse_is_identity() {
        for seed in 0..3 {
            let l = random_unit_lower(8, seed, 160);
            let mut inverse = l.clone();
            invert_unit_lower(&mut inverse).unwrap();
            let product = l.multiply(&inverse).unwrap();
            let identity = Matrix::identity(8, 160, Orientation::Row).unwrap();
            assert!(max_abs_diff(&product, &identity) < 1e-35);
        }
    }

    #[test]
    fn test_orientation_mismatch_is_rejected() {
        let mut l = random_unit_lower(4, 3, 64);
        l.reorient();
        assert_eq!(l.orientation(), Orientation::Column);
        assert!(matches!(
            invert_unit_lower(&mut l),
            Err(LinalgError::OrientationMismatch {
                expected: Orientation::Row,
                got: Orientation::Column,
            })
        ));
    }

    #[test]
    fn test_column_storage_without_reorient_inverts_wrong_matrix() {
        // Physically the same lines, but read as rows they form Lᵗ, whose
        // diagonal is still one: only the orientation check catches this.
        let l = random_unit_lower(4, 5, 64);
        let mut as_rows_of_transpose = l.clone();
        as_rows_of_transpose.transpose();
        assert!(invert_unit_lower(&mut as_rows_of_transpose).is_ok());
        let product = l.multiply(&as_rows_of_transpose).unwrap();
        let identity = Matrix::identity(4, 64, Orientation::Row).unwrap();
        assert!(max_abs_diff(&product, &identity) > 1e-3);
    }

    #[test]
    fn test_diagonal_inverse_reciprocal() {
        let mut d = ScaledVector::from_f64_slice(&[4.0, 37.0, 98.0], 256).unwrap();
        invert_diagonal(&mut d).unwrap();
        invert_diagonal(&mut d).unwrap();
        let back = d.to_f64_vec();
        for (got, expected) in back.iter().zip([4.0, 37.0, 98.0]) {
            assert!((got - expected).abs() < 1e-12);
        }
    }
}

// =============================================================================
// Section 4: Partial inverse
// =============================================================================

mod partial_inverse_tests {
    use super::*;

    /// Dense `(Lᵗ)⁻¹ · D⁻¹ · L⁻¹`
    fn dense_inverse(m: &Matrix) -> Matrix {
        let (mut l_inverse, d) = factor(m);
        invert_unit_lower(&mut l_inverse).unwrap();
        let mut lt_inverse = l_inverse.clone();
        lt_inverse.transpose();

        let mut d_inverse = d.clone();
        invert_diagonal(&mut d_inverse).unwrap();
        let mut dm = Matrix::new(m.dim(), m.scale(), Orientation::Row).unwrap();
        impose_diagonal(&d_inverse, &mut dm).unwrap();

        lt_inverse.multiply(&dm).unwrap().multiply(&l_inverse).unwrap()
    }

    #[test]
    fn test_block_matches_dense_product() {
        let dim = 9;
        let m = Matrix::from_f64_row_major(dim, 192, Orientation::Column, &random_spd(dim, 42))
            .unwrap();
        let dense = dense_inverse(&m);

        let mut scratch = m.clone();
        let config = PipelineConfig { block_dim: 4 };
        let result = partial_inverse(&mut scratch, &config).unwrap();

        assert_eq!(result.block.dim(), 4);
        assert_eq!(result.diagonal.len(), dim);
        let expected = dense.block(4).unwrap();
        assert!(max_abs_diff(&result.block, &expected) < 1e-45);
    }

    #[test]
    fn test_full_block_is_inverse() {
        let dim = 6;
        let m = Matrix::from_f64_row_major(dim, 160, Orientation::Column, &random_spd(dim, 9))
            .unwrap();
        let mut scratch = m.clone();
        let config = PipelineConfig { block_dim: dim };
        let inverse = partial_inverse(&mut scratch, &config).unwrap().block;

        let product = m.multiply(&inverse).unwrap();
        let identity = Matrix::identity(dim, 160, Orientation::Row).unwrap();
        assert!(max_abs_diff(&product, &identity) < 1e-35);
    }

    #[test]
    fn test_moment_matrix_at_scale_zero_reports_precision_loss() {
        // Decomposes with integer pivots, but every inverse entry is below one
        let mut m = Matrix::new(3, 0, Orientation::Column).unwrap();
        moment_init(&mut m).unwrap();
        let result = partial_inverse(&mut m, &PipelineConfig { block_dim: 3 });
        assert!(matches!(
            result,
            Err(LinalgError::InsufficientPrecision { index: 0 })
        ));
    }

    #[test]
    fn test_moment_matrix_inverse() {
        let dim = 6;
        let mut m = Matrix::new(dim, 512, Orientation::Column).unwrap();
        moment_init(&mut m).unwrap();
        let original = m.clone();

        let result = partial_inverse(&mut m, &PipelineConfig { block_dim: dim }).unwrap();
        assert!(result.diagonal.iter().all(ScaledInteger::is_positive));

        let product = original.multiply(&result.block).unwrap();
        let identity = Matrix::identity(dim, 512, Orientation::Row).unwrap();
        assert!(max_abs_diff(&product, &identity) < 1e-60);
    }

    #[test]
    fn test_smallest_eigenvalue_matches_double_precision() {
        // Small enough that f64 still resolves the spectrum: the direct
        // solve loses about eps * max|M| ~ 3e-6 on an eigenvalue near 1
        let dim = 4;
        let mut m = Matrix::new(dim, 256, Orientation::Column).unwrap();
        moment_init(&mut m).unwrap();
        let direct =
            extremal_eigenvalue(&DenseSymmetricSolver, &m, EigenMode::Smallest).unwrap();

        let result = partial_inverse(&mut m, &PipelineConfig { block_dim: dim }).unwrap();
        let largest_of_inverse =
            extremal_eigenvalue(&DenseSymmetricSolver, &result.block, EigenMode::Largest)
                .unwrap();

        let estimate = 1.0 / largest_of_inverse;
        assert!(
            ((estimate - direct) / direct).abs() < 1e-4,
            "estimate {} vs direct {}",
            estimate,
            direct
        );
    }
}
