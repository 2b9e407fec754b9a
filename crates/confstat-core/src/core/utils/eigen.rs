use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;

const RANK_TOLERANCE: f64 = 1e-10;
const ORTHOGONALITY_TOLERANCE: f64 = 1e-6;

/// Eigenvalues and unit eigenvectors of a real symmetric 3x3 matrix.
///
/// Eigenvalues are sorted in descending order; `vectors[i]` belongs to `values[i]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenDecomposition {
    pub values: [f64; 3],
    pub vectors: [Vector3<f64>; 3],
}

/// Eigen-decomposes a symmetric 3x3 matrix without iteration.
///
/// Eigenvalues come from the trigonometric solution of the characteristic cubic.
/// Eigenvectors are the largest cross product of two rows of `A - λI`; for repeated
/// eigenvalues the rank of `A - λI` drops and an orthonormal basis of its null space
/// is constructed explicitly.
///
/// Only the upper triangle of `matrix` is read.
pub fn symmetric_eigen(matrix: &Matrix3<f64>) -> EigenDecomposition {
    let a = symmetrize(matrix);
    let p1 = a[(0, 1)].powi(2) + a[(0, 2)].powi(2) + a[(1, 2)].powi(2);

    if p1 == 0.0 {
        return diagonal_decomposition(&a);
    }

    let q = a.trace() / 3.0;
    let p2 = (a[(0, 0)] - q).powi(2) + (a[(1, 1)] - q).powi(2) + (a[(2, 2)] - q).powi(2) + 2.0 * p1;
    let p = (p2 / 6.0).sqrt();
    let b = (a - Matrix3::identity() * q) / p;
    let r = b.determinant() / 2.0;

    let phi = if r <= -1.0 {
        PI / 3.0
    } else if r >= 1.0 {
        0.0
    } else {
        r.acos() / 3.0
    };

    let largest = q + 2.0 * p * phi.cos();
    let smallest = q + 2.0 * p * (phi + 2.0 * PI / 3.0).cos();
    let middle = 3.0 * q - largest - smallest;
    let values = [largest, middle, smallest];

    let mut vectors: Vec<Vector3<f64>> = Vec::with_capacity(3);
    for &lambda in &values {
        let v = eigenvector(&a, lambda, &vectors);
        vectors.push(v);
    }

    EigenDecomposition {
        values,
        vectors: [vectors[0], vectors[1], vectors[2]],
    }
}

fn symmetrize(matrix: &Matrix3<f64>) -> Matrix3<f64> {
    let mut a = *matrix;
    a[(1, 0)] = a[(0, 1)];
    a[(2, 0)] = a[(0, 2)];
    a[(2, 1)] = a[(1, 2)];
    a
}

fn diagonal_decomposition(a: &Matrix3<f64>) -> EigenDecomposition {
    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| {
        a[(j, j)]
            .partial_cmp(&a[(i, i)])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let axis = |i: usize| {
        let mut v = Vector3::zeros();
        v[i] = 1.0;
        v
    };
    EigenDecomposition {
        values: order.map(|i| a[(i, i)]),
        vectors: order.map(axis),
    }
}

fn eigenvector(a: &Matrix3<f64>, lambda: f64, found: &[Vector3<f64>]) -> Vector3<f64> {
    let shifted = a - Matrix3::identity() * lambda;
    let rows = [
        shifted.row(0).transpose(),
        shifted.row(1).transpose(),
        shifted.row(2).transpose(),
    ];

    let scale = shifted.norm();
    let best_cross = [
        rows[0].cross(&rows[1]),
        rows[0].cross(&rows[2]),
        rows[1].cross(&rows[2]),
    ]
    .into_iter()
    .max_by(|u, v| {
        u.norm_squared()
            .partial_cmp(&v.norm_squared())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
    .unwrap_or_else(Vector3::zeros);

    if best_cross.norm() > RANK_TOLERANCE * scale * scale {
        return best_cross.normalize();
    }

    // Rank <= 1: λ is (at least) a double eigenvalue.
    let dominant_row = rows
        .into_iter()
        .max_by(|u, v| {
            u.norm_squared()
                .partial_cmp(&v.norm_squared())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or_else(Vector3::zeros);

    if dominant_row.norm() <= RANK_TOLERANCE * a.norm().max(f64::MIN_POSITIVE) {
        return orthogonal_axis(found);
    }

    let normal = dominant_row.normalize();
    if let Some(in_plane) = found
        .iter()
        .find(|f| f.dot(&normal).abs() < ORTHOGONALITY_TOLERANCE)
    {
        return normal.cross(in_plane).normalize();
    }

    let least_aligned = (0..3)
        .min_by(|&i, &j| {
            normal[i]
                .abs()
                .partial_cmp(&normal[j].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0);
    let mut axis = Vector3::zeros();
    axis[least_aligned] = 1.0;
    normal.cross(&axis).normalize()
}

/// First coordinate axis made orthogonal to every vector in `found` (Gram-Schmidt).
fn orthogonal_axis(found: &[Vector3<f64>]) -> Vector3<f64> {
    for i in 0..3 {
        let mut v = Vector3::zeros();
        v[i] = 1.0;
        for f in found {
            let projection = f * f.dot(&v);
            v -= projection;
        }
        if v.norm() > 0.5 {
            return v.normalize();
        }
    }
    Vector3::x()
}
