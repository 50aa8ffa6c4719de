//! Spectral machinery: symmetric eigensolver and network distance.
//!
//! The eigensolver is a cyclic Jacobi sweep, plenty for the matrix sizes
//! discourse networks reach, and it degrades gracefully: an all-zero or
//! disconnected matrix simply yields an all-zero spectrum instead of failing.

use ndarray::Array2;

/// Dissimilarity between the full network and a candidate induced network,
/// both on the same n × n dimension.
///
/// Pluggable: the penalized-spectral formulation is the default, but the
/// metric itself is a seam, not a constant.
pub trait GraphDistance {
    fn distance(&self, full_spectrum: &[f64], candidate: &Array2<f64>) -> f64;
}

/// Euclidean (L2) distance between sorted eigenvalue spectra.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralL2;

impl GraphDistance for SpectralL2 {
    fn distance(&self, full_spectrum: &[f64], candidate: &Array2<f64>) -> f64 {
        let spectrum = eigenvalues_symmetric(candidate);
        full_spectrum
            .iter()
            .zip(&spectrum)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Eigenvalues of a symmetric matrix, ascending, via cyclic Jacobi rotations.
///
/// The input is treated as symmetric; only the upper triangle drives the
/// rotations. Converges when the off-diagonal Frobenius mass drops below
/// `1e-12` relative to the diagonal, capped at 64 sweeps.
pub fn eigenvalues_symmetric(matrix: &Array2<f64>) -> Vec<f64> {
    let n = matrix.nrows();
    debug_assert_eq!(n, matrix.ncols());
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![matrix[[0, 0]]];
    }

    let mut a = matrix.clone();
    for _sweep in 0..64 {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= 1e-24 {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() <= 1e-15 {
                    continue;
                }
                let app = a[[p, p]];
                let aqq = a[[q, q]];

                // Rotation angle annihilating a[p][q].
                let theta = (aqq - app) / (2.0 * apq);
                let t = {
                    let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                    sign / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for i in 0..n {
                    let aip = a[[i, p]];
                    let aiq = a[[i, q]];
                    a[[i, p]] = c * aip - s * aiq;
                    a[[i, q]] = s * aip + c * aiq;
                }
                for i in 0..n {
                    let api = a[[p, i]];
                    let aqi = a[[q, i]];
                    a[[p, i]] = c * api - s * aqi;
                    a[[q, i]] = s * api + c * aqi;
                }
            }
        }
    }

    let mut eigenvalues: Vec<f64> = (0..n).map(|i| a[[i, i]]).collect();
    eigenvalues.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    eigenvalues
}

/// The induced backbone network: the full matrix with every redundant
/// node's incident weights zeroed. Same dimension as the input, so spectra
/// stay directly comparable.
pub fn induced_network(full: &Array2<f64>, in_backbone: &[bool]) -> Array2<f64> {
    let n = full.nrows();
    let mut out = full.clone();
    for i in 0..n {
        if !in_backbone[i] {
            for j in 0..n {
                out[[i, j]] = 0.0;
                out[[j, i]] = 0.0;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_matrix_has_zero_spectrum() {
        let m = Array2::<f64>::zeros((4, 4));
        let eig = eigenvalues_symmetric(&m);
        assert_eq!(eig.len(), 4);
        assert!(eig.iter().all(|&l| l == 0.0));
    }

    #[test]
    fn diagonal_matrix_returns_sorted_diagonal() {
        let m = array![[3.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]];
        let eig = eigenvalues_symmetric(&m);
        assert!(close(eig[0], 1.0) && close(eig[1], 2.0) && close(eig[2], 3.0));
    }

    #[test]
    fn two_by_two_known_spectrum() {
        // [[0,1],[1,0]] has eigenvalues ±1.
        let m = array![[0.0, 1.0], [1.0, 0.0]];
        let eig = eigenvalues_symmetric(&m);
        assert!(close(eig[0], -1.0) && close(eig[1], 1.0));
    }

    #[test]
    fn path_graph_spectrum() {
        // P3 adjacency eigenvalues: -√2, 0, √2.
        let m = array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
        let eig = eigenvalues_symmetric(&m);
        let r2 = 2.0_f64.sqrt();
        assert!(close(eig[0], -r2) && close(eig[1], 0.0) && close(eig[2], r2));
    }

    #[test]
    fn trace_is_preserved() {
        let m = array![[2.0, -1.0, 0.5], [-1.0, 3.0, 1.0], [0.5, 1.0, -2.0]];
        let eig = eigenvalues_symmetric(&m);
        let trace: f64 = 2.0 + 3.0 - 2.0;
        assert!(close(eig.iter().sum::<f64>(), trace));
    }

    #[test]
    fn identical_networks_have_zero_distance() {
        let m = array![[0.0, 1.0], [1.0, 0.0]];
        let spectrum = eigenvalues_symmetric(&m);
        assert!(close(SpectralL2.distance(&spectrum, &m), 0.0));
    }

    #[test]
    fn induced_network_zeroes_redundant_rows_and_cols() {
        let m = array![[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [2.0, 3.0, 0.0]];
        let induced = induced_network(&m, &[true, false, true]);
        assert_eq!(induced[[0, 1]], 0.0);
        assert_eq!(induced[[1, 2]], 0.0);
        assert_eq!(induced[[2, 1]], 0.0);
        assert_eq!(induced[[0, 2]], 2.0); // backbone ties keep original weights
        assert_eq!(induced.nrows(), 3); // dimension preserved for spectra
    }

    #[test]
    fn disconnected_matrix_does_not_panic() {
        let mut m = Array2::<f64>::zeros((5, 5));
        m[[0, 1]] = 1.0;
        m[[1, 0]] = 1.0;
        let eig = eigenvalues_symmetric(&m);
        assert_eq!(eig.len(), 5);
        assert!(eig.iter().all(|l| l.is_finite()));
    }
}
