use crate::error::{Error, Result};
use ndarray::Array2;
use rand::prelude::*;

/// Decimal places used by the rounded-equality convergence tests.
pub(crate) const CONVERGENCE_DECIMALS: i32 = 4;

/// Seeded RNG when `seed` is set, thread RNG otherwise.
pub(crate) fn make_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(rand::rng()),
    }
}

#[inline]
pub(crate) fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

/// Element-wise equality after rounding both sides to [`CONVERGENCE_DECIMALS`].
pub(crate) fn unchanged_rounded(previous: &Array2<f64>, current: &Array2<f64>) -> bool {
    previous.shape() == current.shape()
        && previous
            .iter()
            .zip(current.iter())
            .all(|(a, b)| round_to(*a, CONVERGENCE_DECIMALS) == round_to(*b, CONVERGENCE_DECIMALS))
}

pub(crate) fn check_max_iterations(max_iterations: usize) -> Result<()> {
    if max_iterations == 0 {
        return Err(Error::InvalidParameter {
            name: "max_iterations",
            message: "must be at least 1",
        });
    }
    Ok(())
}

pub(crate) fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::InvalidParameter {
            name: "k",
            message: "must be at least 1",
        });
    }
    Ok(())
}

pub(crate) fn check_k_fits(k: usize, n: usize) -> Result<()> {
    if k > n {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rounding_to_four_places() {
        assert_eq!(round_to(1.234_56, 4), 1.2346);
        assert_eq!(round_to(-0.000_04, 4), -0.0);
    }

    #[test]
    fn rounded_comparison_ignores_tiny_moves() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.000_01, 2.0], [3.0, 3.999_99]];
        let c = array![[1.001, 2.0], [3.0, 4.0]];
        assert!(unchanged_rounded(&a, &b));
        assert!(!unchanged_rounded(&a, &c));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = make_rng(Some(9));
        let mut b = make_rng(Some(9));
        let xs: Vec<u64> = (0..4).map(|_| a.random()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }
}
