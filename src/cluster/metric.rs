//! Distance metrics over attribute vectors.

use crate::error::Error;
use ndarray::ArrayView1;
use std::fmt;
use std::str::FromStr;

/// Distance between two attribute vectors of equal length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Distance {
    /// Square root of the sum of squared differences.
    #[default]
    Euclidean,
    /// Sum of absolute differences.
    Manhattan,
    /// Largest absolute difference in any dimension (Chebyshev).
    Max,
}

impl Distance {
    /// Distance between `a` and `b`.
    #[inline]
    pub fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        let diffs = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs());
        match self {
            Distance::Euclidean => scaled_norm(diffs),
            Distance::Manhattan => diffs.sum(),
            Distance::Max => diffs.fold(0.0, f64::max),
        }
    }

    /// Distance between two plain slices.
    pub fn between(&self, a: &[f64], b: &[f64]) -> f64 {
        self.distance(ArrayView1::from(a), ArrayView1::from(b))
    }

    /// Option name as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Distance::Euclidean => "euclidean",
            Distance::Manhattan => "manhattan",
            Distance::Max => "max",
        }
    }
}

impl FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Distance::Euclidean),
            "manhattan" => Ok(Distance::Manhattan),
            "max" | "chebyshev" => Ok(Distance::Max),
            _ => Err(Error::UnknownOption {
                option: "distance",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Euclidean norm of non-negative components, divided through by the largest
/// one so squaring cannot overflow.
fn scaled_norm<I>(components: I) -> f64
where
    I: Iterator<Item = f64> + Clone,
{
    let scale = components.clone().fold(0.0, f64::max);
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    scale
        * components
            .map(|d| {
                let r = d / scale;
                r * r
            })
            .sum::<f64>()
            .sqrt()
}

/// Squared Euclidean distance (k-means inertia, affinity similarities).
#[inline]
pub(crate) fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_on_known_vectors() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 6.0, 3.0];
        assert_eq!(Distance::Euclidean.between(&a, &b), 5.0);
        assert_eq!(Distance::Manhattan.between(&a, &b), 7.0);
        assert_eq!(Distance::Max.between(&a, &b), 4.0);
    }

    #[test]
    fn metrics_are_symmetric_and_zero_on_self() {
        let a = [0.5, -1.5];
        let b = [2.0, 7.25];
        for metric in [Distance::Euclidean, Distance::Manhattan, Distance::Max] {
            assert_eq!(metric.between(&a, &b), metric.between(&b, &a));
            assert_eq!(metric.between(&a, &a), 0.0);
        }
    }

    #[test]
    fn euclidean_survives_large_coordinates() {
        let a = [3e200, 0.0];
        let b = [0.0, 4e200];
        let d = Distance::Euclidean.between(&a, &b);
        approx::assert_relative_eq!(d, 5e200, max_relative = 1e-15);
        assert_eq!(Distance::Euclidean.between(&[1e308], &[-1e308]), f64::INFINITY);
    }

    #[test]
    fn parse_names() {
        assert_eq!("euclidean".parse::<Distance>().unwrap(), Distance::Euclidean);
        assert_eq!("Manhattan".parse::<Distance>().unwrap(), Distance::Manhattan);
        assert_eq!("max".parse::<Distance>().unwrap(), Distance::Max);
        assert_eq!("chebyshev".parse::<Distance>().unwrap(), Distance::Max);
        assert!(matches!(
            "cosine".parse::<Distance>(),
            Err(Error::UnknownOption { option: "distance", .. })
        ));
    }

    #[test]
    fn display_matches_parse() {
        for metric in [Distance::Euclidean, Distance::Manhattan, Distance::Max] {
            assert_eq!(metric.to_string().parse::<Distance>().unwrap(), metric);
        }
    }
}
