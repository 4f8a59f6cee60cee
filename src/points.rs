//! Point matrices and attribute extraction.
//!
//! Every engine in this crate reads its input from a [`Points`] matrix: one row
//! per point, one column per attribute. The matrix is built once, up front,
//! either from plain rows or by running an [`Attributes`] implementation over
//! the caller's items (graph nodes, records, ...). Algorithms never see the
//! original items again.
//!
//! ```rust
//! use nodeclust::{Fields, Points};
//!
//! struct Node {
//!     x: f64,
//!     y: f64,
//! }
//!
//! let nodes = vec![Node { x: 0.0, y: 1.0 }, Node { x: 2.0, y: 3.0 }];
//! let fields = Fields::new().field("x", |n: &Node| n.x).field("y", |n: &Node| n.y);
//!
//! let points = Points::extract(&nodes, &fields).unwrap();
//! assert_eq!(points.len(), 2);
//! assert_eq!(points.dims(), 2);
//! assert_eq!(points.row(1)[0], 2.0);
//! ```

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1};

/// Source of numeric attributes for items of type `T`.
///
/// The number of dimensions is fixed for the whole run; `extract` is called
/// once per `(item, dim)` pair when the point matrix is built.
pub trait Attributes<T: ?Sized> {
    /// Number of attributes (dimensionality of the clustering space).
    fn dims(&self) -> usize;

    /// Attribute `dim` of `item`.
    fn extract(&self, item: &T, dim: usize) -> f64;
}

type Selector<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;

/// An ordered, named list of field selectors.
pub struct Fields<T> {
    names: Vec<String>,
    selectors: Vec<Selector<T>>,
}

impl<T> Fields<T> {
    /// Create an empty field list.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            selectors: Vec::new(),
        }
    }

    /// Append a field. Fields are extracted in insertion order.
    pub fn field<F>(mut self, name: impl Into<String>, selector: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.names.push(name.into());
        self.selectors.push(Box::new(selector));
        self
    }

    /// Field names, in dimension order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<T> Default for Fields<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Fields<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fields").field("names", &self.names).finish()
    }
}

impl<T> Attributes<T> for Fields<T> {
    fn dims(&self) -> usize {
        self.selectors.len()
    }

    fn extract(&self, item: &T, dim: usize) -> f64 {
        (self.selectors[dim])(item)
    }
}

/// Dense `n × d` matrix of point attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct Points {
    data: Array2<f64>,
}

impl Points {
    /// Build a point matrix from rows of equal length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        let d = rows.first().map_or(0, |r| r.as_ref().len());
        for row in rows {
            let row = row.as_ref();
            if row.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: row.len(),
                });
            }
        }
        Self::from_array(Array2::from_shape_fn((n, d), |(i, j)| rows[i].as_ref()[j]))
    }

    /// Build a point matrix by extracting every attribute of every item.
    pub fn extract<T, A>(items: &[T], attributes: &A) -> Result<Self>
    where
        A: Attributes<T> + ?Sized,
    {
        let d = attributes.dims();
        Self::from_array(Array2::from_shape_fn((items.len(), d), |(i, j)| {
            attributes.extract(&items[i], j)
        }))
    }

    /// Wrap an existing matrix (rows are points).
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() > 0 && data.ncols() == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "must be at least 1",
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "attributes",
                message: "all attribute values must be finite",
            });
        }
        Ok(Self { data })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Dimensionality of every point.
    pub fn dims(&self) -> usize {
        self.data.ncols()
    }

    /// Attribute vector of point `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// The underlying matrix.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    /// Observed `(min, max)` of each dimension. Empty when there are no points.
    pub(crate) fn column_bounds(&self) -> Vec<(f64, f64)> {
        if self.is_empty() {
            return Vec::new();
        }
        self.data
            .columns()
            .into_iter()
            .map(|col| {
                col.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_builds_matrix() {
        let points = Points::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points.dims(), 2);
        assert_eq!(points.row(2).to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let result = Points::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn empty_rows_allowed() {
        let rows: Vec<Vec<f64>> = vec![];
        let points = Points::from_rows(&rows).unwrap();
        assert!(points.is_empty());
        assert!(points.column_bounds().is_empty());
    }

    #[test]
    fn zero_dimensional_points_rejected() {
        let rows: Vec<Vec<f64>> = vec![vec![], vec![]];
        assert!(Points::from_rows(&rows).is_err());
    }

    #[test]
    fn non_finite_attribute_rejected() {
        assert!(Points::from_rows(&[vec![1.0, f64::NAN]]).is_err());
        assert!(Points::from_rows(&[vec![f64::INFINITY]]).is_err());
    }

    #[test]
    fn extract_uses_field_order() {
        struct Node {
            a: f64,
            b: f64,
        }
        let nodes = vec![Node { a: 1.0, b: 10.0 }, Node { a: 2.0, b: 20.0 }];
        let fields = Fields::new()
            .field("b", |n: &Node| n.b)
            .field("a", |n: &Node| n.a);

        let points = Points::extract(&nodes, &fields).unwrap();
        assert_eq!(fields.names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(points.row(0).to_vec(), vec![10.0, 1.0]);
        assert_eq!(points.row(1).to_vec(), vec![20.0, 2.0]);
    }

    #[test]
    fn column_bounds_track_min_max() {
        let points =
            Points::from_rows(&[vec![1.0, -3.0], vec![4.0, 2.0], vec![-2.0, 0.5]]).unwrap();
        assert_eq!(points.column_bounds(), vec![(-2.0, 4.0), (-3.0, 2.0)]);
    }
}
