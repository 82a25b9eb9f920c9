use crate::error::{HapGrmError, Result};

/// A dense, row-major matrix of `f64` with bounds-checked access.
///
/// Dimensions are fixed at construction. Element `(i, j)` lives at
/// `i * cols + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Creates a zero-filled `rows x cols` matrix. Both must be positive.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 {
            return Err(HapGrmError::ZeroDimension {
                what: "matrix row count",
            });
        }
        if cols == 0 {
            return Err(HapGrmError::ZeroDimension {
                what: "matrix column count",
            });
        }
        Ok(Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        })
    }

    /// Builds a matrix from row-major `data`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let mut matrix = Self::new(rows, cols)?;
        if data.len() != rows * cols {
            return Err(HapGrmError::DimensionMismatch {
                expected: (rows, cols),
                found: (data.len() / cols, data.len() % cols),
            });
        }
        matrix.data = data;
        Ok(matrix)
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(HapGrmError::MatrixOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let offset = self.offset(row, col)?;
        Ok(self.data[offset])
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut f64> {
        let offset = self.offset(row, col)?;
        Ok(&mut self.data[offset])
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        *self.get_mut(row, col)? = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<&[f64]> {
        let start = self.offset(row, 0)?;
        Ok(&self.data[start..start + self.cols])
    }

    pub fn row_mut(&mut self, row: usize) -> Result<&mut [f64]> {
        let start = self.offset(row, 0)?;
        let cols = self.cols;
        Ok(&mut self.data[start..start + cols])
    }

    /// Iterates over the rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn new_matrix_is_zeroed() {
        let m = DenseMatrix::new(3, 2).unwrap();
        assert_eq!(m.dims(), (3, 2));
        assert_eq!(m.len(), 6);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(m.get(i, j).unwrap(), 0.0);
            }
        }
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 0)]
    #[case(0, 0)]
    fn zero_dimensions_are_rejected(#[case] rows: usize, #[case] cols: usize) {
        assert!(matches!(
            DenseMatrix::new(rows, cols),
            Err(HapGrmError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn values_round_trip() {
        let mut m = DenseMatrix::new(3, 5).unwrap();
        let mut x = 1.0;
        for i in 0..3 {
            for j in 0..5 {
                m.set(i, j, x).unwrap();
                x += 1.0;
            }
        }
        assert_eq!(m.row(1).unwrap(), &[6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(m.as_slice()[14], 15.0);
    }

    #[rstest]
    #[case(4, 3)]
    #[case(3, 5)]
    #[case(3, 2)]
    #[case(2, 5)]
    #[case(usize::MAX, 4)]
    fn out_of_bounds_access_fails(#[case] row: usize, #[case] col: usize) {
        let mut m = DenseMatrix::new(3, 5).unwrap();
        assert!(matches!(
            m.get(row, col),
            Err(HapGrmError::MatrixOutOfBounds { rows: 3, cols: 5, .. })
        ));
        assert!(m.set(row, col, 1.0).is_err());
    }

    #[test]
    fn row_access_is_bounds_checked() {
        let mut m = DenseMatrix::new(2, 3).unwrap();
        m.row_mut(1).unwrap().copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(m.get(1, 2).unwrap(), 3.0);
        assert!(m.row(2).is_err());
        assert_eq!(m.iter_rows().count(), 2);
    }

    #[test]
    fn clone_is_independent() {
        let mut a = DenseMatrix::new(2, 2).unwrap();
        a.set(0, 0, 1.5).unwrap();
        let mut b = a.clone();
        b.set(0, 0, 2.5).unwrap();
        assert_eq!(a.get(0, 0).unwrap(), 1.5);
        assert_eq!(b.get(0, 0).unwrap(), 2.5);
    }

    #[test]
    fn from_vec_checks_length() {
        let m = DenseMatrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
        assert!(matches!(
            DenseMatrix::from_vec(2, 2, vec![1.0; 3]),
            Err(HapGrmError::DimensionMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn fresh_matrix_is_zero_everywhere(rows in 1usize..20, cols in 1usize..20) {
            let m = DenseMatrix::new(rows, cols).unwrap();
            prop_assert_eq!(m.dims(), (rows, cols));
            prop_assert!(m.as_slice().iter().all(|&v| v == 0.0));
        }

        #[test]
        fn written_cell_reads_back(
            rows in 1usize..20,
            cols in 1usize..20,
            r in 0usize..20,
            c in 0usize..20,
            value in proptest::num::f64::ANY,
        ) {
            let mut m = DenseMatrix::new(rows, cols).unwrap();
            let in_bounds = r < rows && c < cols;
            prop_assert_eq!(m.set(r, c, value).is_ok(), in_bounds);
            if in_bounds {
                prop_assert_eq!(m.get(r, c).unwrap().to_bits(), value.to_bits());
            } else {
                prop_assert!(m.get(r, c).is_err());
            }
        }
    }
}
