use std::io::{self, Write};

use itertools::Itertools;

use crate::matrix::DenseMatrix;

/// Writes `matrix` as comma-separated rows with five decimals per value.
pub fn write_matrix<W: Write>(matrix: &DenseMatrix, mut out: W) -> io::Result<()> {
    for row in matrix.iter_rows() {
        writeln!(
            out,
            "{}",
            row.iter().format_with(",", |v, f| f(&format_args!("{:.5}", v)))
        )?;
    }
    out.flush()
}
