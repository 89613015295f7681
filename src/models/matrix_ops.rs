use faer::Mat;

/// Values of one matrix column at the given row indices.
#[must_use]
pub fn select_column(matrix: &Mat<f64>, column: usize, indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&row| matrix[(row, column)]).collect()
}

/// Copy of a single matrix row.
#[must_use]
pub fn row_values(matrix: &Mat<f64>, row: usize) -> Vec<f64> {
    (0..matrix.ncols()).map(|col| matrix[(row, col)]).collect()
}

#[must_use]
pub fn select_rows(matrix: &Mat<f64>, indices: &[usize]) -> Mat<f64> {
    Mat::from_fn(indices.len(), matrix.ncols(), |i, j| {
        matrix[(indices[i], j)]
    })
}
