use ndarray::{Data, prelude::*};

use crate::{MlErr, Result};

/// Upper bound on the amount of classes a label vector may describe.
pub const MAX_CLASSES: usize = 1 << 16;

/// Sums every row of `m`.
pub fn row_sums(m: ArrayView2<f64>) -> Array1<f64> {
    m.sum_axis(Axis(1))
}

/// Sums every column of `m`.
pub fn col_sums(m: ArrayView2<f64>) -> Array1<f64> {
    m.sum_axis(Axis(0))
}

/// Returns the maximum of every row of `m`.
///
/// A row with no columns has `f64::NEG_INFINITY` as its maximum.
pub fn row_max(m: ArrayView2<f64>) -> Array1<f64> {
    m.fold_axis(Axis(1), f64::NEG_INFINITY, |&acc, &v| acc.max(v))
}

/// Returns the maximum of every column of `m`.
///
/// A column with no rows has `f64::NEG_INFINITY` as its maximum.
pub fn col_max(m: ArrayView2<f64>) -> Array1<f64> {
    m.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v))
}

/// Finds the index of the maximum value of every row.
///
/// # Arguments
/// * `m` - The matrix to scan.
///
/// # Returns
/// The column index of each row's maximum, the lowest index wins on ties. Fails if `m` has
/// rows but no columns.
pub fn row_argmax(m: ArrayView2<f64>) -> Result<Array1<usize>> {
    if m.ncols() == 0 && m.nrows() > 0 {
        return Err(MlErr::EmptyDimension { what: "row_argmax" });
    }

    let indices = m
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect();

    Ok(indices)
}

/// Subtracts `max_vals[i]` from every element of the `i`-th row.
///
/// **Mutates `m`**, its previous values are lost.
///
/// # Arguments
/// * `m` - The matrix to modify.
/// * `max_vals` - One value per row of `m`.
pub fn subtract_row_max(m: &mut Array2<f64>, max_vals: ArrayView1<f64>) -> Result<()> {
    if max_vals.len() != m.nrows() {
        return Err(MlErr::ShapeMismatch {
            what: "row max values",
            got: max_vals.len(),
            expected: m.nrows(),
        });
    }

    for (mut row, &mx) in m.rows_mut().into_iter().zip(max_vals.iter()) {
        row -= mx;
    }

    Ok(())
}

/// Subtracts `max_vals[j]` from every element of the `j`-th column.
///
/// **Mutates `m`**, its previous values are lost.
pub fn subtract_col_max(m: &mut Array2<f64>, max_vals: ArrayView1<f64>) -> Result<()> {
    if max_vals.len() != m.ncols() {
        return Err(MlErr::ShapeMismatch {
            what: "column max values",
            got: max_vals.len(),
            expected: m.ncols(),
        });
    }

    for (mut col, &mx) in m.columns_mut().into_iter().zip(max_vals.iter()) {
        col -= mx;
    }

    Ok(())
}

/// Clamps every element of `a` into `[lower, upper]`, returning a new array. NaN stays NaN.
///
/// # Panics
/// If `lower > upper` or either bound is NaN.
pub fn clip<S, D>(a: &ArrayBase<S, D>, lower: f64, upper: f64) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    a.mapv(|v| v.clamp(lower, upper))
}

/// Tiles `v` into `n_rows` identical rows.
pub fn broadcast_row_vector(v: ArrayView1<f64>, n_rows: usize) -> Array2<f64> {
    Array2::from_shape_fn((n_rows, v.len()), |(_, j)| v[j])
}

/// Infers the amount of classes as `max(labels) + 1`, `0` for no labels.
///
/// # Returns
/// An error if the greatest label is not lower than `MAX_CLASSES`.
pub fn infer_classes(labels: ArrayView1<usize>) -> Result<usize> {
    let Some((sample, &label)) = labels.iter().enumerate().max_by_key(|(_, l)| **l) else {
        return Ok(0);
    };

    match label.checked_add(1) {
        Some(classes) if classes <= MAX_CLASSES => Ok(classes),
        _ => Err(MlErr::LabelOutOfRange {
            sample,
            label,
            classes: MAX_CLASSES,
        }),
    }
}

/// Expands class indices into one-hot rows, with `max(labels) + 1` columns.
///
/// # Returns
/// An error if the inferred amount of classes exceeds `MAX_CLASSES`.
pub fn one_hot(labels: ArrayView1<usize>) -> Result<Array2<f64>> {
    let classes = infer_classes(labels)?;
    Ok(fill_one_hot(labels, classes))
}

/// Expands class indices into one-hot rows with exactly `classes` columns.
///
/// # Returns
/// An error if any label is not lower than `classes`.
pub fn one_hot_with_classes(labels: ArrayView1<usize>, classes: usize) -> Result<Array2<f64>> {
    if let Some((sample, &label)) = labels.iter().enumerate().find(|(_, l)| **l >= classes) {
        return Err(MlErr::LabelOutOfRange {
            sample,
            label,
            classes,
        });
    }

    Ok(fill_one_hot(labels, classes))
}

fn fill_one_hot(labels: ArrayView1<usize>, classes: usize) -> Array2<f64> {
    let mut encoded = Array2::zeros((labels.len(), classes));
    for (i, &label) in labels.iter().enumerate() {
        encoded[[i, label]] = 1.0;
    }

    encoded
}

/// Arithmetic mean of `values`, `0.0` when there are none.
pub fn mean<T>(values: ArrayView1<T>) -> f64
where
    T: Copy + Into<f64>,
{
    if values.is_empty() {
        return 0.0;
    }

    values.iter().map(|&v| v.into()).sum::<f64>() / values.len() as f64
}

/// Compares `a` and `b` elementwise, yielding `1` where they are equal and `0` elsewhere.
///
/// # Returns
/// An error if their lengths differ.
pub fn equals_mask<T: PartialEq>(a: ArrayView1<T>, b: ArrayView1<T>) -> Result<Array1<u8>> {
    if a.len() != b.len() {
        return Err(MlErr::ShapeMismatch {
            what: "compared sequences",
            got: b.len(),
            expected: a.len(),
        });
    }

    Ok(a.iter().zip(b.iter()).map(|(x, y)| u8::from(x == y)).collect())
}

/// Builds a matrix out of nested rows, all of which must have the same length.
pub fn to_dense(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(row) = rows.iter().find(|row| row.len() != ncols) {
        return Err(MlErr::ShapeMismatch {
            what: "nested row",
            got: row.len(),
            expected: ncols,
        });
    }

    Ok(Array2::from_shape_fn((rows.len(), ncols), |(i, j)| {
        rows[i][j]
    }))
}

/// Splits a matrix back into nested rows.
pub fn to_nested(m: ArrayView2<f64>) -> Vec<Vec<f64>> {
    m.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Converts float encoded class indices (as they come out of JSON payloads) into `usize`.
///
/// # Returns
/// An error for the first value that isn't a whole number in `[0, MAX_CLASSES)`.
pub fn labels_from_f64(values: &[f64]) -> Result<Array1<usize>> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            if (0.0..MAX_CLASSES as f64).contains(&value) && value.fract() == 0.0 {
                Ok(value as usize)
            } else {
                Err(MlErr::InvalidLabel { index, value })
            }
        })
        .collect()
}
