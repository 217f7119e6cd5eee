//! Conversions between integer state indices and one-hot vectors.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::MdpError;

/// Encodes `index` as a one-hot vector of length `width`.
pub fn to_onehot(index: usize, width: usize) -> Result<Array1<f64>, MdpError> {
    if index >= width {
        return Err(MdpError::IndexOutOfBounds { index, size: width });
    }
    let mut v = Array1::zeros(width);
    v[index] = 1.0;
    Ok(v)
}

/// Encodes a batch of indices as an `N x width` matrix, one one-hot row each.
pub fn to_onehot_batch(indices: &[usize], width: usize) -> Result<Array2<f64>, MdpError> {
    let mut m = Array2::zeros((indices.len(), width));
    for (row, &index) in indices.iter().enumerate() {
        if index >= width {
            return Err(MdpError::IndexOutOfBounds { index, size: width });
        }
        m[[row, index]] = 1.0;
    }
    Ok(m)
}

/// Decodes a state vector back to its integer index via argmax.
///
/// Ties break to the lowest index. Non-degenerate inputs (anything that is
/// not exactly one-hot) are decoded permissively rather than rejected.
pub fn to_index(state: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &value) in state.iter().enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

/// Row-wise [`to_index`] over an `N x width` matrix.
pub fn to_index_batch(states: ArrayView2<'_, f64>) -> Vec<usize> {
    states.axis_iter(Axis(0)).map(to_index).collect()
}
