use std::error::Error;
use std::fmt;
use wide::f32x8;

/// Error type for vector validation and normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorError {
    /// Returned when the vector has no components.
    EmptyVector,
    /// Returned when the Euclidean norm is zero, so the vector has no direction.
    ZeroNorm,
    /// Returned when a component is NaN or +/-Inf.
    NonFinite { index: usize, value: f32 },
    /// Returned when two vectors do not share the same dimension.
    DimensionMismatch { left: usize, right: usize },
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyVector => write!(f, "vector is empty"),
            Self::ZeroNorm => write!(f, "vector has zero norm and cannot be normalized"),
            Self::NonFinite { index, value } => {
                write!(f, "non-finite value at index {index}: {value}")
            }
            Self::DimensionMismatch { left, right } => {
                write!(f, "dimension mismatch: left={left}, right={right}")
            }
        }
    }
}

impl Error for VectorError {}

/// Returns the first NaN or infinite component, if any.
pub fn first_non_finite(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
}

/// Computes the Euclidean norm.
///
/// Squares are accumulated in `f64` so that very small or very large
/// components neither underflow to zero nor overflow to infinity.
pub fn euclidean_norm(values: &[f32]) -> f64 {
    values
        .iter()
        .map(|value| {
            let value = f64::from(*value);
            value * value
        })
        .sum::<f64>()
        .sqrt()
}

/// Scales `values` to unit Euclidean norm.
pub fn normalize(values: &[f32]) -> Result<Vec<f32>, VectorError> {
    if values.is_empty() {
        return Err(VectorError::EmptyVector);
    }
    if let Some((index, value)) = first_non_finite(values) {
        return Err(VectorError::NonFinite { index, value });
    }

    let norm = euclidean_norm(values);
    if norm <= 0.0 || !norm.is_finite() {
        return Err(VectorError::ZeroNorm);
    }

    Ok(values
        .iter()
        .map(|value| (f64::from(*value) / norm) as f32)
        .collect())
}

/// Like [`normalize`], but reports any failure as `None`.
pub fn try_normalize(values: &[f32]) -> Option<Vec<f32>> {
    normalize(values).ok()
}

/// Computes the dot product between two same-length vectors.
pub fn dot_product(left: &[f32], right: &[f32]) -> Result<f32, VectorError> {
    if left.is_empty() || right.is_empty() {
        return Err(VectorError::EmptyVector);
    }
    if left.len() != right.len() {
        return Err(VectorError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(dot_product_unchecked(left, right))
}

/// Computes the dot product without runtime validation.
///
/// Callers must ensure both vectors are non-empty and have the same length.
pub fn dot_product_unchecked(left: &[f32], right: &[f32]) -> f32 {
    debug_assert!(!left.is_empty());
    debug_assert_eq!(left.len(), right.len());

    let mut left_chunks = left.chunks_exact(SIMD_WIDTH);
    let mut right_chunks = right.chunks_exact(SIMD_WIDTH);
    let mut simd_sum = f32x8::ZERO;
    for (left_chunk, right_chunk) in left_chunks.by_ref().zip(right_chunks.by_ref()) {
        simd_sum += load_f32x8(left_chunk) * load_f32x8(right_chunk);
    }

    let mut scalar_sum = 0.0f32;
    for (&left_value, &right_value) in left_chunks.remainder().iter().zip(right_chunks.remainder())
    {
        scalar_sum += left_value * right_value;
    }

    simd_sum.reduce_add() + scalar_sum
}

const SIMD_WIDTH: usize = 8;

/// Pre-packed query representation for scanning many stored embeddings.
#[derive(Debug, Clone)]
pub struct PreparedDotQuery {
    len: usize,
    simd_query: Vec<f32x8>,
    tail: [f32; SIMD_WIDTH],
    tail_len: usize,
}

impl PreparedDotQuery {
    pub fn new(query: &[f32]) -> Self {
        let mut chunks = query.chunks_exact(SIMD_WIDTH);
        let simd_query = chunks.by_ref().map(load_f32x8).collect();
        let remainder = chunks.remainder();

        let mut tail = [0.0f32; SIMD_WIDTH];
        tail[..remainder.len()].copy_from_slice(remainder);

        Self {
            len: query.len(),
            simd_query,
            tail,
            tail_len: remainder.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Computes the dot product against a vector of the same length.
    pub fn dot_unchecked(&self, right: &[f32]) -> f32 {
        debug_assert_eq!(right.len(), self.len);
        let simd_prefix_len = self.simd_query.len() * SIMD_WIDTH;

        let mut simd_sum = f32x8::ZERO;
        for (query_v, right_chunk) in self
            .simd_query
            .iter()
            .zip(right[..simd_prefix_len].chunks_exact(SIMD_WIDTH))
        {
            simd_sum += *query_v * load_f32x8(right_chunk);
        }

        let mut scalar_sum = 0.0f32;
        let right_tail = &right[simd_prefix_len..];
        for (index, right_value) in right_tail.iter().enumerate().take(self.tail_len) {
            scalar_sum += self.tail[index] * *right_value;
        }

        simd_sum.reduce_add() + scalar_sum
    }

    /// Computes the dot product, or `None` when the lengths differ.
    pub fn dot(&self, right: &[f32]) -> Option<f32> {
        if right.len() != self.len || self.len == 0 {
            return None;
        }
        Some(self.dot_unchecked(right))
    }
}

fn load_f32x8(values: &[f32]) -> f32x8 {
    debug_assert_eq!(values.len(), SIMD_WIDTH);
    f32x8::from([
        values[0], values[1], values[2], values[3], values[4], values[5], values[6], values[7],
    ])
}

#[cfg(test)]
mod tests;
