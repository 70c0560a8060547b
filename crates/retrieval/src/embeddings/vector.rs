//! Embedding vector helpers.

use charla_core::{AppError, AppResult};

/// Ensure the vector has the expected dimension and scale it to unit length.
///
/// Returns the normalized vector and its original norm. Dimension mismatches
/// and non-finite or zero norms are hard failures with no recovery; callers
/// must never pad or truncate vectors to make them fit.
pub fn normalize_embedding(embedding: &[f32], expected_dim: usize) -> AppResult<(Vec<f32>, f32)> {
    if embedding.len() != expected_dim {
        return Err(AppError::Embedding(format!(
            "Embedding dimension {} does not match expected {}",
            embedding.len(),
            expected_dim
        )));
    }

    let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if !norm.is_finite() || norm == 0.0 {
        return Err(AppError::Embedding(
            "Embedding norm must be finite and non-zero".to_string(),
        ));
    }

    let normalized = embedding.iter().map(|x| x / norm).collect();
    Ok((normalized, norm))
}

/// Dot product of two vectors.
///
/// Both sides are unit-normalized before they reach this function, so the
/// result equals cosine similarity.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_embedding_unit_length() {
        let (normalized, norm) = normalize_embedding(&[3.0, 4.0], 2).unwrap();
        assert!((norm - 5.0).abs() < 1e-6);
        let unit_norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((unit_norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_embedding_dimension_mismatch() {
        let result = normalize_embedding(&[1.0, 2.0, 3.0], 768);
        match result {
            Err(e) => assert!(e.to_string().contains("does not match expected 768")),
            Ok(_) => panic!("Expected dimension mismatch error"),
        }
    }

    #[test]
    fn test_normalize_embedding_zero_norm() {
        assert!(normalize_embedding(&[0.0, 0.0], 2).is_err());
    }

    #[test]
    fn test_normalize_embedding_non_finite() {
        assert!(normalize_embedding(&[f32::NAN, 1.0], 2).is_err());
    }

    #[test]
    fn test_dot_product_of_unit_vectors_is_cosine() {
        let (a, _) = normalize_embedding(&[1.0, 0.0], 2).unwrap();
        let (b, _) = normalize_embedding(&[1.0, 1.0], 2).unwrap();
        let cos = dot_product(&a, &b);
        assert!((cos - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }
}
