use crate::error::{AppError, Result};

/// Cosine similarity between two equal-length vectors, in `[-1, 1]`.
///
/// Accumulates in `f64`. The denominator is `sqrt(|a|² · |b|²)` so that
/// `score(v, v)` is exactly `1.0` and `score(a, b) == score(b, a)` bit for bit.
pub fn score(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(AppError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 || !denominator.is_finite() || !dot.is_finite() {
        return Err(AppError::DegenerateVector);
    }

    Ok((dot / denominator).clamp(-1.0, 1.0))
}

/// Whether `score` clears `threshold`. Equality does not.
pub fn accept(score: f64, threshold: f64) -> bool {
    score > threshold
}

/// Rejects vectors that can never be scored.
pub fn ensure_scorable(vector: &[f32]) -> Result<()> {
    if vector.iter().any(|c| !c.is_finite()) {
        return Err(AppError::Validation("Vector components must be finite".to_string()));
    }
    if vector.iter().all(|c| *c == 0.0) {
        return Err(AppError::DegenerateVector);
    }
    Ok(())
}
