//! Vector similarity.

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 on length mismatch, empty input, or a zero vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |acc, (x, y)| {
        let (x, y) = (f64::from(*x), f64::from(*y));
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    (dot / denom) as f32
}
