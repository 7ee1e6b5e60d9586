pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `vector` to unit length in place. The zero vector is left unchanged.
pub fn normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Dot product of two vectors. Mismatched or empty operands score 0.0,
/// which ranks them below any `min_similarity >= 0` filter.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
