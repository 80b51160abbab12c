use crate::scoring::vector::FrequencyVector;

/// Cosine similarity between two bag-of-words vectors, scaled to [0, 100].
///
/// Returns 0 when the vectors share no token or either one is empty.
pub fn cosine_similarity(a: &FrequencyVector<'_>, b: &FrequencyVector<'_>) -> f64 {
    // Walk the smaller vector for the intersection.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut shared = 0_usize;
    let mut dot = 0.0_f64;
    for (token, count) in small.iter() {
        if let Some(other) = large.get(token) {
            shared += 1;
            dot += f64::from(count) * f64::from(other);
        }
    }

    if shared == 0 {
        return 0.0;
    }

    let mag_a = a.magnitude();
    let mag_b = b.magnitude();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    // Cauchy–Schwarz bounds this by 100; rounding can push it slightly over.
    (100.0 * dot / (mag_a * mag_b)).clamp(0.0, 100.0)
}
