use serde::Serialize;

use crate::record::FaceRecord;
use crate::vector::{try_normalize, PreparedDotQuery};

/// Minimum cosine similarity accepted as a recognition unless overridden.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.35;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceMatch {
    pub name: String,
    pub personnel_id: Option<String>,
    pub score: f32,
}

/// Finds the stored sample most similar to `query`.
///
/// Stored embeddings are unit-norm and the query is normalized here, so the
/// dot product is the cosine similarity. The running best only moves on a
/// strictly greater score, so on ties the earliest enrolled sample wins.
/// Samples whose dimension differs from the query are skipped.
///
/// The threshold check allows for f32 rounding in the dot product, so a
/// query equal to a stored sample matches at `threshold = 1.0`. The reported
/// score is clamped to `[-1, 1]`.
///
/// Returns `None` when the store is empty, the query cannot be normalized, or
/// the best score is below `threshold`.
pub fn best_match(records: &[FaceRecord], query: &[f32], threshold: f32) -> Option<FaceMatch> {
    if records.is_empty() {
        return None;
    }
    let query = try_normalize(query)?;
    let prepared = PreparedDotQuery::new(&query);

    let mut best: Option<(&FaceRecord, f32)> = None;
    for record in records {
        let Some(score) = prepared.dot(&record.embedding) else {
            continue;
        };
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((record, score)),
        }
    }

    let (record, score) = best?;
    if score + score_tolerance(query.len()) >= threshold {
        Some(FaceMatch {
            name: record.name.clone(),
            personnel_id: record.personnel_id.clone(),
            score: score.clamp(-1.0, 1.0),
        })
    } else {
        None
    }
}

/// Rounding bound of an f32 dot product over `dimension` terms, with slack
/// for the lane reduction and the normalization of both sides.
fn score_tolerance(dimension: usize) -> f32 {
    f32::EPSILON * (dimension + 8) as f32
}
