//! Distance and ordering primitive for similarity search.
//!
//! One implementation of the metric serves both the ranking query and any
//! diagnostic output, so what gets logged can never drift from what gets
//! returned.

use std::cmp::Ordering;

use crate::models::CatalogItem;

/// Upper bound of cosine distance; assigned to zero-magnitude or
/// dimension-mismatched vectors so they rank behind every meaningful match.
pub const MAX_DISTANCE: f32 = 2.0;

/// Sort key for items with no stored embedding: strictly after every item
/// that has one.
const UNRANKED: f32 = f32::MAX;

/// Cosine similarity of two equal-dimension vectors.
///
/// Returns `-1.0` (the minimum) for zero-magnitude or mismatched inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return -1.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return -1.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine distance: `1 - cosine_similarity`. Smaller means more similar.
///
/// Degenerate inputs (zero magnitude, dimension mismatch) yield
/// [`MAX_DISTANCE`].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, MAX_DISTANCE)
}

/// Order items by distance to the query vector, ascending.
///
/// Ties break by ascending id, and items without a stored embedding sort
/// after every embedded item (also by id), so repeated calls over the same
/// data always paginate identically.
pub fn rank(query: &[f32], items: Vec<CatalogItem>) -> Vec<(CatalogItem, f32)> {
    let mut scored: Vec<(CatalogItem, f32)> = items
        .into_iter()
        .map(|item| {
            let distance = match item.embedding.as_deref() {
                Some(embedding) => cosine_distance(query, embedding),
                None => UNRANKED,
            };
            (item, distance)
        })
        .collect();

    scored.sort_by(|(a, da), (b, db)| {
        da.partial_cmp(db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn item(id: i32, embedding: Option<Vec<f32>>) -> CatalogItem {
        let now = Utc::now();
        CatalogItem {
            id,
            name: format!("item-{id}"),
            description: String::new(),
            price: Decimal::ONE,
            picture_file_name: None,
            catalog_brand_id: 1,
            catalog_type_id: 1,
            available_stock: 0,
            restock_threshold: 0,
            max_stock_threshold: 0,
            embedding,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_distance_opposite_vectors() {
        let dist = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((dist - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_vectors_get_max_distance() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 1.0]), MAX_DISTANCE);
        assert_eq!(cosine_distance(&[1.0], &[1.0, 2.0]), MAX_DISTANCE);
        assert_eq!(cosine_distance(&[], &[]), MAX_DISTANCE);
    }

    #[test]
    fn test_rank_orders_by_distance() {
        let query = vec![1.0, 0.0];
        let items = vec![
            item(1, Some(vec![0.0, 1.0])),  // orthogonal, distance 1
            item(2, Some(vec![1.0, 0.0])),  // identical, distance 0
            item(3, Some(vec![-1.0, 0.0])), // opposite, distance 2
        ];

        let ranked = rank(&query, items);
        let ids: Vec<i32> = ranked.iter().map(|(i, _)| i.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        // Distances are non-decreasing
        for pair in ranked.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn test_rank_breaks_ties_by_id() {
        let query = vec![1.0, 0.0];
        let items = vec![
            item(9, Some(vec![1.0, 0.0])),
            item(3, Some(vec![1.0, 0.0])),
            item(5, Some(vec![2.0, 0.0])), // same direction, same distance
        ];

        let ranked = rank(&query, items);
        let ids: Vec<i32> = ranked.iter().map(|(i, _)| i.id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn test_rank_puts_missing_embeddings_last() {
        let query = vec![1.0, 0.0];
        let items = vec![
            item(1, None),
            item(2, Some(vec![-1.0, 0.0])), // worst real distance
            item(3, None),
        ];

        let ranked = rank(&query, items);
        let ids: Vec<i32> = ranked.iter().map(|(i, _)| i.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
