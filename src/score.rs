use crate::models::StateDocument;

/// Weight of one recorded day, in timestamp milliseconds.
const DAY_WEIGHT: i64 = 1000;

/// Recency plus history volume. A document with more recorded days
/// outranks a slightly newer one with less.
pub fn score(doc: &StateDocument) -> i64 {
    let days = doc.profiles.me.completions.len() as i64;
    doc.updated_at.max(0).saturating_add(days.saturating_mul(DAY_WEIGHT))
}

/// The highest scoring document. Ties go to the earliest one.
pub fn pick_best(docs: Vec<StateDocument>) -> Option<StateDocument> {
    let mut best: Option<(i64, StateDocument)> = None;
    for doc in docs {
        let candidate = score(&doc);
        match &best {
            Some((top, _)) if *top >= candidate => {}
            _ => best = Some((candidate, doc)),
        }
    }
    best.map(|(_, doc)| doc)
}
