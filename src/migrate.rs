use crate::errors::StorageError;
use crate::models::StateDocument;
use crate::normalize::normalize_str;
use crate::score::pick_best;
use crate::storage::{RECOVERY_MARKER, SlotStore};
use tracing::{debug, info, warn};

/// Returns the first slot in `slot_names` whose content normalizes.
///
/// Slots are tried in the given order and not compared with each other.
/// Missing, unreadable and invalid slots are skipped.
pub fn migrate_legacy(slots: &dyn SlotStore, slot_names: &[&str]) -> Option<StateDocument> {
    for &slot in slot_names {
        let raw = match slots.load_raw(slot) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => continue,
            Err(err) => {
                warn!("skipping legacy slot {slot}: {err}");
                continue;
            }
        };

        match normalize_str(&raw) {
            Some(doc) => {
                info!("migrated state from legacy slot {slot}");
                return Some(doc);
            }
            None => debug!("legacy slot {slot} does not hold a usable document"),
        }
    }
    None
}

/// Scans every slot named like this application's data and returns the
/// best scoring document among those that normalize.
///
/// Unreadable or invalid slots are skipped; failing to list the slots is not.
pub fn find_best_candidate(slots: &dyn SlotStore) -> Result<Option<StateDocument>, StorageError> {
    let mut candidates = Vec::new();
    for slot in slots.list()? {
        if !slot.contains(RECOVERY_MARKER) {
            continue;
        }
        match slots.load_raw(&slot) {
            Ok(Some(raw)) => match normalize_str(&raw) {
                Some(doc) => candidates.push(doc),
                None => debug!("slot {slot} is not a recovery candidate"),
            },
            Ok(None) => {}
            Err(err) => warn!("skipping slot {slot}: {err}"),
        }
    }

    let found = candidates.len();
    let best = pick_best(candidates);
    if best.is_some() {
        info!("picked recovery candidate out of {found}");
    }
    Ok(best)
}
