use crate::errors::StorageError;
use crate::migrate::migrate_legacy;
use crate::models::{Profile, StateDocument, now_millis};
use crate::normalize::normalize_str;
use crate::storage::{LEGACY_SLOTS, PRIMARY_SLOT, SlotStore};
use tracing::{debug, error, info};

/// Sole owner of the live [`StateDocument`] and the slots it persists to.
#[derive(Debug)]
pub struct StateStore<S: SlotStore> {
    slots: S,
    doc: StateDocument,
}

impl<S: SlotStore> StateStore<S> {
    /// Loads the primary slot, falling back to legacy slots and then to a
    /// seeded document. Never fails.
    pub fn load(slots: S) -> Self {
        let doc = load_document(&slots);
        Self { slots, doc }
    }

    pub fn document(&self) -> &StateDocument {
        &self.doc
    }

    pub fn current_profile(&self) -> &Profile {
        self.doc.current_profile()
    }

    pub(crate) fn current_profile_mut(&mut self) -> &mut Profile {
        self.doc.current_profile_mut()
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Stamps `updatedAt` and writes the document to the primary slot.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.doc.updated_at = now_millis();
        let payload = serde_json::to_string_pretty(&self.doc)?;
        self.slots.save_raw(PRIMARY_SLOT, &payload).inspect_err(|err| {
            error!("failed to persist state: {err}");
        })
    }

    /// Swaps in `doc` as a whole, then saves.
    pub fn replace_wholesale(&mut self, doc: StateDocument) -> Result<(), StorageError> {
        self.doc = doc;
        info!(
            habits = self.doc.current_profile().habits.len(),
            days = self.doc.current_profile().completions.len(),
            "replaced state document"
        );
        self.save()
    }
}

fn load_document(slots: &dyn SlotStore) -> StateDocument {
    match slots.load_raw(PRIMARY_SLOT) {
        Ok(Some(raw)) => match normalize_str(&raw) {
            Some(doc) => return doc,
            None => error!("state in {PRIMARY_SLOT} is unusable, trying legacy slots"),
        },
        Ok(None) => debug!("no state in {PRIMARY_SLOT}"),
        Err(err) => error!("failed to read state: {err}"),
    }

    if let Some(doc) = migrate_legacy(slots, &LEGACY_SLOTS) {
        return doc;
    }

    info!("starting from default habits");
    StateDocument::seeded(now_millis())
}
