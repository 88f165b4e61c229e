//! Known remote peers.
//!
//! A record is created the first time any frame references a peer and is
//! destroyed in full on disconnect, together with all of that peer's shadow
//! objects.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;

use tracing::info;

use crate::consts::DEFAULT_COLOR;
use crate::lifecycle::retract_all;
use crate::model::{AnimatedObject, Slots, live_count};
use crate::scene::Scene;

/// Remote peer identifier, as assigned by the relay.
pub type ClientId = String;

/// Local view of one remote peer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    /// Display color.
    pub color: String,
    /// Shadow copy of the peer's object array, slot for slot.
    pub objects: Slots<AnimatedObject>,
}

impl Default for ClientRecord {
    fn default() -> Self {
        Self { color: DEFAULT_COLOR.to_owned(), objects: Vec::new() }
    }
}

/// Partial update applied by [`ClientRegistry::upsert`].
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub color: Option<String>,
}

/// Presence entry for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub client_id: ClientId,
    pub color: String,
}

#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, ClientRecord>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the record on first reference, then apply `patch`.
    pub fn upsert(&mut self, client_id: &str, patch: ClientPatch) -> &mut ClientRecord {
        let record = self.clients.entry(client_id.to_owned()).or_insert_with(|| {
            info!(%client_id, "registry: new client");
            ClientRecord::default()
        });
        if let Some(color) = patch.color {
            record.color = color;
        }
        record
    }

    /// Delete the record and destroy all of its shadows. Returns how many
    /// shadows were live; `None` if the client was unknown.
    pub fn remove(&mut self, client_id: &str, scene: &mut dyn Scene) -> Option<usize> {
        let mut record = self.clients.remove(client_id)?;
        let destroyed = retract_all(&mut record.objects, scene);
        info!(%client_id, destroyed, "registry: client removed");
        Some(destroyed)
    }

    /// Remove every client. Returns how many shadows were destroyed.
    pub fn clear(&mut self, scene: &mut dyn Scene) -> usize {
        let ids: Vec<ClientId> = self.clients.keys().cloned().collect();
        ids.iter().filter_map(|id| self.remove(id, scene)).sum()
    }

    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<&ClientRecord> {
        self.clients.get(client_id)
    }

    pub fn get_mut(&mut self, client_id: &str) -> Option<&mut ClientRecord> {
        self.clients.get_mut(client_id)
    }

    #[must_use]
    pub fn contains(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Known client ids, sorted.
    #[must_use]
    pub fn client_ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.clients.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Presence entries sorted by client id.
    #[must_use]
    pub fn presence(&self) -> Vec<Presence> {
        self.client_ids()
            .into_iter()
            .filter_map(|client_id| {
                let color = self.clients.get(&client_id)?.color.clone();
                Some(Presence { client_id, color })
            })
            .collect()
    }

    /// Live shadow objects across all clients.
    #[must_use]
    pub fn shadow_count(&self) -> usize {
        self.clients.values().map(|r| live_count(&r.objects)).sum()
    }

    /// Iterate every client's shadow array mutably, for the animation tick.
    pub fn shadows_mut(&mut self) -> impl Iterator<Item = &mut Slots<AnimatedObject>> {
        self.clients.values_mut().map(|r| &mut r.objects)
    }
}
