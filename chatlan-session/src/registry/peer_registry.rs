use crate::transport::DataLink;
use chatlan_core::{PeerId, PeerStatus};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A remote peer as seen by the local session.
#[derive(Clone)]
pub struct PeerRecord {
    pub id: PeerId,
    pub status: PeerStatus,
    pub display_name: Option<String>,
    link: Option<Arc<dyn DataLink>>,
}

impl PeerRecord {
    pub fn link(&self) -> Option<&Arc<dyn DataLink>> {
        self.link.as_ref()
    }

    /// Connected with a channel that is currently open.
    pub fn is_reachable(&self) -> bool {
        self.status == PeerStatus::Connected && self.link.as_ref().is_some_and(|l| l.is_open())
    }
}

/// Peer id -> record. Status only moves Connecting -> Connected; a
/// disconnected peer is removed rather than kept around.
#[derive(Default)]
pub struct PeerRegistry {
    peers: BTreeMap<PeerId, PeerRecord>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a peer whose handshake just started. Existing records are left
    /// untouched.
    pub fn begin(&mut self, id: PeerId, display_name: Option<String>) {
        self.peers.entry(id).or_insert(PeerRecord {
            id,
            status: PeerStatus::Connecting,
            display_name,
            link: None,
        });
    }

    pub fn set_display_name(&mut self, id: PeerId, name: String) {
        if let Some(record) = self.peers.get_mut(&id) {
            record.display_name = Some(name);
        }
    }

    /// Inserts or upgrades `id` to `Connected` with its open channel.
    pub fn mark_connected(&mut self, id: PeerId, link: Arc<dyn DataLink>) -> &PeerRecord {
        let record = self.peers.entry(id).or_insert(PeerRecord {
            id,
            status: PeerStatus::Connecting,
            display_name: None,
            link: None,
        });
        record.status = PeerStatus::Connected;
        record.link = Some(link);
        record
    }

    /// Drops the record. The returned copy carries `Disconnected`.
    pub fn remove(&mut self, id: &PeerId) -> Option<PeerRecord> {
        self.peers.remove(id).map(|mut record| {
            record.status = PeerStatus::Disconnected;
            record.link = None;
            record
        })
    }

    pub fn get(&self, id: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(id)
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.peers
            .values()
            .filter(|r| r.status == PeerStatus::Connected)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeerRecord> {
        self.peers.values()
    }

    /// Open links of every connected peer other than `except`.
    pub fn open_links_except(&self, except: Option<&PeerId>) -> Vec<(PeerId, Arc<dyn DataLink>)> {
        self.peers
            .values()
            .filter(|r| Some(&r.id) != except && r.is_reachable())
            .filter_map(|r| r.link.clone().map(|link| (r.id, link)))
            .collect()
    }
}
