use crate::clip::Clip;
use haptics_shared::{ClipId, HapticsError, HapticsResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Loaded clips keyed by handle.
///
/// The store holds one reference per clip; players bound to a clip hold
/// their own, so releasing a clip here only frees it once no player uses it.
#[derive(Default)]
pub struct ClipStore {
    clips: HashMap<ClipId, Arc<Clip>>,
    next_id: i32,
}

impl ClipStore {
    pub fn new() -> Self {
        Self {
            clips: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn load(&mut self, data: &[u8]) -> HapticsResult<ClipId> {
        let clip = Clip::from_json(data)?;
        self.insert(clip)
    }

    pub fn insert(&mut self, clip: Clip) -> HapticsResult<ClipId> {
        let id = ClipId(self.next_id);
        // handles are never reused within one instance
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| HapticsError::LoadClipFailed("clip identifier space exhausted".to_string()))?;

        debug!(clip = id.0, duration = clip.duration(), "loaded clip");
        self.clips.insert(id, Arc::new(clip));
        Ok(id)
    }

    pub fn get(&self, id: ClipId) -> HapticsResult<Arc<Clip>> {
        self.clips
            .get(&id)
            .cloned()
            .ok_or(HapticsError::InvalidClipHandle(id))
    }

    pub fn duration(&self, id: ClipId) -> HapticsResult<f32> {
        self.clips
            .get(&id)
            .map(|clip| clip.duration())
            .ok_or(HapticsError::InvalidClipHandle(id))
    }

    pub fn release(&mut self, id: ClipId) -> HapticsResult<()> {
        let clip = self.clips.remove(&id).ok_or(HapticsError::InvalidClipHandle(id))?;
        debug!(clip = id.0, players_holding = Arc::strong_count(&clip) - 1, "released clip");
        Ok(())
    }

    pub fn contains(&self, id: ClipId) -> bool {
        self.clips.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clear(&mut self) {
        self.clips.clear();
    }
}
