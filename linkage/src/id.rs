use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out a distinct tag to each ID generator, so IDs from different scenes never compare equal.
static NEXT_SCENE_TAG: AtomicU32 = AtomicU32::new(0);

/// Identifies a point within one scene.
/// It's the point's index in the scene's point list, plus a tag for the scene
/// that handed it out. Other scenes reject it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId {
    scene: u32,
    index: u32,
}

impl PointId {
    /// Position of the point in its scene's point list.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Generates an incrementing sequence of point IDs starting from 0.
/// Clones keep the tag, because a cloned scene still owns the same points.
#[derive(Debug, Clone)]
pub(crate) struct IdGenerator {
    scene: u32,
    next: u32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            scene: NEXT_SCENE_TAG.fetch_add(1, Ordering::Relaxed),
            next: 0,
        }
    }
}

impl IdGenerator {
    /// Generates an incrementing sequence of IDs starting from 0.
    pub fn next_id(&mut self) -> PointId {
        let out = PointId {
            scene: self.scene,
            index: self.next,
        };
        self.next += 1;
        out
    }

    /// Did this generator hand out `id`?
    pub fn issued(&self, id: PointId) -> bool {
        id.scene == self.scene && id.index < self.next
    }
}
