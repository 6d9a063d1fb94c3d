use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::block::Block;
#[cfg(feature = "serde")]
use super::block::DescriptorFault;
#[cfg(feature = "serde")]
use crate::error::LoadError;

static NEXT_TIMELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one timeline instance.
///
/// Caches bind to this id so that a replaced (or cloned) timeline is never
/// mistaken for the one they were built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelineId(u64);

impl TimelineId {
    pub fn next() -> Self {
        TimelineId(NEXT_TIMELINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque, totally ordered block key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read access to an ordered block sequence.
///
/// Iteration order is fixed: it changes only when keys are added or removed.
pub trait Timeline {
    type Key: Copy + Eq + Hash + fmt::Debug;

    fn id(&self) -> TimelineId;

    /// Keys in timeline order.
    fn keys(&self) -> Box<dyn Iterator<Item = Self::Key> + '_>;

    /// Keys strictly after `key`, or `None` if `key` is not in the timeline.
    ///
    /// The default walks the whole key sequence; containers with indexed
    /// order should override it.
    fn keys_after(&self, key: Self::Key) -> Option<Box<dyn Iterator<Item = Self::Key> + '_>> {
        let mut keys = self.keys();
        keys.by_ref().find(|k| *k == key)?;
        Some(keys)
    }

    fn last_key(&self) -> Option<Self::Key> {
        self.keys().last()
    }

    fn contains(&self, key: Self::Key) -> bool {
        self.block(key).is_some()
    }

    fn len(&self) -> usize {
        self.keys().count()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration of the block at `key` in seconds; missing keys count as zero.
    fn duration(&self, key: Self::Key) -> f64 {
        self.block(key).map_or(0.0, |block| block.duration)
    }

    fn block(&self, key: Self::Key) -> Option<&Block>;
}

/// In-memory timeline keyed by [`BlockId`], iterated in insertion order.
#[derive(Debug)]
pub struct BlockTimeline {
    id: TimelineId,
    blocks: IndexMap<BlockId, Block>,
    next_id: u64,
}

impl BlockTimeline {
    pub fn new() -> Self {
        Self {
            id: TimelineId::next(),
            blocks: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Build a timeline from blocks, numbering them from 1.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut timeline = Self::new();
        for block in blocks {
            timeline.push(block);
        }
        timeline
    }

    /// Append a block after the current last one and return its id.
    pub fn push(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        self.blocks.insert(id, block);
        id
    }

    /// Append a block under an explicit id.
    ///
    /// Returns `false` and leaves the timeline untouched if the id is taken:
    /// blocks are immutable once added.
    pub fn insert(&mut self, id: BlockId, block: Block) -> bool {
        if self.blocks.contains_key(&id) {
            return false;
        }
        self.next_id = self.next_id.max(id.0 + 1);
        self.blocks.insert(id, block);
        true
    }

    /// Remove a block, keeping the order of the remaining ones.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        self.blocks.shift_remove(&id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(id, block)| (*id, block))
    }

    pub fn ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.keys().copied()
    }

    /// Direct O(n) sum of all block durations.
    pub fn total_duration(&self) -> f64 {
        self.blocks.values().map(|block| block.duration).sum()
    }
}

impl Default for BlockTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BlockTimeline {
    /// A clone is a different timeline instance and gets its own identity.
    fn clone(&self) -> Self {
        Self {
            id: TimelineId::next(),
            blocks: self.blocks.clone(),
            next_id: self.next_id,
        }
    }
}

impl Timeline for BlockTimeline {
    type Key = BlockId;

    fn id(&self) -> TimelineId {
        self.id
    }

    fn keys(&self) -> Box<dyn Iterator<Item = BlockId> + '_> {
        Box::new(self.blocks.keys().copied())
    }

    fn keys_after(&self, key: BlockId) -> Option<Box<dyn Iterator<Item = BlockId> + '_>> {
        let index = self.blocks.get_index_of(&key)?;
        Some(Box::new(self.blocks.keys().skip(index + 1).copied()))
    }

    fn last_key(&self) -> Option<BlockId> {
        self.blocks.last().map(|(id, _)| *id)
    }

    fn contains(&self, key: BlockId) -> bool {
        self.blocks.contains_key(&key)
    }

    fn len(&self) -> usize {
        self.blocks.len()
    }

    fn block(&self, key: BlockId) -> Option<&Block> {
        self.blocks.get(&key)
    }
}

#[cfg(feature = "serde")]
#[derive(Debug, Serialize, Deserialize)]
struct TimelineFile {
    blocks: Vec<BlockEntry>,
}

#[cfg(feature = "serde")]
#[derive(Debug, Serialize, Deserialize)]
struct BlockEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(flatten)]
    block: Block,
}

#[cfg(feature = "serde")]
impl BlockTimeline {
    /// Parse a timeline from its JSON description.
    ///
    /// Blocks without an explicit `id` are numbered after the highest id seen
    /// so far.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let file: TimelineFile = serde_json::from_str(json)?;
        let mut timeline = Self::new();
        for entry in file.blocks {
            let id = entry.id.unwrap_or(timeline.next_id);
            let duration = entry.block.duration;
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(LoadError::Duration { id, duration });
            }
            for (channel, descriptor) in entry.block.channels() {
                descriptor.validate().map_err(|fault| match fault {
                    DescriptorFault::ShapeLength { tt, waveform } => LoadError::ShapeLength {
                        id,
                        channel,
                        tt,
                        waveform,
                    },
                    DescriptorFault::Time(value) => LoadError::DescriptorTime { id, channel, value },
                })?;
            }
            if !timeline.insert(BlockId(id), entry.block) {
                return Err(LoadError::DuplicateId { id });
            }
        }
        log::debug!("Loaded timeline with {} blocks", timeline.blocks.len());
        Ok(timeline)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, LoadError> {
        let file = TimelineFile {
            blocks: self
                .iter()
                .map(|(id, block)| BlockEntry {
                    id: Some(id.0),
                    block: block.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}
