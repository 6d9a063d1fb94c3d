use std::collections::HashMap;

use super::timeline::{Timeline, TimelineId};

/*
Incremental Duration Accounting
===============================

Sequence builders often loop "until the sequence is long enough", asking for
the total duration after every appended block. Summing every block on every
query makes that loop quadratic. The cache remembers the last total plus a
checkpoint, and each query only pays for what changed since.

Vocabulary
----------

  checkpoint    What the cache remembers about the timeline at the last query.
                Either the last key (append-only mode) or every key with the
                duration it had (general mode).

  append-only   Caller promise: since the last query, blocks were only added
                after the previous last block. Nothing removed, nothing
                reordered, nothing inserted in the middle.

  attached      The cache belongs to exactly one timeline instance. Asking it
                about a different instance discards the snapshot first.


Append-only mode
----------------

    cached: [b1 b2 b3]            checkpoint = b3, total = T
    now:    [b1 b2 b3 b4 b5]
                      ^^^^^^ only these are summed: T + d4 + d5

Cost is proportional to the number of new blocks. If the promise is broken
(a block before the checkpoint was removed), the total is silently wrong.
That is the caller's contract; the cache does not detect it. The one case it
does notice is a checkpoint key that no longer exists, which forces a rescan.


General mode
------------

    cached: {b1, b2, b3}          total = T
    now:    {b1, b3, b4}
    added   = now - cached = {b4} -> + d4
    removed = cached - now = {b2} -> - d2 (duration remembered at cache time)

Removed blocks are gone from the timeline, so their durations are stored in
the checkpoint. Duration lookups and checkpoint edits are proportional to the
symmetric difference; membership tests still visit every current key once.
*/

#[derive(Debug, Clone)]
enum Checkpoint<K> {
    /// Last key seen; `None` when the timeline was empty.
    LastKey(Option<K>),
    /// Every key seen, with its duration at that time.
    KeySet(HashMap<K, f64>),
}

#[derive(Debug, Clone)]
struct DurationSnapshot<K> {
    total: f64,
    checkpoint: Checkpoint<K>,
}

/// Running total of block durations for one timeline.
///
/// Owned by whoever owns the timeline. Timeline mutation and [`update`]
/// calls must not overlap.
///
/// [`update`]: DurationCache::update
#[derive(Debug, Clone)]
pub struct DurationCache<K> {
    timeline: Option<TimelineId>,
    snapshot: Option<DurationSnapshot<K>>,
}

impl<K: Copy + Eq + std::hash::Hash + std::fmt::Debug> DurationCache<K> {
    /// A detached cache. The first [`update`](Self::update) attaches it.
    pub fn new() -> Self {
        Self {
            timeline: None,
            snapshot: None,
        }
    }

    /// Bind the cache to `timeline`, dropping any previous snapshot.
    pub fn attach<T: Timeline<Key = K>>(&mut self, timeline: &T) {
        self.timeline = Some(timeline.id());
        self.snapshot = None;
    }

    /// Unbind the cache. The next update starts from a full scan.
    pub fn detach(&mut self) {
        self.timeline = None;
        self.snapshot = None;
    }

    pub fn is_attached_to<T: Timeline<Key = K>>(&self, timeline: &T) -> bool {
        self.timeline == Some(timeline.id())
    }

    /// Total from the last update, if any.
    pub fn total(&self) -> Option<f64> {
        self.snapshot.as_ref().map(|snapshot| snapshot.total)
    }

    /// Return the total duration of `timeline` in seconds.
    ///
    /// With `append_only`, the caller guarantees that blocks were only
    /// appended since the previous call; breaking that guarantee yields a
    /// wrong total without any error.
    pub fn update<T: Timeline<Key = K>>(&mut self, timeline: &T, append_only: bool) -> f64 {
        if !self.is_attached_to(timeline) {
            if self.timeline.is_some() {
                log::debug!("Duration cache moved to a different timeline, rescanning");
            }
            self.attach(timeline);
        }

        let snapshot = match self.snapshot.take() {
            Some(snapshot) => Self::refresh(snapshot, timeline, append_only),
            None => Self::scan(timeline, append_only),
        };
        let total = snapshot.total;
        self.snapshot = Some(snapshot);
        total
    }

    fn scan<T: Timeline<Key = K>>(timeline: &T, append_only: bool) -> DurationSnapshot<K> {
        let checkpoint = if append_only {
            Checkpoint::LastKey(timeline.last_key())
        } else {
            Checkpoint::KeySet(
                timeline
                    .keys()
                    .map(|key| (key, timeline.duration(key)))
                    .collect(),
            )
        };
        let total = match &checkpoint {
            Checkpoint::LastKey(_) => timeline.keys().map(|key| timeline.duration(key)).sum(),
            Checkpoint::KeySet(keys) => keys.values().sum(),
        };
        log::debug!(
            "Duration cache full scan over {} blocks: {total}s",
            timeline.len()
        );
        DurationSnapshot { total, checkpoint }
    }

    fn refresh<T: Timeline<Key = K>>(
        snapshot: DurationSnapshot<K>,
        timeline: &T,
        append_only: bool,
    ) -> DurationSnapshot<K> {
        match (snapshot.checkpoint, append_only) {
            (Checkpoint::LastKey(last), true) => {
                Self::refresh_appended(snapshot.total, last, timeline)
            }
            (Checkpoint::KeySet(keys), false) => {
                Self::refresh_key_set(snapshot.total, keys, timeline)
            }
            // Mode switched between calls: the checkpoint has the wrong shape.
            _ => {
                log::debug!("Duration cache mode changed, rescanning");
                Self::scan(timeline, append_only)
            }
        }
    }

    fn refresh_appended<T: Timeline<Key = K>>(
        mut total: f64,
        last: Option<K>,
        timeline: &T,
    ) -> DurationSnapshot<K> {
        let appended = match last {
            None => timeline.keys(),
            Some(key) => match timeline.keys_after(key) {
                Some(keys) => keys,
                None => {
                    log::warn!(
                        "Duration checkpoint {key:?} is no longer in the timeline, rescanning"
                    );
                    return Self::scan(timeline, true);
                }
            },
        };

        let mut new_last = last;
        for key in appended {
            total += timeline.duration(key);
            new_last = Some(key);
        }

        DurationSnapshot {
            total,
            checkpoint: Checkpoint::LastKey(new_last),
        }
    }

    fn refresh_key_set<T: Timeline<Key = K>>(
        mut total: f64,
        mut keys: HashMap<K, f64>,
        timeline: &T,
    ) -> DurationSnapshot<K> {
        let mut added = 0usize;
        for key in timeline.keys() {
            if !keys.contains_key(&key) {
                let duration = timeline.duration(key);
                total += duration;
                keys.insert(key, duration);
                added += 1;
            }
        }

        // cached + added - current = number of removed keys
        let removed = keys.len() - timeline.len();
        if removed > 0 {
            keys.retain(|key, duration| {
                let keep = timeline.contains(*key);
                if !keep {
                    total -= *duration;
                }
                keep
            });
        }

        if added > 0 || removed > 0 {
            log::trace!("Duration cache: +{added} -{removed} blocks");
        }

        DurationSnapshot {
            total,
            checkpoint: Checkpoint::KeySet(keys),
        }
    }
}

impl<K: Copy + Eq + std::hash::Hash + std::fmt::Debug> Default for DurationCache<K> {
    fn default() -> Self {
        Self::new()
    }
}
