use std::{cmp::Ordering, collections::VecDeque};

use super::{page::Slot, Tree};
use crate::{buffer::Bytes, Error};

/// A stateful cursor over an inclusive key range, in comparator order.
///
/// The tree has no sibling pointers on disk and no page cache, so the cursor
/// is a sequence of point searches: each refill is one root-to-leaf descent
/// carrying the cursor's current key, and every page read during a descent
/// is released before the next one. Values are read lazily as entries are
/// yielded.
pub struct Cursor<'a> {
    tree: &'a mut Tree,
    end: Bytes,
    pending: VecDeque<Slot>,
    probe: Option<(Bytes, bool)>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a mut Tree, start: &[u8], end: &[u8]) -> Self {
        Self {
            tree,
            end: Bytes::from(end),
            pending: VecDeque::new(),
            probe: Some((Bytes::from(start), true)),
        }
    }

    /// Returns the next key-value entry, or `None` once the range is
    /// exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<(Bytes, Bytes)>, Error> {
        let slot = loop {
            if let Some(slot) = self.pending.pop_front() {
                break slot;
            }
            let (key, inclusive) = match self.probe.take() {
                Some(probe) => probe,
                None => return Ok(None),
            };
            match self.tree.next_leaf_slots(&key, inclusive)? {
                Some(slots) => {
                    self.probe = slots.last().map(|slot| (slot.key.clone(), false));
                    self.pending = slots.into();
                }
                None => return Ok(None),
            }
        };

        if self.tree.compare(&slot.key, &self.end) == Ordering::Greater {
            self.pending.clear();
            self.probe = None;
            return Ok(None);
        }

        let value = self.tree.read_value(slot.position, slot.config)?;
        Ok(Some((slot.key, value)))
    }
}
