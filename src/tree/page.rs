use std::{cmp::Ordering, convert::TryFrom, mem};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::Context;
use crate::{buffer::Bytes, writer::Writer, Error};

/// Bytes a slot occupies on disk in addition to its key: three big-endian
/// u64 words holding the key length, the position, and the config word.
pub(crate) const SLOT_OVERHEAD: u64 = 24;

/// One key entry within a page.
///
/// `position` addresses a chunk in the backing file: the value chunk for a
/// leaf slot, the child page image for an interior slot. The config word is
/// the stored value length in a leaf; in an interior slot it is the child's
/// stored length shifted left by one with the low bit set when the child is
/// a leaf.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub key: Bytes,
    pub position: u64,
    pub config: u64,
}

impl Slot {
    pub fn disk_len(&self) -> u64 {
        SLOT_OVERHEAD + self.key.len() as u64
    }
}

/// Outcome of a recursive insert, consumed by the parent frame.
pub(crate) enum Insertion {
    /// The page was updated and a new image was appended.
    Saved,
    /// The page reached the fanout. It was not saved; the caller splits it.
    Split,
}

/// Outcome of a recursive remove, consumed by the parent frame.
pub(crate) enum Removal {
    /// The page was updated and a new image was appended.
    Saved,
    /// The key is not present. Nothing was written.
    NotFound,
    /// The page has no slots left. It was not saved; the caller collapses it.
    Emptied,
}

/// An in-memory image of one B+ tree node.
///
/// A leaf's slots reference value chunks; an interior page's slots reference
/// child pages, with slot 0 acting as the leftmost sentinel: its key is
/// empty and its subtree holds every key ordered before slot 1's key.
/// `byte_size` tracks the exact serialized length of the page before
/// compression. Pages live only as long as the traversal that loaded them;
/// the root is the one page pinned for the lifetime of the tree.
#[derive(Debug)]
pub(crate) struct Page {
    pub leaf: bool,
    pub slots: Vec<Slot>,
    pub byte_size: u64,
    /// Position of the most recently written image of this page.
    pub position: u64,
    /// Config word describing the most recently written image.
    pub config: u64,
}

impl Page {
    pub fn new(leaf: bool) -> Self {
        Self {
            leaf,
            slots: Vec::new(),
            byte_size: 0,
            position: 0,
            config: 0,
        }
    }

    /// Reads and decodes the page image at `position` described by `config`.
    ///
    /// Decoded keys alias the decompressed image rather than copying it.
    pub fn load(writer: &mut Writer, position: u64, config: u64) -> Result<Self, Error> {
        let leaf = config & 1 == 1;
        let image = writer.read_chunk(position, config >> 1)?;
        let bytes = image.as_slice();

        let mut slots = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            if offset + SLOT_OVERHEAD as usize > bytes.len() {
                return Err(Error::data_integrity(format!(
                    "truncated slot header at {} in page at {}",
                    offset, position
                )));
            }
            let key_length = usize::try_from(BigEndian::read_u64(&bytes[offset..]))
                .map_err(|_| Error::data_integrity("slot key length does not fit in memory"))?;
            let slot_position = BigEndian::read_u64(&bytes[offset + 8..]);
            let slot_config = BigEndian::read_u64(&bytes[offset + 16..]);

            let key_start = offset + SLOT_OVERHEAD as usize;
            let key_end = key_start
                .checked_add(key_length)
                .filter(|end| *end <= bytes.len())
                .ok_or_else(|| {
                    Error::data_integrity(format!(
                        "slot key of {} bytes overruns the page image at {}",
                        key_length, position
                    ))
                })?;
            slots.push(Slot {
                key: image.slice(key_start..key_end),
                position: slot_position,
                config: slot_config,
            });
            offset = key_end;
        }

        if !leaf && slots.is_empty() {
            return Err(Error::data_integrity(format!(
                "interior page at {} has no slots",
                position
            )));
        }

        Ok(Self {
            leaf,
            slots,
            byte_size: offset as u64,
            position,
            config,
        })
    }

    /// Serializes the page and appends a new image, updating `position` and
    /// `config` to describe it.
    pub fn save(&mut self, writer: &mut Writer) -> Result<(), Error> {
        let mut image = Vec::with_capacity(self.byte_size as usize);
        for slot in &self.slots {
            image.write_u64::<BigEndian>(slot.key.len() as u64)?;
            image.write_u64::<BigEndian>(slot.position)?;
            image.write_u64::<BigEndian>(slot.config)?;
            image.extend_from_slice(slot.key.as_slice());
        }
        if image.len() as u64 != self.byte_size {
            return Err(Error::data_integrity(format!(
                "page serialized to {} bytes but accounted for {}",
                image.len(),
                self.byte_size
            )));
        }

        let (position, stored_length) = writer.write_chunk(&image)?;
        self.position = position;
        self.config = stored_length << 1 | u64::from(self.leaf);
        Ok(())
    }

    /// Finds the first slot whose key orders at or after `key`, returning
    /// its index and whether it compared equal. Runs off the end as
    /// `(len, false)`. The leftmost sentinel of an interior page is skipped.
    pub fn search(&self, cx: &Context, key: &[u8]) -> (usize, bool) {
        let start = usize::from(!self.leaf);
        for index in start..self.slots.len() {
            match cx.comparator.compare(self.slots[index].key.as_slice(), key) {
                Ordering::Less => {}
                Ordering::Equal => return (index, true),
                Ordering::Greater => return (index, false),
            }
        }
        (self.slots.len(), false)
    }

    /// Index of the child subtree a lookup for `key` descends into. Keys
    /// equal to a separator descend into the right-hand child.
    fn child_index(&self, cx: &Context, key: &[u8]) -> usize {
        let (index, matched) = self.search(cx, key);
        if matched {
            index
        } else {
            index - 1
        }
    }

    fn load_child(&self, writer: &mut Writer, index: usize) -> Result<Self, Error> {
        let slot = &self.slots[index];
        Self::load(writer, slot.position, slot.config)
    }

    /// Locates `key` and returns the position and stored length of its
    /// value chunk.
    pub fn find_value(
        &self,
        writer: &mut Writer,
        cx: &Context,
        key: &[u8],
    ) -> Result<Option<(u64, u64)>, Error> {
        let (index, matched) = self.search(cx, key);
        if self.leaf {
            Ok(if matched {
                let slot = &self.slots[index];
                Some((slot.position, slot.config))
            } else {
                None
            })
        } else {
            let child_index = if matched { index } else { index - 1 };
            let child = self.load_child(writer, child_index)?;
            child.find_value(writer, cx, key)
        }
    }

    /// Inserts `slot`, replacing an existing slot with an equal key.
    ///
    /// Every touched page appends a new image bottom-up; parents take the
    /// fresh child coordinates afterwards. A page that reaches the fanout
    /// reports [`Insertion::Split`] without saving, except the root, which
    /// grows the tree a level instead.
    pub fn insert(
        &mut self,
        writer: &mut Writer,
        cx: &Context,
        slot: Slot,
        root: bool,
    ) -> Result<Insertion, Error> {
        let (index, matched) = self.search(cx, slot.key.as_slice());
        if self.leaf {
            if matched {
                let replaced = self.slots.remove(index);
                self.byte_size -= replaced.disk_len();
            }
            self.byte_size += slot.disk_len();
            self.slots.insert(index, slot);
        } else {
            let child_index = if matched { index } else { index - 1 };
            let mut child = self.load_child(writer, child_index)?;
            match child.insert(writer, cx, slot, false)? {
                Insertion::Split => self.split_child(writer, child_index, child)?,
                Insertion::Saved => {
                    let entry = &mut self.slots[child_index];
                    entry.position = child.position;
                    entry.config = child.config;
                }
            }
        }

        if self.slots.len() == cx.order {
            if !root {
                return Ok(Insertion::Split);
            }
            self.promote(writer)?;
        }
        self.save(writer)?;
        Ok(Insertion::Saved)
    }

    /// Removes `key`. Emptied non-root pages report [`Removal::Emptied`] so
    /// the parent collapses them; an interior page left with a single slot
    /// lifts that child into itself. An emptied root interior becomes a
    /// fresh empty leaf.
    pub fn remove(
        &mut self,
        writer: &mut Writer,
        cx: &Context,
        key: &[u8],
        root: bool,
    ) -> Result<Removal, Error> {
        let (index, matched) = self.search(cx, key);
        if self.leaf {
            if !matched {
                return Ok(Removal::NotFound);
            }
            let removed = self.slots.remove(index);
            self.byte_size -= removed.disk_len();
        } else {
            let child_index = if matched { index } else { index - 1 };
            let mut child = self.load_child(writer, child_index)?;
            match child.remove(writer, cx, key, false)? {
                Removal::NotFound => return Ok(Removal::NotFound),
                Removal::Emptied => {
                    let removed = self.slots.remove(child_index);
                    self.byte_size -= removed.disk_len();
                    if !root && self.slots.len() == 1 {
                        // Lift the lone child into this page. Its image is
                        // already on disk at the slot's coordinates, so the
                        // parent can reference it as-is.
                        let only = self.slots.remove(0);
                        *self = Self::load(writer, only.position, only.config)?;
                        return Ok(Removal::Saved);
                    }
                }
                Removal::Saved => {
                    let entry = &mut self.slots[child_index];
                    entry.position = child.position;
                    entry.config = child.config;
                }
            }
        }

        if self.slots.is_empty() {
            if !root {
                return Ok(Removal::Emptied);
            }
            if !self.leaf {
                // The last subtree collapsed out from under the root.
                *self = Self::new(true);
            }
        }
        self.save(writer)?;
        Ok(Removal::Saved)
    }

    /// Grows the tree by one level: this page becomes a fresh interior page
    /// whose sentinel-seeded slot 0 is split against the previous contents.
    fn promote(&mut self, writer: &mut Writer) -> Result<(), Error> {
        let mut replacement = Self::new(false);
        replacement.slots.push(Slot {
            key: Bytes::default(),
            position: 0,
            config: 0,
        });
        replacement.byte_size = SLOT_OVERHEAD;

        let previous = mem::replace(self, replacement);
        self.split_child(writer, 0, previous)
    }

    /// Splits the full `child` sitting at `self.slots[index]`: the lower
    /// half stays at `index`, the upper half is inserted at `index + 1`
    /// keyed by a copy of the middle key. Both halves are written before
    /// this page mutates.
    fn split_child(&mut self, writer: &mut Writer, index: usize, mut child: Self) -> Result<(), Error> {
        let middle = child.slots.len() / 2;
        let middle_key = child.slots[middle].key.clone();

        let mut right = Self::new(child.leaf);
        right.slots = child.slots.split_off(middle);
        right.byte_size = right.slots.iter().map(Slot::disk_len).sum();

        let mut left = Self::new(child.leaf);
        left.slots = child.slots;
        left.byte_size = left.slots.iter().map(Slot::disk_len).sum();

        left.save(writer)?;
        right.save(writer)?;

        let entry = &mut self.slots[index];
        entry.position = left.position;
        entry.config = left.config;

        let separator = Slot {
            key: middle_key,
            position: right.position,
            config: right.config,
        };
        self.byte_size += separator.disk_len();
        self.slots.insert(index + 1, separator);
        Ok(())
    }

    /// Descends to the first leaf holding a slot whose key orders at or
    /// after `key` (strictly after when `inclusive` is false) and returns
    /// that leaf's qualifying slots in order. A subtree with no qualifying
    /// slot advances to its next sibling within the same descent.
    pub fn next_leaf_slots(
        &self,
        writer: &mut Writer,
        cx: &Context,
        key: &[u8],
        inclusive: bool,
    ) -> Result<Option<Vec<Slot>>, Error> {
        if self.leaf {
            let (index, matched) = self.search(cx, key);
            let start = if matched && !inclusive { index + 1 } else { index };
            if start < self.slots.len() {
                Ok(Some(self.slots[start..].to_vec()))
            } else {
                Ok(None)
            }
        } else {
            let mut child_index = self.child_index(cx, key);
            while child_index < self.slots.len() {
                let child = self.load_child(writer, child_index)?;
                if let Some(slots) = child.next_leaf_slots(writer, cx, key, inclusive)? {
                    return Ok(Some(slots));
                }
                child_index += 1;
            }
            Ok(None)
        }
    }
}
