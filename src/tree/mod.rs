mod cursor;
mod head;
mod page;

use std::{
    cmp::Ordering,
    convert::TryFrom,
    fmt::{Debug, Display},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use zerocopy::AsBytes;

pub use self::cursor::Cursor;
use self::{
    head::{HeadRecord, HEAD_SIZE},
    page::{Insertion, Page, Removal, Slot},
};
use crate::{
    buffer::Bytes,
    codec::{Codec, Snappy},
    comparator::{Comparator, Lexicographic},
    error::{AbortError, ErrorKind},
    writer::Writer,
    Error,
};

/// The fanout used when a [`Config`] does not override it.
pub const DEFAULT_ORDER: usize = 64;

/// The smallest supported fanout.
pub const MIN_ORDER: usize = 4;

/// Keys are bounded so a handful of them always fits in one page image.
const MAX_KEY_LENGTH: usize = u16::MAX as usize;

/// Per-instance configuration shared by every recursive page operation.
#[derive(Debug)]
pub(crate) struct Context {
    pub order: usize,
    pub comparator: Arc<dyn Comparator>,
}

/// A configuration used to open a tree file.
#[derive(Debug)]
#[must_use]
pub struct Config {
    path: PathBuf,
    order: usize,
    comparator: Arc<dyn Comparator>,
    codec: Arc<dyn Codec>,
}

impl Config {
    /// Creates a new config for the tree file at `path`, with the default
    /// fanout, lexicographic key ordering, and snappy compression.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            order: DEFAULT_ORDER,
            comparator: Arc::new(Lexicographic),
            codec: Arc::new(Snappy),
        }
    }

    /// Sets the fanout used when creating a new file. The fanout recorded in
    /// an existing file always wins over this setting.
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Sets the key comparator. A file must always be opened with the
    /// comparator it was written with.
    pub fn comparator<C: Comparator>(mut self, comparator: C) -> Self {
        self.comparator = Arc::new(comparator);
        self
    }

    /// Sets the compression codec. A file must always be opened with the
    /// codec it was written with.
    pub fn codec<C: Codec>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Opens the tree, creating the file if it does not exist.
    pub fn open(self) -> Result<Tree, Error> {
        Tree::open_with(self)
    }
}

/// An embedded, append-only B+ tree key-value store in a single file.
///
/// Every mutation appends new page images and finishes by committing a new
/// head record; live bytes are never overwritten. A successful [`set`](Self::set)
/// or [`remove`](Self::remove) is durable once it returns. Obsolete bytes
/// accumulate until [`compact`](Self::compact) rewrites the file.
///
/// One instance owns the file exclusively while open; a second open of the
/// same file fails until the first instance closes.
#[derive(Debug)]
pub struct Tree {
    writer: Writer,
    root: Page,
    context: Context,
}

impl Tree {
    /// Opens the tree file at `path` with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Config::new(path).open()
    }

    fn open_with(config: Config) -> Result<Self, Error> {
        if config.order < MIN_ORDER {
            return Err(Error::message(format!(
                "tree order must be at least {}",
                MIN_ORDER
            )));
        }

        let mut writer = Writer::open(&config.path, config.codec.clone())?;
        let head = writer.find_last(HEAD_SIZE, HeadRecord::parse)?;
        let recovered = head.is_some();
        let (root, order) = match head {
            Some(head) => {
                let order = usize::try_from(head.order())
                    .ok()
                    .filter(|order| *order >= MIN_ORDER)
                    .ok_or_else(|| {
                        Error::data_integrity(format!(
                            "head record carries an unusable fanout of {}",
                            head.order()
                        ))
                    })?;
                let root = Page::load(&mut writer, head.root_position(), head.root_config())?;
                (root, order)
            }
            None => {
                // Fresh or unrecoverable file: start from an empty leaf.
                let mut root = Page::new(true);
                root.save(&mut writer)?;
                (root, config.order)
            }
        };

        let mut tree = Self {
            writer,
            root,
            context: Context {
                order,
                comparator: config.comparator,
            },
        };
        if !recovered {
            tree.commit_head()?;
        }
        Ok(tree)
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Returns the fanout of the open tree.
    #[must_use]
    pub fn order(&self) -> usize {
        self.context.order
    }

    /// Returns the current value of `key`, if present.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, key)))]
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Bytes>, Error> {
        match self.root.find_value(&mut self.writer, &self.context, key)? {
            Some((position, stored_length)) => {
                Ok(Some(self.writer.read_chunk(position, stored_length)?))
            }
            None => Ok(None),
        }
    }

    /// Retrieves the values of `keys`. Keys that are not found are omitted
    /// from the results.
    pub fn get_multiple(&mut self, keys: &[&[u8]]) -> Result<Vec<(Bytes, Bytes)>, Error> {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(key)? {
                results.push((Bytes::from(*key), value));
            }
        }
        Ok(results)
    }

    /// Sets `key` to `value`, replacing any existing value.
    ///
    /// The mutation is durable once this returns: reopening the file
    /// observes it.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, key, value)))]
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(Error::from(ErrorKind::KeyTooLarge));
        }

        let (position, stored_length) = self.writer.write_chunk(value)?;
        let slot = Slot {
            key: Bytes::from(key),
            position,
            config: stored_length,
        };
        match self.root.insert(&mut self.writer, &self.context, slot, true)? {
            Insertion::Saved => {}
            Insertion::Split => unreachable!("the root grows in place"),
        }
        self.commit_head()
    }

    /// Removes `key`, returning false when the key was not present.
    ///
    /// The mutation is durable once this returns.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, key)))]
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, Error> {
        match self.root.remove(&mut self.writer, &self.context, key, true)? {
            Removal::NotFound => Ok(false),
            Removal::Saved => {
                self.commit_head()?;
                Ok(true)
            }
            Removal::Emptied => unreachable!("the root collapses in place"),
        }
    }

    /// Returns a cursor over the keys in `start..=end`, in comparator order.
    pub fn cursor<'a>(&'a mut self, start: &[u8], end: &[u8]) -> Cursor<'a> {
        Cursor::new(self, start, end)
    }

    /// Visits every live key in `start..=end` exactly once, in comparator
    /// order. The visitor can abort the scan by returning an error.
    pub fn range<E, F>(&mut self, start: &[u8], end: &[u8], mut visitor: F) -> Result<(), AbortError<E>>
    where
        E: Display + Debug,
        F: FnMut(Bytes, Bytes) -> Result<(), AbortError<E>>,
    {
        let mut cursor = self.cursor(start, end);
        while let Some((key, value)) = cursor.next()? {
            visitor(key, value)?;
        }
        Ok(())
    }

    /// Rewrites every reachable page and value into a fresh file, then
    /// atomically renames it over the backing file and reopens it. The live
    /// key-value mappings are unchanged; obsolete bytes are not carried
    /// over.
    ///
    /// Fails with [`ErrorKind::CompactionInProgress`] if the scratch file
    /// (the backing path with `.compact` appended) already exists. On any
    /// error the backing file is untouched.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn compact(&mut self) -> Result<(), Error> {
        let path = self.writer.path().to_path_buf();
        let mut scratch_path = path.clone().into_os_string();
        scratch_path.push(".compact");
        let scratch_path = PathBuf::from(scratch_path);

        let mut target = Writer::create_new(&scratch_path, self.writer.codec())?;
        let copied = self.copy_into(&mut target).and_then(|(position, config)| {
            let record = HeadRecord::new(self.context.order as u64, position, config);
            target.write_raw(record.as_bytes())?;
            target.close()?;
            Ok((position, config))
        });
        let (root_position, root_config) = match copied {
            Ok(coordinates) => coordinates,
            Err(error) => {
                let _ = fs::remove_file(&scratch_path);
                return Err(error);
            }
        };

        fs::rename(&scratch_path, &path)?;
        let codec = self.writer.codec();
        // The previous writer keeps its lock on the orphaned file until it
        // drops on reassignment; the lock on the new file is taken fresh.
        self.writer = Writer::open(&path, codec)?;
        self.root = Page::load(&mut self.writer, root_position, root_config)?;
        Ok(())
    }

    /// Flushes and closes the tree, releasing the file lock.
    pub fn close(self) -> Result<(), Error> {
        self.writer.close()
    }

    /// Appends a head record for the current root and forces it to disk.
    ///
    /// This is the durability boundary: a crash before the head record
    /// lands leaves the tree at the previous head, and the bytes past it
    /// are discarded garbage.
    fn commit_head(&mut self) -> Result<(), Error> {
        let record = HeadRecord::new(
            self.context.order as u64,
            self.root.position,
            self.root.config,
        );
        self.writer.write_raw(record.as_bytes())?;
        self.writer.sync()
    }

    fn copy_into(&mut self, target: &mut Writer) -> Result<(u64, u64), Error> {
        // Keep a head-sized window reserved at the start of the fresh file.
        target.write_raw(&[0; HEAD_SIZE as usize])?;
        Self::rewrite(&mut self.writer, target, self.root.position, self.root.config)
    }

    /// Depth-first copy of the subtree at `(position, config)` from `source`
    /// into `target`, returning the coordinates of the copied page.
    fn rewrite(
        source: &mut Writer,
        target: &mut Writer,
        position: u64,
        config: u64,
    ) -> Result<(u64, u64), Error> {
        let mut page = Page::load(source, position, config)?;
        if page.leaf {
            for slot in &mut page.slots {
                let value = source.read_chunk(slot.position, slot.config)?;
                let (position, stored_length) = target.write_chunk(value.as_slice())?;
                slot.position = position;
                slot.config = stored_length;
            }
        } else {
            for slot in &mut page.slots {
                let (position, config) = Self::rewrite(source, target, slot.position, slot.config)?;
                slot.position = position;
                slot.config = config;
            }
        }
        page.save(target)?;
        Ok((page.position, page.config))
    }

    pub(crate) fn next_leaf_slots(
        &mut self,
        key: &[u8],
        inclusive: bool,
    ) -> Result<Option<Vec<Slot>>, Error> {
        self.root
            .next_leaf_slots(&mut self.writer, &self.context, key, inclusive)
    }

    pub(crate) fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        self.context.comparator.compare(a, b)
    }

    pub(crate) fn read_value(&mut self, position: u64, stored_length: u64) -> Result<Bytes, Error> {
        self.writer.read_chunk(position, stored_length)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use nanorand::{Rng, WyRand};

    use super::*;

    #[test]
    fn smoke() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke");

        let mut tree = Tree::open(&path).unwrap();
        assert!(tree.get(b"hello").unwrap().is_none());
        tree.set(b"hello", b"world").unwrap();
        let value = tree.get(b"hello").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"world");
        tree.close().unwrap();

        let mut tree = Tree::open(&path).unwrap();
        let value = tree.get(b"hello").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"world");
    }

    #[test]
    fn overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("overwrite")).unwrap();

        tree.set(b"k", b"v1").unwrap();
        tree.set(b"k", b"v2").unwrap();
        let value = tree.get(b"k").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"v2");
    }

    #[test]
    fn remove_leaves_other_keys_intact() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("remove")).unwrap();

        tree.set(b"a", b"1").unwrap();
        tree.set(b"b", b"2").unwrap();
        assert!(tree.remove(b"a").unwrap());
        assert!(tree.get(b"a").unwrap().is_none());
        let value = tree.get(b"b").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"2");

        assert!(!tree.remove(b"a").unwrap());
        assert!(!tree.remove(b"never-set").unwrap());
    }

    #[test]
    fn splits_at_the_minimum_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Config::new(dir.path().join("splits"))
            .order(4)
            .open()
            .unwrap();

        for index in 1..=8_u32 {
            let key = format!("{:02}", index);
            tree.set(key.as_bytes(), key.as_bytes()).unwrap();
        }
        for index in 1..=8_u32 {
            let key = format!("{:02}", index);
            let value = tree.get(key.as_bytes()).unwrap().expect("key not found");
            assert_eq!(value.as_slice(), key.as_bytes());
        }

        let mut visited = Vec::new();
        tree.range(b"03", b"06", |key, value| {
            assert_eq!(key, value);
            visited.push(key.to_vec());
            Ok(())
        })
        .map_err(AbortError::infallible)
        .unwrap();
        assert_eq!(visited, [b"03", b"04", b"05", b"06"]);
    }

    #[test]
    fn cursor_walks_the_range_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Config::new(dir.path().join("cursor"))
            .order(4)
            .open()
            .unwrap();
        for index in 0..20_u32 {
            let key = format!("{:02}", index);
            tree.set(key.as_bytes(), key.as_bytes()).unwrap();
        }

        let mut cursor = tree.cursor(b"05", b"11");
        let mut visited = Vec::new();
        while let Some((key, _value)) = cursor.next().unwrap() {
            visited.push(key.to_vec());
        }
        assert_eq!(visited.first().unwrap().as_slice(), b"05");
        assert_eq!(visited.last().unwrap().as_slice(), b"11");
        assert_eq!(visited.len(), 7);
        assert!(cursor.next().unwrap().is_none());
    }

    #[test]
    fn range_with_an_empty_window_visits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("empty-range")).unwrap();
        tree.set(b"b", b"2").unwrap();

        let mut visits = 0;
        tree.range(b"c", b"a", |_key, _value| {
            visits += 1;
            Ok(())
        })
        .map_err(AbortError::infallible)
        .unwrap();
        assert_eq!(visits, 0);
    }

    #[test]
    fn a_visitor_can_abort_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("abort")).unwrap();
        for key in [&b"a"[..], b"b", b"c"] {
            tree.set(key, key).unwrap();
        }

        let mut visits = 0;
        let result = tree.range(b"a", b"c", |_key, _value| {
            visits += 1;
            Err(AbortError::Other(String::from("done early")))
        });
        assert!(matches!(result, Err(AbortError::Other(_))));
        assert_eq!(visits, 1);
    }

    #[test]
    fn ten_thousand_random_keys_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persistence");
        let mut rng = WyRand::new_seed(7);

        let mut expected = BTreeMap::new();
        while expected.len() < 10_000 {
            let key = rng.generate::<u64>().to_be_bytes().to_vec();
            let value = rng.generate::<u64>().to_le_bytes().to_vec();
            expected.insert(key, value);
        }

        let mut tree = Tree::open(&path).unwrap();
        for (key, value) in &expected {
            tree.set(key, value).unwrap();
        }
        tree.close().unwrap();

        let mut tree = Tree::open(&path).unwrap();
        for (key, value) in &expected {
            let stored = tree.get(key).unwrap().expect("key not found");
            assert_eq!(stored.as_slice(), value.as_slice());
        }

        let first = expected.keys().next().unwrap().clone();
        let last = expected.keys().next_back().unwrap().clone();
        let mut visited = Vec::new();
        tree.range(&first, &last, |key, _value| {
            visited.push(key.to_vec());
            Ok(())
        })
        .map_err(AbortError::infallible)
        .unwrap();
        assert_eq!(visited.len(), expected.len());
        assert!(expected.keys().zip(&visited).all(|(a, b)| a == b));
    }

    #[test]
    fn compaction_preserves_the_live_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compaction");

        let mut tree = Tree::open(&path).unwrap();
        let value = b"some moderately long value payload for compaction ".repeat(2);
        for index in 0..1_000_u32 {
            let key = format!("key{:04}", index);
            tree.set(key.as_bytes(), &value).unwrap();
        }
        for index in (0..1_000_u32).step_by(2) {
            let key = format!("key{:04}", index);
            assert!(tree.remove(key.as_bytes()).unwrap());
        }

        let before = fs::metadata(&path).unwrap().len();
        tree.compact().unwrap();
        let after = fs::metadata(&path).unwrap().len();
        assert!(after < before, "{} was not below {}", after, before);

        for index in 0..1_000_u32 {
            let key = format!("key{:04}", index);
            let stored = tree.get(key.as_bytes()).unwrap();
            if index % 2 == 0 {
                assert!(stored.is_none());
            } else {
                assert_eq!(stored.expect("key not found").as_slice(), &value[..]);
            }
        }

        // The compacted file reopens like any other.
        tree.close().unwrap();
        let mut tree = Tree::open(&path).unwrap();
        let stored = tree.get(b"key0001").unwrap().expect("key not found");
        assert_eq!(stored.as_slice(), &value[..]);
    }

    #[test]
    fn a_leftover_scratch_file_blocks_compaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conflict");
        let mut tree = Tree::open(&path).unwrap();
        tree.set(b"a", b"1").unwrap();

        let scratch = dir.path().join("conflict.compact");
        fs::write(&scratch, b"junk").unwrap();
        let error = tree.compact().unwrap_err();
        assert!(matches!(error.kind, ErrorKind::CompactionInProgress { .. }));

        fs::remove_file(&scratch).unwrap();
        tree.compact().unwrap();
        let value = tree.get(b"a").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"1");
    }

    #[test]
    fn empty_keys_and_empty_values_are_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("empties")).unwrap();

        tree.set(b"", b"empty key").unwrap();
        tree.set(b"k", b"").unwrap();

        let value = tree.get(b"").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"empty key");
        let value = tree.get(b"k").unwrap().expect("key not found");
        assert!(value.is_empty());

        assert!(tree.remove(b"").unwrap());
        assert!(tree.get(b"").unwrap().is_none());
    }

    #[test]
    fn oversized_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("oversized")).unwrap();

        let key = vec![0_u8; MAX_KEY_LENGTH + 1];
        let error = tree.set(&key, b"value").unwrap_err();
        assert!(matches!(error.kind, ErrorKind::KeyTooLarge));
        assert!(tree.set(&key[..MAX_KEY_LENGTH], b"value").is_ok());
    }

    #[test]
    fn removing_every_key_collapses_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collapse");
        let mut tree = Config::new(&path).order(4).open().unwrap();

        for index in 0..40_u32 {
            let key = format!("{:02}", index);
            tree.set(key.as_bytes(), key.as_bytes()).unwrap();
        }
        for index in 0..40_u32 {
            let key = format!("{:02}", index);
            assert!(tree.remove(key.as_bytes()).unwrap());
        }
        for index in 0..40_u32 {
            let key = format!("{:02}", index);
            assert!(tree.get(key.as_bytes()).unwrap().is_none());
        }

        // The emptied tree accepts new keys, and survives a reopen.
        tree.set(b"again", b"yes").unwrap();
        tree.close().unwrap();
        let mut tree = Tree::open(&path).unwrap();
        let value = tree.get(b"again").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"yes");
    }

    #[test]
    fn a_torn_tail_is_discarded_on_open() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn");
        let mut tree = Tree::open(&path).unwrap();
        tree.set(b"durable", b"value").unwrap();
        tree.close().unwrap();

        // An append interrupted before its head record committed.
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"partial garbage").unwrap();
        drop(file);

        let mut tree = Tree::open(&path).unwrap();
        let value = tree.get(b"durable").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"value");
        tree.set(b"later", b"fine").unwrap();
        let value = tree.get(b"later").unwrap().expect("key not found");
        assert_eq!(value.as_slice(), b"fine");
    }

    #[test]
    fn the_on_disk_order_wins_over_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order");

        let tree = Config::new(&path).order(4).open().unwrap();
        assert_eq!(tree.order(), 4);
        tree.close().unwrap();

        let tree = Config::new(&path).order(8).open().unwrap();
        assert_eq!(tree.order(), 4);
    }

    #[test]
    fn orders_below_the_minimum_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::new(dir.path().join("tiny"))
            .order(2)
            .open()
            .unwrap_err();
        assert!(matches!(error.kind, ErrorKind::Message(_)));
    }

    #[test]
    fn a_second_open_of_the_same_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exclusive");
        let tree = Tree::open(&path).unwrap();

        let error = Tree::open(&path).unwrap_err();
        assert!(matches!(error.kind, ErrorKind::Locked { .. }));

        tree.close().unwrap();
        assert!(Tree::open(&path).is_ok());
    }

    #[test]
    fn get_multiple_omits_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Tree::open(dir.path().join("multiple")).unwrap();
        tree.set(b"a", b"1").unwrap();
        tree.set(b"c", b"3").unwrap();

        let results = tree.get_multiple(&[b"a", b"b", b"c"]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.as_slice(), b"a");
        assert_eq!(results[0].1.as_slice(), b"1");
        assert_eq!(results[1].0.as_slice(), b"c");
        assert_eq!(results[1].1.as_slice(), b"3");
    }

    #[derive(Debug)]
    struct ReverseOrder;

    impl Comparator for ReverseOrder {
        fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
            b.cmp(a)
        }
    }

    #[test]
    fn a_custom_comparator_orders_the_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Config::new(dir.path().join("reverse"))
            .order(4)
            .comparator(ReverseOrder)
            .open()
            .unwrap();

        for index in 0..12_u32 {
            let key = format!("{:02}", index);
            tree.set(key.as_bytes(), key.as_bytes()).unwrap();
        }

        // Under the reversed ordering, "11" is the smallest key.
        let mut visited = Vec::new();
        tree.range(b"11", b"00", |key, _value| {
            visited.push(key.to_vec());
            Ok(())
        })
        .map_err(AbortError::infallible)
        .unwrap();
        assert_eq!(visited.len(), 12);
        assert_eq!(visited.first().unwrap().as_slice(), b"11");
        assert_eq!(visited.last().unwrap().as_slice(), b"00");
    }
}
