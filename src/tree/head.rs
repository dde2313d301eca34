use byteorder::BigEndian;
use zerocopy::{byteorder::U64, AsBytes, FromBytes, LayoutVerified, Unaligned};

/// Identifies a tree file. The first eight bytes of every head record.
pub(crate) const MAGIC: [u8; 8] = *b"burltree";

/// The file format version written by this crate.
pub(crate) const VERSION: u64 = 1;

/// The exact on-disk size of a head record. A multiple of the record
/// padding, so candidate windows during recovery line up with record starts.
pub(crate) const HEAD_SIZE: u64 = std::mem::size_of::<HeadRecord>() as u64;

/// The durable root pointer.
///
/// A head record is appended, uncompressed, after every mutation that
/// changes the root. The most recently written valid record wins: recovery
/// scans backwards from the end of the file and everything past the record
/// it finds is discarded garbage. All fields are big-endian.
#[derive(FromBytes, AsBytes, Unaligned, Clone, Copy, Debug)]
#[repr(C)]
pub(crate) struct HeadRecord {
    magic: [u8; 8],
    version: U64<BigEndian>,
    order: U64<BigEndian>,
    root_position: U64<BigEndian>,
    root_config: U64<BigEndian>,
}

impl HeadRecord {
    pub fn new(order: u64, root_position: u64, root_config: u64) -> Self {
        Self {
            magic: MAGIC,
            version: U64::new(VERSION),
            order: U64::new(order),
            root_position: U64::new(root_position),
            root_config: U64::new(root_config),
        }
    }

    /// Decodes `bytes` as a head record, accepting it only if the magic and
    /// version match.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let record = LayoutVerified::<_, Self>::new_unaligned(bytes)?;
        if record.magic == MAGIC && record.version.get() == VERSION {
            Some(*record)
        } else {
            None
        }
    }

    pub fn order(&self) -> u64 {
        self.order.get()
    }

    pub fn root_position(&self) -> u64 {
        self.root_position.get()
    }

    pub fn root_config(&self) -> u64 {
        self.root_config.get()
    }
}
