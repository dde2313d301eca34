use std::{
    convert::TryFrom,
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use fs4::FileExt;

use crate::{buffer::Bytes, codec::Codec, error::ErrorKind, Error};

/// Alignment unit for records within a tree file.
///
/// Every record begins at a multiple of this many bytes; zero padding is
/// appended ahead of a record to restore the alignment. It is also the step
/// used when scanning backwards through a file for the most recent head
/// record, so it is a format constant: changing it invalidates existing
/// files.
pub const RECORD_PADDING: u64 = 8;

const ZEROS: [u8; RECORD_PADDING as usize] = [0; RECORD_PADDING as usize];

/// Append-only access to a backing file.
///
/// All writes go to the end of the file; live bytes are never overwritten.
/// Page images and value chunks pass through the codec, while head records
/// are written raw so their on-disk size is known exactly. The file is held
/// under an exclusive advisory lock until the writer is dropped or closed.
#[derive(Debug)]
pub(crate) struct Writer {
    file: File,
    path: PathBuf,
    length: u64,
    codec: Arc<dyn Codec>,
}

impl Writer {
    /// Opens `path` for appending, creating the file if it does not exist.
    pub fn open(path: impl AsRef<Path>, codec: Arc<dyn Codec>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Self::from_file(file, path.to_path_buf(), codec)
    }

    /// Opens `path` for appending, failing if the file already exists.
    pub fn create_new(path: impl AsRef<Path>, codec: Arc<dyn Codec>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::from(ErrorKind::CompactionInProgress {
                    path: path.to_path_buf(),
                }));
            }
            Err(err) => return Err(Error::from(err)),
        };
        Self::from_file(file, path.to_path_buf(), codec)
    }

    fn from_file(file: File, path: PathBuf, codec: Arc<dyn Codec>) -> Result<Self, Error> {
        file.try_lock_exclusive().map_err(|err| {
            if err.kind() == fs4::lock_contended_error().kind() {
                Error::from(ErrorKind::Locked { path: path.clone() })
            } else {
                Error::from(err)
            }
        })?;
        let length = file.metadata()?.len();
        Ok(Self {
            file,
            path,
            length,
            codec,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> Arc<dyn Codec> {
        self.codec.clone()
    }

    /// The current length of the file in bytes.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Reads `length` bytes at `position` without involving the codec.
    ///
    /// A zero-length read returns an empty buffer. Reading past the current
    /// end of the file fails with `OutOfBounds`.
    pub fn read_raw(&mut self, position: u64, length: u64) -> Result<Bytes, Error> {
        if position.checked_add(length).map_or(true, |end| end > self.length) {
            return Err(Error::from(ErrorKind::OutOfBounds { position, length }));
        }
        if length == 0 {
            return Ok(Bytes::default());
        }
        let length = usize::try_from(length)
            .map_err(|_| Error::message("record length does not fit in memory"))?;
        self.file.seek(SeekFrom::Start(position))?;
        let mut data = vec![0; length];
        self.file.read_exact(&mut data)?;
        Ok(Bytes::from(data))
    }

    /// Reads a compressed chunk of `stored_length` bytes at `position` and
    /// decompresses it.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn read_chunk(&mut self, position: u64, stored_length: u64) -> Result<Bytes, Error> {
        let compressed = self.read_raw(position, stored_length)?;
        let codec = self.codec.clone();
        let mut data = vec![0; codec.decompressed_len(compressed.as_slice())?];
        let written = codec.decompress(compressed.as_slice(), &mut data)?;
        data.truncate(written);
        Ok(Bytes::from(data))
    }

    /// Appends `data` without involving the codec, returning the aligned
    /// position it was written at and its length.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data)))]
    pub fn write_raw(&mut self, data: &[u8]) -> Result<(u64, u64), Error> {
        self.pad_to_alignment()?;
        let position = self.length;
        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(data)?;
        self.length += data.len() as u64;
        Ok((position, data.len() as u64))
    }

    /// Compresses `data` and appends it, returning the aligned position and
    /// the stored (compressed) length.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data)))]
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(u64, u64), Error> {
        let codec = self.codec.clone();
        let mut scratch = vec![0; codec.max_compressed_len(data.len())];
        let compressed_len = codec.compress(data, &mut scratch)?;
        self.write_raw(&scratch[..compressed_len])
    }

    fn pad_to_alignment(&mut self) -> Result<(), Error> {
        let trailing = self.length % RECORD_PADDING;
        if trailing != 0 {
            self.file.seek(SeekFrom::Start(self.length))?;
            self.file
                .write_all(&ZEROS[..(RECORD_PADDING - trailing) as usize])?;
            self.length += RECORD_PADDING - trailing;
        }
        Ok(())
    }

    /// Scans backwards from the end of the file for the most recent record
    /// `probe` accepts, reading `record_length`-byte windows at every
    /// [`RECORD_PADDING`] boundary. Each window is read into a fresh buffer.
    ///
    /// Returns `Ok(None)` when the scan reaches the start of the file
    /// without a match.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, probe)))]
    pub fn find_last<T>(
        &mut self,
        record_length: u64,
        mut probe: impl FnMut(&[u8]) -> Option<T>,
    ) -> Result<Option<T>, Error> {
        // A torn tail from an interrupted append would shift every candidate
        // window off the record grid.
        self.pad_to_alignment()?;
        if self.length < record_length {
            return Ok(None);
        }

        let mut position = self.length - record_length;
        loop {
            let window = self.read_raw(position, record_length)?;
            if let Some(found) = probe(window.as_slice()) {
                return Ok(Some(found));
            }
            if position == 0 {
                return Ok(None);
            }
            position -= RECORD_PADDING;
        }
    }

    /// Forces buffered writes to the storage device.
    pub fn sync(&mut self) -> Result<(), Error> {
        self.file.sync_data().map_err(Error::from)
    }

    /// Flushes and releases the file.
    pub fn close(mut self) -> Result<(), Error> {
        self.file.flush()?;
        self.file.sync_all().map_err(Error::from)
    }
}
