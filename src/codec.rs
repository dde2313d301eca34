use std::fmt::Debug;

use crate::Error;

/// A compression codec applied to every page image and value chunk written to
/// a tree file.
///
/// The head records that identify the durable root are the only uncompressed
/// records in the file. Codec failures are fatal to the operation that
/// triggered them and are reported as [`ErrorKind::Codec`](crate::ErrorKind).
pub trait Codec: Debug + Send + Sync + 'static {
    /// Returns the largest number of bytes `compress` could produce for a
    /// payload of `source_len` bytes.
    fn max_compressed_len(&self, source_len: usize) -> usize;

    /// Compresses `source` into `destination`, returning the number of bytes
    /// written. `destination` is at least `max_compressed_len(source.len())`
    /// bytes.
    fn compress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, Error>;

    /// Returns the decompressed length of the compressed payload `source`.
    fn decompressed_len(&self, source: &[u8]) -> Result<usize, Error>;

    /// Decompresses `source` into `destination`, returning the number of
    /// bytes written. `destination` is at least `decompressed_len(source)`
    /// bytes.
    fn decompress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, Error>;
}

/// The snappy compression codec. This is the default codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct Snappy;

impl Codec for Snappy {
    fn max_compressed_len(&self, source_len: usize) -> usize {
        snap::raw::max_compress_len(source_len)
    }

    fn compress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, Error> {
        snap::raw::Encoder::new()
            .compress(source, destination)
            .map_err(Error::codec)
    }

    fn decompressed_len(&self, source: &[u8]) -> Result<usize, Error> {
        snap::raw::decompress_len(source).map_err(Error::codec)
    }

    fn decompress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, Error> {
        snap::raw::Decoder::new()
            .decompress(source, destination)
            .map_err(Error::codec)
    }
}
