use std::{cmp::Ordering, fmt::Debug};

/// A total ordering over keys, supplied by the host application.
///
/// The ordering must be deterministic and transitive, but does not need to be
/// byte-lexicographic. Every key stored in a tree is compared with this
/// ordering; the leftmost sentinel of an interior page is never passed to it.
///
/// Changing the comparator of an existing file reorders nothing on disk and
/// will break lookups: a file must always be opened with the comparator it
/// was written with.
pub trait Comparator: Debug + Send + Sync + 'static {
    /// Compares two keys.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Byte-lexicographic key ordering. This is the default comparator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexicographic;

impl Comparator for Lexicographic {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}
