//! The object model of the store: commits, trees, blobs, and the
//! presentation of tree entries as file system entries.

use std::fmt;

use crate::oid::Oid;

/// The kind of an object in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
}

impl ObjectKind {
    /// The marker used for this kind in listing metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One commit, as decoded from a batch listing: its own identifier and the
/// identifier of its root tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: Oid,
    pub tree: Oid,
}

/// One entry of a tree listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// POSIX-style mode bits, as recorded in the tree.
    pub mode: u32,
    /// Either [`ObjectKind::Blob`] or [`ObjectKind::Tree`]; the listing
    /// parser rejects anything else.
    pub kind: ObjectKind,
    pub id: Oid,
    /// The entry name, verbatim. Not guaranteed to be valid text.
    pub name: Vec<u8>,
}

impl TreeEntry {
    /// How this entry presents in a directory listing.
    pub fn file_kind(&self) -> FileKind {
        FileKind::from_mode(self.mode)
    }
}

/// File type modes recorded on tree entries.
pub mod mode {
    pub const DIRECTORY: u32 = 0o040000;
    pub const SYMLINK: u32 = 0o120000;
    pub const REGULAR: u32 = 0o100644;
    pub const EXECUTABLE: u32 = 0o100755;
}

/// The presentation of a directory entry, derived from its mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Symlink,
    Regular,
}

impl FileKind {
    /// Derive the presentation from POSIX-style mode bits.
    ///
    /// An unrecognized mode degrades to a regular file with a diagnostic;
    /// it never fails the containing listing.
    pub fn from_mode(mode: u32) -> Self {
        match mode {
            mode::DIRECTORY => Self::Directory,
            mode::SYMLINK => Self::Symlink,
            mode::REGULAR | mode::EXECUTABLE => Self::Regular,
            _ => {
                log::warn!("unhandled mode {mode:#o}, presenting as a regular file");
                Self::Regular
            }
        }
    }
}
