//! The file system projection.
//!
//! A small set of node variants answers listing, lookup, attribute, and
//! read requests by composing the parsers and the path resolver. Every
//! node is constructed fresh per request and owns only its identifying
//! fields plus a handle to the backend; no listing, connection, or lock
//! survives past the call that created it.

use std::{fmt, str, sync::Arc};

use thiserror::Error;

use crate::{
    backend::{self, Backend},
    object::{mode, FileKind, TreeEntry},
    oid::{Oid, FORMAT},
    parse, resolve,
};

/// The error vocabulary visible at the file system boundary.
///
/// Internal failures (malformed backend output, failed queries) are
/// logged with their full context and collapsed into this deliberately
/// narrow set; internal detail never reaches the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("no such entry")]
    NotFound,
    #[error("backend read failed")]
    Io,
}

// Everything that can go wrong while answering a single request, kept
// around long enough to be logged before it is collapsed.
#[derive(Debug, Error)]
enum Failure {
    #[error(transparent)]
    Backend(#[from] backend::Error),
    #[error(transparent)]
    Batch(#[from] parse::error::Batch),
    #[error(transparent)]
    Listing(#[from] parse::error::Tree),
    #[error(transparent)]
    Resolve(#[from] resolve::Error),
    #[error("expected exactly one entry named {name:?}, found {found}")]
    Matches { name: String, found: usize },
    #[error("blob size {0:?} is not a decimal integer")]
    Size(String),
}

/// The projection over one backend.
///
/// [`GitFs::root`] is the entry point a kernel-facing binding consumes;
/// everything else is reached through per-node lookups.
#[derive(Clone)]
pub struct GitFs {
    backend: Arc<dyn Backend>,
}

impl GitFs {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The root directory of the projection.
    pub fn root(&self) -> Directory {
        Directory {
            backend: self.backend.clone(),
            kind: DirKind::Root,
        }
    }
}

// What a `Directory` node denotes.
#[derive(Clone, Debug, PartialEq, Eq)]
enum DirKind {
    // The mount root, listing every commit in the store.
    Root,
    // A directory inside some commit's snapshot: the nearest known
    // ancestor tree plus the not-yet-resolved suffix path.
    Tree { tree: Oid, path: Vec<u8> },
}

/// A directory node.
#[derive(Clone)]
pub struct Directory {
    backend: Arc<dyn Backend>,
    kind: DirKind,
}

/// A leaf node, fully resolved and safe to read immediately.
#[derive(Clone)]
pub struct File {
    backend: Arc<dyn Backend>,
    name: Vec<u8>,
    id: Oid,
    mode: u32,
    size: u64,
}

/// Any node a lookup can produce.
#[derive(Clone, Debug)]
pub enum Node {
    Directory(Directory),
    File(File),
}

impl Node {
    pub fn attr(&self) -> Attr {
        match self {
            Self::Directory(dir) => dir.attr(),
            Self::File(file) => file.attr(),
        }
    }
}

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    /// The entry name, verbatim bytes.
    pub name: Vec<u8>,
    pub kind: FileKind,
}

/// Node attributes: presentation kind, POSIX-style mode bits, byte size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attr {
    pub kind: FileKind,
    pub mode: u32,
    pub size: u64,
}

impl Directory {
    /// Directory attributes; directories are read-and-list-only.
    pub fn attr(&self) -> Attr {
        Attr {
            kind: FileKind::Directory,
            mode: mode::DIRECTORY | 0o555,
            size: 0,
        }
    }

    /// List this directory.
    ///
    /// The root lists two entries per commit: the commit id, presented as
    /// a symlink-like reference, and its root tree id, presented as a
    /// directory. A tree directory lists the entries of its resolved tree
    /// in listing order.
    pub fn read_dir(&self) -> Result<Vec<DirEntry>, Error> {
        match &self.kind {
            DirKind::Root => self.read_root().map_err(|err| {
                log::error!("root listing failed: {err}");
                Error::NotFound
            }),
            DirKind::Tree { tree, path } => self.read_tree(*tree, path).map_err(|err| {
                log::error!(
                    "listing {} ({:?}) failed: {err}",
                    tree,
                    String::from_utf8_lossy(path)
                );
                Error::NotFound
            }),
        }
    }

    /// Look up `name` in this directory.
    ///
    /// At the root, any name of digest length is admitted as a tree
    /// directory; its existence is only checked by the first listing or
    /// read against it. In a tree directory, the name must match exactly
    /// one entry of the resolved tree.
    pub fn lookup(&self, name: &[u8]) -> Result<Node, Error> {
        match &self.kind {
            DirKind::Root => self.lookup_root(name),
            DirKind::Tree { tree, path } => self.lookup_tree(*tree, path, name).map_err(|err| {
                log::warn!(
                    "lookup of {:?} under {} ({:?}) failed: {err}",
                    String::from_utf8_lossy(name),
                    tree,
                    String::from_utf8_lossy(path)
                );
                Error::NotFound
            }),
        }
    }

    fn read_root(&self) -> Result<Vec<DirEntry>, Failure> {
        let records = parse::commit_batch(&self.backend.list_commits()?)?;
        let mut entries = Vec::with_capacity(records.len() * 2);
        for record in &records {
            entries.push(DirEntry {
                name: record.id.to_string().into_bytes(),
                kind: FileKind::Symlink,
            });
            entries.push(DirEntry {
                name: record.tree.to_string().into_bytes(),
                kind: FileKind::Directory,
            });
        }
        Ok(entries)
    }

    fn read_tree(&self, tree: Oid, path: &[u8]) -> Result<Vec<DirEntry>, Failure> {
        let effective = resolve::resolve(self.backend.as_ref(), tree, path)?;
        let listing = parse::tree_listing(&self.backend.list_tree(&effective)?)?;
        Ok(listing
            .into_iter()
            .map(|entry| DirEntry {
                kind: entry.file_kind(),
                name: entry.name,
            })
            .collect())
    }

    fn lookup_root(&self, name: &[u8]) -> Result<Node, Error> {
        match Oid::from_hex(FORMAT, name) {
            Ok(tree) => Ok(Node::Directory(Directory {
                backend: self.backend.clone(),
                kind: DirKind::Tree {
                    tree,
                    path: Vec::new(),
                },
            })),
            Err(err) => {
                log::debug!(
                    "root lookup of {:?} fell through: {err}",
                    String::from_utf8_lossy(name)
                );
                Err(Error::NotFound)
            }
        }
    }

    fn lookup_tree(&self, tree: Oid, path: &[u8], name: &[u8]) -> Result<Node, Failure> {
        let parent = resolve::resolve(self.backend.as_ref(), tree, path)?;
        let listing = parse::tree_listing(&self.backend.list_tree(&parent)?)?;

        let matches: Vec<&TreeEntry> = listing.iter().filter(|e| e.name == name).collect();
        let [entry] = matches.as_slice() else {
            return Err(Failure::Matches {
                name: String::from_utf8_lossy(name).into_owned(),
                found: matches.len(),
            });
        };

        if entry.mode == mode::DIRECTORY {
            return Ok(Node::Directory(Directory {
                backend: self.backend.clone(),
                kind: DirKind::Tree {
                    tree,
                    path: join(path, name),
                },
            }));
        }

        let size = blob_size(self.backend.as_ref(), &entry.id)?;
        Ok(Node::File(File {
            backend: self.backend.clone(),
            name: entry.name.clone(),
            id: entry.id,
            mode: entry.mode,
            size,
        }))
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            DirKind::Root => f.debug_struct("Directory").field("kind", &"root").finish(),
            DirKind::Tree { tree, path } => f
                .debug_struct("Directory")
                .field("tree", tree)
                .field("path", &String::from_utf8_lossy(path))
                .finish(),
        }
    }
}

impl File {
    /// The entry name, verbatim bytes.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// The identifier of the blob holding this file's content.
    pub fn id(&self) -> Oid {
        self.id
    }

    /// File attributes: the mode and size recorded on the tree entry,
    /// verbatim. No content is inspected.
    pub fn attr(&self) -> Attr {
        Attr {
            kind: FileKind::from_mode(self.mode),
            mode: self.mode,
            size: self.size,
        }
    }

    /// The full blob content, unmodified.
    pub fn read(&self) -> Result<Vec<u8>, Error> {
        self.backend.blob_content(&self.id).map_err(|err| {
            log::error!("reading blob {} failed: {err}", self.id);
            Error::Io
        })
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &String::from_utf8_lossy(&self.name))
            .field("id", &self.id)
            .field("mode", &format_args!("{:#o}", self.mode))
            .field("size", &self.size)
            .finish()
    }
}

fn blob_size(backend: &dyn Backend, id: &Oid) -> Result<u64, Failure> {
    let raw = backend.blob_size(id)?;
    let digits = raw.strip_suffix(b"\n").unwrap_or(&raw);
    str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Failure::Size(String::from_utf8_lossy(&raw).into_owned()))
}

fn join(path: &[u8], name: &[u8]) -> Vec<u8> {
    if path.is_empty() {
        return name.to_vec();
    }
    let mut joined = Vec::with_capacity(path.len() + 1 + name.len());
    joined.extend_from_slice(path);
    joined.push(b'/');
    joined.extend_from_slice(name);
    joined
}
