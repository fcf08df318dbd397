//! The `gitfs` crate projects the full history of a [git object
//! store][git-objects] as a read-only file system: the root directory
//! lists every commit in the store, each commit's root tree is a browsable
//! directory named by its identifier, and historical file content is read
//! through ordinary file system calls.
//!
//! The object graph is never materialized. Each request decodes just the
//! backend output it needs (the batch listing of commits, one tree
//! listing per path level, one blob per read) and retains nothing
//! afterwards. [`backend::Backend`] is the seam to the store; the
//! [`backend::Git`] implementation queries a repository through the `git`
//! command-line tool.
//!
//! The entry point is [`GitFs::root`]; a kernel-facing binding drives the
//! per-node [`fs::Directory`] and [`fs::File`] operations from there.
//!
//! [git-objects]: https://git-scm.com/book/en/v2/Git-Internals-Git-Objects

pub mod backend;
pub use backend::Backend;

pub mod fs;
pub use fs::GitFs;

pub mod object;
pub use object::{CommitRecord, FileKind, ObjectKind, TreeEntry};

pub mod oid;
pub use oid::{Format, Oid};

pub mod parse;

pub mod resolve;
