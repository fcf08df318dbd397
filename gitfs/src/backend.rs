//! The object-store backend.
//!
//! The projection never materializes the object graph: every file system
//! call issues one or a few backend queries and decodes the raw bytes it
//! gets back. [`Backend`] is the seam: four query operations, each
//! returning a wire format decoded by [`crate::parse`].

use std::{io, process::ExitStatus};

use thiserror::Error;

use crate::oid::Oid;

pub mod git;
pub use git::Git;

/// A query failure in the backend.
///
/// Wraps the underlying cause; the projection logs it and collapses it at
/// its boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to run {command}: {err}")]
    Io {
        command: String,
        #[source]
        err: io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Read access to a content-addressable object store.
///
/// Implementations must tolerate concurrent invocation: the kernel-facing
/// binding may issue requests in any interleaving, and there is no cache
/// whose coherence would demand ordering.
pub trait Backend: Send + Sync {
    /// Every commit reachable from any ref, as a batch listing decoded by
    /// [`crate::parse::commit_batch`].
    fn list_commits(&self) -> Result<Vec<u8>, Error>;

    /// The direct children of `tree` (non-recursive), as a tree listing
    /// decoded by [`crate::parse::tree_listing`].
    fn list_tree(&self, tree: &Oid) -> Result<Vec<u8>, Error>;

    /// The size in bytes of blob `id`: decimal digits, optionally
    /// newline-terminated.
    fn blob_size(&self, id: &Oid) -> Result<Vec<u8>, Error>;

    /// The raw content of blob `id`, verbatim.
    fn blob_content(&self, id: &Oid) -> Result<Vec<u8>, Error>;
}
