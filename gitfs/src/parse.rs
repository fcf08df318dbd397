//! Decoders for the backend's record formats.
//!
//! Three wire formats feed the projection: the batch listing describing
//! commits (a `<id> <type> <size>` header line followed by exactly `size`
//! payload bytes and a separator), the tree listing
//! (`<mode> <type> <id>\t<name>\0` entries), and the commit payload itself
//! (`<key> <value>` header lines terminated by a blank line, then the
//! message).
//!
//! Every decoder fails on the first malformed record, carrying the
//! offending bytes in its error. Nothing is skipped or repaired.

use std::str;

use crate::{
    object::{CommitRecord, ObjectKind, TreeEntry},
    oid::{Oid, FORMAT},
};

pub mod error {
    use thiserror::Error;

    use crate::oid::{self, Oid};

    /// A malformed commit payload.
    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum Commit {
        #[error("no blank line terminating the commit header")]
        MissingHeaderEnd,
        #[error("no 'tree' header in commit")]
        MissingTree,
        #[error("invalid 'tree' header: {0}")]
        InvalidTree(#[from] oid::error::Parse),
    }

    /// A malformed batch listing.
    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum Batch {
        #[error("invalid header line {0:?}: expected '<id> <type> <size>'")]
        Fields(String),
        #[error("invalid header line {0:?}: {1}")]
        Id(String, #[source] oid::error::Parse),
        #[error("invalid header line {0:?}: object type is not 'commit'")]
        Kind(String),
        #[error("invalid header line {0:?}: invalid size")]
        Size(String),
        #[error("record {id} truncated: {declared} payload bytes declared, {remaining} remaining")]
        Truncated {
            id: Oid,
            declared: usize,
            remaining: usize,
        },
        #[error("commit {id}: {err}")]
        Commit {
            id: Oid,
            #[source]
            err: Commit,
        },
    }

    /// A malformed tree listing.
    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum Tree {
        #[error("no tab in entry metadata {0:?}")]
        MissingTab(String),
        #[error("invalid entry metadata {0:?}: expected '<mode> <type> <id>'")]
        Fields(String),
        #[error("invalid entry metadata {0:?}: invalid octal mode")]
        Mode(String),
        #[error("invalid entry metadata {0:?}: unsupported object type")]
        Kind(String),
        #[error("invalid entry metadata {0:?}: {1}")]
        Id(String, #[source] oid::error::Parse),
        #[error("entry name missing NUL terminator after metadata {0:?}")]
        MissingNul(String),
    }
}

/// Decode a batch listing into commit records, preserving encounter order.
///
/// Decoding stops cleanly at an empty remainder: a short trailing line (no
/// newline, or an empty line) terminates the listing without inventing a
/// record.
pub fn commit_batch(mut data: &[u8]) -> Result<Vec<CommitRecord>, error::Batch> {
    let mut records = Vec::new();
    loop {
        let Some((line, rest)) = cut(data, b'\n') else {
            break;
        };
        if line.is_empty() {
            break;
        }

        let Ok(text) = str::from_utf8(line) else {
            return Err(error::Batch::Fields(lossy(line)));
        };
        let fields: Vec<&str> = text.split(' ').collect();
        let [id, kind, size] = fields.as_slice() else {
            return Err(error::Batch::Fields(lossy(line)));
        };
        let id = Oid::from_hex(FORMAT, id.as_bytes())
            .map_err(|err| error::Batch::Id(lossy(line), err))?;
        if *kind != ObjectKind::Commit.as_str() {
            return Err(error::Batch::Kind(lossy(line)));
        }
        let size: usize = size.parse().map_err(|_| error::Batch::Size(lossy(line)))?;
        if rest.len() < size {
            return Err(error::Batch::Truncated {
                id,
                declared: size,
                remaining: rest.len(),
            });
        }

        let tree = commit_tree(&rest[..size]).map_err(|err| error::Batch::Commit { id, err })?;
        records.push(CommitRecord { id, tree });

        // Step over the payload and its separator byte. A record ending
        // flush with the buffer leaves an empty remainder.
        data = rest.get(size + 1..).unwrap_or(&[]);
    }
    Ok(records)
}

/// Extract the root tree identifier from a raw commit payload.
///
/// Only the first `tree` header is honored.
pub fn commit_tree(payload: &[u8]) -> Result<Oid, error::Commit> {
    let end = payload
        .windows(2)
        .position(|w| w == b"\n\n")
        .ok_or(error::Commit::MissingHeaderEnd)?;
    for line in payload[..end].split(|b| *b == b'\n') {
        // Continuation lines (leading space) produce an empty key here and
        // are passed over like any other header.
        let Some((key, value)) = cut(line, b' ') else {
            continue;
        };
        if key == b"tree" {
            return Ok(Oid::from_hex(FORMAT, value)?);
        }
    }
    Err(error::Commit::MissingTree)
}

/// Decode a tree listing into entries, preserving listing order.
///
/// Entry names are taken verbatim, byte for byte. A `commit`-typed entry
/// (a submodule reference) is rejected as unsupported.
pub fn tree_listing(mut data: &[u8]) -> Result<Vec<TreeEntry>, error::Tree> {
    let mut entries = Vec::new();
    while !data.is_empty() {
        let (meta, rest) =
            cut(data, b'\t').ok_or_else(|| error::Tree::MissingTab(lossy(data)))?;
        let Ok(text) = str::from_utf8(meta) else {
            return Err(error::Tree::Fields(lossy(meta)));
        };
        let fields: Vec<&str> = text.split(' ').collect();
        let [mode, kind, id] = fields.as_slice() else {
            return Err(error::Tree::Fields(lossy(meta)));
        };
        let mode = u32::from_str_radix(mode, 8).map_err(|_| error::Tree::Mode(lossy(meta)))?;
        let kind = match *kind {
            "blob" => ObjectKind::Blob,
            "tree" => ObjectKind::Tree,
            _ => return Err(error::Tree::Kind(lossy(meta))),
        };
        let id = Oid::from_hex(FORMAT, id.as_bytes())
            .map_err(|err| error::Tree::Id(lossy(meta), err))?;
        let (name, rest) =
            cut(rest, b'\0').ok_or_else(|| error::Tree::MissingNul(lossy(meta)))?;

        entries.push(TreeEntry {
            mode,
            kind,
            id,
            name: name.to_vec(),
        });
        data = rest;
    }
    Ok(entries)
}

// Split `data` at the first occurrence of `sep`, excluding the separator.
fn cut(data: &[u8], sep: u8) -> Option<(&[u8], &[u8])> {
    data.iter()
        .position(|b| *b == sep)
        .map(|at| (&data[..at], &data[at + 1..]))
}

// Diagnostic rendering of raw bytes, trimmed to a sane length.
fn lossy(data: &[u8]) -> String {
    const LIMIT: usize = 80;
    String::from_utf8_lossy(&data[..data.len().min(LIMIT)]).into_owned()
}
