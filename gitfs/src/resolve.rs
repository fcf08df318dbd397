//! Lazy resolution of slash-separated paths against the tree graph.

use thiserror::Error;

use crate::{
    backend::{self, Backend},
    object::ObjectKind,
    oid::Oid,
    parse,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] backend::Error),
    #[error(transparent)]
    Listing(#[from] parse::error::Tree),
    #[error("no subtree named {name:?} under {tree}")]
    MissingSubtree { tree: Oid, name: String },
}

/// Resolve `path`, relative to the tree identified by `root`, to the
/// identifier of the directory it names.
///
/// Components are matched byte-wise against Tree-kind entries only: a blob
/// carrying the requested name does not satisfy a path component. The
/// empty path (and any run of slashes) resolves to `root` unchanged.
///
/// One backend query is issued per path level; nothing is memoized across
/// calls.
pub fn resolve(backend: &dyn Backend, root: Oid, path: &[u8]) -> Result<Oid, Error> {
    let mut tree = root;
    for component in path.split(|b| *b == b'/').filter(|c| !c.is_empty()) {
        log::trace!(
            "resolving {:?} under {tree}",
            String::from_utf8_lossy(component)
        );
        let listing = parse::tree_listing(&backend.list_tree(&tree)?)?;
        tree = listing
            .iter()
            .find(|entry| entry.kind == ObjectKind::Tree && entry.name == component)
            .map(|entry| entry.id)
            .ok_or_else(|| Error::MissingSubtree {
                tree,
                name: String::from_utf8_lossy(component).into_owned(),
            })?;
    }
    Ok(tree)
}
