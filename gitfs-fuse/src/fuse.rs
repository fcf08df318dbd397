//! The kernel-facing binding: inode bookkeeping and request dispatch.
//!
//! The projection reconstructs every node from scratch per call, so this
//! layer keeps only the mapping the kernel forces on it: an inode number
//! for each node the kernel currently holds a reference to. Inodes are
//! allocated on lookup and dropped on forget; all reply TTLs are zero.

use std::{
    collections::HashMap,
    ffi::OsStr,
    os::unix::ffi::OsStrExt as _,
    time::{Duration, SystemTime},
};

use fuser::{
    FileAttr, FileType, ReplyAttr, ReplyData, ReplyDirectory, ReplyEntry, Request,
};
use gitfs::{
    fs::{self, Attr, Node},
    FileKind, GitFs,
};

const ROOT_INO: u64 = 1;

const TTL: Duration = Duration::ZERO;

pub struct Fs {
    fs: GitFs,
    nodes: HashMap<u64, Node>,
    next_ino: u64,
    uid: u32,
    gid: u32,
}

impl Fs {
    pub fn new(fs: GitFs) -> Self {
        Self {
            fs,
            nodes: HashMap::new(),
            next_ino: ROOT_INO + 1,
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
        }
    }

    fn node(&self, ino: u64) -> Option<Node> {
        if ino == ROOT_INO {
            return Some(Node::Directory(self.fs.root()));
        }
        self.nodes.get(&ino).cloned()
    }

    fn insert(&mut self, node: Node) -> u64 {
        let ino = self.next_ino;
        self.next_ino += 1;
        self.nodes.insert(ino, node);
        ino
    }

    fn file_attr(&self, ino: u64, attr: Attr) -> FileAttr {
        let now = SystemTime::now();
        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.size.div_ceil(512),
            atime: now,
            mtime: now,
            ctime: now,
            crtime: now,
            kind: file_type(attr.kind),
            perm: (attr.mode & 0o7777) as u16,
            nlink: match attr.kind {
                FileKind::Directory => 2,
                _ => 1,
            },
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: 512,
            flags: 0,
        }
    }
}

impl fuser::Filesystem for Fs {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(Node::Directory(dir)) = self.node(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        match dir.lookup(name.as_bytes()) {
            Ok(node) => {
                let attr = node.attr();
                let ino = self.insert(node);
                reply.entry(&TTL, &self.file_attr(ino, attr), 0);
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn forget(&mut self, _req: &Request<'_>, ino: u64, _nlookup: u64) {
        self.nodes.remove(&ino);
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        match self.node(ino) {
            Some(node) => reply.attr(&TTL, &self.file_attr(ino, node.attr())),
            None => reply.error(libc::ENOENT),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let dir = match self.node(ino) {
            Some(Node::Directory(dir)) => dir,
            Some(Node::File(_)) => {
                reply.error(libc::ENOTDIR);
                return;
            }
            None => {
                reply.error(libc::ENOENT);
                return;
            }
        };
        match dir.read_dir() {
            Ok(entries) => {
                for (i, entry) in entries.iter().enumerate().skip(offset as usize) {
                    // The listing carries no stable inode numbers; the
                    // kernel learns real ones through lookup.
                    let filler = ino.wrapping_add(i as u64 + 1);
                    let name = OsStr::from_bytes(&entry.name);
                    if reply.add(filler, (i + 1) as i64, file_type(entry.kind), name) {
                        break;
                    }
                }
                reply.ok();
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Some(Node::File(file)) = self.node(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        match file.read() {
            Ok(data) => {
                let start = (offset.max(0) as usize).min(data.len());
                let end = start.saturating_add(size as usize).min(data.len());
                reply.data(&data[start..end]);
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        // A symlink's target is the body of its blob.
        match self.node(ino) {
            Some(Node::File(file)) if file.attr().kind == FileKind::Symlink => {
                match file.read() {
                    Ok(target) => reply.data(&target),
                    Err(err) => reply.error(errno(err)),
                }
            }
            Some(_) => reply.error(libc::EINVAL),
            None => reply.error(libc::ENOENT),
        }
    }
}

fn file_type(kind: FileKind) -> FileType {
    match kind {
        FileKind::Directory => FileType::Directory,
        FileKind::Symlink => FileType::Symlink,
        FileKind::Regular => FileType::RegularFile,
    }
}

fn errno(err: fs::Error) -> i32 {
    match err {
        fs::Error::NotFound => libc::ENOENT,
        fs::Error::Io => libc::EIO,
    }
}
