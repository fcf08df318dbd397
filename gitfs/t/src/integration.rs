//! Tests against a throwaway repository built with the real `git` binary.

use std::{path::Path, process::Command, sync::Arc};

use gitfs::{backend::Git, fs::Node, FileKind, GitFs};
use pretty_assertions::assert_eq;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .env("HOME", dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn browses_a_real_repository() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    git(dir, &["init", "-q"]);
    std::fs::write(dir.join("README.md"), b"hello, history\n").unwrap();
    std::fs::create_dir(dir.join("src")).unwrap();
    std::fs::write(dir.join("src/lib.rs"), b"// nothing yet\n").unwrap();
    std::os::unix::fs::symlink("README.md", dir.join("link")).unwrap();
    git(dir, &["add", "."]);
    git(
        dir,
        &[
            "-c",
            "user.name=history",
            "-c",
            "user.email=history@example.com",
            "commit",
            "-q",
            "-m",
            "first",
        ],
    );

    let fs = GitFs::new(Arc::new(Git::new(dir.join(".git"))));
    let root = fs.root();

    // One commit: its id as a symlink-like reference, its tree as a
    // directory.
    let entries = root.read_dir().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, FileKind::Symlink);
    assert_eq!(entries[1].kind, FileKind::Directory);

    let Node::Directory(snapshot) = root.lookup(&entries[1].name).unwrap() else {
        panic!("expected the root tree to be a directory");
    };

    let listing = snapshot.read_dir().unwrap();
    let kinds: Vec<(&[u8], FileKind)> = listing
        .iter()
        .map(|e| (e.name.as_slice(), e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (&b"README.md"[..], FileKind::Regular),
            (&b"link"[..], FileKind::Symlink),
            (&b"src"[..], FileKind::Directory),
        ],
    );

    let Node::File(readme) = snapshot.lookup(b"README.md").unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(readme.attr().size, 15);
    assert_eq!(readme.read().unwrap(), b"hello, history\n");

    let Node::File(link) = snapshot.lookup(b"link").unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(link.attr().kind, FileKind::Symlink);
    assert_eq!(link.read().unwrap(), b"README.md");

    let Node::Directory(src) = snapshot.lookup(b"src").unwrap() else {
        panic!("expected a directory");
    };
    let Node::File(lib) = src.lookup(b"lib.rs").unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(lib.read().unwrap(), b"// nothing yet\n");
}

#[test]
fn an_empty_repository_projects_an_empty_root() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    git(tmp.path(), &["init", "-q"]);

    let fs = GitFs::new(Arc::new(Git::new(tmp.path().join(".git"))));
    assert_eq!(fs.root().read_dir().unwrap(), vec![]);
}
