//! Mount the history of a git object store as a read-only file system.
//!
//! Usage: `gitfs-fuse <gitdir> <mountpoint>`. Every commit in the store
//! appears in the mount root; each commit's root tree is a browsable
//! directory named by its identifier.

use std::{env, process::ExitCode, sync::Arc};

use fuser::MountOption;
use gitfs::{backend::Git, GitFs};

mod fuse;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args_os().skip(1);
    let (Some(git_dir), Some(mountpoint), None) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: gitfs-fuse <gitdir> <mountpoint>");
        return ExitCode::FAILURE;
    };

    log::info!("serving {git_dir:?} at {mountpoint:?}");
    let backend = Arc::new(Git::new(git_dir));
    let options = [
        MountOption::RO,
        MountOption::FSName("gitfs".into()),
        MountOption::Subtype("gitfs".into()),
    ];
    if let Err(err) = fuser::mount2(fuse::Fs::new(GitFs::new(backend)), &mountpoint, &options) {
        eprintln!("gitfs-fuse: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
