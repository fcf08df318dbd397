//! A backend over the `git` command-line tool.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    thread,
};

use super::{Backend, Error};
use crate::oid::Oid;

/// Queries a repository by running `git` with `GIT_DIR` pointing at it.
///
/// Each query spawns its own process; the backend itself holds no state
/// beyond the repository path and is freely shared across threads.
#[derive(Clone, Debug)]
pub struct Git {
    git_dir: PathBuf,
}

impl Git {
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
        }
    }

    /// The repository this backend queries.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.env("GIT_DIR", &self.git_dir).args(args);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, Error> {
        let output = self.command(args).output().map_err(|err| Error::Io {
            command: render(args),
            err,
        })?;
        finish(args, output)
    }

    /// Run `git` with `input` on stdin.
    ///
    /// The input is written from its own thread so both pipes drain
    /// concurrently: a large listing cannot fill one end while the other
    /// blocks.
    fn run_with_input(&self, args: &[&str], input: Vec<u8>) -> Result<Vec<u8>, Error> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::Io {
                command: render(args),
                err,
            })?;
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&input)));
        let output = child.wait_with_output().map_err(|err| Error::Io {
            command: render(args),
            err,
        })?;
        if let Some(writer) = writer {
            // A broken pipe means the command exited early; its status is
            // the more useful diagnostic.
            let _ = writer.join();
        }
        finish(args, output)
    }
}

impl Backend for Git {
    fn list_commits(&self) -> Result<Vec<u8>, Error> {
        let revs = self.run(&["rev-list", "--all"])?;
        self.run_with_input(&["cat-file", "--batch"], revs)
    }

    fn list_tree(&self, tree: &Oid) -> Result<Vec<u8>, Error> {
        self.run(&["ls-tree", "-z", &tree.to_string()])
    }

    fn blob_size(&self, id: &Oid) -> Result<Vec<u8>, Error> {
        self.run(&["cat-file", "-s", &id.to_string()])
    }

    fn blob_content(&self, id: &Oid) -> Result<Vec<u8>, Error> {
        self.run(&["cat-file", "blob", &id.to_string()])
    }
}

fn render(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn finish(args: &[&str], output: Output) -> Result<Vec<u8>, Error> {
    if !output.status.success() {
        log::debug!("{} failed with {}", render(args), output.status);
        return Err(Error::Exit {
            command: render(args),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(output.stdout)
}
