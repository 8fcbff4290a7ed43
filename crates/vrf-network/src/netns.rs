#![allow(unsafe_code)]
//! Network namespace operations.

use std::fs::File;
use std::os::fd::AsRawFd;
use std::path::Path;

use vrf_common::{VrfError, VrfResult};

/// `NSFS_MAGIC` from `linux/magic.h`.
const NSFS_MAGIC: i64 = 0x6e73_6673;

fn namespace_error(path: &Path, source: std::io::Error) -> VrfError {
    VrfError::Namespace {
        path: path.display().to_string(),
        source,
    }
}

/// Check whether `path` refers to a namespace file (an `nsfs` inode or a
/// bind mount of one).
#[must_use]
pub fn netns_exists(path: &Path) -> bool {
    File::open(path)
        .ok()
        .and_then(|file| rustix::fs::fstatfs(&file).ok())
        .is_some_and(|stat| {
            #[allow(clippy::cast_lossless, clippy::cast_possible_wrap, trivial_numeric_casts)]
            let fs_type = stat.f_type as i64;
            fs_type == NSFS_MAGIC
        })
}

/// Move the calling thread into the network namespace at `path`.
///
/// Sockets opened afterwards on this thread belong to the target namespace,
/// so this must run before the netlink connection is created.
///
/// # Errors
///
/// Returns [`VrfError::Namespace`] if the path cannot be opened or `setns`
/// fails.
pub fn enter_netns(path: &Path) -> VrfResult<()> {
    tracing::debug!(path = %path.display(), "Entering network namespace");

    let file = File::open(path).map_err(|e| namespace_error(path, e))?;

    // Safety: the descriptor is owned by `file` and stays open for the call.
    if unsafe { libc::setns(file.as_raw_fd(), libc::CLONE_NEWNET) } != 0 {
        return Err(namespace_error(path, std::io::Error::last_os_error()));
    }

    Ok(())
}
