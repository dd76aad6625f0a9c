// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! File content synchronization.
//!
//! Ensure that a target file holds exactly some desired content, and report
//! whether it needed to change.
//!
//! # Inspect, Then Write
//!
//! Synchronization happens in two steps. First the target file is
//! __inspected__: if it does not exist, or its current content differs from
//! the desired content, then the target is considered __changed__. Second,
//! unless the caller asked for __check mode__, the desired content is written
//! to the target, creating it if absent and truncating it if present.
//!
//! Check mode is a dry run. The target is inspected so that the changed flag
//! can still be reported, but the file system is never touched.
//!
//! Content is compared byte for byte. No normalization of whitespace or line
//! endings takes place, and a target holding invalid UTF-8 is simply treated
//! as changed.
//!
//! # Pitfalls
//!
//! The write is neither atomic nor locked. A crash in the middle of a write
//! may leave a partially written target behind, and concurrent callers on the
//! same target race with the last writer winning. Parent directories of the
//! target are never created.

use std::{
    fs::{read, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Request to synchronize one target file.
///
/// Lives only for the duration of a single call to [`FileContentSync::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Path to target file, absolute or relative to working directory.
    pub path: PathBuf,

    /// Exact content the target file should hold.
    pub content: String,

    /// Inspect only, never mutate the file system.
    pub check_mode: bool,
}

impl SyncRequest {
    /// Construct new request outside of check mode.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            check_mode: false,
        }
    }

    /// Set check mode flag.
    pub fn check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }
}

/// Outcome of synchronizing one target file.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncResult {
    /// Target did not exist, or its content differed from desired content.
    ///
    /// Reflects the _need_ for a write, not whether a write happened.
    pub changed: bool,

    /// Write step completed. Always false in check mode.
    pub success: bool,
}

/// When to write the target file outside of check mode.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Write on every call, even if the target already holds the desired
    /// content.
    #[default]
    Always,

    /// Only write if the target is changed. An up to date target counts as a
    /// successful sync without being touched.
    SkipUnchanged,
}

/// Synchronize target files to desired content.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct FileContentSync {
    policy: WritePolicy,
}

impl FileContentSync {
    /// Construct new synchronizer with given write policy.
    pub fn new(policy: WritePolicy) -> Self {
        Self { policy }
    }

    /// Synchronize target file of request to its desired content.
    ///
    /// Inspects the target, then writes the desired content unless the
    /// request is in check mode.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::ReadTarget`] if existing target cannot be read,
    ///   e.g., it is a directory.
    /// - Return [`SyncError::WriteTarget`] if target cannot be written, e.g.,
    ///   its parent directory is missing.
    #[instrument(
        skip(self, request),
        fields(path = %request.path.display(), check_mode = request.check_mode),
        level = "debug"
    )]
    pub fn sync(&self, request: SyncRequest) -> Result<SyncResult> {
        let changed = needs_write(&request.path, &request.content)?;
        debug!("target changed: {changed}");

        if request.check_mode {
            info!("check mode, leave {:?} untouched", request.path.display());
            return Ok(SyncResult {
                changed,
                success: false,
            });
        }

        if !changed && self.policy == WritePolicy::SkipUnchanged {
            debug!("target already up to date, skip write");
            return Ok(SyncResult {
                changed,
                success: true,
            });
        }

        write_content(&request.path, &request.content)?;
        info!(
            "wrote {} bytes to {:?}",
            request.content.len(),
            request.path.display()
        );

        Ok(SyncResult {
            changed,
            success: true,
        })
    }
}

/// Synchronize target file of request with the default write policy.
///
/// # Errors
///
/// - Return [`SyncError`] under the same conditions as
///   [`FileContentSync::sync`].
pub fn sync(request: SyncRequest) -> Result<SyncResult> {
    FileContentSync::default().sync(request)
}

fn needs_write(path: &Path, content: &str) -> Result<bool> {
    match read(path) {
        Ok(current) => Ok(current != content.as_bytes()),

        // INVARIANT: Anything that does not resolve to an existing file is
        // absent, e.g., dangling symlinks, or a parent component that is a
        // plain file.
        Err(err) if err.kind() == ErrorKind::NotFound || !path.exists() => Ok(true),

        Err(err) => Err(SyncError::ReadTarget {
            source: err,
            path: path.to_path_buf(),
        }),
    }
}

fn write_content(path: &Path, content: &str) -> Result<()> {
    let write_error = |err| SyncError::WriteTarget {
        source: err,
        path: path.to_path_buf(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;

    Ok(())
}

/// File content synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Existing target file cannot be read.
    #[error("failed to read target file at {:?}", path.display())]
    ReadTarget {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Target file cannot be written to.
    #[error("failed to write target file at {:?}", path.display())]
    WriteTarget {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
