// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Write coordination.
//!
//! Every mutation of a store runs inside one critical section per storage
//! root. Threads sharing a [`Blog`](crate::store::Blog) handle queue up on an
//! in-process mutex first. Separate handles and separate processes then queue
//! up on an exclusive advisory lock of the `.lock` file at the storage root.
//!
//! Readers never take the lock.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, warn};

/// Name of lock file at the root of a store.
pub const LOCK_FILE: &str = ".lock";

/// Serialize writers of a single storage root.
#[derive(Debug)]
pub struct WriteCoordinator {
    lock_path: PathBuf,
    gate: Mutex<()>,
}

impl WriteCoordinator {
    /// Construct new write coordinator for a storage root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            lock_path: root.as_ref().join(LOCK_FILE),
            gate: Mutex::new(()),
        }
    }

    /// Path to advisory lock file.
    pub fn lock_path(&self) -> &Path {
        self.lock_path.as_path()
    }

    /// Enter the critical section.
    ///
    /// Blocks without timeout until both the in-process gate and the
    /// advisory file lock are held. Both are released when the returned
    /// guard drops, whichever way the caller leaves the critical section.
    ///
    /// # Errors
    ///
    /// - Return [`LockError::Open`] if lock file cannot be opened.
    /// - Return [`LockError::Acquire`] if advisory lock cannot be taken.
    pub fn acquire(&self) -> Result<WriteGuard<'_>> {
        // INVARIANT: A panicked writer never leaves half a critical section
        //   behind that the next writer cannot heal, so poisoning is ignored.
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|err| LockError::Open {
                source: err,
                lock_path: self.lock_path.clone(),
            })?;

        file.lock().map_err(|err| LockError::Acquire {
            source: err,
            lock_path: self.lock_path.clone(),
        })?;
        debug!("acquired write lock {:?}", self.lock_path.display());

        Ok(WriteGuard {
            file,
            lock_path: self.lock_path.as_path(),
            _gate: gate,
        })
    }
}

/// Proof of holding the write lock.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    file: File,
    lock_path: &'a Path,
    _gate: MutexGuard<'a, ()>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        // Closing the file releases the lock as well, so a failed unlock is
        // only worth a warning.
        match self.file.unlock() {
            Ok(()) => debug!("released write lock {:?}", self.lock_path.display()),
            Err(err) => warn!(
                "failed to unlock {:?} explicitly: {err}",
                self.lock_path.display()
            ),
        }
    }
}

/// Write lock error types.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Lock file cannot be opened or created.
    #[error("failed to open lock file at {:?}", lock_path.display())]
    Open {
        #[source]
        source: std::io::Error,
        lock_path: PathBuf,
    },

    /// Advisory lock cannot be taken.
    #[error("failed to lock {:?}", lock_path.display())]
    Acquire {
        #[source]
        source: std::io::Error,
        lock_path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LockError> = std::result::Result<T, E>;
