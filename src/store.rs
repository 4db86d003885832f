// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Date-indexed entry store.
//!
//! Entries live directly in the filesystem under a __storage root__. There is
//! no database server, and no index beyond the directory tree itself.
//!
//! # Storage Layout
//!
//! The layout is a public contract shared with every other tool reading or
//! writing the same storage root:
//!
//! ```text
//! <root>/
//!   .first                 # oldest entry, "YYYY/MM/DD.P"
//!   .last                  # newest entry, "YYYY/MM/DD.P"
//!   .lock                  # advisory write lock
//!   YYYY/MM/DD/            # one directory per day holding entries
//!     1, 2, ...            # entry bodies, named by part
//!     titles               # one line per part
//!     class
//!     authors
//!     status
//!     adtag
//! ```
//!
//! Days without entries have no directory at all, and every traversal skips
//! them silently.
//!
//! # Consistency
//!
//! Writers serialize through [`WriteCoordinator`]. Readers take no lock, and
//! may observe a write in progress, e.g., one metadata file already holding
//! a line that the others do not yet hold. Missing lines read as empty
//! strings, and the next write pads them back into shape.
//!
//! Entries dated after the caller supplied "now" stay hidden from every range
//! and navigation query, even though they exist on disk.

pub mod entry;
pub mod lock;
pub mod meta;
pub mod navigate;
pub mod walk;

use crate::{
    address::DateAddress,
    store::{
        entry::Entry,
        lock::WriteCoordinator,
        meta::{replace_file, DayMeta},
        navigate::Navigator,
        walk::{DayIndex, DayRecord, DayWalk, Direction},
    },
};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::{
    cmp::Ordering,
    fs::{create_dir_all, metadata, read, read_dir, read_to_string},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock, RwLockWriteGuard},
};
use tracing::{debug, info, instrument, warn};

/// Name of sentinel file holding the oldest entry address.
pub const FIRST_FILE: &str = ".first";

/// Name of sentinel file holding the newest entry address.
pub const LAST_FILE: &str = ".last";

/// Known extent of a store.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Oldest entry, always at part 1.
    pub first: Option<DateAddress>,

    /// Newest entry.
    pub last: Option<DateAddress>,
}

/// Handle to an entry store.
///
/// Holds the storage root, the known extent of the store, and the current
/// time supplied by the caller. The handle never consults a clock itself.
#[derive(Debug)]
pub struct Blog {
    root: PathBuf,
    now: NaiveDateTime,
    max_parts: u32,
    bounds: RwLock<Bounds>,
    coordinator: WriteCoordinator,
}

impl Blog {
    /// Create storage root if needed, and open it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::CreateDir`] if storage root cannot be created.
    /// - Return any error of [`Blog::open`].
    pub fn init(root: impl Into<PathBuf>, now: NaiveDateTime) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            info!("initialize new store: {:?}", root.display());
            create_dir_all(&root).map_err(|err| StoreError::CreateDir {
                source: err,
                path: root.clone(),
            })?;
        }

        Self::open(root, now)
    }

    /// Open existing store.
    ///
    /// Bounds come from the `.first` and `.last` sentinel files. A sentinel
    /// that is missing or garbled is recovered by scanning the day tree.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::MissingRoot`] if storage root does not exist.
    /// - Return [`StoreError::Read`] if a sentinel exists but cannot be read.
    #[instrument(skip(root), level = "debug")]
    pub fn open(root: impl Into<PathBuf>, now: NaiveDateTime) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::MissingRoot { root });
        }

        let blog = Self {
            coordinator: WriteCoordinator::new(&root),
            bounds: RwLock::new(Bounds::default()),
            max_parts: DateAddress::MAX_PART,
            now,
            root,
        };

        let mut bounds = Bounds {
            first: read_sentinel(&blog.root.join(FIRST_FILE))?,
            last: read_sentinel(&blog.root.join(LAST_FILE))?,
        };

        if bounds.first.is_none() || bounds.last.is_none() {
            let scanned = blog.scan_bounds()?;
            if scanned.first.is_some() {
                warn!(
                    "recovered bounds of {:?} by scanning: {scanned:?}",
                    blog.root.display()
                );
            }
            bounds.first = bounds.first.or(scanned.first);
            bounds.last = bounds.last.or(scanned.last);
        }

        debug!("open store {:?} with {bounds:?}", blog.root.display());
        *blog.bounds_mut() = bounds;

        Ok(blog)
    }

    /// Limit number of entries a single day may hold.
    ///
    /// Values are clamped to `1..=MAX_PART`.
    pub fn with_max_parts(mut self, max_parts: u32) -> Self {
        self.max_parts = max_parts.clamp(1, DateAddress::MAX_PART);
        self
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Current time as supplied by the caller.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Replace current time.
    pub fn set_now(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    /// Oldest entry of store.
    pub fn first(&self) -> Option<DateAddress> {
        self.bounds().first
    }

    /// Newest entry of store.
    pub fn last(&self) -> Option<DateAddress> {
        self.bounds().last
    }

    /// Newest address visible to readers.
    ///
    /// The earlier of the newest entry and the end of the current day.
    pub fn ceiling(&self) -> Option<DateAddress> {
        let now = DateAddress::from_date(self.now.date(), DateAddress::MAX_PART);
        self.last().map(|last| last.min(now))
    }

    /// Directory of a given day.
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(format!("{:02}", date.day()))
    }

    /// Number of entries stored on a day.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Meta`] if metadata files cannot be read.
    pub fn count(&self, date: NaiveDate) -> Result<u32> {
        self.day_count(date)
    }

    /// Navigator over the visible extent of this store.
    pub fn navigator(&self) -> Navigator<'_, Self> {
        Navigator::new(self, self.first(), self.ceiling())
    }

    /// Allocate new unassigned entry for the current day.
    ///
    /// Fill in its fields, and hand it to [`Blog::write`] to assign it a part.
    pub fn create(&self) -> Entry {
        Entry::new(DateAddress::from_date(self.now.date(), 0), self.now)
    }

    /// Read single entry.
    ///
    /// Returns `None` if the day holds no entries, or holds fewer than
    /// `when.part`. Missing metadata reads as empty strings, and a missing
    /// body as an empty body.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Meta`] if metadata files cannot be read.
    /// - Return [`StoreError::Read`] if body file exists but cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn read(&self, when: DateAddress) -> Result<Option<Entry>> {
        let Some(date) = when.date() else {
            return Ok(None);
        };

        match self.load_day(date)? {
            Some(day) if when.part >= 1 && when.part <= day.count => day.entry(when.part).map(Some),
            _ => Ok(None),
        }
    }

    /// Read every visible entry between two addresses, inclusive.
    ///
    /// Addresses may come in either order. Descending results are the exact
    /// reverse of ascending ones.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Blog::read`].
    #[instrument(skip(self), level = "debug")]
    pub fn read_range(
        &self,
        start: DateAddress,
        stop: DateAddress,
        ascending: bool,
    ) -> Result<Vec<Entry>> {
        let (low, high) = match start.cmp(&stop) {
            Ordering::Greater => (stop, start),
            _ => (start, stop),
        };
        let Some(ceiling) = self.ceiling() else {
            return Ok(Vec::new());
        };
        let high = high.min(ceiling);

        let (Some(from), Some(to)) = (low.date(), high.date()) else {
            return Ok(Vec::new());
        };

        let walk = if ascending {
            DayWalk::new(self, from, to, Direction::Forward)
        } else {
            DayWalk::new(self, to, from, Direction::Backward)
        };

        let mut entries = Vec::new();
        for day in walk {
            let day = day?;
            let lowest = if day.date == from { low.part.max(1) } else { 1 };
            let highest = if day.date == to { high.part.min(day.count) } else { day.count };

            if ascending {
                for part in lowest..=highest {
                    entries.push(day.entry(part)?);
                }
            } else {
                for part in (lowest..=highest).rev() {
                    entries.push(day.entry(part)?);
                }
            }
        }

        debug!("read {} entries", entries.len());
        Ok(entries)
    }

    /// Read up to `count` visible entries from `start` forward in time.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Blog::read`].
    #[instrument(skip(self), level = "debug")]
    pub fn read_forward(&self, start: DateAddress, count: usize) -> Result<Vec<Entry>> {
        let Some(ceiling) = self.ceiling() else {
            return Ok(Vec::new());
        };
        let (Some(from), Some(to)) = (start.date(), ceiling.date()) else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::with_capacity(count);
        for day in DayWalk::new(self, from, to, Direction::Forward) {
            if entries.len() >= count {
                break;
            }

            let day = day?;
            let lowest = if day.date == from { start.part.max(1) } else { 1 };
            let highest = if day.date == to { ceiling.part.min(day.count) } else { day.count };

            for part in lowest..=highest {
                if entries.len() >= count {
                    break;
                }
                entries.push(day.entry(part)?);
            }
        }

        Ok(entries)
    }

    /// Read up to `count` visible entries from `start` backward in time.
    ///
    /// Part 0 in `start` stands for the whole day.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Blog::read`].
    #[instrument(skip(self), level = "debug")]
    pub fn read_backward(&self, start: DateAddress, count: usize) -> Result<Vec<Entry>> {
        let (Some(first), Some(ceiling)) = (self.first(), self.ceiling()) else {
            return Ok(Vec::new());
        };
        let start = match start.part {
            0 => start.with_part(DateAddress::MAX_PART),
            _ => start,
        }
        .min(ceiling);
        let (Some(from), Some(to)) = (start.date(), first.date()) else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::with_capacity(count);
        for day in DayWalk::new(self, from, to, Direction::Backward) {
            if entries.len() >= count {
                break;
            }

            let day = day?;
            let highest = if day.date == from { start.part.min(day.count) } else { day.count };

            for part in (1..=highest).rev() {
                if entries.len() >= count {
                    break;
                }
                entries.push(day.entry(part)?);
            }
        }

        Ok(entries)
    }

    /// Read up to `count` newest visible entries, newest first.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Blog::read`].
    pub fn latest(&self, count: usize) -> Result<Vec<Entry>> {
        match self.ceiling() {
            Some(ceiling) => self.read_backward(ceiling, count),
            None => Ok(Vec::new()),
        }
    }

    /// Write entry to store.
    ///
    /// Entries at part 0 are appended to their day, and receive the next
    /// free part. Entries at any other part replace that existing part.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::InvalidAddress`] if entry does not name a real
    ///   day.
    /// - Return [`StoreError::Capacity`] if day is already full.
    /// - Return [`StoreError::NoSuchPart`] if updated part does not exist.
    /// - Return [`StoreError::Lock`] if write lock cannot be taken.
    /// - Return [`StoreError::Meta`], [`StoreError::Write`], or
    ///   [`StoreError::CreateDir`] on I/O failure.
    #[instrument(skip(self, entry), fields(when = %entry.when), level = "debug")]
    pub fn write(&self, entry: &mut Entry) -> Result<()> {
        let date = match entry.when.date() {
            Some(date) if entry.when.part <= DateAddress::MAX_PART => date,
            _ => return Err(StoreError::InvalidAddress(entry.when)),
        };

        let _guard = self.coordinator.acquire()?;
        let day_dir = self.day_dir(date);
        if entry.is_unassigned() {
            create_dir_all(&day_dir).map_err(|err| StoreError::CreateDir {
                source: err,
                path: day_dir.clone(),
            })?;
        }

        let mut meta = DayMeta::load(&day_dir)?;
        let count = (meta.len() as u32).max(count_bodies(&day_dir, meta.len() as u32));
        if meta.pad_to(count as usize) {
            warn!("repaired drifted metadata of {date}");
        }

        if entry.is_unassigned() {
            if count >= self.max_parts {
                return Err(StoreError::Capacity {
                    date,
                    max_parts: self.max_parts,
                });
            }
            entry.when.part = meta.append(entry.meta_row());
            info!("append entry {}", entry.when);
        } else {
            if !meta.replace(entry.when.part, entry.meta_row()) {
                return Err(StoreError::NoSuchPart(entry.when));
            }
            info!("update entry {}", entry.when);
        }

        meta.store(&day_dir)?;

        let body_path = day_dir.join(entry.when.part.to_string());
        replace_file(&body_path, &entry.body).map_err(|err| StoreError::Write {
            source: err,
            path: body_path,
        })?;

        self.extend_bounds(entry.when)
    }

    /// Grow known extent to cover a freshly written entry.
    ///
    /// Must run inside the write lock. Sentinels are reloaded first, since
    /// another process may have moved them since this handle opened.
    fn extend_bounds(&self, when: DateAddress) -> Result<()> {
        let first_path = self.root.join(FIRST_FILE);
        let last_path = self.root.join(LAST_FILE);
        let mut bounds = self.bounds_mut();

        let last = match (read_sentinel(&last_path)?, bounds.last) {
            (Some(disk), Some(held)) => Some(disk.max(held)),
            (disk, held) => disk.or(held),
        };
        bounds.last = match last {
            Some(last) if last >= when => Some(last),
            _ => {
                write_sentinel(&last_path, when)?;
                Some(when)
            }
        };

        let first = match (read_sentinel(&first_path)?, bounds.first) {
            (Some(disk), Some(held)) => Some(disk.min(held)),
            (disk, held) => disk.or(held),
        };
        bounds.first = match first {
            Some(first) if first.date_cmp(&when) != Ordering::Greater => Some(first),
            _ => {
                let first = when.with_part(1);
                write_sentinel(&first_path, first)?;
                Some(first)
            }
        };

        Ok(())
    }

    fn bounds(&self) -> Bounds {
        *self.bounds.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn bounds_mut(&self) -> RwLockWriteGuard<'_, Bounds> {
        self.bounds.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find oldest and newest populated days by walking the tree.
    fn scan_bounds(&self) -> Result<Bounds> {
        let mut bounds = Bounds::default();
        let days = self.populated_days()?;

        if let Some(&(date, _)) = days.first() {
            bounds.first = Some(DateAddress::from_date(date, 1));
        }
        if let Some(&(date, count)) = days.last() {
            bounds.last = Some(DateAddress::from_date(date, count));
        }

        Ok(bounds)
    }

    /// Every populated day of the tree in ascending order.
    fn populated_days(&self) -> Result<Vec<(NaiveDate, u32)>> {
        let mut days = Vec::new();
        for year in numeric_entries(&self.root)? {
            let year_dir = self.root.join(format!("{year:04}"));
            for month in numeric_entries(&year_dir)? {
                let month_dir = year_dir.join(format!("{month:02}"));
                for day in numeric_entries(&month_dir)? {
                    let Some(date) = NaiveDate::from_ymd_opt(year as i32, month, day) else {
                        continue;
                    };
                    let count = self.count(date)?;
                    if count > 0 {
                        days.push((date, count));
                    }
                }
            }
        }

        Ok(days)
    }
}

impl DayIndex for Blog {
    type Day = Day;
    type Error = StoreError;

    fn load_day(&self, date: NaiveDate) -> Result<Option<Day>> {
        let dir = self.day_dir(date);
        if !dir.is_dir() {
            return Ok(None);
        }

        let meta = DayMeta::load(&dir)?;
        let count = (meta.len() as u32).max(count_bodies(&dir, meta.len() as u32));
        if count == 0 {
            return Ok(None);
        }

        Ok(Some(Day {
            date,
            dir,
            meta,
            count,
        }))
    }

    fn has_year(&self, year: i32) -> bool {
        self.root.join(format!("{year:04}")).is_dir()
    }

    fn has_month(&self, year: i32, month: u32) -> bool {
        self.root
            .join(format!("{year:04}"))
            .join(format!("{month:02}"))
            .is_dir()
    }
}

/// Loaded day directory holding at least one entry.
#[derive(Debug)]
pub struct Day {
    date: NaiveDate,
    dir: PathBuf,
    meta: DayMeta,
    count: u32,
}

impl Day {
    /// Read entry at a 1-based part of this day.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Read`] if body file exists but cannot be read.
    pub fn entry(&self, part: u32) -> Result<Entry> {
        let when = DateAddress::from_date(self.date, part);
        let body_path = self.dir.join(part.to_string());

        let body = match read(&body_path) {
            Ok(body) => body,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                return Err(StoreError::Read {
                    source: err,
                    path: body_path,
                })
            }
        };

        // INVARIANT: Time of last write is the body's modification time,
        //   falling back to midnight of the entry's day.
        let timestamp = metadata(&body_path)
            .and_then(|metadata| metadata.modified())
            .map(|modified| DateTime::<Local>::from(modified).naive_local())
            .unwrap_or_else(|_| self.date.and_time(NaiveTime::MIN));

        Ok(Entry::from_meta(when, &self.meta, timestamp, body))
    }
}

impl DayRecord for Day {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn count(&self) -> u32 {
        self.count
    }
}

/// Count body files beyond `known` parts, as long as they run contiguously.
fn count_bodies(dir: &Path, known: u32) -> u32 {
    let mut count = known;
    while count < DateAddress::MAX_PART && dir.join((count + 1).to_string()).is_file() {
        count += 1;
    }

    count
}

/// Sorted numeric names of subdirectories, ignoring everything else.
fn numeric_entries(dir: &Path) -> Result<Vec<u32>> {
    let entries = match read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(StoreError::Read {
                source: err,
                path: dir.to_path_buf(),
            })
        }
    };

    let mut numbers: Vec<u32> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
        .collect();
    numbers.sort_unstable();

    Ok(numbers)
}

fn read_sentinel(path: &Path) -> Result<Option<DateAddress>> {
    let content = match read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(StoreError::Read {
                source: err,
                path: path.to_path_buf(),
            })
        }
    };

    match content.parse() {
        Ok(address) => Ok(Some(address)),
        Err(err) => {
            warn!("ignore sentinel {:?}: {err}", path.display());
            Ok(None)
        }
    }
}

fn write_sentinel(path: &Path, address: DateAddress) -> Result<()> {
    debug!("move {:?} to {address}", path.display());
    replace_file(path, format!("{address}\n").as_bytes()).map_err(|err| StoreError::Write {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Entry store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage root does not exist.
    #[error("storage root {:?} does not exist", root.display())]
    MissingRoot { root: PathBuf },

    /// Directory cannot be created.
    #[error("failed to create directory at {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File or directory exists but cannot be read.
    #[error("failed to read from {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File cannot be replaced.
    #[error("failed to write to {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Day already holds as many entries as allowed.
    #[error("{date} already holds {max_parts} entries")]
    Capacity { date: NaiveDate, max_parts: u32 },

    /// Entry to update does not exist.
    #[error("entry {0} does not exist")]
    NoSuchPart(DateAddress),

    /// Entry does not name a real day.
    #[error("cannot write entry at invalid address {0}")]
    InvalidAddress(DateAddress),

    /// Metadata files cannot be read or written.
    #[error(transparent)]
    Meta(#[from] crate::store::meta::MetaError),

    /// Write lock cannot be taken.
    #[error(transparent)]
    Lock(#[from] crate::store::lock::LockError),
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
