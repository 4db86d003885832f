// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Per-day metadata files.
//!
//! Each day directory carries five line files next to the entry bodies:
//! `titles`, `class`, `authors`, `status`, and `adtag`. Line _n_ of each file
//! belongs to part _n_ of that day.
//!
//! # Self Healing
//!
//! The five files are rewritten one after another. A writer that dies half
//! way through leaves some files one line longer than others. Readers treat
//! missing lines as empty strings, and the next writer pads every file to the
//! longest one before doing anything else, so the day heals itself on its
//! next write.
//!
//! Files are always rewritten in full through a temporary file that replaces
//! the old one, never patched in place. A reader therefore sees either the
//! old or the new file, never half a line.

use std::{
    fs::{read, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

/// One metadata column of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    Title,
    Class,
    Author,
    Status,
    Adtag,
}

impl MetaField {
    /// All fields in the order their files are written.
    pub const ALL: [MetaField; 5] = [
        MetaField::Title,
        MetaField::Class,
        MetaField::Author,
        MetaField::Status,
        MetaField::Adtag,
    ];

    /// Name of file holding this field inside a day directory.
    pub fn file_name(self) -> &'static str {
        match self {
            MetaField::Title => "titles",
            MetaField::Class => "class",
            MetaField::Author => "authors",
            MetaField::Status => "status",
            MetaField::Adtag => "adtag",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Metadata values of a single entry, one per [`MetaField`].
pub type MetaRow = [String; 5];

/// Metadata of every entry of one day.
///
/// # Invariant
///
/// - Part _n_ lives at index _n - 1_ of every column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DayMeta {
    columns: [Vec<String>; 5],
}

impl DayMeta {
    /// Load metadata files of a day directory.
    ///
    /// Missing files load as empty columns. Bytes that are not valid UTF-8,
    /// e.g., titles written in a legacy encoding, load as replacement
    /// characters instead of failing the whole day.
    ///
    /// # Errors
    ///
    /// - Return [`MetaError::Read`] if a file exists but cannot be read.
    pub fn load(day_dir: impl AsRef<Path>) -> Result<Self> {
        let mut meta = Self::default();
        for field in MetaField::ALL {
            let path = day_dir.as_ref().join(field.file_name());
            let content = match read(&path) {
                Ok(content) => content,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(MetaError::Read { source: err, path }),
            };
            meta.columns[field.index()] = String::from_utf8_lossy(&content)
                .lines()
                .map(str::to_owned)
                .collect();
        }

        Ok(meta)
    }

    /// Length of the longest column.
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Check if day holds no metadata at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of a field for a 1-based part.
    ///
    /// Missing lines read as the empty string.
    pub fn get(&self, field: MetaField, part: u32) -> &str {
        let Some(index) = (part as usize).checked_sub(1) else {
            return "";
        };

        self.columns[field.index()]
            .get(index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Pad every column with empty lines up to given length.
    ///
    /// Returns true if any column had to be padded.
    pub fn pad_to(&mut self, len: usize) -> bool {
        let mut padded = false;
        for column in &mut self.columns {
            if column.len() < len {
                column.resize(len, String::new());
                padded = true;
            }
        }

        padded
    }

    /// Pad every column up to the longest one.
    ///
    /// Returns true if columns had drifted apart.
    pub fn heal(&mut self) -> bool {
        self.pad_to(self.len())
    }

    /// Append row for a new part, and return the part number assigned.
    pub fn append(&mut self, row: MetaRow) -> u32 {
        self.heal();
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }

        self.len() as u32
    }

    /// Replace row of an existing 1-based part.
    ///
    /// Returns false without changing anything if the part does not exist.
    pub fn replace(&mut self, part: u32, row: MetaRow) -> bool {
        let Some(index) = (part as usize).checked_sub(1) else {
            return false;
        };

        if index >= self.len() {
            return false;
        }

        self.heal();
        for (column, value) in self.columns.iter_mut().zip(row) {
            column[index] = value;
        }

        true
    }

    /// Render one column as file content.
    pub fn render(&self, field: MetaField) -> String {
        let mut out = String::new();
        for line in &self.columns[field.index()] {
            out.push_str(line);
            out.push('\n');
        }

        out
    }

    /// Rewrite every metadata file of a day directory in full.
    ///
    /// Files are replaced in the fixed order of [`MetaField::ALL`].
    ///
    /// # Errors
    ///
    /// - Return [`MetaError::Write`] if any file cannot be replaced.
    pub fn store(&self, day_dir: impl AsRef<Path>) -> Result<()> {
        for field in MetaField::ALL {
            let path = day_dir.as_ref().join(field.file_name());
            replace_file(&path, self.render(field).as_bytes())
                .map_err(|err| MetaError::Write { source: err, path })?;
        }

        debug!("stored metadata of {} parts", self.len());
        Ok(())
    }
}

/// Replace file content through a temporary file in the same directory.
///
/// Readers see either the old or the new content, never a mix of both.
pub(crate) fn replace_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    publish(file.as_file())?;
    file.persist(path).map_err(|err| err.error)?;

    Ok(())
}

#[cfg(unix)]
fn publish(file: &File) -> std::io::Result<()> {
    use std::{fs::Permissions, os::unix::fs::PermissionsExt};
    file.set_permissions(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn publish(_file: &File) -> std::io::Result<()> {
    Ok(())
}

/// Metadata file error types.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Metadata file exists but cannot be read.
    #[error("failed to read metadata file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Metadata file cannot be replaced.
    #[error("failed to write metadata file at {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = MetaError> = std::result::Result<T, E>;
