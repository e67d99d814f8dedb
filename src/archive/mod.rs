//! ZIP archive construction and merging
//!
//! Archives are never edited in place. Every write goes to a temporary
//! file next to the destination which is renamed over it once complete,
//! so readers only ever see a finished archive.
//!
//! Entry names are relative, `/`-separated and unique. A directory is
//! stored as an explicit entry only when nothing else in the archive lies
//! beneath it.

pub mod filter;

pub use filter::PathFilter;

use crate::error::{LiftError, LiftResult};
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

type Writer<'a> = ZipWriter<BufWriter<&'a mut File>>;

/// A file or directory collected from a source folder
#[derive(Debug, Clone, PartialEq, Eq)]
enum EntrySource {
    File(PathBuf),
    Directory,
}

#[derive(Debug, Clone)]
struct FolderEntry {
    /// Normalized relative path without a trailing slash
    key: String,
    source: EntrySource,
}

impl FolderEntry {
    fn is_file(&self) -> bool {
        matches!(self.source, EntrySource::File(_))
    }
}

/// Create an empty archive at `path`, replacing any existing file
pub fn create_empty(path: &Path) -> LiftResult<()> {
    write_atomically(path, |_| Ok(()))?;
    debug!("Created empty archive {}", path.display());
    Ok(())
}

/// Build a fresh archive at `dest` from the filtered contents of `source`
///
/// `predicate` receives every path relative to `source`, files and
/// directories alike, and returns whether it belongs in the archive.
pub fn build_from_folder<P>(source: &Path, dest: &Path, predicate: P) -> LiftResult<()>
where
    P: Fn(&Path) -> bool,
{
    let entries = collect_folder(source, &predicate)?;
    write_atomically(dest, |writer| {
        for entry in &entries {
            write_entry(writer, entry)?;
        }
        Ok(())
    })?;
    debug!(
        "Archived {} entries from {} into {}",
        entries.len(),
        source.display(),
        dest.display()
    );
    Ok(())
}

/// Merge the filtered contents of `folders` into the archive at `archive_path`
///
/// Folders are applied in order. An incoming entry replaces any existing
/// entry with the same name, and a later folder wins over an earlier one.
/// The archive is rebuilt and atomically swapped in; on failure the
/// original file is left untouched.
pub fn merge_folders_into<P, F>(archive_path: &Path, folders: &[F], predicate: P) -> LiftResult<()>
where
    P: Fn(&Path) -> bool,
    F: AsRef<Path>,
{
    // Everything is read before the first byte is written
    let mut incoming: Vec<FolderEntry> = Vec::new();
    for folder in folders {
        let entries = collect_folder(folder.as_ref(), &predicate)?;
        let superseding = Supersede::new(&entries);
        incoming.retain(|e| !superseding.covers(&e.key, e.is_file()));
        incoming.extend(entries);
    }

    let file = File::open(archive_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LiftError::PathNotFound(archive_path.to_path_buf()),
        _ => LiftError::io(format!("opening {}", archive_path.display()), e),
    })?;
    let mut existing = ZipArchive::new(BufReader::new(file))
        .map_err(|e| LiftError::archive(format!("reading {}", archive_path.display()), e))?;

    // Last occurrence wins if the container already holds duplicate names
    let mut latest: HashMap<String, usize> = HashMap::new();
    let mut existing_names = Vec::with_capacity(existing.len());
    for index in 0..existing.len() {
        let entry = existing
            .by_index_raw(index)
            .map_err(|e| LiftError::archive("reading archive entry", e))?;
        let name = entry.name().to_string();
        latest.insert(name.clone(), index);
        existing_names.push(name);
    }

    let superseding = Supersede::new(&incoming);
    let kept: Vec<(usize, String)> = existing_names
        .into_iter()
        .enumerate()
        .filter(|(index, name)| latest.get(name) == Some(index))
        .filter(|(_, name)| {
            let is_dir = name.ends_with('/');
            !superseding.covers(name.trim_end_matches('/'), !is_dir)
        })
        .collect();

    // Directory entries are only kept while nothing lives beneath them
    let final_keys: BTreeSet<String> = kept
        .iter()
        .map(|(_, name)| name.trim_end_matches('/').to_string())
        .chain(incoming.iter().map(|e| e.key.clone()))
        .collect();
    let kept: Vec<usize> = kept
        .into_iter()
        .filter(|(_, name)| {
            !name.ends_with('/') || !has_descendant(&final_keys, name.trim_end_matches('/'))
        })
        .map(|(index, _)| index)
        .collect();
    incoming.retain(|e| e.is_file() || !has_descendant(&final_keys, &e.key));

    write_atomically(archive_path, |writer| {
        for &index in &kept {
            let entry = existing
                .by_index_raw(index)
                .map_err(|e| LiftError::archive("reading archive entry", e))?;
            writer
                .raw_copy_file(entry)
                .map_err(|e| LiftError::archive("copying archive entry", e))?;
        }
        for entry in &incoming {
            write_entry(writer, entry)?;
        }
        Ok(())
    })?;

    debug!(
        "Merged {} folder(s) into {}: kept {} entries, wrote {}",
        folders.len(),
        archive_path.display(),
        kept.len(),
        incoming.len()
    );
    Ok(())
}

/// List entry names in archive order
pub fn entry_names(archive_path: &Path) -> LiftResult<Vec<String>> {
    let file = File::open(archive_path)
        .map_err(|e| LiftError::io(format!("opening {}", archive_path.display()), e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| LiftError::archive(format!("reading {}", archive_path.display()), e))?;
    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| LiftError::archive("reading archive entry", e))?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}

/// Names written by an incoming batch, used to decide what they replace
struct Supersede {
    keys: BTreeSet<String>,
    files: BTreeSet<String>,
}

impl Supersede {
    fn new(entries: &[FolderEntry]) -> Self {
        Self {
            keys: entries.iter().map(|e| e.key.clone()).collect(),
            files: entries
                .iter()
                .filter(|e| e.is_file())
                .map(|e| e.key.clone())
                .collect(),
        }
    }

    /// Whether an older entry must give way to this batch
    ///
    /// True for the same name, for an old file where the batch needs a
    /// directory, and for anything beneath a file in the batch.
    fn covers(&self, key: &str, is_file: bool) -> bool {
        if self.keys.contains(key) {
            return true;
        }
        if is_file && has_descendant(&self.keys, key) {
            return true;
        }
        ancestors(key).any(|ancestor| self.files.contains(ancestor))
    }
}

/// Whether any key in `keys` lies strictly beneath `key`
fn has_descendant(keys: &BTreeSet<String>, key: &str) -> bool {
    let prefix = format!("{}/", key);
    keys.range(prefix.clone()..)
        .next()
        .is_some_and(|k| k.starts_with(&prefix))
}

/// Proper ancestors of a `/`-separated key, nearest first
fn ancestors(key: &str) -> impl Iterator<Item = &str> {
    key.match_indices('/').rev().map(move |(i, _)| &key[..i])
}

/// Walk `root` and collect every entry accepted by `predicate`
fn collect_folder<P>(root: &Path, predicate: &P) -> LiftResult<Vec<FolderEntry>>
where
    P: Fn(&Path) -> bool,
{
    if !root.is_dir() {
        return Err(LiftError::PathNotFound(root.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry =
            entry.map_err(|e| LiftError::io(format!("walking {}", root.display()), e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| LiftError::Internal(format!("walked outside of root: {}", e)))?;
        if !predicate(relative) {
            continue;
        }

        let file_type = entry.file_type();
        let source = if file_type.is_dir() {
            EntrySource::Directory
        } else if file_type.is_file() {
            EntrySource::File(entry.path().to_path_buf())
        } else {
            debug!("Skipping special file {}", entry.path().display());
            continue;
        };
        entries.push(FolderEntry {
            key: entry_key(relative)?,
            source,
        });
    }

    let keys: BTreeSet<String> = entries.iter().map(|e| e.key.clone()).collect();
    entries.retain(|e| e.is_file() || !has_descendant(&keys, &e.key));
    Ok(entries)
}

/// Normalize a relative path into a `/`-separated entry key
fn entry_key(relative: &Path) -> LiftResult<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| LiftError::PathInvalid {
                    path: relative.to_path_buf(),
                    reason: "not valid UTF-8".to_string(),
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(LiftError::PathInvalid {
                    path: relative.to_path_buf(),
                    reason: "archive entries must be relative".to_string(),
                })
            }
        }
    }
    if parts.is_empty() {
        return Err(LiftError::PathInvalid {
            path: relative.to_path_buf(),
            reason: "empty archive entry name".to_string(),
        });
    }
    Ok(parts.join("/"))
}

fn write_entry(writer: &mut Writer<'_>, entry: &FolderEntry) -> LiftResult<()> {
    match &entry.source {
        EntrySource::Directory => {
            let options = SimpleFileOptions::default().unix_permissions(0o755);
            writer
                .add_directory(format!("{}/", entry.key), options)
                .map_err(|e| LiftError::archive(format!("adding directory {}", entry.key), e))
        }
        EntrySource::File(path) => {
            let metadata = fs::metadata(path)
                .map_err(|e| LiftError::io(format!("reading {}", path.display()), e))?;
            let mut options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(metadata.len() >= u64::from(u32::MAX));
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                options = options.unix_permissions(metadata.permissions().mode());
            }
            writer
                .start_file(entry.key.as_str(), options)
                .map_err(|e| LiftError::archive(format!("adding file {}", entry.key), e))?;
            let mut file = File::open(path)
                .map_err(|e| LiftError::io(format!("opening {}", path.display()), e))?;
            io::copy(&mut file, writer)
                .map_err(|e| LiftError::io(format!("compressing {}", path.display()), e))?;
            Ok(())
        }
    }
}

/// Write an archive through `fill` into a temp file, then rename it over `dest`
///
/// The temp file lives in the destination directory so the rename stays on
/// one filesystem. It is removed on every failure path, including panics.
fn write_atomically<F>(dest: &Path, fill: F) -> LiftResult<()>
where
    F: FnOnce(&mut Writer<'_>) -> LiftResult<()>,
{
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|e| LiftError::io(format!("creating directory {}", parent.display()), e))?;

    let mut temp = NamedTempFile::new_in(&parent)
        .map_err(|e| LiftError::io(format!("creating temp file in {}", parent.display()), e))?;
    {
        let mut writer = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
        fill(&mut writer)?;
        let mut buffered = writer
            .finish()
            .map_err(|e| LiftError::archive(format!("finishing {}", dest.display()), e))?;
        buffered
            .flush()
            .map_err(|e| LiftError::io(format!("flushing {}", dest.display()), e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| LiftError::io(format!("syncing {}", dest.display()), e))?;
    temp.persist(dest)
        .map_err(|e| LiftError::io(format!("replacing {}", dest.display()), e.error))?;
    Ok(())
}
