//! The listing session: root coordination and the recursive walk.
//!
//! A session is created once per program run. It compiles the skip and
//! separate pattern sets, captures the local UTC offset, resolves the
//! output target, then walks each configured root depth-first, writing
//! formatted file lines through the output router's active target.
//!
//! Fault containment follows one rule: a bad file never aborts its
//! directory, a bad directory never aborts its root, a bad root never
//! aborts the session. Recoverable faults become error or warning log
//! messages and the walk moves on.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

use crate::config::Config;
use crate::error::ListError;
use crate::format::{
    self, FileSize, current_file_line, dir_header, legacy_file_line, legacy_subtotal, stats_block,
};
use crate::ordering::{DirOrdering, compare_case_insensitive};
use crate::output::{LogKind, OutputRouter};
use crate::patterns::PatternSet;

/// Width of the separator printed between roots in stdout mode.
const ROOT_SEPARATOR_WIDTH: usize = 75;

/// One listing run over all configured roots.
pub struct ListingSession {
    config: Config,
    skip_dirs: PatternSet,
    separate_dirs: PatternSet,
    ordering: DirOrdering,
    /// Local UTC offset captured once at construction; file mtimes are
    /// shifted by this rather than re-querying the timezone per file.
    local_offset: FixedOffset,
    router: OutputRouter,
    /// Normalized form of the session's own output directory, used to keep
    /// the listing from recursing into its own output.
    output_base_normalized: Option<String>,
    file_count: u64,
    byte_count: u64,
}

impl ListingSession {
    /// Compile patterns and capture the local offset. Pattern compilation
    /// failure is a configuration error; nothing has been written yet.
    pub fn new(config: Config) -> Result<Self, ListError> {
        let skip_dirs = PatternSet::compile(config.skip_dirs.as_deref())?;
        let separate_dirs = PatternSet::compile(config.separate_dirs.as_deref())?;
        let ordering = DirOrdering::for_legacy(config.legacy);
        let local_offset = Local::now().offset().fix();
        Ok(Self {
            config,
            skip_dirs,
            separate_dirs,
            ordering,
            local_offset,
            router: OutputRouter::stdout(),
            output_base_normalized: None,
            file_count: 0,
            byte_count: 0,
        })
    }

    /// Run the whole listing. Fatal setup failures (bad listing name,
    /// output directory creation) surface as `Err`; everything after setup
    /// is contained and reported through the log channels.
    pub fn run(&mut self, listing_name: &str) -> Result<(), ListError> {
        self.prepare_output(listing_name)?;

        self.write_effective_config();

        match self.config.roots.clone() {
            None => {
                let root = self.config.root.clone().unwrap_or_default();
                self.list_root(&resolve_root(&root));
            }
            Some(roots) => {
                for (i, root) in roots.iter().enumerate() {
                    if i > 0 && !self.router.output_to_file() {
                        println!("\n{}", "-".repeat(ROOT_SEPARATOR_WIDTH));
                    }
                    self.list_root(&resolve_root(root));
                }
            }
        }

        self.router.teardown();
        Ok(())
    }

    /// Resolve the output base: stdout, or a freshly created timestamped
    /// directory under `config.output`.
    fn prepare_output(&mut self, listing_name: &str) -> Result<(), ListError> {
        if format::has_invalid_filename_chars(listing_name) {
            return Err(ListError::InvalidListingName);
        }

        if !self.config.output_to_file() {
            self.router = OutputRouter::stdout();
            return Ok(());
        }

        let stamp = Local::now().format("%Y-%m-%d %H.%M.%S").to_string();
        let dir_name = if listing_name.is_empty() {
            stamp
        } else {
            format!("{} {}", stamp, listing_name)
        };
        let base = Path::new(&self.config.output).join(dir_name);

        fs::create_dir_all(&base).map_err(|e| ListError::OutputBase {
            path: base.clone(),
            source: e,
        })?;
        println!("Output target: \"{}\"", base.display());

        self.output_base_normalized = normalize_path(&base);
        self.router = OutputRouter::file_base(base);
        Ok(())
    }

    /// Audit trail of the configuration actually in effect. Best effort:
    /// a failure here must not stop the listing.
    fn write_effective_config(&mut self) {
        self.router
            .write_log(LogKind::Config, "// effective listing config at run time\n");
        if let Ok(json) = serde_json::to_string_pretty(&self.config) {
            self.router.write_log(LogKind::Config, &json);
        }
    }

    /// List one root: verify it exists, open its data file, walk it, emit
    /// its statistics. A failed root skips to the next one.
    fn list_root(&mut self, root: &str) {
        log::debug!("listing root {}", root);

        if !Path::new(root).is_dir() {
            self.write_error(&format!(
                "CONFIG ERROR: root directory \"{}\" does not exist",
                root
            ));
            return;
        }

        if self.router.output_to_file() && !self.push_data(root) {
            self.write_error(&format!(
                "ERROR: failed to create root output file for \"{}\"",
                root
            ));
            return;
        }

        self.file_count = 0;
        self.byte_count = 0;
        let timer = Instant::now();

        self.walk(Path::new(root));

        let elapsed = timer.elapsed().as_secs();

        if self.config.legacy {
            // Legacy mode appends its totals to the listing output itself.
            self.emit(format::LEGACY_TOTAL_HEADER);
            self.emit(&legacy_subtotal(self.file_count, self.byte_count));
        } else {
            let block = stats_block(
                root,
                self.file_count,
                self.byte_count,
                elapsed,
                self.router.output_to_file(),
            );
            self.router.write_log(LogKind::Stats, &block);
        }

        if self.router.output_to_file() {
            self.router.pop_data_file();
        }
    }

    /// Depth-first pre-order walk of one directory: header and file lines
    /// first, then sorted subdirectories.
    fn walk(&mut self, dir: &Path) {
        log::debug!("walking {}", dir.display());

        let (files, subdirs) = match self.list_entries(dir) {
            Some(split) => split,
            None => return,
        };

        let dir_str = dir.to_string_lossy();

        if (self.config.print_empty_dirs && !self.config.legacy) || !files.is_empty() {
            self.emit(&dir_header(&dir_str, self.config.legacy));

            if files.is_empty() {
                self.emit("[NO FILES]");
            } else {
                let (count, bytes) = self.list_files(&files);
                self.file_count += count;
                self.byte_count += bytes;
                if self.config.legacy {
                    self.emit(&legacy_subtotal(count, bytes));
                }
            }
        }

        for subdir in subdirs {
            self.visit_subdir(&subdir);
        }
    }

    /// Read one directory and split its entries into sorted files and
    /// sorted subdirectories. `None` means the listing failed and this
    /// branch of the walk ends here.
    fn list_entries(&mut self, dir: &Path) -> Option<(Vec<PathBuf>, Vec<PathBuf>)> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.report_io_fault(dir, &e);
                return None;
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.report_io_fault(dir, &e);
                    continue;
                }
            };
            let path = entry.path();
            // A symlink counts as a directory only when its target is one;
            // otherwise it is listed as a file with the symlink marker.
            if path.is_dir() {
                subdirs.push(path);
            } else {
                files.push(path);
            }
        }

        // Files sort case-insensitive in both modes; only directory names
        // use the session's ordering strategy.
        files.sort_by(|a, b| {
            compare_case_insensitive(&a.to_string_lossy(), &b.to_string_lossy())
        });
        let ordering = self.ordering;
        subdirs.sort_by(|a, b| ordering.compare(&a.to_string_lossy(), &b.to_string_lossy()));

        Some((files, subdirs))
    }

    /// Write one line per file, returning (count, bytes) of the successes.
    /// A file whose metadata cannot be read is logged and skipped.
    fn list_files(&mut self, files: &[PathBuf]) -> (u64, u64) {
        let mut count = 0u64;
        let mut bytes = 0u64;

        for file in files {
            let meta = match fs::symlink_metadata(file) {
                Ok(meta) => meta,
                Err(e) => {
                    self.report_io_fault(file, &e);
                    continue;
                }
            };
            let mtime = match meta.modified() {
                Ok(time) => DateTime::<Utc>::from(time).with_timezone(&self.local_offset),
                Err(e) => {
                    self.report_io_fault(file, &e);
                    continue;
                }
            };

            let size = if meta.file_type().is_symlink() {
                FileSize::Symlink
            } else {
                FileSize::Bytes(meta.len())
            };
            count += 1;
            bytes += meta.len();

            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let line = if self.config.legacy {
                legacy_file_line(mtime, size, &name)
            } else {
                current_file_line(mtime, size, &name)
            };
            self.emit(&line);
        }

        (count, bytes)
    }

    /// Decide what to do with one subdirectory: exclude our own output,
    /// guard against junction loops, honor skip and separate patterns, or
    /// recurse inline.
    fn visit_subdir(&mut self, subdir: &Path) {
        let subdir_str = subdir.to_string_lossy().into_owned();

        // Never list the session's own output into itself.
        if let Some(own) = &self.output_base_normalized {
            if normalize_path(subdir).as_deref() == Some(own) {
                return;
            }
        }

        if is_junction(subdir) {
            self.write_warning(&format!("Skipping junction point \"{}\"", subdir_str));
            return;
        }

        if self.skip_dirs.matches(&subdir_str) {
            self.emit(&dir_header(&subdir_str, self.config.legacy));
            self.emit("[SKIPPED]");
            return;
        }

        if subdir.is_symlink() {
            self.write_warning(&format!(
                "Unskipped directory symbolic link encountered: \"{}\"",
                subdir_str
            ));
        }

        if self.router.output_to_file() && self.separate_dirs.matches(&subdir_str) {
            self.emit(&dir_header(&subdir_str, self.config.legacy));
            self.emit("[SEPARATED]");
            if self.push_data(&subdir_str) {
                self.walk(subdir);
                self.router.pop_data_file();
            } else {
                self.write_error(&format!(
                    "ERROR pushing output file. Skipping listing for \"{}\".",
                    subdir_str
                ));
            }
        } else {
            self.walk(subdir);
        }
    }

    /// Push a new data file, logging the failure. The caller decides what
    /// the failure means for its scope.
    fn push_data(&mut self, path: &str) -> bool {
        match self.router.push_data_file(path) {
            Ok(()) => true,
            Err(e) => {
                self.write_error(&format!(
                    "ERROR: failed to create output file for \"{}\": {}",
                    path, e
                ));
                false
            }
        }
    }

    /// Write one line of listing data; a write fault is downgraded to an
    /// error log entry so traversal continues.
    fn emit(&mut self, text: &str) {
        if let Err(e) = self.router.write_data(text) {
            self.write_error(&format!("ERROR: failed writing listing data: {}", e));
        }
    }

    /// Permission faults are warnings, everything else is an error.
    fn report_io_fault(&mut self, path: &Path, e: &std::io::Error) {
        let msg = format!("{}: {}", path.display(), e);
        if e.kind() == ErrorKind::PermissionDenied {
            self.write_warning(&msg);
        } else {
            self.write_error(&msg);
        }
    }

    fn write_error(&mut self, msg: &str) {
        log::debug!("error: {}", msg);
        self.router.write_log(LogKind::Errors, msg);
    }

    fn write_warning(&mut self, msg: &str) {
        log::debug!("warning: {}", msg);
        self.router.write_log(LogKind::Warnings, msg);
    }
}

/// Blank root entries mean the current working directory.
fn resolve_root(root: &str) -> String {
    if root.trim().is_empty() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .to_string_lossy()
            .into_owned()
    } else {
        root.to_string()
    }
}

/// Normalized form used for own-output-directory comparison: lexically
/// absolute, trailing separators stripped, uppercased. Deliberately does
/// not resolve symlinks, matching the original tool; an aliased spelling
/// of the output directory is not detected.
fn normalize_path(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).ok()?;
    Some(
        absolute
            .to_string_lossy()
            .trim_end_matches(['/', '\\'])
            .to_uppercase(),
    )
}

/// A directory junction in the original tool's sense: a reparse point that
/// must not be followed because following it can loop forever. On Windows
/// that is the hidden+system+reparse attribute combination used by OS
/// junctions. Elsewhere the equivalent hazard is a directory symlink that
/// resolves to an ancestor of its own parent.
#[cfg(windows)]
fn is_junction(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    const JUNCTION_MARKER: u32 =
        FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM | FILE_ATTRIBUTE_REPARSE_POINT;

    fs::symlink_metadata(path)
        .map(|meta| meta.file_attributes() & JUNCTION_MARKER == JUNCTION_MARKER)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_junction(path: &Path) -> bool {
    if !path.is_symlink() {
        return false;
    }
    let target = match fs::canonicalize(path) {
        Ok(target) => target,
        Err(_) => return false,
    };
    let parent = match path.parent().map(fs::canonicalize) {
        Some(Ok(parent)) => parent,
        _ => return false,
    };
    parent.starts_with(&target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_blank_is_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_root(""), cwd.to_string_lossy());
        assert_eq!(resolve_root("  "), cwd.to_string_lossy());
        assert_eq!(resolve_root("/data"), "/data");
    }

    #[test]
    fn test_normalize_path_strips_and_uppercases() {
        let normalized = normalize_path(Path::new("/tmp/out/")).unwrap();
        assert_eq!(normalized, "/TMP/OUT");
        assert_eq!(normalize_path(Path::new("/tmp/out")).unwrap(), normalized);
    }

    #[cfg(unix)]
    #[test]
    fn test_junction_detects_ancestor_loop() {
        use std::os::unix::fs::symlink;
        let dir = tempfile::TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        // loop: sub/up -> ..
        let loop_link = sub.join("up");
        symlink("..", &loop_link).unwrap();
        assert!(is_junction(&loop_link));

        // harmless: link to a sibling is not a loop
        let sibling = dir.path().join("sibling");
        fs::create_dir(&sibling).unwrap();
        let side_link = sub.join("side");
        symlink(&sibling, &side_link).unwrap();
        assert!(!is_junction(&side_link));

        assert!(!is_junction(&sub));
    }

    #[test]
    fn test_session_rejects_bad_pattern() {
        let config = Config {
            skip_dirs: Some(vec!["[".into()]),
            ..Default::default()
        };
        assert!(ListingSession::new(config).is_err());
    }

    #[test]
    fn test_session_rejects_bad_listing_name() {
        let mut session = ListingSession::new(Config::default()).unwrap();
        let err = session.run("bad/name").unwrap_err();
        assert!(matches!(err, ListError::InvalidListingName));
    }
}
