//! Output routing: the data-file stack and the log-file registry.
//!
//! A session writes listing data either to stdout or into a generated
//! output directory. In file mode the active data target is the top of a
//! stack of open files, one per separated subtree currently being written,
//! with the root's own file at the bottom. Log output (errors, warnings,
//! stats, effective config) goes to at most one lazily-created file per
//! kind, mirrored to stderr/stdout where the kind calls for it.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::format::path_to_filename;

/// The four singleton log artifacts a session can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Errors,
    Warnings,
    Stats,
    Config,
}

impl LogKind {
    pub fn filename(&self) -> &'static str {
        match self {
            LogKind::Errors => "_ERRORS.txt",
            LogKind::Warnings => "_WARNINGS.txt",
            LogKind::Stats => "_STATS.txt",
            LogKind::Config => "_CONFIG.json",
        }
    }

    /// The console stream a message of this kind is mirrored to, in both
    /// file and stdout modes.
    fn mirror(&self) -> Mirror {
        match self {
            LogKind::Errors => Mirror::Stderr,
            LogKind::Stats => Mirror::Stdout,
            LogKind::Warnings | LogKind::Config => Mirror::None,
        }
    }
}

enum Mirror {
    Stdout,
    Stderr,
    None,
}

/// One open output file. Buffered; flushed on close.
struct FileOutput {
    writer: BufWriter<File>,
}

impl FileOutput {
    fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", text)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Owns every file handle a session writes through and guarantees each is
/// flushed and closed exactly once, on every exit path.
pub struct OutputRouter {
    /// Generated output directory, or `None` for stdout mode.
    base: Option<PathBuf>,
    data_stack: Vec<FileOutput>,
    logs: HashMap<LogKind, FileOutput>,
}

impl OutputRouter {
    /// A router writing data to stdout; no log files are ever created.
    pub fn stdout() -> Self {
        Self {
            base: None,
            data_stack: Vec::new(),
            logs: HashMap::new(),
        }
    }

    /// A router writing into `base`, which must already exist.
    pub fn file_base(base: PathBuf) -> Self {
        Self {
            base: Some(base),
            data_stack: Vec::new(),
            logs: HashMap::new(),
        }
    }

    pub fn output_to_file(&self) -> bool {
        self.base.is_some()
    }

    /// Write one line of listing data to the active target: the top of the
    /// data-file stack, or stdout when the stack is empty.
    pub fn write_data(&mut self, text: &str) -> io::Result<()> {
        match self.data_stack.last_mut() {
            Some(top) => top.write_line(text),
            None => {
                println!("{}", text);
                Ok(())
            }
        }
    }

    /// Open a new data file for `dir_path` inside the base directory and
    /// make it the active target. The filename is the flattened path.
    pub fn push_data_file(&mut self, dir_path: &str) -> io::Result<()> {
        let base = self.base.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Unsupported, "output is not file-based")
        })?;
        let path = base.join(path_to_filename(dir_path));
        log::debug!("pushing data file {}", path.display());
        self.data_stack.push(FileOutput::create(&path)?);
        Ok(())
    }

    /// Flush and close the active data file, restoring the previous target.
    /// Returns false when there was nothing to pop.
    pub fn pop_data_file(&mut self) -> bool {
        match self.data_stack.pop() {
            Some(mut top) => {
                if let Err(e) = top.flush() {
                    log::warn!("flush on pop failed: {}", e);
                }
                true
            }
            None => false,
        }
    }

    /// Append `msg` to the singleton log file of `kind`, creating it on
    /// first use (file mode only), and mirror it to the kind's console
    /// stream. File-side failures are reported on stderr rather than
    /// propagated, so a broken log never stops the walk.
    pub fn write_log(&mut self, kind: LogKind, msg: &str) {
        if let Some(base) = &self.base {
            let result = match self.logs.entry(kind) {
                std::collections::hash_map::Entry::Occupied(mut entry) => {
                    entry.get_mut().write_line(msg)
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    match FileOutput::create(&base.join(kind.filename())) {
                        Ok(output) => entry.insert(output).write_line(msg),
                        Err(e) => Err(e),
                    }
                }
            };
            if let Err(e) = result {
                eprintln!("ERROR: failed writing {}: {}", kind.filename(), e);
            }
        }

        match kind.mirror() {
            Mirror::Stderr => eprintln!("{}", msg),
            Mirror::Stdout => println!("{}", msg),
            Mirror::None => {}
        }
    }

    /// Close everything still open: remaining data files first, then the
    /// log files. Idempotent; also invoked from `Drop` so handles are
    /// released on every exit path.
    pub fn teardown(&mut self) {
        while self.pop_data_file() {}
        for (kind, mut output) in self.logs.drain() {
            if let Err(e) = output.flush() {
                log::warn!("flush of {} failed: {}", kind.filename(), e);
            }
        }
    }
}

impl Drop for OutputRouter {
    fn drop(&mut self) {
        self.teardown();
    }
}
