//! Dirlist - a recursive directory lister with multi-file output routing
//!
//! `dirlist` walks one or more directory trees and writes a formatted
//! listing of every file (modification time, size, name) grouped by
//! directory. Subtrees can be skipped by regex pattern, or routed into
//! their own output files. A legacy mode reproduces the fixed-width report
//! layout of a retired tool byte-for-byte, including its directory sort
//! order, so old reference listings still diff clean.

pub mod config;
pub mod error;
pub mod format;
pub mod ordering;
pub mod output;
pub mod patterns;
pub mod session;

pub use config::Config;
pub use error::ListError;
pub use ordering::DirOrdering;
pub use output::{LogKind, OutputRouter};
pub use patterns::PatternSet;
pub use session::ListingSession;
