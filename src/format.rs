//! Report line formatting for both output styles.
//!
//! The legacy style reproduces a retired reporting tool's layout exactly:
//! 12-hour timestamps with a double space, 17-wide byte columns, `<SYMLINK>`
//! markers padded just so. The current style uses 24-hour timestamps and a
//! 19-wide byte column. Both group byte counts with thousands separators.

use chrono::{DateTime, FixedOffset};

/// Timestamp layout of the current style: `2024-03-01 14.05.09`.
const CURRENT_TIME_FORMAT: &str = "%Y-%m-%d %H.%M.%S";
/// Timestamp layout of the legacy style: `2024-03-01  02:05 PM`.
const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d  %I:%M %p";

/// One file line in the current style.
pub fn current_file_line(mtime: DateTime<FixedOffset>, size: FileSize, name: &str) -> String {
    let size_col = match size {
        FileSize::Symlink => "          [SYMLINK]".to_string(),
        FileSize::Bytes(n) => format!("{:>19}", group_thousands(n)),
    };
    format!("{} {} {}", mtime.format(CURRENT_TIME_FORMAT), size_col, name)
}

/// One file line in the legacy style.
pub fn legacy_file_line(mtime: DateTime<FixedOffset>, size: FileSize, name: &str) -> String {
    let size_col = match size {
        FileSize::Symlink => "   <SYMLINK>     ".to_string(),
        FileSize::Bytes(n) => format!("{:>17}", group_thousands(n)),
    };
    format!("{} {} {}", mtime.format(LEGACY_TIME_FORMAT), size_col, name)
}

/// Size column content: a byte count, or the symlink marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSize {
    Bytes(u64),
    Symlink,
}

/// Directory header line. Written with a leading and trailing blank line.
pub fn dir_header(dir: &str, legacy: bool) -> String {
    if legacy {
        format!("\n Directory of {}\n", dir)
    } else {
        format!("\n {}\n", dir)
    }
}

/// Per-directory (and legacy per-root) file count subtotal:
/// `           3 File(s)          1,234 bytes`.
pub fn legacy_subtotal(count: u64, bytes: u64) -> String {
    format!("{:>16} File(s) {:>14} bytes", count, group_thousands(bytes))
}

/// The legacy grand-total header written before the final subtotal line.
pub const LEGACY_TOTAL_HEADER: &str = "\n     Total Files Listed:";

/// Column-aligned per-root statistics block of the current style.
///
/// `indent` distinguishes file output (lines flush left) from stdout output
/// (lines indented two spaces). The three value columns share the width of
/// the widest value.
pub fn stats_block(root: &str, files: u64, bytes: u64, elapsed_secs: u64, to_file: bool) -> String {
    let files = group_thousands(files);
    let bytes = group_thousands(bytes);
    let time = format_elapsed(elapsed_secs);
    let width = files.len().max(bytes.len()).max(time.len());
    let sep = if to_file { "\n" } else { "\n  " };
    format!(
        "{sep}Statistics for {root}\n{sep}Files: {files:>width$}{sep}Bytes: {bytes:>width$}{sep}Time:  {time:>width$}"
    )
}

/// Elapsed wall time as `hh:mm:ss`.
pub fn format_elapsed(total_secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60
    )
}

/// Format a number with thousand separators.
pub fn group_thousands(n: u64) -> String {
    let s = n.to_string();
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, *c);
    }

    result
}

/// Flatten a directory path into a single output file name: trailing
/// separators trimmed, remaining separators become `" - "`, drive colons
/// vanish, `.txt` appended.
pub fn path_to_filename(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches(['/', '\\']);
    let mut name = String::with_capacity(trimmed.len() + 4);
    for c in trimmed.chars() {
        match c {
            '/' | '\\' => name.push_str(" - "),
            ':' => {}
            other => name.push(other),
        }
    }
    name.push_str(".txt");
    name
}

/// Characters that cannot appear in a filesystem entry name. The listing
/// name becomes part of the output directory name, so it is held to the
/// same rule on every platform.
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

pub fn has_invalid_filename_chars(name: &str) -> bool {
    name.chars()
        .any(|c| c.is_control() || INVALID_FILENAME_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 14, 5, 9)
            .unwrap()
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_current_file_line() {
        let line = current_file_line(fixed_time(), FileSize::Bytes(1500), "notes.txt");
        assert_eq!(line, "2024-03-01 14.05.09               1,500 notes.txt");
        // timestamp (19) + space + size column (19) + space + name
        assert_eq!(line.find("notes.txt"), Some(40));
    }

    #[test]
    fn test_current_symlink_marker() {
        let line = current_file_line(fixed_time(), FileSize::Symlink, "link");
        assert_eq!(line, "2024-03-01 14.05.09           [SYMLINK] link");
    }

    #[test]
    fn test_legacy_file_line() {
        let line = legacy_file_line(fixed_time(), FileSize::Bytes(1500), "notes.txt");
        assert_eq!(line, "2024-03-01  02:05 PM             1,500 notes.txt");
        // timestamp (20) + space + size column (17) + space + name
        assert_eq!(line.find("notes.txt"), Some(39));
    }

    #[test]
    fn test_legacy_morning_timestamp() {
        let am = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 0, 30, 0)
            .unwrap();
        let line = legacy_file_line(am, FileSize::Bytes(1), "a");
        assert!(line.starts_with("2024-03-01  12:30 AM"), "{}", line);
    }

    #[test]
    fn test_legacy_symlink_marker() {
        let line = legacy_file_line(fixed_time(), FileSize::Symlink, "link");
        assert_eq!(line, "2024-03-01  02:05 PM    <SYMLINK>      link");
    }

    #[test]
    fn test_dir_headers() {
        assert_eq!(dir_header("/data", false), "\n /data\n");
        assert_eq!(dir_header("/data", true), "\n Directory of /data\n");
    }

    #[test]
    fn test_legacy_subtotal() {
        assert_eq!(
            legacy_subtotal(3, 1234),
            "               3 File(s)          1,234 bytes"
        );
    }

    #[test]
    fn test_stats_block_alignment() {
        let block = stats_block("/data", 2, 150, 3, true);
        assert_eq!(
            block,
            "\nStatistics for /data\n\nFiles:        2\nBytes:      150\nTime:  00:00:03"
        );
    }

    #[test]
    fn test_stats_block_stdout_indent() {
        let block = stats_block("/data", 2, 150, 3, false);
        assert!(block.contains("\n  Files:"));
        assert!(block.contains("\n  Time:"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(59), "00:00:59");
        assert_eq!(format_elapsed(3661), "01:01:01");
        assert_eq!(format_elapsed(86400), "24:00:00");
    }

    #[test]
    fn test_path_to_filename() {
        assert_eq!(path_to_filename("/data/logs/"), " - data - logs.txt");
        assert_eq!(path_to_filename("C:\\data\\logs"), "C - data - logs.txt");
        assert_eq!(path_to_filename(" /data "), " - data.txt");
    }

    #[test]
    fn test_invalid_filename_chars() {
        assert!(!has_invalid_filename_chars("nightly run"));
        assert!(has_invalid_filename_chars("a/b"));
        assert!(has_invalid_filename_chars("a:b"));
        assert!(has_invalid_filename_chars("a*b"));
        assert!(has_invalid_filename_chars("a\tb"));
        assert!(!has_invalid_filename_chars(""));
    }
}
