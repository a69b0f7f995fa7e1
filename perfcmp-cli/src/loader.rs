//! Results Loading
//!
//! Reads raw perf test results from disk into [`BootResults`].
//!
//! A full comparison input is a directory with a `by_boot` subdirectory that
//! holds one entry per boot. Each boot is either a directory or a tar
//! archive (plain or gzip-compressed) containing files named like:
//!
//! ```text
//! <test-executable>_process<N>.json          results read here
//! <test-executable>_process<N>.catapult_json ignored
//! summary.json                               ignored
//! ```
//!
//! Each results file holds the results of one launch of a perf test process:
//! a JSON array of `{"label": ..., "values": [...]}` records.
//!
//! Boots are loaded in parallel; entries are always processed in sorted
//! name order so the output does not depend on directory listing order.

use flate2::read::GzDecoder;
use perfcmp_logic::{BootResults, ProcessRun, TestCaseRun};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the per-boot subdirectory inside a results directory
pub const BY_BOOT_DIR: &str = "by_boot";

/// Errors from reading results and snapshots
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading a file, directory or archive failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A file was read but is not valid results or snapshot JSON
    #[error("malformed input in {origin}: {message}")]
    MalformedInput {
        /// File (or archive member) being parsed
        origin: String,
        /// Parser message
        message: String,
    },

    /// Results directory without a `by_boot` subdirectory
    #[error("results directory {} has no by_boot subdirectory", .0.display())]
    MissingByBoot(PathBuf),

    /// Input path does not exist
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Whether a file name holds process run results
pub fn is_results_filename(name: &str) -> bool {
    name.ends_with(".json") && name != "summary.json"
}

/// Parse one process run's results file
pub fn parse_process_run(contents: &[u8], origin: &str) -> Result<ProcessRun, LoadError> {
    let test_cases: Vec<TestCaseRun> =
        serde_json::from_slice(contents).map_err(|e| LoadError::MalformedInput {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

    Ok(ProcessRun {
        source: origin.to_string(),
        test_cases,
    })
}

/// Read the results of a single boot from a directory or tar archive
pub fn load_boot(path: &Path) -> Result<BootResults, LoadError> {
    let process_runs = if path.is_dir() {
        read_boot_dir(path)?
    } else if path.is_file() {
        read_boot_archive(path)?
    } else {
        return Err(LoadError::NotFound(path.to_path_buf()));
    };

    if process_runs.is_empty() {
        warn!(boot = %path.display(), "no results files found for boot");
    }
    debug!(boot = %path.display(), process_runs = process_runs.len(), "loaded boot");

    Ok(BootResults {
        id: path.display().to_string(),
        process_runs,
    })
}

fn read_boot_dir(dir: &Path) -> Result<Vec<ProcessRun>, LoadError> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(io_error(dir))?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()
        .map_err(io_error(dir))?;
    names.sort();

    names
        .iter()
        .filter(|name| is_results_filename(name))
        .map(|name| {
            let path = dir.join(name);
            let contents = std::fs::read(&path).map_err(io_error(&path))?;
            parse_process_run(&contents, &path.display().to_string())
        })
        .collect()
}

/// First two bytes of a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn read_boot_archive(archive_path: &Path) -> Result<Vec<ProcessRun>, LoadError> {
    let bytes = std::fs::read(archive_path).map_err(io_error(archive_path))?;
    let reader: Box<dyn Read + '_> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(bytes.as_slice()))
    } else {
        Box::new(bytes.as_slice())
    };
    let mut archive = tar::Archive::new(reader);

    let mut members: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    for entry in archive.entries().map_err(io_error(archive_path))? {
        let mut entry = entry.map_err(io_error(archive_path))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let member = entry.path().map_err(io_error(archive_path))?.into_owned();
        let is_results = member
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_results_filename);
        if !is_results {
            continue;
        }
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(io_error(archive_path))?;
        members.push((member, contents));
    }
    members.sort_by(|a, b| a.0.cmp(&b.0));

    members
        .into_iter()
        .map(|(member, contents)| {
            let origin = format!("{}:{}", archive_path.display(), member.display());
            parse_process_run(&contents, &origin)
        })
        .collect()
}

/// Load several boots in parallel, keeping their order
pub fn load_boots(paths: &[PathBuf]) -> Result<Vec<BootResults>, LoadError> {
    let loaded: Vec<Result<BootResults, LoadError>> =
        paths.par_iter().map(|path| load_boot(path)).collect();
    loaded.into_iter().collect()
}

/// Load every boot under `<dir>/by_boot`, in sorted name order
pub fn load_results_dir(dir: &Path) -> Result<Vec<BootResults>, LoadError> {
    if !dir.exists() {
        return Err(LoadError::NotFound(dir.to_path_buf()));
    }
    let by_boot = dir.join(BY_BOOT_DIR);
    if !by_boot.is_dir() {
        return Err(LoadError::MissingByBoot(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(&by_boot)
        .map_err(io_error(&by_boot))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_error(&by_boot))?;
    paths.sort();

    debug!(dir = %dir.display(), boots = paths.len(), "found boots");
    load_boots(&paths)
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    blobs: BTreeMap<String, BlobInfo>,
}

#[derive(Debug, Deserialize)]
struct BlobInfo {
    size: u64,
}

/// Sum of all blob sizes in a snapshot file
pub fn read_snapshot_total(path: &Path) -> Result<u64, LoadError> {
    let contents = std::fs::read(path).map_err(io_error(path))?;
    let origin = path.display().to_string();
    let snapshot: Snapshot =
        serde_json::from_slice(&contents).map_err(|e| LoadError::MalformedInput {
            origin: origin.clone(),
            message: e.to_string(),
        })?;

    snapshot
        .blobs
        .values()
        .try_fold(0u64, |total, blob| total.checked_add(blob.size))
        .ok_or_else(|| LoadError::MalformedInput {
            origin,
            message: "total blob size overflows 64 bits".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_boot(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, contents) in files {
            fs::write(dir.join(file), contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_results_filename_filter() {
        assert!(is_results_filename("fs_test_process0.json"));
        assert!(!is_results_filename("summary.json"));
        assert!(!is_results_filename("fs_test_process0.catapult_json"));
        assert!(!is_results_filename("notes.txt"));
    }

    #[test]
    fn test_load_boot_dir_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let boot = write_boot(
            tmp.path(),
            "boot0",
            &[
                ("b_process0.json", r#"[{"label": "b", "values": [1, 2]}]"#),
                ("a_process0.json", r#"[{"label": "a", "values": [3, 4], "unit": "ns"}]"#),
                ("a_process0.catapult_json", "not json"),
                ("summary.json", "not json either"),
            ],
        );

        let results = load_boot(&boot).unwrap();
        assert_eq!(results.process_runs.len(), 2);
        assert_eq!(results.process_runs[0].test_cases[0].label, "a");
        assert_eq!(results.process_runs[1].test_cases[0].values, vec![1.0, 2.0]);
        assert!(results.process_runs[0].source.ends_with("a_process0.json"));
    }

    #[test]
    fn test_malformed_results_file() {
        let tmp = TempDir::new().unwrap();
        let boot = write_boot(
            tmp.path(),
            "boot0",
            &[("x_process0.json", r#"[{"label": "x"}]"#)],
        );

        match load_boot(&boot) {
            Err(LoadError::MalformedInput { origin, message }) => {
                assert!(origin.ends_with("x_process0.json"));
                assert!(message.contains("values"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn boot_tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let entries: [(&str, &[u8]); 3] = [
            ("out/z_process0.json", br#"[{"label": "z", "values": [9, 1]}]"#),
            ("out/summary.json", b"{}"),
            ("out/m_process0.json", br#"[{"label": "m", "values": [9, 2]}]"#),
        ];
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn archive_labels(path: &Path) -> Vec<String> {
        load_boot(path)
            .unwrap()
            .process_runs
            .iter()
            .map(|run| run.test_cases[0].label.clone())
            .collect()
    }

    #[test]
    fn test_load_boot_archive() {
        let tmp = TempDir::new().unwrap();
        let archive_path = tmp.path().join("boot0.tar");
        fs::write(&archive_path, boot_tarball()).unwrap();

        assert_eq!(archive_labels(&archive_path), vec!["m", "z"]);
    }

    #[test]
    fn test_load_gzipped_boot_archive() {
        use flate2::{Compression, write::GzEncoder};
        use std::io::Write;

        let tmp = TempDir::new().unwrap();
        let archive_path = tmp.path().join("boot0.tar.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&boot_tarball()).unwrap();
        fs::write(&archive_path, encoder.finish().unwrap()).unwrap();

        assert_eq!(archive_labels(&archive_path), vec!["m", "z"]);
    }

    #[test]
    fn test_load_results_dir() {
        let tmp = TempDir::new().unwrap();
        let by_boot = tmp.path().join(BY_BOOT_DIR);
        for name in ["boot1", "boot0"] {
            write_boot(
                &by_boot,
                name,
                &[("t_process0.json", r#"[{"label": "t", "values": [5, 6]}]"#)],
            );
        }

        let boots = load_results_dir(tmp.path()).unwrap();
        assert_eq!(boots.len(), 2);
        assert!(boots[0].id.ends_with("boot0"));
        assert!(boots[1].id.ends_with("boot1"));
    }

    #[test]
    fn test_missing_by_boot() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_results_dir(tmp.path()),
            Err(LoadError::MissingByBoot(_))
        ));
        assert!(matches!(
            load_results_dir(&tmp.path().join("absent")),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_total() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("system.snapshot");
        fs::write(
            &path,
            r#"{"blobs": {"a": {"size": 100, "merkle": "abc"}, "b": {"size": 23}}}"#,
        )
        .unwrap();

        assert_eq!(read_snapshot_total(&path).unwrap(), 123);
    }

    #[test]
    fn test_snapshot_missing_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("system.snapshot");
        fs::write(&path, r#"{"blobs": {"a": {}}}"#).unwrap();

        assert!(matches!(
            read_snapshot_total(&path),
            Err(LoadError::MalformedInput { .. })
        ));
    }
}
