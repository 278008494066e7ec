//! Facilities for discovering input files and loading training corpora.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{BpeError, Result};

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Directories are traversed recursively by default; set [`IngestConfig::recursive`] to `false`
/// to limit discovery to the first level. Files inside a directory are visited in file name
/// order so that the assembled corpus, and therefore the trained vocabulary, is reproducible.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(BpeError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .symlink_metadata()
            .map_err(|err| BpeError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let mut walker = WalkDir::new(path)
                .follow_links(cfg.follow_symlinks)
                .sort_by_file_name();
            if !cfg.recursive {
                walker = walker.max_depth(1);
            }
            for entry in walker {
                let entry = entry.map_err(|err| BpeError::Internal(err.to_string()))?;
                if entry.file_type().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if metadata.is_file() || metadata.file_type().is_symlink() {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(BpeError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Reads every discovered file and concatenates the contents into a single corpus.
pub fn load_corpus<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<u8>> {
    let file_paths = collect_paths(inputs, cfg)?;
    let mut corpus = Vec::new();
    for file_path in &file_paths {
        let bytes =
            fs::read(file_path).map_err(|err| BpeError::io(err, Some(file_path.clone())))?;
        debug!("read {} bytes from {}", bytes.len(), file_path.display());
        corpus.extend_from_slice(&bytes);
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn collect_paths_discovers_files_recursively() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let file_a = dir.path().join("a.txt");
        let file_b = nested.join("b.txt");
        fs::write(&file_a, "one").expect("write a");
        fs::write(&file_b, "two").expect("write b");

        let paths = collect_paths(&[dir.path()], &IngestConfig::default()).expect("collect");
        assert_eq!(paths, vec![file_a, file_b]);
    }

    #[test]
    fn collect_paths_respects_non_recursive_mode() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let top = dir.path().join("top.txt");
        fs::write(&top, "top").expect("write top");
        fs::write(nested.join("deep.txt"), "deep").expect("write deep");

        let cfg = IngestConfig::builder().recursive(false).build();
        let paths = collect_paths(&[dir.path()], &cfg).expect("collect");
        assert_eq!(paths, vec![top]);
    }

    #[test]
    fn missing_input_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("absent.txt");
        let err = collect_paths(&[missing], &IngestConfig::default()).expect_err("missing");
        assert!(matches!(err, BpeError::InvalidConfig(_)));
    }

    #[test]
    fn load_corpus_concatenates_in_order() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("1.txt"), "ab").expect("write 1");
        fs::write(dir.path().join("2.txt"), "cd").expect("write 2");
        let corpus = load_corpus(&[dir.path()], &IngestConfig::default()).expect("load");
        assert_eq!(corpus, b"abcd");
    }
}
