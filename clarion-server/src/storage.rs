//! Upload storage — one flat directory holding raw uploads and cleaned
//! outputs.
//!
//! The root is passed in from settings rather than read from ambient
//! process state, so tests can point each run at a throwaway directory.
//! Identically-named uploads overwrite each other; the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};

use clarion_core::error::{ClarionError, Result};
use tracing::debug;

pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if absent. Called once at startup.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(ClarionError::Io)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist raw upload bytes under the client-supplied filename.
    ///
    /// Only the final path component of `filename` is used, so a hostile
    /// name cannot escape the upload root.
    pub fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.root.join(sanitize_filename(filename));
        fs::write(&path, data)
            .map_err(|e| ClarionError::Upload(format!("saving {}: {e}", path.display())))?;
        debug!(path = ?path, bytes = data.len(), "upload saved");
        Ok(path)
    }

    /// Derive the cleaned-output path for an upload: the extension is
    /// stripped via path parsing and `" - clean.wav"` appended to the stem.
    pub fn cleaned_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        self.root.join(format!("{stem} - clean.wav"))
    }
}

fn sanitize_filename(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| "upload.bin".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> UploadStore {
        let root = std::env::temp_dir().join(format!("clarion-store-{tag}-{}", std::process::id()));
        let store = UploadStore::new(root);
        store.ensure_root().unwrap();
        store
    }

    #[test]
    fn output_path_strips_extension_and_appends_suffix() {
        let store = UploadStore::new("uploads");
        for (input, expected) in [
            ("voice memo.mp3", "voice memo - clean.wav"),
            ("session.flac", "session - clean.wav"),
            ("take.v2.ogg", "take.v2 - clean.wav"),
            ("README", "README - clean.wav"),
        ] {
            let derived = store.cleaned_output_path(&Path::new("uploads").join(input));
            assert_eq!(derived, Path::new("uploads").join(expected));
        }
    }

    #[test]
    fn save_confines_hostile_filenames_to_the_root() {
        let store = temp_store("hostile");
        let path = store.save("../../etc/passwd", b"payload").unwrap();
        assert_eq!(path.parent().unwrap(), store.root());
        assert_eq!(path.file_name().unwrap(), "passwd");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn identical_names_overwrite_last_writer_wins() {
        let store = temp_store("collide");
        store.save("same.wav", b"first").unwrap();
        let path = store.save("same.wav", b"second").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"second");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn empty_filename_falls_back_to_default() {
        assert_eq!(sanitize_filename(""), "upload.bin");
        assert_eq!(sanitize_filename(".."), "upload.bin");
        assert_eq!(sanitize_filename("nested/dir/clip.wav"), "clip.wav");
    }
}
