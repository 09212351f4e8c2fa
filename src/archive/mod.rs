//! Packs the final mashup into a single-entry ZIP archive

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::pipeline::{AudioAsset, MashupArchive};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("asset path {0} has no usable file name")]
    UnnamedAsset(PathBuf),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("packaging task aborted: {0}")]
    Task(String),
}

/// Write `asset` as the only entry of a new archive at `dest`
///
/// The entry is stored under the asset's base file name.
pub fn package(asset: &AudioAsset, dest: &Path) -> Result<MashupArchive, ArchiveError> {
    let entry_name = asset
        .file_name()
        .ok_or_else(|| ArchiveError::UnnamedAsset(asset.path.clone()))?
        .to_string();

    let mut source = File::open(&asset.path)?;
    let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(entry_name.as_str(), options)?;
    io::copy(&mut source, &mut zip)?;
    zip.finish()?;

    let size = std::fs::metadata(dest)?.len();
    tracing::info!(archive = %dest.display(), entry = %entry_name, size, "Packaged mashup");

    Ok(MashupArchive {
        path: dest.to_path_buf(),
        entry_name,
        size,
    })
}

/// [`package`] on the blocking pool
pub async fn package_async(
    asset: AudioAsset,
    dest: PathBuf,
) -> Result<MashupArchive, ArchiveError> {
    tokio::task::spawn_blocking(move || package(&asset, &dest))
        .await
        .map_err(|e| ArchiveError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::time::Duration;
    use tempfile::tempdir;
    use zip::ZipArchive;

    #[test]
    fn test_package_holds_exactly_one_named_entry() {
        let dir = tempdir().unwrap();
        let audio = dir.path().join("mashup.mp3");
        std::fs::write(&audio, vec![7u8; 4096]).unwrap();
        // Sibling files must not leak into the archive
        std::fs::write(dir.path().join("000-a.mp3"), b"intermediate").unwrap();

        let asset = AudioAsset::new(&audio, Duration::from_secs(60));
        let archive = package(&asset, &dir.path().join("mashup.zip")).unwrap();

        assert_eq!(archive.entry_name, "mashup.mp3");
        assert_eq!(archive.file_name(), Some("mashup.zip"));
        assert!(archive.size > 0);

        let mut zip = ZipArchive::new(File::open(&archive.path).unwrap()).unwrap();
        assert_eq!(zip.len(), 1);

        let mut entry = zip.by_index(0).unwrap();
        assert_eq!(entry.name(), "mashup.mp3");
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, vec![7u8; 4096]);
    }

    #[test]
    fn test_package_missing_asset() {
        let dir = tempdir().unwrap();
        let asset = AudioAsset::new(dir.path().join("gone.mp3"), Duration::ZERO);

        let result = package(&asset, &dir.path().join("mashup.zip"));
        assert!(matches!(result, Err(ArchiveError::Io(_))));
    }

    #[tokio::test]
    async fn test_package_async() {
        let dir = tempdir().unwrap();
        let audio = dir.path().join("mashup.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        let archive = package_async(
            AudioAsset::new(&audio, Duration::from_secs(1)),
            dir.path().join("out.zip"),
        )
        .await
        .unwrap();
        assert!(archive.exists());
    }
}
