//! Upload persistence and listing.
//!
//! The store is deliberately dumb: one flat directory, one file per upload,
//! no index. The storage name carries everything the listing endpoint needs
//! to reconstruct a descriptor, so a process restart loses nothing.
//!
//! ## Storage names
//!
//! Each blob is persisted as `<unix-millis>-<original name>`. The millisecond
//! prefix keeps concurrent uploads of the same filename from clobbering each
//! other and gives the listing a natural chronological order. The original
//! name is recovered by stripping everything up to the first `-`.
//!
//! ## Filename transcoding
//!
//! Browsers send multipart filenames as UTF-8, but the transport layer this
//! design inherited labels them latin-1, so a name like `café.txt` arrives as
//! `cafÃ©.txt`. [`decode_transport_filename`] undoes that by reinterpreting
//! the code points as raw bytes. This is a byte-level transcode, not a
//! charset conversion.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::UPLOADS_PATH_PREFIX;

/// Descriptor for one persisted upload.
///
/// Created once per successful upload, immutable afterwards. Serialized
/// camelCase because it goes to browsers verbatim, both as the upload
/// response and inside `newFile` notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Original filename as the uploader saw it
    pub original_name: String,
    /// Unique name the blob is persisted under
    pub filename: String,
    /// Size in bytes
    pub size: u64,
    /// Public path the blob is served from
    pub path: String,
}

/// Flat-directory blob store for uploaded files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created lazily on first save; a store over a missing
    /// directory lists as empty.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory blobs are persisted under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an upload and return its descriptor.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<FileDescriptor> {
        let original_name = sanitize_name(original_name)?;

        tokio::fs::create_dir_all(&self.root).await?;

        let storage_name = format!("{}-{}", chrono::Utc::now().timestamp_millis(), original_name);
        let blob_path = self.root.join(&storage_name);
        tokio::fs::write(&blob_path, data).await?;

        tracing::info!(
            "stored upload '{}' as '{}' ({} bytes)",
            original_name,
            storage_name,
            data.len()
        );

        Ok(FileDescriptor {
            original_name,
            path: format!("{UPLOADS_PATH_PREFIX}/{storage_name}"),
            filename: storage_name,
            size: data.len() as u64,
        })
    }

    /// List descriptors for every persisted blob, oldest first.
    ///
    /// A missing root directory means nothing was ever uploaded and lists as
    /// empty rather than an error.
    pub async fn list(&self) -> Result<Vec<FileDescriptor>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut descriptors = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let storage_name = entry.file_name().to_string_lossy().into_owned();
            descriptors.push(FileDescriptor {
                original_name: strip_timestamp_prefix(&storage_name).to_string(),
                path: format!("{UPLOADS_PATH_PREFIX}/{storage_name}"),
                filename: storage_name,
                size: metadata.len(),
            });
        }

        // Millisecond prefixes sort lexicographically in upload order.
        descriptors.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(descriptors)
    }

    /// Resolve a stored blob for download.
    ///
    /// Returns the on-disk path and the blob's size. Names containing path
    /// separators or parent components are rejected before touching the
    /// filesystem.
    pub async fn open(&self, storage_name: &str) -> Result<(PathBuf, u64)> {
        if storage_name.is_empty()
            || storage_name.contains(['/', '\\'])
            || storage_name.contains("..")
        {
            return Err(Error::InvalidBlobName(storage_name.to_string()));
        }

        let path = self.root.join(storage_name);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok((path, metadata.len())),
            Ok(_) => Err(Error::BlobNotFound(storage_name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::BlobNotFound(storage_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject filenames that are empty or try to escape the upload directory.
fn sanitize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidFilename("empty filename".to_string()));
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::InvalidFilename(name.to_string()));
    }
    Ok(name.to_string())
}

/// Recover the original filename from a storage name by stripping the
/// timestamp prefix up to the first `-`.
#[must_use]
pub fn strip_timestamp_prefix(storage_name: &str) -> &str {
    storage_name
        .split_once('-')
        .map_or(storage_name, |(_, rest)| rest)
}

/// Reinterpret a mislabeled multipart filename as UTF-8.
///
/// The transport decodes filename bytes as latin-1, one code point per byte.
/// Mapping each code point back to its byte and parsing the result as UTF-8
/// recovers the name the uploader typed. Names that already contain code
/// points above U+00FF cannot have come through that path and are returned
/// unchanged; genuinely invalid UTF-8 falls back to lossy replacement.
#[must_use]
pub fn decode_transport_filename(raw: &str) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    for c in raw.chars() {
        let Ok(byte) = u8::try_from(u32::from(c)) else {
            return raw.to_string();
        };
        bytes.push(byte);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Content type for a stored blob, derived from its file extension.
///
/// Fixed lookup table; unknown extensions are served as opaque binary.
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map_or("", |(_, ext)| ext)
        .to_ascii_lowercase();

    match ext.as_str() {
        "txt" => "text/plain",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, UploadStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = UploadStore::new(dir.path().join("uploads"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_produces_descriptor() {
        let (_dir, store) = temp_store();

        let descriptor = store.save("notes.txt", b"hello").await.unwrap();

        assert_eq!(descriptor.original_name, "notes.txt");
        assert_eq!(descriptor.size, 5);
        assert!(descriptor.filename.ends_with("-notes.txt"));
        assert_eq!(descriptor.path, format!("/uploads/{}", descriptor.filename));

        let on_disk = store.root().join(&descriptor.filename);
        assert_eq!(std::fs::read(on_disk).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_recovers_original_names() {
        let (_dir, store) = temp_store();

        store.save("a.txt", b"first").await.unwrap();
        store.save("b.txt", b"second!").await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);

        let names: Vec<&str> = listed.iter().map(|d| d.original_name.as_str()).collect();
        assert!(names.contains(&"a.txt"));
        assert!(names.contains(&"b.txt"));

        for descriptor in &listed {
            assert_eq!(descriptor.path, format!("/uploads/{}", descriptor.filename));
        }
    }

    #[tokio::test]
    async fn test_open_rejects_traversal() {
        let (_dir, store) = temp_store();

        assert!(matches!(
            store.open("../secret").await,
            Err(Error::InvalidBlobName(_))
        ));
        assert!(matches!(
            store.open("a/b.txt").await,
            Err(Error::InvalidBlobName(_))
        ));
    }

    #[tokio::test]
    async fn test_open_unknown_blob() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.open("123-gone.txt").await,
            Err(Error::BlobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_rejects_bad_names() {
        let (_dir, store) = temp_store();

        assert!(store.save("", b"x").await.is_err());
        assert!(store.save("../evil.sh", b"x").await.is_err());
        assert!(store.save("a/b.txt", b"x").await.is_err());
    }

    #[test]
    fn test_strip_timestamp_prefix() {
        assert_eq!(strip_timestamp_prefix("1700000000000-photo.png"), "photo.png");
        // Dashes in the original name survive; only the first one splits.
        assert_eq!(
            strip_timestamp_prefix("1700000000000-my-notes.txt"),
            "my-notes.txt"
        );
        // No prefix at all: returned unchanged.
        assert_eq!(strip_timestamp_prefix("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_decode_transport_filename_mojibake() {
        // "café.txt" decoded byte-per-byte as latin-1 shows up as this.
        assert_eq!(decode_transport_filename("caf\u{c3}\u{a9}.txt"), "café.txt");
    }

    #[test]
    fn test_decode_transport_filename_ascii_passthrough() {
        assert_eq!(decode_transport_filename("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_decode_transport_filename_wide_chars_untouched() {
        // Already-decoded names cannot be re-narrowed to bytes; keep them.
        assert_eq!(decode_transport_filename("文件.txt"), "文件.txt");
    }

    #[tokio::test]
    async fn test_non_ascii_filename_round_trip() {
        let (_dir, store) = temp_store();

        let decoded = decode_transport_filename("caf\u{c3}\u{a9}.txt");
        store.save(&decoded, b"bytes").await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].original_name, "café.txt");
    }

    #[test]
    fn test_content_type_table() {
        assert_eq!(content_type_for("a.txt"), "text/plain");
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("archive.zip"), "application/zip");
        assert_eq!(content_type_for("mystery.xyz"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let descriptor = FileDescriptor {
            original_name: "notes.txt".into(),
            filename: "1700000000000-notes.txt".into(),
            size: 5,
            path: "/uploads/1700000000000-notes.txt".into(),
        };

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["originalName"], "notes.txt");
        assert_eq!(json["filename"], "1700000000000-notes.txt");
        assert_eq!(json["size"], 5);
        assert_eq!(json["path"], "/uploads/1700000000000-notes.txt");
    }
}
