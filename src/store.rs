use std::path::{Path, PathBuf};

use actix_web::web::Bytes;
use futures_core::Stream;

use crate::{config::Filesystem, error_code::ErrorCode, file::File, stream::LocalBoxStream};

#[derive(Debug, thiserror::Error)]
pub(crate) enum FileError {
    #[error("Failed to interact with the filesystem")]
    Io(#[from] std::io::Error),
}

impl FileError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::FILE_IO_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid file name {0:?}")]
pub(crate) struct FileKeyError(String);

#[derive(Debug, thiserror::Error)]
#[error("Invalid format {0:?}")]
pub(crate) struct FormatError(String);

/// The name a stored file is addressed by.
///
/// Keys are always bare file names. Anything that could reach outside the
/// store directories is rejected at parse time, so joining a key onto a store
/// root is safe everywhere else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FileKey(String);

impl FileKey {
    pub(crate) fn parse(name: &str) -> Result<Self, FileKeyError> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(FileKeyError(name.to_string()));
        }

        if name.contains(['/', '\\', '\0']) {
            return Err(FileKeyError(name.to_string()));
        }

        Ok(FileKey(name.to_string()))
    }

    /// Reduces a client-supplied upload name to a safe bare name.
    pub(crate) fn normalize(name: &str) -> Result<Self, FileKeyError> {
        let sanitized = sanitize_filename::sanitize(name);

        Self::parse(&sanitized).map_err(|_| FileKeyError(name.to_string()))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    fn stem(&self) -> &str {
        Path::new(self.0.as_str())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.0.as_str())
    }

    pub(crate) fn converted(&self, format: &FormatToken) -> FileKey {
        FileKey(format!("{}.{format}", self.stem()))
    }

    pub(crate) fn trimmed(&self, format: &FormatToken) -> FileKey {
        FileKey(format!("{}_trimmed.{format}", self.stem()))
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A container or extension token destined for an output file name and the
/// ffmpeg command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FormatToken(String);

impl FormatToken {
    pub(crate) fn parse(format: &str) -> Result<Self, FormatError> {
        if format.is_empty() || !format.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(FormatError(format.to_string()));
        }

        Ok(FormatToken(format.to_string()))
    }
}

impl std::fmt::Display for FormatToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filesystem-backed storage split into an incoming namespace for uploads and
/// an outgoing namespace for produced files.
#[derive(Clone, Debug)]
pub(crate) struct FileStore {
    incoming: PathBuf,
    outgoing: PathBuf,
}

impl FileStore {
    pub(crate) async fn build(filesystem: &Filesystem) -> Result<Self, FileError> {
        let incoming = filesystem.path.join(&filesystem.incoming);
        let outgoing = filesystem.path.join(&filesystem.outgoing);

        tokio::fs::create_dir_all(&incoming).await?;
        tokio::fs::create_dir_all(&outgoing).await?;

        Ok(FileStore { incoming, outgoing })
    }

    #[tracing::instrument(skip(self, stream))]
    pub(crate) async fn save_stream<S>(&self, key: &FileKey, stream: S) -> Result<u64, FileError>
    where
        S: Stream<Item = std::io::Result<Bytes>>,
    {
        let path = self.incoming.join(key.as_str());

        let mut file = File::create(&path).await?;

        match file.write_from_stream(stream).await {
            Ok(written) => Ok(written),
            Err(e) => {
                tokio::fs::remove_file(&path).await?;

                Err(e.into())
            }
        }
    }

    pub(crate) async fn incoming_file(&self, key: &FileKey) -> Result<Option<PathBuf>, FileError> {
        Self::existing_file(self.incoming.join(key.as_str())).await
    }

    pub(crate) async fn outgoing_file(&self, key: &FileKey) -> Result<Option<PathBuf>, FileError> {
        Self::existing_file(self.outgoing.join(key.as_str())).await
    }

    pub(crate) fn outgoing_path(&self, key: &FileKey) -> PathBuf {
        self.outgoing.join(key.as_str())
    }

    async fn existing_file(path: PathBuf) -> Result<Option<PathBuf>, FileError> {
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn to_stream(
        &self,
        path: &Path,
    ) -> Result<LocalBoxStream<'static, std::io::Result<Bytes>>, FileError> {
        let file = File::open(path).await?;

        Ok(Box::pin(file.read_to_stream()))
    }

    pub(crate) async fn health_check(&self) -> Result<(), FileError> {
        tokio::fs::metadata(&self.incoming).await?;
        tokio::fs::metadata(&self.outgoing).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use actix_web::web::Bytes;
    use futures_util::StreamExt;

    use super::{FileKey, FileStore, FormatToken};
    use crate::config::Filesystem;

    macro_rules! test_async {
        ($fut:expr) => {
            actix_web::rt::System::new().block_on($fut)
        };
    }

    #[test]
    fn rejects_traversal_names() {
        for name in ["", ".", "..", "a/b.mp4", "a\\b.mp4", "..\\up.mp4", "nul\0byte"] {
            assert!(FileKey::parse(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn accepts_bare_names() {
        for name in ["video.mp4", ".env", "archive.tar.gz", "no extension"] {
            assert!(FileKey::parse(name).is_ok(), "{name:?} should be accepted");
        }
    }

    #[test]
    fn normalize_strips_path_components() {
        let key = FileKey::normalize("../../etc/passwd").unwrap();

        assert_eq!(key.as_str(), "....etcpasswd");
    }

    #[test]
    fn normalize_rejects_empty_results() {
        assert!(FileKey::normalize("").is_err());
        assert!(FileKey::normalize("..").is_err());
    }

    #[test]
    fn output_names_replace_the_extension() {
        let key = FileKey::parse("video.mp4").unwrap();
        let format = FormatToken::parse("avi").unwrap();

        assert_eq!(key.converted(&format).as_str(), "video.avi");
        assert_eq!(key.trimmed(&format).as_str(), "video_trimmed.avi");
    }

    #[test]
    fn output_names_keep_leading_dots_and_double_extensions() {
        let format = FormatToken::parse("mkv").unwrap();

        let dotfile = FileKey::parse(".env").unwrap();
        assert_eq!(dotfile.converted(&format).as_str(), ".env.mkv");

        let tarball = FileKey::parse("archive.tar.gz").unwrap();
        assert_eq!(tarball.trimmed(&format).as_str(), "archive.tar_trimmed.mkv");
    }

    #[test]
    fn format_tokens_are_alphanumeric() {
        assert!(FormatToken::parse("mp4").is_ok());
        assert!(FormatToken::parse("webm").is_ok());

        assert!(FormatToken::parse("").is_err());
        assert!(FormatToken::parse("m p4").is_err());
        assert!(FormatToken::parse("mp4;rm -rf /").is_err());
        assert!(FormatToken::parse("../mp4").is_err());
    }

    #[test]
    fn save_stream_round_trips() {
        let tmp = "/tmp/vid-rs-save-test";

        let filesystem = Filesystem {
            path: PathBuf::from(tmp),
            incoming: PathBuf::from("incoming"),
            outgoing: PathBuf::from("outgoing"),
        };

        let (written, read_back) = test_async!(async move {
            let store = FileStore::build(&filesystem).await.unwrap();
            let key = FileKey::parse("round-trip.mp4").unwrap();

            let chunks: Vec<std::io::Result<Bytes>> = vec![
                Ok(Bytes::from_static(b"hello ")),
                Ok(Bytes::from_static(b"world")),
            ];

            let written = store
                .save_stream(&key, futures_util::stream::iter(chunks))
                .await
                .unwrap();

            let path = store
                .incoming_file(&key)
                .await
                .unwrap()
                .expect("Saved file exists");

            let mut stream = store.to_stream(&path).await.unwrap();

            let mut read_back = Vec::new();
            while let Some(res) = stream.next().await {
                read_back.extend_from_slice(&res.unwrap());
            }

            (written, read_back)
        });

        std::fs::remove_dir_all(tmp).unwrap();

        assert_eq!(written, 11);
        assert_eq!(read_back, b"hello world");
    }

    #[test]
    fn failed_save_removes_the_partial_file() {
        let tmp = "/tmp/vid-rs-failed-save-test";

        let filesystem = Filesystem {
            path: PathBuf::from(tmp),
            incoming: PathBuf::from("incoming"),
            outgoing: PathBuf::from("outgoing"),
        };

        test_async!(async move {
            let store = FileStore::build(&filesystem).await.unwrap();
            let key = FileKey::parse("interrupted.mp4").unwrap();

            let chunks: Vec<std::io::Result<Bytes>> = vec![
                Ok(Bytes::from_static(b"partial")),
                Err(std::io::Error::other("connection reset")),
            ];

            let res = store
                .save_stream(&key, futures_util::stream::iter(chunks))
                .await;

            assert!(res.is_err());
            assert!(store.incoming_file(&key).await.unwrap().is_none());
        });

        std::fs::remove_dir_all(tmp).unwrap();
    }
}
