use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use color_eyre::Report;

use crate::error_code::ErrorCode;

pub(crate) struct Error {
    inner: color_eyre::Report,
}

impl Error {
    fn kind(&self) -> Option<&UploadError> {
        self.inner.downcast_ref()
    }

    pub(crate) fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        self.inner.root_cause()
    }

    pub(crate) fn error_code(&self) -> ErrorCode {
        self.kind()
            .map(|e| e.error_code())
            .unwrap_or(ErrorCode::UNKNOWN_ERROR)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl<T> From<T> for Error
where
    UploadError: From<T>,
{
    fn from(error: T) -> Self {
        Error {
            inner: Report::from(UploadError::from(error)),
        }
    }
}

// Variants whose text doubles as the response body hold their underlying
// error without a #[source] attribute, keeping root_cause from descending
// into command diagnostics.
#[derive(Debug, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("Couldn't upload file")]
    Upload(#[from] actix_form_data::Error),

    #[error("Error interacting with filesystem")]
    Io(#[from] std::io::Error),

    #[error("Error in file store")]
    Store(#[from] crate::store::FileError),

    #[error("No video file uploaded")]
    NoFiles,

    #[error("Missing filename or format")]
    MissingConvertFields,

    #[error("Missing required fields")]
    MissingTrimFields,

    #[error("Invalid filename")]
    InvalidFilename(crate::store::FileKeyError),

    #[error("Invalid format")]
    InvalidFormat(crate::store::FormatError),

    #[error("File not found")]
    MissingFile,

    #[error("File not found")]
    MissingDownload,

    #[error("Input file not found")]
    MissingTrimInput,

    #[error("That file is currently being processed")]
    AlreadyClaimed,

    #[error("Conversion failed")]
    Convert(crate::ffmpeg::FfMpegError),

    #[error("Video trimming failed")]
    Trim(crate::ffmpeg::FfMpegError),

    #[error("Failed to fetch metadata")]
    Probe(crate::ffmpeg::FfMpegError),

    #[error("Download failed")]
    Download(crate::store::FileError),

    #[error("Response timeout")]
    Timeout(#[from] crate::stream::TimeoutError),
}

impl UploadError {
    const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Upload(_) => ErrorCode::FILE_UPLOAD_ERROR,
            Self::Io(_) => ErrorCode::IO_ERROR,
            Self::Store(e) => e.error_code(),
            Self::NoFiles => ErrorCode::VALIDATE_NO_FILES,
            Self::MissingConvertFields | Self::MissingTrimFields => ErrorCode::MISSING_FIELDS,
            Self::InvalidFilename(_) => ErrorCode::INVALID_FILENAME,
            Self::InvalidFormat(_) => ErrorCode::INVALID_FORMAT,
            Self::MissingFile | Self::MissingDownload | Self::MissingTrimInput => {
                ErrorCode::NOT_FOUND
            }
            Self::AlreadyClaimed => ErrorCode::ALREADY_CLAIMED,
            Self::Convert(e) | Self::Trim(e) | Self::Probe(e) => e.error_code(),
            Self::Download(e) => e.error_code(),
            Self::Timeout(_) => ErrorCode::STREAM_TOO_SLOW,
        }
    }
}

impl From<crate::store::FileKeyError> for UploadError {
    fn from(value: crate::store::FileKeyError) -> Self {
        Self::InvalidFilename(value)
    }
}

impl From<crate::store::FormatError> for UploadError {
    fn from(value: crate::store::FormatError) -> Self {
        Self::InvalidFormat(value)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            Some(
                UploadError::Upload(_)
                | UploadError::NoFiles
                | UploadError::MissingConvertFields
                | UploadError::MissingTrimFields
                | UploadError::InvalidFilename(_)
                | UploadError::InvalidFormat(_)
                | UploadError::MissingDownload
                | UploadError::MissingTrimInput,
            ) => StatusCode::BAD_REQUEST,
            Some(UploadError::MissingFile) => StatusCode::NOT_FOUND,
            Some(UploadError::AlreadyClaimed) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("application/json")
            .body(
                serde_json::to_string(&serde_json::json!({
                    "msg": self.root_cause().to_string(),
                    "code": self.error_code()
                }))
                .unwrap_or_else(|_| {
                    r#"{"msg":"Request failed","code":"unknown-error"}"#.to_string()
                }),
            )
    }
}
