use thiserror::Error;

use crate::invariants::InvariantError;
use crate::ocr::OcrError;
use crate::png::CodecError;
use crate::record::InvalidRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    NotAPng,
    TruncatedOrMissingTerminal,
    PayloadCorrupt,
    CardNotFound,
    InvalidRecord,
    UnsupportedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CodecError> for CoreError {
    fn from(err: CodecError) -> Self {
        let code = match err {
            CodecError::NotAPng => CoreErrorCode::NotAPng,
            CodecError::TruncatedOrMissingTerminal { .. } => {
                CoreErrorCode::TruncatedOrMissingTerminal
            }
            CodecError::PayloadCorrupt(_) => CoreErrorCode::PayloadCorrupt,
            CodecError::PayloadTooLarge { .. } => CoreErrorCode::UnsupportedOperation,
        };
        Self::new(code, err.to_string())
    }
}

impl From<InvalidRecord> for CoreError {
    fn from(err: InvalidRecord) -> Self {
        Self::new(CoreErrorCode::InvalidRecord, err.to_string())
    }
}

impl From<InvariantError> for CoreError {
    fn from(err: InvariantError) -> Self {
        Self::new(CoreErrorCode::UnsupportedOperation, err.to_string())
    }
}

impl From<OcrError> for CoreError {
    fn from(err: OcrError) -> Self {
        Self::new(CoreErrorCode::Parse, err.to_string())
    }
}
