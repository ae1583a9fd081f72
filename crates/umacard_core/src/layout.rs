use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Signature,
    Chunk([u8; 4]),
    Trailing,
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => f.write_str("signature"),
            Self::Chunk(kind) => f.write_str(&String::from_utf8_lossy(kind)),
            Self::Trailing => f.write_str("trailing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("file layout must contain at least one section")]
    Empty,
    #[error("layout does not start at byte 0")]
    NotAtZero,
    #[error("layout gap/overlap around section {id}: expected start {expected}, got {actual}")]
    Gap {
        id: SectionId,
        expected: usize,
        actual: usize,
    },
    #[error("invalid section range {id}: {start}..{end}")]
    Inverted { id: SectionId, start: usize, end: usize },
    #[error("layout does not cover file: ended at {ended}, file length {file_len}")]
    Uncovered { ended: usize, file_len: usize },
}

/// Byte map of a PNG file: the signature, every chunk up to and including `IEND`,
/// and whatever trails the terminal chunk.
#[derive(Debug, Clone)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let Some(first) = self.sections.first() else {
            return Err(LayoutError::Empty);
        };

        if first.range.start != 0 {
            return Err(LayoutError::NotAtZero);
        }

        let mut expected = 0usize;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(LayoutError::Gap {
                    id: section.id,
                    expected,
                    actual: section.range.start,
                });
            }
            if section.range.end < section.range.start {
                return Err(LayoutError::Inverted {
                    id: section.id,
                    start: section.range.start,
                    end: section.range.end,
                });
            }
            expected = section.range.end;
        }

        if expected != self.file_len {
            return Err(LayoutError::Uncovered {
                ended: expected,
                file_len: self.file_len,
            });
        }

        Ok(())
    }

    /// Bytes after `IEND`, if any.
    pub fn trailing(&self) -> Option<&SectionLayout> {
        self.sections
            .iter()
            .rev()
            .find(|s| s.id == SectionId::Trailing)
    }
}
