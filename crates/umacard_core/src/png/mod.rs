//! Minimal PNG container handling: walk the chunk list, and insert or find the
//! `tEXt` chunk that carries a card payload. Pixel data is never decoded.

mod chunk;

use std::io::{self, Cursor};

use log::{debug, warn};
use thiserror::Error;

use crate::layout::{ByteRange, FileLayout, SectionId, SectionLayout};
use crate::reader::BigEndianReader;

pub use chunk::{
    CHUNK_OVERHEAD, Chunk, IEND, MAX_CHUNK_LEN, PNG_SIGNATURE, TEXT, chunk_crc, chunk_length,
    encode_chunk, encode_text_chunk,
};

/// Keyword of the `tEXt` chunk holding card data.
pub const CARD_KEYWORD: &str = "UmaCard";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("not a PNG file (bad signature)")]
    NotAPng,
    #[error("PNG is truncated or has no IEND chunk (scan stopped at byte {offset})")]
    TruncatedOrMissingTerminal { offset: usize },
    #[error("embedded card data is corrupt: {0}")]
    PayloadCorrupt(String),
    #[error("payload of {len} bytes does not fit in a PNG chunk")]
    PayloadTooLarge { len: usize },
}

pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

fn check_signature(bytes: &[u8]) -> Result<(), CodecError> {
    if has_signature(bytes) {
        Ok(())
    } else {
        Err(CodecError::NotAPng)
    }
}

/// Walks chunks in file order starting after the signature. Yields the terminal
/// chunk and then stops; running off the buffer first yields
/// `TruncatedOrMissingTerminal` once.
pub struct Chunks<'a> {
    bytes: &'a [u8],
    reader: BigEndianReader<Cursor<&'a [u8]>>,
    done: bool,
}

impl<'a> Chunks<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, CodecError> {
        check_signature(bytes)?;
        let mut reader = BigEndianReader::new(Cursor::new(bytes));
        reader
            .seek_to(PNG_SIGNATURE.len() as u64)
            .map_err(|_| CodecError::TruncatedOrMissingTerminal {
                offset: PNG_SIGNATURE.len(),
            })?;
        Ok(Self {
            bytes,
            reader,
            done: false,
        })
    }

    fn read_chunk(&mut self, start: usize) -> io::Result<Chunk<'a>> {
        let len = self.reader.read_u32()? as usize;
        let kind = self.reader.read_tag()?;
        let data_start = start + 8;
        self.reader.skip(len as u64)?;
        let stored_crc = self.reader.read_u32()?;
        let end = self.reader.position()? as usize;
        Ok(Chunk {
            kind,
            data: &self.bytes[data_start..data_start + len],
            stored_crc,
            range: ByteRange { start, end },
        })
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<Chunk<'a>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = match self.reader.position() {
            Ok(pos) => pos as usize,
            Err(_) => {
                self.done = true;
                return Some(Err(CodecError::TruncatedOrMissingTerminal {
                    offset: self.bytes.len(),
                }));
            }
        };

        match self.read_chunk(start) {
            Ok(chunk) => {
                if chunk.is_terminal() {
                    self.done = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                debug!("chunk scan stopped at byte {start}: {e}");
                self.done = true;
                Some(Err(CodecError::TruncatedOrMissingTerminal { offset: start }))
            }
        }
    }
}

/// Insert a `tEXt` chunk keyed with [`CARD_KEYWORD`] immediately before `IEND`.
///
/// Every input byte is preserved: the result is the input with the new chunk spliced in.
pub fn embed_text(bytes: &[u8], payload: &str) -> Result<Vec<u8>, CodecError> {
    let mut iend_start = None;
    for chunk in Chunks::new(bytes)? {
        let chunk = chunk?;
        if chunk.is_terminal() {
            iend_start = Some(chunk.range.start);
        }
    }
    let Some(iend_start) = iend_start else {
        return Err(CodecError::TruncatedOrMissingTerminal {
            offset: bytes.len(),
        });
    };

    let text_chunk = encode_text_chunk(CARD_KEYWORD, payload)?;
    debug!(
        "embedding {} byte {} chunk before IEND at byte {iend_start}",
        text_chunk.len(),
        CARD_KEYWORD
    );

    let mut out = Vec::with_capacity(bytes.len() + text_chunk.len());
    out.extend_from_slice(&bytes[..iend_start]);
    out.extend_from_slice(&text_chunk);
    out.extend_from_slice(&bytes[iend_start..]);
    Ok(out)
}

/// Find the first card `tEXt` chunk in file order and return its text.
///
/// `Ok(None)` means the image is well formed but carries no card data. A stale
/// checksum on the card chunk is logged and the text is still returned.
pub fn extract_text(bytes: &[u8]) -> Result<Option<String>, CodecError> {
    for chunk in Chunks::new(bytes)? {
        let chunk = chunk?;
        if chunk.kind == TEXT {
            let (keyword, text) = chunk.text_parts();
            if keyword == CARD_KEYWORD.as_bytes() {
                if !chunk.crc_ok() {
                    warn!(
                        "{} chunk at byte {} has checksum {:#010x}, expected {:#010x}",
                        CARD_KEYWORD,
                        chunk.range.start,
                        chunk.stored_crc,
                        chunk.computed_crc()
                    );
                }
                debug!(
                    "found {} chunk at byte {} ({} bytes of text)",
                    CARD_KEYWORD,
                    chunk.range.start,
                    text.len()
                );
                return Ok(Some(String::from_utf8_lossy(text).into_owned()));
            }
        }
        if chunk.is_terminal() {
            return Ok(None);
        }
    }
    Ok(None)
}

/// Map every byte of the file to the signature, a chunk, or trailing data.
pub fn scan_layout(bytes: &[u8]) -> Result<FileLayout, CodecError> {
    let mut sections = vec![SectionLayout {
        id: SectionId::Signature,
        range: ByteRange {
            start: 0,
            end: PNG_SIGNATURE.len(),
        },
    }];
    let mut end = PNG_SIGNATURE.len();
    for chunk in Chunks::new(bytes)? {
        let chunk = chunk?;
        sections.push(SectionLayout {
            id: SectionId::Chunk(chunk.kind),
            range: chunk.range,
        });
        end = chunk.range.end;
    }
    if end < bytes.len() {
        sections.push(SectionLayout {
            id: SectionId::Trailing,
            range: ByteRange {
                start: end,
                end: bytes.len(),
            },
        });
    }

    Ok(FileLayout {
        file_len: bytes.len(),
        sections,
    })
}
