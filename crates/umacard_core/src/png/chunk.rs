use flate2::Crc;

use crate::layout::ByteRange;

use super::CodecError;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
pub const IEND: [u8; 4] = *b"IEND";
pub const TEXT: [u8; 4] = *b"tEXt";

/// Length, type and CRC fields around the data.
pub const CHUNK_OVERHEAD: usize = 12;

/// PNG caps chunk lengths at 2^31 - 1.
pub const MAX_CHUNK_LEN: usize = i32::MAX as usize;

/// One chunk borrowed from a scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub kind: [u8; 4],
    pub data: &'a [u8],
    pub stored_crc: u32,
    /// Whole chunk including the length prefix and CRC trailer.
    pub range: ByteRange,
}

impl Chunk<'_> {
    pub fn is_terminal(&self) -> bool {
        self.kind == IEND
    }

    pub fn computed_crc(&self) -> u32 {
        chunk_crc(self.kind, self.data)
    }

    pub fn crc_ok(&self) -> bool {
        self.computed_crc() == self.stored_crc
    }

    pub fn kind_str(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }

    /// Splits `tEXt` data at the first NUL into keyword and text.
    /// Without a separator the whole payload is the keyword and the text is empty.
    pub fn text_parts(&self) -> (&[u8], &[u8]) {
        match self.data.iter().position(|&b| b == 0) {
            Some(nul) => (&self.data[..nul], &self.data[nul + 1..]),
            None => (self.data, &[]),
        }
    }
}

/// CRC-32 over the chunk type and data, as stored in the chunk trailer.
pub fn chunk_crc(kind: [u8; 4], data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(&kind);
    crc.update(data);
    crc.sum()
}

/// Length field for `data_len` bytes of chunk data.
pub fn chunk_length(data_len: usize) -> Result<u32, CodecError> {
    if data_len > MAX_CHUNK_LEN {
        return Err(CodecError::PayloadTooLarge { len: data_len });
    }
    u32::try_from(data_len).map_err(|_| CodecError::PayloadTooLarge { len: data_len })
}

pub fn encode_chunk(kind: [u8; 4], data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let len = chunk_length(data.len())?;
    let mut out = Vec::with_capacity(CHUNK_OVERHEAD + data.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&chunk_crc(kind, data).to_be_bytes());
    Ok(out)
}

pub fn encode_text_chunk(keyword: &str, text: &str) -> Result<Vec<u8>, CodecError> {
    let mut data = Vec::with_capacity(keyword.len() + 1 + text.len());
    data.extend_from_slice(keyword.as_bytes());
    data.push(0);
    data.extend_from_slice(text.as_bytes());
    encode_chunk(TEXT, &data)
}
