use std::io::{self, Read, Seek, SeekFrom};

/// Big-endian field reader over any seekable byte source.
pub struct BigEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> BigEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_tag(&mut self) -> io::Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Skip `n` bytes, failing with `UnexpectedEof` when that would move past the end.
    pub fn skip(&mut self, n: u64) -> io::Result<()> {
        let pos = self.position()?;
        let len = self.stream_len()?;
        let target = pos
            .checked_add(n)
            .filter(|&t| t <= len)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("cannot skip {n} bytes at offset {pos} of {len}"),
                )
            })?;
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(())
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn stream_len(&mut self) -> io::Result<u64> {
        let cur = self.position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(cur))?;
        Ok(end)
    }
}
