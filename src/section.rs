use std::io::{self, Read, Seek, SeekFrom};

/// A seekable view over `len` bytes of `inner` starting at `start`.
///
/// Positions are relative to the view. Reads stop at the end of the view,
/// seeking past it is an `UnexpectedEof` error.
#[derive(Debug)]
pub struct SectionReader<'a, R: Read + Seek> {
    inner: &'a mut R,
    start: u64,
    len: u64,
    pos: u64,
}

impl<'a, R: Read + Seek> SectionReader<'a, R> {
    pub fn new(inner: &'a mut R, start: u64, len: u64) -> Self {
        SectionReader {
            inner,
            start,
            len,
            pos: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u16le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

impl<R: Read + Seek> Read for SectionReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.len {
            return Ok(0);
        }
        let remaining = (self.len - self.pos) as usize;
        let to_read = buf.len().min(remaining);
        self.inner.seek(SeekFrom::Start(self.start + self.pos))?;
        let n = self.inner.read(&mut buf[..to_read])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for SectionReader<'_, R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let next = match pos {
            SeekFrom::Start(off) => off as i128,
            SeekFrom::End(delta) => self.len as i128 + delta as i128,
            SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
        };
        if next < 0 || next > self.len as i128 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("seek to {} outside section of {} bytes", next, self.len),
            ));
        }
        self.pos = next as u64;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_log::test;

    #[test]
    fn reads_stop_at_section_end() {
        let mut src = Cursor::new(vec![0u8, 1, 2, 3, 4, 5, 6, 7]);
        let mut section = SectionReader::new(&mut src, 2, 3);
        let mut out = Vec::new();
        section.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![2, 3, 4]);
    }

    #[test]
    fn positions_are_relative() {
        let mut src = Cursor::new(vec![0u8, 0, 0, 0x34, 0x12, 0xff]);
        let mut section = SectionReader::new(&mut src, 3, 3);
        section.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(section.read_u16le().unwrap(), 0x1234);
        assert_eq!(section.position(), 2);
        assert_eq!(section.read_u8().unwrap(), 0xff);
    }

    #[test]
    fn short_read_is_unexpected_eof() {
        let mut src = Cursor::new(vec![0u8, 1, 2]);
        let mut section = SectionReader::new(&mut src, 2, 1);
        let err = section.read_u16le().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn seek_past_end_fails() {
        let mut src = Cursor::new(vec![0u8; 4]);
        let mut section = SectionReader::new(&mut src, 0, 4);
        assert!(section.seek(SeekFrom::Start(4)).is_ok());
        let err = section.seek(SeekFrom::Start(5)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(section.seek(SeekFrom::Current(-5)).is_err());
    }
}
