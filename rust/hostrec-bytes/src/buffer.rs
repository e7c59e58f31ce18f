use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder};
use hostrec_common::{Result, error::Error};

/// Default initial capacity and growth increment, in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// A growable, position-addressable byte store.
///
/// The buffer maintains a read/write cursor (`position`) and a high-water
/// mark (`size`, the largest byte offset ever written plus one). Writes at
/// any position are allowed and extend `size` when they land past it; any
/// gap between `size` and a write through a moved cursor is zero-filled at
/// write time, so it reads back as zeros even when the buffer is reused
/// after [`reset`].
///
/// Growth reallocates in fixed increments of `grow_by` bytes, repeated until
/// sufficient, and always preserves the first `size` bytes. [`reset`] rewinds
/// `position` and `size` to zero without deallocating.
///
/// A buffer instance is owned by exactly one logical reader or writer at a
/// time; it is not safe to share across threads.
///
/// [`reset`]: ByteBuffer::reset
#[derive(Debug)]
pub struct ByteBuffer {
    /// Backing store; bytes at `size` and above may be stale after `reset`.
    data: Vec<u8>,
    grow_by: usize,
    size: usize,
    position: usize,
}

impl ByteBuffer {
    /// Creates a buffer with the default capacity and growth increment.
    pub fn new() -> ByteBuffer {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a buffer with the specified initial capacity, which also
    /// becomes the growth increment.
    pub fn with_capacity(capacity: usize) -> ByteBuffer {
        Self::with_growth(capacity, capacity)
    }

    /// Creates a buffer with the specified initial capacity and growth
    /// increment.
    pub fn with_growth(capacity: usize, grow_by: usize) -> ByteBuffer {
        ByteBuffer {
            data: vec![0u8; capacity],
            grow_by: grow_by.max(1),
            size: 0,
            position: 0,
        }
    }

    /// Returns the current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor. Positions past `size` are allowed; a subsequent
    /// write zero-fills the gap, a subsequent read fails.
    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Returns the high-water mark: the largest offset ever written plus one.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the allocated capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Rewinds `position` and `size` to zero without deallocating.
    pub fn reset(&mut self) {
        self.position = 0;
        self.size = 0;
    }

    /// Returns the written content: the first `size` bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Makes room for a write ending at `end` and zero-fills the gap when
    /// the cursor has been moved past `size`. The backing store keeps stale
    /// bytes above `size` after `reset`, so the gap must be cleared here
    /// rather than relied on from growth.
    fn ensure(&mut self, end: usize) {
        if end > self.data.len() {
            let mut new_len = self.data.len() + self.grow_by;
            while new_len < end {
                new_len += self.grow_by;
            }
            self.data.resize(new_len, 0);
        }
        if self.position > self.size {
            self.data[self.size..self.position].fill(0);
        }
    }

    #[inline]
    fn advance_write(&mut self, len: usize) {
        self.position += len;
        if self.position > self.size {
            self.size = self.position;
        }
    }

    /// Fails unless `len` bytes are readable at the cursor.
    #[inline]
    fn check_readable(&self, len: usize) -> Result<()> {
        if self.position + len > self.size {
            return Err(Error::eof(
                self.position,
                len,
                self.size.saturating_sub(self.position),
            ));
        }
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) {
        self.ensure(self.position + 1);
        self.data[self.position] = value;
        self.advance_write(1);
    }

    pub fn put_slice(&mut self, src: &[u8]) {
        self.ensure(self.position + src.len());
        self.data[self.position..self.position + src.len()].copy_from_slice(src);
        self.advance_write(src.len());
    }

    pub fn put_i16(&mut self, value: i16) {
        self.ensure(self.position + 2);
        BigEndian::write_i16(&mut self.data[self.position..self.position + 2], value);
        self.advance_write(2);
    }

    pub fn put_i32(&mut self, value: i32) {
        self.ensure(self.position + 4);
        BigEndian::write_i32(&mut self.data[self.position..self.position + 4], value);
        self.advance_write(4);
    }

    pub fn put_i64(&mut self, value: i64) {
        self.ensure(self.position + 8);
        BigEndian::write_i64(&mut self.data[self.position..self.position + 8], value);
        self.advance_write(8);
    }

    pub fn put_f32(&mut self, value: f32) {
        self.ensure(self.position + 4);
        BigEndian::write_f32(&mut self.data[self.position..self.position + 4], value);
        self.advance_write(4);
    }

    pub fn put_f64(&mut self, value: f64) {
        self.ensure(self.position + 8);
        BigEndian::write_f64(&mut self.data[self.position..self.position + 8], value);
        self.advance_write(8);
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        self.check_readable(1)?;
        let value = self.data[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Fills `dst` from the cursor, advancing past the bytes read.
    pub fn get_slice(&mut self, dst: &mut [u8]) -> Result<()> {
        self.check_readable(dst.len())?;
        dst.copy_from_slice(&self.data[self.position..self.position + dst.len()]);
        self.position += dst.len();
        Ok(())
    }

    pub fn get_i16(&mut self) -> Result<i16> {
        self.check_readable(2)?;
        let value = BigEndian::read_i16(&self.data[self.position..self.position + 2]);
        self.position += 2;
        Ok(value)
    }

    pub fn get_i32(&mut self) -> Result<i32> {
        self.check_readable(4)?;
        let value = BigEndian::read_i32(&self.data[self.position..self.position + 4]);
        self.position += 4;
        Ok(value)
    }

    pub fn get_i64(&mut self) -> Result<i64> {
        self.check_readable(8)?;
        let value = BigEndian::read_i64(&self.data[self.position..self.position + 8]);
        self.position += 8;
        Ok(value)
    }

    pub fn get_f32(&mut self) -> Result<f32> {
        self.check_readable(4)?;
        let value = BigEndian::read_f32(&self.data[self.position..self.position + 4]);
        self.position += 4;
        Ok(value)
    }

    pub fn get_f64(&mut self) -> Result<f64> {
        self.check_readable(8)?;
        let value = BigEndian::read_f64(&self.data[self.position..self.position + 8]);
        self.position += 8;
        Ok(value)
    }

    /// Fills the buffer from offset 0 with up to `byte_count` bytes read from
    /// `source`, reading until the count is reached or the source reports a
    /// clean end of data.
    ///
    /// On return `size` equals the number of bytes obtained and `position`
    /// is 0. A count short of `byte_count` means the source ended; an
    /// [`ErrorKind::Io`] error is returned only when the source itself fails.
    ///
    /// [`ErrorKind::Io`]: hostrec_common::error::ErrorKind::Io
    pub fn transfer_from(&mut self, source: &mut impl Read, byte_count: usize) -> Result<usize> {
        self.ensure(byte_count);
        let mut filled = 0;
        while filled < byte_count {
            match source.read(&mut self.data[filled..byte_count]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("transfer_from", e)),
            }
        }
        self.size = filled;
        self.position = 0;
        Ok(filled)
    }

    /// Writes exactly `size` bytes, starting at offset 0, to `sink`. The
    /// cursor is not consulted and not moved.
    pub fn transfer_to(&self, sink: &mut impl Write) -> Result<()> {
        sink.write_all(&self.data[..self.size])
            .map_err(|e| Error::io("transfer_to", e))
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostrec_common::error::ErrorKind;

    #[test]
    fn test_primitive_round_trip() {
        let mut buf = ByteBuffer::new();
        buf.put_u8(0xAB);
        buf.put_i16(-2);
        buf.put_i32(i32::MIN);
        buf.put_i64(i64::MAX);
        buf.put_f32(1.5);
        buf.put_f64(-0.25);
        assert_eq!(buf.size(), 1 + 2 + 4 + 8 + 4 + 8);

        buf.set_position(0);
        assert_eq!(buf.get_u8().unwrap(), 0xAB);
        assert_eq!(buf.get_i16().unwrap(), -2);
        assert_eq!(buf.get_i32().unwrap(), i32::MIN);
        assert_eq!(buf.get_i64().unwrap(), i64::MAX);
        assert_eq!(buf.get_f32().unwrap(), 1.5);
        assert_eq!(buf.get_f64().unwrap(), -0.25);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = ByteBuffer::new();
        buf.put_i32(0x0102_0304);
        assert_eq!(buf.as_slice(), &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_growth_preserves_content() {
        let mut buf = ByteBuffer::with_growth(4, 3);
        buf.put_slice(&[1, 2, 3, 4]);
        assert_eq!(buf.capacity(), 4);
        buf.put_slice(&[5, 6, 7, 8, 9]);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        // 4 + 3 = 7 was not enough for 9, so two increments were needed.
        assert_eq!(buf.capacity(), 10);
    }

    #[test]
    fn test_sparse_write_zero_fills_gap() {
        let mut buf = ByteBuffer::with_capacity(8);
        buf.put_u8(0xFF);
        buf.set_position(5);
        buf.put_u8(0xEE);
        assert_eq!(buf.size(), 6);
        assert_eq!(buf.as_slice(), &[0xFF, 0, 0, 0, 0, 0xEE]);
    }

    #[test]
    fn test_read_past_size_is_eof() {
        let mut buf = ByteBuffer::new();
        buf.put_i16(7);
        buf.set_position(1);
        let err = buf.get_i32().unwrap_err();
        match err.kind() {
            ErrorKind::UnexpectedEof {
                offset,
                needed,
                available,
            } => {
                assert_eq!(*offset, 1);
                assert_eq!(*needed, 4);
                assert_eq!(*available, 1);
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_sparse_write_after_reset_zero_fills() {
        let mut buf = ByteBuffer::with_capacity(8);
        buf.put_slice(&[0xFF; 6]);
        buf.reset();
        buf.set_position(3);
        buf.put_u8(1);
        // The stale bytes from before the reset must not leak into the gap.
        assert_eq!(buf.as_slice(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_sparse_write_after_short_transfer_zero_fills() {
        let mut buf = ByteBuffer::with_capacity(8);
        buf.put_slice(&[0xEE; 8]);
        let mut source: &[u8] = &[7, 7];
        buf.transfer_from(&mut source, 8).unwrap();
        assert_eq!(buf.size(), 2);
        buf.set_position(4);
        buf.put_u8(9);
        assert_eq!(buf.as_slice(), &[7, 7, 0, 0, 9]);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buf = ByteBuffer::with_capacity(16);
        buf.put_i64(42);
        buf.reset();
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_transfer_from_short_read_at_eof() {
        let mut buf = ByteBuffer::with_capacity(4);
        let data = [9u8, 8, 7];
        let mut source: &[u8] = &data;
        let obtained = buf.transfer_from(&mut source, 10).unwrap();
        assert_eq!(obtained, 3);
        assert_eq!(buf.size(), 3);
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.as_slice(), &[9, 8, 7]);
    }

    #[test]
    fn test_transfer_to_ignores_position() {
        let mut buf = ByteBuffer::new();
        buf.put_slice(b"abcdef");
        buf.set_position(3);
        let mut sink = Vec::new();
        buf.transfer_to(&mut sink).unwrap();
        assert_eq!(sink, b"abcdef");
        assert_eq!(buf.position(), 3);
    }
}
