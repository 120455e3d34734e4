use byteorder::{BigEndian, ByteOrder};
use lorapcap_types::{PcapError, PcapResult};

/// Последовательный писатель big-endian значений в буфер фиксированного
/// размера.
pub struct ByteCursor<'a> {
    buf: &'a mut [u8],
    off: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, off: 0 }
    }

    /// Сколько байт ещё можно записать.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.off
    }

    /// Сколько байт уже записано.
    pub fn position(&self) -> usize {
        self.off
    }

    pub fn pack_u8(
        &mut self,
        val: u8,
    ) -> PcapResult<()> {
        self.reserve(1)?[0] = val;
        Ok(())
    }

    pub fn pack_i8(
        &mut self,
        val: i8,
    ) -> PcapResult<()> {
        self.pack_u8(val as u8)
    }

    pub fn pack_be_u16(
        &mut self,
        val: u16,
    ) -> PcapResult<()> {
        BigEndian::write_u16(self.reserve(2)?, val);
        Ok(())
    }

    pub fn pack_be_i16(
        &mut self,
        val: i16,
    ) -> PcapResult<()> {
        BigEndian::write_i16(self.reserve(2)?, val);
        Ok(())
    }

    pub fn pack_be_u32(
        &mut self,
        val: u32,
    ) -> PcapResult<()> {
        BigEndian::write_u32(self.reserve(4)?, val);
        Ok(())
    }

    pub fn pack_be_i32(
        &mut self,
        val: i32,
    ) -> PcapResult<()> {
        BigEndian::write_i32(self.reserve(4)?, val);
        Ok(())
    }

    /// Копирует байты как есть.
    pub fn put(
        &mut self,
        bytes: &[u8],
    ) -> PcapResult<()> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    fn reserve(
        &mut self,
        n: usize,
    ) -> PcapResult<&mut [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(PcapError::overflow(n, remaining));
        }

        let start = self.off;
        self.off += n;

        Ok(&mut self.buf[start..start + n])
    }
}
