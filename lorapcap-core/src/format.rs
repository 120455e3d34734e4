//! Формат файла pcap с наносекундными метками времени и link type LoRaTap.
//!
//! Глобальный заголовок и заголовки записей пишутся в порядке байт хоста:
//! читатель определяет порядок по магическому числу. Заголовок LoRaTap
//! внутри записи всегда big-endian (см. [`crate::loratap`]).

use std::io::{self, Write};

use byteorder::{NativeEndian, WriteBytesExt};

/// Магическое число варианта pcap с наносекундным разрешением
pub const PCAP_MAGIC_NS: u32 = 0xa1b2_3c4d;

pub const PCAP_VERSION_MAJOR: u16 = 2;
pub const PCAP_VERSION_MINOR: u16 = 4;

/// Максимальная длина захвата, объявляемая в заголовке файла
pub const PCAP_SNAPLEN: u32 = 65_536;

/// LINKTYPE_LORATAP
pub const LINKTYPE_LORATAP: u32 = 270;

/// Размер глобального заголовка pcap (24 байта)
pub const PCAP_GLOBAL_HEADER_SIZE: usize = 24;

/// Размер заголовка записи pcap (16 байт)
pub const PCAP_RECORD_HEADER_SIZE: usize = 16;

/// Глобальный заголовок pcap-файла.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapGlobalHeader {
    pub magic_number: u32,
    pub version_major: u16,
    pub version_minor: u16,
    /// Смещение часового пояса (всегда 0, UTC)
    pub this_zone: i32,
    pub sigfigs: u32,
    pub snaplen: u32,
    pub network: u32,
}

/// Заголовок одной записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapRecordHeader {
    pub ts_sec: u32,
    pub ts_nsec: u32,
    /// Сколько байт записи сохранено в файле
    pub incl_len: u32,
    /// Исходная длина кадра
    pub orig_len: u32,
}

impl PcapGlobalHeader {
    /// Заголовок для LoRaTap с заданным snaplen.
    pub fn loratap(snaplen: u32) -> Self {
        PcapGlobalHeader {
            magic_number: PCAP_MAGIC_NS,
            version_major: PCAP_VERSION_MAJOR,
            version_minor: PCAP_VERSION_MINOR,
            this_zone: 0,
            sigfigs: 0,
            snaplen,
            network: LINKTYPE_LORATAP,
        }
    }

    pub fn write_to<W: Write>(
        &self,
        w: &mut W,
    ) -> io::Result<()> {
        w.write_u32::<NativeEndian>(self.magic_number)?;
        w.write_u16::<NativeEndian>(self.version_major)?;
        w.write_u16::<NativeEndian>(self.version_minor)?;
        w.write_i32::<NativeEndian>(self.this_zone)?;
        w.write_u32::<NativeEndian>(self.sigfigs)?;
        w.write_u32::<NativeEndian>(self.snaplen)?;
        w.write_u32::<NativeEndian>(self.network)?;
        Ok(())
    }
}

impl Default for PcapGlobalHeader {
    fn default() -> Self {
        Self::loratap(PCAP_SNAPLEN)
    }
}

impl PcapRecordHeader {
    /// Заголовок записи без усечения: `incl_len == orig_len`.
    pub fn new(
        ts_sec: u32,
        ts_nsec: u32,
        len: u32,
    ) -> Self {
        PcapRecordHeader {
            ts_sec,
            ts_nsec,
            incl_len: len,
            orig_len: len,
        }
    }

    pub fn write_to<W: Write>(
        &self,
        w: &mut W,
    ) -> io::Result<()> {
        w.write_u32::<NativeEndian>(self.ts_sec)?;
        w.write_u32::<NativeEndian>(self.ts_nsec)?;
        w.write_u32::<NativeEndian>(self.incl_len)?;
        w.write_u32::<NativeEndian>(self.orig_len)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ne_u32(b: &[u8]) -> u32 {
        u32::from_ne_bytes([b[0], b[1], b[2], b[3]])
    }

    #[test]
    fn test_global_header_layout() {
        let mut buf = Vec::new();
        PcapGlobalHeader::default().write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), PCAP_GLOBAL_HEADER_SIZE);
        assert_eq!(ne_u32(&buf[0..4]), 0xa1b2_3c4d, "magic");
        assert_eq!(u16::from_ne_bytes([buf[4], buf[5]]), 2, "version major");
        assert_eq!(u16::from_ne_bytes([buf[6], buf[7]]), 4, "version minor");
        assert_eq!(ne_u32(&buf[8..12]), 0, "this_zone");
        assert_eq!(ne_u32(&buf[12..16]), 0, "sigfigs");
        assert_eq!(ne_u32(&buf[16..20]), 65_536, "snaplen");
        assert_eq!(ne_u32(&buf[20..24]), 270, "network");
    }

    #[test]
    fn test_magic_in_host_byte_order() {
        let mut buf = Vec::new();
        PcapGlobalHeader::default().write_to(&mut buf).unwrap();

        if cfg!(target_endian = "little") {
            assert_eq!(&buf[0..4], &[0x4d, 0x3c, 0xb2, 0xa1]);
        } else {
            assert_eq!(&buf[0..4], &[0xa1, 0xb2, 0x3c, 0x4d]);
        }
    }

    #[test]
    fn test_record_header_layout() {
        let mut buf = Vec::new();
        PcapRecordHeader::new(1_704_067_200, 500, 55)
            .write_to(&mut buf)
            .unwrap();

        assert_eq!(buf.len(), PCAP_RECORD_HEADER_SIZE);
        assert_eq!(ne_u32(&buf[0..4]), 1_704_067_200);
        assert_eq!(ne_u32(&buf[4..8]), 500);
        assert_eq!(ne_u32(&buf[8..12]), 55);
        assert_eq!(ne_u32(&buf[12..16]), 55);
    }
}
