//! Заголовок LoRaTap v1 (35 байт, big-endian).
//!
//! Поля шириной 16/32 бита лежат по невыровненным смещениям, поэтому
//! заголовок никогда не копируется из памяти структурой: он собирается
//! по явному упорядоченному списку полей через [`ByteCursor`].

use lorapcap_types::{PcapResult, RxPacket};

use crate::{
    binary::ByteCursor,
    codecs::{
        bandwidth_code, coding_rate_code, crc_flags, encode_rssi_dbm, encode_snr_db,
        spreading_factor_code,
    },
};

/// Размер заголовка LoRaTap v1
pub const LORATAP_HEADER_SIZE: usize = 35;

pub const LORATAP_VERSION: u8 = 1;

/// Sync word публичной сети LoRaWAN
pub const LORAWAN_SYNC_WORD: u8 = 0x34;

/// Одно поле заголовка вместе с его шириной на проводе.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapField {
    U8(u8),
    I8(i8),
    U16(u16),
    U32(u32),
    Eui([u8; 8]),
}

/// Содержимое заголовка LoRaTap v1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoraTapHeader {
    pub channel_frequency_hz: u32,
    pub channel_bandwidth: u8,
    pub channel_spreading_factor: u8,
    pub rssi_packet: i8,
    pub rssi_max: i8,
    pub rssi_current: i8,
    pub rssi_snr: i8,
    pub sync_word: u8,
    pub gw_eui: [u8; 8],
    pub timestamp_1mhz: u32,
    pub flags: u8,
    pub coding_rate: u8,
    pub data_rate: u16,
    pub if_channel: u8,
    pub rf_chain: u8,
    pub tag: u16,
}

impl TapField {
    /// Ширина поля в байтах.
    pub fn width(&self) -> usize {
        match self {
            TapField::U8(_) | TapField::I8(_) => 1,
            TapField::U16(_) => 2,
            TapField::U32(_) => 4,
            TapField::Eui(_) => 8,
        }
    }

    fn pack(
        &self,
        cur: &mut ByteCursor<'_>,
    ) -> PcapResult<()> {
        match *self {
            TapField::U8(v) => cur.pack_u8(v),
            TapField::I8(v) => cur.pack_i8(v),
            TapField::U16(v) => cur.pack_be_u16(v),
            TapField::U32(v) => cur.pack_be_u32(v),
            TapField::Eui(ref eui) => cur.put(eui),
        }
    }
}

impl LoraTapHeader {
    /// Заполняет заголовок из метаданных пакета.
    ///
    /// SX1302 отдаёт только два значения RSSI, поэтому `rssi_max` и
    /// `rssi_current` оба берутся из RSSI канала.
    pub fn from_packet(
        p: &RxPacket,
        gw_eui: &[u8; 8],
    ) -> Self {
        let rssic = encode_rssi_dbm(p.rssic);

        LoraTapHeader {
            channel_frequency_hz: p.freq_hz,
            channel_bandwidth: bandwidth_code(p.bandwidth),
            channel_spreading_factor: spreading_factor_code(p.datarate),
            rssi_packet: encode_rssi_dbm(p.rssis),
            rssi_max: rssic,
            rssi_current: rssic,
            rssi_snr: encode_snr_db(p.snr),
            sync_word: LORAWAN_SYNC_WORD,
            gw_eui: *gw_eui,
            timestamp_1mhz: p.count_us,
            flags: crc_flags(p.status),
            coding_rate: coding_rate_code(p.coderate),
            // избыточно, выводится из SF и полосы
            data_rate: 0,
            if_channel: p.if_chain,
            rf_chain: p.rf_chain,
            tag: 0,
        }
    }

    /// Поля в порядке следования на проводе.
    pub fn fields(&self) -> [TapField; 19] {
        [
            TapField::U8(LORATAP_VERSION),
            TapField::U8(0), // padding
            TapField::U16(LORATAP_HEADER_SIZE as u16),
            TapField::U32(self.channel_frequency_hz),
            TapField::U8(self.channel_bandwidth),
            TapField::U8(self.channel_spreading_factor),
            TapField::I8(self.rssi_packet),
            TapField::I8(self.rssi_max),
            TapField::I8(self.rssi_current),
            TapField::I8(self.rssi_snr),
            TapField::U8(self.sync_word),
            TapField::Eui(self.gw_eui),
            TapField::U32(self.timestamp_1mhz),
            TapField::U8(self.flags),
            TapField::U8(self.coding_rate),
            TapField::U16(self.data_rate),
            TapField::U8(self.if_channel),
            TapField::U8(self.rf_chain),
            TapField::U16(self.tag),
        ]
    }

    /// Сериализация заголовка в 35 байт.
    ///
    /// # Panics
    /// Если список полей не заполняет буфер ровно целиком: раскладка
    /// фиксирована, расхождение означает ошибку в [`Self::fields`].
    pub fn serialize(&self) -> PcapResult<[u8; LORATAP_HEADER_SIZE]> {
        let mut buf = [0u8; LORATAP_HEADER_SIZE];
        let mut cur = ByteCursor::new(&mut buf);

        for field in self.fields() {
            field.pack(&mut cur)?;
        }

        assert_eq!(cur.remaining(), 0, "LoRaTap header layout mismatch");

        Ok(buf)
    }
}
