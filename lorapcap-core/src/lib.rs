//! Запись пакетов LoRa-концентратора в pcap
//!
//! Каждая запись снабжается заголовком LoRaTap v1 (link type 270), так что
//! Wireshark и подобные инструменты разбирают метаданные физического уровня
//! LoRa: частоту, SF, RSSI, SNR, статус CRC.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use lorapcap_core::PcapSession;
//! use lorapcap_types::{Bandwidth, CaptureTimestamp, RxPacket, SpreadingFactor};
//!
//! let mut session = PcapSession::create("lora.pcap", 0xAA55_5A00_0000_0101)?;
//! session.start()?;
//!
//! let packet = RxPacket::lora(868_100_000, Bandwidth::Khz125, SpreadingFactor::Sf7, vec![0x40; 20]);
//! session.write(&packet, CaptureTimestamp::now())?;
//!
//! session.stop()?.destroy();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod codecs;
pub mod format;
pub mod loratap;
pub mod record;
pub mod session;

pub use binary::*;
pub use codecs::*;
pub use format::*;
pub use loratap::*;
pub use record::*;
pub use session::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(LINKTYPE_LORATAP, 270);
        assert_eq!(LORATAP_HEADER_SIZE, 35);
        assert_eq!(PCAP_GLOBAL_HEADER_SIZE, 24);
    }
}
