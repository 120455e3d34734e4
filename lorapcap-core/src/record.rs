use std::io::Write;

use log::trace;
use lorapcap_types::{CaptureTimestamp, PcapError, PcapResult, RxPacket, MAX_PAYLOAD_SIZE};

use crate::{
    format::{PcapRecordHeader, PCAP_RECORD_HEADER_SIZE},
    loratap::{LoraTapHeader, LORATAP_HEADER_SIZE},
};

/// Записывает одну запись pcap: заголовок записи, LoRaTap, нагрузку.
///
/// Возвращает число записанных байт. Пакеты с модуляцией, отличной от LoRa,
/// пропускаются: результат `Ok(0)`, в поток ничего не пишется.
///
/// При ошибке ввода/вывода в потоке может остаться частичная запись.
pub fn write_rx_packet<W: Write>(
    w: &mut W,
    gw_eui: &[u8; 8],
    packet: &RxPacket,
    ts: CaptureTimestamp,
) -> PcapResult<usize> {
    if !packet.modulation.is_lora() {
        trace!(
            "Skipping {:?} packet on {} Hz",
            packet.modulation,
            packet.freq_hz
        );
        return Ok(0);
    }

    if packet.size() > MAX_PAYLOAD_SIZE {
        return Err(PcapError::PayloadTooLarge(packet.size()));
    }

    let tap = LoraTapHeader::from_packet(packet, gw_eui).serialize()?;

    // нагрузка не больше 256 байт, усечения по snaplen не бывает
    let captured_len = LORATAP_HEADER_SIZE + packet.size();
    let header = PcapRecordHeader::new(ts.secs, ts.nanos, captured_len as u32);

    header.write_to(w)?;
    w.write_all(&tap)?;
    w.write_all(&packet.payload)?;

    Ok(PCAP_RECORD_HEADER_SIZE + captured_len)
}
