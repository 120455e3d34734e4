use std::fs;

use lorapcap_core::{
    PcapSession, LINKTYPE_LORATAP, LORATAP_HEADER_SIZE, PCAP_GLOBAL_HEADER_SIZE,
    PCAP_MAGIC_NS, PCAP_RECORD_HEADER_SIZE,
};
use lorapcap_types::{
    Bandwidth, CaptureTimestamp, CodingRate, CrcStatus, Modulation, RxPacket, SpreadingFactor,
};
use tempfile::tempdir;

// ===========================================================================
// Helpers
// ===========================================================================

const GW_EUI: u64 = 0xAA55_5A00_0000_0101;

fn ne_u32(b: &[u8]) -> u32 {
    u32::from_ne_bytes([b[0], b[1], b[2], b[3]])
}

/// Пакет из контрольного сценария: 868.1 MHz, BW125, SF7, 20 байт.
fn reference_packet() -> RxPacket {
    RxPacket {
        freq_hz: 868_100_000,
        if_chain: 0,
        status: CrcStatus::CrcOk,
        count_us: 12_345_678,
        rf_chain: 0,
        modulation: Modulation::Lora,
        bandwidth: Bandwidth::Khz125,
        datarate: SpreadingFactor::Sf7,
        coderate: CodingRate::Cr4_5,
        rssic: -42.0,
        rssis: -40.0,
        snr: 9.5,
        payload: (0..20u8).collect(),
    }
}

/// Разбирает записи файла: (смещение LoRaTap, incl_len, orig_len).
fn records(bytes: &[u8]) -> Vec<(usize, u32, u32)> {
    let mut out = Vec::new();
    let mut off = PCAP_GLOBAL_HEADER_SIZE;

    while off + PCAP_RECORD_HEADER_SIZE <= bytes.len() {
        let incl = ne_u32(&bytes[off + 8..]);
        let orig = ne_u32(&bytes[off + 12..]);
        out.push((off + PCAP_RECORD_HEADER_SIZE, incl, orig));
        off += PCAP_RECORD_HEADER_SIZE + incl as usize;
    }

    assert_eq!(off, bytes.len(), "файл должен заканчиваться на границе записи");
    out
}

// ===========================================================================
// Контрольный сценарий
// ===========================================================================

#[test]
fn test_reference_scenario_file_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lora.pcap");

    let mut session = PcapSession::create(&path, GW_EUI).unwrap();
    session.start().unwrap();
    session
        .write(&reference_packet(), CaptureTimestamp::new(1_704_067_200, 250))
        .unwrap();
    session.flush().unwrap();
    session.stop().unwrap().destroy();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 95, "24 + 16 + 35 + 20");

    // глобальный заголовок
    assert_eq!(ne_u32(&bytes[0..4]), PCAP_MAGIC_NS);
    assert_eq!(ne_u32(&bytes[20..24]), LINKTYPE_LORATAP);

    // заголовок записи
    assert_eq!(ne_u32(&bytes[24..28]), 1_704_067_200, "ts_sec");
    assert_eq!(ne_u32(&bytes[28..32]), 250, "ts_nsec");
    assert_eq!(ne_u32(&bytes[32..36]), 55, "incl_len");
    assert_eq!(ne_u32(&bytes[36..40]), 55, "orig_len");

    // LoRaTap
    let tap = &bytes[40..40 + LORATAP_HEADER_SIZE];
    assert_eq!(&tap[4..8], &868_100_000u32.to_be_bytes(), "frequency");
    assert_eq!(tap[9], 7, "spreading factor");
    assert_eq!(&tap[15..23], &GW_EUI.to_be_bytes());
    assert_eq!(
        u32::from_be_bytes([tap[23], tap[24], tap[25], tap[26]]),
        12_345_678
    );

    // нагрузка
    assert_eq!(&bytes[75..], reference_packet().payload.as_slice());
}

// ===========================================================================
// Инварианты
// ===========================================================================

#[test]
fn test_resumed_file_gets_no_second_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lora.pcap");

    for _ in 0..3 {
        let mut session = PcapSession::create(&path, GW_EUI).unwrap();
        session.start().unwrap();
        session
            .write(&reference_packet(), CaptureTimestamp::now())
            .unwrap();
        session.stop().unwrap().destroy();
    }

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 24 + 3 * 71);

    let recs = records(&bytes);
    assert_eq!(recs.len(), 3);
}

#[test]
fn test_start_on_foreign_nonempty_file_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("existing.pcap");
    fs::write(&path, [0xFFu8]).unwrap();

    let mut session = PcapSession::create(&path, GW_EUI).unwrap();
    session.start().unwrap();
    session.stop().unwrap().destroy();

    assert_eq!(fs::read(&path).unwrap(), vec![0xFF]);
}

#[test]
fn test_lengths_and_eui_identical_in_every_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lora.pcap");
    let eui: u64 = 0x0102_0304_0506_0708;

    let mut session = PcapSession::create(&path, eui).unwrap();
    session.start().unwrap();

    let sizes = [0usize, 1, 13, 51, 222, 256];
    for (i, &size) in sizes.iter().enumerate() {
        let mut p = reference_packet();
        p.payload = vec![i as u8; size];
        p.datarate = SpreadingFactor::from_u32(7 + i as u32);
        session.write(&p, CaptureTimestamp::now()).unwrap();
    }
    session.stop().unwrap().destroy();

    let bytes = fs::read(&path).unwrap();
    let recs = records(&bytes);
    assert_eq!(recs.len(), sizes.len());

    for ((tap_off, incl, orig), size) in recs.into_iter().zip(sizes) {
        assert_eq!(incl, orig);
        assert_eq!(incl as usize, LORATAP_HEADER_SIZE + size);
        assert_eq!(&bytes[tap_off + 15..tap_off + 23], &eui.to_be_bytes());
    }
}

#[test]
fn test_filtered_packets_leave_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lora.pcap");

    let mut session = PcapSession::create(&path, GW_EUI).unwrap();
    session.start().unwrap();

    let mut fsk = reference_packet();
    fsk.modulation = Modulation::Fsk;
    for _ in 0..10 {
        assert_eq!(session.write(&fsk, CaptureTimestamp::now()).unwrap(), 0);
    }
    session.stop().unwrap().destroy();

    assert_eq!(fs::metadata(&path).unwrap().len(), 24);
}
