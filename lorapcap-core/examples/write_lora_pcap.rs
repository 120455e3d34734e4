//! Пример: запись pcap-файла с синтетическими LoRa пакетами
//!
//! Демонстрирует:
//! - создание и запуск PcapSession
//! - запись LoRa пакетов и пропуск FSK
//! - остановку и освобождение сессии

use lorapcap_core::PcapSession;
use lorapcap_types::{Bandwidth, CaptureTimestamp, Modulation, RxPacket, SpreadingFactor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "lorapcap-core/test_output.pcap";

    let mut session = PcapSession::create(output_path, 0xAA55_5A00_0000_0101)?;
    session.start()?;

    let freqs = [868_100_000, 868_300_000, 868_500_000];

    for i in 0..30u32 {
        let mut packet = RxPacket::lora(
            freqs[i as usize % freqs.len()],
            Bandwidth::Khz125,
            SpreadingFactor::from_u32(7 + i % 6),
            format!("uplink #{i}").into_bytes(),
        );
        packet.rssic = -60.0 - i as f32;
        packet.rssis = -58.0 - i as f32;
        packet.snr = 10.0 - i as f32;
        packet.count_us = i * 1_000_000;

        // каждый десятый — FSK, в файл не попадёт
        if i % 10 == 9 {
            packet.modulation = Modulation::Fsk;
        }

        let n = session.write(&packet, CaptureTimestamp::now())?;
        println!("Packet {i}: {n} bytes");
    }

    let stopped = session.stop()?;
    println!("\n✓ Записано: {output_path}");
    println!("  Records  : {}", stopped.records_written());
    stopped.destroy();

    Ok(())
}
