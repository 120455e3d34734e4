use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lorapcap_core::{write_rx_packet, LoraTapHeader, PCAP_RECORD_HEADER_SIZE};
use lorapcap_types::{Bandwidth, CaptureTimestamp, RxPacket, SpreadingFactor};

const GW_EUI: [u8; 8] = [0xAA, 0x55, 0x5A, 0x00, 0x00, 0x00, 0x01, 0x01];

fn packet(len: usize) -> RxPacket {
    let mut p = RxPacket::lora(
        868_100_000,
        Bandwidth::Khz125,
        SpreadingFactor::Sf9,
        (0..len).map(|i| i as u8).collect(),
    );
    p.rssic = -87.0;
    p.rssis = -89.5;
    p.snr = -3.25;
    p.count_us = 42_000_000;
    p
}

fn bench_loratap_header(c: &mut Criterion) {
    let p = packet(20);

    c.bench_function("loratap_header_serialize", |b| {
        b.iter(|| {
            let hdr = LoraTapHeader::from_packet(black_box(&p), &GW_EUI);
            black_box(hdr.serialize().unwrap())
        })
    });
}

fn bench_write_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_rx_packet");
    let ts = CaptureTimestamp::new(1_700_000_000, 500_000_000);

    for len in [0usize, 20, 64, 256] {
        let p = packet(len);
        group.throughput(Throughput::Elements(1));

        group.bench_with_input(BenchmarkId::from_parameter(len), &p, |b, p| {
            let mut buf = Vec::with_capacity(PCAP_RECORD_HEADER_SIZE + 35 + len);
            b.iter(|| {
                buf.clear();
                black_box(write_rx_packet(&mut buf, &GW_EUI, black_box(p), ts).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_loratap_header, bench_write_record);
criterion_main!(benches);
