use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Метрики, обновляемые lock-free из нескольких потоков.
#[derive(Debug, Default)]
pub struct RecorderMetrics {
    /// Пакетов получено писателем от источника
    pub packets_received: AtomicU64,
    /// LoRa записей в файле
    pub records_written: AtomicU64,
    /// Пропущено не-LoRa пакетов
    pub packets_filtered: AtomicU64,
    /// Потеряно при переполненном канале
    pub dropped_packets: AtomicU64,
    pub write_errors: AtomicU64,
    /// Байт записей (без глобального заголовка)
    pub bytes_written: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub duration_secs: f64,
    pub packets_received: u64,
    pub records_written: u64,
    pub packets_filtered: u64,
    pub dropped_packets: u64,
    pub write_errors: u64,
    pub bytes_written: u64,
    pub packet_rate_pps: f64,
    pub drop_rate_pct: f64,
}

impl RecorderMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Пакетов в секунду.
    pub fn packet_rate_pps(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.packets_received.load(Ordering::Relaxed) as f64 / secs
    }

    /// Процент потерянных пакетов (0.0-100.0).
    pub fn drop_rate_pct(&self) -> f64 {
        let received = self.packets_received.load(Ordering::Relaxed);
        let dropped = self.dropped_packets.load(Ordering::Relaxed);
        let total = received + dropped;

        if total == 0 {
            0.0
        } else {
            dropped as f64 / total as f64 * 100.0
        }
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> MetricsSummary {
        MetricsSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            packets_filtered: self.packets_filtered.load(Ordering::Relaxed),
            dropped_packets: self.dropped_packets.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            packet_rate_pps: self.packet_rate_pps(elapsed),
            drop_rate_pct: self.drop_rate_pct(),
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Received      : {}", self.packets_received)?;
        writeln!(f, "  Records       : {}", self.records_written)?;
        writeln!(f, "  Filtered      : {}", self.packets_filtered)?;
        writeln!(
            f,
            "  Dropped       : {} ({:.2}%)",
            self.dropped_packets, self.drop_rate_pct
        )?;
        writeln!(f, "  Write errors  : {}", self.write_errors)?;
        writeln!(f, "  Bytes written : {}", self.bytes_written)?;
        writeln!(f, "  Packet rate   : {:.2} pkt/s", self.packet_rate_pps)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
