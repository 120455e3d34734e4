use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crossbeam_channel::RecvTimeoutError;
use log::{info, warn};
use lorapcap_core::PcapSession;

use crate::{
    device::{PacketSource, RxFrame},
    metrics::RecorderMetrics,
    RecorderConfig, RecorderError, RecorderResult,
};

/// Оркестрирует сессию записи.
pub struct RecordingPipeline {
    config: RecorderConfig,
    metrics: Arc<RecorderMetrics>,
    stop_flag: Arc<AtomicBool>,
}

impl RecordingPipeline {
    /// Создаёт пайплайн. Возвращает также shared-ссылку на метрики.
    pub fn new(config: RecorderConfig) -> (Self, Arc<RecorderMetrics>) {
        let metrics = RecorderMetrics::new();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let p = Self {
            config,
            metrics: metrics.clone(),
            stop_flag,
        };

        (p, metrics)
    }

    /// Флаг остановки. Устанавливает в `true` для graceful shutdown.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Запускает запись. Блокируется до завершения.
    pub fn run(
        self,
        mut source: Box<dyn PacketSource>,
    ) -> RecorderResult<()> {
        let info = source.info();

        info!(
            "Starting capture: {} ({} channels), gateway EUI {:016X}",
            info.name, info.channels, self.config.gateway_eui
        );

        info!(
            "Output: {:?}, duration: {:?}",
            self.config.output_path, self.config.duration_secs
        );

        // Сессию открываем до старта источника: ошибка открытия файла не
        // должна оставлять работающий поток приёма
        let mut session = PcapSession::create(&self.config.output_path, self.config.gateway_eui)?;
        session.start()?;

        let (tx, rx) = crossbeam_channel::bounded::<RxFrame>(self.config.ring_capacity);
        let stop_flag = self.stop_flag.clone();
        let stop_flag_capture = stop_flag.clone();
        let metrics_capture = self.metrics.clone();

        // Поток приёма
        let capture_handle = std::thread::spawn(move || {
            let result = source.run(tx, metrics_capture, stop_flag_capture);

            if let Err(ref e) = result {
                warn!("Capture thread error: {e}");
            }

            result
        });

        // Цикл записи (текущий поток)
        let writer_result = self.writer_loop(rx, &mut session);

        // Сигнализируем потоку приёма остановиться
        stop_flag.store(true, Ordering::Relaxed);

        // Сбой источника делает всю запись неуспешной, но файл всё равно
        // закрывается
        let capture_result = match capture_handle.join() {
            Ok(result) => result,
            Err(_) => {
                warn!("Capture thread panicked");
                Err(RecorderError::Pipeline("capture thread panicked".to_string()))
            }
        };

        let stopped = session.stop()?;
        info!(
            "Capture closed: {:?} ({} records this session)",
            stopped.path(),
            stopped.records_written()
        );
        stopped.destroy();

        writer_result.and(capture_result)
    }

    fn writer_loop(
        &self,
        rx: crossbeam_channel::Receiver<RxFrame>,
        session: &mut PcapSession,
    ) -> RecorderResult<()> {
        let cfg = &self.config;
        let metrics = &self.metrics;

        let recv_timeout = Duration::from_millis(100);
        let stats_interval = Duration::from_secs(cfg.stats_interval_secs);

        let session_start = Instant::now();
        let mut last_stats = Instant::now();
        let mut since_flush: u32 = 0;

        loop {
            //  Проверяем ограничение по времени
            if let Some(dur) = cfg.duration_secs {
                if session_start.elapsed().as_secs() >= dur {
                    info!("Duration limit reached ({dur}s). Finalizing...");
                    break;
                }
            }

            //  Проверяем ограничение по количеству пакетов
            if let Some(max) = cfg.max_packets {
                if metrics.packets_received.load(Ordering::Relaxed) >= max {
                    info!("Packet limit reached ({max}). Finalizing...");
                    break;
                }
            }

            //  Проверяем внешний stop_flag (Ctrl+C)
            if self.stop_flag.load(Ordering::Relaxed) {
                info!("Stop signal received. Finalizing...");
                break;
            }

            let frame = match rx.recv_timeout(recv_timeout) {
                Ok(f) => f,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Capture channel closed. Flushing...");
                    break;
                }
            };

            metrics.packets_received.fetch_add(1, Ordering::Relaxed);

            match session.write(&frame.packet, frame.captured_at) {
                Ok(0) => {
                    metrics.packets_filtered.fetch_add(1, Ordering::Relaxed);
                }
                Ok(n) => {
                    metrics.records_written.fetch_add(1, Ordering::Relaxed);
                    metrics.bytes_written.fetch_add(n as u64, Ordering::Relaxed);
                    since_flush += 1;
                }
                Err(e) => {
                    metrics.write_errors.fetch_add(1, Ordering::Relaxed);
                    warn!("Write error: {e}");
                    // Не прерываем, пробуем продолжить
                }
            }

            if cfg.flush_every > 0 && since_flush >= cfg.flush_every {
                if let Err(e) = session.flush() {
                    metrics.write_errors.fetch_add(1, Ordering::Relaxed);
                    warn!("Flush error: {e}");
                }
                since_flush = 0;
            }

            // Периодически выводим статистику
            if last_stats.elapsed() >= stats_interval {
                self.log_progress(&session_start);
                last_stats = Instant::now();
            }
        }

        session.flush()?;
        Ok(())
    }

    fn log_progress(
        &self,
        start: &Instant,
    ) {
        let m = &self.metrics;

        info!(
            "[ {:.0}s ] received={} records={} filtered={} dropped={} ({:.2}%) rate={:.1}pkt/s",
            start.elapsed().as_secs_f64(),
            m.packets_received.load(Ordering::Relaxed),
            m.records_written.load(Ordering::Relaxed),
            m.packets_filtered.load(Ordering::Relaxed),
            m.dropped_packets.load(Ordering::Relaxed),
            m.drop_rate_pct(),
            m.packet_rate_pps(start),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::tempdir;

    use crossbeam_channel::Sender;

    use super::*;
    use crate::{
        device::{SimulatedConcentrator, SourceInfo},
        ChannelPlan, SourceKind,
    };

    /// Источник, который отдаёт один пакет и падает.
    struct CrashingSource;

    impl PacketSource for CrashingSource {
        fn info(&self) -> SourceInfo {
            SourceInfo {
                name: "crashing".to_string(),
                channels: 0,
            }
        }

        fn run(
            &mut self,
            tx: Sender<RxFrame>,
            _metrics: Arc<RecorderMetrics>,
            _stop_flag: Arc<AtomicBool>,
        ) -> RecorderResult<()> {
            let packet = lorapcap_types::RxPacket::lora(
                868_100_000,
                lorapcap_types::Bandwidth::Khz125,
                lorapcap_types::SpreadingFactor::Sf7,
                vec![0xAB; 4],
            );
            let _ = tx.send(RxFrame {
                packet,
                captured_at: lorapcap_types::CaptureTimestamp::now(),
            });

            panic!("concentrator went away");
        }
    }

    fn test_config(path: PathBuf) -> RecorderConfig {
        RecorderConfig {
            source: SourceKind::Simulated,
            output_path: path,
            gateway_eui: 0xAA55_5A00_0000_0101,
            channel_plan: ChannelPlan::eu868(),
            packets_per_sec: 500.0,
            duration_secs: Some(5), // страховка, обычно срабатывает max_packets
            max_packets: Some(50),
            flush_every: 8,
            ring_capacity: 1_024,
            stats_interval_secs: 60, // не выводим stats в тестах
            seed: Some(1),
        }
    }

    fn source(config: &RecorderConfig) -> Box<dyn PacketSource> {
        Box::new(
            SimulatedConcentrator::new(
                config.channel_plan.clone(),
                config.packets_per_sec,
                config.seed,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_pipeline_file_size_matches_metrics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.pcap");

        let config = test_config(path.clone());
        let src = source(&config);
        let (pipeline, metrics) = RecordingPipeline::new(config);
        pipeline.run(src).unwrap();

        let received = metrics.packets_received.load(Ordering::Relaxed);
        let records = metrics.records_written.load(Ordering::Relaxed);
        let filtered = metrics.packets_filtered.load(Ordering::Relaxed);

        assert_eq!(received, 50);
        assert_eq!(records + filtered, received);
        assert_eq!(metrics.write_errors.load(Ordering::Relaxed), 0);

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len, 24 + metrics.bytes_written.load(Ordering::Relaxed));
    }

    #[test]
    fn test_pipeline_appends_to_existing_capture() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.pcap");

        let mut total_bytes = 0;
        for _ in 0..2 {
            let config = test_config(path.clone());
            let src = source(&config);
            let (pipeline, metrics) = RecordingPipeline::new(config);
            pipeline.run(src).unwrap();
            total_bytes += metrics.bytes_written.load(Ordering::Relaxed);
        }

        // один глобальный заголовок на две сессии
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 24 + total_bytes);
    }

    #[test]
    fn test_pipeline_stop_flag_works() {
        let dir = tempdir().unwrap();
        let mut config = test_config(dir.path().join("capture.pcap"));
        config.duration_secs = None;
        config.max_packets = None;
        config.packets_per_sec = 20.0;

        let src = source(&config);
        let (pipeline, _metrics) = RecordingPipeline::new(config);
        let stop = pipeline.stop_flag();

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            stop.store(true, Ordering::Relaxed);
        });

        assert!(pipeline.run(src).is_ok(), "graceful stop не должен быть ошибкой");
    }

    #[test]
    fn test_pipeline_reports_crashed_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.pcap");
        let mut config = test_config(path.clone());
        config.max_packets = None;

        let (pipeline, metrics) = RecordingPipeline::new(config);
        let result = pipeline.run(Box::new(CrashingSource));

        assert!(matches!(result, Err(RecorderError::Pipeline(_))));

        // принятый до сбоя пакет записан, файл закрыт корректно
        assert_eq!(metrics.records_written.load(Ordering::Relaxed), 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 24 + 16 + 35 + 4);
    }

    #[test]
    fn test_pipeline_fails_on_unwritable_path() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path().join("missing/dir/capture.pcap"));
        let src = source(&config);
        let (pipeline, _) = RecordingPipeline::new(config);

        assert!(pipeline.run(src).is_err());
    }
}
