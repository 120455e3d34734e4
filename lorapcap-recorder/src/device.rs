// Симулятор выдаёт пакеты так, как их отдаёт HAL концентратора: на частотах
// плана каналов, с RSSI/SNR, статусом CRC и счётчиком count_us. Часть
// пакетов FSK, чтобы писатель их отфильтровывал.
// crossbeam_channel передаёт пакеты между потоками, stop_flag останавливает
// источник.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Sender, TrySendError};
use lorapcap_types::{
    Bandwidth, CaptureTimestamp, CodingRate, CrcStatus, Modulation, RxPacket, SpreadingFactor,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    metrics::RecorderMetrics, ChannelPlan, RecorderConfig, RecorderError, RecorderResult,
    SourceKind,
};

/// Абстракция источника принятых пакетов.
pub trait PacketSource: Send {
    /// Информация об источнике
    fn info(&self) -> SourceInfo;

    /// Запускает приём. Блокируется до установки `stop_flag` или закрытия
    /// канала.
    fn run(
        &mut self,
        tx: Sender<RxFrame>,
        metrics: Arc<RecorderMetrics>,
        stop_flag: Arc<AtomicBool>,
    ) -> RecorderResult<()>;
}

/// Принятый пакет и момент его приёма.
#[derive(Debug, Clone)]
pub struct RxFrame {
    pub packet: RxPacket,
    pub captured_at: CaptureTimestamp,
}

/// Информация об источнике (для логирования).
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: String,
    /// Количество LoRa/FSK каналов в плане
    pub channels: usize,
}

/// Генерирует синтетический трафик концентратора.
///
/// Параметры проверяются в [`new`](Self::new) и после этого не меняются:
///
/// ```compile_fail
/// use lorapcap_recorder::{ChannelPlan, SimulatedConcentrator};
///
/// let mut dev = SimulatedConcentrator::new(ChannelPlan::eu868(), 5.0, None).unwrap();
/// dev.fsk_ratio = 2.0;
/// ```
pub struct SimulatedConcentrator {
    plan: ChannelPlan,
    /// Интервал между пакетами
    period: Duration,
    /// Доля FSK пакетов (если в плане есть FSK канал)
    fsk_ratio: f64,
    seed: Option<u64>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SimulatedConcentrator {
    pub fn new(
        plan: ChannelPlan,
        packets_per_sec: f64,
        seed: Option<u64>,
    ) -> RecorderResult<Self> {
        if !plan.has_lora_channels() {
            return Err(RecorderError::ChannelPlan(
                "no enabled LoRa channels".to_string(),
            ));
        }

        if !packets_per_sec.is_finite() || packets_per_sec <= 0.0 {
            return Err(RecorderError::Source(format!(
                "packet rate must be > 0, got {packets_per_sec}"
            )));
        }

        // слишком малая частота даёт непредставимый интервал
        let period = Duration::try_from_secs_f64(1.0 / packets_per_sec).map_err(|e| {
            RecorderError::Source(format!("packet rate {packets_per_sec} out of range: {e}"))
        })?;

        Ok(Self {
            plan,
            period,
            fsk_ratio: 0.05,
            seed,
        })
    }

    /// Генерирует один пакет.
    pub fn generate<R: Rng>(
        &self,
        rng: &mut R,
        count_us: u32,
    ) -> RxPacket {
        let mut packet = match (&self.plan.fsk, &self.plan.lora_std) {
            (Some(fsk), _) if rng.gen_bool(self.fsk_ratio) => RxPacket {
                freq_hz: fsk.freq_hz,
                modulation: Modulation::Fsk,
                bandwidth: Bandwidth::from_hz(fsk.bandwidth_hz),
                if_chain: 9,
                ..Default::default()
            },
            (_, Some(ch)) if self.plan.multi_sf.is_empty() || rng.gen_ratio(1, 10) => {
                let mut p = RxPacket::lora(
                    ch.freq_hz,
                    Bandwidth::from_hz(ch.bandwidth_hz),
                    SpreadingFactor::from_u32(ch.spread_factor),
                    Vec::new(),
                );
                p.if_chain = 8;
                p
            }
            _ => {
                let idx = rng.gen_range(0..self.plan.multi_sf.len());
                let mut p = RxPacket::lora(
                    self.plan.multi_sf[idx],
                    Bandwidth::Khz125,
                    SpreadingFactor::from_u32(rng.gen_range(7..=12)),
                    Vec::new(),
                );
                p.if_chain = idx as u8;
                p
            }
        };

        packet.count_us = count_us;
        packet.rf_chain = rng.gen_range(0..2);
        packet.rssic = rng.gen_range(-125.0..-30.0);
        packet.rssis = packet.rssic - rng.gen_range(0.0..4.0);
        // SX1302 отдаёт SNR с шагом 0.25 дБ
        packet.snr = (rng.gen_range(-20.0f32..12.0) * 4.0).round() / 4.0;
        packet.coderate = if rng.gen_ratio(9, 10) {
            CodingRate::Cr4_5
        } else {
            CodingRate::Cr4_8
        };
        packet.status = match rng.gen_range(0..100) {
            0..=89 => CrcStatus::CrcOk,
            90..=97 => CrcStatus::CrcBad,
            _ => CrcStatus::NoCrc,
        };

        let len = rng.gen_range(1..=64usize);
        packet.payload = (0..len).map(|_| rng.gen()).collect();

        packet
    }
}

impl PacketSource for SimulatedConcentrator {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Simulated SX1302".to_string(),
            channels: self.plan.multi_sf.len()
                + self.plan.lora_std.is_some() as usize
                + self.plan.fsk.is_some() as usize,
        }
    }

    fn run(
        &mut self,
        tx: Sender<RxFrame>,
        metrics: Arc<RecorderMetrics>,
        stop_flag: Arc<AtomicBool>,
    ) -> RecorderResult<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let period = self.period;
        let start_mono = Instant::now();
        let mut sent: u32 = 0;

        while !stop_flag.load(Ordering::Relaxed) {
            // счётчик концентратора 32-битный и переполняется
            let count_us = start_mono.elapsed().as_micros() as u32;
            let frame = RxFrame {
                packet: self.generate(&mut rng, count_us),
                captured_at: CaptureTimestamp::now(),
            };

            match tx.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    metrics.dropped_packets.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => break,
            }

            sent = sent.wrapping_add(1);

            // pacing: синхронизация по реальному времени, stop_flag
            // проверяется не реже раза в 100 мс
            let expected = period * sent;
            loop {
                let elapsed = start_mono.elapsed();
                if elapsed >= expected || stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                thread::sleep((expected - elapsed).min(Duration::from_millis(100)));
            }
        }

        Ok(())
    }
}

/// Создаёт нужный источник по конфигурации.
pub fn create_source(config: &RecorderConfig) -> RecorderResult<Box<dyn PacketSource>> {
    match &config.source {
        SourceKind::Simulated => Ok(Box::new(SimulatedConcentrator::new(
            config.channel_plan.clone(),
            config.packets_per_sec,
            config.seed,
        )?)),
        SourceKind::Sx1302 => Err(RecorderError::SourceNotFound(
            "SX1302 HAL is not linked into this build".to_string(),
        )),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
