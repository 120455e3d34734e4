use crate::{Bandwidth, CodingRate, CrcStatus, Modulation, SpreadingFactor};

/// Максимальный размер полезной нагрузки, который выдаёт концентратор.
pub const MAX_PAYLOAD_SIZE: usize = 256;

/// Принятый концентратором пакет вместе с метаданными физического уровня.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RxPacket {
    /// Центральная частота канала (Гц)
    pub freq_hz: u32,
    /// Индекс IF-канала
    pub if_chain: u8,
    /// Статус CRC
    pub status: CrcStatus,
    /// Внутренний счётчик концентратора в момент приёма (мкс)
    pub count_us: u32,
    /// Индекс RF-цепи
    pub rf_chain: u8,
    pub modulation: Modulation,
    pub bandwidth: Bandwidth,
    pub datarate: SpreadingFactor,
    pub coderate: CodingRate,
    /// RSSI канала (дБм)
    pub rssic: f32,
    /// RSSI сигнала (дБм)
    pub rssis: f32,
    /// Среднее отношение сигнал/шум (дБ)
    pub snr: f32,
    pub payload: Vec<u8>,
}

impl RxPacket {
    /// Создаёт LoRa пакет с заданными частотой, SF и нагрузкой.
    pub fn lora(
        freq_hz: u32,
        bandwidth: Bandwidth,
        datarate: SpreadingFactor,
        payload: Vec<u8>,
    ) -> Self {
        RxPacket {
            freq_hz,
            modulation: Modulation::Lora,
            bandwidth,
            datarate,
            coderate: CodingRate::Cr4_5,
            status: CrcStatus::CrcOk,
            payload,
            ..Default::default()
        }
    }

    /// Длина нагрузки (поле `size` в HAL).
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
