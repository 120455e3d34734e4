use thiserror::Error;

/// Результат для операций записи pcap
pub type PcapResult<T> = std::result::Result<T, PcapError>;

/// Ошибки записи pcap/LoRaTap.
#[derive(Debug, Error)]
pub enum PcapError {
    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Попытка записать за пределы буфера фиксированного размера
    #[error("Buffer overflow: {needed} bytes needed, {remaining} remaining")]
    BufferOverflow { needed: usize, remaining: usize },

    /// Полезная нагрузка длиннее, чем допускает концентратор
    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),
}

impl PcapError {
    pub fn overflow(
        needed: usize,
        remaining: usize,
    ) -> Self {
        Self::BufferOverflow { needed, remaining }
    }
}
