use thiserror::Error;

pub type RecorderResult<T> = std::result::Result<T, RecorderError>;

#[derive(Debug, Error)]
pub enum RecorderError {
    /// Источник пакетов недоступен
    #[error("Packet source not available: {0}")]
    SourceNotFound(String),

    /// Недопустимые параметры источника
    #[error("Packet source error: {0}")]
    Source(String),

    /// Ошибка чтения файлов конфигурации
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка записи pcap
    #[error("pcap error: {0}")]
    Pcap(#[from] lorapcap_types::PcapError),

    /// Некорректный план каналов
    #[error("Channel plan error: {0}")]
    ChannelPlan(String),

    /// Невалидный JSON конфигурации концентратора
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Сбой потока приёма
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}
