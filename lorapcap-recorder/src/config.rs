use std::path::PathBuf;

use crate::ChannelPlan;

/// Источник принятых пакетов (выбор при старте).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Встроенный симулятор концентратора (не требует железа).
    Simulated,
    /// Концентратор SX1302 через HAL.
    Sx1302,
}

/// Полная конфигурация сессии записи.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Источник пакетов
    pub source: SourceKind,
    /// Путь к выходному .pcap файлу (дозапись, если уже существует)
    pub output_path: PathBuf,
    /// EUI шлюза, попадает в каждую запись
    pub gateway_eui: u64,
    /// План каналов концентратора
    pub channel_plan: ChannelPlan,
    /// Средняя частота пакетов симулятора (пакетов/с)
    pub packets_per_sec: f64,
    /// Ограничение по времени (None = до Ctrl+C)
    pub duration_secs: Option<u64>,
    /// Остановиться после стольких принятых пакетов
    pub max_packets: Option<u64>,
    /// Сбрасывать файл каждые N записей (0 = только при остановке)
    pub flush_every: u32,
    /// Ёмкость канала между источником и писателем (в пакетах)
    pub ring_capacity: usize,
    /// Интервал вывода статистики (секунды)
    pub stats_interval_secs: u64,
    /// Seed генератора симулятора (None = случайный)
    pub seed: Option<u64>,
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SourceKind, RecorderConfig
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for SourceKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            SourceKind::Simulated => write!(f, "sim"),
            SourceKind::Sx1302 => write!(f, "sx1302"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sim" | "simulated" => Ok(SourceKind::Simulated),
            "sx1302" | "sx1303" | "concentrator" => Ok(SourceKind::Sx1302),
            _ => Err(format!("Unknown packet source: '{s}'. Use: sim, sx1302")),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Simulated,
            output_path: PathBuf::from("lora.pcap"),
            gateway_eui: 0xAA55_5A00_0000_0000,
            channel_plan: ChannelPlan::eu868(),
            packets_per_sec: 5.0,
            duration_secs: None,
            max_packets: None,
            flush_every: 16,
            ring_capacity: 256,
            stats_interval_secs: 5,
            seed: None,
        }
    }
}

/// Парсит EUI шлюза (64 бита, 16 hex-цифр).
///
/// Допускаются префикс `0x` и разделители `:` или `-`.
///
/// # Примеры
/// ```
/// use lorapcap_recorder::config::parse_gateway_eui;
/// assert_eq!(parse_gateway_eui("AA555A0000000101").unwrap(), 0xAA55_5A00_0000_0101);
/// assert_eq!(parse_gateway_eui("0xaa555a0000000101").unwrap(), 0xAA55_5A00_0000_0101);
/// assert_eq!(parse_gateway_eui("AA:55:5A:00:00:00:01:01").unwrap(), 0xAA55_5A00_0000_0101);
/// ```
pub fn parse_gateway_eui(s: &str) -> Result<u64, String> {
    let trimmed = s.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = hex.chars().filter(|c| *c != ':' && *c != '-').collect();

    if digits.len() != 16 {
        return Err(format!(
            "Invalid gateway EUI '{s}': expected 16 hex digits, got {}",
            digits.len()
        ));
    }

    u64::from_str_radix(&digits, 16).map_err(|e| format!("Invalid gateway EUI '{s}': {e}"))
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
