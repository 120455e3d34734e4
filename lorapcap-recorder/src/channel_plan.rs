//! План каналов концентратора SX130x из `global_conf.json`.
//!
//! Частота канала = центральная частота радио + смещение IF. Файл
//! конфигурации packet forwarder допускает комментарии `/* ... */`,
//! которые вырезаются перед разбором JSON.

use std::{collections::BTreeMap, fmt, path::Path};

use serde::Deserialize;
use serde_json::Value;

use crate::{RecorderError, RecorderResult};

/// Количество multi-SF каналов концентратора
pub const MULTI_SF_CHANNELS: usize = 8;

/// Частоты, на которых концентратор принимает пакеты.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPlan {
    /// Центральные частоты radio_0 и radio_1 (Гц)
    pub radio_freq_hz: [u32; 2],
    /// Включённые multi-SF каналы (Гц, по возрастанию)
    pub multi_sf: Vec<u32>,
    pub lora_std: Option<LoraStdChannel>,
    pub fsk: Option<FskChannel>,
}

/// Одиночный LoRa канал с фиксированными полосой и SF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoraStdChannel {
    pub freq_hz: u32,
    pub bandwidth_hz: u32,
    pub spread_factor: u32,
}

/// FSK канал.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FskChannel {
    pub freq_hz: u32,
    pub bandwidth_hz: u32,
    pub datarate: u32,
}

#[derive(Debug, Deserialize)]
struct GlobalConf {
    #[serde(rename = "SX130x_conf")]
    sx130x_conf: Sx130xConf,
}

#[derive(Debug, Deserialize)]
struct Sx130xConf {
    radio_0: RadioConf,
    radio_1: RadioConf,
    #[serde(rename = "chan_Lora_std")]
    chan_lora_std: Option<LoraStdConf>,
    #[serde(rename = "chan_FSK")]
    chan_fsk: Option<FskConf>,
    /// chan_multiSF_N и всё остальное
    #[serde(flatten)]
    other: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RadioConf {
    freq: u32,
}

#[derive(Debug, Deserialize)]
struct MultiSfConf {
    enable: bool,
    #[serde(default)]
    radio: u8,
    #[serde(rename = "if", default)]
    if_hz: i32,
}

#[derive(Debug, Deserialize)]
struct LoraStdConf {
    enable: bool,
    #[serde(default)]
    radio: u8,
    #[serde(rename = "if", default)]
    if_hz: i32,
    #[serde(default)]
    bandwidth: u32,
    #[serde(default)]
    spread_factor: u32,
}

#[derive(Debug, Deserialize)]
struct FskConf {
    enable: bool,
    #[serde(default)]
    radio: u8,
    #[serde(rename = "if", default)]
    if_hz: i32,
    #[serde(default)]
    bandwidth: u32,
    #[serde(default)]
    datarate: u32,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ChannelPlan {
    /// Стандартный план EU868 (radio_0 = 867.5 MHz, radio_1 = 868.5 MHz).
    pub fn eu868() -> Self {
        ChannelPlan {
            radio_freq_hz: [867_500_000, 868_500_000],
            multi_sf: vec![
                867_100_000,
                867_300_000,
                867_500_000,
                867_700_000,
                867_900_000,
                868_100_000,
                868_300_000,
                868_500_000,
            ],
            lora_std: Some(LoraStdChannel {
                freq_hz: 868_300_000,
                bandwidth_hz: 250_000,
                spread_factor: 7,
            }),
            fsk: Some(FskChannel {
                freq_hz: 868_800_000,
                bandwidth_hz: 125_000,
                datarate: 50_000,
            }),
        }
    }

    /// Разбирает `global_conf.json` packet forwarder.
    pub fn from_json_str(s: &str) -> RecorderResult<Self> {
        let conf: GlobalConf = serde_json::from_str(&strip_block_comments(s))?;
        let conf = conf.sx130x_conf;
        let radio_freq_hz = [conf.radio_0.freq, conf.radio_1.freq];

        let mut multi_sf = Vec::with_capacity(MULTI_SF_CHANNELS);
        for ch in 0..MULTI_SF_CHANNELS {
            let name = format!("chan_multiSF_{ch}");
            let block = conf
                .other
                .get(&name)
                .ok_or_else(|| RecorderError::ChannelPlan(format!("missing {name}")))?;
            let block: MultiSfConf = serde_json::from_value(block.clone())?;

            if block.enable {
                multi_sf.push(channel_freq(&radio_freq_hz, block.radio, block.if_hz)?);
            }
        }
        multi_sf.sort_unstable();

        let lora_std = match conf.chan_lora_std {
            Some(b) if b.enable => Some(LoraStdChannel {
                freq_hz: channel_freq(&radio_freq_hz, b.radio, b.if_hz)?,
                bandwidth_hz: b.bandwidth,
                spread_factor: b.spread_factor,
            }),
            _ => None,
        };

        let fsk = match conf.chan_fsk {
            Some(b) if b.enable => Some(FskChannel {
                freq_hz: channel_freq(&radio_freq_hz, b.radio, b.if_hz)?,
                bandwidth_hz: b.bandwidth,
                datarate: b.datarate,
            }),
            _ => None,
        };

        Ok(ChannelPlan {
            radio_freq_hz,
            multi_sf,
            lora_std,
            fsk,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> RecorderResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Есть ли хотя бы один LoRa канал.
    pub fn has_lora_channels(&self) -> bool {
        !self.multi_sf.is_empty() || self.lora_std.is_some()
    }
}

fn channel_freq(
    radio_freq_hz: &[u32; 2],
    radio: u8,
    if_hz: i32,
) -> RecorderResult<u32> {
    let base = radio_freq_hz
        .get(radio as usize)
        .ok_or_else(|| RecorderError::ChannelPlan(format!("unknown radio index {radio}")))?;

    u32::try_from(*base as i64 + if_hz as i64).map_err(|_| {
        RecorderError::ChannelPlan(format!("channel frequency out of range: {base} Hz + {if_hz} Hz"))
    })
}

/// Вырезает комментарии `/* ... */`. Незакрытый комментарий остаётся как есть.
fn strip_block_comments(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("/*") {
        match rest[start + 2..].find("*/") {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + 2 + end + 2..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}

fn mhz(hz: u32) -> f64 {
    hz as f64 / 1e6
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for ChannelPlan {
    fn default() -> Self {
        Self::eu868()
    }
}

impl fmt::Display for LoraStdChannel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} / SF{}BW{}",
            mhz(self.freq_hz),
            self.spread_factor,
            self.bandwidth_hz / 1_000
        )
    }
}

impl fmt::Display for FskChannel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} / DR{}BW{}",
            mhz(self.freq_hz),
            self.datarate / 1_000,
            self.bandwidth_hz / 1_000
        )
    }
}

impl fmt::Display for ChannelPlan {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for freq in &self.multi_sf {
            writeln!(f, "{}", mhz(*freq))?;
        }

        match &self.lora_std {
            Some(ch) => writeln!(f, "chan_Lora_std: {ch}")?,
            None => writeln!(f, "chan_Lora_std: None")?,
        }

        match &self.fsk {
            Some(ch) => write!(f, "chan_FSK     : {ch}"),
            None => write!(f, "chan_FSK     : None"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
