use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Время захвата записи: секунды Unix + наносекунды.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureTimestamp {
    pub secs: u32,
    pub nanos: u32,
}

impl CaptureTimestamp {
    pub fn new(
        secs: u32,
        nanos: u32,
    ) -> Self {
        Self { secs, nanos }
    }

    /// Текущее системное время.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }
}

impl From<Duration> for CaptureTimestamp {
    /// Секунды усекаются до 32 бит, как в заголовке записи pcap.
    fn from(d: Duration) -> Self {
        Self {
            secs: d.as_secs() as u32,
            nanos: d.subsec_nanos(),
        }
    }
}

impl From<SystemTime> for CaptureTimestamp {
    fn from(t: SystemTime) -> Self {
        Self::from(t.duration_since(UNIX_EPOCH).unwrap_or_default())
    }
}
