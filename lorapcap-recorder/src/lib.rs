pub mod channel_plan;
pub mod config;
pub mod device;
pub mod error;
pub mod metrics;
pub mod pipeline;

pub use channel_plan::*;
pub use config::*;
pub use device::*;
pub use error::*;
pub use metrics::*;
pub use pipeline::*;
