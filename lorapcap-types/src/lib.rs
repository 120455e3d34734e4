pub mod bandwidth;
pub mod coding_rate;
pub mod crc_status;
pub mod error;
pub mod modulation;
pub mod rx_packet;
pub mod spreading_factor;
pub mod timestamp;

pub use bandwidth::*;
pub use coding_rate::*;
pub use crc_status::*;
pub use error::*;
pub use modulation::*;
pub use rx_packet::*;
pub use spreading_factor::*;
pub use timestamp::*;
