//! Message distributor module
pub mod api;
pub mod codec;
pub mod server;

pub use self::codec::{decode_bytes, decode_frame};
pub use self::server::{MessageDistributor, StatusResponse, TransportStats, TransportStatus};
