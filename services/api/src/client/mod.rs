pub mod peer;

pub use peer::{PeerConnection, PeerEngine, PeerError, PeerManager};
