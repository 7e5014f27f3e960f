//! Wire layer of the sync protocol: identifiers, packet kinds, capability
//! negotiation, the versioned payload envelope, and the transport edge
//! (packet sinks and length-prefixed framing).

pub mod capability;
pub mod client;
pub mod codec;
pub mod framing;
pub mod identifier;
pub mod packet;
pub mod payload;
pub mod sink;

pub use capability::{ClientCapabilities, ServerCapabilities};
pub use client::{ClientId, ClientProfile};
pub use codec::{PacketError, decode_packet, encode_packet};
pub use framing::{FrameConfig, FrameError, read_packet, run_writer, write_packet};
pub use identifier::{Identifier, IdentifierError};
pub use packet::{Packet, PacketKind, ProtocolVersion};
pub use sink::{PacketSink, QueueSink};
