//! The meter module contains the components responsible for the core link
//! protocol: frame building and parsing, byte-at-a-time receive assembly,
//! the exchange state machine, revision detection and serial transport.

pub mod assembler;
pub mod engine;
pub mod frame;
pub mod serial;
pub mod serial_mock;
pub mod transport;
pub mod version;

pub use assembler::{AssemblerState, FeedOutcome, ReceiveAssembler};
pub use engine::{EngineState, ErrorSink, ProtocolEngine, ResponseSink};
pub use frame::{pack_command, parse_response, sum_checksum, xor_checksum};
pub use serial::{MeterDeviceHandle, SerialConfig, SerialTransport};
pub use transport::MeterTransport;
pub use version::{detect_version, ProtocolVersion};

/// An outbound command frame.
pub use frame::CommandFrame;

/// A structurally validated response frame.
pub use frame::ResponseFrame;
