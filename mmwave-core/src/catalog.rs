//! Command catalog types.
//!
//! A catalog maps a semantic operation (query the presence switch, set the
//! fall duration, ...) to the frame that requests it. Each radar model
//! provides its own operation enum implementing [`Operation`]; the engine
//! only ever sees the trait.

use std::fmt::Debug;

/// Default payload of every query
pub const QUERY: &[u8] = &[0x0F];

/// Payload that switches a feature on
pub const ON: &[u8] = &[0x01];

/// Payload that switches a feature off
pub const OFF: &[u8] = &[0x00];

/// Payload placeholder for operations that always carry caller data
pub const NO_DATA: &[u8] = &[];

/// Wire parameters of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCommand {
    pub control: u8,
    pub command: u8,
    /// Payload used when the caller does not override it
    pub payload: &'static [u8],
    /// Human readable name for logs
    pub name: &'static str,
}

impl WireCommand {
    pub const fn new(
        control: u8,
        command: u8,
        payload: &'static [u8],
        name: &'static str,
    ) -> Self {
        WireCommand {
            control,
            command,
            payload,
            name,
        }
    }

    pub fn key(&self) -> (u8, u8) {
        (self.control, self.command)
    }
}

/// A statically defined request/response exchange.
pub trait Operation: Copy + Eq + Debug + Send + Sync + 'static {
    /// Look up the wire parameters for this operation
    fn wire(&self) -> WireCommand;

    fn name(&self) -> &'static str {
        self.wire().name
    }
}

/// Operations every model in the family supports, used by the generic
/// initialization sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardOp {
    Heartbeat,
    Reset,
    ProductModel,
    ProductId,
    HardwareModel,
    FirmwareVersion,
    InitComplete,
}

impl StandardOp {
    /// Identity items in the order they are loaded at start-up
    pub const IDENTITY: [StandardOp; 4] = [
        StandardOp::ProductModel,
        StandardOp::ProductId,
        StandardOp::HardwareModel,
        StandardOp::FirmwareVersion,
    ];

    /// Label used in the configuration error log
    pub fn label(&self) -> &'static str {
        match self {
            StandardOp::Heartbeat => "Heartbeat",
            StandardOp::Reset => "Reset Device",
            StandardOp::ProductModel => "Product Model",
            StandardOp::ProductId => "Product ID",
            StandardOp::HardwareModel => "Hardware Model",
            StandardOp::FirmwareVersion => "Firmware Version",
            StandardOp::InitComplete => "Device Initialization",
        }
    }
}
