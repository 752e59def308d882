// Протокол передачи: формат пакета, упаковка и сборка

pub mod fixed_width;
pub mod packet;
pub mod partition;
pub mod reassembly;
pub mod wire;

pub use packet::{PacketField, PacketLayout, RawPacket};
pub use reassembly::{Reassembler, ReassemblyState};
pub use wire::{pack, read_packet, read_packet_from_bytes};
