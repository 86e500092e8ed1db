//! Game Gear reverse-engineering toolkit.
//!
//! Two independent halves share this crate:
//!
//! * [`trace`] turns the emulator's opcode fetch events into a Z80
//!   listing with per-address hit counts.
//! * [`palette`], [`vdp`] and [`unpack`] turn color RAM, video RAM and
//!   compressed ROM graphics into [`color::PixelBuffer`]s.

pub mod color;
pub mod instruction;
pub mod mnemonic;
pub mod operand;
pub mod palette;
pub mod trace;
pub mod unpack;
pub mod vdp;

#[cfg(feature = "cli")]
pub mod config;

pub use color::{Color, PixelBuffer};
pub use instruction::{FetchEvent, Instruction};
pub use palette::Palette;
pub use trace::{MapperProbe, TraceEvent, Tracer};
