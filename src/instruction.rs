// Decoded Z80 instructions built from fetch events

use std::fmt;

use crate::mnemonic::Mnemonic;
use crate::operand::{Operand, OperandExtra, OperandKind};

/// Width of the raw byte column, in bytes.
const BYTE_COLUMNS: usize = 4;

/// Emitted by the emulator once an instruction's opcode and operand bytes
/// have all been read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchEvent {
    /// Address of the next fetch, i.e. just past the consumed bytes.
    pub next_addr: u16,
    pub mnemonic_id: u8,
    pub op1_kind: u8,
    pub op2_kind: u8,
    pub bytes: Vec<u8>,
    #[cfg_attr(feature = "cli", serde(default))]
    pub op1_extra: OperandExtra,
    #[cfg_attr(feature = "cli", serde(default))]
    pub op2_extra: OperandExtra,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub addr: u16,
    pub bytes: Vec<u8>,
    pub mnemonic: Mnemonic,
    pub op1: Operand,
    pub op2: Operand,
}

impl Instruction {
    pub fn decode(event: &FetchEvent) -> Self {
        // Address arithmetic wraps at the top of the 64K space.
        let addr = event.next_addr.wrapping_sub(event.bytes.len() as u16);
        Self {
            addr,
            bytes: event.bytes.clone(),
            mnemonic: Mnemonic::from_id(event.mnemonic_id),
            op1: Operand::from_extra(OperandKind::from_id(event.op1_kind), &event.op1_extra),
            op2: Operand::from_extra(OperandKind::from_id(event.op2_kind), &event.op2_extra),
        }
    }

    /// Bytes the instruction occupies, never less than one so address walks
    /// always make progress.
    pub fn len(&self) -> usize {
        self.bytes.len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Instruction {
    /// `AAAA    bb bb bb bb    MNEM op1,op2`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}   ", self.addr)?;
        for b in &self.bytes {
            write!(f, " {:02x}", b)?;
        }
        for _ in self.bytes.len()..BYTE_COLUMNS {
            f.write_str("   ")?;
        }
        write!(f, "    {}", self.mnemonic.token())?;
        if !self.op1.is_none() {
            write!(f, "{}", self.op1)?;
        }
        if !self.op2.is_none() {
            write!(f, ",{}", self.op2)?;
        }
        Ok(())
    }
}
