// Z80 operand kinds and their listing text

use std::fmt;

/// Every operand shape the emulator reports with a fetch event.
///
/// Raw ids arrive in the emulator's declaration order (`None` is 0), see
/// [`OperandKind::from_id`]. Ids outside the table keep their raw value in
/// `Unknown` so a partially understood trace still renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    None,
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    I,
    R,
    Byte,
    IndHl,
    IndBc,
    IndDe,
    IndSp,
    IndIx,
    IndIy,
    IndIxd,
    IndIyd,
    Addr,
    Bc,
    De,
    Hl,
    Sp,
    Ix,
    Ixl,
    Ixh,
    Iy,
    Iyl,
    Iyh,
    Af,
    AfAlt,
    Bit0,
    Bit1,
    Bit2,
    Bit3,
    Bit4,
    Bit5,
    Bit6,
    Bit7,
    Word,
    FlagNz,
    FlagZ,
    FlagNc,
    FlagC,
    FlagPo,
    FlagPe,
    FlagP,
    FlagM,
    Branch,
    PortB,
    PortC,
    PortD,
    PortE,
    PortH,
    PortL,
    PortA,
    PortByte,
    Unknown(u8),
}

const KNOWN: [OperandKind; 58] = {
    use OperandKind::*;
    [
        None, A, B, C, D, E, H, L, I, R, Byte, IndHl, IndBc, IndDe, IndSp, IndIx, IndIy, IndIxd,
        IndIyd, Addr, Bc, De, Hl, Sp, Ix, Ixl, Ixh, Iy, Iyl, Iyh, Af, AfAlt, Bit0, Bit1, Bit2,
        Bit3, Bit4, Bit5, Bit6, Bit7, Word, FlagNz, FlagZ, FlagNc, FlagC, FlagPo, FlagPe, FlagP,
        FlagM, Branch, PortB, PortC, PortD, PortE, PortH, PortL, PortA, PortByte,
    ]
};

/// Which slice of the per-operand payload a kind consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxClass {
    None,
    Byte,
    Displacement,
    Word,
    Branch,
}

impl AuxClass {
    /// Payload bytes the kind needs from the instruction stream.
    pub fn byte_len(self) -> usize {
        match self {
            AuxClass::None => 0,
            AuxClass::Byte | AuxClass::Displacement | AuxClass::Branch => 1,
            AuxClass::Word => 2,
        }
    }
}

impl OperandKind {
    pub fn from_id(id: u8) -> Self {
        KNOWN
            .get(id as usize)
            .copied()
            .unwrap_or(OperandKind::Unknown(id))
    }

    pub fn id(self) -> u8 {
        match self {
            OperandKind::Unknown(id) => id,
            kind => KNOWN.iter().position(|k| *k == kind).unwrap_or(0) as u8,
        }
    }

    pub fn aux_class(self) -> AuxClass {
        use OperandKind::*;
        match self {
            Byte | PortByte => AuxClass::Byte,
            IndIxd | IndIyd => AuxClass::Displacement,
            Addr | Word => AuxClass::Word,
            Branch => AuxClass::Branch,
            _ => AuxClass::None,
        }
    }

    /// Fixed text for kinds that carry no payload.
    fn fixed_text(self) -> Option<&'static str> {
        use OperandKind::*;
        let text = match self {
            A => "A",
            B => "B",
            C => "C",
            D => "D",
            E => "E",
            H => "H",
            L => "L",
            I => "I",
            R => "R",
            IndHl => "(HL)",
            IndBc => "(BC)",
            IndDe => "(DE)",
            IndSp => "(SP)",
            IndIx => "(IX)",
            IndIy => "(IY)",
            Bc => "BC",
            De => "DE",
            Hl => "HL",
            Sp => "SP",
            Ix => "IX",
            Ixl => "IXL",
            Ixh => "IXH",
            Iy => "IY",
            Iyl => "IYL",
            Iyh => "IYH",
            Af => "AF",
            AfAlt => "AF'",
            Bit0 => "0",
            Bit1 => "1",
            Bit2 => "2",
            Bit3 => "3",
            Bit4 => "4",
            Bit5 => "5",
            Bit6 => "6",
            Bit7 => "7",
            FlagNz => "NZ",
            FlagZ => "Z",
            FlagNc => "NC",
            FlagC => "C",
            FlagPo => "PO",
            FlagPe => "PE",
            FlagP => "P",
            FlagM => "M",
            PortB => "(B)",
            PortC => "(C)",
            PortD => "(D)",
            PortE => "(E)",
            PortH => "(H)",
            PortL => "(L)",
            PortA => "(A)",
            None | Byte | IndIxd | IndIyd | Addr | Word | Branch | PortByte | Unknown(_) => {
                return Option::None
            }
        };
        Some(text)
    }
}

/// Per-operand payload as delivered by the emulator. Only the field that
/// matches the operand's [`AuxClass`] is meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct OperandExtra {
    #[cfg_attr(feature = "cli", serde(default))]
    pub byte: u8,
    #[cfg_attr(feature = "cli", serde(default))]
    pub desp: i8,
    #[cfg_attr(feature = "cli", serde(default))]
    pub addr_word: u16,
    #[cfg_attr(feature = "cli", serde(default))]
    pub branch_desp: i8,
    #[cfg_attr(feature = "cli", serde(default))]
    pub branch_addr: u16,
}

/// The payload value kept with a decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxValue {
    Byte(u8),
    Displacement(i8),
    Word(u16),
    Branch { offset: i8, target: u16 },
}

/// One decoded operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub aux: Option<AuxValue>,
}

impl Operand {
    /// Keep exactly the payload the kind needs; `aux` is `None` for kinds
    /// without one.
    pub fn from_extra(kind: OperandKind, extra: &OperandExtra) -> Self {
        let aux = match kind.aux_class() {
            AuxClass::None => None,
            AuxClass::Byte => Some(AuxValue::Byte(extra.byte)),
            AuxClass::Displacement => Some(AuxValue::Displacement(extra.desp)),
            AuxClass::Word => Some(AuxValue::Word(extra.addr_word)),
            AuxClass::Branch => Some(AuxValue::Branch {
                offset: extra.branch_desp,
                target: extra.branch_addr,
            }),
        };
        Self { kind, aux }
    }

    pub fn is_none(&self) -> bool {
        self.kind == OperandKind::None
    }
}

impl fmt::Display for Operand {
    /// Operand text with its leading separator space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.kind.fixed_text() {
            return write!(f, " {}", text);
        }
        match (self.kind, self.aux) {
            (OperandKind::Byte, Some(AuxValue::Byte(b))) => write!(f, " {:02X}H", b),
            (OperandKind::PortByte, Some(AuxValue::Byte(b))) => write!(f, " ({:02X}H)", b),
            (OperandKind::IndIxd, Some(AuxValue::Displacement(d))) => write!(f, " (IX{:+})", d),
            (OperandKind::IndIyd, Some(AuxValue::Displacement(d))) => write!(f, " (IY{:+})", d),
            (OperandKind::Addr, Some(AuxValue::Word(w))) => write!(f, " ({:04X}H)", w),
            (OperandKind::Word, Some(AuxValue::Word(w))) => write!(f, " {:04X}H", w),
            (OperandKind::Branch, Some(AuxValue::Branch { offset, target })) => {
                write!(f, " ${:+} ({:04X}H)", offset, target)
            }
            (kind, _) => write!(f, "{}", kind.id()),
        }
    }
}
