// Z80 mnemonic table

/// Instruction mnemonics in the emulator's declaration order.
///
/// The numeric id delivered with every fetch event is the variant's
/// position in this list (`Unk` is 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Unk,
    Ld,
    Push,
    Pop,
    Ex,
    Exx,
    Ldi,
    Ldir,
    Ldd,
    Lddr,
    Cpi,
    Cpir,
    Cpd,
    Cpdr,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
    Inc,
    Dec,
    Daa,
    Cpl,
    Neg,
    Ccf,
    Scf,
    Nop,
    Halt,
    Di,
    Ei,
    Im0,
    Im1,
    Im2,
    Rlca,
    Rla,
    Rrca,
    Rra,
    Rlc,
    Rl,
    Rrc,
    Rr,
    Sla,
    Sra,
    Srl,
    Rld,
    Rrd,
    Bit,
    Set,
    Res,
    Jp,
    Jr,
    Djnz,
    Call,
    Ret,
    Reti,
    Retn,
    Rst00,
    Rst08,
    Rst10,
    Rst18,
    Rst20,
    Rst28,
    Rst30,
    Rst38,
    In,
    Ini,
    Inir,
    Ind,
    Indr,
    Out,
    Outi,
    Otir,
    Outd,
    Otdr,
}

const ALL: [Mnemonic; 77] = {
    use Mnemonic::*;
    [
        Unk, Ld, Push, Pop, Ex, Exx, Ldi, Ldir, Ldd, Lddr, Cpi, Cpir, Cpd, Cpdr, Add, Adc, Sub,
        Sbc, And, Or, Xor, Cp, Inc, Dec, Daa, Cpl, Neg, Ccf, Scf, Nop, Halt, Di, Ei, Im0, Im1,
        Im2, Rlca, Rla, Rrca, Rra, Rlc, Rl, Rrc, Rr, Sla, Sra, Srl, Rld, Rrd, Bit, Set, Res, Jp,
        Jr, Djnz, Call, Ret, Reti, Retn, Rst00, Rst08, Rst10, Rst18, Rst20, Rst28, Rst30, Rst38,
        In, Ini, Inir, Ind, Indr, Out, Outi, Otir, Outd, Otdr,
    ]
};

impl Mnemonic {
    /// Map an emulator mnemonic id. Ids past the end of the table decode as `Unk`.
    pub fn from_id(id: u8) -> Self {
        ALL.get(id as usize).copied().unwrap_or_else(|| {
            log::debug!("unknown mnemonic id {}", id);
            Mnemonic::Unk
        })
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Listing token. Plain mnemonics are padded to four columns; `IM` and
    /// `RST` carry their operand inside the token.
    pub fn token(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Unk => "UNK ",
            Ld => "LD  ",
            Push => "PUSH",
            Pop => "POP ",
            Ex => "EX  ",
            Exx => "EXX ",
            Ldi => "LDI ",
            Ldir => "LDIR",
            Ldd => "LDD ",
            Lddr => "LDDR",
            Cpi => "CPI ",
            Cpir => "CPIR",
            Cpd => "CPD ",
            Cpdr => "CPDR",
            Add => "ADD ",
            Adc => "ADC ",
            Sub => "SUB ",
            Sbc => "SBC ",
            And => "AND ",
            Or => "OR  ",
            Xor => "XOR ",
            Cp => "CP  ",
            Inc => "INC ",
            Dec => "DEC ",
            Daa => "DAA ",
            Cpl => "CPL ",
            Neg => "NEG ",
            Ccf => "CCF ",
            Scf => "SCF ",
            Nop => "NOP ",
            Halt => "HALT",
            Di => "DI  ",
            Ei => "EI  ",
            Im0 => "IM   0",
            Im1 => "IM   1",
            Im2 => "IM   2",
            Rlca => "RLCA",
            Rla => "RLA ",
            Rrca => "RRCA",
            Rra => "RRA ",
            Rlc => "RLC ",
            Rl => "RL  ",
            Rrc => "RRC ",
            Rr => "RR  ",
            Sla => "SLA ",
            Sra => "SRA ",
            Srl => "SRL ",
            Rld => "RLD ",
            Rrd => "RRD ",
            Bit => "BIT ",
            Set => "SET ",
            Res => "RES ",
            Jp => "JP  ",
            Jr => "JR  ",
            Djnz => "DJNZ",
            Call => "CALL",
            Ret => "RET ",
            Reti => "RETI",
            Retn => "RETN",
            Rst00 => "RST  00H",
            Rst08 => "RST  08H",
            Rst10 => "RST  10H",
            Rst18 => "RST  18H",
            Rst20 => "RST  20H",
            Rst28 => "RST  28H",
            Rst30 => "RST  30H",
            Rst38 => "RST  38H",
            In => "IN  ",
            Ini => "INI ",
            Inir => "INIR",
            Ind => "IND ",
            Indr => "INDR",
            Out => "OUT ",
            Outi => "OUTI",
            Otir => "OTIR",
            Outd => "OUTD",
            Otdr => "OTDR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_declaration_order() {
        for (i, m) in ALL.iter().enumerate() {
            assert_eq!(m.id() as usize, i);
            assert_eq!(Mnemonic::from_id(i as u8), *m);
        }
        assert_eq!(Mnemonic::from_id(1), Mnemonic::Ld);
        assert_eq!(Mnemonic::from_id(76), Mnemonic::Otdr);
    }

    #[test]
    fn out_of_range_id_is_unknown() {
        assert_eq!(Mnemonic::from_id(77), Mnemonic::Unk);
        assert_eq!(Mnemonic::from_id(0xFF), Mnemonic::Unk);
    }

    #[test]
    fn plain_tokens_are_four_wide() {
        for m in ALL {
            let t = m.token();
            match m {
                Mnemonic::Im0 | Mnemonic::Im1 | Mnemonic::Im2 => assert_eq!(t.len(), 6),
                Mnemonic::Rst00
                | Mnemonic::Rst08
                | Mnemonic::Rst10
                | Mnemonic::Rst18
                | Mnemonic::Rst20
                | Mnemonic::Rst28
                | Mnemonic::Rst30
                | Mnemonic::Rst38 => assert_eq!(t.len(), 8),
                _ => assert_eq!(t.len(), 4, "{:?}", m),
            }
        }
    }
}
