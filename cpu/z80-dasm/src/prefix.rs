//! Z80 opcode prefix resolution.
//!
//! A prefix byte switches decoding to a secondary table keyed by the byte that follows it. `CB` and
//! `ED` have secondary tables; the indexed-register prefixes `DD` and `FD` are recognized but not
//! decoded, and consume only the prefix byte itself.

use crate::arch::Support;
use crate::instruction::{Instruction, Operand};
use crate::tables::{Decode, OpcodeTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Cb,
    Dd,
    Ed,
    Fd,
}

impl Prefix {
    pub const ALL: [Self; 4] = [Self::Cb, Self::Dd, Self::Ed, Self::Fd];

    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xCB => Some(Self::Cb),
            0xDD => Some(Self::Dd),
            0xED => Some(Self::Ed),
            0xFD => Some(Self::Fd),
            _ => None,
        }
    }

    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            Self::Cb => 0xCB,
            Self::Dd => 0xDD,
            Self::Ed => 0xED,
            Self::Fd => 0xFD,
        }
    }

    fn secondary_table(self) -> Option<&'static OpcodeTable> {
        match self {
            Self::Cb => Some(OpcodeTable::cb_prefixed()),
            Self::Ed => Some(OpcodeTable::ed_prefixed()),
            Self::Dd | Self::Fd => None,
        }
    }

    fn index_register(self) -> Option<&'static str> {
        match self {
            Self::Dd => Some("IX"),
            Self::Fd => Some("IY"),
            Self::Cb | Self::Ed => None,
        }
    }

    /// Decode the prefixed instruction whose prefix byte is at `buffer[offset]`.
    ///
    /// Unrecognized secondary bytes decode as a 2-byte data declaration so that decoding stays in
    /// sync with the instruction stream. Returns [`Decode::Truncated`] if the prefix is the last
    /// byte of the buffer or if a recognized instruction runs past the end.
    #[must_use]
    pub fn resolve(self, buffer: &[u8], offset: usize) -> Decode {
        if let Some(register) = self.index_register() {
            log::trace!("Leaving {:02X} prefix at offset {offset:04X} undecoded", self.byte());
            return Decode::NotImplemented(Instruction::data_byte(
                self.byte(),
                format!("{register} extended instruction, not decoded"),
            ));
        }

        let Some(table) = self.secondary_table() else { return Decode::Absent };
        match table.decode(buffer, offset) {
            Decode::Absent => {
                let Some(&opcode) = buffer.get(offset + 1) else { return Decode::Truncated };
                log::trace!(
                    "Unrecognized {:02X}-prefixed opcode {opcode:02X} at offset {offset:04X}",
                    self.byte()
                );
                Decode::Instruction(self.unrecognized(opcode))
            }
            decode => decode,
        }
    }

    fn unrecognized(self, opcode: u8) -> Instruction {
        let prefix = self.byte();
        Instruction::new(
            "DB",
            vec![Operand::Immediate8(prefix), Operand::Immediate8(opcode)],
            &[prefix, opcode],
        )
        .with_support(Support::NONE)
        .with_comment(format!("Unrecognized {prefix:02X}-prefixed opcode"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn prefix_bytes() {
        for prefix in Prefix::ALL {
            assert_eq!(Prefix::from_byte(prefix.byte()), Some(prefix));
        }
        assert_eq!(Prefix::from_byte(0x00), None);
        assert_eq!(Prefix::from_byte(0xC3), None);
    }

    #[test]
    fn index_prefixes_are_placeholders() {
        let Decode::NotImplemented(ix) = Prefix::Dd.resolve(&[0xDD, 0x21, 0x00, 0x40], 0) else {
            panic!()
        };
        assert_eq!(ix.to_string(), "DB $DD");
        assert_eq!(ix.size(), 1);
        assert_eq!(ix.comment(), Some("IX extended instruction, not decoded"));

        // Consumes only the prefix even when it is the last byte
        let Decode::NotImplemented(iy) = Prefix::Fd.resolve(&[0x00, 0xFD], 1) else { panic!() };
        assert_eq!(iy.raw_bytes(), &[0xFD]);
        assert_eq!(iy.comment(), Some("IY extended instruction, not decoded"));
    }

    #[test]
    fn recognized_secondary_opcodes() {
        let Decode::Instruction(bit) = Prefix::Cb.resolve(&[0xCB, 0x7E], 0) else { panic!() };
        assert_eq!(bit.to_string(), "BIT 7, (HL)");
        assert_eq!(bit.size(), 2);

        let Decode::Instruction(ld) = Prefix::Ed.resolve(&[0x00, 0xED, 0x73, 0x00, 0xF0], 1) else {
            panic!()
        };
        assert_eq!(ld.to_string(), "LD ($F000), SP");
        assert_eq!(ld.size(), 4);
    }

    #[test]
    fn unrecognized_secondary_opcode_consumes_two_bytes() {
        let Decode::Instruction(ed) = Prefix::Ed.resolve(&[0xED, 0xFF, 0x00], 0) else { panic!() };
        assert_eq!(ed.to_string(), "DB $ED, $FF");
        assert_eq!(ed.size(), 2);
        assert_eq!(ed.support(), Support::NONE);
        assert_eq!(ed.comment(), Some("Unrecognized ED-prefixed opcode"));

        let Decode::Instruction(sll) = Prefix::Cb.resolve(&[0xCB, 0x37], 0) else { panic!() };
        assert_eq!(sll.to_string(), "DB $CB, $37");
        assert_eq!(sll.comment(), Some("Unrecognized CB-prefixed opcode"));
    }

    #[test]
    fn truncated_prefixed_instructions() {
        assert_eq!(Prefix::Cb.resolve(&[0xCB], 0), Decode::Truncated);
        assert_eq!(Prefix::Ed.resolve(&[0x00, 0xED], 1), Decode::Truncated);
        assert_eq!(Prefix::Ed.resolve(&[0xED, 0x4B, 0x00], 0), Decode::Truncated);
    }
}
