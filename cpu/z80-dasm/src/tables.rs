//! Opcode dispatch tables.
//!
//! Every table is a fixed 256-entry array indexed directly by opcode byte. An empty entry is the
//! explicit "no rule" case; the driver decides how to degrade when it sees one. Tables are built
//! once from declarative rule lists and layered: later layers override earlier ones.

mod cb;
mod ed;
mod unprefixed;

use crate::arch::{Architecture, Support};
use crate::instruction::{Instruction, Operand, Target};
use crate::target;
use std::sync::LazyLock;

pub(crate) const REGISTERS_8: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
pub(crate) const REGISTER_PAIRS_SP: [&str; 4] = ["BC", "DE", "HL", "SP"];
pub(crate) const REGISTER_PAIRS_AF: [&str; 4] = ["BC", "DE", "HL", "AF"];
pub(crate) const CONDITIONS: [&str; 8] = ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"];
pub(crate) const DIGITS: [&str; 8] = ["0", "1", "2", "3", "4", "5", "6", "7"];

/// One operand position in an encoding template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Text(&'static str),
    Immediate8,
    Immediate16,
    Port,
    Direct,
    /// 16-bit absolute control-flow target (`JP nn`, `CALL nn`)
    Absolute,
    /// 8-bit signed displacement (`JR e`, `DJNZ e`)
    Relative,
    /// Restart vector encoded in the opcode itself; consumes no operand bytes
    Vector(u8),
}

impl Slot {
    fn operand_len(self) -> usize {
        match self {
            Self::Text(_) | Self::Vector(_) => 0,
            Self::Immediate8 | Self::Port | Self::Relative => 1,
            Self::Immediate16 | Self::Direct | Self::Absolute => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeRule {
    pub mnemonic: &'static str,
    pub slots: Vec<Slot>,
    pub support: Support,
    pub io: bool,
}

impl OpcodeRule {
    #[must_use]
    pub fn new(mnemonic: &'static str, slots: &[Slot]) -> Self {
        Self { mnemonic, slots: slots.to_vec(), support: Support::ALL, io: false }
    }

    #[must_use]
    pub fn z80_only(self) -> Self {
        Self { support: Support::Z80_ONLY, ..self }
    }

    #[must_use]
    pub fn i8085_only(self) -> Self {
        Self { support: Support::I8085_ONLY, ..self }
    }

    #[must_use]
    pub fn io(self) -> Self {
        Self { io: true, ..self }
    }

    /// Total encoded length, including `opcode_len` opcode/prefix bytes.
    #[must_use]
    pub fn encoded_len(&self, opcode_len: usize) -> usize {
        opcode_len + self.slots.iter().map(|slot| slot.operand_len()).sum::<usize>()
    }

    /// Decode the instruction starting at `buffer[offset]`. Never reads past the end of `buffer`.
    #[must_use]
    pub fn decode(&self, buffer: &[u8], offset: usize, opcode_len: usize) -> Decode {
        let len = self.encoded_len(opcode_len);
        let Some(bytes) = offset.checked_add(len).and_then(|end| buffer.get(offset..end)) else {
            return Decode::Truncated;
        };

        let mut operands = Vec::with_capacity(self.slots.len());
        let mut target = None;
        let mut i = opcode_len;
        for &slot in &self.slots {
            match slot {
                Slot::Text(text) => operands.push(Operand::Text(text)),
                Slot::Immediate8 => operands.push(Operand::Immediate8(bytes[i])),
                Slot::Port => operands.push(Operand::Port(bytes[i])),
                Slot::Immediate16 => operands.push(Operand::Immediate16(read_u16(bytes, i))),
                Slot::Direct => operands.push(Operand::Direct(read_u16(bytes, i))),
                Slot::Absolute => {
                    target = Some(Target::Absolute(read_u16(bytes, i)));
                    operands.push(Operand::Target);
                }
                Slot::Relative => {
                    // Offsets beyond the 16-bit address space wrap like any other address
                    let calculated = target::calculate_target(offset as u16, bytes[i]);
                    target = Some(Target::Offset(calculated));
                    operands.push(Operand::Target);
                }
                Slot::Vector(vector) => {
                    target = Some(Target::Absolute(vector.into()));
                    operands.push(Operand::Vector);
                }
            }
            i += slot.operand_len();
        }

        let mut instruction = Instruction::new(self.mnemonic, operands, bytes)
            .with_support(self.support)
            .with_io(self.io);
        if let Some(target) = target {
            instruction = instruction.with_target(target);
        }

        Decode::Instruction(instruction)
    }
}

fn read_u16(bytes: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([bytes[i], bytes[i + 1]])
}

/// Outcome of a single table or prefix dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decode {
    Instruction(Instruction),
    /// Opcode family that is recognized but deliberately left undecoded
    NotImplemented(Instruction),
    /// No rule registered for this byte
    Absent,
    /// A rule matched but the buffer ends before the instruction does
    Truncated,
}

#[derive(Debug, Clone)]
pub struct OpcodeTable {
    rules: [Option<OpcodeRule>; 256],
    /// Number of bytes up to and including the byte the table is keyed by
    opcode_len: usize,
}

static Z80_TABLE: LazyLock<OpcodeTable> = LazyLock::new(|| {
    OpcodeTable::from_layers(1, [unprefixed::common(), unprefixed::z80_extensions()])
});

static I8080_TABLE: LazyLock<OpcodeTable> = LazyLock::new(|| {
    OpcodeTable::from_layers(
        1,
        [unprefixed::common(), unprefixed::z80_extensions(), unprefixed::i8085_extensions()],
    )
});

static I8085_TABLE: LazyLock<OpcodeTable> = LazyLock::new(|| {
    OpcodeTable::from_layers(
        1,
        [unprefixed::common(), unprefixed::z80_extensions(), unprefixed::i8085_extensions()],
    )
});

static CB_TABLE: LazyLock<OpcodeTable> =
    LazyLock::new(|| OpcodeTable::from_layers(2, [cb::rules()]));

static ED_TABLE: LazyLock<OpcodeTable> =
    LazyLock::new(|| OpcodeTable::from_layers(2, [ed::rules()]));

impl OpcodeTable {
    fn from_layers<const N: usize>(opcode_len: usize, layers: [Vec<(u8, OpcodeRule)>; N]) -> Self {
        let mut rules = std::array::from_fn(|_| None);
        for layer in layers {
            for (opcode, rule) in layer {
                rules[usize::from(opcode)] = Some(rule);
            }
        }

        Self { rules, opcode_len }
    }

    /// Primary opcode table for the given architecture. Prefix bytes are never present here.
    #[must_use]
    pub fn for_architecture(architecture: Architecture) -> &'static Self {
        match architecture {
            Architecture::Z80 => &Z80_TABLE,
            Architecture::I8080 => &I8080_TABLE,
            Architecture::I8085 => &I8085_TABLE,
        }
    }

    /// Secondary table for `CB`-prefixed Z80 opcodes, keyed by the byte after the prefix.
    #[must_use]
    pub fn cb_prefixed() -> &'static Self {
        &CB_TABLE
    }

    /// Secondary table for `ED`-prefixed Z80 opcodes, keyed by the byte after the prefix.
    #[must_use]
    pub fn ed_prefixed() -> &'static Self {
        &ED_TABLE
    }

    #[inline]
    #[must_use]
    pub fn rule(&self, opcode: u8) -> Option<&OpcodeRule> {
        self.rules[usize::from(opcode)].as_ref()
    }

    /// Look up and decode the instruction at `buffer[offset]`.
    ///
    /// Returns [`Decode::Truncated`] if the buffer ends before the table's key byte.
    #[must_use]
    pub fn decode(&self, buffer: &[u8], offset: usize) -> Decode {
        let Some(&opcode) = buffer.get(offset + self.opcode_len - 1) else {
            return Decode::Truncated;
        };

        match self.rule(opcode) {
            Some(rule) => rule.decode(buffer, offset, self.opcode_len),
            None => Decode::Absent,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.iter().filter(|rule| rule.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
