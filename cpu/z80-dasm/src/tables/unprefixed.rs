use crate::tables::Slot::{Absolute, Direct, Immediate8, Immediate16, Port, Relative, Text, Vector};
use crate::tables::{CONDITIONS, OpcodeRule, REGISTER_PAIRS_AF, REGISTER_PAIRS_SP, REGISTERS_8};

/// 8-bit ALU operations in opcode order (`0x80 + 8k + r`, `0xC6 + 8k`). The flag marks operations
/// that spell out the accumulator as the first operand in Z80 syntax.
const ALU_OPERATIONS: [(&str, bool); 8] = [
    ("ADD", true),
    ("ADC", true),
    ("SUB", false),
    ("SBC", true),
    ("AND", false),
    ("XOR", false),
    ("OR", false),
    ("CP", false),
];

/// Unprefixed opcodes that are legal on the Z80, 8080 and 8085 alike.
pub(super) fn common() -> Vec<(u8, OpcodeRule)> {
    let mut rules = vec![
        (0x00, OpcodeRule::new("NOP", &[])),
        (0x02, OpcodeRule::new("LD", &[Text("(BC)"), Text("A")])),
        (0x07, OpcodeRule::new("RLCA", &[])),
        (0x0A, OpcodeRule::new("LD", &[Text("A"), Text("(BC)")])),
        (0x0F, OpcodeRule::new("RRCA", &[])),
        (0x12, OpcodeRule::new("LD", &[Text("(DE)"), Text("A")])),
        (0x17, OpcodeRule::new("RLA", &[])),
        (0x1A, OpcodeRule::new("LD", &[Text("A"), Text("(DE)")])),
        (0x1F, OpcodeRule::new("RRA", &[])),
        (0x22, OpcodeRule::new("LD", &[Direct, Text("HL")])),
        (0x27, OpcodeRule::new("DAA", &[])),
        (0x2A, OpcodeRule::new("LD", &[Text("HL"), Direct])),
        (0x2F, OpcodeRule::new("CPL", &[])),
        (0x32, OpcodeRule::new("LD", &[Direct, Text("A")])),
        (0x37, OpcodeRule::new("SCF", &[])),
        (0x3A, OpcodeRule::new("LD", &[Text("A"), Direct])),
        (0x3F, OpcodeRule::new("CCF", &[])),
        (0x76, OpcodeRule::new("HALT", &[])),
        (0xC3, OpcodeRule::new("JP", &[Absolute])),
        (0xC9, OpcodeRule::new("RET", &[])),
        (0xCD, OpcodeRule::new("CALL", &[Absolute])),
        (0xD3, OpcodeRule::new("OUT", &[Port, Text("A")]).io()),
        (0xDB, OpcodeRule::new("IN", &[Text("A"), Port]).io()),
        (0xE3, OpcodeRule::new("EX", &[Text("(SP)"), Text("HL")])),
        (0xE9, OpcodeRule::new("JP", &[Text("(HL)")])),
        (0xEB, OpcodeRule::new("EX", &[Text("DE"), Text("HL")])),
        (0xF3, OpcodeRule::new("DI", &[])),
        (0xF9, OpcodeRule::new("LD", &[Text("SP"), Text("HL")])),
        (0xFB, OpcodeRule::new("EI", &[])),
    ];

    for (i, pair) in (0_u8..).zip(REGISTER_PAIRS_SP) {
        let base = i << 4;
        rules.extend([
            (base | 0x01, OpcodeRule::new("LD", &[Text(pair), Immediate16])),
            (base | 0x03, OpcodeRule::new("INC", &[Text(pair)])),
            (base | 0x09, OpcodeRule::new("ADD", &[Text("HL"), Text(pair)])),
            (base | 0x0B, OpcodeRule::new("DEC", &[Text(pair)])),
        ]);
    }

    for (i, pair) in (0_u8..).zip(REGISTER_PAIRS_AF) {
        let base = 0xC0 | (i << 4);
        rules.extend([
            (base | 0x01, OpcodeRule::new("POP", &[Text(pair)])),
            (base | 0x05, OpcodeRule::new("PUSH", &[Text(pair)])),
        ]);
    }

    for (i, register) in (0_u8..).zip(REGISTERS_8) {
        let base = i << 3;
        rules.extend([
            (base | 0x04, OpcodeRule::new("INC", &[Text(register)])),
            (base | 0x05, OpcodeRule::new("DEC", &[Text(register)])),
            (base | 0x06, OpcodeRule::new("LD", &[Text(register), Immediate8])),
        ]);
    }

    // 0x40-0x7F: register-to-register moves, except for 0x76 (LD (HL),(HL)) which is HALT
    for (dst_i, dst) in (0_u8..).zip(REGISTERS_8) {
        for (src_i, src) in (0_u8..).zip(REGISTERS_8) {
            let opcode = 0x40 | (dst_i << 3) | src_i;
            if opcode != 0x76 {
                rules.push((opcode, OpcodeRule::new("LD", &[Text(dst), Text(src)])));
            }
        }
    }

    for (i, (mnemonic, explicit_a)) in (0_u8..).zip(ALU_OPERATIONS) {
        for (src_i, src) in (0_u8..).zip(REGISTERS_8) {
            let opcode = 0x80 | (i << 3) | src_i;
            let rule = if explicit_a {
                OpcodeRule::new(mnemonic, &[Text("A"), Text(src)])
            } else {
                OpcodeRule::new(mnemonic, &[Text(src)])
            };
            rules.push((opcode, rule));
        }

        let immediate = if explicit_a {
            OpcodeRule::new(mnemonic, &[Text("A"), Immediate8])
        } else {
            OpcodeRule::new(mnemonic, &[Immediate8])
        };
        rules.push((0xC6 | (i << 3), immediate));
    }

    for (i, condition) in (0_u8..).zip(CONDITIONS) {
        let base = 0xC0 | (i << 3);
        rules.extend([
            (base, OpcodeRule::new("RET", &[Text(condition)])),
            (base | 0x02, OpcodeRule::new("JP", &[Text(condition), Absolute])),
            (base | 0x04, OpcodeRule::new("CALL", &[Text(condition), Absolute])),
        ]);
    }

    for i in 0_u8..8 {
        rules.push((0xC7 | (i << 3), OpcodeRule::new("RST", &[Vector(i << 3)])));
    }

    rules
}

/// Unprefixed opcodes that only the Z80 implements.
pub(super) fn z80_extensions() -> Vec<(u8, OpcodeRule)> {
    vec![
        (0x08, OpcodeRule::new("EX", &[Text("AF"), Text("AF'")]).z80_only()),
        (0x10, OpcodeRule::new("DJNZ", &[Relative]).z80_only()),
        (0x18, OpcodeRule::new("JR", &[Relative]).z80_only()),
        (0x20, OpcodeRule::new("JR", &[Text("NZ"), Relative]).z80_only()),
        (0x28, OpcodeRule::new("JR", &[Text("Z"), Relative]).z80_only()),
        (0x30, OpcodeRule::new("JR", &[Text("NC"), Relative]).z80_only()),
        (0x38, OpcodeRule::new("JR", &[Text("C"), Relative]).z80_only()),
        (0xD9, OpcodeRule::new("EXX", &[]).z80_only()),
    ]
}

/// The 8085's additions over the 8080. These occupy two of the Z80's relative jump opcodes.
pub(super) fn i8085_extensions() -> Vec<(u8, OpcodeRule)> {
    vec![
        (0x20, OpcodeRule::new("RIM", &[]).i8085_only()),
        (0x30, OpcodeRule::new("SIM", &[]).i8085_only()),
    ]
}
