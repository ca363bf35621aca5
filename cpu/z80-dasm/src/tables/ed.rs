use crate::tables::Slot::{Direct, Text};
use crate::tables::{OpcodeRule, REGISTER_PAIRS_SP, REGISTERS_8};

/// Documented `ED`-prefixed opcodes. Everything else under `ED` is left without a rule.
pub(super) fn rules() -> Vec<(u8, OpcodeRule)> {
    let mut rules = vec![
        (0x44, OpcodeRule::new("NEG", &[])),
        (0x45, OpcodeRule::new("RETN", &[])),
        (0x46, OpcodeRule::new("IM", &[Text("0")])),
        (0x47, OpcodeRule::new("LD", &[Text("I"), Text("A")])),
        (0x4D, OpcodeRule::new("RETI", &[])),
        (0x4F, OpcodeRule::new("LD", &[Text("R"), Text("A")])),
        (0x56, OpcodeRule::new("IM", &[Text("1")])),
        (0x57, OpcodeRule::new("LD", &[Text("A"), Text("I")])),
        (0x5E, OpcodeRule::new("IM", &[Text("2")])),
        (0x5F, OpcodeRule::new("LD", &[Text("A"), Text("R")])),
        (0x67, OpcodeRule::new("RRD", &[])),
        (0x6F, OpcodeRule::new("RLD", &[])),
        (0xA0, OpcodeRule::new("LDI", &[])),
        (0xA1, OpcodeRule::new("CPI", &[])),
        (0xA2, OpcodeRule::new("INI", &[]).io()),
        (0xA3, OpcodeRule::new("OUTI", &[]).io()),
        (0xA8, OpcodeRule::new("LDD", &[])),
        (0xA9, OpcodeRule::new("CPD", &[])),
        (0xAA, OpcodeRule::new("IND", &[]).io()),
        (0xAB, OpcodeRule::new("OUTD", &[]).io()),
        (0xB0, OpcodeRule::new("LDIR", &[])),
        (0xB1, OpcodeRule::new("CPIR", &[])),
        (0xB2, OpcodeRule::new("INIR", &[]).io()),
        (0xB3, OpcodeRule::new("OTIR", &[]).io()),
        (0xB8, OpcodeRule::new("LDDR", &[])),
        (0xB9, OpcodeRule::new("CPDR", &[])),
        (0xBA, OpcodeRule::new("INDR", &[]).io()),
        (0xBB, OpcodeRule::new("OTDR", &[]).io()),
    ];

    for (i, register) in (0_u8..).zip(REGISTERS_8) {
        // ED 70 / ED 71 would be the undocumented IN (C) / OUT (C),0
        if register == "(HL)" {
            continue;
        }

        let base = 0x40 | (i << 3);
        rules.extend([
            (base, OpcodeRule::new("IN", &[Text(register), Text("(C)")]).io()),
            (base | 0x01, OpcodeRule::new("OUT", &[Text("(C)"), Text(register)]).io()),
        ]);
    }

    for (i, pair) in (0_u8..).zip(REGISTER_PAIRS_SP) {
        let base = 0x40 | (i << 4);
        rules.extend([
            (base | 0x02, OpcodeRule::new("SBC", &[Text("HL"), Text(pair)])),
            (base | 0x03, OpcodeRule::new("LD", &[Direct, Text(pair)])),
            (base | 0x0A, OpcodeRule::new("ADC", &[Text("HL"), Text(pair)])),
            (base | 0x0B, OpcodeRule::new("LD", &[Text(pair), Direct])),
        ]);
    }

    rules.into_iter().map(|(opcode, rule)| (opcode, rule.z80_only())).collect()
}
