use crate::tables::Slot::Text;
use crate::tables::{DIGITS, OpcodeRule, REGISTERS_8};

/// Rotate/shift operations for `CB 00`-`CB 3F`, in opcode order. `SLL` (`CB 30`-`CB 37`) is
/// undocumented and left without a rule.
const SHIFT_OPERATIONS: [Option<&str>; 8] =
    [Some("RLC"), Some("RRC"), Some("RL"), Some("RR"), Some("SLA"), Some("SRA"), None, Some("SRL")];

const BIT_OPERATIONS: [&str; 3] = ["BIT", "RES", "SET"];

pub(super) fn rules() -> Vec<(u8, OpcodeRule)> {
    let mut rules = Vec::with_capacity(248);

    for (i, operation) in (0_u8..).zip(SHIFT_OPERATIONS) {
        let Some(mnemonic) = operation else { continue };
        for (r, register) in (0_u8..).zip(REGISTERS_8) {
            rules.push(((i << 3) | r, OpcodeRule::new(mnemonic, &[Text(register)]).z80_only()));
        }
    }

    for (group, mnemonic) in (1_u8..).zip(BIT_OPERATIONS) {
        for (bit, digit) in (0_u8..).zip(DIGITS) {
            for (r, register) in (0_u8..).zip(REGISTERS_8) {
                let opcode = (group << 6) | (bit << 3) | r;
                let rule = OpcodeRule::new(mnemonic, &[Text(digit), Text(register)]).z80_only();
                rules.push((opcode, rule));
            }
        }
    }

    rules
}
