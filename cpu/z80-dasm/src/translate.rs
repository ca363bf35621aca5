//! Z80 to Intel 8080/8085 syntax translation.
//!
//! Instructions are always decoded in Z80 syntax. When disassembling for the 8080 or 8085, each
//! instruction that has an Intel spelling is rewritten to it. Instructions that only exist on the
//! Z80 are left alone; they already carry a compatibility warning.

use crate::instruction::{Instruction, Operand};
use crate::tables::{CONDITIONS, DIGITS, REGISTERS_8};

const JUMP_CONDITIONAL: [&str; 8] = ["JNZ", "JZ", "JNC", "JC", "JPO", "JPE", "JP", "JM"];
const CALL_CONDITIONAL: [&str; 8] = ["CNZ", "CZ", "CNC", "CC", "CPO", "CPE", "CP", "CM"];
const RETURN_CONDITIONAL: [&str; 8] = ["RNZ", "RZ", "RNC", "RC", "RPO", "RPE", "RP", "RM"];

/// Register and register pair names in Intel syntax.
fn intel_register(register: &'static str) -> &'static str {
    match register {
        "(HL)" => "M",
        "BC" => "B",
        "DE" => "D",
        "HL" => "H",
        "AF" => "PSW",
        _ => register,
    }
}

fn is_register_8(text: &str) -> bool {
    REGISTERS_8.contains(&text)
}

fn conditional(mnemonics: &[&'static str; 8], condition: &str) -> Option<&'static str> {
    let i = CONDITIONS.iter().position(|&cc| cc == condition)?;
    Some(mnemonics[i])
}

/// Intel spellings of an 8-bit ALU operation: (register form, immediate form).
fn alu_mnemonics(mnemonic: &str) -> Option<(&'static str, &'static str)> {
    let pair = match mnemonic {
        "ADD" => ("ADD", "ADI"),
        "ADC" => ("ADC", "ACI"),
        "SUB" => ("SUB", "SUI"),
        "SBC" => ("SBB", "SBI"),
        "AND" => ("ANA", "ANI"),
        "XOR" => ("XRA", "XRI"),
        "OR" => ("ORA", "ORI"),
        "CP" => ("CMP", "CPI"),
        _ => return None,
    };
    Some(pair)
}

fn implied(mnemonic: &str) -> Option<&'static str> {
    let intel = match mnemonic {
        "RLCA" => "RLC",
        "RRCA" => "RRC",
        "RLA" => "RAL",
        "RRA" => "RAR",
        "CPL" => "CMA",
        "SCF" => "STC",
        "CCF" => "CMC",
        "HALT" => "HLT",
        _ => return None,
    };
    Some(intel)
}

fn translate_ld(operands: &[Operand]) -> Option<(&'static str, Vec<Operand>)> {
    use Operand::{Direct, Immediate8, Immediate16, Text};

    let translated = match *operands {
        [Text("A"), Text(pair @ ("(BC)" | "(DE)"))] => {
            ("LDAX", vec![Text(intel_register(&pair[1..3]))])
        }
        [Text(pair @ ("(BC)" | "(DE)")), Text("A")] => {
            ("STAX", vec![Text(intel_register(&pair[1..3]))])
        }
        [Text("SP"), Text("HL")] => ("SPHL", vec![]),
        [Text(dst), Text(src)] if is_register_8(dst) && is_register_8(src) => {
            ("MOV", vec![Text(intel_register(dst)), Text(intel_register(src))])
        }
        [Text(register), Immediate8(value)] => {
            ("MVI", vec![Text(intel_register(register)), Immediate8(value)])
        }
        [Text(pair), Immediate16(value)] => {
            ("LXI", vec![Text(intel_register(pair)), Immediate16(value)])
        }
        [Text("A"), Direct(address)] => ("LDA", vec![Immediate16(address)]),
        [Direct(address), Text("A")] => ("STA", vec![Immediate16(address)]),
        [Text("HL"), Direct(address)] => ("LHLD", vec![Immediate16(address)]),
        [Direct(address), Text("HL")] => ("SHLD", vec![Immediate16(address)]),
        _ => return None,
    };
    Some(translated)
}

/// The Intel spelling of a Z80-syntax instruction, if it has one.
#[must_use]
pub fn intel_syntax(instruction: &Instruction) -> Option<(&'static str, Vec<Operand>)> {
    use Operand::{Immediate8, Port, Target, Text, Vector};

    let mnemonic = instruction.mnemonic();
    let operands = instruction.operands();

    if let Some(intel) = implied(mnemonic)
        && operands.is_empty()
    {
        return Some((intel, vec![]));
    }

    if let Some((register_form, immediate_form)) = alu_mnemonics(mnemonic) {
        // Intel syntax never names the accumulator
        let source = match operands {
            [Text("A"), source] if mnemonic != "SUB" => source,
            [source] if !matches!(mnemonic, "ADD" | "ADC" | "SBC") => source,
            [Text("HL"), Text(pair)] if mnemonic == "ADD" => {
                return Some(("DAD", vec![Text(intel_register(*pair))]));
            }
            _ => return None,
        };

        return match *source {
            Text(register) if is_register_8(register) => {
                Some((register_form, vec![Text(intel_register(register))]))
            }
            Immediate8(value) => Some((immediate_form, vec![Immediate8(value)])),
            _ => None,
        };
    }

    let translated = match (mnemonic, operands) {
        ("LD", _) => return translate_ld(operands),
        ("EX", [Text("DE"), Text("HL")]) => ("XCHG", vec![]),
        ("EX", [Text("(SP)"), Text("HL")]) => ("XTHL", vec![]),
        ("JP", [Target]) => ("JMP", vec![Target]),
        ("JP", [Text("(HL)")]) => ("PCHL", vec![]),
        ("JP", [Text(condition), Target]) => {
            (conditional(&JUMP_CONDITIONAL, condition)?, vec![Target])
        }
        ("CALL", [Text(condition), Target]) => {
            (conditional(&CALL_CONDITIONAL, condition)?, vec![Target])
        }
        ("RET", [Text(condition)]) => (conditional(&RETURN_CONDITIONAL, condition)?, vec![]),
        ("RST", [Vector]) => {
            let vector = instruction.target_address()?;
            ("RST", vec![Text(DIGITS[usize::from(vector >> 3) & 7])])
        }
        ("INC", [Text(register)]) if is_register_8(register) => {
            ("INR", vec![Text(intel_register(*register))])
        }
        ("DEC", [Text(register)]) if is_register_8(register) => {
            ("DCR", vec![Text(intel_register(*register))])
        }
        ("INC", [Text(pair)]) => ("INX", vec![Text(intel_register(*pair))]),
        ("DEC", [Text(pair)]) => ("DCX", vec![Text(intel_register(*pair))]),
        ("PUSH" | "POP", [Text(pair)]) => (mnemonic, vec![Text(intel_register(*pair))]),
        ("IN", [Text("A"), Port(port)]) => ("IN", vec![Immediate8(*port)]),
        ("OUT", [Port(port), Text("A")]) => ("OUT", vec![Immediate8(*port)]),
        _ => return None,
    };
    Some(translated)
}

/// Rewrite `instruction` into Intel syntax.
///
/// If the spelling changes, the Z80 form is preserved in a comment and the Z80 mnemonic is kept as
/// the instruction's alternate mnemonic. Returns whether anything changed.
pub fn translate(instruction: &mut Instruction) -> bool {
    let Some((mnemonic, operands)) = intel_syntax(instruction) else { return false };
    if mnemonic == instruction.mnemonic() && operands.as_slice() == instruction.operands() {
        return false;
    }

    let original = instruction.to_string();
    instruction.translate(mnemonic, operands);
    instruction.append_comment(&format!("Z80: {original}"));

    true
}
