use serde::Serialize;
use z80_dasm::{Architecture, DecodedEntry, Disassembly};

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    address: u16,
    bytes: &'a [u8],
    mnemonic: &'static str,
    operands: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    z80_mnemonic: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "<[u16]>::is_empty")]
    references: &'a [u16],
}

impl<'a> From<&'a DecodedEntry> for JsonEntry<'a> {
    fn from(entry: &'a DecodedEntry) -> Self {
        let instruction = &entry.instruction;
        Self {
            address: entry.address,
            bytes: instruction.raw_bytes(),
            mnemonic: instruction.mnemonic(),
            operands: instruction.operand_text(),
            z80_mnemonic: instruction.alternate_mnemonic(),
            comment: instruction.comment(),
            label: entry.label_info.as_ref().map(|info| info.label.as_str()),
            references: entry
                .label_info
                .as_ref()
                .map_or(&[][..], |info| info.referenced_from.as_slice()),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonLabel<'a> {
    address: u16,
    label: &'a str,
    in_image: bool,
}

#[derive(Debug, Serialize)]
struct JsonDisassembly<'a> {
    architecture: Architecture,
    origin: u16,
    length: usize,
    entries: Vec<JsonEntry<'a>>,
    labels: Vec<JsonLabel<'a>>,
}

pub fn to_json(disassembly: &Disassembly) -> serde_json::Result<String> {
    let labels = disassembly
        .labels()
        .iter()
        .map(|(&address, info)| JsonLabel {
            address,
            label: &info.label,
            in_image: disassembly.contains_address(address),
        })
        .collect();

    serde_json::to_string_pretty(&JsonDisassembly {
        architecture: disassembly.architecture(),
        origin: disassembly.origin(),
        length: disassembly.len(),
        entries: disassembly.entries().iter().map(JsonEntry::from).collect(),
        labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use z80_dasm::disassemble;

    #[test]
    fn entries_and_labels() {
        let binary = [0x18, 0xFE, 0xCD, 0x00, 0x10];
        let disassembly = disassemble(&binary, 0x0000, Architecture::Z80).unwrap();
        let value: Value = serde_json::from_str(&to_json(&disassembly).unwrap()).unwrap();

        assert_eq!(value["architecture"], json!("Z80"));
        assert_eq!(value["length"], json!(5));
        assert_eq!(
            value["entries"][0],
            json!({
                "address": 0,
                "bytes": [0x18, 0xFE],
                "mnemonic": "JR",
                "operands": "R_0000",
                "label": "R_0000",
                "references": [0],
            })
        );
        assert_eq!(
            value["entries"][1],
            json!({
                "address": 2,
                "bytes": [0xCD, 0x00, 0x10],
                "mnemonic": "CALL",
                "operands": "$1000",
            })
        );
        assert_eq!(
            value["labels"],
            json!([
                { "address": 0, "label": "R_0000", "in_image": true },
                { "address": 0x1000, "label": "S_1000", "in_image": false },
            ])
        );
    }

    #[test]
    fn translated_entries_keep_z80_mnemonic() {
        let disassembly = disassemble(&[0x76], 0x0000, Architecture::I8080).unwrap();
        let value: Value = serde_json::from_str(&to_json(&disassembly).unwrap()).unwrap();

        assert_eq!(value["architecture"], json!("I8080"));
        assert_eq!(value["entries"][0]["mnemonic"], json!("HLT"));
        assert_eq!(value["entries"][0]["z80_mnemonic"], json!("HALT"));
        assert_eq!(value["entries"][0]["comment"], json!("Z80: HALT"));
    }
}
