//! Two-pass label resolution.
//!
//! Pass 1 collects every control-flow target together with how it is referenced. Each target gets a
//! label named after its dominant reference kind. Pass 2 attaches labels to the instructions that
//! reference in-range targets and to the entries that sit at labeled addresses.

use crate::instruction::{DecodedEntry, LabelInfo};
use std::collections::BTreeMap;

/// How an instruction refers to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `JR`, `DJNZ`
    Relative,
    /// `JP`
    Jump,
    /// `CALL`
    Call,
    /// `RST`
    Restart,
    Data,
}

impl ReferenceKind {
    /// Classify by Z80 mnemonic. Labels are resolved before any syntax translation.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Self {
        match mnemonic {
            "JR" | "DJNZ" => Self::Relative,
            "JP" => Self::Jump,
            "CALL" => Self::Call,
            "RST" => Self::Restart,
            _ => Self::Data,
        }
    }
}

/// Everything known about one target address after pass 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub is_jump_target: bool,
    pub is_subroutine_target: bool,
    pub is_relative_jump_target: bool,
    pub referenced_from: Vec<u16>,
}

impl ReferenceRecord {
    /// Record a reference from the instruction at `from`.
    ///
    /// Relative jumps dominate plain jumps, which dominate calls. A stronger classification is
    /// never downgraded by a weaker one.
    pub fn add_reference(&mut self, kind: ReferenceKind, from: u16) {
        match kind {
            ReferenceKind::Relative => {
                self.is_relative_jump_target = true;
                self.is_jump_target = false;
                self.is_subroutine_target = false;
            }
            ReferenceKind::Jump if !self.is_relative_jump_target => {
                self.is_jump_target = true;
                self.is_subroutine_target = false;
            }
            ReferenceKind::Call | ReferenceKind::Restart
                if !self.is_relative_jump_target && !self.is_jump_target =>
            {
                self.is_subroutine_target = true;
            }
            _ => {}
        }

        if !self.referenced_from.contains(&from) {
            self.referenced_from.push(from);
        }
    }

    #[must_use]
    pub fn label_prefix(&self) -> &'static str {
        if self.is_relative_jump_target {
            "R_"
        } else if self.is_jump_target {
            "J_"
        } else if self.is_subroutine_target {
            "S_"
        } else {
            "L_"
        }
    }

    #[must_use]
    pub fn label(&self, address: u16) -> String {
        format!("{}{address:04X}", self.label_prefix())
    }
}

/// Pass 1: collect every target address referenced by `entries`.
#[must_use]
pub fn discover(entries: &[DecodedEntry]) -> BTreeMap<u16, ReferenceRecord> {
    let mut records: BTreeMap<u16, ReferenceRecord> = BTreeMap::new();
    for entry in entries {
        let Some(target) = entry.instruction.target_address() else { continue };
        let kind = ReferenceKind::from_mnemonic(entry.instruction.mnemonic());
        records.entry(target).or_default().add_reference(kind, entry.address);
    }
    records
}

/// Run both passes over `entries`, which must cover exactly `len` bytes starting at `origin`.
///
/// Returns the complete label map, including targets that fall outside the image.
pub fn resolve(entries: &mut [DecodedEntry], origin: u16, len: usize) -> BTreeMap<u16, LabelInfo> {
    let labels: BTreeMap<u16, LabelInfo> = discover(entries)
        .into_iter()
        .map(|(address, record)| {
            let label = record.label(address);
            (address, LabelInfo { label, referenced_from: record.referenced_from })
        })
        .collect();

    let in_range = |address: u16| address >= origin && usize::from(address - origin) < len;

    for entry in entries.iter_mut() {
        if let Some(target) = entry.instruction.target_address()
            && in_range(target)
            && let Some(info) = labels.get(&target)
        {
            entry.instruction.set_target_label(info.label.clone());
        }

        entry.label_info = labels.get(&entry.address).cloned();
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, Operand, Target};

    fn branch(address: u16, mnemonic: &'static str, target: u16) -> DecodedEntry {
        let instruction = Instruction::new(mnemonic, vec![Operand::Target], &[0xC3, 0x00, 0x00])
            .with_target(Target::Absolute(target));
        DecodedEntry { address, instruction, label_info: None }
    }

    fn nop(address: u16) -> DecodedEntry {
        DecodedEntry {
            address,
            instruction: Instruction::new("NOP", vec![], &[0x00]),
            label_info: None,
        }
    }

    #[test]
    fn classification() {
        assert_eq!(ReferenceKind::from_mnemonic("JR"), ReferenceKind::Relative);
        assert_eq!(ReferenceKind::from_mnemonic("DJNZ"), ReferenceKind::Relative);
        assert_eq!(ReferenceKind::from_mnemonic("JP"), ReferenceKind::Jump);
        assert_eq!(ReferenceKind::from_mnemonic("CALL"), ReferenceKind::Call);
        assert_eq!(ReferenceKind::from_mnemonic("RST"), ReferenceKind::Restart);
        assert_eq!(ReferenceKind::from_mnemonic("LD"), ReferenceKind::Data);
    }

    #[test]
    fn relative_dominates_regardless_of_order() {
        let mut record = ReferenceRecord::default();
        record.add_reference(ReferenceKind::Call, 0x0010);
        record.add_reference(ReferenceKind::Relative, 0x0020);
        record.add_reference(ReferenceKind::Jump, 0x0030);
        record.add_reference(ReferenceKind::Call, 0x0040);
        assert_eq!(record.label(0x0100), "R_0100");

        let mut record = ReferenceRecord::default();
        record.add_reference(ReferenceKind::Relative, 0x0020);
        record.add_reference(ReferenceKind::Call, 0x0010);
        assert_eq!(record.label(0x0100), "R_0100");
    }

    #[test]
    fn jump_dominates_call() {
        let mut record = ReferenceRecord::default();
        record.add_reference(ReferenceKind::Restart, 0x0000);
        assert_eq!(record.label(0x0038), "S_0038");
        record.add_reference(ReferenceKind::Jump, 0x0001);
        record.add_reference(ReferenceKind::Call, 0x0002);
        assert_eq!(record.label(0x0038), "J_0038");
    }

    #[test]
    fn data_references_get_plain_labels() {
        let mut record = ReferenceRecord::default();
        record.add_reference(ReferenceKind::Data, 0x0000);
        assert_eq!(record.label(0xABCD), "L_ABCD");
    }

    #[test]
    fn references_are_deduplicated_in_discovery_order() {
        let entries = [
            branch(0x0005, "JP", 0x0000),
            branch(0x0002, "JP", 0x0000),
            branch(0x0005, "JP", 0x0000),
        ];
        let records = discover(&entries);
        assert_eq!(records[&0x0000].referenced_from, vec![0x0005, 0x0002]);
    }

    #[test]
    fn only_in_range_targets_are_substituted() {
        let mut entries =
            vec![branch(0x1000, "CALL", 0x1003), branch(0x1003, "JP", 0x2000), nop(0x1006)];
        let labels = resolve(&mut entries, 0x1000, 7);

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[&0x2000].label, "J_2000");

        assert_eq!(entries[0].instruction.operand_text(), "S_1003");
        assert_eq!(entries[1].instruction.operand_text(), "$2000");
        assert_eq!(entries[1].label_info.as_ref().map(|info| info.label.as_str()), Some("S_1003"));
        assert!(entries[0].label_info.is_none());
        assert!(entries[2].label_info.is_none());
    }

    #[test]
    fn targets_below_origin_are_out_of_range() {
        let mut entries = vec![branch(0x8000, "JP", 0x7FFF)];
        resolve(&mut entries, 0x8000, 3);
        assert_eq!(entries[0].instruction.target_label(), None);
    }
}
