use crate::arch::Architecture;
use crate::instruction::{DecodedEntry, Instruction, LabelInfo};
use crate::postprocess::post_process;
use crate::prefix::Prefix;
use crate::tables::{Decode, OpcodeTable};
use crate::{labels, translate};
use std::collections::BTreeMap;
use thiserror::Error;

pub const ADDRESS_SPACE_LEN: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisassembleError {
    #[error(
        "{len}-byte image at origin ${origin:04X} extends past the end of the 16-bit address space"
    )]
    ImageTooLarge { origin: u16, len: usize },
}

/// Result of disassembling one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    origin: u16,
    architecture: Architecture,
    len: usize,
    entries: Vec<DecodedEntry>,
    labels: BTreeMap<u16, LabelInfo>,
}

impl Disassembly {
    #[inline]
    #[must_use]
    pub fn origin(&self) -> u16 {
        self.origin
    }

    #[inline]
    #[must_use]
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Entries in address order, covering every byte of the image exactly once.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[DecodedEntry] {
        &self.entries
    }

    /// Every referenced target address and its label, including targets outside the image.
    #[inline]
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<u16, LabelInfo> {
        &self.labels
    }

    /// Image length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn contains_address(&self, address: u16) -> bool {
        address >= self.origin && usize::from(address - self.origin) < self.len
    }

    #[must_use]
    pub fn entry_at(&self, address: u16) -> Option<&DecodedEntry> {
        let i = self.entries.binary_search_by_key(&address, |entry| entry.address).ok()?;
        Some(&self.entries[i])
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<DecodedEntry> {
        self.entries
    }
}

/// Disassemble `binary` as if loaded at `origin`.
///
/// Decoding is linear and never fails once started: bytes that cannot be decoded become `DB`
/// declarations. The only error is an image that does not fit in the address space above `origin`.
///
/// # Errors
///
/// Returns [`DisassembleError::ImageTooLarge`] if `origin + binary.len()` exceeds 64KB.
pub fn disassemble(
    binary: &[u8],
    origin: u16,
    architecture: Architecture,
) -> Result<Disassembly, DisassembleError> {
    if usize::from(origin) + binary.len() > ADDRESS_SPACE_LEN {
        return Err(DisassembleError::ImageTooLarge { origin, len: binary.len() });
    }

    let table = OpcodeTable::for_architecture(architecture);

    let mut entries = Vec::new();
    let mut offset = 0;
    while offset < binary.len() {
        let instruction = decode_at(binary, offset, architecture, table);
        let size = instruction.size();
        entries.push(post_process(offset as u16, instruction, origin, architecture));
        offset += size;
    }

    let labels = labels::resolve(&mut entries, origin, binary.len());

    if !architecture.is_primary() {
        let translated = entries
            .iter_mut()
            .map(|entry| translate::translate(&mut entry.instruction))
            .filter(|&changed| changed)
            .count();
        log::debug!("Translated {translated} instructions to {architecture} syntax");
    }

    log::debug!(
        "Disassembled {} bytes at ${origin:04X} for {architecture}: {} instructions, {} labels",
        binary.len(),
        entries.len(),
        labels.len()
    );

    Ok(Disassembly { origin, architecture, len: binary.len(), entries, labels })
}

fn decode_at(
    binary: &[u8],
    offset: usize,
    architecture: Architecture,
    table: &OpcodeTable,
) -> Instruction {
    let opcode = binary[offset];

    let decode = match Prefix::from_byte(opcode) {
        Some(prefix) if architecture.is_primary() => prefix.resolve(binary, offset),
        _ => table.decode(binary, offset),
    };

    match decode {
        Decode::Instruction(instruction) | Decode::NotImplemented(instruction) => instruction,
        Decode::Absent => {
            log::trace!("No {architecture} rule for opcode {opcode:02X} at offset {offset:04X}");
            let comment = format!("Unknown opcode, not supported on {architecture}");
            Instruction::data_byte(opcode, comment)
        }
        Decode::Truncated => {
            log::trace!("Instruction at offset {offset:04X} runs past the end of the image");
            Instruction::data_byte(opcode, "Incomplete instruction at end of image")
        }
    }
}
