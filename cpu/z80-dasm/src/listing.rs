//! Plain-text rendering of a [`Disassembly`].

use crate::driver::Disassembly;
use crate::instruction::{DecodedEntry, LabelInfo, MAX_INSTRUCTION_LEN};
use std::fmt::{self, Display, Formatter};

// "XX XX XX XX"
const HEX_COLUMN_WIDTH: usize = 3 * MAX_INSTRUCTION_LEN - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ListingStyle {
    /// Address and raw byte columns followed by the instruction
    #[default]
    Listing,
    /// Assemblable source: no address or byte columns
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ListingOptions {
    pub style: ListingStyle,
    pub comments: bool,
    /// Print a `; referenced from` line above each label
    pub references: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self { style: ListingStyle::default(), comments: true, references: true }
    }
}

/// [`Display`] adapter that renders a disassembly with the given options.
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    disassembly: &'a Disassembly,
    options: ListingOptions,
}

impl<'a> Listing<'a> {
    #[must_use]
    pub fn new(disassembly: &'a Disassembly, options: ListingOptions) -> Self {
        Self { disassembly, options }
    }

    fn fmt_label(&self, f: &mut Formatter<'_>, info: &LabelInfo) -> fmt::Result {
        if self.options.references && !info.referenced_from.is_empty() {
            writeln!(f, "; referenced from {}", info.references_text())?;
        }
        writeln!(f, "{}:", info.label)
    }

    fn fmt_entry(&self, f: &mut Formatter<'_>, entry: &DecodedEntry) -> fmt::Result {
        if let Some(info) = &entry.label_info {
            self.fmt_label(f, info)?;
        }

        let instruction = &entry.instruction;
        match self.options.style {
            ListingStyle::Listing => write!(
                f,
                "{:04X}  {:<HEX_COLUMN_WIDTH$}  {instruction}",
                entry.address,
                instruction.hex_bytes()
            )?,
            ListingStyle::Source => write!(f, "\t{instruction}")?,
        }

        if self.options.comments
            && let Some(comment) = instruction.comment()
        {
            write!(f, " ; {comment}")?;
        }

        writeln!(f)
    }

    fn fmt_source_header(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tORG ${:04X}", self.disassembly.origin())?;

        // Labels that point into the middle of an instruction can't be placed on a line
        let mut any_equ = false;
        for (&address, info) in self.disassembly.labels() {
            if self.disassembly.contains_address(address)
                && self.disassembly.entry_at(address).is_none()
            {
                writeln!(f, "{}\tEQU ${address:04X}", info.label)?;
                any_equ = true;
            }
        }

        if any_equ || !self.disassembly.is_empty() {
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.options.style == ListingStyle::Source {
            self.fmt_source_header(f)?;
        }

        for entry in self.disassembly.entries() {
            self.fmt_entry(f, entry)?;
        }

        Ok(())
    }
}

#[must_use]
pub fn render(disassembly: &Disassembly, options: ListingOptions) -> String {
    Listing::new(disassembly, options).to_string()
}
