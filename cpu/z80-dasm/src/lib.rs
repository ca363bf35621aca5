//! Linear disassembler for flat Z80, Intel 8080 and Intel 8085 binary images.
//!
//! Decoding always happens in Z80 syntax against per-architecture opcode tables. Control-flow
//! targets are collected into generated labels, and output for the Intel CPUs is translated to
//! Intel mnemonics afterwards.

pub mod arch;
mod driver;
pub mod instruction;
pub mod labels;
pub mod listing;
pub mod postprocess;
pub mod prefix;
pub mod tables;
pub mod target;
pub mod translate;

pub use arch::{Architecture, ParseArchitectureError, Support};
pub use driver::{ADDRESS_SPACE_LEN, DisassembleError, Disassembly, disassemble};
pub use instruction::{DecodedEntry, Instruction, LabelInfo, Operand, Target};
pub use listing::{Listing, ListingOptions, ListingStyle};
