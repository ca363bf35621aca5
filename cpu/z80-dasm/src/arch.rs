use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Instruction set to decode and annotate for.
///
/// The Z80 is the primary architecture: it is a superset of the 8080 for unprefixed opcodes and is
/// the only one with multi-byte opcode prefixes. The 8080 and 8085 share nearly all of their
/// opcodes; the 8085 adds `RIM` and `SIM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Architecture {
    #[default]
    #[cfg_attr(feature = "clap", value(name = "z80"))]
    Z80,
    #[cfg_attr(feature = "serde", serde(alias = "8080"))]
    #[cfg_attr(feature = "clap", value(name = "8080", alias = "i8080"))]
    I8080,
    #[cfg_attr(feature = "serde", serde(alias = "8085"))]
    #[cfg_attr(feature = "clap", value(name = "8085", alias = "i8085"))]
    I8085,
}

impl Architecture {
    pub const ALL: [Self; 3] = [Self::Z80, Self::I8080, Self::I8085];

    #[inline]
    #[must_use]
    pub fn is_primary(self) -> bool {
        self == Self::Z80
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Z80 => "Z80",
            Self::I8080 => "8080",
            Self::I8085 => "8085",
        }
    }
}

impl Display for Architecture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized architecture '{0}', expected one of Z80 / 8080 / 8085")]
pub struct ParseArchitectureError(String);

impl FromStr for Architecture {
    type Err = ParseArchitectureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "z80" => Ok(Self::Z80),
            "8080" | "i8080" => Ok(Self::I8080),
            "8085" | "i8085" => Ok(Self::I8085),
            _ => Err(ParseArchitectureError(s.into())),
        }
    }
}

/// Per-architecture legality of a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Support {
    pub z80: bool,
    pub i8080: bool,
    pub i8085: bool,
}

impl Support {
    pub const ALL: Self = Self { z80: true, i8080: true, i8085: true };
    pub const Z80_ONLY: Self = Self { z80: true, i8080: false, i8085: false };
    pub const I8085_ONLY: Self = Self { z80: false, i8080: false, i8085: true };
    pub const NONE: Self = Self { z80: false, i8080: false, i8085: false };

    #[inline]
    #[must_use]
    pub fn supports(self, architecture: Architecture) -> bool {
        match architecture {
            Architecture::Z80 => self.z80,
            Architecture::I8080 => self.i8080,
            Architecture::I8085 => self.i8085,
        }
    }
}
