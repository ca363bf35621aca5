use crate::arch::Support;
use std::fmt::{self, Display, Formatter, Write};
use tinyvec::ArrayVec;

/// Longest encoding in scope: ED-prefixed 16-bit loads, e.g. `ED 43 nn nn`.
pub const MAX_INSTRUCTION_LEN: usize = 4;

pub type RawBytes = ArrayVec<[u8; MAX_INSTRUCTION_LEN]>;

/// Control-flow target as produced by a decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Relative to the first byte of the image; the origin has not been applied yet
    Offset(u16),
    Absolute(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Register, condition code, or any other fixed operand text
    Text(&'static str),
    Immediate8(u8),
    Immediate16(u16),
    /// `($nn)` I/O port
    Port(u8),
    /// `($nnnn)` memory operand
    Direct(u16),
    /// Renders the instruction's control-flow target, or its label once assigned
    Target,
    /// Restart vector; same as `Target` but rendered as a single byte when unlabeled
    Vector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    mnemonic: &'static str,
    operands: Vec<Operand>,
    raw_bytes: RawBytes,
    comment: Option<String>,
    target: Option<Target>,
    target_label: Option<String>,
    is_io: bool,
    support: Support,
    alternate_mnemonic: Option<&'static str>,
}

impl Instruction {
    /// Create an instruction that is legal on every architecture.
    ///
    /// # Panics
    ///
    /// Panics if `raw_bytes` is empty or longer than [`MAX_INSTRUCTION_LEN`].
    #[must_use]
    pub fn new(mnemonic: &'static str, operands: Vec<Operand>, raw_bytes: &[u8]) -> Self {
        assert!(
            !raw_bytes.is_empty() && raw_bytes.len() <= MAX_INSTRUCTION_LEN,
            "invalid instruction length {}",
            raw_bytes.len()
        );

        Self {
            mnemonic,
            operands,
            raw_bytes: raw_bytes.iter().copied().collect(),
            comment: None,
            target: None,
            target_label: None,
            is_io: false,
            support: Support::ALL,
            alternate_mnemonic: None,
        }
    }

    /// `DB $nn` declaration for a byte that could not be decoded. Not legal on any architecture.
    #[must_use]
    pub fn data_byte(byte: u8, comment: impl Into<String>) -> Self {
        Self::new("DB", vec![Operand::Immediate8(byte)], &[byte])
            .with_support(Support::NONE)
            .with_comment(comment)
    }

    #[must_use]
    pub fn with_support(mut self, support: Support) -> Self {
        self.support = support;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_io(mut self, is_io: bool) -> Self {
        self.is_io = is_io;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.append_comment(&comment.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    #[inline]
    #[must_use]
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    #[inline]
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.raw_bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        self.target
    }

    /// The absolute control-flow target, if this instruction has one and it has been resolved.
    #[inline]
    #[must_use]
    pub fn target_address(&self) -> Option<u16> {
        match self.target {
            Some(Target::Absolute(address)) => Some(address),
            Some(Target::Offset(_)) | None => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn target_label(&self) -> Option<&str> {
        self.target_label.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        self.is_io
    }

    #[inline]
    #[must_use]
    pub fn support(&self) -> Support {
        self.support
    }

    #[inline]
    #[must_use]
    pub fn alternate_mnemonic(&self) -> Option<&'static str> {
        self.alternate_mnemonic
    }

    /// Append to the comment. Existing comment text is never replaced.
    pub fn append_comment(&mut self, text: &str) {
        match &mut self.comment {
            Some(comment) => {
                comment.push_str("; ");
                comment.push_str(text);
            }
            None => self.comment = Some(text.into()),
        }
    }

    pub(crate) fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub(crate) fn set_target_label(&mut self, label: String) {
        self.target_label = Some(label);
    }

    pub(crate) fn translate(&mut self, mnemonic: &'static str, operands: Vec<Operand>) {
        self.alternate_mnemonic = Some(self.mnemonic);
        self.mnemonic = mnemonic;
        self.operands = operands;
    }

    #[must_use]
    pub fn render_operand(&self, operand: Operand) -> String {
        match operand {
            Operand::Text(text) => text.into(),
            Operand::Immediate8(value) => format!("${value:02X}"),
            Operand::Immediate16(value) => format!("${value:04X}"),
            Operand::Port(port) => format!("(${port:02X})"),
            Operand::Direct(address) => format!("(${address:04X})"),
            Operand::Target => match (&self.target_label, self.target) {
                (Some(label), _) => label.clone(),
                (None, Some(Target::Absolute(address) | Target::Offset(address))) => {
                    format!("${address:04X}")
                }
                (None, None) => "$????".into(),
            },
            Operand::Vector => match (&self.target_label, self.target) {
                (Some(label), _) => label.clone(),
                (None, Some(Target::Absolute(address) | Target::Offset(address))) => {
                    format!("${:02X}", address & 0xFF)
                }
                (None, None) => "$??".into(),
            },
        }
    }

    /// Formatted operand text, e.g. `A, ($1234)`.
    #[must_use]
    pub fn operand_text(&self) -> String {
        let mut s = String::new();
        for (i, &operand) in self.operands.iter().enumerate() {
            if i != 0 {
                s.push_str(", ");
            }
            s.push_str(&self.render_operand(operand));
        }
        s
    }

    /// Raw bytes as space-separated hex, e.g. `C3 00 10`.
    #[must_use]
    pub fn hex_bytes(&self) -> String {
        let mut s = String::with_capacity(3 * self.raw_bytes.len());
        for (i, byte) in self.raw_bytes.iter().enumerate() {
            if i != 0 {
                s.push(' ');
            }
            write!(s, "{byte:02X}").ok();
        }
        s
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            f.write_str(self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, self.operand_text())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub label: String,
    /// Addresses of the referencing instructions, in order of first discovery
    pub referenced_from: Vec<u16>,
}

impl LabelInfo {
    #[must_use]
    pub fn references_text(&self) -> String {
        self.referenced_from
            .iter()
            .map(|address| format!("${address:04X}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    pub address: u16,
    pub instruction: Instruction,
    pub label_info: Option<LabelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_appended() {
        let mut instruction = Instruction::new("NOP", vec![], &[0x00]);
        assert_eq!(instruction.comment(), None);

        instruction.append_comment("first");
        instruction.append_comment("second");
        assert_eq!(instruction.comment(), Some("first; second"));
    }

    #[test]
    fn operand_rendering() {
        let instruction = Instruction::new(
            "LD",
            vec![Operand::Direct(0x1234), Operand::Text("A")],
            &[0x32, 0x34, 0x12],
        );
        assert_eq!(instruction.to_string(), "LD ($1234), A");
        assert_eq!(instruction.hex_bytes(), "32 34 12");
        assert_eq!(instruction.size(), 3);
    }

    #[test]
    fn target_renders_label_when_assigned() {
        let mut instruction = Instruction::new("JP", vec![Operand::Target], &[0xC3, 0x00, 0x10])
            .with_target(Target::Absolute(0x1000));
        assert_eq!(instruction.operand_text(), "$1000");
        assert_eq!(instruction.target_address(), Some(0x1000));

        instruction.set_target_label("J_1000".into());
        assert_eq!(instruction.operand_text(), "J_1000");
    }

    #[test]
    fn unresolved_target_has_no_address() {
        let instruction = Instruction::new("JR", vec![Operand::Target], &[0x18, 0x00])
            .with_target(Target::Offset(0x0002));
        assert_eq!(instruction.target_address(), None);
        assert_eq!(instruction.operand_text(), "$0002");
    }

    #[test]
    fn vector_renders_as_byte() {
        let instruction = Instruction::new("RST", vec![Operand::Vector], &[0xFF])
            .with_target(Target::Absolute(0x0038));
        assert_eq!(instruction.to_string(), "RST $38");
    }

    #[test]
    fn labeled_vector_renders_label() {
        let mut instruction = Instruction::new("RST", vec![Operand::Vector], &[0xFF])
            .with_target(Target::Absolute(0x0038));
        instruction.set_target_label("S_0038".into());
        assert_eq!(instruction.to_string(), "RST S_0038");
        assert_eq!(instruction.target_address(), Some(0x0038));
    }

    #[test]
    fn data_byte_is_unsupported_everywhere() {
        let instruction = Instruction::data_byte(0xDD, "unknown");
        assert_eq!(instruction.to_string(), "DB $DD");
        assert_eq!(instruction.support(), Support::NONE);
        assert_eq!(instruction.comment(), Some("unknown"));
    }

    #[test]
    fn references_text_is_comma_joined() {
        let info = LabelInfo { label: "J_0010".into(), referenced_from: vec![0x0000, 0x0123] };
        assert_eq!(info.references_text(), "$0000, $0123");
    }
}
