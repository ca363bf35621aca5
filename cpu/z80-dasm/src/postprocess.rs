use crate::arch::{Architecture, Support};
use crate::instruction::{DecodedEntry, Instruction, Target};

/// Place a freshly decoded instruction at its absolute address.
///
/// Offset-relative targets are rebased onto `origin` here and nowhere else. Instructions that are
/// not legal on `architecture` get a compatibility warning appended to their comment.
#[must_use]
pub fn post_process(
    offset: u16,
    mut instruction: Instruction,
    origin: u16,
    architecture: Architecture,
) -> DecodedEntry {
    if let Some(Target::Offset(target)) = instruction.target() {
        instruction.set_target(Target::Absolute(origin.wrapping_add(target)));
    }

    if let Some(warning) = compatibility_warning(instruction.support(), architecture) {
        instruction.append_comment(&warning);
    }

    DecodedEntry { address: origin.wrapping_add(offset), instruction, label_info: None }
}

#[must_use]
pub fn compatibility_warning(support: Support, architecture: Architecture) -> Option<String> {
    // Data declarations already explain themselves
    if support == Support::NONE || support.supports(architecture) {
        return None;
    }

    let warning = match architecture {
        Architecture::I8080 | Architecture::I8085 if support == Support::Z80_ONLY => {
            "WARNING: Z80 ONLY".into()
        }
        Architecture::I8080 if support.i8085 => "WARNING: 8085 ONLY".into(),
        _ => format!("WARNING: NOT SUPPORTED ON {architecture}"),
    };
    Some(warning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Operand;

    fn jr_self() -> Instruction {
        Instruction::new("JR", vec![Operand::Target], &[0x18, 0xFE])
            .with_target(Target::Offset(0x0004))
            .with_support(Support::Z80_ONLY)
    }

    #[test]
    fn offset_targets_are_rebased_once() {
        let entry = post_process(0x0004, jr_self(), 0x8000, Architecture::Z80);
        assert_eq!(entry.address, 0x8004);
        assert_eq!(entry.instruction.target(), Some(Target::Absolute(0x8004)));
        assert_eq!(entry.instruction.comment(), None);
        assert!(entry.label_info.is_none());
    }

    #[test]
    fn absolute_targets_are_untouched() {
        let jp = Instruction::new("JP", vec![Operand::Target], &[0xC3, 0x00, 0x10])
            .with_target(Target::Absolute(0x1000));
        let entry = post_process(0x0000, jp, 0x4000, Architecture::I8080);
        assert_eq!(entry.instruction.target_address(), Some(0x1000));
    }

    #[test]
    fn addresses_wrap() {
        let entry = post_process(0x0002, jr_self(), 0xFFFF, Architecture::Z80);
        assert_eq!(entry.address, 0x0001);
        assert_eq!(entry.instruction.target_address(), Some(0x0003));
    }

    #[test]
    fn warnings() {
        assert_eq!(compatibility_warning(Support::ALL, Architecture::I8080), None);
        assert_eq!(compatibility_warning(Support::Z80_ONLY, Architecture::Z80), None);
        assert_eq!(
            compatibility_warning(Support::Z80_ONLY, Architecture::I8080).as_deref(),
            Some("WARNING: Z80 ONLY")
        );
        assert_eq!(
            compatibility_warning(Support::Z80_ONLY, Architecture::I8085).as_deref(),
            Some("WARNING: Z80 ONLY")
        );
        assert_eq!(
            compatibility_warning(Support::I8085_ONLY, Architecture::I8080).as_deref(),
            Some("WARNING: 8085 ONLY")
        );
        assert_eq!(
            compatibility_warning(Support::I8085_ONLY, Architecture::Z80).as_deref(),
            Some("WARNING: NOT SUPPORTED ON Z80")
        );
        assert_eq!(compatibility_warning(Support::NONE, Architecture::I8085), None);
    }

    #[test]
    fn warnings_are_appended_to_existing_comments() {
        let instruction = jr_self().with_comment("loop");
        let entry = post_process(0x0000, instruction, 0x0000, Architecture::I8085);
        assert_eq!(entry.instruction.comment(), Some("loop; WARNING: Z80 ONLY"));
    }
}
