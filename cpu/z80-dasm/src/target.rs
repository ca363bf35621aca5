/// Length of every relative branch encoding (`JR`, `JR cc`, `DJNZ`): opcode + displacement.
pub const RELATIVE_BRANCH_LEN: u16 = 2;

/// Compute the target of a relative branch located at `offset`.
///
/// `displacement` is the raw displacement byte, interpreted as two's complement. The result is
/// expressed in the same terms as `offset` and wraps modulo 65536.
#[inline]
#[must_use]
pub fn calculate_target(offset: u16, displacement: u8) -> u16 {
    offset.wrapping_add(RELATIVE_BRANCH_LEN).wrapping_add_signed((displacement as i8).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_to_self() {
        assert_eq!(calculate_target(0x0000, 0xFE), 0x0000);
        assert_eq!(calculate_target(0x1234, 0xFE), 0x1234);
    }

    #[test]
    fn forward_and_backward() {
        assert_eq!(calculate_target(0x0100, 0x00), 0x0102);
        assert_eq!(calculate_target(0x0100, 0x7F), 0x0181);
        assert_eq!(calculate_target(0x0100, 0x80), 0x0082);
    }

    #[test]
    fn wraps_around_address_space() {
        assert_eq!(calculate_target(0xFFFE, 0x05), 0x0005);
        assert_eq!(calculate_target(0x0000, 0x80), 0xFF82);
    }
}
