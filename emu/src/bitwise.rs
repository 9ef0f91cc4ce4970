//! Bit helpers shared by the decoder and the branch renderer.
//!
//! Bit positions go from lsb to msb (right to left) and ranges are given as
//! `(high, low)` pairs, both inclusive, like the ARM reference manual draws
//! them: `extract_bits(op, 24, 21)` is the ALU opcode of a data processing
//! instruction.

/// Mask with the `high - low + 1` lowest bits set.
#[must_use]
pub const fn bit_mask(high: u8, low: u8) -> u32 {
    assert!(high >= low, "bit range must have high >= low");
    assert!(high < 32, "bit range must fit in a 32-bit word");

    let width = (high - low + 1) as u32;
    if width == 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Returns bits `high..=low` of `word` moved to the bit 0 position.
#[must_use]
pub const fn extract_bits(word: u32, high: u8, low: u8) -> u32 {
    (word >> low) & bit_mask(high, low)
}

/// True when bits `high..=low` of `word` are exactly `expected`.
#[must_use]
pub const fn bits_equal(word: u32, high: u8, low: u8, expected: u32) -> bool {
    extract_bits(word, high, low) == expected
}

/// Sign-extends the `number_of_bits` lowest bits of `value` to a full `i32`.
///
/// `value ^ mask` clears the sign bit when it was set (or sets it when it was
/// clear), subtracting the mask afterwards borrows through all the upper bits
/// only in the first case. For a 4 bits value `0b1001` (-7):
/// `0b1001 ^ 0b1000 = 0b0001`, `0b0001 - 0b1000 = ...1111_1001`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend(value: u32, number_of_bits: u8) -> i32 {
    let value = extract_bits(value, number_of_bits - 1, 0) as i32;
    let mask = 1_i32.wrapping_shl(number_of_bits as u32 - 1);
    (value ^ mask).wrapping_sub(mask)
}
