//! Small alignment helpers shared by the arena and the recyclers.

/// Aligns `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two; checked with `debug_assert!` only,
/// callers on the hot path validate once up front.
#[inline(always)]
#[must_use]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Aligns `value` down to the previous multiple of `alignment`.
#[inline(always)]
#[must_use]
pub const fn align_down(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    value & !(alignment - 1)
}

/// Returns `true` if `value` is a multiple of `alignment`.
#[inline(always)]
#[must_use]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Number of padding bytes needed to bring `value` up to `alignment`.
#[inline(always)]
#[must_use]
pub const fn padding_needed(value: usize, alignment: usize) -> usize {
    align_up(value, alignment) - value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_next_boundary() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 8), 16);
        assert_eq!(align_up(15, 16), 16);
    }

    #[test]
    fn align_down_rounds_to_previous_boundary() {
        assert_eq!(align_down(0, 8), 0);
        assert_eq!(align_down(7, 8), 0);
        assert_eq!(align_down(8, 8), 8);
        assert_eq!(align_down(17, 8), 16);
    }

    #[test]
    fn padding_complements_alignment() {
        for value in 0..64 {
            for shift in 0..4 {
                let alignment = 1 << shift;
                assert!(is_aligned(value + padding_needed(value, alignment), alignment));
            }
        }
    }
}
