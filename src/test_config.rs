//! Shared test configuration for property-based testing.
//!
//! Maze generation is CPU-bound, so property tests that build mazes use
//! [`maze_case_count`] while cheap properties (PRNG streams, packing) use
//! [`miri_case_count`]. Under Miri both are reduced to keep runs bearable.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_config::miri_case_count;
//!
//! proptest! {
//!     #![proptest_config(ProptestConfig {
//!         cases: miri_case_count(),
//!         ..ProptestConfig::default()
//!     })]
//!     #[test]
//!     fn my_property_test(value in any::<u32>()) {
//!         // test body
//!     }
//! }
//! ```

/// Returns the number of test cases to run for cheap property tests.
///
/// 5 under Miri, 256 otherwise.
#[must_use]
pub const fn miri_case_count() -> u32 {
    if cfg!(miri) {
        5
    } else {
        256
    }
}

/// Returns the number of test cases for properties that generate a maze per case.
///
/// 2 under Miri, 64 otherwise.
#[must_use]
pub const fn maze_case_count() -> u32 {
    if cfg!(miri) {
        2
    } else {
        64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_counts_return_expected_values() {
        if cfg!(miri) {
            assert_eq!(miri_case_count(), 5);
            assert_eq!(maze_case_count(), 2);
        } else {
            assert_eq!(miri_case_count(), 256);
            assert_eq!(maze_case_count(), 64);
        }
    }
}
