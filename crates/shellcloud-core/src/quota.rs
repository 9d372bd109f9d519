//! Triangle budget distribution across shells.
//!
//! Shell `i` carries weight `i + 1`, so the innermost shell gets the
//! smallest share and the outermost the largest:
//!
//! ```text
//! quota[i] = round(total * (i + 1) / sum(1..=shell_count))
//! ```
//!
//! Each quota is rounded independently. The sum may drift from `total`
//! by up to `shell_count - 1`; the drift is accepted, not corrected.

/// Weight of a single shell.
#[inline]
pub const fn shell_weight(shell_index: u32) -> u64 {
    shell_index as u64 + 1
}

/// Weights for every shell, innermost first.
pub fn shell_weights(shell_count: u32) -> Vec<u64> {
    (0..shell_count).map(shell_weight).collect()
}

/// Sum of all shell weights (the triangular number of `shell_count`).
#[inline]
pub const fn weight_sum(shell_count: u32) -> u64 {
    let n = shell_count as u64;
    n * (n + 1) / 2
}

/// Triangle quota for one shell.
pub fn shell_quota(total: u32, shell_index: u32, shell_count: u32) -> u32 {
    if shell_count == 0 {
        return 0;
    }
    let share = shell_weight(shell_index) as f64 / weight_sum(shell_count) as f64;
    (share * total as f64).round() as u32
}

/// Triangle quotas for every shell, innermost first.
pub fn shell_quotas(total: u32, shell_count: u32) -> Vec<u32> {
    (0..shell_count)
        .map(|i| shell_quota(total, i, shell_count))
        .collect()
}
