// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use crate::error::{MaskError, Result};
use rand::Rng;

/// Pad `rows` up to `target` by appending rows sampled uniformly, with
/// replacement, from the rows already present. Returns how many were added.
/// Sampled rows may repeat one another.
pub fn normalize<R: Rng + ?Sized>(rows: &mut Vec<String>, target: usize, rng: &mut R) -> Result<usize> {
    let existing = rows.len();
    if target <= existing {
        return Ok(0);
    }
    if existing == 0 {
        return Err(MaskError::data(format!(
            "cannot pad to {target} records: the file has no data rows to sample"
        )));
    }

    let missing = target - existing;
    rows.reserve(missing);
    for _ in 0..missing {
        let idx = rng.random_range(0..existing);
        let row = rows[idx].clone();
        rows.push(row);
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rows(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pads_three_rows_to_five_with_existing_rows() {
        let mut rng = StdRng::seed_from_u64(1);
        let original = rows(&["a|1", "b|2", "c|3"]);
        let mut padded = original.clone();
        let added = normalize(&mut padded, 5, &mut rng).unwrap();
        assert_eq!(added, 2);
        assert_eq!(padded.len(), 5);
        assert_eq!(&padded[..3], original.as_slice());
        assert!(padded[3..].iter().all(|r| original.contains(r)));
    }

    #[test]
    fn no_op_when_target_already_met() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut set = rows(&["a", "b"]);
        assert_eq!(normalize(&mut set, 2, &mut rng).unwrap(), 0);
        assert_eq!(normalize(&mut set, 1, &mut rng).unwrap(), 0);
        assert_eq!(set, rows(&["a", "b"]));
    }

    #[test]
    fn empty_input_cannot_be_padded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty = Vec::new();
        assert!(normalize(&mut empty, 3, &mut rng).is_err());
        assert_eq!(normalize(&mut empty, 0, &mut rng).unwrap(), 0);
    }
}
