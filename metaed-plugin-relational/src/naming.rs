//! Identifier construction and length constraints.

use sha2::{Digest, Sha256};

/// Hex digits of the content hash appended to truncated identifiers.
pub const HASH_LENGTH: usize = 6;

/// Concatenate PascalCase name components, dropping the words a component
/// repeats from the end of what came before it.
///
/// `["Student", "StudentIdentificationCode"]` becomes `StudentIdentificationCode`,
/// `["Parent", "LocalEducationAgencyId"]` becomes `ParentLocalEducationAgencyId`.
pub fn collapse_overlap<S: AsRef<str>>(components: &[S]) -> String {
    let mut result = String::new();
    for component in components {
        let component = component.as_ref();
        let overlap = (1..=component.len().min(result.len()))
            .rev()
            .find(|&k| {
                let start = result.len() - k;
                result.is_char_boundary(start)
                    && component.is_char_boundary(k)
                    && result[start..] == component[..k]
                    && is_word_start(&result, start)
                    && is_word_start(component, k)
            })
            .unwrap_or(0);
        result.push_str(&component[overlap..]);
    }
    result
}

/// Whether `index` starts a PascalCase word in `s` (or is either end of it).
fn is_word_start(s: &str, index: usize) -> bool {
    index == 0
        || index == s.len()
        || s[index..]
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

/// First [`HASH_LENGTH`] hex digits of the SHA-256 of `name`.
pub fn hash_suffix(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>()
        .chars()
        .take(HASH_LENGTH)
        .collect()
}

/// Join `components` with `separator`, truncating to `max_length` when needed.
///
/// A name that fits is returned unchanged. Otherwise every component is
/// shortened by [`allocate_lengths`] and the result ends with `_` and the
/// hash of the untruncated name, so distinct long names stay distinct.
pub fn constrain_identifier<S: AsRef<str>>(components: &[S], separator: &str, max_length: usize) -> String {
    let full = components
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator);
    if full.chars().count() <= max_length {
        return full;
    }

    let separators = separator.len() * components.len().saturating_sub(1);
    let budget = max_length.saturating_sub(HASH_LENGTH + 1 + separators);
    let lengths: Vec<usize> = components.iter().map(|c| c.as_ref().chars().count()).collect();
    let allocation = allocate_lengths(&lengths, budget);

    let truncated: Vec<String> = components
        .iter()
        .zip(allocation)
        .map(|(component, length)| component.as_ref().chars().take(length).collect::<String>())
        .filter(|component| !component.is_empty())
        .collect();
    let mut prefix = truncated.join(separator);
    if prefix.is_empty() {
        prefix = full.clone();
    }

    // Separators alone may exceed the budget; the prefix still leaves room for the suffix.
    let prefix: String = prefix.chars().take(max_length.saturating_sub(HASH_LENGTH + 1)).collect();
    format!("{prefix}_{}", hash_suffix(&full))
        .chars()
        .take(max_length)
        .collect()
}

/// Split `budget` characters across components of the given lengths.
///
/// Each round gives every unsatisfied component an even share. Components
/// shorter than their share keep only what they need and the savings are
/// shared out again in the next round. Leftover characters that cannot be
/// split evenly go to the earliest unsatisfied components.
pub fn allocate_lengths(lengths: &[usize], budget: usize) -> Vec<usize> {
    let mut allocation = vec![0usize; lengths.len()];
    let mut remaining = budget;
    let mut open: Vec<usize> = (0..lengths.len()).filter(|&i| lengths[i] > 0).collect();

    while remaining > 0 && !open.is_empty() {
        let share = remaining / open.len();
        if share == 0 {
            for &i in open.iter().take(remaining) {
                allocation[i] += 1;
            }
            break;
        }
        for &i in &open {
            let given = share.min(lengths[i] - allocation[i]);
            allocation[i] += given;
            remaining -= given;
        }
        open.retain(|&i| allocation[i] < lengths[i]);
    }
    allocation
}
