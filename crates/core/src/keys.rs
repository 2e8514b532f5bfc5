//! Business-key validation and canonicalization.

use crate::catalog::KeyType;
use crate::errors::{HubError, Result};

/// Canonical length of a numeric business-registry key.
const DUNS_LENGTH: usize = 9;

/// Validates and canonicalizes a caller-supplied business key.
///
/// For the numeric registry scheme, hyphens are stripped, the remainder must
/// be purely numeric, and keys shorter than nine digits are left-padded with
/// zeros. Other key schemes pass through unchanged.
pub fn normalize(raw: &str, key_type: KeyType) -> Result<String> {
    match key_type {
        KeyType::Duns => {
            let stripped: String = raw.chars().filter(|c| *c != '-').collect();

            if stripped.is_empty() || !stripped.bytes().all(|b| b.is_ascii_digit()) {
                return Err(HubError::Instantiation(format!(
                    "key submitted ({raw}) contains non-numeric characters and is therefore invalid"
                )));
            }

            if stripped.len() < DUNS_LENGTH {
                Ok(format!("{stripped:0>9}"))
            } else {
                Ok(stripped)
            }
        }
    }
}
