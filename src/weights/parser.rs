//! Weight file line grammar.
//!
//! ```text
//! # comment
//! 10.0.0.5:50
//! mail.example.com:75
//! ```

use std::net::IpAddr;

use crate::weights::WeightError;

/// What a weight line applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightTarget {
    /// A literal address, recorded as is.
    Address(IpAddr),
    /// A name that expands to every address it resolves to.
    Hostname(String),
}

/// One parsed `target:weight` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightEntry {
    pub target: WeightTarget,
    pub weight: u32,
}

/// Parse line number `line_no` of a weight file.
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<WeightEntry>, WeightError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let malformed = || WeightError::Malformed {
        line: line_no,
        content: trimmed.to_string(),
    };

    let (target, weight) = trimmed.rsplit_once(':').ok_or_else(malformed)?;
    let weight: u32 = weight.trim().parse().map_err(|_| malformed())?;
    let target = target.trim();

    let target = if let Ok(ip) = target.parse::<IpAddr>() {
        WeightTarget::Address(ip)
    } else if is_hostname(target) {
        WeightTarget::Hostname(target.to_string())
    } else {
        return Err(malformed());
    };

    Ok(Some(WeightEntry { target, weight }))
}

fn is_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
