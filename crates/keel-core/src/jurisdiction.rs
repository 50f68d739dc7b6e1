//! Static catalog of legally expected compliance items per jurisdiction.
//!
//! Pure data, no computation. Unknown jurisdictions yield an empty slice,
//! never an error.

use serde::Serialize;

/// One legally expected compliance item for a jurisdiction.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RequiredItem {
  pub item_type: &'static str,
  pub name:      &'static str,
  /// How often the item must be renewed; `None` means it never expires.
  pub renewal_period_days: Option<u32>,
}

const fn item(
  item_type: &'static str,
  name: &'static str,
  renewal_period_days: Option<u32>,
) -> RequiredItem {
  RequiredItem { item_type, name, renewal_period_days }
}

const UNITED_STATES: &[RequiredItem] = &[
  item("i9_verification", "I-9 Employment Verification", None),
  item("tax_form", "W-4 Tax Form", None),
  item("safety_training", "Workplace Safety Training", Some(365)),
  item("harassment_training", "Anti-Harassment Training", Some(365)),
];

// The source data nests this under the United States as state-specific;
// the catalog keeps jurisdictions flat, so California is its own entry.
const CALIFORNIA: &[RequiredItem] = &[
  item("ca_harassment_training", "CA Sexual Harassment Prevention", Some(730)),
];

const UNITED_KINGDOM: &[RequiredItem] = &[
  item("right_to_work", "Right to Work Check", None),
  item("dbs_check", "DBS Check (if applicable)", Some(1095)),
  item("gdpr_training", "GDPR Training", Some(365)),
  item("health_safety", "Health & Safety Training", Some(365)),
];

const SINGAPORE: &[RequiredItem] = &[
  item("work_permit", "Employment Pass/Work Permit", Some(730)),
  item("cpf_registration", "CPF Registration", None),
  item("safety_training", "Workplace Safety Training", Some(365)),
];

const EUROPEAN_UNION: &[RequiredItem] = &[
  item("work_permit", "EU Work Permit", Some(1095)),
  item("gdpr_training", "GDPR Compliance Training", Some(365)),
  item("data_protection", "Data Protection Certification", Some(730)),
];

/// Required compliance items for `jurisdiction`, in catalog order.
/// Returns an empty slice for jurisdictions not in the catalog.
pub fn required_items(jurisdiction: &str) -> &'static [RequiredItem] {
  match jurisdiction {
    "United States" => UNITED_STATES,
    "California" => CALIFORNIA,
    "United Kingdom" => UNITED_KINGDOM,
    "Singapore" => SINGAPORE,
    "European Union" => EUROPEAN_UNION,
    _ => &[],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_jurisdiction_has_items() {
    let items = required_items("United States");
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].item_type, "i9_verification");
    assert_eq!(items[0].renewal_period_days, None);
  }

  #[test]
  fn california_supplements_the_federal_items() {
    let items = required_items("California");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_type, "ca_harassment_training");
    assert_eq!(items[0].renewal_period_days, Some(730));
  }

  #[test]
  fn unknown_jurisdiction_is_empty_not_an_error() {
    assert!(required_items("Nonexistent Place").is_empty());
  }
}
