//! Turns model output into compliance recommendations.

use keel_core::report::ComplianceSummary;

use crate::{Result, client::TextGenerator};

/// Upper bound on recommendations returned from a single generation.
pub const MAX_RECOMMENDATIONS: usize = 5;

const SYSTEM_PROMPT: &str = "You are a compliance expert. Provide specific, \
                             actionable recommendations based on compliance \
                             data.";

/// Asks the generator for recommendations against a compliance summary.
///
/// The summary is embedded in the prompt as JSON; the response is parsed
/// line-wise via [`parse_recommendations`].
pub async fn compliance_recommendations<G: TextGenerator>(
  generator: &G,
  summary: &ComplianceSummary,
) -> Result<Vec<String>> {
  let data = serde_json::to_string_pretty(summary)?;
  let prompt = format!(
    "Based on this compliance data, provide actionable recommendations:\n\n\
     {data}\n\n\
     Generate 3-5 specific recommendations to improve compliance."
  );

  let response = generator.generate(Some(SYSTEM_PROMPT), &prompt).await?;
  Ok(parse_recommendations(&response))
}

/// Keeps trimmed non-empty lines, drops markdown headings, and caps the list
/// at [`MAX_RECOMMENDATIONS`].
pub fn parse_recommendations(response: &str) -> Vec<String> {
  response
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .take(MAX_RECOMMENDATIONS)
    .map(str::to_owned)
    .collect()
}

#[cfg(test)]
mod tests {
  use keel_core::{
    item::{ComplianceItem, ComplianceStatus},
    report::summarize,
  };

  use super::*;
  use crate::{ChatMessage, Error};

  #[test]
  fn parse_keeps_plain_lines_in_order() {
    let text = "Renew the expiring permits.\nSchedule refresher training.";
    assert_eq!(parse_recommendations(text), vec![
      "Renew the expiring permits.",
      "Schedule refresher training.",
    ]);
  }

  #[test]
  fn parse_drops_headings_and_blank_lines() {
    let text = "# Recommendations\n\n- Renew permit A\n\n## Next\n- Audit B\n";
    assert_eq!(parse_recommendations(text), vec![
      "- Renew permit A",
      "- Audit B",
    ]);
  }

  #[test]
  fn parse_trims_whitespace() {
    assert_eq!(parse_recommendations("   padded line   "), vec![
      "padded line"
    ]);
  }

  #[test]
  fn parse_caps_at_five() {
    let text = (1..=8)
      .map(|n| format!("Recommendation {n}"))
      .collect::<Vec<_>>()
      .join("\n");
    assert_eq!(parse_recommendations(&text).len(), MAX_RECOMMENDATIONS);
  }

  #[test]
  fn parse_of_empty_response_is_empty() {
    assert!(parse_recommendations("").is_empty());
    assert!(parse_recommendations("\n\n# only a heading\n").is_empty());
  }

  struct CannedGenerator(&'static str);

  impl TextGenerator for CannedGenerator {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
      Ok(self.0.to_owned())
    }
  }

  struct FailingGenerator;

  impl TextGenerator for FailingGenerator {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
      Err(Error::MissingContent)
    }
  }

  fn sample_summary() -> keel_core::report::ComplianceSummary {
    let item = ComplianceItem {
      item_id:      uuid::Uuid::new_v4(),
      subject_id:   "emp-1".to_owned(),
      item_type:    "work_permit".to_owned(),
      name:         "Work Permit".to_owned(),
      status:       ComplianceStatus::AtRisk,
      issue_date:   None,
      expiry_date:  None,
      jurisdiction: "Singapore".to_owned(),
      details:      serde_json::Map::new(),
      created_at:   chrono::Utc::now(),
    };
    summarize(&[item], Some("Singapore"))
  }

  #[tokio::test]
  async fn recommendations_come_back_parsed() {
    let generator =
      CannedGenerator("# Plan\nRenew permits early.\nTrack renewals weekly.");
    let recs = compliance_recommendations(&generator, &sample_summary())
      .await
      .unwrap();
    assert_eq!(recs, vec!["Renew permits early.", "Track renewals weekly."]);
  }

  #[tokio::test]
  async fn generator_failure_propagates() {
    let result =
      compliance_recommendations(&FailingGenerator, &sample_summary()).await;
    assert!(matches!(result, Err(Error::MissingContent)));
  }
}
