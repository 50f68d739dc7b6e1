//! Conversational HR assistant for `/assistant` endpoints.
//!
//! Conversations live in memory keyed by id. Intent classification and the
//! policy knowledge base are deterministic keyword lookups; only the reply
//! itself comes from the text-generation client.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use keel_genai::{ChatMessage, Role, TextGenerator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// How many conversation turns (including the newest) are sent upstream.
const HISTORY_WINDOW: usize = 5;

const SYSTEM_PROMPT: &str =
  "You are a helpful and professional HR assistant. Answer questions clearly \
   and accurately based on company policies. Be empathetic and supportive. \
   If you don't have enough information, recommend contacting HR directly. \
   Always maintain confidentiality.";

// ─── Conversation types ──────────────────────────────────────────────────────

/// One stored turn of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
  pub role:      Role,
  pub content:   String,
  pub timestamp: DateTime<Utc>,
}

// ─── Intent classification ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
  Complaint,
  LeaveRequest,
  BenefitsInquiry,
  PolicyQuestion,
  UpdateDetails,
  GeneralInquiry,
}

/// Keyword intent classification. Checked in priority order; complaints win
/// over everything else.
pub fn classify_intent(message: &str) -> Intent {
  let lower = message.to_lowercase();
  let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

  if has(&["harassment", "discrimination", "complaint"]) {
    Intent::Complaint
  } else if has(&["leave", "vacation", "time off"]) {
    Intent::LeaveRequest
  } else if has(&["benefit", "insurance", "health"]) {
    Intent::BenefitsInquiry
  } else if has(&["policy", "rule", "procedure"]) {
    Intent::PolicyQuestion
  } else if has(&["update", "change", "modify"]) {
    Intent::UpdateDetails
  } else {
    Intent::GeneralInquiry
  }
}

fn requires_human_review(intent: Intent, message: &str) -> bool {
  if intent == Intent::Complaint {
    return true;
  }
  let lower = message.to_lowercase();
  [
    "discrimination",
    "harassment",
    "lawsuit",
    "lawyer",
    "terminate",
    "fire",
    "quit",
    "resign",
    "complaint",
  ]
  .iter()
  .any(|w| lower.contains(w))
}

fn suggested_actions(intent: Intent) -> &'static [&'static str] {
  match intent {
    Intent::LeaveRequest => {
      &["Submit leave request", "View leave balance", "Contact manager"]
    }
    Intent::BenefitsInquiry => &[
      "View benefits details",
      "Update beneficiaries",
      "Contact benefits team",
    ],
    Intent::UpdateDetails => &[
      "Update personal information",
      "Change emergency contacts",
      "Update direct deposit",
    ],
    Intent::PolicyQuestion => &[
      "Read full policy document",
      "Schedule HR consultation",
      "View related policies",
    ],
    _ => &["Contact HR for assistance"],
  }
}

// ─── Knowledge base ──────────────────────────────────────────────────────────

const LEAVE_POLICY: &str = "Annual Leave Policy:\n\
  - Full-time employees receive 15 days of paid annual leave per year\n\
  - Part-time employees receive pro-rated leave based on hours worked\n\
  - Leave requests must be submitted at least 2 weeks in advance\n\
  - Maximum carry-over: 5 days to the next year\n\
  - Leave approval is subject to manager discretion";

const SICK_LEAVE: &str = "Sick Leave Policy:\n\
  - Employees receive 10 days of paid sick leave per year\n\
  - Medical certificate required for absences exceeding 3 consecutive days\n\
  - Unused sick leave does not carry over\n\
  - Notify manager as soon as possible on the first day of absence";

const BENEFITS: &str = "Employee Benefits:\n\
  - Health Insurance: Comprehensive coverage for employee and dependents\n\
  - Dental and Vision: Optional coverage available\n\
  - Retirement Plan: 401(k) with 5% employer match\n\
  - Life Insurance: 2x annual salary coverage\n\
  - Professional Development: $2000 annual allowance\n\
  - Wellness Program: Gym membership reimbursement";

const REMOTE_WORK: &str = "Remote Work Policy:\n\
  - Eligible employees may work remotely up to 3 days per week\n\
  - Must maintain core hours (10am-3pm in local timezone)\n\
  - Required equipment provided by company\n\
  - Must have reliable internet connection\n\
  - Prior approval from manager required";

const PERFORMANCE_REVIEW: &str = "Performance Review Process:\n\
  - Annual performance reviews conducted in Q4\n\
  - Mid-year check-ins in Q2\n\
  - 360-degree feedback process\n\
  - Reviews include goal setting for upcoming year\n\
  - Performance ratings: Exceeds, Meets, Needs Improvement";

/// Policy snippets relevant to `message`, or `None` when nothing matches.
fn relevant_context(message: &str) -> Option<String> {
  let lower = message.to_lowercase();
  let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

  let mut policies = Vec::new();
  if has(&["leave", "vacation", "time off"]) {
    policies.push(LEAVE_POLICY);
  }
  if has(&["sick", "illness", "medical"]) {
    policies.push(SICK_LEAVE);
  }
  if has(&["benefit", "insurance", "health", "dental"]) {
    policies.push(BENEFITS);
  }
  if has(&["remote", "work from home", "wfh"]) {
    policies.push(REMOTE_WORK);
  }
  if has(&["review", "performance", "evaluation"]) {
    policies.push(PERFORMANCE_REVIEW);
  }

  if policies.is_empty() { None } else { Some(policies.join("\n\n")) }
}

// ─── Chat handler ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatBody {
  pub message:         String,
  /// Omit to start a new conversation.
  pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
  pub conversation_id:       Uuid,
  pub message:               String,
  pub intent:                Intent,
  pub suggested_actions:     &'static [&'static str],
  pub requires_human_review: bool,
}

/// `POST /assistant/chat`
pub async fn chat<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponse>, ApiError>
where
  G: TextGenerator,
{
  if body.message.trim().is_empty() {
    return Err(ApiError::BadRequest("message must not be empty".into()));
  }

  let intent = classify_intent(&body.message);
  let conversation_id = body.conversation_id.unwrap_or_else(Uuid::new_v4);

  // Build the outbound request from the stored history plus the new message.
  // Nothing is committed yet: a failed upstream call must leave the
  // conversation untouched so a retry records the turn exactly once.
  let outbound = {
    let conversations = state.conversations.lock().await;

    let mut outbound = vec![ChatMessage::system(SYSTEM_PROMPT)];
    if let Some(context) = relevant_context(&body.message) {
      outbound
        .push(ChatMessage::system(format!("Relevant Policy Information:\n{context}")));
    }
    if let Some(history) = conversations.get(&conversation_id) {
      let tail = history.len().saturating_sub(HISTORY_WINDOW - 1);
      for msg in &history[tail..] {
        outbound.push(ChatMessage { role: msg.role, content: msg.content.clone() });
      }
    }
    outbound.push(ChatMessage::user(body.message.clone()));
    outbound
  };

  let reply = state
    .generator
    .chat(&outbound)
    .await
    .map_err(|e| ApiError::Upstream(e.to_string()))?;

  {
    let mut conversations = state.conversations.lock().await;
    let history = conversations.entry(conversation_id).or_default();
    history.push(ConversationMessage {
      role:      Role::User,
      content:   body.message.clone(),
      timestamp: Utc::now(),
    });
    history.push(ConversationMessage {
      role:      Role::Assistant,
      content:   reply.clone(),
      timestamp: Utc::now(),
    });
  }

  Ok(Json(ChatResponse {
    conversation_id,
    requires_human_review: requires_human_review(intent, &body.message),
    suggested_actions: suggested_actions(intent),
    intent,
    message: reply,
  }))
}

/// `GET /assistant/conversations/:id`
pub async fn get_conversation<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ConversationMessage>>, ApiError> {
  let conversations = state.conversations.lock().await;
  conversations
    .get(&id)
    .cloned()
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("conversation {id} not found")))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn complaints_outrank_other_intents() {
    assert_eq!(
      classify_intent("I want to file a harassment complaint about my leave"),
      Intent::Complaint
    );
  }

  #[test]
  fn intent_keywords_map_to_expected_intents() {
    assert_eq!(classify_intent("How much vacation do I get?"), Intent::LeaveRequest);
    assert_eq!(classify_intent("What dental insurance is covered?"), Intent::BenefitsInquiry);
    assert_eq!(classify_intent("What is the procedure for expenses?"), Intent::PolicyQuestion);
    assert_eq!(classify_intent("Please update my address"), Intent::UpdateDetails);
    assert_eq!(classify_intent("Hello there"), Intent::GeneralInquiry);
  }

  #[test]
  fn sensitive_messages_require_human_review() {
    assert!(requires_human_review(
      Intent::GeneralInquiry,
      "I'm thinking about talking to a lawyer"
    ));
    assert!(requires_human_review(Intent::Complaint, "anything"));
    assert!(!requires_human_review(
      Intent::LeaveRequest,
      "How do I book time off?"
    ));
  }

  #[test]
  fn context_matches_multiple_policies() {
    let ctx = relevant_context("Can I take sick leave while working remote?")
      .expect("context expected");
    assert!(ctx.contains("Sick Leave Policy"));
    assert!(ctx.contains("Remote Work Policy"));
    assert!(ctx.contains("Annual Leave Policy"));
  }

  #[test]
  fn unmatched_message_has_no_context() {
    assert!(relevant_context("What's the wifi password?").is_none());
  }

  #[test]
  fn unknown_intent_suggests_contacting_hr() {
    assert_eq!(suggested_actions(Intent::GeneralInquiry), [
      "Contact HR for assistance"
    ]);
  }
}
