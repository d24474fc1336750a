//! Request and response bodies for the evaluation endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::evaluation::{TableOutcome, TableResult, TransitionReport};
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Lifecycle triggers
// ════════════════════════════════════════════════════════════════════════════════

/// Body of every lifecycle trigger response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    pub tables: Vec<TableOutcomeResponse>,
}

impl TriggerResponse {
    /// Successful unless some table failed.
    pub fn from_report(report: &TransitionReport, success_message: &str) -> Self {
        let success = report.is_success();
        let message = if success {
            success_message.to_string()
        } else {
            let failed: Vec<&str> = report.failures().map(|o| o.display_name.as_str()).collect();
            format!("部分评测表处理失败: {}", failed.join("、"))
        };

        Self {
            success,
            message,
            tables: report.outcomes.iter().map(TableOutcomeResponse::from).collect(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tables: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableOutcomeResponse {
    pub table: String,
    pub display_name: String,
    /// `transitioned`, `skipped` or `failed`
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&TableOutcome> for TableOutcomeResponse {
    fn from(outcome: &TableOutcome) -> Self {
        let (kind, affected, notified, reason) = match &outcome.result {
            TableResult::Transitioned { affected, notified } => {
                ("transitioned", Some(*affected), Some(*notified), None)
            }
            TableResult::Skipped(reason) => ("skipped", None, None, Some(reason.describe())),
            TableResult::Failed { message } => ("failed", None, None, Some(message.clone())),
        };

        Self {
            table: outcome.table.to_string(),
            display_name: outcome.display_name.clone(),
            outcome: kind.to_string(),
            affected,
            notified,
            reason,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Review actions
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/review/batch-approve`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchApproveRequest {
    /// Table name, request code or form name
    pub form_type: String,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchApproveResponse {
    pub success: bool,
    pub message: String,
    pub approved: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPublicityResponse {
    pub success: bool,
    pub message: String,
    pub opened: u64,
    pub notified: u64,
}

// ════════════════════════════════════════════════════════════════════════════════
// Publishing
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/evaluation-config/publish`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishEvaluationRequest {
    pub form_type: String,
    /// `YYYY-YYYY`
    pub academic_year: String,
    pub semester: i16,
    #[serde(default)]
    pub month: Option<u8>,
    #[serde(default)]
    pub description: Option<String>,
    pub base_score: Decimal,

    /// Defaults to the caller's department.
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub squad: Option<String>,
    #[serde(default)]
    pub major: Option<String>,

    #[serde(default)]
    pub declare_start_time: Option<Timestamp>,
    #[serde(default)]
    pub declare_end_time: Option<Timestamp>,
    #[serde(default)]
    pub review_end_time: Option<Timestamp>,
    #[serde(default)]
    pub publicity_start_time: Option<Timestamp>,
    #[serde(default)]
    pub publicity_end_time: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEvaluationResponse {
    pub success: bool,
    pub message: String,
    pub created: u64,
}

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::{FormType, SkipReason};

    fn report() -> TransitionReport {
        let mut report = TransitionReport::default();
        report.push(TableOutcome::transitioned(&FormType::MonthlyMoral.descriptor(), 3));
        report.push(TableOutcome::skipped(
            &FormType::ResearchCompetition.descriptor(),
            SkipReason::TableMissing,
        ));
        report
    }

    #[test]
    fn trigger_response_lists_every_table() {
        let body = TriggerResponse::from_report(&report(), "ok");

        assert!(body.success);
        assert_eq!(body.message, "ok");
        assert_eq!(body.tables.len(), 2);
        assert_eq!(body.tables[0].outcome, "transitioned");
        assert_eq!(body.tables[0].affected, Some(3));
        assert_eq!(body.tables[1].outcome, "skipped");
        assert_eq!(body.tables[1].reason.as_deref(), Some("table does not exist"));
    }

    #[test]
    fn failed_table_makes_response_unsuccessful() {
        let mut report = report();
        report.push(TableOutcome::failed(&FormType::SportsArts.descriptor(), "boom"));

        let body = TriggerResponse::from_report(&report, "ok");

        assert!(!body.success);
        assert!(body.message.contains(FormType::SportsArts.display_name()));
    }

    #[test]
    fn skipped_table_omits_counts_in_json() {
        let body = TriggerResponse::from_report(&report(), "ok");
        let json = serde_json::to_value(&body).unwrap();

        assert!(json["tables"][1].get("affected").is_none());
        assert_eq!(json["tables"][1]["table"], FormType::ResearchCompetition.table_name());
    }

    #[test]
    fn publish_request_parses_timestamps_and_decimal() {
        let req: PublishEvaluationRequest = serde_json::from_value(serde_json::json!({
            "form_type": "MONTHLY_A",
            "academic_year": "2023-2024",
            "semester": 1,
            "month": 10,
            "base_score": "80",
            "review_end_time": "2024-01-10 00:00:00",
            "publicity_end_time": "2024-01-20"
        }))
        .unwrap();

        assert_eq!(req.base_score, Decimal::from(80));
        assert_eq!(req.review_end_time.unwrap().to_string(), "2024-01-10 00:00:00");
        assert_eq!(req.publicity_end_time.unwrap().to_string(), "2024-01-20 00:00:00");
        assert!(req.department.is_none());
    }
}
