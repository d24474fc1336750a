//! Form types and their table descriptors.
//!
//! The five evaluation categories are a closed set. Every piece of SQL that
//! touches an evaluation table takes its identifiers from a [`FormType`]
//! variant, never from caller-supplied text, so table and column names can
//! be spliced into statements while values stay bound parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Column holding the review deadline on reviewable tables.
pub const REVIEW_END_COLUMN: &str = "review_end_time";

/// Column holding the publicity deadline on every table.
pub const PUBLICITY_END_COLUMN: &str = "publicity_end_time";

/// One of the five evaluation categories, each backed by its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    /// 月度德育评测
    MonthlyMoral,
    /// 科研竞赛评测
    ResearchCompetition,
    /// 文体活动评测
    SportsArts,
    /// 学期德育评测
    SemesterMoral,
    /// 综合测评结果
    ComprehensiveResult,
}

impl FormType {
    /// All form types, in publicity-scan order.
    pub const ALL: [FormType; 5] = [
        FormType::ComprehensiveResult,
        FormType::MonthlyMoral,
        FormType::SemesterMoral,
        FormType::ResearchCompetition,
        FormType::SportsArts,
    ];

    /// Form types that carry a review deadline and a raw-score formula.
    pub const REVIEWABLE: [FormType; 3] = [
        FormType::MonthlyMoral,
        FormType::ResearchCompetition,
        FormType::SportsArts,
    ];

    /// Physical table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            FormType::MonthlyMoral => "moral_monthly_evaluation",
            FormType::ResearchCompetition => "research_competition_evaluation",
            FormType::SportsArts => "sports_arts_evaluation",
            FormType::SemesterMoral => "moral_semester_evaluation",
            FormType::ComprehensiveResult => "comprehensive_result",
        }
    }

    /// Human-readable name used in notifications and operator messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            FormType::MonthlyMoral => "月度德育评测",
            FormType::ResearchCompetition => "科研竞赛评测",
            FormType::SportsArts => "文体活动评测",
            FormType::SemesterMoral => "学期德育评测",
            FormType::ComprehensiveResult => "综合测评结果",
        }
    }

    /// Code the configuration UI sends when publishing a form.
    pub fn request_code(&self) -> &'static str {
        match self {
            FormType::MonthlyMoral => "MONTHLY_A",
            FormType::ResearchCompetition => "TYPE_C",
            FormType::SportsArts => "TYPE_D",
            FormType::SemesterMoral => "SEMESTER_A",
            FormType::ComprehensiveResult => "COMPREHENSIVE",
        }
    }

    /// Serialized name, e.g. `monthly_moral`.
    fn snake_name(&self) -> &'static str {
        match self {
            FormType::MonthlyMoral => "monthly_moral",
            FormType::ResearchCompetition => "research_competition",
            FormType::SportsArts => "sports_arts",
            FormType::SemesterMoral => "semester_moral",
            FormType::ComprehensiveResult => "comprehensive_result",
        }
    }

    pub fn is_reviewable(&self) -> bool {
        Self::REVIEWABLE.contains(self)
    }

    /// Review deadline column, present only on reviewable tables.
    pub fn review_deadline_column(&self) -> Option<&'static str> {
        self.is_reviewable().then_some(REVIEW_END_COLUMN)
    }

    pub fn publicity_deadline_column(&self) -> &'static str {
        PUBLICITY_END_COLUMN
    }

    /// Monthly rows are additionally keyed by month.
    pub fn has_month(&self) -> bool {
        matches!(self, FormType::MonthlyMoral)
    }

    /// Tables that carry base/bonus/penalty score columns.
    pub fn has_score_columns(&self) -> bool {
        !matches!(self, FormType::ComprehensiveResult)
    }

    /// Builds the default descriptor for this form type.
    pub fn descriptor(&self) -> TableDescriptor {
        TableDescriptor::new(*self)
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for FormType {
    type Err = DomainError;

    /// Accepts the table name, the request code, or the snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FormType::ALL
            .into_iter()
            .find(|f| {
                f.table_name() == s
                    || f.request_code().eq_ignore_ascii_case(s)
                    || f.snake_name() == s
            })
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UnknownFormType,
                    format!("Unsupported form type: {}", s),
                )
            })
    }
}

/// Static description of one evaluation table as the lifecycle sees it.
///
/// Descriptor lists are handed to the engine and the publicity watcher at
/// construction; tests pass reduced lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub form: FormType,
    pub display_name: String,
}

impl TableDescriptor {
    pub fn new(form: FormType) -> Self {
        Self {
            form,
            display_name: form.display_name().to_string(),
        }
    }

    /// Descriptors for all five tables.
    pub fn all() -> Vec<TableDescriptor> {
        FormType::ALL.iter().map(FormType::descriptor).collect()
    }

    /// Descriptors for the three tables with a review deadline.
    pub fn reviewable() -> Vec<TableDescriptor> {
        FormType::REVIEWABLE.iter().map(FormType::descriptor).collect()
    }

    pub fn table_name(&self) -> &'static str {
        self.form.table_name()
    }

    pub fn has_review_deadline(&self) -> bool {
        self.form.review_deadline_column().is_some()
    }
}
