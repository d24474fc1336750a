//! Academic calendar value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FormType;
use crate::domain::foundation::ValidationError;

/// Academic year in `YYYY-YYYY` form, the second year following the first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcademicYear {
    start: i32,
}

impl AcademicYear {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = || {
            ValidationError::invalid_format("academic_year", format!("expected YYYY-YYYY, got '{}'", s))
        };
        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        if first.len() != 4 || second.len() != 4 {
            return Err(invalid());
        }
        let start: i32 = first.parse().map_err(|_| invalid())?;
        let end: i32 = second.parse().map_err(|_| invalid())?;
        if end != start + 1 {
            return Err(ValidationError::invalid_format(
                "academic_year",
                format!("years must be consecutive, got '{}'", s),
            ));
        }
        Ok(Self { start })
    }

    pub fn start_year(&self) -> i32 {
        self.start
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.start + 1)
    }
}

impl TryFrom<String> for AcademicYear {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AcademicYear> for String {
    fn from(year: AcademicYear) -> Self {
        year.to_string()
    }
}

/// First or second semester of an academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    pub fn number(&self) -> i16 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

impl TryFrom<i16> for Semester {
    type Error = ValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::First),
            2 => Ok(Semester::Second),
            other => Err(ValidationError::out_of_range("semester", 1, 2, other as i32)),
        }
    }
}

impl From<Semester> for i16 {
    fn from(s: Semester) -> Self {
        s.number()
    }
}

/// The period a form covers: year, semester, and for monthly forms a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicTerm {
    pub academic_year: AcademicYear,
    pub semester: Semester,
    pub month: Option<u8>,
}

impl AcademicTerm {
    /// Builds a term for `form`. Monthly forms need a month; others must not carry one.
    pub fn for_form(
        form: FormType,
        academic_year: AcademicYear,
        semester: Semester,
        month: Option<u8>,
    ) -> Result<Self, ValidationError> {
        let month = match (form.has_month(), month) {
            (true, Some(m)) if (1..=12).contains(&m) => Some(m),
            (true, Some(m)) => return Err(ValidationError::out_of_range("month", 1, 12, m as i32)),
            (true, None) => return Err(ValidationError::empty_field("month")),
            (false, Some(_)) => {
                return Err(ValidationError::invalid_format(
                    "month",
                    "only monthly forms are keyed by month",
                ))
            }
            (false, None) => None,
        };
        Ok(Self {
            academic_year,
            semester,
            month,
        })
    }
}
