//! Row types for the four smoker tables and the joined view over them.

use crate::error::InputError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSmoker {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub contact_information: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSmokingHabit {
    pub start_date: Option<NaiveDate>,
    pub quit_date: Option<NaiveDate>,
    pub cigarettes_per_day: i32,
    pub pack_years: i32,
    pub smoking_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHealthRecord {
    pub record_date: NaiveDate,
    pub health_condition: String,
    pub diagnosis_date: Option<NaiveDate>,
    pub treatment_history: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDemographics {
    pub education_level: String,
    pub income_level: String,
    pub employment_status: String,
    pub ethnicity: String,
    pub location: String,
}

/// Everything collected for one new smoker; written as a single unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSmokerProfile {
    pub smoker: NewSmoker,
    pub habit: NewSmokingHabit,
    pub health: NewHealthRecord,
    pub demographics: NewDemographics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
    Date,
}

/// One column of the four-way join, with the table alias it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedColumn {
    pub name: &'static str,
    pub table: &'static str,
    pub kind: ColumnKind,
}

impl JoinedColumn {
    const fn new(table: &'static str, name: &'static str, kind: ColumnKind) -> Self {
        JoinedColumn { name, table, kind }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// Columns of the joined record, in output order. `smoker_id` is taken from
/// `smokers` only.
pub const JOINED_COLUMNS: [JoinedColumn; 23] = [
    JoinedColumn::new("s", "smoker_id", ColumnKind::Int),
    JoinedColumn::new("s", "first_name", ColumnKind::Text),
    JoinedColumn::new("s", "last_name", ColumnKind::Text),
    JoinedColumn::new("s", "date_of_birth", ColumnKind::Date),
    JoinedColumn::new("s", "gender", ColumnKind::Text),
    JoinedColumn::new("s", "contact_information", ColumnKind::Text),
    JoinedColumn::new("sh", "habit_id", ColumnKind::Int),
    JoinedColumn::new("sh", "start_date", ColumnKind::Date),
    JoinedColumn::new("sh", "quit_date", ColumnKind::Date),
    JoinedColumn::new("sh", "cigarettes_per_day", ColumnKind::Int),
    JoinedColumn::new("sh", "pack_years", ColumnKind::Int),
    JoinedColumn::new("sh", "smoking_status", ColumnKind::Text),
    JoinedColumn::new("hr", "record_id", ColumnKind::Int),
    JoinedColumn::new("hr", "record_date", ColumnKind::Date),
    JoinedColumn::new("hr", "health_condition", ColumnKind::Text),
    JoinedColumn::new("hr", "diagnosis_date", ColumnKind::Date),
    JoinedColumn::new("hr", "treatment_history", ColumnKind::Text),
    JoinedColumn::new("hr", "severity", ColumnKind::Text),
    JoinedColumn::new("d", "education_level", ColumnKind::Text),
    JoinedColumn::new("d", "income_level", ColumnKind::Text),
    JoinedColumn::new("d", "employment_status", ColumnKind::Text),
    JoinedColumn::new("d", "ethnicity", ColumnKind::Text),
    JoinedColumn::new("d", "location", ColumnKind::Text),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Null,
    Int(i64),
    Text(String),
    Date(NaiveDate),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Result of a join query: column headers plus rows in query order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinedRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl JoinedRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Every value in the named column, top to bottom.
    pub fn column_values(&self, name: &str) -> Vec<&Cell> {
        match self.column_index(name) {
            Some(index) => self.rows.iter().map(|row| &row[index]).collect(),
            None => Vec::new(),
        }
    }
}

/// One bar of the cigarettes-per-day chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub smoker_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub cigarettes_per_day: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Blank input means ascending; anything other than ASC/DESC is `None`.
    pub fn from_input(input: &str) -> Option<SortOrder> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Some(SortOrder::Asc);
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A sort key that is guaranteed to be one of [`JOINED_COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortColumn(JoinedColumn);

impl SortColumn {
    pub fn column(&self) -> &JoinedColumn {
        &self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }
}

impl Default for SortColumn {
    fn default() -> Self {
        SortColumn(JOINED_COLUMNS[2])
    }
}

impl FromStr for SortColumn {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Ok(SortColumn::default());
        }
        JOINED_COLUMNS
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .map(|c| SortColumn(*c))
            .ok_or_else(|| InputError::UnknownColumn(wanted.to_string()))
    }
}
