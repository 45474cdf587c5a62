use super::{DatabaseConnection, db_error};
use crate::model::{
    Cell, ChartPoint, ColumnKind, JOINED_COLUMNS, JoinedRows, NewSmokerProfile, SortColumn,
    SortOrder,
};
use anyhow::Result;
use chrono::NaiveDate;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::{debug, info};

const JOIN_FROM: &str = "FROM smokers s
    INNER JOIN smoking_habits sh ON s.smoker_id = sh.smoker_id
    INNER JOIN health_records hr ON s.smoker_id = hr.smoker_id
    INNER JOIN demographics d ON s.smoker_id = d.smoker_id";

/// Children first, so no foreign key is ever left dangling.
const DELETE_ORDER: [&str; 4] = ["demographics", "health_records", "smoking_habits", "smokers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotFound,
    Deleted { rows: u64 },
}

fn joined_select(filter: &str, order_by: &str) -> String {
    let columns = JOINED_COLUMNS
        .iter()
        .map(|c| c.qualified())
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {} {} {} ORDER BY {}", columns, JOIN_FROM, filter, order_by)
}

fn sorted_select(column: &SortColumn, order: SortOrder) -> String {
    joined_select(
        "",
        &format!(
            "{} {}, s.smoker_id ASC",
            column.column().qualified(),
            order.keyword()
        ),
    )
}

fn to_joined_rows(rows: &[Row]) -> Result<JoinedRows> {
    let mut out = JoinedRows {
        columns: JOINED_COLUMNS.iter().map(|c| c.name.to_string()).collect(),
        rows: Vec::with_capacity(rows.len()),
    };

    for row in rows {
        let mut cells = Vec::with_capacity(JOINED_COLUMNS.len());
        for (i, column) in JOINED_COLUMNS.iter().enumerate() {
            let cell = match column.kind {
                ColumnKind::Int => row
                    .try_get::<_, Option<i32>>(i)?
                    .map(|v| Cell::Int(v.into())),
                ColumnKind::Text => row.try_get::<_, Option<String>>(i)?.map(Cell::Text),
                ColumnKind::Date => row.try_get::<_, Option<NaiveDate>>(i)?.map(Cell::Date),
            };
            cells.push(cell.unwrap_or(Cell::Null));
        }
        out.rows.push(cells);
    }

    Ok(out)
}

impl DatabaseConnection {
    /// Writes all four rows for a new smoker in one transaction and returns
    /// the new `smoker_id`.
    pub async fn insert_profile(&mut self, profile: &NewSmokerProfile) -> Result<i32> {
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let s = &profile.smoker;
        let row = tx
            .query_one(
                "INSERT INTO smokers
                 (first_name, last_name, date_of_birth, gender, contact_information)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING smoker_id",
                &[
                    &s.first_name,
                    &s.last_name,
                    &s.date_of_birth,
                    &s.gender,
                    &s.contact_information,
                ],
            )
            .await
            .map_err(|e| db_error("Failed to insert smoker", e))?;
        let smoker_id: i32 = row.get(0);

        let h = &profile.habit;
        tx.execute(
            "INSERT INTO smoking_habits
             (smoker_id, start_date, quit_date, cigarettes_per_day, pack_years, smoking_status)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &smoker_id,
                &h.start_date,
                &h.quit_date,
                &h.cigarettes_per_day,
                &h.pack_years,
                &h.smoking_status,
            ],
        )
        .await
        .map_err(|e| db_error("Failed to insert smoking habit", e))?;

        let r = &profile.health;
        tx.execute(
            "INSERT INTO health_records
             (smoker_id, record_date, health_condition, diagnosis_date, treatment_history, severity)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &smoker_id,
                &r.record_date,
                &r.health_condition,
                &r.diagnosis_date,
                &r.treatment_history,
                &r.severity,
            ],
        )
        .await
        .map_err(|e| db_error("Failed to insert health record", e))?;

        let d = &profile.demographics;
        tx.execute(
            "INSERT INTO demographics
             (smoker_id, education_level, income_level, employment_status, ethnicity, location)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &smoker_id,
                &d.education_level,
                &d.income_level,
                &d.employment_status,
                &d.ethnicity,
                &d.location,
            ],
        )
        .await
        .map_err(|e| db_error("Failed to insert demographics", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit new smoker", e))?;
        info!(smoker_id, "created smoker");
        Ok(smoker_id)
    }

    async fn query_joined(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<JoinedRows> {
        debug!(sql, "joined query");
        let rows = self
            .client
            .query(sql, params)
            .await
            .map_err(|e| db_error("Failed to query records", e))?;
        to_joined_rows(&rows)
    }

    /// Joined records whose contact information matches exactly.
    pub async fn find_by_contact(&self, contact: &str) -> Result<JoinedRows> {
        let sql = joined_select("WHERE s.contact_information = $1", "s.smoker_id");
        self.query_joined(&sql, &[&contact]).await
    }

    pub async fn list_all(&self) -> Result<JoinedRows> {
        let sql = joined_select("", "s.smoker_id");
        self.query_joined(&sql, &[]).await
    }

    /// All joined records ordered by an allow-listed column.
    pub async fn list_sorted(&self, column: &SortColumn, order: SortOrder) -> Result<JoinedRows> {
        let sql = sorted_select(column, order);
        self.query_joined(&sql, &[]).await
    }

    /// Removes a smoker and every dependent row, or nothing at all.
    pub async fn delete_smoker(&mut self, smoker_id: i32) -> Result<DeleteOutcome> {
        let tx = self
            .client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to start transaction", e))?;

        let exists = tx
            .query_opt("SELECT 1 FROM smokers WHERE smoker_id = $1", &[&smoker_id])
            .await
            .map_err(|e| db_error("Failed to look up smoker", e))?
            .is_some();
        if !exists {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to end transaction", e))?;
            return Ok(DeleteOutcome::NotFound);
        }

        let mut removed = 0;
        for table in DELETE_ORDER {
            removed += tx
                .execute(
                    &format!("DELETE FROM {} WHERE smoker_id = $1", table),
                    &[&smoker_id],
                )
                .await
                .map_err(|e| db_error(&format!("Failed to delete from {}", table), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit delete", e))?;
        info!(smoker_id, rows = removed, "deleted smoker");
        Ok(DeleteOutcome::Deleted { rows: removed })
    }

    /// Cigarettes per day for every smoker with a habit row, by id.
    pub async fn chart_points(&self) -> Result<Vec<ChartPoint>> {
        let rows = self
            .client
            .query(
                "SELECT s.smoker_id, s.first_name, s.last_name, sh.cigarettes_per_day
                 FROM smokers s
                 INNER JOIN smoking_habits sh ON s.smoker_id = sh.smoker_id
                 ORDER BY s.smoker_id, sh.habit_id",
                &[],
            )
            .await
            .map_err(|e| db_error("Failed to query chart data", e))?;

        Ok(rows
            .iter()
            .map(|row| ChartPoint {
                smoker_id: row.get(0),
                first_name: row.get::<_, Option<String>>(1).unwrap_or_default(),
                last_name: row.get::<_, Option<String>>(2).unwrap_or_default(),
                cigarettes_per_day: row.get::<_, Option<i32>>(3).unwrap_or(0),
            })
            .collect())
    }

    pub async fn count_smokers(&self) -> Result<i64> {
        let row = self
            .client
            .query_one("SELECT COUNT(*) FROM smokers", &[])
            .await
            .map_err(|e| db_error("Failed to count smokers", e))?;
        Ok(row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_select_lists_every_column_once() {
        let sql = joined_select("", "s.smoker_id");
        let select_list = sql
            .strip_prefix("SELECT ")
            .and_then(|rest| rest.split(" FROM ").next())
            .unwrap();
        let selected: Vec<&str> = select_list.split(", ").collect();
        let expected: Vec<String> = JOINED_COLUMNS.iter().map(|c| c.qualified()).collect();
        assert_eq!(selected, expected);
        assert!(sql.ends_with("ORDER BY s.smoker_id"));
    }

    #[test]
    fn test_sorted_select_uses_qualified_column() {
        let column: SortColumn = "cigarettes_per_day".parse().unwrap();
        let sql = sorted_select(&column, SortOrder::Desc);
        assert!(sql.ends_with("ORDER BY sh.cigarettes_per_day DESC, s.smoker_id ASC"));
    }

    #[test]
    fn test_delete_order_is_children_first() {
        assert_eq!(DELETE_ORDER.last(), Some(&"smokers"));
        assert_eq!(DELETE_ORDER[0], "demographics");
    }
}
