use crate::model::JoinedRows;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Renders joined rows as a text table: one header row, then every record in
/// query order.
pub fn render_table(rows: &JoinedRows) -> String {
    let mut builder = Builder::default();
    builder.push_record(rows.columns.iter().cloned());
    for row in &rows.rows {
        builder.push_record(row.iter().map(|cell| cell.to_string()));
    }
    builder.build().with(Style::rounded()).to_string()
}
