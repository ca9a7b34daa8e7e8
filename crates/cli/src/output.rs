use crate::error::CliError;
use engine_core::page::Page;
use model::{core::value::Value, pagination::cursor::Cursor};
use serde_json::json;

pub fn page_json(page: &Page) -> serde_json::Value {
    let records = page
        .records
        .iter()
        .map(|record| record.to_json())
        .collect::<Vec<_>>();

    json!({
        "records": records,
        "next_cursor": page.next_cursor.as_ref().map(Cursor::encode),
        "previous_cursor": page.previous_cursor.as_ref().map(Cursor::encode),
    })
}

pub fn print_page(page: &Page) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&page_json(page))?;
    println!("{json}");
    Ok(())
}

pub fn sql_json(sql: &str, params: &[Value]) -> serde_json::Value {
    json!({
        "sql": sql,
        "params": params.iter().map(Value::to_json).collect::<Vec<_>>(),
    })
}

pub fn print_sql(sql: &str, params: &[Value]) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&sql_json(sql, params))?;
    println!("{json}");
    Ok(())
}

pub fn print_cursor(cursor: &Cursor) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(cursor)?;
    println!("{json}");
    Ok(())
}
