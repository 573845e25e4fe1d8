//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a static table description.

use super::PgBindValue;
use serde_json::{Map, Value};

/// One column: name and the PostgreSQL type used to cast its parameter.
#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub pg_type: &'static str,
}

/// Table layout. The first column is the primary key.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn pk(&self) -> &Column {
        &self.columns[0]
    }
}

/// Quote identifier for PostgreSQL.
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub(crate) fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter typed by its column and returns its cast placeholder (`$n::type`).
    fn push_param(&mut self, column: &Column, v: Value) -> String {
        self.params.push(PgBindValue::for_column(column.pg_type, v));
        format!("${}::{}", self.params.len(), column.pg_type)
    }
}

fn select_column_list(table: &Table) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_id(schema: &str, table: &Table, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(table.pk(), id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(table),
        qualified_table(schema, table.name),
        quoted(table.pk().name),
        ph
    );
    q
}

/// Same as [`select_by_id`] but locks the row for the rest of the transaction.
pub fn select_by_id_for_update(schema: &str, table: &Table, id: Value) -> QueryBuf {
    let mut q = select_by_id(schema, table, id);
    q.sql.push_str(" FOR UPDATE");
    q
}

/// SELECT every row in creation order.
pub fn select_all(schema: &str, table: &Table) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY \"created_at\", {}",
        select_column_list(table),
        qualified_table(schema, table.name),
        quoted(table.pk().name)
    );
    q
}

/// SELECT rows where one column equals a value. Returns None when the column is unknown.
pub fn select_where(
    schema: &str,
    table: &Table,
    column: &str,
    value: Value,
    limit: Option<u32>,
) -> Option<QueryBuf> {
    let col = table.column(column)?;
    let mut q = QueryBuf::new();
    let ph = q.push_param(col, value);
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY \"created_at\", {}{}",
        select_column_list(table),
        qualified_table(schema, table.name),
        quoted(col.name),
        ph,
        quoted(table.pk().name),
        limit_clause
    );
    Some(q)
}

/// INSERT one row. Columns missing from `row` are bound as NULL.
pub fn insert(schema: &str, table: &Table, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(table.columns.len());
    let mut placeholders = Vec::with_capacity(table.columns.len());
    for c in table.columns {
        cols.push(quoted(c.name));
        placeholders.push(q.push_param(c, row.get(c.name).cloned().unwrap_or(Value::Null)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_table(schema, table.name),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE every non-key column from `row`, keyed by the row's primary key.
pub fn update(schema: &str, table: &Table, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = table.pk();
    let mut sets = Vec::with_capacity(table.columns.len());
    for c in table.columns.iter().skip(1) {
        let ph = q.push_param(c, row.get(c.name).cloned().unwrap_or(Value::Null));
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    let id_ph = q.push_param(pk, row.get(pk.name).cloned().unwrap_or(Value::Null));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        qualified_table(schema, table.name),
        sets.join(", "),
        quoted(pk.name),
        id_ph
    );
    q
}

/// DELETE by primary key.
pub fn delete(schema: &str, table: &Table, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(table.pk(), id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified_table(schema, table.name),
        quoted(table.pk().name),
        ph
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PETS: Table = Table {
        name: "pets",
        columns: &[
            Column { name: "id", pg_type: "uuid" },
            Column { name: "name", pg_type: "text" },
            Column { name: "created_at", pg_type: "timestamptz" },
        ],
    };

    #[test]
    fn insert_binds_every_column_in_order() {
        let row = json!({"id": "a", "name": "Rex"});
        let q = insert("hbnb", &PETS, row.as_object().unwrap());
        assert_eq!(
            q.sql,
            "INSERT INTO \"hbnb\".\"pets\" (\"id\", \"name\", \"created_at\") VALUES ($1::uuid, $2::text, $3::timestamptz)"
        );
        assert_eq!(
            q.params,
            vec![
                PgBindValue::String("a".into()),
                PgBindValue::String("Rex".into()),
                PgBindValue::Null
            ]
        );
    }

    #[test]
    fn update_puts_key_last() {
        let row = json!({"id": "a", "name": "Rex", "created_at": "t"});
        let q = update("s", &PETS, row.as_object().unwrap());
        assert_eq!(
            q.sql,
            "UPDATE \"s\".\"pets\" SET \"name\" = $1::text, \"created_at\" = $2::timestamptz WHERE \"id\" = $3::uuid"
        );
        assert_eq!(q.params.last(), Some(&PgBindValue::String("a".into())));
    }

    #[test]
    fn select_where_ignores_unknown_columns() {
        assert!(select_where("s", &PETS, "password", json!("x"), None).is_none());
        let q = select_where("s", &PETS, "name", json!("Rex"), Some(1)).unwrap();
        assert!(q.sql.contains("WHERE \"name\" = $1::text"));
        assert_eq!(q.params, vec![PgBindValue::String("Rex".into())]);
        assert!(q.sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(qualified_table("we\"ird", "t"), "\"we\"\"ird\".\"t\"");
    }
}
