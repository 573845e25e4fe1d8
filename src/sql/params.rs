//! Convert serde_json::Value to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value that can be bound to a PostgreSQL query. Converts from serde_json::Value.
/// Placeholders carry an explicit cast, so each variant only has to declare its own wire type.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(uuid::Uuid),
    Json(Value),
}

impl PgBindValue {
    /// Untyped conversion. Strings always stay text.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PgBindValue::I64(i)
                } else {
                    PgBindValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }

    /// Conversion driven by the column's declared type, so text that happens to
    /// parse as a UUID or a number is bound unchanged.
    pub fn for_column(pg_type: &str, v: Value) -> Self {
        match (pg_type, v) {
            (_, Value::Null) => PgBindValue::Null,
            ("uuid", Value::String(s)) => match uuid::Uuid::parse_str(&s) {
                Ok(u) => PgBindValue::Uuid(u),
                Err(_) => PgBindValue::String(s),
            },
            ("text" | "timestamptz", Value::String(s)) => PgBindValue::String(s),
            ("text", other) => PgBindValue::String(other.to_string()),
            ("double precision", Value::Number(n)) => PgBindValue::F64(n.as_f64().unwrap_or(0.0)),
            (_, other) => PgBindValue::from_json(&other),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            PgBindValue::Null => Ok(IsNull::Yes),
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf),
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            PgBindValue::String(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf),
            PgBindValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf),
            PgBindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::String(_) => <String as Type<Postgres>>::type_info(),
            PgBindValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as Type<Postgres>>::type_info(),
            PgBindValue::F64(_) => <f64 as Type<Postgres>>::type_info(),
            PgBindValue::Uuid(_) => <uuid::Uuid as Type<Postgres>>::type_info(),
            PgBindValue::Json(_) => <Value as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_pick_their_variant() {
        assert_eq!(PgBindValue::from_json(&json!(null)), PgBindValue::Null);
        assert_eq!(PgBindValue::from_json(&json!(true)), PgBindValue::Bool(true));
        assert_eq!(PgBindValue::from_json(&json!(4)), PgBindValue::I64(4));
        assert_eq!(PgBindValue::from_json(&json!(4.5)), PgBindValue::F64(4.5));
        assert_eq!(
            PgBindValue::from_json(&json!("ada@example.com")),
            PgBindValue::String("ada@example.com".into())
        );
    }

    #[test]
    fn uuid_looking_text_stays_text() {
        for text in [
            "550E8400E29B41D4A716446655440000",
            "{00000000-0000-0000-0000-000000000001}",
            "urn:uuid:550e8400-e29b-41d4-a716-446655440000",
        ] {
            assert_eq!(PgBindValue::for_column("text", json!(text)), PgBindValue::String(text.into()));
        }
    }

    #[test]
    fn column_type_drives_the_variant() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(PgBindValue::for_column("uuid", json!(id.to_string())), PgBindValue::Uuid(id));
        assert_eq!(PgBindValue::for_column("double precision", json!(40)), PgBindValue::F64(40.0));
        assert_eq!(PgBindValue::for_column("integer", json!(4)), PgBindValue::I64(4));
        assert_eq!(PgBindValue::for_column("boolean", json!(false)), PgBindValue::Bool(false));
        assert_eq!(
            PgBindValue::for_column("timestamptz", json!("2024-01-01T00:00:00Z")),
            PgBindValue::String("2024-01-01T00:00:00Z".into())
        );
        assert_eq!(PgBindValue::for_column("text", Value::Null), PgBindValue::Null);
    }
}
