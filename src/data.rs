use serde_json::Value as JsonValue;

use crate::type_map::SqlType;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn from_cell(cell: &JsonValue, sql_type: SqlType) -> Value {
        match sql_type {
            SqlType::Text => text_value(cell),
            SqlType::Integer => integer_value(cell),
            SqlType::Numeric => numeric_value(cell),
        }
    }
}

fn text_value(cell: &JsonValue) -> Value {
    match cell {
        JsonValue::Null => Value::Null,
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        JsonValue::Number(n) => Value::Text(n.to_string()),
        other => Value::Text(other.to_string()),
    }
}

fn integer_value(cell: &JsonValue) -> Value {
    match cell {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(i64::from(*b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Real))
            .unwrap_or(Value::Null),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Integer(1),
            "false" => Value::Integer(0),
            trimmed => trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(s.clone())),
        },
        other => Value::Text(other.to_string()),
    }
}

fn numeric_value(cell: &JsonValue) -> Value {
    match cell {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(i64::from(*b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Real))
            .unwrap_or(Value::Null),
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}
