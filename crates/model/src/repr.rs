//! Python-style textual representation of values and models.
//!
//! Models render as `Person(age=70, name='Morty Smith')` with fields sorted,
//! strings in single quotes and datetimes broken into their components.

use std::fmt::{self, Formatter, Write};

use chrono::{Datelike, FixedOffset, Timelike};

use crate::model::Model;
use crate::value::Value;

/// Writes the representation of a single value.
pub(crate) fn write_value(f: &mut Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("None"),
        Value::Undefined => f.write_str("UNDEFINED"),
        Value::Bool(true) => f.write_str("True"),
        Value::Bool(false) => f.write_str("False"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Float(x) => write!(f, "{x:?}"),
        Value::Str(s) => write!(f, "'{s}'"),
        Value::Date(d) => write!(f, "date({}, {}, {})", d.year(), d.month(), d.day()),
        Value::NaiveDateTime(dt) => {
            write_datetime(f, dt.date(), dt.time(), None)
        }
        Value::DateTime(dt) => write_datetime(f, dt.date_naive(), dt.time(), Some(*dt.offset())),
        Value::List(items) => write_items(f, "[", items, "]"),
        Value::Tuple(items) if items.len() == 1 => {
            f.write_char('(')?;
            write_value(f, &items[0])?;
            f.write_str(",)")
        }
        Value::Tuple(items) => write_items(f, "(", items, ")"),
        Value::Set(items) if items.is_empty() => f.write_str("set()"),
        Value::Set(items) => write_items(f, "{", items, "}"),
        Value::Dict(map) => {
            f.write_char('{')?;
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "'{k}': ")?;
                write_value(f, v)?;
            }
            f.write_char('}')
        }
        Value::Model(model) => write_model(f, model),
    }
}

/// Writes `ClassName(field=value, ...)` over the serializable fields.
pub(crate) fn write_model(f: &mut Formatter<'_>, model: &Model) -> fmt::Result {
    write!(f, "{}(", model.type_name())?;
    for (i, (name, value)) in model.serializable_values().iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}=")?;
        write_value(f, value)?;
    }
    f.write_char(')')
}

fn write_items(f: &mut Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_value(f, item)?;
    }
    f.write_str(close)
}

fn write_datetime(
    f: &mut Formatter<'_>,
    date: chrono::NaiveDate,
    time: chrono::NaiveTime,
    offset: Option<FixedOffset>,
) -> fmt::Result {
    write!(
        f,
        "datetime({}, {}, {}, {}, {}, {}, {}, ",
        date.year(),
        date.month(),
        date.day(),
        time.hour(),
        time.minute(),
        time.second(),
        time.nanosecond() / 1_000,
    )?;
    match offset {
        None => f.write_str("None")?,
        Some(offset) if offset.local_minus_utc() == 0 => f.write_str("UTC")?,
        Some(offset) => {
            let secs = offset.local_minus_utc();
            let sign = if secs < 0 { '-' } else { '+' };
            let secs = secs.abs();
            write!(f, "UTC{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)?;
        }
    }
    f.write_char(')')
}
