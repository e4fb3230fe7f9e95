use mysql_async::binlog::row::BinlogRow;
use mysql_async::binlog::value::BinlogValue;
use mysql_async::Value;

use crate::bail;
use crate::error::{ErrorKind, RowsyncResult};
use crate::types::ScalarValue;

/// Converts one decoded binlog row into scalar values in physical column order.
///
/// Columns absent from the row image (binlog_row_image below FULL) come through as
/// explicit nulls so the row width still matches the table schema.
pub(crate) fn scalars_from_row(row: &BinlogRow) -> RowsyncResult<Vec<ScalarValue>> {
    (0..row.len())
        .map(|index| match row.as_ref(index) {
            Some(value) => scalar_from_binlog(value),
            None => Ok(ScalarValue::Null),
        })
        .collect()
}

fn scalar_from_binlog(value: &BinlogValue<'_>) -> RowsyncResult<ScalarValue> {
    match value {
        BinlogValue::Value(value) => Ok(scalar_from_value(value)),
        BinlogValue::Jsonb(_) | BinlogValue::JsonDiff(_) => bail!(
            ErrorKind::UnsupportedValue,
            "JSON binlog values are not supported"
        ),
    }
}

fn scalar_from_value(value: &Value) -> ScalarValue {
    match value {
        Value::NULL => ScalarValue::Null,
        Value::Int(int) => ScalarValue::Int(*int),
        Value::UInt(uint) => ScalarValue::UInt(*uint),
        Value::Float(float) => ScalarValue::Float(*float),
        Value::Double(double) => ScalarValue::Double(*double),
        // Text and blob columns share one wire representation; valid UTF-8 is
        // handed on as text, everything else stays raw bytes.
        Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => ScalarValue::Text(text.to_owned()),
            Err(_) => ScalarValue::Bytes(bytes.clone()),
        },
        Value::Date(year, month, day, hour, minute, second, micros) => {
            ScalarValue::Text(format_date(
                *year, *month, *day, *hour, *minute, *second, *micros,
            ))
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            ScalarValue::Text(format_time(
                *negative, *days, *hours, *minutes, *seconds, *micros,
            ))
        }
    }
}

fn format_date(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8, micros: u32) -> String {
    let mut formatted = format!("{year:04}-{month:02}-{day:02}");
    if hour != 0 || minute != 0 || second != 0 || micros != 0 {
        formatted.push_str(&format!(" {hour:02}:{minute:02}:{second:02}"));
        if micros != 0 {
            formatted.push_str(&format!(".{micros:06}"));
        }
    }
    formatted
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let total_hours = u64::from(days) * 24 + u64::from(hours);
    let sign = if negative { "-" } else { "" };
    let mut formatted = format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}");
    if micros != 0 {
        formatted.push_str(&format!(".{micros:06}"));
    }
    formatted
}
