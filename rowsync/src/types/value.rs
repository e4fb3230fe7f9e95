use serde::Serialize;

/// A single column value as decoded from the upstream stream.
///
/// [`ScalarValue`] covers every scalar the binlog wire format can carry after decoding.
/// A SQL `NULL` is the explicit [`ScalarValue::Null`] variant so that sinks can tell
/// "present with null" apart from "absent". Serialization is untagged: values render
/// as their natural JSON scalar and `Null` renders as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    /// Returns whether this value is the explicit SQL null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        ScalarValue::UInt(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(serde_json::to_string(&ScalarValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&ScalarValue::Int(-7)).unwrap(), "-7");
        assert_eq!(
            serde_json::to_string(&ScalarValue::Text("alice".into())).unwrap(),
            "\"alice\""
        );
        assert_eq!(
            serde_json::to_string(&ScalarValue::Double(1.5)).unwrap(),
            "1.5"
        );
    }
}
