use serde_json::{Map, Value, json};

/// Incrementally constructed tagged record. Every builder factory writes its
/// fields through one of three verbs, so the compaction behavior of each
/// field is visible at the factory itself:
///
/// - [`Record::set`]: the field is always present.
/// - [`Record::set_opt`]: the field is omitted when the caller didn't
///   supply it.
/// - [`Record::set_flag`]: the field is omitted when absent *or* `false`.
///   An explicit `false` is indistinguishable from not passing the flag at
///   all. Every flag in the current field set defaults to false on the
///   platform side, so the omission is equivalent; a future field whose
///   meaningful default is true must use `set_opt` instead.
#[derive(Debug)]
pub struct Record {
    map: Map<String, Value>,
}

impl Record {
    /// Start a record with a `type` tag.
    pub fn tagged(kind: &str) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(kind.to_string()));
        Record { map }
    }

    /// Start a record without a `type` tag (options, filters, dialogs).
    pub fn untagged() -> Self {
        Record { map: Map::new() }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    pub fn set_opt(&mut self, key: &str, value: Option<impl Into<Value>>) {
        if let Some(v) = value {
            self.map.insert(key.to_string(), v.into());
        }
    }

    pub fn set_flag(&mut self, key: &str, value: Option<bool>) {
        if value == Some(true) {
            self.map.insert(key.to_string(), Value::Bool(true));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

/// A text-like argument: either a plain string that gets wrapped into a
/// `plain_text`/`mrkdwn` sub-record, or an already-built record passed
/// through unchanged.
#[derive(Debug, Clone)]
pub enum TextArg {
    Plain(String),
    Built(Value),
}

impl TextArg {
    pub fn into_plain_text(self) -> Value {
        match self {
            TextArg::Plain(text) => json!({ "type": "plain_text", "text": text }),
            TextArg::Built(value) => value,
        }
    }

    pub fn into_mrkdwn(self) -> Value {
        match self {
            TextArg::Plain(text) => json!({ "type": "mrkdwn", "text": text }),
            TextArg::Built(value) => value,
        }
    }
}

impl From<&str> for TextArg {
    fn from(text: &str) -> Self {
        TextArg::Plain(text.to_string())
    }
}

impl From<String> for TextArg {
    fn from(text: String) -> Self {
        TextArg::Plain(text)
    }
}

impl From<&String> for TextArg {
    fn from(text: &String) -> Self {
        TextArg::Plain(text.clone())
    }
}

impl From<Value> for TextArg {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => TextArg::Plain(text),
            other => TextArg::Built(other),
        }
    }
}
