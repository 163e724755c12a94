use serde_json::{Map, Value};

/// Line that opens and closes a metadata block.
pub const MARKER: &str = "---";

/// One metadata block plus its free-text body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    pub metadata: Map<String, Value>,
    pub body: String,
}

impl RawDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a metadata key. `Value::Null` entries are still written, as `null`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

/// Parses a single document: a `---` delimited YAML block followed by a body.
///
/// Input without an opening marker, or with an unterminated block, yields an
/// empty document. Callers treat that as "no document".
pub fn parse_document(input: &str) -> RawDocument {
    let mut lines = input.trim_start().lines();

    match lines.next() {
        Some(first) if first.trim_end() == MARKER => {}
        _ => return RawDocument::default(),
    }

    let mut block = Vec::new();
    let mut closed = false;

    for line in lines.by_ref() {
        if line.trim_end() == MARKER {
            closed = true;
            break;
        }
        block.push(line);
    }

    if !closed {
        return RawDocument::default();
    }

    let rest: Vec<&str> = lines.collect();
    RawDocument {
        metadata: parse_metadata(&block),
        body: trim_blank_lines(&rest.join("\n")),
    }
}

/// Serializes a document back into the store format.
pub fn render_document(doc: &RawDocument) -> String {
    let mut out = String::from(MARKER);
    out.push('\n');
    if !doc.metadata.is_empty() {
        match serde_yaml::to_string(&doc.metadata) {
            Ok(yaml) => out.push_str(&yaml),
            Err(e) => tracing::warn!("Could not render metadata block: {e}"),
        }
    }
    out.push_str(MARKER);

    let body = trim_blank_lines(&doc.body);
    if !body.is_empty() {
        out.push_str("\n\n");
        out.push_str(&body);
    }
    out
}

/// Reads the metadata block as YAML. Blocks YAML rejects, such as hand-written
/// `title: Engineer: Platform` lines, are read one `key: value` line at a time.
fn parse_metadata(block: &[&str]) -> Map<String, Value> {
    if block.iter().all(|line| line.trim().is_empty()) {
        return Map::new();
    }
    let yaml = block.join("\n");
    match serde_yaml::from_str::<serde_yaml::Value>(&yaml) {
        Ok(serde_yaml::Value::Null) => Map::new(),
        Ok(value @ serde_yaml::Value::Mapping(_)) => match serde_json::to_value(value) {
            Ok(Value::Object(map)) => map,
            _ => parse_lines(block),
        },
        Ok(_) => parse_lines(block),
        Err(e) => {
            tracing::debug!("Metadata block is not valid YAML, reading it line by line: {e}");
            parse_lines(block)
        }
    }
}

fn parse_lines(block: &[&str]) -> Map<String, Value> {
    block.iter().filter_map(|line| parse_metadata_line(line)).collect()
}

fn parse_metadata_line(line: &str) -> Option<(String, Value)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let Some((key, value)) = trimmed.split_once(':') else {
        tracing::debug!("Ignoring metadata line without a key: {trimmed}");
        return None;
    };
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), parse_scalar(value.trim())))
}

/// Types one value from a line-by-line read. Anything YAML would turn into a
/// nested mapping stays the literal string.
fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) if raw.starts_with(['[', '{']) => value,
        Ok(Value::Array(_) | Value::Object(_)) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

/// Strips leading and trailing blank lines, keeping indentation of the first
/// non-blank line.
pub(crate) fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}
