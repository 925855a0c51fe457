use {
    std::collections::BTreeMap,
    url::form_urlencoded,
};

/// Outbound flat name=value field list.
///
/// Insertion order is preserved so a payload built twice from the same
/// order encodes to the same byte string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NvpPayload {
    fields: Vec<(String, String)>,
}

impl NvpPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.fields {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

/// Parsed flat response (or inbound notification body).
///
/// The processor signals errors through an `ACK`-style field rather than
/// the HTTP status, so callers check `ack_success` explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NvpResponse {
    fields: BTreeMap<String, String>,
}

impl NvpResponse {
    pub fn parse(body: &str) -> Self {
        let fields = form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Non-empty field lookup; blank values count as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn ack_success(&self) -> bool {
        self.get("ACK") == Some("Success")
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}
