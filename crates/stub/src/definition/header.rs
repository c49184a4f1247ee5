use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Formatter;

/// A header name with one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    key: String,
    values: Vec<String>,
}

impl HttpHeader {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), values: vec![value.into()] }
    }

    pub fn with_values<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { key: key.into(), values: values.into_iter().map(Into::into).collect() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    fn matches(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

/// An ordered list of headers. Names compare case-insensitively; adding a header whose name
/// is already present appends to its values.
///
/// On the wire a header with a single value is a string, otherwise an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpHeaders {
    headers: Vec<HttpHeader>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plus(mut self, header: HttpHeader) -> Self {
        self.push(header);
        self
    }

    pub fn push(&mut self, header: HttpHeader) {
        match self.headers.iter_mut().find(|existing| existing.matches(&header.key)) {
            Some(existing) => existing.values.extend(header.values),
            None => self.headers.push(header),
        }
    }

    pub fn get(&self, key: &str) -> Option<&HttpHeader> {
        self.headers.iter().find(|header| header.matches(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HttpHeader> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl From<Vec<HttpHeader>> for HttpHeaders {
    fn from(headers: Vec<HttpHeader>) -> Self {
        headers.into_iter().collect()
    }
}

impl FromIterator<HttpHeader> for HttpHeaders {
    fn from_iter<T: IntoIterator<Item = HttpHeader>>(iter: T) -> Self {
        let mut headers = HttpHeaders::new();
        for header in iter {
            headers.push(header);
        }
        headers
    }
}

impl Serialize for HttpHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for header in &self.headers {
            match header.values.as_slice() {
                [single] => map.serialize_entry(&header.key, single)?,
                values => map.serialize_entry(&header.key, values)?,
            }
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

struct HeadersVisitor;

impl<'de> Visitor<'de> for HeadersVisitor {
    type Value = HttpHeaders;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a map of header names to a string or an array of strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut headers = HttpHeaders::new();
        while let Some((key, values)) = access.next_entry::<String, HeaderValues>()? {
            let header = match values {
                HeaderValues::One(value) => HttpHeader::new(key, value),
                HeaderValues::Many(values) => HttpHeader::with_values(key, values),
            };
            headers.push(header);
        }
        Ok(headers)
    }
}

impl<'de> Deserialize<'de> for HttpHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(HeadersVisitor)
    }
}
