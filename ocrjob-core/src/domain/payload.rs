//! Payload domain type

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a document is not a valid payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("payload must contain an `image` field")]
    MissingImage,

    #[error("`image` must be a base64 string")]
    ImageNotString,

    #[error("`image` is empty")]
    EmptyImage,

    #[error("`image` is not valid base64: {0}")]
    InvalidImage(#[source] base64::DecodeError),
}

/// A validated unit of OCR work
///
/// Holds the worker's input document: a base64-encoded `image` plus any
/// extra fields the caller wants forwarded. Top-level fields that arrived
/// beside `input` in an enveloped document (`webhook`, `policy`, ...) are
/// kept apart and sent beside `input` again. Once built it cannot be
/// modified; every constructor validates the image field.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    document: Map<String, Value>,
    envelope: Map<String, Value>,
}

impl Payload {
    /// Field holding the base64-encoded image
    pub const IMAGE_FIELD: &'static str = "image";

    /// Field the service uses to envelope worker input
    pub const INPUT_FIELD: &'static str = "input";

    /// Validate a JSON document
    ///
    /// Accepts either the bare worker input (`{"image": ...}`) or a
    /// document already wrapped in the service envelope
    /// (`{"input": {"image": ...}, "webhook": ...}`). A top-level `image`
    /// always wins; otherwise an object under `input` is the worker input.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(top) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let enveloped = !top.contains_key(Self::IMAGE_FIELD)
            && matches!(top.get(Self::INPUT_FIELD), Some(Value::Object(_)));

        let (document, envelope) = if enveloped {
            let mut envelope = top;
            match envelope.remove(Self::INPUT_FIELD) {
                Some(Value::Object(inner)) => (inner, envelope),
                _ => return Err(PayloadError::MissingImage),
            }
        } else {
            (top, Map::new())
        };

        validate_image(document.get(Self::IMAGE_FIELD))?;

        Ok(Self { document, envelope })
    }

    /// Parse and validate a JSON document from text
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Build a payload from raw image bytes
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        let mut document = Map::new();
        document.insert(
            Self::IMAGE_FIELD.to_string(),
            Value::String(STANDARD.encode(bytes)),
        );
        validate_image(document.get(Self::IMAGE_FIELD))?;
        Ok(Self {
            document,
            envelope: Map::new(),
        })
    }

    /// Base64-encoded image
    pub fn image(&self) -> &str {
        self.document
            .get(Self::IMAGE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Top-level request fields sent beside `input`
    pub fn envelope(&self) -> &Map<String, Value> {
        &self.envelope
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.document.clone())
    }
}

fn validate_image(image: Option<&Value>) -> Result<(), PayloadError> {
    let image = match image {
        None => return Err(PayloadError::MissingImage),
        Some(Value::String(s)) => s,
        Some(_) => return Err(PayloadError::ImageNotString),
    };

    if image.trim().is_empty() {
        return Err(PayloadError::EmptyImage);
    }

    STANDARD
        .decode(image)
        .map(|_| ())
        .map_err(PayloadError::InvalidImage)
}
