use super::session::IMAGE_TOPIC_LABEL;

/// Shortest text topic accepted by the form, in characters after trimming.
pub const MIN_TOPIC_CHARS: usize = 5;

/// First eight bytes of every PNG file.
pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// What the user asked questions about. Exactly one input per request.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Topic(String),
    Image(ImageInput),
}

impl GenerationRequest {
    /// Metrics and log label for the input kind.
    pub fn mode(&self) -> &'static str {
        match self {
            GenerationRequest::Topic(_) => "text",
            GenerationRequest::Image(_) => "image",
        }
    }

    /// Topic as recorded in session history.
    pub fn topic_label(&self) -> &str {
        match self {
            GenerationRequest::Topic(topic) => topic,
            GenerationRequest::Image(_) => IMAGE_TOPIC_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMediaType {
    Png,
    Jpeg,
}

impl ImageMediaType {
    /// PNG when the magic number matches, JPEG for everything else.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&PNG_MAGIC) {
            ImageMediaType::Png
        } else {
            ImageMediaType::Jpeg
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMediaType::Png => "image/png",
            ImageMediaType::Jpeg => "image/jpeg",
        }
    }
}

/// Uploaded screenshot with its detected media type.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub media_type: ImageMediaType,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>) -> Self {
        let media_type = ImageMediaType::sniff(&bytes);
        Self { bytes, media_type }
    }
}
