use serde::{Deserialize, Serialize};

/// Metadata describing a binary asset that travels with a report.
///
/// The bytes themselves are never embedded in the report record; the store
/// keeps them in a sibling file and the delivery client receives them as an
/// [`Attachment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Filename presented to the recipient, e.g. `"capture.jpg"`.
    pub filename: String,
    /// MIME content type, e.g. `"image/jpeg"`.
    pub content_type: String,
}

impl AttachmentRef {
    /// File extension derived from the filename, without the leading dot.
    ///
    /// Falls back to `"bin"` when the filename has no usable extension.
    pub fn extension(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
    }
}

/// A resolved attachment: metadata plus content.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename presented to the recipient.
    pub filename: String,
    /// MIME content type.
    pub content_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create a new attachment.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Metadata for embedding in a [`Report`](crate::Report).
    pub fn to_ref(&self) -> AttachmentRef {
        AttachmentRef {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
        }
    }

    /// Rebuild an attachment from stored metadata and content.
    pub fn from_ref(reference: &AttachmentRef, bytes: Vec<u8>) -> Self {
        Self {
            filename: reference.filename.clone(),
            content_type: reference.content_type.clone(),
            bytes,
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_filename() {
        let r = AttachmentRef {
            filename: "capture.jpg".into(),
            content_type: "image/jpeg".into(),
        };
        assert_eq!(r.extension(), "jpg");
    }

    #[test]
    fn extension_falls_back_to_bin() {
        for name in ["capture", "capture.", "weird.j/pg"] {
            let r = AttachmentRef {
                filename: name.into(),
                content_type: "application/octet-stream".into(),
            };
            assert_eq!(r.extension(), "bin", "filename {name}");
        }
    }

    #[test]
    fn ref_roundtrip_keeps_metadata() {
        let attachment = Attachment::new("shot.png", "image/png", vec![1, 2, 3]);
        let back = Attachment::from_ref(&attachment.to_ref(), vec![1, 2, 3]);
        assert_eq!(back, attachment);
    }

    #[test]
    fn debug_hides_content() {
        let attachment = Attachment::new("shot.png", "image/png", vec![0; 2048]);
        let debug = format!("{attachment:?}");
        assert!(debug.contains("<2048 bytes>"));
    }
}
