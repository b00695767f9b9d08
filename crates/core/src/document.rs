/// A rendered, self-contained, human-readable report.
///
/// Produced by a renderer and handed to a delivery client. The core does not
/// interpret the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text alternative body.
    pub text: String,
}
