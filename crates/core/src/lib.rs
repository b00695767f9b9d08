pub mod attachment;
pub mod document;
pub mod id;
pub mod location;
pub mod report;
pub mod snapshot;

pub use attachment::{Attachment, AttachmentRef};
pub use document::Document;
pub use id::ReportId;
pub use location::Location;
pub use report::Report;
pub use snapshot::{ConnectionInfo, HostIdentity, SystemSnapshot};
