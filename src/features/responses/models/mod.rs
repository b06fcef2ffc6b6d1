mod file_attachment;
mod response;
mod submission;

pub use file_attachment::{FileAttachment, FileAttachmentSummary};
pub use response::{NewResponse, Response, ResponseDetail, ResponseRecord};
pub use submission::{Answer, FileUpload, Submission};
