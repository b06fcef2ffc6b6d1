// =============================================================================
// UPLOAD CONSTANTS
// =============================================================================

/// Default maximum size of a single uploaded file (5MB)
pub const DEFAULT_MAX_UPLOAD_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Default MIME types accepted for form file uploads
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/gif",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

// =============================================================================
// SUBMISSION MESSAGES
// =============================================================================

pub const MSG_INVALID_USER_ID: &str = "Invalid user ID.";
pub const MSG_FORM_ID_REQUIRED: &str = "Form ID is required.";
pub const MSG_INVALID_FORM_ID: &str = "Invalid form ID.";
pub const MSG_UNPUBLISHED_FORM: &str = "Cannot submit to an unpublished form.";
pub const MSG_SUBMISSION_SUCCEEDED: &str = "Response submitted successfully.";

/// Prefix placed in front of the innermost storage error message
pub const MSG_SUBMISSION_ERROR_PREFIX: &str = "An error occurred while submitting the response";

/// Form mutation outside the Draft state
pub const MSG_FORM_NOT_DRAFT: &str = "Only draft forms can be modified.";
