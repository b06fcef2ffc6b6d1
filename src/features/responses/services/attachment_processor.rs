//! Decoding, sizing and per-question grouping of file uploads.

use base64::prelude::*;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::features::responses::models::{FileAttachment, FileUpload, ResponseDetail};

/// Decode the base64 payload of an upload sent as JSON.
///
/// Accepts plain base64 as well as a `data:<mime>;base64,` URL.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    BASE64_STANDARD.decode(payload.trim())
}

/// One attachment row per upload, in upload order.
///
/// Uploads sharing a question id stay separate rows and are found together
/// by `(response_id, question_id)`.
pub fn build_attachments(
    response_id: Uuid,
    uploads: &[FileUpload],
    uploaded_at: DateTime<Utc>,
) -> Vec<FileAttachment> {
    uploads
        .iter()
        .map(|upload| FileAttachment {
            id: Uuid::now_v7(),
            response_id,
            question_id: upload.question_id.clone(),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            file_size: upload.size() as i64,
            content: BASE64_STANDARD.encode(&upload.data),
            uploaded_at,
        })
        .collect()
}

/// Uploads grouped by question id, groups ordered by first appearance
pub fn group_by_question(uploads: &[FileUpload]) -> Vec<(&str, Vec<&FileUpload>)> {
    let mut groups: Vec<(&str, Vec<&FileUpload>)> = Vec::new();
    for upload in uploads {
        match groups
            .iter_mut()
            .find(|(question_id, _)| *question_id == upload.question_id)
        {
            Some((_, group)) => group.push(upload),
            None => groups.push((upload.question_id.as_str(), vec![upload])),
        }
    }
    groups
}

/// Human-readable answer recorded for a file-upload question
pub fn summarize_uploads(uploads: &[&FileUpload]) -> String {
    let names: Vec<&str> = uploads.iter().map(|u| u.file_name.as_str()).collect();
    format!("Uploaded file(s): {}", names.join(", "))
}

/// One synthetic detail per uploaded-to question that has no detail yet.
///
/// An existing answer for the same question id wins over the file summary.
pub fn upload_details(uploads: &[FileUpload], existing: &[ResponseDetail]) -> Vec<ResponseDetail> {
    group_by_question(uploads)
        .into_iter()
        .filter(|(question_id, _)| !existing.iter().any(|d| d.question_id == *question_id))
        .map(|(question_id, group)| ResponseDetail::new(question_id, summarize_uploads(&group)))
        .collect()
}
