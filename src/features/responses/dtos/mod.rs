mod response_dto;

pub use response_dto::{
    AnswerDto, AttachmentGroupDto, FileAttachmentDto, FileUploadDto, ResponseDetailDto,
    SubmitMultipartDto, SubmitResponseDto, SubmittedResponseDto,
};
