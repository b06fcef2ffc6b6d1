mod form_dto;

pub use form_dto::{
    check_question_identifiers, CreateFormDto, FormResponseDto, OptionDto, QuestionDto,
    QuestionResponseDto, UpdateFormDto,
};
