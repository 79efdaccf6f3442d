pub mod media_type;
pub mod text_processing;
