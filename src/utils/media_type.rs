/// File extension for an image response, picked from its `Content-Type`.
///
/// Case-insensitive substring match, checked gif, jpeg/jpg, png in that order.
/// Anything else (including a missing header) gets the generic `img`.
pub fn file_extension_for(content_type: &str) -> &'static str {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("gif") {
        "gif"
    } else if content_type.contains("jpeg") || content_type.contains("jpg") {
        "jpg"
    } else if content_type.contains("png") {
        "png"
    } else {
        "img"
    }
}
