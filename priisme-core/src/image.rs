//! Data-URI helpers shared by photo intake and the proxy.

use base64::{engine::general_purpose, Engine as _};

/// Media type assumed for bare base64 payloads.
pub const DEFAULT_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Encode `bytes` in full as `data:<media_type>;base64,<payload>`.
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    format!("data:{media_type};base64,{encoded}")
}

/// Pass data URIs through; prefix anything else as a JPEG payload.
pub fn ensure_data_uri(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:{DEFAULT_IMAGE_MEDIA_TYPE};base64,{image}")
    }
}
