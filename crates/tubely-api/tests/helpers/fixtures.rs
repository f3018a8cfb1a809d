use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;

/// A 2 KB payload that starts with a PNG signature.
pub fn png_bytes() -> Vec<u8> {
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend((0..2040u32).map(|i| (i % 251) as u8));
    png
}

/// Pseudo MP4 payload: an `ftyp` box followed by filler.
pub fn mp4_bytes(len: usize) -> Vec<u8> {
    let mut mp4 = vec![0x00, 0x00, 0x00, 0x18];
    mp4.extend_from_slice(b"ftypmp42");
    mp4.extend((0..len.saturating_sub(mp4.len())).map(|i| (i % 241) as u8));
    mp4
}

pub fn media_form(field: &str, data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime_type);
    MultipartForm::new().add_part(field.to_string(), part)
}

pub fn thumbnail_form(data: Vec<u8>, mime_type: &str) -> MultipartForm {
    media_form("thumbnail", data, "thumbnail.png", mime_type)
}

pub fn video_form(data: Vec<u8>, mime_type: &str) -> MultipartForm {
    media_form("video", data, "boots.mp4", mime_type)
}

pub const RAW_BOUNDARY: &str = "tubely-raw-boundary";

/// A hand-built multipart body whose `thumbnail` part carries no Content-Type.
pub fn untyped_thumbnail_body(data: &[u8]) -> Bytes {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"thumbnail\"; filename=\"t.png\"\r\n\r\n",
        b = RAW_BOUNDARY
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", RAW_BOUNDARY).as_bytes());
    Bytes::from(body)
}
