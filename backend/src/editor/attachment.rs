//! Conversion of uploaded binaries into embeddable data URIs.

use crate::error::EngineError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Prefix-checked `data:<mime>;base64,<payload>` splitter.
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    Some((mime, payload))
}

/// Decodes the payload of a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (_, payload) = split_data_uri(uri)?;
    BASE64.decode(payload.trim()).ok()
}

/// Builds the data URI for an uploaded file.
///
/// The MIME type comes from the file's magic bytes when they name a known
/// image format, otherwise from the upload's file name. The accept filter of
/// the field is not enforced here; an undecodable upload fails later, when
/// the letter is rasterized.
pub fn encode_attachment(bytes: &[u8], file_name: Option<&str>) -> String {
    let mime = image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
        .or_else(|| {
            file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Runs `encode_attachment` on the blocking pool.
pub async fn convert_upload(bytes: Vec<u8>, file_name: Option<String>) -> Result<String, EngineError> {
    run_conversion(move || encode_attachment(&bytes, file_name.as_deref())).await
}

async fn run_conversion<F>(work: F) -> Result<String, EngineError>
where
    F: FnOnce() -> String + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::AttachmentConversionFailed(format!("conversion task aborted: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(2, 2, Rgba([0u8, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn sniffs_png_regardless_of_file_name() {
        let png = tiny_png();
        let uri = encode_attachment(&png, Some("ttd.txt"));
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), png);
    }

    #[test]
    fn falls_back_to_file_name_then_octet_stream() {
        let uri = encode_attachment(b"%PDF-1.4", Some("lampiran.pdf"));
        assert!(uri.starts_with("data:application/pdf;base64,"));
        let uri = encode_attachment(b"????", None);
        assert!(uri.starts_with("data:application/octet-stream;base64,"));
    }

    #[tokio::test]
    async fn upload_conversion_runs_off_the_runtime() {
        let uri = convert_upload(tiny_png(), Some("ttd.png".into())).await.unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn aborted_conversion_is_an_attachment_error() {
        let err = run_conversion(|| panic!("decoder blew up")).await.unwrap_err();
        assert!(matches!(err, EngineError::AttachmentConversionFailed(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn rejects_non_data_uris() {
        assert!(split_data_uri("https://example.org/x.png").is_none());
        assert!(decode_data_uri("data:image/png,raw").is_none());
    }
}
