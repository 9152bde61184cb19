#![allow(dead_code)]

use async_trait::async_trait;
use common::model::submission::SubmissionMetadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use surat_backend::catalog::TemplateCatalog;
use surat_backend::editor::FormState;
use surat_backend::error::EngineError;
use surat_backend::submission::{SubmissionBoundary, SubmissionPayload};

pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Records every payload it is given and answers with a fixed outcome.
pub struct RecordingBoundary {
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, Vec<u8>, SubmissionMetadata, Option<String>)>>,
    reject_with: Option<String>,
}

impl RecordingBoundary {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            reject_with: None,
        })
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            reject_with: Some(message.to_string()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_metadata(&self) -> Option<SubmissionMetadata> {
        self.seen.lock().unwrap().last().map(|(_, _, m, _)| m.clone())
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.seen.lock().unwrap().last().and_then(|(_, _, _, b)| b.clone())
    }

    pub fn last_file_name(&self) -> Option<String> {
        self.seen.lock().unwrap().last().map(|(f, _, _, _)| f.clone())
    }

    pub fn last_bytes(&self) -> Option<Vec<u8>> {
        self.seen.lock().unwrap().last().map(|(_, b, _, _)| b.clone())
    }
}

#[async_trait]
impl SubmissionBoundary for RecordingBoundary {
    async fn send(
        &self,
        payload: &SubmissionPayload<'_>,
        bearer: Option<String>,
    ) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((
            payload.file_name.to_string(),
            payload.bytes.to_vec(),
            payload.metadata.clone(),
            bearer,
        ));
        match &self.reject_with {
            Some(message) => Err(EngineError::SubmissionRejected(message.clone())),
            None => Ok("Surat keluar berhasil dikirim".to_string()),
        }
    }
}

pub fn form(template_id: &str) -> FormState {
    let catalog = TemplateCatalog::builtin().unwrap();
    FormState::for_template(catalog.get(template_id).unwrap())
}

/// A surat_tugas form with every required field filled.
pub fn complete_tugas() -> FormState {
    let mut state = form("surat_tugas");
    for (name, value) in [
        ("nomor_surat", "090/KPU-MDO/III/2024"),
        ("tanggal_surat", "2024-03-20"),
        ("perihal", "Monitoring Pemutakhiran Data"),
        ("nama_pegawai", "Maria Lumowa"),
        ("jabatan", "Analis Data"),
        ("keperluan", "Monitoring coklit di Kecamatan Wenang"),
        ("tempat_tujuan", "Kecamatan Wenang"),
        ("hari_tanggal", "2024-03-22"),
        ("penandatangan", "Ketua KPU Kota Manado"),
        ("divisi", "sdm_dan_parmas"),
    ] {
        state.set_scalar(name, value).unwrap();
    }
    state
        .set_attachment("tanda_tangan", PNG_DATA_URI.to_string())
        .unwrap();
    state
}

/// A TrueType family installed on this machine, as `(dir, family)`.
/// Both the `<family>-Regular.ttf` and the plain `<family>.ttf` layouts count.
pub fn system_font() -> Option<(PathBuf, String)> {
    let candidates = [
        ("/usr/share/fonts/truetype/dejavu", "DejaVuSans"),
        ("/usr/share/fonts/dejavu", "DejaVuSans"),
        ("/usr/share/fonts/TTF", "DejaVuSans"),
        ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
        ("/usr/share/fonts/truetype/liberation2", "LiberationSans"),
        ("./fonts", "LiberationSans"),
    ];
    candidates
        .iter()
        .find(|(dir, family)| regular_face(Path::new(dir), family).is_some())
        .map(|(dir, family)| (PathBuf::from(dir), family.to_string()))
}

/// Path of the regular face of `family` in `dir`, if there is one.
pub fn regular_face(dir: &Path, family: &str) -> Option<PathBuf> {
    [format!("{}-Regular.ttf", family), format!("{}.ttf", family)]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// `multipart/form-data` body with one part per `(name, file_name, bytes)`.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let boundary = "surat-test-boundary";
    let mut body = Vec::new();
    for (name, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}

/// Raw bytes of `PNG_DATA_URI`.
pub fn png_bytes() -> Vec<u8> {
    surat_backend::editor::attachment::decode_data_uri(PNG_DATA_URI).unwrap()
}
