use serde::{Deserialize, Serialize};

/// Metadata fields sent alongside the generated letter.
///
/// Field names match the multipart field names of the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub nomor_surat: String,
    pub tanggal_surat: String,
    /// Always equal to `tanggal_surat`.
    pub tanggal_kirim: String,
    pub ditujukan_kepada: String,
    pub perihal: String,
    pub divisi: String,
    pub keterangan: String,
}

impl SubmissionMetadata {
    /// `(multipart field name, value)` pairs in endpoint order.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("nomor_surat", self.nomor_surat.as_str()),
            ("tanggal_surat", self.tanggal_surat.as_str()),
            ("tanggal_kirim", self.tanggal_kirim.as_str()),
            ("ditujukan_kepada", self.ditujukan_kepada.as_str()),
            ("perihal", self.perihal.as_str()),
            ("divisi", self.divisi.as_str()),
            ("keterangan", self.keterangan.as_str()),
        ]
    }
}

/// Response body of the submission endpoint. Only these two keys are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
