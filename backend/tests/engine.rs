mod support;

use support::{complete_tugas, form, regular_face, system_font, RecordingBoundary};
use surat_backend::catalog::TemplateCatalog;
use surat_backend::editor::EditingSession;
use surat_backend::error::EngineError;
use surat_backend::locale::Locale;
use surat_backend::render::{BinaryArtifact, Rasterizer};
use surat_backend::submission::{StaticCredential, SubmissionEncoder, SubmissionError};
use surat_backend::substitution::substitute;

fn artifact() -> BinaryArtifact {
    BinaryArtifact::new(b"%PDF-1.4 letter".to_vec(), "surat_tugas", (1588, 2246))
}

#[test]
fn invitation_date_is_spelled_out() {
    let mut state = form("surat_undangan");
    state.set_scalar("hari_tanggal", "2024-03-20").unwrap();
    let letter = substitute(&state, Locale::Indonesian).unwrap();
    assert!(letter.contains("Hari/Tanggal: Rabu, 20 Maret 2024"));
}

#[test]
fn bracket_template_keeps_label_for_empty_field() {
    let mut state = form("surat_dinas");
    state.set_scalar("nomor_surat", "001/X/2024").unwrap();
    let letter = substitute(&state, Locale::Indonesian).unwrap();
    assert!(letter.contains("Nomor: 001/X/2024"));
    assert!(letter.contains("Lampiran: [Lampiran]"));
}

#[test]
fn removed_agenda_item_closes_the_gap() {
    let mut state = form("surat_undangan");
    for (i, item) in ["A", "B", "C", "D"].iter().enumerate() {
        state.set_repeating_item("agenda", i, item).unwrap();
    }
    assert_eq!(state.remove_repeating_item("agenda", 1).unwrap(), "B");
    let letter = substitute(&state, Locale::Indonesian).unwrap();
    assert!(letter.contains("- A\n- C\n- D\n"));
    assert!(!letter.contains("- B"));
}

#[tokio::test]
async fn incomplete_form_never_reaches_the_endpoint() {
    let boundary = RecordingBoundary::accepting();
    let encoder = SubmissionEncoder::new(boundary.clone());
    let mut state = complete_tugas();
    state.set_scalar("perihal", "").unwrap();

    let failure = encoder
        .submit(artifact(), &state, &StaticCredential::default())
        .await
        .unwrap_err();
    match failure.error {
        SubmissionError::Incomplete(report) => {
            assert!(report.errors.contains_key("perihal"));
            assert_eq!(report.errors.len(), 1);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert_eq!(boundary.calls(), 0);
}

#[tokio::test]
async fn submission_metadata_follows_template_mapping() {
    let boundary = RecordingBoundary::accepting();
    let encoder = SubmissionEncoder::new(boundary.clone());
    let state = complete_tugas();

    let receipt = encoder
        .submit(artifact(), &state, &StaticCredential(Some("tok".into())))
        .await
        .unwrap();
    assert_eq!(receipt.file_name, "surat-surat_tugas.pdf");
    assert_eq!(boundary.calls(), 1);
    assert_eq!(boundary.last_bearer().as_deref(), Some("tok"));
    assert_eq!(boundary.last_file_name().as_deref(), Some("surat-surat_tugas.pdf"));

    let metadata = boundary.last_metadata().unwrap();
    assert_eq!(metadata.nomor_surat, "090/KPU-MDO/III/2024");
    assert_eq!(metadata.tanggal_surat, "2024-03-20");
    assert_eq!(metadata.tanggal_kirim, metadata.tanggal_surat);
    assert_eq!(metadata.ditujukan_kepada, "Maria Lumowa");
    assert_eq!(metadata.perihal, "Monitoring Pemutakhiran Data");
    assert_eq!(metadata.divisi, "sdm_dan_parmas");
    assert_eq!(metadata.keterangan, "Monitoring coklit di Kecamatan Wenang");
}

#[tokio::test]
async fn rejected_submission_returns_the_artifact_untouched() {
    let boundary = RecordingBoundary::rejecting("Nomor surat sudah terdaftar");
    let encoder = SubmissionEncoder::new(boundary.clone());
    let state = complete_tugas();

    let failure = encoder
        .submit(artifact(), &state, &StaticCredential::default())
        .await
        .unwrap_err();
    assert_eq!(failure.artifact.bytes, b"%PDF-1.4 letter".to_vec());
    assert_eq!(failure.artifact.file_name, "surat-surat_tugas.pdf");
    match failure.error {
        SubmissionError::Failed(e) => {
            assert!(e.is_recoverable());
            assert_eq!(e.to_string(), "Nomor surat sudah terdaftar");
        }
        other => panic!("expected boundary failure, got {:?}", other),
    }

    // a retry with the returned artifact goes out again
    let failure = encoder
        .submit(failure.artifact, &state, &StaticCredential::default())
        .await
        .unwrap_err();
    assert_eq!(boundary.calls(), 2);
    assert_eq!(failure.artifact.bytes, b"%PDF-1.4 letter".to_vec());
}

#[test]
fn late_conversion_after_switch_is_dropped() {
    let catalog = TemplateCatalog::builtin().unwrap();
    let mut session = EditingSession::new(catalog.get("surat_undangan").unwrap());
    let ticket = session.begin_attachment("tanda_tangan").unwrap();
    session.select(catalog.get("surat_tugas").unwrap());

    assert!(!session.resolve_attachment(&ticket, support::PNG_DATA_URI.into()));
    assert!(session.state().validate().iter().any(|spec| spec.name == "tanda_tangan"));
}

#[tokio::test]
async fn render_before_prepare_is_not_ready() {
    let rasterizer = Rasterizer::new("/nonexistent/fonts", "LiberationSans");
    let letter = substitute(&complete_tugas(), Locale::Indonesian).unwrap();
    let err = rasterizer.render(letter, "surat_tugas").await.unwrap_err();
    assert!(matches!(err, EngineError::RenderTargetNotReady(_)));
}

/// Full pipeline with real fonts. Skipped when the machine has none.
#[tokio::test]
async fn complete_letter_renders_to_a_single_compact_pdf() {
    let Some((dir, family)) = system_font() else {
        eprintln!("no TrueType font found, skipping");
        return;
    };
    let rasterizer = Rasterizer::new(dir, family);
    rasterizer.prepare().unwrap();

    let letter = substitute(&complete_tugas(), Locale::Indonesian).unwrap();
    let artifact = rasterizer.render(letter, "surat_tugas").await.unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
    assert_eq!(artifact.page_size, (1588, 2246));
    assert_eq!(artifact.file_name, "surat-surat_tugas.pdf");
    // the raw page raster alone is over 10 MB
    assert!(artifact.bytes.len() < 2_000_000, "{} bytes", artifact.bytes.len());
}

#[tokio::test]
async fn typed_image_markup_does_not_break_rendering() {
    let Some((dir, family)) = system_font() else {
        eprintln!("no TrueType font found, skipping");
        return;
    };
    let rasterizer = Rasterizer::new(dir, family);
    let mut state = complete_tugas();
    state
        .set_scalar("keperluan", "Rincian:\n[img:lihat lampiran]\n---\n# catatan")
        .unwrap();

    let letter = substitute(&state, Locale::Indonesian).unwrap();
    let artifact = rasterizer.render(letter, "surat_tugas").await.unwrap();
    assert!(artifact.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn fonts_installed_after_startup_are_picked_up() {
    let Some((dir, family)) = system_font() else {
        eprintln!("no TrueType font found, skipping");
        return;
    };
    let fonts = tempfile::tempdir().unwrap();
    let rasterizer = Rasterizer::new(fonts.path(), "SuratSans");
    assert!(rasterizer.prepare().is_err());
    let letter = substitute(&complete_tugas(), Locale::Indonesian).unwrap();
    assert!(matches!(
        rasterizer.render(letter.clone(), "surat_tugas").await,
        Err(EngineError::RenderTargetNotReady(_))
    ));

    let face = regular_face(&dir, &family).unwrap();
    std::fs::copy(face, fonts.path().join("SuratSans-Regular.ttf")).unwrap();
    let artifact = rasterizer.render(letter, "surat_tugas").await.unwrap();
    assert!(rasterizer.is_ready());
    assert!(artifact.bytes.starts_with(b"%PDF"));
}
