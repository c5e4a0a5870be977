//! Upload pipeline integration tests
//!
//! Run the full validate → store → scan → derive flow against in-memory doubles.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use helpers::{
    pdf_bytes, png_bytes, RecordingBlobStore, Script, ScriptedScanner, StoreFailure, CDN,
};
use intake_core::{
    ScanStatus, SubmittedFile, UploadContext, UploadErrorCode, ValidationConfig,
};
use intake_services::{FileService, HeuristicScanner};

fn service(
    store: &Arc<RecordingBlobStore>,
    scanner: &Arc<ScriptedScanner>,
    validation: ValidationConfig,
) -> FileService {
    FileService::new(store.clone(), scanner.clone(), validation)
}

#[tokio::test]
async fn test_clean_pdf_upload() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let data = pdf_bytes();
    let ctx = UploadContext::for_assignment("hw-7").with_content_type("application/pdf");
    let metadata = service
        .upload_file(data.clone(), "Essay Draft.pdf", &ctx)
        .await
        .unwrap();

    assert_eq!(metadata.original_name, "Essay Draft.pdf");
    assert_eq!(metadata.extension, "pdf");
    assert_eq!(metadata.size, data.len() as u64);
    assert_eq!(metadata.scan_status, ScanStatus::Clean);
    assert!(metadata.file_name.ends_with("_Essay_Draft.pdf"));
    assert!(metadata.object_id.starts_with("lms/assignments/hw-7/"));
    assert_eq!(metadata.url, format!("{}/{}", CDN, metadata.object_id));
    assert!(store.contains(&metadata.object_id));
    assert_eq!(scanner.calls(), 1);

    let preview = metadata.preview_url.unwrap();
    assert!(preview.contains("-/page/1/"));
    assert!(preview.ends_with("-/format/jpg/"));
    assert!(metadata.thumbnail_url.is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn test_store_and_scanner_share_the_upload_buffer() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let data = Bytes::from(pdf_bytes());
    let metadata = service
        .upload_file(data.clone(), "shared.pdf", &UploadContext::default())
        .await
        .unwrap();

    let stored = store.stored_bytes(&metadata.object_id).unwrap();
    let scanned = scanner.last_scanned().unwrap();
    assert_eq!(stored, data);
    assert_eq!(stored.as_ptr(), data.as_ptr());
    assert_eq!(scanned.as_ptr(), data.as_ptr());
}

#[tokio::test]
async fn test_upload_files_hands_over_submitted_buffers() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let files = vec![SubmittedFile::new("one.pdf", pdf_bytes())];
    let results = service
        .upload_files(&files, &UploadContext::default())
        .await
        .unwrap();

    let metadata = results[0].as_ref().unwrap();
    let stored = store.stored_bytes(&metadata.object_id).unwrap();
    assert_eq!(stored.as_ptr(), files[0].data.as_ptr());
}

// Scenario E
#[tokio::test]
async fn test_unclean_scan_deletes_stored_object() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Infected("Trojan.Test")));
    let service = service(&store, &scanner, ValidationConfig::images());

    let err = service
        .upload_file(png_bytes(), "diagram.png", &UploadContext::for_submission("s-1"))
        .await
        .unwrap_err();

    assert_eq!(err.code, UploadErrorCode::VirusDetected);
    assert!(err.message.contains("Trojan.Test"));
    assert_eq!(err.file_name.as_deref(), Some("diagram.png"));
    assert_eq!(store.object_count(), 0);

    let deleted = store.deleted();
    assert_eq!(deleted.len(), 1);
    assert!(deleted[0].starts_with("lms/submissions/s-1/"));
}

#[tokio::test]
async fn test_scanner_failure_deletes_and_fails() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Fail));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let err = service
        .upload_file(pdf_bytes(), "a.pdf", &UploadContext::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, UploadErrorCode::UploadFailed);
    assert!(err.detailed_message().contains("scanner offline"));
    assert_eq!(store.object_count(), 0);
    assert_eq!(store.deleted().len(), 1);
}

#[tokio::test]
async fn test_invalid_file_never_reaches_storage() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::videos());

    let err = service
        .upload_file(b"\0\0\0\x20ftypisom".to_vec(), "video.exe", &UploadContext::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, UploadErrorCode::InvalidFormat);
    assert!(err.message.contains("exe"));
    assert_eq!(store.object_count(), 0);
    assert_eq!(scanner.calls(), 0);
}

#[tokio::test]
async fn test_oversized_file_reports_too_large() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let validation = ValidationConfig::new(["pdf"], 10);
    let service = service(&store, &scanner, validation);

    let err = service
        .upload_file(pdf_bytes(), "big.pdf", &UploadContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, UploadErrorCode::FileTooLarge);
}

#[tokio::test]
async fn test_heuristic_prefilter_blocks_before_storage() {
    let store = Arc::new(RecordingBlobStore::new());
    let service = FileService::new(
        store.clone(),
        Arc::new(HeuristicScanner::new()),
        ValidationConfig::documents(),
    );

    let mut data = pdf_bytes();
    data.extend_from_slice(b"<script>alert(1)</script>");
    let err = service
        .upload_file(data, "essay.pdf", &UploadContext::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, UploadErrorCode::VirusDetected);
    assert_eq!(store.object_count(), 0);
}

#[tokio::test]
async fn test_upload_timeout_is_network_error() {
    let store = Arc::new(RecordingBlobStore::new().with_upload_delay(Duration::from_millis(200)));
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents())
        .with_timeout(Duration::from_millis(20));

    let err = service
        .upload_file(pdf_bytes(), "a.pdf", &UploadContext::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, UploadErrorCode::NetworkError);
    assert_eq!(scanner.calls(), 0);
}

#[tokio::test]
async fn test_storage_failures_are_mapped() {
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));

    let store = Arc::new(RecordingBlobStore::new().failing_uploads(StoreFailure::Backend));
    let err = service(&store, &scanner, ValidationConfig::documents())
        .upload_file(pdf_bytes(), "a.pdf", &UploadContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, UploadErrorCode::UploadFailed);

    let store = Arc::new(RecordingBlobStore::new().failing_uploads(StoreFailure::Unauthorized));
    let err = service(&store, &scanner, ValidationConfig::documents())
        .upload_file(pdf_bytes(), "a.pdf", &UploadContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, UploadErrorCode::Unauthorized);
    assert_eq!(err.file_name.as_deref(), Some("a.pdf"));
}

#[tokio::test]
async fn test_missing_transform_support_degrades_previews() {
    let store = Arc::new(RecordingBlobStore::new().without_transforms());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::images());

    let metadata = service
        .upload_file(png_bytes(), "photo.png", &UploadContext::default())
        .await
        .unwrap();

    assert!(metadata.preview_url.is_none());
    assert!(metadata.thumbnail_url.is_none());
    assert!(store.contains(&metadata.object_id));
    assert!(metadata.object_id.starts_with("lms/general/"));
}

#[tokio::test]
async fn test_delete_file() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let metadata = service
        .upload_file(pdf_bytes(), "a.pdf", &UploadContext::default())
        .await
        .unwrap();

    assert!(service.delete_file(&metadata.object_id).await);
    assert!(!store.contains(&metadata.object_id));
}

#[tokio::test]
async fn test_upload_files_keeps_order_and_isolates_failures() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let files = vec![
        SubmittedFile::new("one.pdf", pdf_bytes()),
        SubmittedFile::new("two.txt", b"plain notes".to_vec()),
        SubmittedFile::new("three.pdf", pdf_bytes()).with_content_type("application/pdf"),
    ];
    let results = service
        .upload_files(&files, &UploadContext::for_assignment("a"))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().original_name, "one.pdf");
    assert_eq!(
        results[1].as_ref().unwrap_err().code,
        UploadErrorCode::InvalidFormat
    );
    assert_eq!(results[2].as_ref().unwrap().original_name, "three.pdf");
    assert_eq!(store.object_count(), 2);
}

#[tokio::test]
async fn test_batch_limit_applies_before_any_upload() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(
        &store,
        &scanner,
        ValidationConfig::documents().with_max_files(2),
    );

    let files = vec![SubmittedFile::new("a.pdf", pdf_bytes()); 3];

    let err = service
        .upload_files(&files, &UploadContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, UploadErrorCode::TooManyFiles);
    assert_eq!(store.object_count(), 0);

    let err = service.validate_files(&files).await.unwrap_err();
    assert_eq!(err.code, UploadErrorCode::TooManyFiles);
}

#[tokio::test]
async fn test_validate_files_delegates() {
    let store = Arc::new(RecordingBlobStore::new());
    let scanner = Arc::new(ScriptedScanner::new(Script::Clean));
    let service = service(&store, &scanner, ValidationConfig::documents());

    let files = vec![
        SubmittedFile::new("ok.pdf", pdf_bytes()),
        SubmittedFile::new("", pdf_bytes()),
    ];
    let results = service.validate_files(&files).await.unwrap();
    assert!(results[0].is_valid);
    assert!(!results[1].is_valid);
    assert_eq!(store.object_count(), 0);
}
