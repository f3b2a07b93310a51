mod common;

use common::*;
use pdf_library::viewer::*;
use pdf_library::*;

#[tokio::test]
async fn test_open_without_id() {
    let library = memory_library();
    let session = ViewerSession::open(&library, None).await;
    assert_eq!(
        session.status(),
        &ViewerStatus::Failed(NO_ID_MESSAGE.to_string())
    );
    assert!(session.document().is_none());
    assert_eq!(session.title(), "Loading...");
}

#[tokio::test]
async fn test_open_missing_document() {
    let library = memory_library();
    let session = ViewerSession::open(&library, Some("nope")).await;
    assert_eq!(
        session.status(),
        &ViewerStatus::Failed(NOT_FOUND_MESSAGE.to_string())
    );
    assert!(session.blob_url().is_none());
    assert!(library.blobs().is_empty());
}

#[tokio::test]
async fn test_open_when_store_errors() {
    let library = flaky_library(FlakyStore::failing_get());
    let session = ViewerSession::open(&library, Some("any")).await;
    assert_eq!(
        session.status(),
        &ViewerStatus::Failed(LOAD_FAILED_MESSAGE.to_string())
    );
    assert!(session.document().is_none());
    assert!(library.blobs().is_empty());
}

#[tokio::test]
async fn test_open_starts_on_first_page() {
    let library = memory_library();
    let id = library.upload(pdf_upload("fresh.pdf", 3)).await.unwrap();

    let session = ViewerSession::open(&library, Some(id.as_str())).await;
    assert_eq!(session.status(), &ViewerStatus::Ready);
    assert_eq!(session.current_page(), 1);
    assert_eq!(session.title(), "fresh.pdf");

    let url = session.blob_url().unwrap();
    let bytes = library.resolve_blob_url(url).unwrap();
    assert_eq!(&bytes[..], &session.document().unwrap().file[..]);
}

#[tokio::test]
async fn test_open_restores_saved_page() {
    let library = memory_library();
    let id = library.upload(pdf_upload("resume.pdf", 10)).await.unwrap();
    library.save_current_page(&id, 6).await.unwrap();

    let session = ViewerSession::open(&library, Some(id.as_str())).await;
    assert_eq!(session.current_page(), 6);
}

#[tokio::test]
async fn test_page_change_is_persisted() {
    let library = memory_library();
    let id = library.upload(pdf_upload("turn.pdf", 10)).await.unwrap();

    let mut session = ViewerSession::open(&library, Some(id.as_str())).await;
    session.on_pdf_loaded(10);
    session.on_page_change(&library, 8).await;

    assert_eq!(session.current_page(), 8);
    assert_eq!(library.current_page(&id).await.unwrap(), Some(8));
}

#[tokio::test]
async fn test_loaded_clamps_saved_page_to_document() {
    let library = memory_library();
    let id = library.upload(pdf_upload("short.pdf", 2)).await.unwrap();
    library.save_current_page(&id, 9).await.unwrap();

    let mut session = ViewerSession::open(&library, Some(id.as_str())).await;
    assert_eq!(session.current_page(), 9);
    session.on_pdf_loaded(2);
    assert_eq!(session.page_count(), Some(2));
    assert_eq!(session.current_page(), 2);
}

#[tokio::test]
async fn test_render_failure_marks_session_failed() {
    let library = memory_library();
    let id = library.upload(pdf_upload("bad.pdf", 1)).await.unwrap();

    let mut session = ViewerSession::open(&library, Some(id.as_str())).await;
    session.on_pdf_loading_failed("corrupt xref");
    assert_eq!(
        session.status(),
        &ViewerStatus::Failed(RENDER_FAILED_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn test_close_saves_page_and_revokes_blob() {
    let library = memory_library();
    let id = library.upload(pdf_upload("close.pdf", 5)).await.unwrap();

    let mut session = ViewerSession::open(&library, Some(id.as_str())).await;
    assert_eq!(library.blobs().len(), 1);
    session.on_page_change(&library, 3).await;
    library.save_current_page(&id, 1).await.unwrap();

    session.close(&library).await;
    assert!(library.blobs().is_empty());
    assert_eq!(library.current_page(&id).await.unwrap(), Some(3));
}

#[tokio::test]
async fn test_page_change_after_delete_does_not_panic() {
    let library = memory_library();
    let id = library.upload(pdf_upload("gone.pdf", 5)).await.unwrap();

    let mut session = ViewerSession::open(&library, Some(id.as_str())).await;
    library.delete(&id).await.unwrap();

    // Saving fails inside the session and is only logged
    session.on_page_change(&library, 4).await;
    assert_eq!(session.current_page(), 4);
    session.close(&library).await;
    assert!(library.blobs().is_empty());
}
