mod support;

use std::sync::Arc;

use tinysaver::host::fs::HostProfile;
use tinysaver::{Blob, Downloader, FsHost, SaveOptions, SaveStrategy};

fn saver(host: FsHost) -> (Arc<FsHost>, Downloader) {
    let host = Arc::new(host.with_client(support::client()));
    let downloader = Downloader::new(host.clone()).with_client(support::client());
    (host, downloader)
}

#[tokio::test]
async fn test_native_profile_writes_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let (_host, saver) = saver(FsHost::new(dir.path()));
    assert_eq!(saver.strategy(), SaveStrategy::NativeAttribute);

    saver
        .save_text("hello", "greeting.txt", None, SaveOptions::new())
        .await
        .unwrap();

    let written = std::fs::read(dir.path().join("greeting.txt")).unwrap();
    assert_eq!(written, b"\xEF\xBB\xBFhello");
}

#[tokio::test]
async fn test_legacy_profile_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let (_host, saver) = saver(FsHost::new(dir.path()).with_profile(HostProfile::Legacy));
    assert_eq!(saver.strategy(), SaveStrategy::LegacySave);

    saver
        .save(Blob::new("abc", "text/plain"), Some("l.txt"), SaveOptions::new())
        .await
        .unwrap();

    assert_eq!(std::fs::read(dir.path().join("l.txt")).unwrap(), b"abc");
}

#[tokio::test]
async fn test_reader_profile_uses_popup_title() {
    let dir = tempfile::tempdir().unwrap();
    let (_host, saver) = saver(FsHost::new(dir.path()).with_profile(HostProfile::Reader));
    assert_eq!(saver.strategy(), SaveStrategy::ReaderFallback);

    saver
        .save(
            Blob::new("abc", "text/plain"),
            Some("popup.txt"),
            SaveOptions::new().open_in_new_tab(true),
        )
        .await
        .unwrap();
    saver
        .save(Blob::new("def", "text/plain"), Some("ignored.txt"), SaveOptions::new())
        .await
        .unwrap();

    assert_eq!(std::fs::read(dir.path().join("popup.txt")).unwrap(), b"abc");
    assert_eq!(std::fs::read(dir.path().join("download")).unwrap(), b"def");
}

#[tokio::test(start_paused = true)]
async fn test_object_urls_are_released() {
    let dir = tempfile::tempdir().unwrap();
    let (host, saver) = saver(FsHost::new(dir.path()));

    saver
        .save(Blob::new("abc", "text/plain"), Some("a.txt"), SaveOptions::new())
        .await
        .unwrap();
    assert_eq!(host.live_object_urls(), 1);

    tokio::time::sleep(std::time::Duration::from_secs(41)).await;
    assert_eq!(host.live_object_urls(), 0);
}

#[tokio::test]
async fn test_remote_url_is_downloaded() {
    let mut server = mockito::Server::new_async().await;
    let _head = server
        .mock("HEAD", "/files/archive.tar")
        .with_status(200)
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/files/archive.tar")
        .with_status(200)
        .with_body("tarball")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (_host, saver) = saver(FsHost::new(dir.path()));
    let url = format!("{}/files/archive.tar", server.url());

    saver.save(url.as_str(), None, SaveOptions::new()).await.unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("archive.tar")).unwrap(),
        b"tarball"
    );
}

#[tokio::test]
async fn test_cors_remote_url_with_progress_is_saved_under_name() {
    let mut server = mockito::Server::new_async().await;
    let _head = server
        .mock("HEAD", "/data.json")
        .with_status(200)
        .with_header("access-control-allow-origin", "*")
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/data.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"ok\":true}")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (_host, saver) = saver(FsHost::new(dir.path()));
    let url = format!("{}/data.json", server.url());

    saver
        .save(
            url.as_str(),
            Some("renamed.json"),
            SaveOptions::new().on_progress(|_, _| {}),
        )
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("renamed.json")).unwrap(),
        b"{\"ok\":true}"
    );
}
