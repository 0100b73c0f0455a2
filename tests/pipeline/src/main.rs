fn main() {
    println!("Run `cargo test -p pipeline-e2e` to execute the end-to-end upload tests.");
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use monarch_client::{ClientConfig, UploadClient};
    use monarch_notifier::{Notification, NotificationKind, NotificationQueue, Notifier};
    use monarch_protocol::UploadResponse;
    use monarch_uploader::{ChunkUploader, UploadError, UploadSettings};
    use monarch_watcher::{Pipeline, PipelineFuture, WatchEvent, WatchEventKind, run_dispatch};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    type Captured = Arc<Mutex<Vec<String>>>;

    /// Reads one HTTP request, honouring `Content-Length` or chunked framing.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut tmp = [0u8; 8192];
        loop {
            let n = stream.read(&mut tmp).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&tmp[..n]);
            let text = String::from_utf8_lossy(&buf);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let head = text[..head_end].to_ascii_lowercase();
            if head.contains("transfer-encoding: chunked") {
                if text.ends_with("0\r\n\r\n") {
                    break;
                }
                continue;
            }
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Mock upload service: answers the n-th request with the n-th reply.
    async fn mock_service(replies: Vec<(u16, String)>) -> (String, Captured) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let captured2 = Arc::clone(&captured);

        tokio::spawn(async move {
            for (status, body) in replies {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let req = read_request(&mut stream).await;
                captured2.lock().unwrap().push(req);

                let resp = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, captured)
    }

    /// Value of a text field in a raw multipart request.
    fn form_field<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
        let marker = format!("name=\"{name}\"\r\n\r\n");
        let start = raw.find(&marker)? + marker.len();
        let end = raw[start..].find("\r\n")?;
        Some(&raw[start..start + end])
    }

    fn uploader(url: &str, chunk_size: usize) -> ChunkUploader {
        let client = UploadClient::new(&ClientConfig {
            base_url: url.to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();
        ChunkUploader::new(Arc::new(client)).with_chunk_size(chunk_size)
    }

    fn settings() -> UploadSettings {
        UploadSettings {
            secret: "e2e-secret".into(),
            private: true,
        }
    }

    /// Uploads each file and pushes the result onto a queue.
    struct QueuePipeline {
        uploader: ChunkUploader,
        settings: UploadSettings,
        queue: Mutex<NotificationQueue>,
    }

    impl Pipeline for QueuePipeline {
        fn handle<'a>(&'a self, path: &'a Path) -> PipelineFuture<'a> {
            Box::pin(async move {
                let notification = match self.uploader.process(path, &self.settings).await {
                    Ok(outcome) => Notification::from_outcome(&outcome),
                    Err(e) => Notification::failure(e.to_string()),
                };
                self.queue.notify(notification);
            })
        }
    }

    #[test]
    fn fixtures_decode() {
        let ok: UploadResponse = serde_json::from_str(&load_fixture("upload_success.json")).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.url(), Some("https://monarchupload.cc/f/Qm9vaw"));

        let chunk: UploadResponse =
            serde_json::from_str(&load_fixture("chunk_received.json")).unwrap();
        assert!(chunk.is_success());
        assert_eq!(chunk.url(), None);

        let rejected: UploadResponse =
            serde_json::from_str(&load_fixture("upload_rejected.json")).unwrap();
        assert!(!rejected.is_success());
        assert_eq!(rejected.message, "Storage quota exceeded");
    }

    #[tokio::test]
    async fn multi_chunk_upload_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.txt");
        std::fs::write(&file, b"AAAABBBBCC").unwrap();

        let (url, captured) = mock_service(vec![
            (200, load_fixture("chunk_received.json")),
            (200, load_fixture("chunk_received.json")),
            (200, load_fixture("upload_success.json")),
        ])
        .await;

        let outcome = uploader(&url, 4).process(&file, &settings()).await.unwrap();
        assert!(outcome.succeeded);
        assert_eq!(outcome.url.as_deref(), Some("https://monarchupload.cc/f/Qm9vaw"));
        assert_eq!(outcome.chunks_sent, 3);
        assert_eq!(outcome.bytes_sent, 10);

        let reqs = captured.lock().unwrap();
        assert_eq!(reqs.len(), 3);
        let flags: Vec<&str> = reqs.iter().map(|r| form_field(r, "lastchunk").unwrap()).collect();
        assert_eq!(flags, vec!["false", "false", "true"]);
        for (req, part) in reqs.iter().zip(["AAAA", "BBBB", "CC"]) {
            assert!(req.starts_with("POST /v3/upload HTTP/1.1"));
            assert_eq!(form_field(req, "secret"), Some("e2e-secret"));
            assert_eq!(form_field(req, "chunked"), Some("true"));
            assert_eq!(form_field(req, "private"), Some("true"));
            assert!(req.contains("filename=\"clip.txt\""));
            assert!(req.contains(part));
        }
    }

    #[tokio::test]
    async fn rejection_stops_the_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.bin");
        std::fs::write(&file, b"0123456789ab").unwrap();

        // A third reply is available but must never be requested.
        let (url, captured) = mock_service(vec![
            (200, load_fixture("chunk_received.json")),
            (413, load_fixture("upload_rejected.json")),
            (200, load_fixture("upload_success.json")),
        ])
        .await;

        let outcome = uploader(&url, 4).process(&file, &settings()).await.unwrap();
        assert!(!outcome.succeeded);
        assert_eq!(outcome.message, "Storage quota exceeded");
        assert_eq!(outcome.url, None);
        assert_eq!(outcome.chunks_sent, 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(captured.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_reply_is_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"abc").unwrap();

        let (url, _) = mock_service(vec![(200, "not json".into())]).await;

        let err = uploader(&url, 4).process(&file, &settings()).await.unwrap_err();
        assert!(matches!(err, UploadError::Protocol { chunk_index: 0, .. }));
    }

    #[tokio::test]
    async fn dispatch_uploads_each_file_once_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("one.txt");
        let second = dir.path().join("two.txt");
        std::fs::write(&first, b"one").unwrap();
        std::fs::write(&second, b"two").unwrap();

        let (url, captured) = mock_service(vec![
            (200, load_fixture("upload_success.json")),
            (401, load_fixture("upload_rejected.json")),
        ])
        .await;

        let pipeline = QueuePipeline {
            uploader: uploader(&url, 1024),
            settings: settings(),
            queue: Mutex::new(NotificationQueue::new()),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        for (path, kind) in [
            (&first, WatchEventKind::Create),
            (&first, WatchEventKind::Write),
            (&second, WatchEventKind::Create),
        ] {
            tx.send(WatchEvent {
                path: path.clone(),
                kind,
            })
            .unwrap();
        }
        drop(tx);

        let dispatched = run_dispatch(rx, &pipeline, CancellationToken::new()).await;
        assert_eq!(dispatched, 2);
        assert_eq!(captured.lock().unwrap().len(), 2);

        let queue = pipeline.queue.lock().unwrap();
        let kinds: Vec<NotificationKind> = queue.iter().map(|n| n.notification.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);

        let first_note = &queue.iter().next().unwrap().notification;
        assert_eq!(
            first_note.clipboard.as_deref(),
            Some("https://monarchupload.cc/f/Qm9vaw")
        );
        assert_eq!(queue.latest().unwrap().message, "Storage quota exceeded");
    }

    #[tokio::test]
    async fn unreachable_service_notifies_network_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.txt");
        std::fs::write(&file, b"x").unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let pipeline = QueuePipeline {
            uploader: uploader(&url, 4),
            settings: settings(),
            queue: Mutex::new(NotificationQueue::new()),
        };
        pipeline.handle(&file).await;

        let queue = pipeline.queue.lock().unwrap();
        let note = queue.latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert!(note.message.contains("chunk 0"));
    }
}
