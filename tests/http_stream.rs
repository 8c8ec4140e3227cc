//! End-to-end tests against a real server on a loopback socket

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mjpeg_rs::{CaptureConfig, CaptureState, FrameStore, PacingPolicy, ServerConfig, StreamServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

const FRAME: &[u8] = &[0xFF, 0xD8, b'a', b'b', b'c', 0xFF, 0xD9];

/// Capture command that emits the same frame every 20ms
fn looping_capture() -> CaptureConfig {
    CaptureConfig::custom(
        "sh",
        ["-c", r"while true; do printf '\377\330abc\377\331'; sleep 0.02; done"],
    )
}

/// Size of the filler between the markers in `large_frame_capture`
const LARGE_PAYLOAD: usize = 256 * 1024;

/// Capture command that emits 256 KiB frames back to back
fn large_frame_capture() -> CaptureConfig {
    CaptureConfig::custom(
        "sh",
        [
            "-c",
            r"while true; do printf '\377\330'; head -c 262144 /dev/zero; printf '\377\331'; sleep 0.01; done",
        ],
    )
}

fn missing_capture() -> CaptureConfig {
    CaptureConfig::with_program("mjpeg-rs-no-such-capture-program")
}

async fn start(config: ServerConfig, capture: CaptureConfig) -> (SocketAddr, Arc<FrameStore>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = StreamServer::new(config, capture);
    let store = Arc::clone(server.store());
    tokio::spawn(async move { server.serve(listener, std::future::pending()).await });

    (addr, store)
}

async fn wait_for(store: &FrameStore, pred: impl Fn(&FrameStore) -> bool) {
    for _ in 0..200 {
        if pred(store) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached, state = {}", store.state());
}

async fn get(addr: SocketAddr, path: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path);
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .unwrap()
        .unwrap();
    response
}

/// Open a live stream and read until `needle` shows up
async fn read_stream_until(stream: &mut TcpStream, needle: &[u8]) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 4096];

    tokio::time::timeout(Duration::from_secs(5), async {
        while !contains(&received, needle) {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "stream closed early");
            received.extend_from_slice(&buf[..n]);
        }
    })
    .await
    .unwrap();

    received
}

async fn open_stream(addr: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /camera HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    stream
}

/// Read until `parts` multipart boundaries have arrived
async fn read_parts(stream: &mut TcpStream, parts: usize) {
    let needle = b"--frame\r\n";
    let mut tail = Vec::new();
    let mut buf = vec![0u8; 64 * 1024];
    let mut seen = 0;

    tokio::time::timeout(Duration::from_secs(10), async {
        while seen < parts {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "stream closed early");
            tail.extend_from_slice(&buf[..n]);
            seen += tail.windows(needle.len()).filter(|w| w == needle).count();

            // Keep only what could be the start of a split boundary
            let keep = tail.len().min(needle.len() - 1);
            tail.drain(..tail.len() - keep);
        }
    })
    .await
    .unwrap();
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_lowercase()
}

#[tokio::test]
async fn test_snapshot_unavailable_without_capture() {
    let (addr, store) = start(ServerConfig::default(), missing_capture()).await;
    wait_for(&store, |s| s.state() == CaptureState::Unavailable).await;

    let response = get(addr, "/camera/snapshot").await;
    let response = text(&response);

    assert!(response.starts_with("http/1.1 503"), "{}", response);
    assert!(response.contains("content-length: 0"));
}

#[tokio::test]
async fn test_status_reports_unavailable_capture() {
    let (addr, store) = start(ServerConfig::default(), missing_capture()).await;
    wait_for(&store, |s| s.state() == CaptureState::Unavailable).await;

    let response = text(&get(addr, "/camera/status").await);

    assert!(response.starts_with("http/1.1 200"), "{}", response);
    assert!(response.contains("application/json"));
    assert!(response.contains(r#""running":false"#));
    assert!(response.contains(r#""hasframe":false"#));
    assert!(response.contains(r#""state":"unavailable""#));
    assert!(response.contains(r#""width":640"#));
}

#[tokio::test]
async fn test_snapshot_returns_latest_frame() {
    let (addr, store) = start(ServerConfig::default(), looping_capture()).await;
    wait_for(&store, |s| s.has_frame()).await;

    let response = get(addr, "/camera/snapshot").await;
    let head = text(&response);

    assert!(head.starts_with("http/1.1 200"), "{}", head);
    assert!(head.contains("content-type: image/jpeg"));
    assert!(head.contains("content-length: 7"));
    assert!(response.ends_with(FRAME));
}

#[tokio::test]
async fn test_live_stream_headers_and_part() {
    let config = ServerConfig::default().pacing(PacingPolicy::fixed(Duration::from_millis(5)));
    let (addr, store) = start(config, looping_capture()).await;
    wait_for(&store, |s| s.has_frame()).await;

    let mut stream = open_stream(addr).await;
    let received = read_stream_until(&mut stream, FRAME).await;
    let head = text(&received);

    assert!(head.starts_with("http/1.1 200"), "{}", head);
    assert!(head.contains("content-type: multipart/x-mixed-replace; boundary=frame"));
    assert!(head.contains("cache-control: no-cache, no-store, must-revalidate"));
    assert!(contains(
        &received,
        b"--frame\r\nContent-Type: image/jpeg\r\nContent-Length: 7\r\n\r\n"
    ));
}

#[tokio::test]
async fn test_stream_clients_are_independent() {
    let config = ServerConfig::default().pacing(PacingPolicy::fixed(Duration::from_millis(5)));
    let (addr, store) = start(config, looping_capture()).await;
    wait_for(&store, |s| s.has_frame()).await;

    // First client connects and then never reads again
    let mut idle = open_stream(addr).await;
    read_stream_until(&mut idle, FRAME).await;

    let mut active = open_stream(addr).await;
    read_stream_until(&mut active, FRAME).await;

    // Snapshot still served while both streams are open
    let response = get(addr, "/camera/snapshot").await;
    assert!(response.ends_with(FRAME));
    drop(idle);
}

#[tokio::test]
async fn test_client_limit() {
    let config = ServerConfig::default()
        .max_clients(1)
        .pacing(PacingPolicy::fixed(Duration::from_millis(5)));
    let (addr, store) = start(config, looping_capture()).await;
    wait_for(&store, |s| s.has_frame()).await;

    let mut first = open_stream(addr).await;
    read_stream_until(&mut first, FRAME).await;

    let rejected = text(&get(addr, "/camera").await);
    assert!(rejected.starts_with("http/1.1 503"), "{}", rejected);

    // Slot is released once the first client goes away
    drop(first);
    let mut retried = None;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut stream = open_stream(addr).await;
        let mut buf = [0u8; 12];
        if stream.read_exact(&mut buf).await.is_ok() && buf.starts_with(b"HTTP/1.1 200") {
            retried = Some(stream);
            break;
        }
    }
    assert!(retried.is_some());
}

#[tokio::test]
async fn test_blocked_client_does_not_stall_capture() {
    let config = ServerConfig::default().pacing(PacingPolicy::fixed(Duration::from_millis(5)));
    let (addr, store) = start(config, large_frame_capture()).await;
    wait_for(&store, |s| s.has_frame()).await;

    // Reads the response head and then nothing, so its socket buffers fill
    let mut blocked = open_stream(addr).await;
    let head = read_stream_until(&mut blocked, b"--frame").await;
    assert!(text(&head).starts_with("http/1.1 200"));

    // Far more data than loopback socket buffers hold
    let target = store.frames_published() + 80;
    tokio::time::timeout(Duration::from_secs(20), async {
        while store.frames_published() < target {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("capture stalled behind a blocked client");

    // Another client still gets fresh parts while the first stays blocked
    let before = store.frames_published();
    let mut active = open_stream(addr).await;
    read_parts(&mut active, 3).await;
    assert!(store.frames_published() > before);

    let snapshot = text(&get(addr, "/camera/snapshot").await);
    assert!(snapshot.contains(&format!("content-length: {}", LARGE_PAYLOAD + 4)));

    drop(blocked);
}

#[tokio::test]
async fn test_shutdown_with_open_stream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ServerConfig::default().pacing(PacingPolicy::fixed(Duration::from_millis(5)));
    let server = StreamServer::new(config, looping_capture());
    let store = Arc::clone(server.store());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = stop_rx.await;
            })
            .await
    });
    wait_for(&store, |s| s.has_frame()).await;

    let mut stream = open_stream(addr).await;
    read_stream_until(&mut stream, FRAME).await;

    // Returns even though the stream connection is still open
    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());

    // Listener is closed
    assert!(TcpStream::connect(addr).await.is_err());
    drop(stream);
}

#[tokio::test]
async fn test_static_fallback_served() {
    let dir = std::env::temp_dir().join(format!("mjpeg-rs-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>camera</h1>").unwrap();

    let config = ServerConfig::default().static_dir(dir.clone());
    let (addr, _store) = start(config, missing_capture()).await;

    let page = text(&get(addr, "/index.html").await);
    assert!(page.starts_with("http/1.1 200"), "{}", page);
    assert!(page.contains("<h1>camera</h1>"));

    // Camera routes still take precedence over the fallback
    let status = text(&get(addr, "/camera/status").await);
    assert!(status.contains("application/json"), "{}", status);

    let _ = std::fs::remove_dir_all(&dir);
}
