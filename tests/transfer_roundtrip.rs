//! 端到端测试：真实路由 + 真实客户端

use filedrop::{build_router, scan_dir, AppState, TransferClient, TransferError};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// 在随机端口启动服务端，返回基础地址
async fn spawn_server(upload_dir: &Path) -> String {
    let state = AppState::new(upload_dir).await.unwrap();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

struct Fixture {
    storage: TempDir,
    local: TempDir,
    client: TransferClient,
}

async fn setup() -> Fixture {
    let storage = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    let base_url = spawn_server(storage.path()).await;
    let client = TransferClient::new(base_url).unwrap();
    Fixture {
        storage,
        local,
        client,
    }
}

#[tokio::test]
async fn test_upload_reports_count_and_names() {
    let fx = setup().await;
    let a = fx.local.path().join("a.txt");
    let b = fx.local.path().join("b.bin");
    fs::write(&a, "alpha").unwrap();
    fs::write(&b, [0u8, 159, 146, 150]).unwrap();

    let resp = fx.client.upload_files(&[a, b]).await.unwrap();

    assert!(resp.ok);
    assert_eq!(resp.count, 2);
    assert_eq!(resp.names, vec!["a.txt", "b.bin"]);
    assert_eq!(fs::read(fx.storage.path().join("a.txt")).unwrap(), b"alpha");
    assert_eq!(
        fs::read(fx.storage.path().join("b.bin")).unwrap(),
        [0u8, 159, 146, 150]
    );
}

#[tokio::test]
async fn test_upload_then_download_is_byte_identical() {
    let fx = setup().await;
    let content: Vec<u8> = (0..256 * 1024u32).map(|i| (i % 251) as u8).collect();
    let src = fx.local.path().join("payload.dat");
    fs::write(&src, &content).unwrap();

    fx.client.upload_files(&[&src]).await.unwrap();

    let out_dir = TempDir::new().unwrap();
    let saved = fx.client.download("payload.dat", out_dir.path()).await.unwrap();

    assert_eq!(saved, out_dir.path().join("payload.dat"));
    assert_eq!(fs::read(saved).unwrap(), content);
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let fx = setup().await;

    let err = fx
        .client
        .download("nope.txt", fx.local.path())
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::NotFound(ref n) if n == "nope.txt"));
    assert!(!fx.local.path().join("nope.txt").exists());
}

#[tokio::test]
async fn test_second_upload_overwrites_first() {
    let fx = setup().await;
    let src = fx.local.path().join("same.txt");

    fs::write(&src, "first version, longer").unwrap();
    fx.client.upload_files(&[&src]).await.unwrap();
    fs::write(&src, "second").unwrap();
    fx.client.upload_files(&[&src]).await.unwrap();

    assert_eq!(
        fs::read_to_string(fx.storage.path().join("same.txt")).unwrap(),
        "second"
    );
}

#[tokio::test]
async fn test_upload_folder_flattens_to_base_names() {
    let fx = setup().await;
    let root = fx.local.path();
    fs::create_dir_all(root.join("x/y")).unwrap();
    fs::write(root.join("top.txt"), "1").unwrap();
    fs::write(root.join("x/mid.txt"), "2").unwrap();
    fs::write(root.join("x/y/deep.txt"), "3").unwrap();

    let files = scan_dir(root).unwrap();
    let resp = fx.client.upload_files(&files).await.unwrap();

    assert_eq!(resp.count, 3);
    let mut names = resp.names.clone();
    names.sort();
    assert_eq!(names, vec!["deep.txt", "mid.txt", "top.txt"]);
    // 服务端不保留目录结构
    assert!(fx.storage.path().join("deep.txt").is_file());
    assert!(!fx.storage.path().join("x").exists());
}

#[tokio::test]
async fn test_same_name_in_one_batch_keeps_last() {
    let fx = setup().await;
    fs::create_dir_all(fx.local.path().join("one")).unwrap();
    fs::create_dir_all(fx.local.path().join("two")).unwrap();
    let first = fx.local.path().join("one/dup.txt");
    let second = fx.local.path().join("two/dup.txt");
    fs::write(&first, "from one").unwrap();
    fs::write(&second, "from two").unwrap();

    let resp = fx.client.upload_files(&[first, second]).await.unwrap();

    assert_eq!(resp.count, 2);
    assert_eq!(resp.names, vec!["dup.txt", "dup.txt"]);
    assert_eq!(
        fs::read_to_string(fx.storage.path().join("dup.txt")).unwrap(),
        "from two"
    );
}

#[tokio::test]
async fn test_download_name_with_spaces() {
    let fx = setup().await;
    let src = fx.local.path().join("q3 report (final).txt");
    fs::write(&src, "q3").unwrap();

    fx.client.upload_files(&[&src]).await.unwrap();

    let out_dir = TempDir::new().unwrap();
    let saved = fx.client.download("q3 report (final).txt", out_dir.path()).await.unwrap();
    assert_eq!(fs::read_to_string(saved).unwrap(), "q3");
}

/// 直接向上传接口发送 multipart 表单
async fn post_form(base_url: &str, form: Form) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_server_stores_traversal_name_as_base_name() {
    let storage = TempDir::new().unwrap();
    let upload_dir = storage.path().join("uploads");
    let base_url = spawn_server(&upload_dir).await;

    let part = Part::bytes(b"evil".to_vec()).file_name("../escaped.txt");
    let form = Form::new().percent_encode_noop().part("files", part);
    let resp = post_form(&base_url, form).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: filedrop::UploadResponse = resp.json().await.unwrap();
    assert_eq!(body.names, vec!["escaped.txt"]);
    assert_eq!(fs::read(upload_dir.join("escaped.txt")).unwrap(), b"evil");
    assert!(!storage.path().join("escaped.txt").exists());
}

#[tokio::test]
async fn test_rejected_part_discards_whole_batch() {
    let fx = setup().await;
    let base_url = fx.client.base_url().to_string();

    let form = Form::new()
        .percent_encode_noop()
        .part("files", Part::bytes(b"fine".to_vec()).file_name("good.txt"))
        .part("files", Part::bytes(b"bad".to_vec()).file_name("nested/.."));
    let resp = post_form(&base_url, form).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    // 请求失败时，同一请求中先保存的文件也被删除
    assert!(!fx.storage.path().join("good.txt").exists());
}

#[tokio::test]
async fn test_truncated_body_leaves_no_files() {
    let fx = setup().await;
    let base_url = fx.client.base_url().to_string();

    // 第二个 part 没有结束边界，连接在数据中途结束
    let body = concat!(
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"files\"; filename=\"kept.txt\"\r\n",
        "Content-Type: application/octet-stream\r\n",
        "\r\n",
        "complete part\r\n",
        "--XBOUNDARY\r\n",
        "Content-Disposition: form-data; name=\"files\"; filename=\"cut.txt\"\r\n",
        "Content-Type: application/octet-stream\r\n",
        "\r\n",
        "this part never reaches its bound",
    );
    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base_url))
        .header(
            reqwest::header::CONTENT_TYPE,
            "multipart/form-data; boundary=XBOUNDARY",
        )
        .body(body)
        .send()
        .await
        .unwrap();

    assert!(!resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(!fx.storage.path().join("cut.txt").exists());
    assert!(!fx.storage.path().join("kept.txt").exists());
}

#[tokio::test]
async fn test_server_rejects_unexpected_file_field() {
    let fx = setup().await;
    let base_url = fx.client.base_url().to_string();

    let part = Part::bytes(b"data".to_vec()).file_name("a.txt");
    let form = Form::new().part("avatar", part);
    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!fx.storage.path().join("a.txt").exists());
}

#[tokio::test]
async fn test_server_ignores_text_fields() {
    let fx = setup().await;
    let base_url = fx.client.base_url().to_string();

    let form = Form::new()
        .text("comment", "hello")
        .part("files", Part::bytes(b"data".to_vec()).file_name("a.txt"));
    let resp = reqwest::Client::new()
        .post(format!("{}/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: filedrop::UploadResponse = resp.json().await.unwrap();
    assert_eq!(body.count, 1);
    assert_eq!(body.names, vec!["a.txt"]);
}

#[tokio::test]
async fn test_download_not_found_payload_and_headers() {
    let fx = setup().await;
    let base_url = fx.client.base_url().to_string();
    fs::write(fx.storage.path().join("here.txt"), "12345").unwrap();

    let http = reqwest::Client::new();

    let missing = http
        .get(format!("{}/download/gone.txt", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: filedrop::ErrorResponse = missing.json().await.unwrap();
    assert_eq!(body, filedrop::ErrorResponse::new("File not found"));

    let found = http
        .get(format!("{}/download/here.txt", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(found.content_length(), Some(5));
    let disposition = found
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("here.txt"));
    assert_eq!(found.bytes().await.unwrap().as_ref(), b"12345");
}

#[tokio::test]
async fn test_download_overwrites_existing_local_file() {
    let fx = setup().await;
    fs::write(fx.storage.path().join("r.txt"), "remote").unwrap();
    fs::write(fx.local.path().join("r.txt"), "stale local content").unwrap();

    fx.client.download("r.txt", fx.local.path()).await.unwrap();

    assert_eq!(
        fs::read_to_string(fx.local.path().join("r.txt")).unwrap(),
        "remote"
    );
}
