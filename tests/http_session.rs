//! End-to-end submissions through `HttpSession` against a local echo server.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Html as HtmlResponse;
use axum::routing::{any, get};
use axum::Router;

use cortex_forms::config::SessionConfig;
use cortex_forms::dom::find_form;
use cortex_forms::session::HttpSession;
use cortex_forms::{Browsable, Form};

const POST_FORM: &str = r#"<!doctype html>
<html><body>
    <form method="post" action="/echo" name="default">
        <input type="text" name="company" value="none">
        <input type="text" name="age" value="55">
        <input type="radio" name="gender" value="male" checked>
        <input type="radio" name="gender" value="female">
        <input type="checkbox" name="music" value="jazz" checked="checked">
        <input type="checkbox" name="music" value="rock">
        <input type="checkbox" name="music" value="fusion" checked>
        <select name="city">
            <option value="NY" selected>
            <option value="Tokyo">
        </select>
        <textarea name="hobby">Dance</textarea>
        <input type="submit" name="submit1" value="submitted1">
        <input type="submit" name="submit2" value="submitted2">
    </form>
</body></html>"#;

const GET_FORM: &str = r#"<!doctype html>
<html><body>
    <form action="/echo?stale=1">
        <input name="q" value="">
    </form>
</body></html>"#;

const MULTIPART_FORM: &str = r#"<!doctype html>
<html><body>
    <form method="post" action="/echo" enctype="multipart/form-data">
        <input type="text" name="note" value="hello">
        <input type="file" name="upload">
    </form>
</body></html>"#;

async fn page(Path(name): Path<String>) -> HtmlResponse<&'static str> {
    HtmlResponse(match name.as_str() {
        "post" => POST_FORM,
        "get" => GET_FORM,
        _ => MULTIPART_FORM,
    })
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> String {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    format!(
        "method={method}\ncontent-type={content_type}\nquery={}\nbody={}",
        uri.query().unwrap_or(""),
        String::from_utf8_lossy(&body)
    )
}

/// Start the echo server on its own runtime thread and return its base URL.
fn spawn_server() -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let app = Router::new()
                .route("/page/{name}", get(page))
                .route("/echo", any(echo));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn open(base: &str, page: &str) -> HttpSession {
    let session = HttpSession::new(&SessionConfig::default()).unwrap();
    session.open(&format!("{base}/page/{page}")).unwrap();
    assert_eq!(session.status(), 200);
    session
}

#[test]
fn url_encoded_post_click() {
    let base = spawn_server();
    let session = open(&base, "post");
    let doc = session.document();
    let mut form = Form::new(&session, find_form(&doc, "[name='default']").unwrap());
    assert_eq!(form.action(), format!("{base}/echo"));

    form.input("age", "54").unwrap();
    form.check_box("music", &["rock", "fusion"]).unwrap();
    form.click("submit2").unwrap();

    let body = session.body();
    assert!(body.contains("method=POST"));
    assert!(body.contains("content-type=application/x-www-form-urlencoded"));
    assert!(body.contains("company=none"));
    assert!(body.contains("age=54"));
    assert!(body.contains("gender=male"));
    assert!(body.contains("music=rock&music=fusion"));
    assert!(!body.contains("music=jazz"));
    assert!(body.contains("city=NY"));
    assert!(body.contains("hobby=Dance"));
    assert!(body.contains("submit2=submitted2"));
    assert!(!body.contains("submit1=submitted1"));
    assert_eq!(session.url().path(), "/echo");
}

#[test]
fn get_submission_replaces_query() {
    let base = spawn_server();
    let session = open(&base, "get");
    let doc = session.document();
    let mut form = Form::new(&session, find_form(&doc, "form").unwrap());
    form.input("q", "rust lang").unwrap();
    form.submit().unwrap();

    let body = session.body();
    assert!(body.contains("method=GET"));
    assert!(body.contains("query=q=rust+lang\n"));
    assert!(!body.contains("stale"));
}

#[test]
fn multipart_post() {
    let base = spawn_server();
    let session = open(&base, "multipart");
    let doc = session.document();
    let mut form = Form::new(&session, find_form(&doc, "form").unwrap());
    form.input("upload", "notes.txt").unwrap();
    form.submit().unwrap();

    let body = session.body();
    assert!(body.contains("method=POST"));
    assert!(body.contains("content-type=multipart/form-data; boundary="));
    assert!(body.contains("name=\"note\""));
    assert!(body.contains("hello"));
    assert!(body.contains("name=\"upload\""));
    assert!(body.contains("notes.txt"));
}

#[test]
fn transport_failure_surfaces() {
    let base = spawn_server();
    let session = open(&base, "post");
    let doc = session.document();
    let mut form = Form::new(&session, find_form(&doc, "form").unwrap());
    // Port 9 (discard) refuses connections on loopback.
    form.set_action("http://127.0.0.1:9/unreachable");
    let err = form.submit().unwrap_err();
    assert!(matches!(err, cortex_forms::FormError::Transport(_)));
}
