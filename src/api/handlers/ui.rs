use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

/// GET / : single-page UI (transcribe / compose / proofread tabs).
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
