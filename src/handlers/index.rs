use axum::response::Html;

static INDEX_HTML: &str = include_str!("../../static/index.html");

/// The single-page front end, compiled into the binary.
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}
