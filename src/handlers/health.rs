use axum::response::Html;

/// Liveness page; static body, no backend calls.
pub async fn index() -> Html<&'static str> {
    Html("<h1>Pluvio</h1><p>The precipitation archive is running.</p>")
}
