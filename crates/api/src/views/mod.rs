//! Server-rendered HTML pages.
//!
//! Pages are plain `format!` templates sharing one [`layout`]. Every value
//! that originates from user input or the store goes through
//! [`escape_html`] before it is interpolated.

use axum::http::StatusCode;

pub mod index;
pub mod show;

pub use index::{index_page, FormState};
pub use show::show_page;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f3f4f6; color: #111827; }
main { max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 0.5rem; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
.badge { display: inline-block; padding: 0.125rem 0.5rem; border-radius: 9999px; color: #fff; font-size: 0.8rem; }
.error { color: #b91c1c; }
.flash { background: #dcfce7; color: #166534; padding: 0.75rem 1rem; border-radius: 0.375rem; margin-bottom: 1rem; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #e5e7eb; }
pre { background: #111827; color: #e5e7eb; padding: 1rem; border-radius: 0.375rem; overflow-x: auto; }
input[type=text] { padding: 0.5rem; width: 70%; }
button { padding: 0.5rem 1rem; }
"#;

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Wrap `body` in the shared page chrome. `title` is escaped here.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Weather</title>
<style>{STYLE}</style>
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Status pill colored by [`crate::presenter::status_color`].
pub(crate) fn status_badge(status: &str) -> String {
    format!(
        r#"<span class="badge" style="background: {color}">{status}</span>"#,
        color = crate::presenter::status_color(status),
        status = escape_html(status),
    )
}

/// Error page for a failed HTML request.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let heading = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<div class="card">
<h1>{code} {heading}</h1>
<p class="error">{message}</p>
<p><a href="/weather">Back to weather requests</a></p>
</div>"#,
        code = status.as_u16(),
        message = escape_html(message),
    );
    layout(heading, &body)
}
