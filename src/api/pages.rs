//! Server-rendered HTML for the intake form and the status page

use axum::response::Html;

use crate::config::FormLimits;

const STYLE: &str = "body{font-family:sans-serif;max-width:32rem;margin:3rem auto;padding:0 1rem}\
label{display:block;margin-top:1rem}input{width:100%;padding:.4rem}\
button{margin-top:1.5rem;padding:.5rem 1.5rem}.notice{color:#a00}";

/// Escape text for use in element content and double-quoted attributes
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    ))
}

/// Intake form, optionally headed by a validation notice
pub fn index_page(limits: &FormLimits, notice: Option<&str>) -> Html<String> {
    let notice = notice
        .map(|text| format!("<p class=\"notice\" role=\"alert\">{}</p>\n", escape_html(text)))
        .unwrap_or_default();

    let body = format!(
        "<h1>Mashup Generator</h1>\n{notice}\
         <form method=\"post\" action=\"/\">\n\
         <label for=\"singer\">Singer name</label>\n\
         <input id=\"singer\" name=\"singer\" type=\"text\" required>\n\
         <label for=\"videos\">Number of videos</label>\n\
         <input id=\"videos\" name=\"videos\" type=\"number\" min=\"1\" max=\"{max_videos}\" required>\n\
         <label for=\"duration\">Duration of each clip (seconds)</label>\n\
         <input id=\"duration\" name=\"duration\" type=\"number\" min=\"1\" max=\"{max_duration}\" required>\n\
         <label for=\"email\">Email</label>\n\
         <input id=\"email\" name=\"email\" type=\"email\" required>\n\
         <button type=\"submit\">Create mashup</button>\n\
         </form>",
        max_videos = limits.max_videos,
        max_duration = limits.max_duration_secs,
    );

    layout("Mashup Generator", &body)
}

/// Result page carrying a single outcome message
pub fn status_page(message: &str) -> Html<String> {
    let body = format!(
        "<h1>Mashup Generator</h1>\n<p class=\"message\">{}</p>\n<p><a href=\"/\">Make another</a></p>",
        escape_html(message)
    );
    layout("Mashup Status", &body)
}
