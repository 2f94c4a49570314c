//! HTML fragments shared by the server-rendered pages.

use crate::browser::detail::NameSegment;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<span>` per segment; default-colored segments carry no style.
pub fn colored_name(segments: &[NameSegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment.color.css() {
            Some(color) => format!(
                "<span style=\"color: {}\">{}</span>",
                color,
                escape_html(&segment.text)
            ),
            None => format!("<span>{}</span>", escape_html(&segment.text)),
        })
        .collect()
}

pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<link rel=\"stylesheet\" href=\"/static/site.css\">\n</head>\n\
         <body>\n<header><nav><a href=\"/\">Servers</a> <a href=\"/news\">News</a></nav></header>\n\
         <main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
        body = body
    )
}
