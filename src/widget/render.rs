//! HTML rendering for the widget and its host page.

use crate::models::Feedback;

use super::props::is_safe_api_base;
use super::{normalize_attribute, WidgetProps};

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Attribute names we are willing to echo back onto a host element. Event
/// handlers (`on*`) and `style` are never copied.
pub fn is_safe_attribute_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    !name.is_empty()
        && !lower.starts_with("on")
        && lower != "style"
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Whether a host attribute may be copied onto the element. `api-base` must
/// also point somewhere a form can safely post to.
pub fn is_safe_attribute(name: &str, value: &str) -> bool {
    is_safe_attribute_name(name)
        && (normalize_attribute(name) != "apiBase" || is_safe_api_base(value))
}

/// The widget body: form followed by the list of existing feedback.
pub fn render_widget(props: &WidgetProps, feedbacks: &[Feedback]) -> String {
    let api_base = escape_html(props.api_base());
    let mut html = String::new();

    html.push_str(&format!(
        r#"<div class="fw-widget" data-api-base="{api_base}">"#
    ));
    html.push_str(&format!(
        r#"<h2 class="fw-title">{}</h2>"#,
        escape_html(props.title())
    ));
    html.push_str(&render_form(&api_base));
    html.push_str(&render_list(feedbacks));
    html.push_str("</div>");

    html
}

fn render_form(api_base: &str) -> String {
    let mut html = format!(r#"<form class="fw-form" method="post" action="{api_base}">"#);
    html.push_str(r#"<input class="fw-input" type="text" name="name" placeholder="Name (optional)">"#);
    html.push_str(
        r#"<input class="fw-input" type="email" name="email" placeholder="Email (optional)">"#,
    );
    html.push_str(
        r#"<textarea class="fw-input" name="message" placeholder="Your feedback" required></textarea>"#,
    );
    html.push_str(r#"<select class="fw-input" name="rating"><option value="">Rating</option>"#);
    for n in 1..=5 {
        html.push_str(&format!(r#"<option value="{n}">{n}</option>"#));
    }
    html.push_str("</select>");
    html.push_str(r#"<button class="fw-submit" type="submit">Send feedback</button>"#);
    html.push_str("</form>");
    html
}

fn render_list(feedbacks: &[Feedback]) -> String {
    if feedbacks.is_empty() {
        return r#"<p class="fw-empty">No feedback yet.</p>"#.to_string();
    }

    let mut html = String::from(r#"<ul class="fw-list">"#);
    for feedback in feedbacks {
        html.push_str(&render_item(feedback));
    }
    html.push_str("</ul>");
    html
}

fn render_item(feedback: &Feedback) -> String {
    let mut meta = Vec::new();
    if let Some(name) = feedback.name.as_deref().filter(|s| !s.is_empty()) {
        meta.push(escape_html(name));
    }
    if let Some(email) = feedback.email.as_deref().filter(|s| !s.is_empty()) {
        meta.push(escape_html(email));
    }
    if let Some(rating) = &feedback.rating {
        meta.push(match rating.as_i64() {
            Some(stars @ 1..=5) => "★".repeat(stars as usize),
            _ => format!("Rating: {rating}"),
        });
    }
    meta.push(format!(
        r#"<time datetime="{}">{}</time>"#,
        feedback.created_at.to_rfc3339(),
        feedback.created_at.format("%Y-%m-%d %H:%M")
    ));

    format!(
        r#"<li class="fw-item" data-id="{}"><p class="fw-message">{}</p><p class="fw-meta">{}</p></li>"#,
        feedback.id,
        escape_html(&feedback.message),
        meta.join(" · ")
    )
}

/// A standalone page hosting one widget.
pub fn render_host_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
</head>
<body style="margin:0;min-height:100vh;display:flex;align-items:center;justify-content:center;background:#f9fafb">
<main>{body}</main>
</body>
</html>
"#,
        escape_html(title)
    )
}
