//! Page shell and HTML helpers shared by the admin pages

use axum::response::Html;
use rust_decimal::Decimal;
use shared::{format_rupiah, format_rupiah_with_decimal, OrderStatus, PaginationMeta};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #222; }
nav { background: #263238; padding: 0.75rem 1.5rem; }
nav a { color: #eceff1; margin-right: 1.25rem; text-decoration: none; font-weight: 600; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1.5rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: 0.5rem 0.75rem; border-bottom: 1px solid #e0e0e0; text-align: left; }
td.num, th.num { text-align: right; }
.cards { display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 1.5rem; }
.card { background: #fff; padding: 1rem 1.25rem; border-radius: 6px; min-width: 150px; }
.card strong { display: block; font-size: 1.4rem; }
.badge { padding: 0.15rem 0.5rem; border-radius: 4px; color: #fff; font-size: 0.8rem; }
.badge-warning { background: #f9a825; }
.badge-success { background: #2e7d32; }
.badge-danger { background: #c62828; }
.alert { background: #ffebee; border: 1px solid #c62828; padding: 0.75rem; margin-bottom: 1rem; }
.actions a, .actions button { margin-right: 0.5rem; }
form.inline { display: inline; }
label { display: block; margin-top: 0.75rem; font-weight: 600; }
input, select, textarea { padding: 0.35rem; min-width: 260px; }
.pagination { margin-top: 1rem; }
.pagination a, .pagination span { margin-right: 0.5rem; }
"#;

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Amount in Rupiah, e.g. `Rp 12.500.000`; cents are shown only when present
pub fn money(amount: Decimal) -> String {
    if amount.fract().is_zero() {
        escape(&format_rupiah(amount))
    } else {
        escape(&format_rupiah_with_decimal(amount))
    }
}

pub fn status_badge(status: OrderStatus) -> String {
    format!(
        r#"<span class="badge {}">{}</span>"#,
        status.badge_class(),
        status.as_str()
    )
}

/// Error banner, empty when there is nothing to report
pub fn alert(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(r#"<div class="alert">{}</div>"#, escape(message)),
        None => String::new(),
    }
}

pub fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input type="text" id="{name}" name="{name}" value="{value}">"#,
        name = name,
        label = escape(label),
        value = escape(value),
    )
}

/// Confirmation page for a destructive POST
pub fn confirm_page(title: &str, question: &str, action: &str, cancel_href: &str) -> Html<String> {
    let body = format!(
        r#"<h1>{title}</h1>
<p>{question}</p>
<form method="post" action="{action}">
  <button type="submit">Delete</button>
  <a href="{cancel}">Cancel</a>
</form>"#,
        title = escape(title),
        question = escape(question),
        action = escape(action),
        cancel = escape(cancel_href),
    );
    page(title, &body)
}

/// Previous / next links for a paged list
pub fn pagination_nav(base: &str, meta: &PaginationMeta) -> String {
    if meta.total_pages <= 1 {
        return String::new();
    }

    let mut nav = String::from(r#"<div class="pagination">"#);
    if meta.has_previous() {
        nav.push_str(&format!(r#"<a href="{}?page={}">&laquo; Previous</a>"#, base, meta.page - 1));
    }
    nav.push_str(&format!(
        "<span>Page {} of {} ({} total)</span>",
        meta.page, meta.total_pages, meta.total_items
    ));
    if meta.has_next() {
        nav.push_str(&format!(r#"<a href="{}?page={}">Next &raquo;</a>"#, base, meta.page + 1));
    }
    nav.push_str("</div>");
    nav
}

/// Wrap a page body in the common shell
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Back Office</title>
<style>{style}</style>
</head>
<body>
<nav>
  <a href="/">Dashboard</a>
  <a href="/categories">Categories</a>
  <a href="/items">Items</a>
  <a href="/orders">Orders</a>
</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        body = body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Pagination;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#x27;y&#x27;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("Kopi Susu"), "Kopi Susu");
    }

    #[test]
    fn test_money_keeps_cents() {
        assert_eq!(money(Decimal::from(12_500_000)), "Rp 12.500.000");
        assert_eq!(money(Decimal::new(123450, 2)), "Rp 1.234,50");
        assert_eq!(money(Decimal::new(300000, 2)), "Rp 3.000");
    }

    #[test]
    fn test_pagination_nav() {
        let single = PaginationMeta::new(&Pagination::new(1, 10), 7);
        assert!(pagination_nav("/items", &single).is_empty());

        let middle = PaginationMeta::new(&Pagination::new(2, 10), 25);
        let nav = pagination_nav("/items", &middle);
        assert!(nav.contains(r#"href="/items?page=1""#));
        assert!(nav.contains(r#"href="/items?page=3""#));
        assert!(nav.contains("Page 2 of 3"));
    }

    #[test]
    fn test_page_escapes_title() {
        let Html(html) = page("<b>", "<p>ok</p>");
        assert!(html.contains("<title>&lt;b&gt; - Back Office</title>"));
        assert!(html.contains("<p>ok</p>"));
    }

    #[test]
    fn test_status_badge() {
        assert_eq!(
            status_badge(OrderStatus::Paid),
            r#"<span class="badge badge-success">PAID</span>"#
        );
    }
}
