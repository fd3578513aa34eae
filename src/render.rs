//! HTML rendering for the prediction page

use std::fmt::Write;

use crate::models::{FieldKind, FormErrors, HeartForm, FORM_FIELDS};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Heart Disease Prediction</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
.field { margin-bottom: 0.75rem; }
.field label { display: block; font-weight: bold; }
.errors { color: #b00020; margin: 0.25rem 0 0; padding-left: 1rem; }
.modal-footer { margin-top: 1.5rem; padding: 1rem; border-top: 1px solid #ccc; }
</style>
</head>
<body>
<h1>Heart Disease Prediction</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Escape text for use in element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Render the form page.
///
/// Submitted values are echoed back so a rejected form keeps its input;
/// `result` is shown in the footer after a successful prediction.
pub fn home_page(form: &HeartForm, errors: Option<&FormErrors>, result: Option<&str>) -> String {
    let mut html = String::from(PAGE_HEAD);

    html.push_str("<form method=\"post\" action=\"/\">\n");
    for field in FORM_FIELDS {
        let value = form.value(field.name);
        let _ = writeln!(html, "<div class=\"field\">");
        let _ = writeln!(html, "<label for=\"{0}\">{1}</label>", field.name, escape_html(field.label));

        match field.kind {
            FieldKind::Integer => {
                let _ = writeln!(
                    html,
                    "<input type=\"number\" step=\"1\" id=\"{0}\" name=\"{0}\" value=\"{1}\" required>",
                    field.name,
                    escape_html(value)
                );
            }
            FieldKind::Decimal => {
                let _ = writeln!(
                    html,
                    "<input type=\"text\" inputmode=\"decimal\" id=\"{0}\" name=\"{0}\" value=\"{1}\">",
                    field.name,
                    escape_html(value)
                );
            }
            FieldKind::Select(choices) => {
                let _ = writeln!(html, "<select id=\"{0}\" name=\"{0}\">", field.name);
                for choice in choices {
                    let selected = if *choice == value { " selected" } else { "" };
                    let _ = writeln!(html, "<option value=\"{0}\"{1}>{0}</option>", choice, selected);
                }
                html.push_str("</select>\n");
            }
        }

        if let Some(messages) = errors.map(|e| e.for_field(field.name)).filter(|m| !m.is_empty()) {
            html.push_str("<ul class=\"errors\">\n");
            for message in messages {
                let _ = writeln!(html, "<li>{}</li>", escape_html(message));
            }
            html.push_str("</ul>\n");
        }

        html.push_str("</div>\n");
    }
    html.push_str("<input type=\"submit\" name=\"submit\" value=\"Predict Results\">\n</form>\n");

    if let Some(result) = result {
        let _ = writeln!(
            html,
            "<div class=\"modal-footer\" id=\"result\">{}</div>",
            escape_html(result)
        );
    }

    html.push_str(PAGE_TAIL);
    html
}

/// Minimal page for failures that prevent a result
pub fn error_page(message: &str) -> String {
    let mut html = String::from(PAGE_HEAD);
    let _ = writeln!(html, "<p class=\"errors\" id=\"error\">{}</p>", escape_html(message));
    html.push_str("<p><a href=\"/\">Back to the form</a></p>\n");
    html.push_str(PAGE_TAIL);
    html
}
