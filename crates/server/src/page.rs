//! HTML rendering of the single-page form

use pricer_lib::form::{ControlKind, Section, CONTROLS};
use pricer_lib::{Control, FormState, Session};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "Car Price Prediction System";
pub const TRIGGER_LABEL: &str = "Predict Car Price";

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
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

/// Render the whole page for a session
///
/// The result region shows `error` when given, otherwise whatever result
/// the session currently displays.
pub fn render(session: &Session, error: Option<&str>) -> String {
    let form = session.form();
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Car Price Prediction</title>
<style>
body {{ font-family: sans-serif; display: flex; margin: 0; }}
form.sidebar {{ width: 22rem; padding: 1rem; background: #f0f2f6; }}
main {{ padding: 2rem; }}
label {{ display: block; margin-top: .75rem; }}
.result {{ padding: 1rem; border-radius: .5rem; background: #dff0d8; }}
.error {{ padding: 1rem; border-radius: .5rem; background: #f2dede; }}
</style>
</head>
<body>
<form class="sidebar" method="post" action="/predict">
"#
    );

    for section in [Section::CarSpecifications, Section::NumericDetails] {
        let _ = writeln!(html, "<h2>{}</h2>", section.title());
        for control in CONTROLS.iter().filter(|c| c.section == section) {
            render_control(&mut html, control, form);
        }
    }

    let _ = write!(
        html,
        r#"<button type="submit">{trigger}</button>
</form>
<main>
<h1>{title}</h1>
<p>Predict the <strong>market price of a car</strong> using a trained Machine Learning model.</p>
<h3>Prediction Result</h3>
"#,
        trigger = TRIGGER_LABEL,
        title = PAGE_TITLE,
    );

    if let Some(message) = error {
        let _ = writeln!(html, r#"<div class="error" id="error">{}</div>"#, escape(message));
    } else if let Some(line) = session.result_text() {
        let _ = writeln!(html, r#"<div class="result" id="result">{}</div>"#, escape(&line));
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_control(html: &mut String, control: &Control, form: &FormState) {
    let name = escape(control.field);
    let current = form.value(control.field).map(|v| v.to_string()).unwrap_or_default();
    let _ = write!(html, r#"<label>{}"#, escape(control.label));

    match control.kind {
        ControlKind::Choice { options } => {
            let _ = write!(html, r#" <select name="{}">"#, name);
            for option in options {
                let selected = if *option == current { " selected" } else { "" };
                let _ = write!(
                    html,
                    r#"<option value="{0}"{1}>{0}</option>"#,
                    escape(option),
                    selected
                );
            }
            html.push_str("</select>");
        }
        ControlKind::Slider { min, max, step } => {
            let _ = write!(
                html,
                r#" <input type="range" name="{}" min="{}" max="{}" step="{}" value="{}" oninput="this.nextElementSibling.value=this.value"><output>{}</output>"#,
                name,
                min,
                max,
                step,
                escape(&current),
                escape(&current)
            );
        }
        ControlKind::Number { min, step } => {
            let _ = write!(
                html,
                r#" <input type="number" name="{}" min="{}" step="{}" value="{}">"#,
                name,
                min,
                step,
                escape(&current)
            );
        }
    }
    html.push_str("</label>\n");
}
