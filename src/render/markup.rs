use crate::render::{Control, ControlKind, ControlSet, Occurrence, RenderedLine, Segment};
use itertools::Itertools;
use std::fmt::Write;

/// Header and body of a rendered form as HTML fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkup {
    pub header_markup: String,
    pub body_markup: String,
}

pub(crate) fn render_lines(lines: &[RenderedLine], controls: &ControlSet) -> String {
    lines
        .iter()
        .map(|line| {
            line.segments
                .iter()
                .map(|segment| match segment {
                    Segment::Text(text) => escape(text),
                    Segment::Control(id) => controls.get(*id).map(render_control).unwrap_or_default(),
                })
                .join("")
        })
        .join("\n")
}

fn render_control(control: &Control) -> String {
    let mut attrs = format!(
        r#"id="{}" data-node="{}""#,
        escape(&control.element_id),
        escape(&control.name)
    );
    // Writing to a String cannot fail.
    if control.occurrence == Occurrence::Var {
        let _ = write!(attrs, r#" data-var="{}""#, escape(&control.name));
    }
    if let Some(key) = &control.submission_key {
        let _ = write!(attrs, r#" data-original-tag="{}""#, escape(key));
    }
    if control.uppercase {
        attrs.push_str(r#" data-uppercase="true""#);
    }

    let classes = |base: &str| {
        if control.linked {
            format!("{base} linked-active")
        } else {
            base.to_string()
        }
    };

    match control.kind {
        ControlKind::Choice => {
            let options = control
                .options
                .iter()
                .map(|option| {
                    let selected = if option.value == control.value() {
                        " selected"
                    } else {
                        ""
                    };
                    format!(
                        r#"<option value="{}"{}>{}</option>"#,
                        escape(&option.value),
                        selected,
                        escape(&option.label)
                    )
                })
                .join("");
            format!(
                r#"<select class="{}" {}><option value="">Choose {}</option>{}</select>"#,
                classes("form-select template-select"),
                attrs,
                escape(&control.name),
                options
            )
        }
        ControlKind::TextArea => format!(
            r#"<textarea class="{}" {} title="{}" placeholder="{}">{}</textarea>"#,
            classes("form-control p-1"),
            attrs,
            escape(&control.placeholder),
            escape(&control.placeholder),
            escape(control.value())
        ),
        ControlKind::Text => {
            let style = control
                .width
                .map(|w| format!(r#" style="width: {w:.0}px""#))
                .unwrap_or_default();
            format!(
                r#"<input type="text" class="{}" {} title="{}" placeholder="{}" value="{}" autocomplete="off" data-lpignore="true" data-1p-ignore="true"{}>"#,
                classes("var-input"),
                attrs,
                escape(&control.placeholder),
                escape(&control.placeholder),
                escape(control.value()),
                style
            )
        }
    }
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
