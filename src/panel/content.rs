//! Static reference content of the design guide.

use std::fmt::Write;

pub struct SampleAction {
    pub label: &'static str,
    pub class: &'static str,
    pub toast: &'static str,
}

pub struct TypeSample {
    pub label: &'static str,
    pub preview: &'static str,
    pub class: &'static str,
}

pub struct Swatch {
    pub title: &'static str,
    pub token: &'static str,
    pub usage: &'static str,
}

pub const PRINCIPLES: [(&str, &str); 4] = [
    ("Start with content.", "Map core tasks and write real UI copy before drawing layout."),
    ("Build with tokens.", "Use color, type, and spacing tokens for consistency."),
    ("Design for flow.", "Primary actions should be obvious, secondary actions subdued."),
    ("Responsive by default.", "Let containers flex, then add breakpoints only when needed."),
];

pub const TYPE_SCALE: [TypeSample; 3] = [
    TypeSample {
        label: "Heading • 24px",
        preview: "Design systems keep teams aligned.",
        class: "type-preview type-preview--xl",
    },
    TypeSample {
        label: "Body • 16px",
        preview: "Use body text for descriptions and supporting detail.",
        class: "type-preview",
    },
    TypeSample {
        label: "Caption • 14px",
        preview: "Helper text, hints, and metadata go here.",
        class: "type-preview type-preview--sm",
    },
];

pub const SPACING_PX: [u32; 5] = [4, 8, 12, 16, 24];

pub const SAMPLE_ACTIONS: [SampleAction; 6] = [
    SampleAction { label: "Primary action", class: "btn btn--primary", toast: "success" },
    SampleAction { label: "Neutral action", class: "btn", toast: "info" },
    SampleAction { label: "Ghost warning", class: "btn btn--ghost", toast: "warning" },
    SampleAction { label: "Destructive action", class: "btn btn--danger", toast: "error" },
    SampleAction { label: "Success action", class: "btn btn--success", toast: "success" },
    SampleAction { label: "Loading action", class: "btn btn--warning", toast: "loading" },
];

pub const PALETTE: [Swatch; 4] = [
    Swatch { title: "Primary", token: "--primary-color", usage: "Actions, highlights, links" },
    Swatch { title: "Success", token: "--success-color", usage: "Positive outcomes" },
    Swatch { title: "Warning", token: "--warning-color", usage: "Cautionary states" },
    Swatch { title: "Danger", token: "--danger-color", usage: "Destructive actions" },
];

pub const RESPONSIVE_CHECKLIST: [&str; 4] = [
    "Containers use <code>min()</code> with padding so content never touches edges.",
    "Primary sections use flex/grid with wrapping instead of fixed widths.",
    "At 768px, reduce spacing and switch multi-column grids to a single column.",
    "At 480px, allow horizontal scroll for dense rows like tab bars.",
];

pub const CHECKLIST_LINK: &str = "./DESIGN_AUDIT_CHECKLIST.md";

fn card(out: &mut String, title: &str, body: impl FnOnce(&mut String)) {
    out.push_str(r#"<div class="card">"#);
    _ = write!(out, r#"<div class="card-title">{title}</div>"#);
    body(out);
    out.push_str("</div>");
}

/// Markup for the whole panel
pub fn render() -> String {
    let mut out = String::new();
    out.push_str(
        r#"<div class="panel-header"><div class="card-title-row"><h2>Design Guide</h2><span class="muted">Live reference for layout, typography, and responsive patterns.</span></div></div>"#,
    );
    out.push_str(r#"<div class="stack">"#);

    card(&mut out, "Design principles", |out| {
        out.push_str(r#"<ul class="checklist">"#);
        for (lead, text) in PRINCIPLES {
            _ = write!(out, "<li><strong>{lead}</strong> {text}</li>");
        }
        out.push_str("</ul>");
    });

    card(&mut out, "Typography scale", |out| {
        out.push_str(r#"<div class="design-guide-grid">"#);
        for sample in &TYPE_SCALE {
            _ = write!(
                out,
                r#"<div class="type-sample"><div class="type-label">{}</div><div class="{}">{}</div></div>"#,
                sample.label, sample.class, sample.preview
            );
        }
        out.push_str("</div>");
    });

    card(&mut out, "Spacing rhythm", |out| {
        out.push_str(r#"<p class="muted">Use multiples of 4 for layout spacing and padding to keep vertical rhythm consistent.</p>"#);
        out.push_str(r#"<div class="spacing-scale">"#);
        for px in SPACING_PX {
            _ = write!(out, r#"<div class="spacing-chip">{px}px</div>"#);
        }
        out.push_str("</div>");
    });

    card(&mut out, "Button + toast samples", |out| {
        out.push_str(r#"<p class="muted">Click a button to preview the button style and the matching toast notification.</p>"#);
        out.push_str(r#"<div class="button-grid">"#);
        for action in &SAMPLE_ACTIONS {
            _ = write!(
                out,
                r#"<button class="{}" type="button" data-toast-type="{}">{}</button>"#,
                action.class, action.toast, action.label
            );
        }
        out.push_str("</div>");
    });

    card(&mut out, "Core palette", |out| {
        out.push_str(r#"<div class="design-guide-grid">"#);
        for swatch in &PALETTE {
            _ = write!(
                out,
                r#"<div class="swatch"><span class="swatch-color" style="background: var({});"></span><div><div class="swatch-title">{}</div><div class="muted">{}</div></div></div>"#,
                swatch.token, swatch.title, swatch.usage
            );
        }
        out.push_str("</div>");
    });

    card(&mut out, "Responsive layout checklist", |out| {
        out.push_str(r#"<ol class="checklist">"#);
        for item in RESPONSIVE_CHECKLIST {
            _ = write!(out, "<li>{item}</li>");
        }
        out.push_str("</ol>");
        _ = write!(
            out,
            r#"<div class="inline-actions"><a class="btn btn--ghost" href="{CHECKLIST_LINK}" target="_blank" rel="noopener">Open full checklist</a></div>"#
        );
    });

    out.push_str("</div>");
    out
}

/// `data-toast-type` values in document order
#[cfg(test)]
pub(crate) fn action_kinds(markup: &str) -> Vec<String> {
    const ATTR: &str = r#"data-toast-type=""#;
    markup
        .match_indices(ATTR)
        .filter_map(|(idx, _)| {
            let rest = &markup[idx + ATTR.len()..];
            rest.find('"').map(|end| rest[..end].to_string())
        })
        .collect()
}
