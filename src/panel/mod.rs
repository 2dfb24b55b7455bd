//! Design guide panel: static reference content with sample buttons wired to
//! the page's toast service.

pub mod content;
#[cfg(target_arch = "wasm32")]
pub mod dom;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsValue;

/// Container the panel renders into
pub const DESIGN_GUIDE_SELECTOR: &str = r#".tab-panel[data-panel="design-guide"]"#;

/// Simulated work behind the loading sample
pub const LOADING_DELAY_MS: u32 = 1400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastOptions {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub level: Option<ToastLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissible: Option<bool>,
}

/// Handle returned by [`Notifier::loading`], passed back verbatim to `update`
#[derive(Clone, Debug, PartialEq)]
pub enum ToastId {
    Json(Value),
    /// Whatever the page's toast manager returned, kept by identity
    Js(JsValue),
}

/// The page's toast service
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str, options: &ToastOptions);
    fn show(&self, options: &ToastOptions);
    fn loading(&self, message: &str, options: &ToastOptions) -> ToastId;
    fn update(&self, id: &ToastId, options: &ToastOptions);
}

/// Where the panel lives
pub trait PanelHost {
    /// Replaces the container content with `markup` and binds a click handler
    /// to every `[data-toast-type]` element, replacing earlier bindings.
    /// Returns false when the container is not in the page.
    fn render(&self, markup: &str, on_action: Rc<dyn Fn(&str)>) -> bool;

    fn notifier(&self) -> Option<Rc<dyn Notifier>>;

    /// One-shot timer
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
}

/// Toast a sample button asks for via its `data-toast-type` attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Loading,
    Info,
}

impl ToastKind {
    /// Unknown kinds fall back to the informational toast
    pub fn from_attr(kind: &str) -> Self {
        match kind {
            "success" => ToastKind::Success,
            "error" => ToastKind::Error,
            "warning" => ToastKind::Warning,
            "loading" => ToastKind::Loading,
            _ => ToastKind::Info,
        }
    }
}

fn options(level: ToastLevel, title: &str, message: &str, timeout_ms: u32) -> ToastOptions {
    ToastOptions {
        level: Some(level),
        title: Some(title.to_string()),
        message: Some(message.to_string()),
        timeout_ms: Some(timeout_ms),
        ..Default::default()
    }
}

/// Shows the sample toast for `kind`
pub fn notify(kind: ToastKind, notifier: Rc<dyn Notifier>, host: &dyn PanelHost) {
    match kind {
        ToastKind::Success => notifier.success("Action completed successfully."),
        ToastKind::Error => notifier.error(
            "Something went wrong. Please retry.",
            &ToastOptions { title: Some("Failed".to_string()), ..Default::default() },
        ),
        ToastKind::Warning => notifier.show(&options(
            ToastLevel::Warning,
            "Heads up",
            "This action needs extra review.",
            3500,
        )),
        ToastKind::Loading => {
            let id = notifier.loading(
                "Processing request…",
                &ToastOptions {
                    title: Some("Working".to_string()),
                    delay_ms: Some(0),
                    ..Default::default()
                },
            );
            host.schedule(
                LOADING_DELAY_MS,
                Box::new(move || {
                    let done = ToastOptions {
                        dismissible: Some(true),
                        ..options(
                            ToastLevel::Success,
                            "Complete",
                            "Request finished successfully.",
                            2500,
                        )
                    };
                    notifier.update(&id, &done);
                }),
            );
        }
        ToastKind::Info => notifier.show(&options(
            ToastLevel::Info,
            "FYI",
            "This is an informational toast sample.",
            3000,
        )),
    }
}

pub struct DesignGuidePanel {
    host: Rc<dyn PanelHost>,
}

impl DesignGuidePanel {
    pub fn new(host: Rc<dyn PanelHost>) -> Self {
        Self { host }
    }

    /// Panel over the page's `.tab-panel[data-panel="design-guide"]` container.
    /// The click listeners live as long as the panel, so keep it around.
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::new(Rc::new(dom::DomPanelHost::new()))
    }

    /// Renders the guide. Returns false, doing nothing, when the container is missing.
    ///
    /// The sample buttons stay wired only while `self` (and so its host) is alive.
    pub fn load(&self) -> bool {
        let notifier = self.host.notifier();
        if notifier.is_none() {
            debug!("No toast service, sample buttons will stay silent");
        }

        let host: Weak<dyn PanelHost> = Rc::downgrade(&self.host);
        let on_action: Rc<dyn Fn(&str)> = Rc::new(move |kind: &str| {
            let (Some(notifier), Some(host)) = (notifier.clone(), host.upgrade()) else {
                return;
            };
            notify(ToastKind::from_attr(kind), notifier, host.as_ref());
        });

        self.host.render(&content::render(), on_action)
    }
}
