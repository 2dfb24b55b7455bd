//! In-memory host, wallet and toast service used by the unit tests.

use crate::{
    eip1193::{error::Eip1193Error, Eip1193Provider, EventHandler, ProviderInfo, SharedProvider},
    event::WalletEvent,
    host::{AnnounceHandler, Announcement, WalletHost},
    panel::{Notifier, PanelHost, ToastId, ToastOptions},
};
use async_trait::async_trait;
use ethers::providers::JsonRpcError;
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
    time::Duration,
};

pub fn info(uuid: &str, name: &str, rdns: &str) -> ProviderInfo {
    ProviderInfo {
        uuid: uuid.to_string(),
        name: name.to_string(),
        icon: String::new(),
        rdns: rdns.to_string(),
    }
}

#[derive(Default)]
pub struct MockProvider {
    flags: Vec<String>,
    responses: RefCell<HashMap<String, Result<Value, (i64, String)>>>,
    requests: RefCell<Vec<(String, Value)>>,
    listeners: RefCell<Vec<(WalletEvent, EventHandler)>>,
}

impl MockProvider {
    pub fn with_flag(flag: &str) -> Rc<Self> {
        Rc::new(Self { flags: vec![flag.to_string()], ..Default::default() })
    }

    pub fn metamask() -> Rc<Self> {
        Self::with_flag("isMetaMask")
    }

    pub fn plain() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn respond(&self, method: &str, value: Value) {
        self.responses.borrow_mut().insert(method.to_string(), Ok(value));
    }

    pub fn fail(&self, method: &str, code: i64, message: &str) {
        self.responses.borrow_mut().insert(method.to_string(), Err((code, message.to_string())));
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.borrow().clone()
    }

    pub fn listener_count(&self, event: WalletEvent) -> usize {
        self.listeners.borrow().iter().filter(|(e, _)| *e == event).count()
    }

    /// Delivers `payload` to every listener registered for `event`
    pub fn emit(&self, event: WalletEvent, payload: Value) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(payload.clone());
        }
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, Eip1193Error> {
        self.requests.borrow_mut().push((method.to_string(), params));
        match self.responses.borrow().get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err((code, message))) => Err(Eip1193Error::JsonRpcError(JsonRpcError {
                code: *code,
                message: message.clone(),
                data: None,
            })),
            None => Ok(Value::Null),
        }
    }

    fn on(&self, event: WalletEvent, handler: &EventHandler) {
        self.listeners.borrow_mut().push((event, handler.clone()));
    }

    fn remove_listener(&self, event: WalletEvent, handler: &EventHandler) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(idx) = listeners.iter().position(|(e, h)| *e == event && Rc::ptr_eq(h, handler))
        {
            listeners.remove(idx);
        }
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

#[derive(Default)]
pub struct MockHost {
    handler: RefCell<Option<AnnounceHandler>>,
    on_request: RefCell<Vec<Announcement>>,
    legacy: RefCell<Vec<SharedProvider>>,
    legacy_after_sleep: RefCell<Vec<SharedProvider>>,
    sleeps: RefCell<Vec<u32>>,
    subscriptions: Cell<usize>,
    provider_requests: Cell<usize>,
}

impl MockHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Fires an announcement at whoever subscribed
    pub fn announce(&self, info: Option<ProviderInfo>, provider: Option<Rc<MockProvider>>) {
        let handler = self.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(Announcement { info, provider: provider.map(|p| p as SharedProvider) });
        }
    }

    /// Wallet that answers `eip6963:requestProvider` synchronously
    pub fn answer_on_request(&self, info: Option<ProviderInfo>, provider: Rc<MockProvider>) {
        self.on_request.borrow_mut().push(Announcement { info, provider: Some(provider) });
    }

    pub fn inject_legacy(&self, provider: Rc<MockProvider>) {
        self.legacy.borrow_mut().push(provider);
    }

    /// Wallet that shows up in `window.ethereum` only once the next timer fired
    pub fn inject_legacy_after_sleep(&self, provider: Rc<MockProvider>) {
        self.legacy_after_sleep.borrow_mut().push(provider);
    }

    pub fn sleeps(&self) -> Vec<u32> {
        self.sleeps.borrow().clone()
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.get()
    }

    pub fn provider_requests(&self) -> usize {
        self.provider_requests.get()
    }
}

#[async_trait(?Send)]
impl WalletHost for MockHost {
    fn subscribe_announcements(&self, handler: AnnounceHandler) {
        self.subscriptions.set(self.subscriptions.get() + 1);
        *self.handler.borrow_mut() = Some(handler);
    }

    fn request_providers(&self) {
        self.provider_requests.set(self.provider_requests.get() + 1);
        let handler = self.handler.borrow().clone();
        let answers = self.on_request.borrow().clone();
        if let Some(handler) = handler {
            for announcement in answers {
                handler(announcement);
            }
        }
    }

    fn legacy_providers(&self) -> Vec<SharedProvider> {
        self.legacy.borrow().clone()
    }

    async fn sleep(&self, ms: u32) {
        self.sleeps.borrow_mut().push(ms);
        tokio::time::sleep(Duration::from_millis(ms as u64)).await;
        let late: Vec<SharedProvider> = self.legacy_after_sleep.borrow_mut().drain(..).collect();
        self.legacy.borrow_mut().extend(late);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ToastCall {
    Success(String),
    Error(String, ToastOptions),
    Show(ToastOptions),
    Loading(String, ToastOptions),
    Update(ToastId, ToastOptions),
}

#[derive(Default)]
pub struct MockNotifier {
    calls: RefCell<Vec<ToastCall>>,
    next_id: Cell<u32>,
}

impl MockNotifier {
    pub fn calls(&self) -> Vec<ToastCall> {
        self.calls.borrow().clone()
    }
}

impl Notifier for MockNotifier {
    fn success(&self, message: &str) {
        self.calls.borrow_mut().push(ToastCall::Success(message.to_string()));
    }

    fn error(&self, message: &str, options: &ToastOptions) {
        self.calls.borrow_mut().push(ToastCall::Error(message.to_string(), options.clone()));
    }

    fn show(&self, options: &ToastOptions) {
        self.calls.borrow_mut().push(ToastCall::Show(options.clone()));
    }

    fn loading(&self, message: &str, options: &ToastOptions) -> ToastId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.calls.borrow_mut().push(ToastCall::Loading(message.to_string(), options.clone()));
        ToastId::Json(Value::from(id))
    }

    fn update(&self, id: &ToastId, options: &ToastOptions) {
        self.calls.borrow_mut().push(ToastCall::Update(id.clone(), options.clone()));
    }
}

/// Container that records what was rendered and lets tests click the bound actions
#[derive(Default)]
pub struct MockPanelHost {
    pub present: Cell<bool>,
    pub notifier: RefCell<Option<Rc<MockNotifier>>>,
    markup: RefCell<Option<String>>,
    actions: RefCell<Vec<(String, Rc<dyn Fn(&str)>)>>,
    bound: RefCell<Vec<Weak<dyn Fn(&str)>>>,
    scheduled: RefCell<Vec<(u32, Box<dyn FnOnce()>)>>,
    renders: Cell<usize>,
}

impl MockPanelHost {
    pub fn with_container(notifier: Option<Rc<MockNotifier>>) -> Rc<Self> {
        let host = Self { notifier: RefCell::new(notifier), ..Default::default() };
        host.present.set(true);
        Rc::new(host)
    }

    pub fn markup(&self) -> Option<String> {
        self.markup.borrow().clone()
    }

    pub fn renders(&self) -> usize {
        self.renders.get()
    }

    pub fn action_kinds(&self) -> Vec<String> {
        self.actions.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Clicks the `nth` element carrying `data-toast-type="kind"`
    pub fn click(&self, kind: &str, nth: usize) {
        let action = self
            .actions
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .nth(nth)
            .map(|(_, a)| a.clone());
        if let Some(action) = action {
            action(kind);
        }
    }

    /// Click bindings still alive, one entry per render in order
    pub fn live_bindings(&self) -> Vec<usize> {
        self.bound.borrow().iter().map(Weak::strong_count).collect()
    }

    pub fn scheduled_delays(&self) -> Vec<u32> {
        self.scheduled.borrow().iter().map(|(ms, _)| *ms).collect()
    }

    /// Runs every pending timer task
    pub fn run_timers(&self) {
        let tasks: Vec<(u32, Box<dyn FnOnce()>)> = self.scheduled.borrow_mut().drain(..).collect();
        for (_, task) in tasks {
            task();
        }
    }
}

impl PanelHost for MockPanelHost {
    fn render(&self, markup: &str, on_action: Rc<dyn Fn(&str)>) -> bool {
        if !self.present.get() {
            return false;
        }
        self.renders.set(self.renders.get() + 1);
        *self.markup.borrow_mut() = Some(markup.to_string());

        self.bound.borrow_mut().push(Rc::downgrade(&on_action));
        let kinds = crate::panel::content::action_kinds(markup);
        *self.actions.borrow_mut() =
            kinds.into_iter().map(|kind| (kind, on_action.clone())).collect();
        true
    }

    fn notifier(&self) -> Option<Rc<dyn Notifier>> {
        self.notifier.borrow().clone().map(|n| n as Rc<dyn Notifier>)
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        self.scheduled.borrow_mut().push((delay_ms, task));
    }
}
