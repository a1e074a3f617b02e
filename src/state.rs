use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::ClientConfig;
use crate::data::dashboard::assemble_value;
use crate::data::model::{CurrentUser, RenderedTable, Section, Token};
use crate::data::table::render;
use crate::error::ViewError;
use crate::net::client::ApiClient;
use crate::net::cookies::CookieJar;
use crate::net::task::Pending;

/// Replaces a failed analytics view.
pub const LOAD_ERROR_TEXT: &str = "Ошибка загрузки данных";
/// Shown in identity widgets without a signed-in user.
pub const ANONYMOUS_TEXT: &str = "Вы не авторизованы!";
pub const LOADING_TEXT: &str = "Загрузка...";

/// Wakes the UI when a background request finishes.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

fn spawn<T, F>(notify: &Notifier, job: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let notify = notify.clone();
    Pending::spawn(job, move || notify())
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Main,
    Analytics,
    About,
    Registration,
    SignIn,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Main => "Главная",
            Page::Analytics => "Аналитика",
            Page::About => "О программе",
            Page::Registration => "Регистрация",
            Page::SignIn => "Вход",
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination cursor
// ---------------------------------------------------------------------------

/// Forward-only cursor of the training data table. The server returns no
/// next cursor; the client steps `offset` by `limit` after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn advance(&mut self) {
        self.offset += self.limit;
    }
}

// ---------------------------------------------------------------------------
// Output area (analytics)
// ---------------------------------------------------------------------------

/// The rendered analytics: either the full section list or an error text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutputArea {
    sections: Vec<Section>,
    error: Option<String>,
}

impl OutputArea {
    /// Clear, then rebuild from `result`. Never appends to old content.
    pub fn bind(&mut self, result: &Result<Vec<Section>, ViewError>) {
        self.clear();
        match result {
            Ok(sections) => self.sections.extend(sections.iter().cloned()),
            Err(_) => self.error = Some(LOAD_ERROR_TEXT.to_string()),
        }
    }

    pub fn clear(&mut self) {
        self.sections.clear();
        self.error = None;
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// State of the analytics page.
#[derive(Default)]
pub struct AnalyticsView {
    pub output: OutputArea,
    /// Heading colours per model, rebuilt on every bind.
    pub color_map: Option<ColorMap>,
    pending: Option<Pending<Result<Vec<Section>, ViewError>>>,
}

impl AnalyticsView {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Fetch and assemble in the background. At most one request at a time.
    pub fn start(&mut self, client: &ApiClient, notify: &Notifier) {
        if self.pending.is_some() {
            return;
        }
        let client = client.clone();
        self.pending = Some(spawn(notify, move || {
            client.analytics().and_then(assemble_value)
        }));
    }

    /// Bind a finished request. Returns its error for the status line.
    pub fn poll(&mut self) -> Option<ViewError> {
        let result = self.pending.as_ref()?.poll()?;
        self.pending = None;
        self.show(result)
    }

    pub fn show(&mut self, result: Result<Vec<Section>, ViewError>) -> Option<ViewError> {
        self.output.bind(&result);
        let ids: Vec<String> = self
            .output
            .sections()
            .iter()
            .filter_map(|s| match s {
                Section::Model(m) => Some(m.id.clone()),
                Section::Overall(_) => None,
            })
            .collect();
        self.color_map = Some(ColorMap::new(&ids));
        match result {
            Ok(_) => None,
            Err(e) => {
                log::error!("analytics failed: {e}");
                Some(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Info page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum InfoContent {
    Loading,
    Text(String),
    Table(RenderedTable),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoFormat {
    Text,
    Table,
}

pub struct InfoItem {
    /// Endpoint name under `/api/info/`.
    pub key: &'static str,
    pub heading: &'static str,
    pub format: InfoFormat,
    pub content: InfoContent,
    pending: Option<Pending<Result<InfoContent, ViewError>>>,
}

impl InfoItem {
    fn new(key: &'static str, heading: &'static str, format: InfoFormat) -> Self {
        Self {
            key,
            heading,
            format,
            content: InfoContent::Loading,
            pending: None,
        }
    }

    fn start(&mut self, client: &ApiClient, page: Pagination, notify: &Notifier) {
        if self.pending.is_some() {
            return;
        }
        self.content = InfoContent::Loading;
        let client = client.clone();
        let (key, format) = (self.key, self.format);
        self.pending = Some(spawn(notify, move || fetch_info(&client, key, format, &page)));
    }
}

fn fetch_info(
    client: &ApiClient,
    key: &str,
    format: InfoFormat,
    page: &Pagination,
) -> Result<InfoContent, ViewError> {
    match format {
        InfoFormat::Text => client.info_text(key).map(InfoContent::Text),
        InfoFormat::Table => {
            let value = client.info_table(key, page)?;
            let record = value
                .as_object()
                .ok_or_else(|| ViewError::validation(format!("{key}: expected a JSON object")))?;
            render("", record).map(InfoContent::Table)
        }
    }
}

/// The main page: subject area, target attribute, training data.
pub struct InfoView {
    pub items: Vec<InfoItem>,
    pub pagination: Pagination,
}

impl InfoView {
    pub fn new(limit: usize) -> Self {
        Self {
            items: vec![
                InfoItem::new("subject_area", "Предметная область", InfoFormat::Text),
                InfoItem::new("target_attribute", "Целевой признак", InfoFormat::Text),
                InfoItem::new("train_data", "Обучающая выборка", InfoFormat::Table),
            ],
            pagination: Pagination::new(limit),
        }
    }

    pub fn start(&mut self, client: &ApiClient, notify: &Notifier) {
        for item in &mut self.items {
            item.start(client, self.pagination, notify);
        }
    }

    /// Request the next training data page.
    pub fn next_page(&mut self, client: &ApiClient, notify: &Notifier) {
        let page = self.pagination;
        for item in &mut self.items {
            if item.format == InfoFormat::Table {
                item.start(client, page, notify);
            }
        }
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.items
            .iter()
            .any(|i| i.key == key && i.pending.is_some())
    }

    pub fn poll(&mut self) -> Vec<ViewError> {
        let mut errors = Vec::new();
        for item in &mut self.items {
            let Some(result) = item.pending.as_ref().and_then(|p| p.poll()) else {
                continue;
            };
            item.pending = None;
            if let Some(e) = apply_info_result(item, result, &mut self.pagination) {
                errors.push(e);
            }
        }
        errors
    }
}

fn apply_info_result(
    item: &mut InfoItem,
    result: Result<InfoContent, ViewError>,
    pagination: &mut Pagination,
) -> Option<ViewError> {
    match result {
        Ok(content) => {
            if item.format == InfoFormat::Table {
                pagination.advance();
            }
            item.content = content;
            None
        }
        Err(e) => {
            log::error!("info item '{}' failed: {e}", item.key);
            item.content = InfoContent::Failed;
            Some(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Loading,
    Anonymous,
    User { name: String, role: String },
}

#[derive(Default)]
pub struct IdentityView {
    identity: Option<Identity>,
    pending: Option<Pending<Result<CurrentUser, ViewError>>>,
}

impl IdentityView {
    pub fn identity(&self) -> &Identity {
        static ANONYMOUS: Identity = Identity::Anonymous;
        self.identity.as_ref().unwrap_or(&ANONYMOUS)
    }

    pub fn start(&mut self, client: &ApiClient, notify: &Notifier) {
        if !client.has_token() {
            self.identity = Some(Identity::Anonymous);
            self.pending = None;
            return;
        }
        self.identity = Some(Identity::Loading);
        let client = client.clone();
        self.pending = Some(spawn(notify, move || client.current_user()));
    }

    pub fn poll(&mut self) -> Option<ViewError> {
        let result = self.pending.as_ref()?.poll()?;
        self.pending = None;
        match result {
            Ok(user) => {
                self.identity = Some(Identity::User {
                    name: user.user_name,
                    role: capitalize(&user.role.role_name),
                });
                None
            }
            Err(e) => {
                log::warn!("identity lookup failed: {e}");
                self.identity = Some(Identity::Anonymous);
                Some(e)
            }
        }
    }

    pub fn user_name(&self) -> &str {
        match self.identity() {
            Identity::User { name, .. } => name,
            Identity::Loading => LOADING_TEXT,
            Identity::Anonymous => ANONYMOUS_TEXT,
        }
    }

    pub fn role_name(&self) -> &str {
        match self.identity() {
            Identity::User { role, .. } => role,
            Identity::Loading => LOADING_TEXT,
            Identity::Anonymous => ANONYMOUS_TEXT,
        }
    }
}

/// Upper-case the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Sign-in / registration forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    SignedIn(Token),
    Registered,
}

#[derive(Default)]
pub struct AuthForm {
    pub user_name: String,
    pub password: String,
    pending: Option<Pending<Result<AuthOutcome, ViewError>>>,
}

impl AuthForm {
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn submit(&mut self, page: Page, client: &ApiClient, notify: &Notifier) {
        if self.pending.is_some() {
            return;
        }
        let client = client.clone();
        let (user, password) = (self.user_name.clone(), self.password.clone());
        self.pending = Some(spawn(notify, move || match page {
            Page::Registration => client.register(&user, &password).map(|_| AuthOutcome::Registered),
            _ => client.login(&user, &password).map(AuthOutcome::SignedIn),
        }));
    }

    fn poll(&mut self) -> Option<Result<AuthOutcome, ViewError>> {
        let result = self.pending.as_ref()?.poll()?;
        self.pending = None;
        self.password.clear();
        Some(result)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ClientConfig,
    pub client: ApiClient,
    pub jar: CookieJar,
    pub page: Page,
    pub analytics: AnalyticsView,
    pub info: InfoView,
    pub identity: IdentityView,
    pub auth_form: AuthForm,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    notify: Notifier,
}

impl AppState {
    /// Build the state for a fresh window. The token cookie, if any, is
    /// attached to every request from here on.
    pub fn new(config: ClientConfig, jar: CookieJar, notify: Notifier) -> Result<Self, ViewError> {
        let client = ApiClient::new(&config.base_url, jar.auth_token())?;
        let info = InfoView::new(config.train_data_limit);
        Ok(Self {
            config,
            client,
            jar,
            page: Page::Main,
            analytics: AnalyticsView::default(),
            info,
            identity: IdentityView::default(),
            auth_form: AuthForm::default(),
            status_message: None,
            notify,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.jar.auth_token().is_some()
    }

    /// Switch page. Each visit builds fresh view state, so responses still
    /// in flight for the old view are dropped unseen.
    pub fn navigate(&mut self, page: Page) {
        log::debug!("navigate to {page:?}");
        self.page = page;
        self.status_message = None;
        self.identity.start(&self.client, &self.notify);
        match page {
            Page::Main => {
                self.info = InfoView::new(self.config.train_data_limit);
                self.info.start(&self.client, &self.notify);
            }
            Page::Analytics => {
                self.analytics = AnalyticsView::default();
                self.analytics.start(&self.client, &self.notify);
            }
            Page::About => {}
            Page::Registration | Page::SignIn => self.auth_form = AuthForm::default(),
        }
    }

    /// Show a dashboard assembled from a local file instead of the server.
    pub fn show_sections(&mut self, sections: Vec<Section>) {
        self.page = Page::Analytics;
        self.analytics = AnalyticsView::default();
        self.analytics.show(Ok(sections));
        self.identity.start(&self.client, &self.notify);
        self.status_message = None;
    }

    pub fn next_info_page(&mut self) {
        self.info.next_page(&self.client, &self.notify);
    }

    pub fn submit_auth(&mut self) {
        self.auth_form.submit(self.page, &self.client, &self.notify);
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.jar.remove_auth_token() {
            log::warn!("could not persist cookie removal: {e}");
        }
        self.client = self.client.with_token(None);
        self.navigate(Page::Main);
    }

    fn complete_sign_in(&mut self, token: Token) {
        let days = self.config.auth_token_expire_days;
        if let Err(e) = self.jar.set_auth_token(&token.access_token, days) {
            log::warn!("could not store auth cookie for {days} days: {e}");
            // Keep the session usable without an expiry.
            if let Err(e) = self.jar.set_auth_token(&token.access_token, 0) {
                log::warn!("could not persist auth cookie: {e}");
            }
        }
        self.client = self.client.with_token(self.jar.auth_token());
        log::info!("signed in as '{}'", self.auth_form.user_name);
        self.navigate(Page::Main);
    }

    /// Drain finished requests. Called once per frame.
    pub fn poll(&mut self) {
        let mut errors = Vec::new();
        errors.extend(self.analytics.poll());
        errors.extend(self.info.poll());
        // Identity failures only reset the widgets to the placeholder.
        if let Some(e) = self.identity.poll() {
            if e != ViewError::Auth {
                errors.push(e);
            }
        }

        match self.auth_form.poll() {
            Some(Ok(AuthOutcome::SignedIn(token))) => self.complete_sign_in(token),
            Some(Ok(AuthOutcome::Registered)) => {
                log::info!("registered '{}'", self.auth_form.user_name);
                self.navigate(Page::SignIn);
                self.status_message = Some("Регистрация прошла успешно".to_string());
            }
            Some(Err(e)) => errors.push(e),
            None => {}
        }

        if !errors.is_empty() {
            self.report(&errors);
        }
    }

    /// Route errors to the status line, one message per line.
    pub fn report(&mut self, errors: &[ViewError]) {
        let messages: Vec<String> = errors.iter().flat_map(|e| e.messages()).collect();
        self.status_message = Some(messages.join("\n"));
    }
}
