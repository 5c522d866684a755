// ── Controller facade ──
//
// One session against the inventory backend (or its mock): who is logged
// in, which data mode is active, and the stores for that mode.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info};

use farmacia_api::{ApiClient, TlsMode, TransportConfig};

use crate::config::{DataMode, SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::fixtures;
use crate::gateway::Gateway;
use crate::model::{Company, DocumentKind, EntityId, Product, StockEntry, Supplier, User};
use crate::notify::{Notifier, TracingNotifier};
use crate::store::{DocumentStore, RecordStore, report, report_failure};

/// Email used by `authenticate` in mock mode when none is configured.
pub const MOCK_EMAIL: &str = "teste@farmacia.com";

// ── Stores ───────────────────────────────────────────────────────────

/// Every store of one session, all backed by the same gateway.
struct Stores {
    entradas: Arc<DocumentStore>,
    saidas: Arc<DocumentStore>,
    perdas: Arc<DocumentStore>,
    inventarios: Arc<DocumentStore>,
    products: Arc<RecordStore<Product>>,
    suppliers: Arc<RecordStore<Supplier>>,
    companies: Arc<RecordStore<Company>>,
}

impl Stores {
    fn new(gateway: &Gateway, notifier: &Arc<dyn Notifier>) -> Self {
        let documents = |kind| Arc::new(DocumentStore::new(kind, gateway.clone(), Arc::clone(notifier)));
        Self {
            entradas: documents(DocumentKind::Entrada),
            saidas: documents(DocumentKind::Saida),
            perdas: documents(DocumentKind::Perda),
            inventarios: documents(DocumentKind::Inventario),
            products: Arc::new(RecordStore::new(gateway.clone(), Arc::clone(notifier), fixtures::products)),
            suppliers: Arc::new(RecordStore::new(gateway.clone(), Arc::clone(notifier), fixtures::suppliers)),
            companies: Arc::new(RecordStore::new(gateway.clone(), Arc::clone(notifier), fixtures::companies)),
        }
    }

    fn documents(&self, kind: DocumentKind) -> &Arc<DocumentStore> {
        match kind {
            DocumentKind::Entrada => &self.entradas,
            DocumentKind::Saida => &self.saidas,
            DocumentKind::Perda => &self.perdas,
            DocumentKind::Inventario => &self.inventarios,
        }
    }
}

struct Session {
    gateway: Gateway,
    stores: Arc<Stores>,
}

fn build_transport(config: &SessionConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}

fn open_session(
    config: &SessionConfig,
    mode: DataMode,
    notifier: &Arc<dyn Notifier>,
) -> Result<Session, CoreError> {
    let gateway = match mode {
        DataMode::Mock => Gateway::Fixture,
        DataMode::Remote => {
            let client = ApiClient::new(config.api_url.as_str(), &build_transport(config))?;
            Gateway::Remote(client)
        }
    };
    let stores = Arc::new(Stores::new(&gateway, notifier));
    Ok(Session { gateway, stores })
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Store accessors fail with
/// `NotAuthenticated` until someone has logged in.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: SessionConfig,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Session>,
    mode: watch::Sender<DataMode>,
    user: watch::Sender<Option<User>>,
}

impl Controller {
    /// Create a controller that reports through `tracing`.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    /// Create a controller with a caller-supplied notification sink.
    ///
    /// Mock stores start out holding the fixtures; remote stores start
    /// empty until refreshed.
    pub fn with_notifier(config: SessionConfig, notifier: Arc<dyn Notifier>) -> Result<Self, CoreError> {
        let session = open_session(&config, config.mode, &notifier)?;
        let (mode, _) = watch::channel(config.mode);
        let (user, _) = watch::channel(None);
        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                notifier,
                session: RwLock::new(session),
                mode,
                user,
            }),
        })
    }

    // ── Data mode ────────────────────────────────────────────────────

    pub fn mode(&self) -> DataMode {
        *self.inner.mode.borrow()
    }

    /// Switch between mock and remote data.
    ///
    /// Every store is replaced by a fresh one for the new mode and the
    /// user is logged out. Nothing is migrated; handles to the old stores
    /// keep working against the old mode.
    pub fn set_mode(&self, mode: DataMode) -> Result<(), CoreError> {
        if mode == self.mode() {
            return Ok(());
        }
        let session = open_session(&self.inner.config, mode, &self.inner.notifier)?;
        *self.inner.session.write().unwrap_or_else(PoisonError::into_inner) = session;
        self.inner.user.send_replace(None);
        self.inner.mode.send_replace(mode);
        info!(%mode, "data mode switched");
        Ok(())
    }

    fn gateway(&self) -> Gateway {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .gateway
            .clone()
    }

    fn stores(&self) -> Result<Arc<Stores>, CoreError> {
        self.require_user()?;
        Ok(Arc::clone(
            &self
                .inner
                .session
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .stores,
        ))
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, CoreError> {
        let result = self.try_login(email, password).await;
        report(self.inner.notifier.as_ref(), "session", "log in", result, |user| {
            format!("Logged in as {}", user.name)
        })
    }

    async fn try_login(&self, email: &str, password: &SecretString) -> Result<User, CoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::missing_fields(&["email"]));
        }
        let user = self.gateway().login(email, password).await?;
        info!(email, mode = %self.mode(), "logged in");
        self.inner.user.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, name: &str, email: &str, password: &SecretString) -> Result<(), CoreError> {
        let result: Result<(), CoreError> = async {
            let missing: Vec<&str> = [("nome", name), ("email", email)]
                .into_iter()
                .filter(|(_, v)| v.trim().is_empty())
                .map(|(field, _)| field)
                .collect();
            if !missing.is_empty() {
                return Err(CoreError::missing_fields(&missing));
            }
            self.gateway().register(name.trim(), email.trim(), password).await
        }
        .await;
        report(self.inner.notifier.as_ref(), "account", "register", result, |_| {
            format!("Account created for {email}")
        })
    }

    pub fn logout(&self) {
        if self.inner.user.send_replace(None).is_some() {
            debug!("logged out");
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.user.borrow().clone()
    }

    fn require_user(&self) -> Result<(), CoreError> {
        if self.inner.user.borrow().is_some() {
            Ok(())
        } else {
            Err(CoreError::NotAuthenticated)
        }
    }

    /// Log in with the configured credentials.
    ///
    /// Mock mode accepts a missing password and falls back to
    /// [`MOCK_EMAIL`]; remote mode needs both.
    pub async fn authenticate(&self) -> Result<User, CoreError> {
        match (&self.inner.config.credentials, self.mode()) {
            (Some(creds), _) => self.login(&creds.email, &creds.password).await,
            (None, DataMode::Mock) => self.login(MOCK_EMAIL, &SecretString::from(String::new())).await,
            (None, DataMode::Remote) => Err(CoreError::Config {
                message: "no credentials configured for remote mode".into(),
            }),
        }
    }

    // ── Stores ───────────────────────────────────────────────────────

    pub fn documents(&self, kind: DocumentKind) -> Result<Arc<DocumentStore>, CoreError> {
        Ok(Arc::clone(self.stores()?.documents(kind)))
    }

    pub fn products(&self) -> Result<Arc<RecordStore<Product>>, CoreError> {
        Ok(Arc::clone(&self.stores()?.products))
    }

    pub fn suppliers(&self) -> Result<Arc<RecordStore<Supplier>>, CoreError> {
        Ok(Arc::clone(&self.stores()?.suppliers))
    }

    pub fn companies(&self) -> Result<Arc<RecordStore<Company>>, CoreError> {
        Ok(Arc::clone(&self.stores()?.companies))
    }

    // ── Reports and filings ──────────────────────────────────────────

    /// Current stock positions. Read-only; not cached.
    pub async fn stock_report(&self) -> Result<Vec<StockEntry>, CoreError> {
        self.require_user()?;
        self.gateway()
            .stock()
            .await
            .inspect_err(|err| report_failure(self.inner.notifier.as_ref(), "stock", "load", err))
    }

    /// Send the regulatory movement file for `start..=end`.
    pub async fn transmit(&self, start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
        let result: Result<(), CoreError> = async {
            self.require_user()?;
            if start > end {
                return Err(CoreError::invalid(
                    "data_final",
                    format!("end date {end} is before start date {start}"),
                ));
            }
            let gateway = self.gateway();
            if matches!(gateway, Gateway::Fixture) && !self.inner.config.mock_latency.is_zero() {
                tokio::time::sleep(self.inner.config.mock_latency).await;
            }
            gateway.transmit(start, end).await?;
            info!(%start, %end, "file transmitted");
            Ok(())
        }
        .await;
        report(self.inner.notifier.as_ref(), "file", "transmit", result, |_| {
            format!("File transmitted for {start} to {end}")
        })
    }

    /// Register a payment for a known company.
    pub async fn pay(&self, company_id: &EntityId) -> Result<(), CoreError> {
        let result = async {
            let companies = self.companies()?;
            if companies.is_empty() {
                companies.refresh().await?;
            }
            let company = companies.get(company_id)?;
            self.gateway().pay(company_id).await?;
            info!(company = %company_id, "payment registered");
            Ok::<_, CoreError>(company)
        }
        .await;
        report(self.inner.notifier.as_ref(), "payment", "register", result, |company| {
            format!("Payment registered for {}", company.legal_name)
        })
        .map(|_| ())
    }
}
