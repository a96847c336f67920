//! Installing the wallet into a page.

use alloy_provider::DynProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{borrow::Cow, fmt, sync::Arc};

use crate::{
    account::Account,
    bridge::{Bridge, BridgeFn},
    error::{PrivateKeyError, WalletError},
    registry::{SessionId, SessionRegistry},
    session::WalletSession,
    transport::{self, Transports},
};

/// The page-context half of the wallet: builds the EIP-1193 provider and announces it.
pub const PROVIDER_JS: &str = include_str!("../assets/provider.js");

/// Name under which the bridge function is exposed to pages.
pub const DEFAULT_BRIDGE_NAME: &str = "__mockWalletBridge";

const DEFAULT_NAME: &str = "Mock Wallet";
const DEFAULT_RDNS: &str = "com.example.mock-wallet";
const DEFAULT_ICON: &str = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' width='24' height='24' viewBox='0 0 24 24' fill='none' stroke='currentColor' stroke-width='2' stroke-linecap='round' stroke-linejoin='round'><path d='M12 5c.67 0 1.35.09 2 .26 1.78-2 5.03-2.84 6.42-2.26 1.4.58-.42 7-.42 7 .57 1.07 1 2.24 1 3.44C21 17.9 16.97 21 12 21s-9-3-9-7.56c0-1.25.5-2.4 1-3.44 0 0-1.89-6.42-.5-7 1.39-.58 4.72.23 6.5 2.23A9.04 9.04 0 0 1 12 5Z'/><path d='M8 14v.5'/><path d='M16 14v.5'/><path d='M11.25 16.25h1.5L12 17l-.75-.75Z'/></svg>";

/// EIP-6963 provider info.
///
/// An empty `uuid` is replaced by the session id at installation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub uuid: String,
    pub name: String,
    pub icon: String,
    pub rdns: String,
}

impl Default for WalletInfo {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            name: DEFAULT_NAME.to_string(),
            icon: DEFAULT_ICON.to_string(),
            rdns: DEFAULT_RDNS.to_string(),
        }
    }
}

/// How the injected provider reaches the bridge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BridgeEndpoint {
    /// A function exposed on `window` by the automation driver.
    Binding { name: String },
    /// The HTTP bridge of a [`BridgeServer`](crate::server::BridgeServer).
    Http { url: String, token: String },
}

/// The values baked into the provider script at injection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitArgs {
    pub session_id: SessionId,
    pub debug: bool,
    pub info: WalletInfo,
    pub bridge: BridgeEndpoint,
}

/// A script that must run in the page before any page script.
///
/// Renders as `(<body>)(<args>)`, so it can be handed to drivers that take a source string as
/// well as to drivers that take a function and its argument separately.
#[derive(Clone, Debug, PartialEq)]
pub struct InitScript {
    pub body: Cow<'static, str>,
    pub args: Value,
}

impl InitScript {
    pub fn provider(args: &InitArgs) -> Result<Self, WalletError> {
        let args = serde_json::to_value(args).map_err(crate::error::ExecutionError::from)?;
        Ok(Self { body: Cow::Borrowed(PROVIDER_JS.trim_end()), args })
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InitScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})({})", self.body, self.args)
    }
}

/// The two primitives the wallet needs from a browser automation driver.
#[async_trait]
pub trait PageTarget: Send + Sync {
    /// Makes `function` callable from the page as `window[name]`.
    async fn expose_function(&self, name: &str, function: BridgeFn) -> eyre::Result<()>;

    /// Registers a script to run in every new document before its own scripts.
    async fn add_init_script(&self, script: InitScript) -> eyre::Result<()>;
}

#[derive(Debug)]
enum SessionSource {
    New { account: Account, transports: Transports, default_chain: Option<u64> },
    Shared(Arc<WalletSession>),
}

/// Parameters of a single wallet installation.
#[derive(Debug)]
pub struct InstallOptions {
    source: SessionSource,
    debug: bool,
    info: WalletInfo,
}

impl InstallOptions {
    pub fn new(account: impl Into<Account>) -> Self {
        let source = SessionSource::New {
            account: account.into(),
            transports: Transports::new(),
            default_chain: None,
        };
        Self { source, debug: false, info: WalletInfo::default() }
    }

    /// Installs an existing session instead of creating one.
    ///
    /// Every page installed with the same session shares its id and its current chain, and
    /// uninstalling that id disconnects all of them. The session's account, transports and
    /// default chain are already fixed, so [`Self::transport`], [`Self::rpc_url`] and
    /// [`Self::default_chain`] have no effect on these options.
    pub fn shared(session: Arc<WalletSession>) -> Self {
        Self { source: SessionSource::Shared(session), debug: false, info: WalletInfo::default() }
    }

    /// Installs a local signer for the given hex private key.
    pub fn from_private_key(private_key: &str) -> Result<Self, PrivateKeyError> {
        Ok(Self::new(Account::from_private_key(private_key)?))
    }

    pub fn account(&self) -> &Account {
        match &self.source {
            SessionSource::New { account, .. } => account,
            SessionSource::Shared(session) => session.account(),
        }
    }

    /// Routes calls for `chain_id` through `provider`.
    pub fn transport(mut self, chain_id: u64, provider: DynProvider) -> Self {
        if let SessionSource::New { transports, .. } = &mut self.source {
            transports.insert(chain_id, provider);
        }
        self
    }

    /// Routes calls for `chain_id` to an HTTP endpoint.
    pub fn rpc_url(self, chain_id: u64, url: &str) -> Result<Self, WalletError> {
        let provider = transport::http_provider(chain_id, url)?;
        Ok(self.transport(chain_id, provider))
    }

    pub fn default_chain(mut self, chain_id: u64) -> Self {
        if let SessionSource::New { default_chain, .. } = &mut self.source {
            *default_chain = Some(chain_id);
        }
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn info(mut self, info: WalletInfo) -> Self {
        self.info = info;
        self
    }
}

/// Owns the sessions of every installed wallet and installs new ones into pages.
#[derive(Clone, Debug)]
pub struct MockWallet {
    bridge: Bridge,
    bridge_name: String,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWallet {
    pub fn new() -> Self {
        Self::with_bridge_name(DEFAULT_BRIDGE_NAME)
    }

    pub fn with_bridge_name(name: impl Into<String>) -> Self {
        Self { bridge: Bridge::new(SessionRegistry::new()), bridge_name: name.into() }
    }

    pub fn registry(&self) -> &SessionRegistry {
        self.bridge.registry()
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Name of the page function the provider calls into.
    pub fn bridge_name(&self) -> &str {
        &self.bridge_name
    }

    /// Installs a wallet session into `target`.
    ///
    /// The bridge function is exposed before the init script is added, so the provider can reach
    /// the host as soon as the page starts. If the target rejects either step, a session created
    /// by this call is removed again. A shared session stays installed.
    pub async fn install<T>(
        &self,
        target: &T,
        options: InstallOptions,
    ) -> Result<SessionId, WalletError>
    where
        T: PageTarget + ?Sized,
    {
        let name = self.bridge_name();
        let endpoint = BridgeEndpoint::Binding { name: name.to_string() };
        let Registered { id, script, created } = self.register(options, endpoint)?;

        let injected = async {
            target.expose_function(name, self.bridge.handler()).await?;
            target.add_init_script(script).await
        };
        if let Err(err) = injected.await {
            if created {
                self.registry().remove(&id);
            }
            return Err(WalletError::Injection(err));
        }

        debug!(target: "mock_wallet::session", wallet = id.short(), "installed wallet");
        Ok(id)
    }

    /// Registers a session that reaches the host through an HTTP bridge instead of a page binding.
    ///
    /// Returns the session id and the script to inject into the page.
    pub fn install_http(
        &self,
        options: InstallOptions,
        url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<(SessionId, InitScript), WalletError> {
        let endpoint = BridgeEndpoint::Http { url: url.into(), token: token.into() };
        let Registered { id, script, .. } = self.register(options, endpoint)?;
        Ok((id, script))
    }

    /// Evicts a session. Later calls from its page fail with
    /// [`WalletError::SessionNotFound`].
    pub fn uninstall(&self, id: &SessionId) -> bool {
        let removed = self.registry().remove(id).is_some();
        if removed {
            debug!(target: "mock_wallet::session", wallet = id.short(), "uninstalled wallet");
        }
        removed
    }

    fn register(
        &self,
        options: InstallOptions,
        bridge: BridgeEndpoint,
    ) -> Result<Registered, WalletError> {
        let InstallOptions { source, debug, mut info } = options;

        let (id, created) = match source {
            SessionSource::New { account, transports, default_chain } => {
                let mut builder = WalletSession::builder(account).transports(transports);
                if let Some(chain_id) = default_chain {
                    builder = builder.default_chain(chain_id);
                }
                let session = builder.build();
                let id = session.id().clone();
                if !self.registry().insert(session) {
                    return Err(WalletError::invalid_request(format!(
                        "session {id} is already installed"
                    )));
                }
                (id, true)
            }
            SessionSource::Shared(session) => {
                let id = session.id().clone();
                match self.registry().get(&id) {
                    Some(existing) if !Arc::ptr_eq(&existing, &session) => {
                        return Err(WalletError::invalid_request(format!(
                            "another session is installed under {id}"
                        )));
                    }
                    Some(_) => (id, false),
                    None => (id, self.registry().insert_shared(session)),
                }
            }
        };

        if info.uuid.is_empty() {
            info.uuid = id.to_string();
        }
        let args = InitArgs { session_id: id.clone(), debug, info, bridge };
        match InitScript::provider(&args) {
            Ok(script) => Ok(Registered { id, script, created }),
            Err(err) => {
                if created {
                    self.registry().remove(&id);
                }
                Err(err)
            }
        }
    }
}

/// A session registered for a page, with the script that connects the page to it.
struct Registered {
    id: SessionId,
    script: InitScript,
    /// Whether the session was added by this installation.
    created: bool,
}
