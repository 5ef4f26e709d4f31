use std::env;

/// Which call path the router takes for every remote invocation.
///
/// Injected at router construction so both paths are testable without
/// process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterMode {
    /// Call the provider API directly with a locally held API key.
    Direct,
    /// Call the authenticated backend proxy, which holds the provider key.
    Proxied,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    /// Per-attempt HTTP timeout. Bounds a hung remote call; the retry
    /// budget is applied on top of this.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ForgeConfig {
    pub mode: RouterMode,
    pub provider: ProviderConfig,
    pub proxy: ProxyConfig,
    pub ledger: Option<LedgerConfig>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            api_key: None,
            api_base: None,
            request_timeout_secs: None,
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok();
        let api_base = env::var("GEMINI_API_BASE").ok();
        let request_timeout_secs = env::var("FORGE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        ProviderConfig {
            api_key,
            api_base,
            request_timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig { base_url: None }
    }
}

impl ProxyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("FORGE_PROXY_URL").ok();
        ProxyConfig { base_url }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            base_url: None,
            token: None,
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("FORGE_LEDGER_URL").ok();
        let token = env::var("FORGE_LEDGER_TOKEN").ok();
        LedgerConfig { base_url, token }
    }

    pub fn with_credentials(
        mut self,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.base_url = Some(base_url.into());
        self.token = Some(token.into());
        self
    }
}

impl Default for ForgeConfig {
    fn default() -> Self {
        ForgeConfig {
            mode: RouterMode::Direct,
            provider: ProviderConfig::default(),
            proxy: ProxyConfig::default(),
            ledger: None,
        }
    }
}

impl ForgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mode = match env::var("FORGE_MODE").ok().as_deref() {
            Some("proxied") => RouterMode::Proxied,
            _ => RouterMode::Direct,
        };

        ForgeConfig {
            mode,
            provider: ProviderConfig::from_env(),
            proxy: ProxyConfig::from_env(),
            ledger: env::var("FORGE_LEDGER_URL")
                .ok()
                .map(|_| LedgerConfig::from_env()),
        }
    }

    pub fn with_mode(mut self, mode: RouterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_provider(mut self, config: ProviderConfig) -> Self {
        self.provider = config;
        self
    }

    pub fn with_proxy(mut self, config: ProxyConfig) -> Self {
        self.proxy = config;
        self.mode = RouterMode::Proxied;
        self
    }

    pub fn with_ledger(mut self, config: LedgerConfig) -> Self {
        self.ledger = Some(config);
        self
    }
}
