//! URI to proxy resolution.

use crate::extension::proxy::ExtensionProxy;
use crate::model::uri::{ExtensionUri, UriError};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Resolves extension URIs to proxies.
pub trait ExtensionProvider: Send + Sync {
    /// Pure lookup; never initializes anything.
    fn has_extension(&self, uri: &str) -> bool;

    /// Returns the proxy for `uri`, initializing it for that URI first when
    /// needed. `None` when unknown or when initialization fails.
    fn get_extension(&self, uri: &str) -> Option<Arc<dyn ExtensionProxy>>;
}

/// In-process registrar keyed by URI.
///
/// Own proxies are consulted first, then chained providers in insertion order.
#[derive(Default)]
pub struct ExtensionRegistrar {
    proxies: BTreeMap<String, Arc<dyn ExtensionProxy>>,
    providers: Vec<Arc<dyn ExtensionProvider>>,
}

impl ExtensionRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every URI of `proxy`.
    ///
    /// Validation is all-or-nothing: on error no URI of the proxy is indexed.
    pub fn register_proxy(&mut self, proxy: Arc<dyn ExtensionProxy>) -> Result<(), RegistrarError> {
        if proxy.uris().is_empty() {
            return Err(RegistrarError::NoUris);
        }

        let mut uris = Vec::with_capacity(proxy.uris().len());
        for raw in proxy.uris() {
            let uri = ExtensionUri::parse(raw).map_err(RegistrarError::InvalidUri)?;
            if uri.as_str() != raw {
                return Err(RegistrarError::InvalidUri(UriError::Malformed(raw.clone())));
            }
            if self.proxies.contains_key(uri.as_str()) {
                return Err(RegistrarError::DuplicateUri(uri.to_string()));
            }
            uris.push(uri);
        }

        for uri in uris {
            debug!("event=proxy_register module=registrar status=ok uri={uri}");
            self.proxies.insert(uri.into(), Arc::clone(&proxy));
        }
        Ok(())
    }

    /// Chains a provider consulted for URIs this registrar does not own.
    pub fn add_provider(&mut self, provider: Arc<dyn ExtensionProvider>) {
        self.providers.push(provider);
    }

    /// Releases the proxy for `uri`. Other URIs of the same proxy stay bound.
    pub fn remove_extension(&mut self, uri: &str) -> Option<Arc<dyn ExtensionProxy>> {
        self.proxies.remove(uri.trim())
    }

    /// Returns sorted URIs owned by this registrar.
    pub fn uris(&self) -> Vec<String> {
        self.proxies.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl ExtensionProvider for ExtensionRegistrar {
    fn has_extension(&self, uri: &str) -> bool {
        let uri = uri.trim();
        self.proxies.contains_key(uri)
            || self
                .providers
                .iter()
                .any(|provider| provider.has_extension(uri))
    }

    fn get_extension(&self, uri: &str) -> Option<Arc<dyn ExtensionProxy>> {
        let uri = uri.trim();
        let Some(proxy) = self.proxies.get(uri) else {
            return self
                .providers
                .iter()
                .find(|provider| provider.has_extension(uri))
                .and_then(|provider| provider.get_extension(uri));
        };

        if !proxy.is_initialized(uri) && !proxy.initialize_extension(uri) {
            warn!("event=extension_lookup module=registrar status=error reason=init_failed uri={uri}");
            return None;
        }
        Some(Arc::clone(proxy))
    }
}

/// Registrar indexing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarError {
    NoUris,
    InvalidUri(UriError),
    DuplicateUri(String),
}

impl Display for RegistrarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoUris => write!(f, "extension proxy declares no uris"),
            Self::InvalidUri(err) => write!(f, "invalid extension uri: {err}"),
            Self::DuplicateUri(value) => write!(f, "extension uri already registered: {value}"),
        }
    }
}

impl Error for RegistrarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUri(err) => Some(err),
            Self::NoUris | Self::DuplicateUri(_) => None,
        }
    }
}
