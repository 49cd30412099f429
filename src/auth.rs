//! OAuth2 credential management for Gmail API

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use yup_oauth2::storage::{TokenInfo, TokenStorage};
use yup_oauth2::ApplicationSecret;

use crate::config::Config;
use crate::error::{Result, WatchError};

pub const GMAIL_MODIFY: &str = "https://www.googleapis.com/auth/gmail.modify";
pub const GMAIL_READONLY: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Scopes requested at authorization time
///
/// - gmail.modify: remove the UNREAD label
/// - gmail.readonly: search and read message metadata
pub const REQUIRED_SCOPES: &[&str] = &[GMAIL_MODIFY, GMAIL_READONLY];

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub =
    Gmail<hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

/// OAuth client the tokens were issued to; required to refresh them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientIdentity {
    pub fn from_secret(secret: &ApplicationSecret) -> Self {
        Self {
            client_id: secret.client_id.clone(),
            client_secret: secret.client_secret.clone(),
            token_uri: if secret.token_uri.is_empty() {
                default_token_uri()
            } else {
                secret.token_uri.clone()
            },
        }
    }

    pub fn application_secret(&self) -> ApplicationSecret {
        ApplicationSecret {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: self.token_uri.clone(),
            ..Default::default()
        }
    }
}

/// Persisted OAuth credential (the token cache file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(flatten)]
    pub client: ClientIdentity,
}

impl Credential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
            && !self.client.client_id.is_empty()
    }

    /// Valid now, or can be made valid without user interaction
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) || self.is_refreshable()
    }

    /// True when every requested scope was granted to this credential
    pub fn covers(&self, scopes: &[&str]) -> bool {
        scopes
            .iter()
            .all(|scope| self.scopes.iter().any(|granted| granted == scope))
    }

    fn to_token_info(&self) -> TokenInfo {
        TokenInfo {
            access_token: Some(self.access_token.clone()),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.expiry.and_then(|expiry| {
                time::OffsetDateTime::from_unix_timestamp(expiry.timestamp()).ok()
            }),
            id_token: None,
        }
    }

    /// Build the record for a token the OAuth library just obtained
    ///
    /// Refresh responses carry no refresh token (or the same one); those keep
    /// the previous refresh token and grant. A different refresh token means a
    /// fresh authorization whose grant is exactly `scopes`.
    fn from_token_info(
        token: TokenInfo,
        scopes: &[&str],
        client: &ClientIdentity,
        previous: Option<&Credential>,
    ) -> Result<Self> {
        let access_token = token.access_token.ok_or_else(|| {
            WatchError::AuthError("Token endpoint returned no access token".to_string())
        })?;

        let expiry = token
            .expires_at
            .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), 0));

        let previous_refresh = previous.and_then(|p| p.refresh_token.clone());
        let fresh_grant = match (&token.refresh_token, &previous_refresh) {
            (Some(new), Some(old)) => new != old,
            (Some(_), None) => true,
            (None, _) => false,
        };

        let mut granted: BTreeSet<String> = scopes.iter().map(|s| s.to_string()).collect();
        if !fresh_grant {
            if let Some(previous) = previous {
                granted.extend(previous.scopes.iter().cloned());
            }
        }

        Ok(Self {
            access_token,
            refresh_token: token.refresh_token.or(previous_refresh),
            expiry,
            scopes: granted.into_iter().collect(),
            client: client.clone(),
        })
    }
}

/// Owner of the token cache file
///
/// Handed to the OAuth authenticator as its token storage, so every token it
/// obtains or refreshes is written through to disk. Clones share state.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    client: ClientIdentity,
    current: Arc<Mutex<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new(path: &Path, client: ClientIdentity, current: Option<Credential>) -> Self {
        Self {
            path: path.to_path_buf(),
            client,
            current: Arc::new(Mutex::new(current)),
        }
    }

    /// Read a credential from the token cache, `None` if there is no file
    pub async fn load(path: &Path) -> Result<Option<Credential>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let credential = serde_json::from_str(&content).map_err(|e| {
                    WatchError::AuthError(format!("Invalid token cache {:?}: {}", path, e))
                })?;
                Ok(Some(credential))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the token cache with `credential`
    pub async fn write(path: &Path, credential: &Credential) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(credential)?;
        tokio::fs::write(path, json).await?;
        secure_token_file(path).await?;
        tracing::debug!("Saved credential to {:?}", path);
        Ok(())
    }

    pub async fn current(&self) -> Option<Credential> {
        self.current.lock().await.clone()
    }
}

#[async_trait]
impl TokenStorage for CredentialStore {
    async fn set(&self, scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let mut current = self.current.lock().await;
        let credential =
            Credential::from_token_info(token, scopes, &self.client, current.as_ref())?;
        Self::write(&self.path, &credential).await?;
        *current = Some(credential);
        Ok(())
    }

    async fn get(&self, scopes: &[&str]) -> Option<TokenInfo> {
        let current = self.current.lock().await;
        current
            .as_ref()
            .filter(|credential| credential.covers(scopes))
            .map(Credential::to_token_info)
    }
}

/// Source of a usable credential at startup
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire(&self) -> Result<Credential>;
}

/// Returns the cached credential, refreshing it first when expired
pub struct CachedTokenProvider {
    token_cache: PathBuf,
    credential: Credential,
}

impl CachedTokenProvider {
    pub fn new(token_cache: &Path, credential: Credential) -> Self {
        Self {
            token_cache: token_cache.to_path_buf(),
            credential,
        }
    }
}

#[async_trait]
impl CredentialProvider for CachedTokenProvider {
    async fn acquire(&self) -> Result<Credential> {
        if !self.credential.is_expired(Utc::now()) {
            tracing::debug!("Using cached credential from {:?}", self.token_cache);
            return Ok(self.credential.clone());
        }

        tracing::info!("Cached credential expired, refreshing");
        let store = CredentialStore::new(
            &self.token_cache,
            self.credential.client.clone(),
            Some(self.credential.clone()),
        );
        authorize(self.credential.client.application_secret(), &store).await
    }
}

/// Runs the browser-based authorization code flow with a local redirect listener
pub struct InteractiveFlowProvider {
    client_secret: PathBuf,
    token_cache: PathBuf,
}

impl InteractiveFlowProvider {
    pub fn new(client_secret: &Path, token_cache: &Path) -> Self {
        Self {
            client_secret: client_secret.to_path_buf(),
            token_cache: token_cache.to_path_buf(),
        }
    }
}

#[async_trait]
impl CredentialProvider for InteractiveFlowProvider {
    async fn acquire(&self) -> Result<Credential> {
        let secret = yup_oauth2::read_application_secret(&self.client_secret)
            .await
            .map_err(|e| {
                WatchError::AuthError(format!(
                    "Failed to read client secret file {:?}: {}",
                    self.client_secret, e
                ))
            })?;

        tracing::info!("No usable cached credential, starting browser authorization");
        let store = CredentialStore::new(
            &self.token_cache,
            ClientIdentity::from_secret(&secret),
            None,
        );
        authorize(secret, &store).await
    }
}

/// Provider chosen by `select_provider`
pub enum SelectedProvider {
    Cached(CachedTokenProvider),
    Interactive(InteractiveFlowProvider),
}

#[async_trait]
impl CredentialProvider for SelectedProvider {
    async fn acquire(&self) -> Result<Credential> {
        match self {
            SelectedProvider::Cached(provider) => provider.acquire().await,
            SelectedProvider::Interactive(provider) => provider.acquire().await,
        }
    }
}

/// Use the token cache when it holds a usable credential, else authorize interactively
pub async fn select_provider(config: &Config) -> SelectedProvider {
    let token_cache = &config.paths.token_cache;
    let interactive = || {
        SelectedProvider::Interactive(InteractiveFlowProvider::new(
            &config.paths.credentials,
            token_cache,
        ))
    };

    match CredentialStore::load(token_cache).await {
        Ok(Some(credential)) if credential.is_usable(Utc::now()) => {
            SelectedProvider::Cached(CachedTokenProvider::new(token_cache, credential))
        }
        Ok(Some(_)) => {
            tracing::info!("Cached credential is expired and cannot be refreshed");
            interactive()
        }
        Ok(None) => interactive(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable token cache: {}", e);
            interactive()
        }
    }
}

/// Obtain a token for `REQUIRED_SCOPES` through `store`, return what it persisted
async fn authorize(secret: ApplicationSecret, store: &CredentialStore) -> Result<Credential> {
    // HTTPRedirect opens a local listener that receives the authorization code
    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .with_storage(Box::new(store.clone()))
    .build()
    .await
    .map_err(|e| WatchError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    auth.token(REQUIRED_SCOPES)
        .await
        .map_err(|e| WatchError::AuthError(format!("Failed to obtain token: {}", e)))?;

    store
        .current()
        .await
        .ok_or_else(|| WatchError::AuthError("No credential was stored".to_string()))
}

/// Build the Gmail API hub for a credential
///
/// The hub's authenticator shares the token cache, so tokens refreshed while
/// polling are persisted too.
pub async fn connect(credential: &Credential, token_cache: &Path) -> Result<GmailHub> {
    let store = CredentialStore::new(
        token_cache,
        credential.client.clone(),
        Some(credential.clone()),
    );

    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        credential.client.application_secret(),
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .with_storage(Box::new(store))
    .build()
    .await
    .map_err(|e| WatchError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    // Use HTTP/1 for compatibility (HTTP/2 is default but HTTP/1 works better with google-gmail1)
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| {
                    WatchError::AuthError(format!("Failed to load TLS roots: {}", e))
                })?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Gmail::new(client, auth))
}

/// Secure token file permissions on Unix systems
///
/// Sets file permissions to 0600 (read/write for owner only)
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows uses ACLs instead of Unix permissions
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client() -> ClientIdentity {
        ClientIdentity {
            client_id: "test-client-id".to_string(),
            client_secret: "test-secret".to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }

    fn credential(expiry: Option<DateTime<Utc>>, refresh_token: Option<&str>) -> Credential {
        Credential {
            access_token: "access-1".to_string(),
            refresh_token: refresh_token.map(str::to_string),
            expiry,
            scopes: REQUIRED_SCOPES.iter().map(|s| s.to_string()).collect(),
            client: client(),
        }
    }

    fn token_info(access: &str, refresh: Option<&str>) -> TokenInfo {
        TokenInfo {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(str::to_string),
            expires_at: time::OffsetDateTime::from_unix_timestamp(Utc::now().timestamp() + 3600)
                .ok(),
            id_token: None,
        }
    }

    #[test]
    fn test_expiry_checks() {
        let now = Utc::now();

        assert!(!credential(Some(now + Duration::hours(1)), None).is_expired(now));
        assert!(credential(Some(now - Duration::minutes(5)), None).is_expired(now));
        // Inside the skew window counts as expired
        assert!(credential(Some(now + Duration::seconds(30)), None).is_expired(now));
        assert!(!credential(None, None).is_expired(now));
    }

    #[test]
    fn test_usable_when_expired_but_refreshable() {
        let now = Utc::now();
        let expired = now - Duration::hours(2);

        assert!(credential(Some(expired), Some("refresh")).is_usable(now));
        assert!(!credential(Some(expired), None).is_usable(now));
        assert!(!credential(Some(expired), Some("")).is_usable(now));
    }

    #[test]
    fn test_covers_scopes() {
        let cred = credential(None, None);
        assert!(cred.covers(&[GMAIL_MODIFY]));
        assert!(cred.covers(REQUIRED_SCOPES));
        assert!(!cred.covers(&["https://www.googleapis.com/auth/gmail.labels"]));
    }

    #[test]
    fn test_credential_file_format() {
        let cred = credential(None, Some("refresh"));
        let json = serde_json::to_value(&cred).unwrap();

        assert_eq!(json["access_token"], "access-1");
        assert_eq!(json["refresh_token"], "refresh");
        assert_eq!(json["client_id"], "test-client-id");
        assert_eq!(json["token_uri"], GOOGLE_TOKEN_URI);
        assert_eq!(json["scopes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_refresh_keeps_refresh_token_and_grant() {
        let previous = credential(Some(Utc::now()), Some("refresh"));

        let refreshed = Credential::from_token_info(
            token_info("access-2", None),
            &[GMAIL_MODIFY],
            &client(),
            Some(&previous),
        )
        .unwrap();

        assert_eq!(refreshed.access_token, "access-2");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh"));
        assert!(refreshed.covers(REQUIRED_SCOPES));
        assert!(refreshed.expiry.is_some());
    }

    #[test]
    fn test_new_grant_replaces_record() {
        let previous = credential(None, Some("old-refresh"));

        let granted = Credential::from_token_info(
            token_info("access-2", Some("new-refresh")),
            &[GMAIL_MODIFY],
            &client(),
            Some(&previous),
        )
        .unwrap();

        assert_eq!(granted.refresh_token.as_deref(), Some("new-refresh"));
        assert_eq!(granted.scopes, vec![GMAIL_MODIFY.to_string()]);
    }

    #[test]
    fn test_token_without_access_token_is_auth_error() {
        let token = TokenInfo {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            id_token: None,
        };
        let result = Credential::from_token_info(token, REQUIRED_SCOPES, &client(), None);
        assert!(matches!(result, Err(WatchError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_store_set_persists_and_get_filters_by_scope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let store = CredentialStore::new(&path, client(), None);

        assert!(store.get(REQUIRED_SCOPES).await.is_none());

        store
            .set(REQUIRED_SCOPES, token_info("access-1", Some("refresh")))
            .await
            .unwrap();

        let on_disk = CredentialStore::load(&path).await.unwrap().unwrap();
        assert_eq!(on_disk.access_token, "access-1");
        assert_eq!(on_disk.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(on_disk.client, client());

        let token = store.get(&[GMAIL_MODIFY]).await.unwrap();
        assert_eq!(token.access_token.as_deref(), Some("access-1"));
        assert!(store
            .get(&["https://www.googleapis.com/auth/gmail.settings.basic"])
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_store_clones_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(&dir.path().join("token.json"), client(), None);
        let handle = store.clone();

        handle
            .set(REQUIRED_SCOPES, token_info("shared", Some("refresh")))
            .await
            .unwrap();

        assert_eq!(store.current().await.unwrap().access_token, "shared");
    }

    #[tokio::test]
    async fn test_load_missing_token_cache() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CredentialStore::load(&dir.path().join("absent.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_load_malformed_token_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = CredentialStore::load(&path).await;
        assert!(matches!(result, Err(WatchError::AuthError(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_token_cache_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        CredentialStore::write(&path, &credential(None, None)).await.unwrap();

        let perms = tokio::fs::metadata(&path).await.unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_cached_provider_returns_valid_credential() {
        let dir = tempfile::tempdir().unwrap();
        let cred = credential(Some(Utc::now() + Duration::hours(1)), Some("refresh"));
        let provider = CachedTokenProvider::new(&dir.path().join("token.json"), cred.clone());

        assert_eq!(provider.acquire().await.unwrap(), cred);
    }

    fn install_crypto_provider() {
        #[cfg(not(windows))]
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        #[cfg(windows)]
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    /// Answer one HTTP request with `body` and return the raw request
    async fn serve_token_once(listener: TcpListener, body: &'static str) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);

            if let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).into_owned()
    }

    #[tokio::test]
    async fn test_cached_provider_refreshes_expired_credential() {
        install_crypto_provider();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let token_uri = format!("http://{}/token", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_token_once(
            listener,
            r#"{"access_token": "access-2", "expires_in": 3600, "token_type": "Bearer"}"#,
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let mut expired = credential(Some(Utc::now() - Duration::hours(1)), Some("refresh"));
        expired.client.token_uri = token_uri.clone();
        CredentialStore::write(&path, &expired).await.unwrap();

        let provider = CachedTokenProvider::new(&path, expired);
        let refreshed = tokio::time::timeout(std::time::Duration::from_secs(10), provider.acquire())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(refreshed.access_token, "access-2");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh"));
        assert!(!refreshed.is_expired(Utc::now()));
        assert!(refreshed.covers(REQUIRED_SCOPES));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /token"));
        assert!(request.contains("grant_type=refresh_token"));
        assert!(request.contains("refresh_token=refresh"));

        let on_disk = CredentialStore::load(&path).await.unwrap().unwrap();
        assert_eq!(on_disk, refreshed);
        assert_eq!(on_disk.client.token_uri, token_uri);
    }

    #[tokio::test]
    async fn test_interactive_provider_without_client_secret() {
        let dir = tempfile::tempdir().unwrap();
        let provider = InteractiveFlowProvider::new(
            &dir.path().join("credentials.json"),
            &dir.path().join("token.json"),
        );

        let err = provider.acquire().await.unwrap_err();
        assert!(matches!(err, WatchError::AuthError(_)));
        assert!(err.to_string().contains("client secret"));
    }

    #[tokio::test]
    async fn test_select_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.token_cache = dir.path().join("token.json");
        config.paths.credentials = dir.path().join("credentials.json");

        // No cache at all
        assert!(matches!(select_provider(&config).await, SelectedProvider::Interactive(_)));

        // Expired with refresh token
        let refreshable = credential(Some(Utc::now() - Duration::hours(1)), Some("refresh"));
        CredentialStore::write(&config.paths.token_cache, &refreshable).await.unwrap();
        assert!(matches!(select_provider(&config).await, SelectedProvider::Cached(_)));

        // Expired and unrefreshable
        let dead = credential(Some(Utc::now() - Duration::hours(1)), None);
        CredentialStore::write(&config.paths.token_cache, &dead).await.unwrap();
        assert!(matches!(select_provider(&config).await, SelectedProvider::Interactive(_)));

        // Garbage in the cache
        tokio::fs::write(&config.paths.token_cache, "{").await.unwrap();
        assert!(matches!(select_provider(&config).await, SelectedProvider::Interactive(_)));
    }

    #[test]
    fn test_scopes_constants() {
        assert_eq!(REQUIRED_SCOPES.len(), 2);
        assert!(REQUIRED_SCOPES.contains(&"https://www.googleapis.com/auth/gmail.modify"));
        assert!(REQUIRED_SCOPES.contains(&"https://www.googleapis.com/auth/gmail.readonly"));
    }
}
