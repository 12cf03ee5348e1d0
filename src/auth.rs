//! Auth Gate
//!
//! Identity is owned by an external provider. The gate only maps the
//! provider's reported state to the view that should be shown.

use async_trait::async_trait;

use crate::config::AuthConfig;

/// Signed-in user as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
}

/// Provider-reported authentication state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Unauthenticated,
    Authenticated(UserProfile),
}

impl AuthState {
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current state as the provider sees it
    async fn status(&self) -> AuthState;

    /// Where to send the user to log in, if the provider is configured
    fn login_redirect(&self) -> Option<String>;
}

/// What the front end should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    Loading,
    Login { redirect_url: Option<String> },
    App { user: UserProfile },
}

/// Renders one of loading / login / app from the provider's state
pub struct AuthGate<P: IdentityProvider> {
    provider: P,
}

impl<P: IdentityProvider> AuthGate<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn view(&self) -> GateView {
        match self.provider.status().await {
            AuthState::Loading => GateView::Loading,
            AuthState::Unauthenticated => GateView::Login {
                redirect_url: self.provider.login_redirect(),
            },
            AuthState::Authenticated(user) => GateView::App { user },
        }
    }
}

/// Provider backed by the `[auth]` config section.
///
/// Holding an access token counts as signed in; the token itself is issued
/// by the provider's login flow outside this crate.
#[derive(Debug, Clone)]
pub struct ConfiguredIdentity {
    config: AuthConfig,
}

impl ConfiguredIdentity {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl IdentityProvider for ConfiguredIdentity {
    async fn status(&self) -> AuthState {
        match self.config.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() => AuthState::Authenticated(UserProfile {
                name: self
                    .config
                    .user_name
                    .clone()
                    .unwrap_or_else(|| "User".to_string()),
                email: self.config.user_email.clone(),
                picture: None,
            }),
            _ => AuthState::Unauthenticated,
        }
    }

    fn login_redirect(&self) -> Option<String> {
        let domain = self.config.domain.trim().trim_end_matches('/');
        if domain.is_empty() || self.config.client_id.is_empty() {
            return None;
        }
        let origin = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };
        Some(format!(
            "{}/authorize?response_type=code&client_id={}&redirect_uri={}",
            origin,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
        ))
    }
}
