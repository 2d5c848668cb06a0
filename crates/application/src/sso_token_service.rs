use botgate_core::{AppError, AppResult};
use botgate_domain::SsoClaims;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use url::Url;

/// Signs resolved claim sets into bearer tokens for the external dashboard.
///
/// The issuer does not validate entitlement; the access gate must have
/// produced a full-access decision before this service is invoked. Signing
/// is deterministic for a fixed (claims, secret) pair: no timestamp or
/// nonce is added beyond what the claims carry.
#[derive(Clone)]
pub struct SsoTokenService {
    encoding_key: Option<EncodingKey>,
}

impl SsoTokenService {
    /// Creates an issuer from an optional signing secret.
    ///
    /// An absent or blank secret leaves the issuer unconfigured; every
    /// issuance then fails with a signing error instead of emitting an
    /// unsigned or weakly signed token.
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        let encoding_key = secret
            .filter(|secret| !secret.trim().is_empty())
            .map(|secret| EncodingKey::from_secret(secret.as_bytes()));

        Self { encoding_key }
    }

    /// Signs the claim set into a compact HS256 token.
    pub fn issue(&self, claims: &SsoClaims) -> AppResult<String> {
        let key = self.encoding_key.as_ref().ok_or_else(|| {
            AppError::Signing("sso signing secret is not configured".to_owned())
        })?;

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|error| AppError::Signing(format!("failed to sign sso claims: {error}")))
    }
}

/// Deployment configuration for the external dashboard hand-off URL.
#[derive(Debug, Clone)]
pub struct SsoRedirect {
    base_url: Url,
    company_id: String,
    redirect_url: String,
}

impl SsoRedirect {
    /// Creates the redirect builder from deployment configuration.
    pub fn new(
        base_url: &str,
        company_id: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|error| AppError::Validation(format!("invalid sso base url: {error}")))?;

        Ok(Self {
            base_url,
            company_id: company_id.into(),
            redirect_url: redirect_url.into(),
        })
    }

    /// Builds the dashboard entry URL carrying the issued token.
    #[must_use]
    pub fn url_for(&self, token: &str) -> String {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("companyid", self.company_id.as_str())
            .append_pair("ssoToken", token)
            .append_pair("redirect", self.redirect_url.as_str());

        url.to_string()
    }
}
