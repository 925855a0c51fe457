use {
    crate::domain::{
        error::CheckoutError,
        gateway::ExpressGateway,
        nvp::{NvpPayload, NvpResponse},
        token::SessionToken,
    },
    async_trait::async_trait,
    std::{env, time::Duration},
};

const API_VERSION: &str = "88.0";

const API_LIVE: &str = "https://api-3t.paypal.com/nvp";
const API_SANDBOX: &str = "https://api-3t.sandbox.paypal.com/nvp";

// The webscr endpoint serves both the hosted checkout redirect and
// notification verification.
const WEBSCR_LIVE: &str = "https://www.paypal.com/cgi-bin/webscr";
const WEBSCR_SANDBOX: &str = "https://www.sandbox.paypal.com/cgi-bin/webscr";

#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub api_username: String,
    pub api_password: String,
    pub api_signature: String,
    pub sandbox: bool,
    pub timeout: Duration,
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            api_username: String::new(),
            api_password: String::new(),
            api_signature: String::new(),
            sandbox: true,
            timeout: Duration::from_secs(20),
        }
    }
}

impl PayPalConfig {
    pub fn from_env() -> Result<Self, CheckoutError> {
        let api_username = env::var("PAYPAL_API_USERNAME")
            .map_err(|_| CheckoutError::Config("PAYPAL_API_USERNAME is required".into()))?;
        let api_password = env::var("PAYPAL_API_PASSWORD")
            .map_err(|_| CheckoutError::Config("PAYPAL_API_PASSWORD is required".into()))?;
        let api_signature = env::var("PAYPAL_API_SIGNATURE")
            .map_err(|_| CheckoutError::Config("PAYPAL_API_SIGNATURE is required".into()))?;

        let sandbox = env::var("PAYPAL_SANDBOX")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let timeout = env::var("PAYPAL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(20));

        Ok(Self {
            api_username,
            api_password,
            api_signature,
            sandbox,
            timeout,
        })
    }
}

/// Express-checkout gateway client over the processor's flat name=value
/// API. Holds no state beyond configuration and the HTTP client.
pub struct PayPalGateway {
    config: PayPalConfig,
    client: reqwest::Client,
}

impl PayPalGateway {
    pub fn new(config: PayPalConfig) -> Result<Self, CheckoutError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self, CheckoutError> {
        Self::new(PayPalConfig::from_env()?)
    }

    fn api_url(&self) -> &'static str {
        if self.config.sandbox { API_SANDBOX } else { API_LIVE }
    }

    fn webscr_url(&self) -> &'static str {
        if self.config.sandbox { WEBSCR_SANDBOX } else { WEBSCR_LIVE }
    }

    async fn post_form(&self, url: &str, body: String) -> Result<(u16, String), CheckoutError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl ExpressGateway for PayPalGateway {
    async fn request(&self, payload: &NvpPayload) -> Result<NvpResponse, CheckoutError> {
        let mut signed = NvpPayload::new();
        signed.set("USER", &self.config.api_username);
        signed.set("PWD", &self.config.api_password);
        signed.set("SIGNATURE", &self.config.api_signature);
        signed.set("VERSION", API_VERSION);
        for (key, value) in payload.fields() {
            signed.set(key, value);
        }

        let (_, body) = self.post_form(self.api_url(), signed.encode()).await?;
        Ok(NvpResponse::parse(&body))
    }

    async fn verify_notification(&self, raw_body: &str) -> bool {
        // The payload must go back byte-for-byte as received, only with the
        // validation command prefixed.
        let body = format!("cmd=_notify-validate&{raw_body}");
        match self.post_form(self.webscr_url(), body).await {
            Ok((200, text)) => text == "VERIFIED",
            Ok((status, _)) => {
                tracing::warn!(status, "notification verification got non-200 response");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "notification verification transport failure");
                false
            }
        }
    }

    fn checkout_redirect_url(&self, session_token: &SessionToken) -> String {
        let token: String =
            url::form_urlencoded::byte_serialize(session_token.as_str().as_bytes()).collect();
        format!("{}?cmd=_express-checkout&token={token}", self.webscr_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gateway(sandbox: bool) -> PayPalGateway {
        PayPalGateway::new(PayPalConfig {
            api_username: "user".into(),
            api_password: "pwd".into(),
            api_signature: "sig".into(),
            sandbox,
            timeout: Duration::from_secs(20),
        })
        .unwrap()
    }

    #[test]
    fn sandbox_flag_selects_base_urls() {
        assert_eq!(test_gateway(true).api_url(), API_SANDBOX);
        assert_eq!(test_gateway(false).api_url(), API_LIVE);
        assert_eq!(test_gateway(true).webscr_url(), WEBSCR_SANDBOX);
        assert_eq!(test_gateway(false).webscr_url(), WEBSCR_LIVE);
    }

    #[test]
    fn redirect_url_escapes_the_session_token() {
        let gateway = test_gateway(true);
        let token = SessionToken::new("EC-1AB 2/CD").unwrap();
        assert_eq!(
            gateway.checkout_redirect_url(&token),
            format!("{WEBSCR_SANDBOX}?cmd=_express-checkout&token=EC-1AB+2%2FCD")
        );
    }

    #[test]
    fn default_config_is_sandboxed_with_20s_timeout() {
        let config = PayPalConfig::default();
        assert!(config.sandbox);
        assert_eq!(config.timeout, Duration::from_secs(20));
    }
}
