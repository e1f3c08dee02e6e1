use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,

    /// Base URL this service is reachable at; used to build the gateway's
    /// redirect and IPN callback URLs.
    pub public_base_url: String,
    /// Base URL of the customer-facing site; browser redirects land there.
    pub frontend_base_url: String,

    pub momo_endpoint: String,
    pub momo_partner_code: String,
    pub momo_access_key: String,
    pub momo_secret_key: String,

    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("public_base_url", "http://127.0.0.1:8080")?
            .set_default("frontend_base_url", "http://127.0.0.1:3000")?
            .set_default("momo_endpoint", "https://test-payment.momo.vn/v2/gateway/api/create")?
            .set_default("mail_from", "bookings@example.com")?
            .add_source(config::Environment::default())
            .build()?;

        config.try_deserialize()
    }

    pub fn momo_redirect_url(&self) -> String {
        format!("{}/payments/momo/redirect", self.public_base_url)
    }

    pub fn momo_ipn_url(&self) -> String {
        format!("{}/payments/momo/ipn", self.public_base_url)
    }
}
