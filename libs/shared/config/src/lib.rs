use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from_address: String,
    pub pdc_sweep_interval_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            email_api_url: env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_API_URL not set, email dispatch disabled");
                    String::new()
                }),
            email_api_key: env::var("EMAIL_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_API_KEY not set, using empty value");
                    String::new()
                }),
            email_from_address: env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_FROM_ADDRESS not set, using default");
                    "no-reply@backoffice.local".to_string()
                }),
            pdc_sweep_interval_hours: env::var("PDC_SWEEP_INTERVAL_HOURS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(24),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_api_url.is_empty() && !self.email_api_key.is_empty()
    }
}
