use anyhow::Result;
use platform_store::StoreSettings;

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";
const DEFAULT_ROOT_MESSAGE: &str = "Employee directory API is running";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub cors_allowed_origins: Vec<String>,
    pub root_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            cors_allowed_origins: split_origins(DEFAULT_ORIGINS),
            root_message: DEFAULT_ROOT_MESSAGE.into(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let store = StoreSettings::from_env();

        let cors_allowed_origins = split_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.into()),
        );

        let root_message =
            std::env::var("ROOT_MESSAGE").unwrap_or_else(|_| DEFAULT_ROOT_MESSAGE.into());

        Ok(Self {
            store,
            cors_allowed_origins,
            root_message,
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
