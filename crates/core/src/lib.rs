pub mod domain;
pub mod reference;
pub mod scoring;

pub mod config {
    use std::path::PathBuf;

    pub const DEFAULT_REFERENCE_TABLE_PATH: &str = "mock_stock_data.csv";
    pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub reference_table_path: PathBuf,
        pub cors_allowed_origin: String,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let reference_table_path = non_empty_var("REFERENCE_TABLE_PATH")
                .unwrap_or_else(|| DEFAULT_REFERENCE_TABLE_PATH.to_string());
            let cors_allowed_origin = non_empty_var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string());

            Ok(Self {
                reference_table_path: PathBuf::from(reference_table_path),
                cors_allowed_origin,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_cors_allowed_origin(&self) -> anyhow::Result<&str> {
            let origin = self.cors_allowed_origin.trim_end_matches('/');
            anyhow::ensure!(
                origin.starts_with("http://") || origin.starts_with("https://"),
                "CORS_ALLOWED_ORIGIN must be an http(s) origin (got {origin})"
            );
            Ok(origin)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

}
