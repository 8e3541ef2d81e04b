use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub paystack: PaystackConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub draw: DrawConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaystackConfig {
    pub secret_key: String,
    #[serde(default = "default_paystack_base_url")]
    pub base_url: String,
    pub callback_url: String,
    /// 月费（pesewas）
    #[serde(default = "default_monthly_amount")]
    pub monthly_amount: i64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_email: String,
    pub dashboard_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            from_email: "noreply@jobmarkt.com".to_string(),
            dashboard_url: "http://localhost:8000/user/dashboard/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    pub minimum_participants: i32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            minimum_participants: 5000,
        }
    }
}

fn default_paystack_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_monthly_amount() -> i64 {
    5000
}

fn default_timeout_secs() -> u64 {
    15
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                let mail_defaults = MailConfig::default();

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    paystack: PaystackConfig {
                        secret_key: get_env("PAYSTACK_SECRET_KEY").unwrap_or_default(),
                        base_url: get_env("PAYSTACK_BASE_URL")
                            .unwrap_or_else(default_paystack_base_url),
                        callback_url: get_env("PAYSTACK_CALLBACK_URL").unwrap_or_else(|| {
                            "http://localhost:8080/api/v1/payments/verify".to_string()
                        }),
                        monthly_amount: get_env_parse(
                            "MONTHLY_SUBSCRIPTION_AMOUNT",
                            default_monthly_amount(),
                        ),
                        timeout_secs: get_env_parse(
                            "PAYSTACK_TIMEOUT_SECS",
                            default_timeout_secs(),
                        ),
                    },
                    mail: MailConfig {
                        api_url: get_env("MAIL_API_URL").unwrap_or_default(),
                        api_key: get_env("MAIL_API_KEY").unwrap_or_default(),
                        from_email: get_env("DEFAULT_FROM_EMAIL")
                            .unwrap_or(mail_defaults.from_email),
                        dashboard_url: get_env("DASHBOARD_URL")
                            .unwrap_or(mail_defaults.dashboard_url),
                    },
                    draw: DrawConfig {
                        minimum_participants: get_env_parse(
                            "DRAW_MINIMUM_PARTICIPANTS",
                            DrawConfig::default().minimum_participants,
                        ),
                    },
                }
            }
            Err(e) => {
                return Err(format!("failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("PAYSTACK_SECRET_KEY") {
            config.paystack.secret_key = v;
        }
        if let Ok(v) = env::var("PAYSTACK_BASE_URL") {
            config.paystack.base_url = v;
        }
        if let Ok(v) = env::var("PAYSTACK_CALLBACK_URL") {
            config.paystack.callback_url = v;
        }
        if let Ok(v) = env::var("MONTHLY_SUBSCRIPTION_AMOUNT")
            && let Ok(n) = v.parse()
        {
            config.paystack.monthly_amount = n;
        }
        if let Ok(v) = env::var("PAYSTACK_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            config.paystack.timeout_secs = n;
        }
        if let Ok(v) = env::var("MAIL_API_URL") {
            config.mail.api_url = v;
        }
        if let Ok(v) = env::var("MAIL_API_KEY") {
            config.mail.api_key = v;
        }
        if let Ok(v) = env::var("DEFAULT_FROM_EMAIL") {
            config.mail.from_email = v;
        }
        if let Ok(v) = env::var("DASHBOARD_URL") {
            config.mail.dashboard_url = v;
        }
        if let Ok(v) = env::var("DRAW_MINIMUM_PARTICIPANTS")
            && let Ok(n) = v.parse()
        {
            config.draw.minimum_participants = n;
        }

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("failed to parse config file: {e}").into())
    }
}
