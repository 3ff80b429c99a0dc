use std::time::Duration;

use url::Url;

/// Greeting pinned as the first bot turn of every session.
pub const DEFAULT_GREETING: &str =
    "안녕하세요~저는 챗봇이입니다! 혹시 요즘 스트레스 받는 일 없으신가요?";

const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Runtime configuration, read once at startup.
/// `DATABASE_URL` stays out of here; the pool is built directly in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the dialogue engine, e.g. `http://localhost:5000`.
    pub upstream_url: Url,
    pub greeting: String,
    pub session_ttl: Duration,
    /// When true, rule-matched replies are folded into the transcript like
    /// any other exchange. The default keeps them out of it entirely.
    pub record_rule_replies: bool,
}

impl Config {
    /// Read configuration from the environment. Panics on a malformed
    /// `MAUM_UPSTREAM_URL`; everything else falls back to defaults.
    pub fn from_env() -> Self {
        let upstream_raw = std::env::var("MAUM_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let upstream_url = Url::parse(&upstream_raw)
            .unwrap_or_else(|e| panic!("MAUM_UPSTREAM_URL is not a valid URL: {e}"));

        Config {
            port: parse_port(std::env::var("PORT").ok().as_deref()),
            upstream_url,
            greeting: std::env::var("MAUM_GREETING")
                .unwrap_or_else(|_| DEFAULT_GREETING.to_string()),
            session_ttl: parse_ttl(std::env::var("MAUM_SESSION_TTL_SECS").ok().as_deref()),
            record_rule_replies: parse_flag(
                std::env::var("MAUM_RECORD_RULE_REPLIES").ok().as_deref(),
            ),
        }
    }
}

fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.parse().ok()).unwrap_or(3000)
}

fn parse_ttl(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SESSION_TTL_SECS);
    Duration::from_secs(secs)
}

fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v == "true").unwrap_or(false)
}
