use std::fmt;
use std::str::FromStr;

use chrono::Duration;

pub const SESSION_COOKIE: &str = "accessToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    None,
}

/// Attributes of the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: Duration,
}

impl CookieConfig {
    /// Development serves plain http from one origin; production is cross-site over https.
    pub fn for_environment(env: Environment, max_age: Duration) -> Self {
        match env {
            Environment::Development => Self {
                secure: false,
                same_site: SameSite::Lax,
                max_age,
            },
            Environment::Production => Self {
                secure: true,
                same_site: SameSite::None,
                max_age,
            },
        }
    }

    pub fn session_cookie(&self, token: &str) -> String {
        self.render(token, self.max_age.num_seconds())
    }

    pub fn cleared_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly",
            SESSION_COOKIE, value, max_age
        );
        cookie.push_str(match self.same_site {
            SameSite::Lax => "; SameSite=Lax",
            SameSite::None => "; SameSite=None",
        });
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl: Duration,
}

/// Everything the services and router need at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    pub session: SessionConfig,
    pub cookie: CookieConfig,
}

impl AppConfig {
    pub fn new(environment: Environment, secret: String, ttl: Duration) -> Self {
        Self {
            environment,
            cookie: CookieConfig::for_environment(environment, ttl),
            session: SessionConfig { secret, ttl },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_cookie() {
        let cookie = CookieConfig::for_environment(Environment::Development, Duration::days(7));
        assert_eq!(
            cookie.session_cookie("tok"),
            "accessToken=tok; Path=/; Max-Age=604800; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_production_cookie_is_secure() {
        let cookie = CookieConfig::for_environment(Environment::Production, Duration::days(7));
        let header = cookie.session_cookie("tok");
        assert!(header.ends_with("; SameSite=None; Secure"));
        assert!(cookie.cleared_cookie().starts_with("accessToken=; Path=/; Max-Age=0"));
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }
}
