//! Run configuration: the identity the browser presents, credentials from
//! the environment, and the knobs collected from the command line.

use std::path::PathBuf;
use std::time::Duration;

use linkscout::LaunchOptions;

use crate::cli::Cli;

/// Spoofed desktop identity presented to the site.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const VIEWPORT: (u32, u32) = (1366, 768);
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const TIMEZONE: &str = "America/New_York";

pub const USERNAME_VAR: &str = "LINKEDIN_USERNAME";
pub const PASSWORD_VAR: &str = "LINKEDIN_PASSWORD";

/// Per-CDP-command budget; also bounds the feed navigation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Reads credentials from the environment. Missing variables yield
    /// empty strings and surface as a login failure rather than up front.
    pub fn from_env() -> Self {
        Credentials {
            username: std::env::var(USERNAME_VAR).unwrap_or_default(),
            password: std::env::var(PASSWORD_VAR).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub keyword: String,
    pub location: String,
    pub pages: usize,
    pub output: PathBuf,
    pub headless: bool,
    pub chrome: Option<PathBuf>,
    pub install_missing: bool,
    pub credentials: Credentials,
}

impl RunConfig {
    pub fn from_cli(cli: Cli) -> Self {
        RunConfig {
            keyword: cli.keyword,
            location: cli.location,
            pages: cli.pages,
            output: cli.output,
            headless: cli.headless,
            chrome: cli.chrome,
            install_missing: !cli.no_install,
            credentials: Credentials::from_env(),
        }
    }

    /// Launch options carrying the spoofed identity. The user agent rides
    /// both as a process argument and as a CDP override, matching what the
    /// site sees at the HTTP and JS levels.
    pub fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::default()
            .headless(self.headless)
            .viewport(VIEWPORT.0, VIEWPORT.1)
            .user_agent(USER_AGENT)
            .accept_language(ACCEPT_LANGUAGE)
            .timezone(TIMEZONE)
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={USER_AGENT}"))
            .install_missing(self.install_missing)
            .request_timeout(REQUEST_TIMEOUT);
        if let Some(ref chrome) = self.chrome {
            options = options.executable(chrome);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn sample_config() -> RunConfig {
        RunConfig {
            keyword: "software engineer".into(),
            location: "India".into(),
            pages: 3,
            output: PathBuf::from("out.csv"),
            headless: false,
            chrome: Some(PathBuf::from("/usr/bin/chromium")),
            install_missing: true,
            credentials: Credentials::default(),
        }
    }

    #[test]
    fn launch_options_carry_identity() {
        let options = sample_config().launch_options();
        assert!(
            options
                .args
                .iter()
                .any(|arg| arg == "--disable-blink-features=AutomationControlled")
        );
        assert!(
            options
                .args
                .iter()
                .any(|arg| arg.starts_with("--user-agent=Mozilla/5.0"))
        );
        assert_eq!(options.viewport, Some(VIEWPORT));
        assert_eq!(options.user_agent.as_deref(), Some(USER_AGENT));
        assert_eq!(options.accept_language.as_deref(), Some(ACCEPT_LANGUAGE));
        assert_eq!(options.timezone.as_deref(), Some(TIMEZONE));
        assert_eq!(options.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(options.install_missing);
        assert!(!options.headless);
    }

    #[test]
    fn from_cli_maps_flags() {
        let cli = Cli::try_parse_from([
            "linkscout",
            "-k",
            "sre",
            "-l",
            "Warsaw",
            "-p",
            "2",
            "--headless",
            "--no-install",
        ])
        .unwrap();
        let config = RunConfig::from_cli(cli);
        assert_eq!(config.keyword, "sre");
        assert_eq!(config.location, "Warsaw");
        assert_eq!(config.pages, 2);
        assert!(config.headless);
        assert!(!config.install_missing);
    }
}
