use crate::cli::Cli;
use clap::ValueEnum;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Which console the operator is running. Each one unlocks a different set
/// of actions and refreshes at its own pace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    #[default]
    Admin,
    Public,
    Dashboard,
}

impl Profile {
    pub fn title(&self) -> &'static str {
        match self {
            Profile::Admin => "Laughing Legends Admin",
            Profile::Public => "Laughing Legends Registration",
            Profile::Dashboard => "Laughing Legends Dashboard",
        }
    }

    pub fn default_refresh(&self) -> Duration {
        match self {
            Profile::Admin => Duration::from_secs(10),
            Profile::Public => Duration::from_secs(30),
            Profile::Dashboard => Duration::from_secs(15),
        }
    }

    pub fn default_source(&self) -> FeedSource {
        match self {
            Profile::Admin | Profile::Public => FeedSource::Registrations,
            Profile::Dashboard => FeedSource::Combined,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Profile::Admin => Capabilities {
                register: true,
                promote: true,
                set_status: true,
                delete: true,
                export: true,
                layout: RegistrationLayout::Standings,
            },
            Profile::Public => Capabilities {
                register: true,
                promote: false,
                set_status: false,
                delete: true,
                export: false,
                layout: RegistrationLayout::Contact,
            },
            Profile::Dashboard => Capabilities {
                register: false,
                promote: true,
                set_status: true,
                delete: false,
                export: true,
                layout: RegistrationLayout::Standings,
            },
        }
    }
}

/// Where the roster comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FeedSource {
    /// `GET /api/all-data`, both collections tagged.
    #[default]
    Combined,
    /// `GET /api/participants`, registrations with the leaderboard join.
    Registrations,
    /// `GET /api/participants` and `GET /api/leaderboard` side by side.
    Split,
}

/// Columns of the registrations table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationLayout {
    /// Participants, code, status and standings.
    Standings,
    /// Individual names, phones and the registration date.
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub register: bool,
    pub promote: bool,
    pub set_status: bool,
    /// Offered on every row, registration or leaderboard alike.
    pub delete: bool,
    pub export: bool,
    pub layout: RegistrationLayout,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_url: String,
    pub profile: Profile,
    pub source: FeedSource,
    pub refresh_every: Duration,
    pub export_dir: PathBuf,
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let profile = Profile::default();
        Self {
            api_url: legends_api::client::DEFAULT_BASE_URL.to_string(),
            profile,
            source: profile.default_source(),
            refresh_every: profile.default_refresh(),
            export_dir: PathBuf::from("."),
            full_screen: false,
            log_level: None,
        }
    }
}

impl AppSettings {
    pub fn from_cli(cli: &Cli) -> Self {
        let profile = cli.profile;
        let refresh_every = cli
            .refresh_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| profile.default_refresh());

        Self {
            api_url: cli.api_url.clone(),
            profile,
            source: cli.source.unwrap_or_else(|| profile.default_source()),
            refresh_every,
            export_dir: cli.export_dir.clone(),
            full_screen: false,
            log_level: cli.log_level.as_deref().and_then(|l| l.parse().ok()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.profile.capabilities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn profile_defaults() {
        let settings = AppSettings::from_cli(&Cli::parse_from(["legends", "--profile", "dashboard"]));
        assert_eq!(settings.profile, Profile::Dashboard);
        assert_eq!(settings.source, FeedSource::Combined);
        assert_eq!(settings.refresh_every, Duration::from_secs(15));
        assert!(!settings.capabilities().delete);
    }

    #[test]
    fn explicit_flags_override_profile_defaults() {
        let cli = Cli::parse_from([
            "legends",
            "--profile",
            "public",
            "--refresh-secs",
            "3",
            "--source",
            "combined",
            "--log-level",
            "debug",
        ]);
        let settings = AppSettings::from_cli(&cli);
        assert_eq!(settings.refresh_every, Duration::from_secs(3));
        assert_eq!(settings.source, FeedSource::Combined);
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn zero_interval_falls_back_to_profile_default() {
        let cli = Cli::parse_from(["legends", "--refresh-secs", "0"]);
        assert_eq!(AppSettings::from_cli(&cli).refresh_every, Duration::from_secs(10));
    }

    #[test]
    fn delete_divergence_between_profiles() {
        assert!(Profile::Admin.capabilities().delete);
        assert!(Profile::Public.capabilities().delete);
        assert!(!Profile::Public.capabilities().promote);
        assert!(!Profile::Dashboard.capabilities().register);
    }
}
