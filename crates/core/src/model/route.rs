use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every screen the hosting shell can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Home,
    Login,
    StudentAuth,
    TeacherAuth,
    BiometricLogin,
    TeacherBiometric,
    VoiceRegistration,
    TeacherVoiceSetup,
    Personalization,
    Levels,
    TeacherDashboard,
    StudentDetail,
    TextTemplates,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown route: {0}")]
pub struct RouteParseError(pub String);

impl Route {
    /// Screen the navigator starts on.
    pub const ENTRY: Route = Route::Home;

    pub const ALL: [Route; 13] = [
        Route::Home,
        Route::Login,
        Route::StudentAuth,
        Route::TeacherAuth,
        Route::BiometricLogin,
        Route::TeacherBiometric,
        Route::VoiceRegistration,
        Route::TeacherVoiceSetup,
        Route::Personalization,
        Route::Levels,
        Route::TeacherDashboard,
        Route::StudentDetail,
        Route::TextTemplates,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Login => "login",
            Route::StudentAuth => "student-auth",
            Route::TeacherAuth => "teacher-auth",
            Route::BiometricLogin => "biometric-login",
            Route::TeacherBiometric => "teacher-biometric",
            Route::VoiceRegistration => "voice-registration",
            Route::TeacherVoiceSetup => "teacher-voice-setup",
            Route::Personalization => "personalization",
            Route::Levels => "levels",
            Route::TeacherDashboard => "teacher-dashboard",
            Route::StudentDetail => "student-detail",
            Route::TextTemplates => "text-templates",
        }
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::ENTRY
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Route::ALL
            .into_iter()
            .find(|route| route.as_str() == wanted)
            .ok_or_else(|| RouteParseError(wanted.to_string()))
    }
}
