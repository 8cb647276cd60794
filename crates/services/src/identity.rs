use std::time::Duration;

use async_trait::async_trait;
use aula_core::Clock;
use aula_core::model::{UserId, UserProfile, UserType};

use crate::capture::CapturedMedia;
use crate::error::VerificationError;

/// Matches a face capture against known users.
#[async_trait]
pub trait BiometricVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `VerificationError::NoMatch` when nobody is recognised.
    async fn verify(
        &self,
        capture: &CapturedMedia,
        expected: UserType,
    ) -> Result<UserProfile, VerificationError>;
}

/// Accepts any non-empty capture and returns a demo account for the role.
#[derive(Debug, Clone)]
pub struct SimulatedVerifier {
    clock: Clock,
    latency: Duration,
}

impl SimulatedVerifier {
    #[must_use]
    pub fn new(clock: Clock, latency: Duration) -> Self {
        Self { clock, latency }
    }
}

#[async_trait]
impl BiometricVerifier for SimulatedVerifier {
    async fn verify(
        &self,
        capture: &CapturedMedia,
        expected: UserType,
    ) -> Result<UserProfile, VerificationError> {
        if capture.is_empty() {
            return Err(VerificationError::NoMatch);
        }
        tokio::time::sleep(self.latency).await;

        let profile = match expected {
            UserType::Student => UserProfile::new(
                UserId::new("student-123"),
                "Ana Garcia",
                "ana.garcia@student.example",
                UserType::Student,
                true,
                self.clock.now(),
            ),
            UserType::Teacher => UserProfile::new(
                UserId::new("teacher-1"),
                "Prof. Maria Rodriguez",
                "maria.rodriguez@example.com",
                UserType::Teacher,
                true,
                self.clock.now(),
            ),
        };
        Ok(profile.with_biometric_data(capture.to_data_url()))
    }
}
