//! Signed-in session state.
//!
//! A `Session` exists only between [`Session::login`] and
//! [`Session::logout`]; screens that need auth or onboarding state receive it
//! by reference from the model.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::membership::{EngagementLevel, TierProgress, User};
use crate::phone::PhoneNumber;
use crate::territory::TerritoryPath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no active session")]
    NotSignedIn,
    #[error("onboarding is incomplete: {missing} not chosen")]
    OnboardingIncomplete { missing: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    user: User,
    phone: PhoneNumber,
    has_ged: Option<bool>,
    onboarded: bool,
}

impl Session {
    #[must_use]
    pub fn login(user: User, phone: PhoneNumber) -> Self {
        let id = SessionId::generate();
        info!(session_id = %id, user_id = %user.id, "session opened");
        Self {
            id,
            user,
            phone,
            has_ged: None,
            onboarded: false,
        }
    }

    pub fn logout(self) {
        info!(session_id = %self.id, "session closed");
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    #[must_use]
    pub const fn has_ged(&self) -> Option<bool> {
        self.has_ged
    }

    #[must_use]
    pub const fn is_onboarded(&self) -> bool {
        self.onboarded
    }

    pub fn record_ged_answer(&mut self, has_ged: bool) {
        self.has_ged = Some(has_ged);
    }

    pub fn set_engagement(&mut self, level: EngagementLevel) {
        self.user.engagement = Some(level);
    }

    pub fn set_territory(&mut self, path: TerritoryPath) {
        self.user.territory = Some(path);
    }

    /// Marks onboarding done; engagement and territory must already be set.
    pub fn complete_onboarding(&mut self) -> Result<(), SessionError> {
        if self.user.engagement.is_none() {
            return Err(SessionError::OnboardingIncomplete {
                missing: "engagement level",
            });
        }
        if self.user.territory.is_none() {
            return Err(SessionError::OnboardingIncomplete {
                missing: "precinct",
            });
        }
        self.onboarded = true;
        info!(session_id = %self.id, "onboarding finished");
        Ok(())
    }

    /// Progress of the member's precinct towards its next tier.
    #[must_use]
    pub fn tier_progress(&self) -> Option<TierProgress> {
        self.user
            .territory
            .as_ref()
            .map(|path| TierProgress::new(path.precinct.member_count))
    }
}
