use serde::{Deserialize, Serialize};

use crate::capabilities::TimerOutput;
use crate::config::CoreConfig;
use crate::membership::EngagementLevel;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub enum Event {
    #[default]
    Noop,

    AppStarted,
    Configure(CoreConfig),

    RegisterRequested,
    SignInRequested,

    PhoneChanged {
        text: String,
    },
    PhoneSubmitted,

    /// Raw text-change of one OTP cell; multi-character text is a paste.
    OtpInput {
        index: usize,
        text: String,
    },
    OtpBackspace {
        index: usize,
    },
    OtpFocused {
        index: usize,
    },
    VerificationTimer(TimerOutput),

    GedAnswered {
        has_ged: bool,
    },

    EngagementSelected {
        level: EngagementLevel,
    },
    StatusConfirmed,

    TerritorySelected {
        level: usize,
        unit_id: String,
    },
    TerritoryConfirmed,

    OnboardingFinished,

    NavigateBack,
    LogoutRequested,
    DismissError,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::RegisterRequested => "register_requested",
            Self::SignInRequested => "sign_in_requested",
            Self::PhoneChanged { .. } => "phone_changed",
            Self::PhoneSubmitted => "phone_submitted",
            Self::OtpInput { .. } => "otp_input",
            Self::OtpBackspace { .. } => "otp_backspace",
            Self::OtpFocused { .. } => "otp_focused",
            Self::VerificationTimer(_) => "verification_timer",
            Self::GedAnswered { .. } => "ged_answered",
            Self::EngagementSelected { .. } => "engagement_selected",
            Self::StatusConfirmed => "status_confirmed",
            Self::TerritorySelected { .. } => "territory_selected",
            Self::TerritoryConfirmed => "territory_confirmed",
            Self::OnboardingFinished => "onboarding_finished",
            Self::NavigateBack => "navigate_back",
            Self::LogoutRequested => "logout_requested",
            Self::DismissError => "dismiss_error",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::Noop | Self::AppStarted | Self::Configure(_) | Self::VerificationTimer(_)
        )
    }
}
