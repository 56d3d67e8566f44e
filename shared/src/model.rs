use serde::{Deserialize, Serialize};

use crate::capabilities::TimerId;
use crate::code_input::SegmentedCodeInput;
use crate::config::CoreConfig;
use crate::error::AppError;
use crate::membership::EngagementLevel;
use crate::phone::PhoneNumber;
use crate::selector::HierarchicalSelector;
use crate::session::Session;
use crate::territory::{GeoUnit, TerritoryDataset};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Welcome,
    Phone,
    Otp,
    GedCheck,
    StatusSelection,
    Territory,
    Complete,
    Home,
}

impl Screen {
    /// Where the app opens for the given session state.
    #[must_use]
    pub fn entry(session: Option<&Session>) -> Self {
        match session {
            None => Self::Welcome,
            Some(s) if !s.is_onboarded() => Self::GedCheck,
            Some(_) => Self::Home,
        }
    }

    /// Back-navigation target for screens without their own back handling.
    /// `GedCheck` replaces the auth stack, so there is nothing behind it.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Phone => Some(Self::Welcome),
            Self::Otp => Some(Self::Phone),
            Self::StatusSelection => Some(Self::GedCheck),
            Self::Territory => Some(Self::StatusSelection),
            Self::Complete => Some(Self::Territory),
            Self::Welcome | Self::GedCheck | Self::Home => None,
        }
    }
}

/// OTP screen state; dropped when the screen is left.
#[derive(Debug)]
pub struct OtpState {
    pub input: SegmentedCodeInput,
    /// Pending simulated verification, if the code is complete.
    pub verification: Option<TimerId>,
}

impl OtpState {
    #[must_use]
    pub const fn is_verifying(&self) -> bool {
        self.verification.is_some()
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: CoreConfig,
    pub screen: Screen,
    pub session: Option<Session>,

    pub phone: PhoneNumber,
    pub otp: Option<OtpState>,
    pub engagement_choice: Option<EngagementLevel>,

    pub territory: TerritoryDataset,
    pub selector: Option<HierarchicalSelector<GeoUnit>>,

    pub active_error: Option<AppError>,
}

impl Model {
    pub fn set_error(&mut self, error: impl Into<AppError>) {
        self.active_error = Some(error.into());
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Drops all per-flow state; reference data and config survive.
    pub fn reset_flow(&mut self) {
        self.phone = PhoneNumber::normalize_with_length("", self.config.phone_digits);
        self.otp = None;
        self.engagement_choice = None;
        self.selector = None;
        self.active_error = None;
    }
}
