use tracing::{debug, error, info, warn};

use crate::capabilities::{Capabilities, TimerId, TimerOutput};
use crate::code_input::SegmentedCodeInput;
use crate::error::{AppError, AppResult, ErrorKind, UserFacingError};
use crate::event::Event;
use crate::membership::User;
use crate::model::{Model, OtpState, Screen};
use crate::phone::PhoneNumber;
use crate::selector::{HierarchyNode, SelectOutcome, SelectorError};
use crate::session::{Session, SessionError};
use crate::territory::TerritoryPath;
use crate::view::{EngagementOption, MemberSummary, TerritoryView, ViewModel, ViewState};

#[derive(Default)]
pub struct App;

impl App {
    fn navigate(model: &mut Model, screen: Screen) {
        debug!(from = ?model.screen, to = ?screen, "screen changed");
        model.screen = screen;
        model.clear_error();
    }

    fn reject(model: &mut Model, error: impl Into<AppError>) {
        let error = error.into();
        if error.kind.is_defect() {
            error!(code = error.code(), error = %error, "event hit an impossible state");
        } else {
            warn!(code = error.code(), error = %error, "input rejected");
        }
        model.set_error(error);
    }

    fn expect_screen(model: &Model, screen: Screen, event: &'static str) -> bool {
        if model.screen == screen {
            return true;
        }
        debug!(event, screen = ?model.screen, "event ignored on this screen");
        false
    }

    /// Drops the code entry state, cancelling its timer if one is pending.
    fn cancel_verification(model: &mut Model, caps: &Capabilities) {
        if let Some(id) = model.otp.take().and_then(|otp| otp.verification) {
            debug!(timer_id = %id, "verification cancelled");
            caps.timer.cancel(id);
        }
    }

    /// Code entry state lives only while the OTP screen is shown; whatever
    /// moved the flow elsewhere also drops the input and its pending timer.
    fn release_code_entry(model: &mut Model, caps: &Capabilities) {
        if model.screen != Screen::Otp && model.otp.is_some() {
            Self::cancel_verification(model, caps);
        }
    }

    fn open_code_entry(model: &Model) -> AppResult<OtpState> {
        model.phone.validate()?;
        let input = SegmentedCodeInput::new(model.config.code_input())?;
        Ok(OtpState {
            input,
            verification: None,
        })
    }

    fn submit_phone(model: &mut Model) {
        match Self::open_code_entry(model) {
            Ok(otp) => {
                model.otp = Some(otp);
                Self::navigate(model, Screen::Otp);
            }
            Err(e) => Self::reject(model, e),
        }
    }

    fn otp_input(model: &mut Model, caps: &Capabilities, index: usize, text: &str) {
        let Some(otp) = model.otp.as_mut() else {
            return;
        };
        if otp.is_verifying() {
            debug!(index, "input ignored while verifying");
            return;
        }

        match otp.input.handle_input(text, index) {
            Ok(Some(code)) => {
                let id = TimerId::generate();
                info!(timer_id = %id, code_len = code.len(), "code complete, verifying");
                otp.verification = Some(id.clone());
                caps.timer
                    .start(id, model.config.verification_delay_ms, Event::VerificationTimer);
            }
            Ok(None) => {}
            Err(e) => Self::reject(model, e),
        }
    }

    fn verification_resolved(model: &mut Model, output: TimerOutput) -> bool {
        let pending = model
            .otp
            .as_ref()
            .filter(|_| model.screen == Screen::Otp)
            .and_then(|otp| otp.verification.as_ref());
        match output {
            TimerOutput::Fired { id } if pending == Some(&id) => {
                let session = Session::login(User::demo(), model.phone.clone());
                model.session = Some(session);
                model.otp = None;
                Self::navigate(model, Screen::GedCheck);
                true
            }
            TimerOutput::Fired { id } => {
                warn!(timer_id = %id, "stale verification timer ignored");
                false
            }
            TimerOutput::Cancelled { id } if pending == Some(&id) => {
                warn!(timer_id = %id, "verification cancelled by shell, code entry reopened");
                if let Some(otp) = model.otp.as_mut() {
                    otp.verification = None;
                    otp.input.reset();
                }
                true
            }
            TimerOutput::Cancelled { id } => {
                debug!(timer_id = %id, "verification timer cancelled");
                false
            }
        }
    }

    fn confirm_status(model: &mut Model) {
        let Some(level) = model.engagement_choice else {
            Self::reject(
                model,
                AppError::new(ErrorKind::Validation, "Choose how you want to take part."),
            );
            return;
        };
        let Some(session) = model.session.as_mut() else {
            Self::reject(model, SessionError::NotSignedIn);
            return;
        };
        session.set_engagement(level);

        if model.selector.is_none() {
            match model.territory.selector() {
                Ok(selector) => model.selector = Some(selector),
                Err(e) => {
                    Self::reject(model, e);
                    return;
                }
            }
        }
        Self::navigate(model, Screen::Territory);
    }

    fn select_territory(model: &mut Model, level: usize, unit_id: &str) {
        let Some(selector) = model.selector.as_mut() else {
            return;
        };
        match selector.select_by_id(level, unit_id) {
            Ok(SelectOutcome::Advanced { step }) => {
                debug!(step, "territory level advanced");
                model.clear_error();
            }
            Ok(SelectOutcome::LeafSelected(unit)) => {
                debug!(precinct = unit.id(), "precinct chosen");
                model.clear_error();
            }
            Err(e) => Self::reject(model, e),
        }
    }

    fn confirm_territory(model: &mut Model) {
        let path = model
            .selector
            .as_ref()
            .filter(|selector| selector.is_complete())
            .and_then(|selector| TerritoryPath::from_selection(selector.selection()));
        let Some(path) = path else {
            Self::reject(
                model,
                AppError::new(ErrorKind::Validation, "Choose a precinct to continue."),
            );
            return;
        };
        let Some(session) = model.session.as_mut() else {
            Self::reject(model, SessionError::NotSignedIn);
            return;
        };
        info!(precinct = %path.precinct.id, "territory confirmed");
        session.set_territory(path);
        Self::navigate(model, Screen::Complete);
    }

    fn finish_onboarding(model: &mut Model) {
        let Some(session) = model.session.as_mut() else {
            Self::reject(model, SessionError::NotSignedIn);
            return;
        };
        if let Err(e) = session.complete_onboarding() {
            Self::reject(model, e);
            return;
        }
        model.engagement_choice = None;
        model.selector = None;
        Self::navigate(model, Screen::Home);
    }

    fn navigate_back(model: &mut Model, caps: &Capabilities) {
        match model.screen {
            Screen::Otp => {
                Self::cancel_verification(model, caps);
                Self::navigate(model, Screen::Phone);
            }
            Screen::Territory => {
                let result = model
                    .selector
                    .as_mut()
                    .map_or(Err(SelectorError::AtRoot), |selector| selector.go_back());
                match result {
                    Ok(step) => {
                        debug!(step, "territory stepped back");
                        model.clear_error();
                    }
                    Err(SelectorError::AtRoot) => Self::navigate(model, Screen::StatusSelection),
                    Err(e) => Self::reject(model, e),
                }
            }
            screen => match screen.previous() {
                Some(previous) => Self::navigate(model, previous),
                None => debug!(screen = ?screen, "nothing to go back to"),
            },
        }
    }

    fn member_view(model: &Model, wrap: fn(MemberSummary) -> ViewState) -> ViewState {
        match &model.session {
            Some(session) => wrap(MemberSummary::from(session)),
            None => Self::signed_out_view(),
        }
    }

    fn signed_out_view() -> ViewState {
        ViewState::Error {
            title: "Not signed in".into(),
            message: "Please sign in again to continue.".into(),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            debug!(event = event_name, screen = ?model.screen, "user action");
        }

        match event {
            Event::Noop => {}

            Event::AppStarted => {
                let screen = Screen::entry(model.session.as_ref());
                Self::navigate(model, screen);
                caps.render.render();
            }

            Event::Configure(config) => {
                match config.validate() {
                    Ok(()) => {
                        info!(
                            code_length = config.code_length,
                            phone_digits = config.phone_digits,
                            delay_ms = config.verification_delay_ms,
                            "config applied"
                        );
                        model.phone = PhoneNumber::normalize_with_length(
                            model.phone.digits(),
                            config.phone_digits,
                        );
                        model.config = config;
                    }
                    Err(e) => Self::reject(model, e),
                }
                caps.render.render();
            }

            Event::RegisterRequested | Event::SignInRequested => {
                if Self::expect_screen(model, Screen::Welcome, event_name) {
                    Self::navigate(model, Screen::Phone);
                    caps.render.render();
                }
            }

            Event::PhoneChanged { text } => {
                if Self::expect_screen(model, Screen::Phone, event_name) {
                    model.phone = PhoneNumber::normalize_with_length(&text, model.config.phone_digits);
                    caps.render.render();
                }
            }

            Event::PhoneSubmitted => {
                if Self::expect_screen(model, Screen::Phone, event_name) {
                    Self::submit_phone(model);
                    caps.render.render();
                }
            }

            Event::OtpInput { index, text } => {
                if Self::expect_screen(model, Screen::Otp, event_name) {
                    Self::otp_input(model, caps, index, &text);
                    caps.render.render();
                }
            }

            Event::OtpBackspace { index } => {
                let on_screen = Self::expect_screen(model, Screen::Otp, event_name);
                if let Some(otp) = model.otp.as_mut().filter(|otp| on_screen && !otp.is_verifying()) {
                    if let Err(e) = otp.input.handle_backspace(index) {
                        Self::reject(model, e);
                    }
                    caps.render.render();
                }
            }

            Event::OtpFocused { index } => {
                let on_screen = Self::expect_screen(model, Screen::Otp, event_name);
                if let Some(otp) = model.otp.as_mut().filter(|_| on_screen) {
                    if let Err(e) = otp.input.focus(index) {
                        Self::reject(model, e);
                    }
                    caps.render.render();
                }
            }

            Event::VerificationTimer(output) => {
                if Self::verification_resolved(model, output) {
                    caps.render.render();
                }
            }

            Event::GedAnswered { has_ged } => {
                if Self::expect_screen(model, Screen::GedCheck, event_name) {
                    match model.session.as_mut() {
                        Some(session) => {
                            session.record_ged_answer(has_ged);
                            model.engagement_choice = session.user().engagement;
                            Self::navigate(model, Screen::StatusSelection);
                        }
                        None => Self::reject(model, SessionError::NotSignedIn),
                    }
                    caps.render.render();
                }
            }

            Event::EngagementSelected { level } => {
                if Self::expect_screen(model, Screen::StatusSelection, event_name) {
                    model.engagement_choice = Some(level);
                    model.clear_error();
                    caps.render.render();
                }
            }

            Event::StatusConfirmed => {
                if Self::expect_screen(model, Screen::StatusSelection, event_name) {
                    Self::confirm_status(model);
                    caps.render.render();
                }
            }

            Event::TerritorySelected { level, unit_id } => {
                if Self::expect_screen(model, Screen::Territory, event_name) {
                    Self::select_territory(model, level, &unit_id);
                    caps.render.render();
                }
            }

            Event::TerritoryConfirmed => {
                if Self::expect_screen(model, Screen::Territory, event_name) {
                    Self::confirm_territory(model);
                    caps.render.render();
                }
            }

            Event::OnboardingFinished => {
                if Self::expect_screen(model, Screen::Complete, event_name) {
                    Self::finish_onboarding(model);
                    caps.render.render();
                }
            }

            Event::NavigateBack => {
                Self::navigate_back(model, caps);
                caps.render.render();
            }

            Event::LogoutRequested => {
                Self::cancel_verification(model, caps);
                if let Some(session) = model.session.take() {
                    session.logout();
                }
                model.reset_flow();
                Self::navigate(model, Screen::Welcome);
                caps.render.render();
            }

            Event::DismissError => {
                model.clear_error();
                caps.render.render();
            }
        }

        Self::release_code_entry(model, caps);
    }

    fn view(&self, model: &Model) -> ViewModel {
        let state = match model.screen {
            Screen::Welcome => ViewState::Welcome,

            Screen::Phone => ViewState::Phone {
                display: model.phone.international(),
                digits: model.phone.digits().to_string(),
                can_continue: model.phone.is_complete(),
            },

            Screen::Otp => match &model.otp {
                Some(otp) => ViewState::Otp {
                    cells: otp.input.cell_strings(),
                    active_index: otp.input.active_index(),
                    verifying: otp.is_verifying(),
                    masked_phone: model.phone.masked(),
                },
                None => ViewState::Error {
                    title: "Code entry unavailable".into(),
                    message: "Please enter your phone number again.".into(),
                },
            },

            Screen::GedCheck => ViewState::GedCheck,

            Screen::StatusSelection => ViewState::StatusSelection {
                options: EngagementOption::all(),
                selected: model.engagement_choice,
                can_continue: model.engagement_choice.is_some(),
            },

            Screen::Territory => match &model.selector {
                Some(selector) => ViewState::Territory(TerritoryView::from(selector)),
                None => ViewState::Error {
                    title: "Territory unavailable".into(),
                    message: "Please go back and try again.".into(),
                },
            },

            Screen::Complete => Self::member_view(model, |member| ViewState::Complete { member }),

            Screen::Home => Self::member_view(model, |member| ViewState::Home { member }),
        };

        ViewModel {
            state,
            error: model.active_error.as_ref().map(UserFacingError::from),
            is_authenticated: model.is_authenticated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Effect;
    use crate::membership::EngagementLevel;
    use crux_core::testing::AppTester;

    fn tester() -> AppTester<App, Effect> {
        AppTester::default()
    }

    #[test]
    fn test_app_started_routes_to_welcome() {
        let app = tester();
        let mut model = Model::default();

        let update = app.update(Event::AppStarted, &mut model);
        assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
        assert_eq!(app.view(&model).state, ViewState::Welcome);
        assert!(!app.view(&model).is_authenticated);
    }

    #[test]
    fn test_incomplete_phone_is_rejected() {
        let app = tester();
        let mut model = Model::default();
        app.update(Event::RegisterRequested, &mut model);
        app.update(
            Event::PhoneChanged {
                text: "598 12".into(),
            },
            &mut model,
        );
        app.update(Event::PhoneSubmitted, &mut model);

        assert_eq!(model.screen, Screen::Phone);
        let error = app.view(&model).error.unwrap();
        assert_eq!(error.error_code, ErrorKind::Validation.code());
    }

    #[test]
    fn test_phone_view_groups_digits() {
        let app = tester();
        let mut model = Model::default();
        app.update(Event::SignInRequested, &mut model);
        app.update(
            Event::PhoneChanged {
                text: "(598) 12-34-56".into(),
            },
            &mut model,
        );

        assert_eq!(
            app.view(&model).state,
            ViewState::Phone {
                display: "+995 598 12 34 56".into(),
                digits: "598123456".into(),
                can_continue: true,
            }
        );
    }

    #[test]
    fn test_status_confirm_requires_choice() {
        let app = tester();
        let mut model = Model {
            screen: Screen::StatusSelection,
            session: Some(Session::login(User::demo(), PhoneNumber::normalize("598123456"))),
            ..Model::default()
        };

        app.update(Event::StatusConfirmed, &mut model);
        assert_eq!(model.screen, Screen::StatusSelection);
        assert!(model.active_error.is_some());

        app.update(
            Event::EngagementSelected {
                level: EngagementLevel::Active,
            },
            &mut model,
        );
        assert!(model.active_error.is_none());
        app.update(Event::StatusConfirmed, &mut model);
        assert_eq!(model.screen, Screen::Territory);
    }

    #[test]
    fn test_events_on_wrong_screen_are_ignored() {
        let app = tester();
        let mut model = Model::default();

        let update = app.update(Event::PhoneSubmitted, &mut model);
        assert!(update.effects.is_empty());
        assert_eq!(model.screen, Screen::Welcome);
    }

    #[test]
    fn test_invalid_config_keeps_previous() {
        let app = tester();
        let mut model = Model::default();
        let mut config = model.config;
        config.code_length = 1;

        app.update(Event::Configure(config), &mut model);
        assert_eq!(model.config.code_length, 6);
        assert!(model.active_error.is_some());

        app.update(Event::DismissError, &mut model);
        assert!(model.active_error.is_none());
    }
}
