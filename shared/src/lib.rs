#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod code_input;
pub mod config;
pub mod error;
pub mod event;
pub mod membership;
pub mod model;
pub mod phone;
pub mod selector;
pub mod session;
pub mod territory;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use code_input::{CodeInputConfig, CodeInputError, CodeInputEvent, SegmentedCodeInput};
pub use config::{ConfigError, CoreConfig};
pub use crux_core::App as CruxApp;
pub use error::{AppError, AppResult, ErrorKind, ErrorSeverity, UserFacingError};
pub use event::Event;
pub use model::{Model, Screen};
pub use selector::{HierarchicalSelector, HierarchyNode, SelectOutcome, SelectorError};
pub use view::{ViewModel, ViewState};
