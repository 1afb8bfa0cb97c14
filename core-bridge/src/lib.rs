//! # Message Bridge
//!
//! Drives an embedded KinesteX web experience through the host's
//! [`WebViewHost`](bridge_traits::WebViewHost).
//!
//! ## Overview
//!
//! - [`validation`]: credential and custom-parameter screening, custom
//!   workout normalization
//! - [`experience`]: factories turning user input into a page URL and payload
//! - [`session`]: the [`BridgeSession`] lifecycle (attach, inbound messages,
//!   outbound scripts, teardown)
//! - [`message`] and [`bus`]: inbound message decoding and fan-out
//! - [`outbound`]: script text for everything posted into the page
//! - [`registry`]: the [`SessionRegistry`] behind global `send_action`
//!
//! ## Usage
//!
//! ```ignore
//! use core_bridge::{BridgeSession, ExperienceFactory, ExperienceOptions, SessionRegistry};
//!
//! let factory = ExperienceFactory::with_default_base(credentials.clone());
//! let experience = factory.workout("Fitness Lite", ExperienceOptions::new())?;
//! let session = BridgeSession::new(experience, credentials, timings, SessionRegistry::global())?;
//!
//! session.attach(web_view).await?;
//! let mut messages = session.subscribe();
//! // host forwards script messages:
//! session.handle_script_message("listener", body)?;
//! ```

pub mod bus;
pub mod error;
pub mod experience;
pub mod message;
pub mod outbound;
pub mod registry;
pub mod session;
pub mod style;
pub mod user;
pub mod validation;

pub use bus::MessageBus;
pub use error::{BridgeSessionError, MessageError, Result, ValidationError};
pub use experience::{Experience, ExperienceFactory, ExperienceOptions};
pub use message::{KinestexMessage, MessagePayload};
pub use outbound::WorkoutActivityAction;
pub use registry::{SessionId, SessionRegistry};
pub use session::{BridgeSession, Delivery, Dispatch, SessionState};
pub use style::ViewStyle;
pub use user::{Gender, Lifestyle, UserDetails};
pub use validation::{normalize_workout_exercises, validate_input, WorkoutSequenceExercise};
