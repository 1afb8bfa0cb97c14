//! # Content Module
//!
//! Typed access to the KinesteX content API: workouts, plans and exercises.
//!
//! ## Overview
//!
//! This module provides:
//! - The content domain model ([`models`]) with raw-payload capture
//! - Lenient per-field decoding driven by declarative defaults ([`schema`])
//! - Rest attribution for workout sequences ([`sequence`])
//! - Query validation and request construction ([`query`])
//! - The [`ContentClient`] that runs requests through the host `HttpClient`
//!   and classifies responses into [`ContentResult`]
//!
//! ## Usage
//!
//! ```ignore
//! use core_content::{ContentClient, ListFilter, BodyPart};
//!
//! let client = ContentClient::new(&config);
//! let page = client
//!     .fetch_workouts(ListFilter::new().category("Fitness").body_parts([BodyPart::Abs]))
//!     .await?;
//! for workout in &page.workouts {
//!     println!("{} ({} exercises)", workout.title, workout.sequence.len());
//! }
//! ```

pub mod charset;
pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod schema;
pub mod sequence;

pub use charset::CharacterPolicy;
pub use client::{ContentClient, ContentResult};
pub use error::{ContentError, Result};
pub use models::{
    AdminContentType, BodyPart, ContentType, ExerciseEntity, ExercisesResponse, PlanCategory,
    PlanDay, PlanEntity, PlanLevel, PlansResponse, WorkoutEntity, WorkoutSummary,
    WorkoutsResponse,
};
pub use query::{ContentQuery, ListFilter};
