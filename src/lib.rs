//! Frame-accurate timeline composition and animation curves for short vertical video reels.
//!
//! A [`CompositionDescriptor`] plus validated [`CompositionInputs`] are resolved by
//! [`composition::build::build`] into an immutable [`Timeline`]. Every frame of that timeline can
//! then be evaluated independently with [`Evaluator::eval_frame`], or streamed in order into a
//! [`FrameSink`] through a [`RenderSession`].
#![forbid(unsafe_code)]

pub mod animation;
pub mod composition;
pub mod foundation;
pub mod render;
pub mod timeline;

pub use animation::ease::Ease;
pub use animation::interp::{Extrapolate, InterpOpts, KeyframeTable, Lerp, interpolate};
pub use animation::profile::{Profile, ProfileSpec, SampleCtx, VisualState};
pub use animation::spring::{Spring, SpringParams};
pub use composition::build::{Element, ElementKind, Timeline};
pub use composition::descriptor::{CompositionDescriptor, Registry};
pub use composition::inputs::CompositionInputs;
pub use foundation::core::{Affine, Canvas, Fps, FrameIndex, FrameRange, Rgba8, Vec2};
pub use foundation::error::{ReelError, ReelResult};
pub use render::eval::{BoundaryWarning, Evaluator, FrameState};
pub use render::session::{RenderRequest, RenderSession, RenderSessionOpts, RenderStats, render};
pub use render::sink::{FrameSink, InMemorySink, JsonlSink, SinkConfig};
pub use timeline::overlay::{OverlaySpec, Placement, place_overlays};
pub use timeline::schedule::{Schedule, ScheduleConfig, Segment, schedule};
