//! Plan geometry, outline normalization, and materialization.

pub mod materialize;
pub mod model;
pub mod outline;

pub use materialize::{apply_generation, apply_outline, materialize};
pub use model::{
    DaySchedule, Plan, PlanSettings, PlatformTrack, SettingsError, Slot, Week, slot_time,
};
pub use outline::{DayTopic, ScheduleOutline, WeekOutline, build_outline};
