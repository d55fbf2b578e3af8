//! Meeting diary survey: question flow, branching and record building.
//!
//! A coordinator answers a fixed opening (name, group, faculty, meeting type,
//! date, attendance), then the questions of the chosen meeting type, then a
//! shared closing. The finished record is appended to the sheet before the
//! bot asks for a meeting photo, which is relayed to the coordinators' chat.

pub mod branch;
pub mod commands;
pub mod engine;
pub mod prompts;
pub mod record;
pub mod session;
pub mod step;

pub use branch::{BRANCHES, MeetingType};
pub use commands::{Command, CommandParser};
pub use engine::{Reply, SurveyEngine};
pub use record::header_labels;
pub use session::{Respondent, Session};
pub use step::{InputKind, Step};
