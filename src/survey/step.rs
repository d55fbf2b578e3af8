//! Survey states and the static question table.
//!
//! Every [`Step`] except the initial one is "waiting for the answer to one
//! question". The table below gives each step its answer key, expected input
//! kind, prompt, options and successor rule. Branch-specific successors are
//! resolved against the branch table in [`super::branch`].

use super::branch::MEETING_TYPE_OPTIONS;
use super::prompts;

/// Faculty options, in keyboard order.
pub const FACULTIES: &[&str] = &[
    "СНиМК", "ФЭБ", "МЭО", "ФинФак", "ЮрФак", "НАБ", "ИТиАБД", "ВШУ",
];

/// The states of one survey session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Name,
    Surname,
    Group,
    Faculty,
    MeetingType,
    Date,
    MemberCount,
    AttendeeCount,
    AbsenceReasons,
    // 1 сентября
    HeadElected,
    // Информационная встреча
    Organizations,
    OffTopicInfo,
    // Встреча на сплочение
    VenueBonding,
    CoordboxBonding,
    ActivitiesBonding,
    // Новогодняя предсессионная встреча
    OffTopicNewYear,
    SecretSanta,
    // Информационная онлайн-встреча
    Highlights,
    OffTopicOnline,
    // Неформальная встреча
    VenueInformal,
    CoordboxInformal,
    ActivitiesInformal,
    // Итоговая встреча
    Fullness,
    // Closing
    Pluses,
    Minuses,
    Overall,
    ExtraComments,
    AwaitPhoto,
}

/// What kind of input a step accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Choice,
    Photo,
}

/// How the successor of a step is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Fixed successor.
    Next(Step),
    /// First step of the meeting type's sub-path (closing if empty).
    Branch,
    /// Next step inside the current sub-path, or closing at its end.
    WithinBranch,
    /// Persist the record, then await the photo.
    Persist,
    /// Relay the photo and stay here; the session ends by command.
    Relay,
}

/// One row of the question table.
#[derive(Debug)]
pub struct Question {
    pub step: Step,
    /// Answer key, also used as the session map key.
    pub key: &'static str,
    pub kind: InputKind,
    pub prompt: &'static str,
    /// Options offered for choice steps.
    pub options: &'static [&'static str],
    pub transition: Transition,
}

impl Question {
    /// Whether `value` is one of this question's options.
    pub fn accepts_option(&self, value: &str) -> bool {
        self.options.contains(&value)
    }
}

const fn text(
    step: Step,
    key: &'static str,
    prompt: &'static str,
    transition: Transition,
) -> Question {
    Question {
        step,
        key,
        kind: InputKind::Text,
        prompt,
        options: &[],
        transition,
    }
}

/// The question table, indexed by `Step as usize`.
pub static QUESTIONS: [Question; 28] = [
    text(Step::Name, "name", prompts::GREETING_NAME, Transition::Next(Step::Surname)),
    text(Step::Surname, "surname", prompts::ASK_SURNAME, Transition::Next(Step::Group)),
    text(Step::Group, "group", prompts::ASK_GROUP, Transition::Next(Step::Faculty)),
    Question {
        step: Step::Faculty,
        key: "faculty",
        kind: InputKind::Choice,
        prompt: prompts::ASK_FACULTY,
        options: FACULTIES,
        transition: Transition::Next(Step::MeetingType),
    },
    Question {
        step: Step::MeetingType,
        key: "meeting_type",
        kind: InputKind::Choice,
        prompt: prompts::ASK_MEETING_TYPE,
        options: MEETING_TYPE_OPTIONS,
        transition: Transition::Next(Step::Date),
    },
    text(Step::Date, "date", prompts::ASK_DATE, Transition::Next(Step::MemberCount)),
    text(
        Step::MemberCount,
        "member_count",
        prompts::ASK_MEMBER_COUNT,
        Transition::Next(Step::AttendeeCount),
    ),
    text(
        Step::AttendeeCount,
        "attendee_count",
        prompts::ASK_ATTENDEE_COUNT,
        Transition::Next(Step::AbsenceReasons),
    ),
    text(Step::AbsenceReasons, "absence_reasons", prompts::ASK_ABSENCE_REASONS, Transition::Branch),
    text(Step::HeadElected, "head_elected", prompts::ASK_HEAD_ELECTED, Transition::WithinBranch),
    text(
        Step::Organizations,
        "organizations",
        prompts::ASK_ORGANIZATIONS,
        Transition::WithinBranch,
    ),
    text(Step::OffTopicInfo, "off_topic_info", prompts::ASK_OFF_TOPIC, Transition::WithinBranch),
    text(Step::VenueBonding, "venue_bonding", prompts::ASK_VENUE, Transition::WithinBranch),
    text(
        Step::CoordboxBonding,
        "coordbox_bonding",
        prompts::ASK_COORDBOX,
        Transition::WithinBranch,
    ),
    text(
        Step::ActivitiesBonding,
        "activities_bonding",
        prompts::ASK_ACTIVITIES,
        Transition::WithinBranch,
    ),
    text(
        Step::OffTopicNewYear,
        "off_topic_new_year",
        prompts::ASK_OFF_TOPIC,
        Transition::WithinBranch,
    ),
    text(Step::SecretSanta, "secret_santa", prompts::ASK_SECRET_SANTA, Transition::WithinBranch),
    text(Step::Highlights, "highlights", prompts::ASK_HIGHLIGHTS, Transition::WithinBranch),
    text(
        Step::OffTopicOnline,
        "off_topic_online",
        prompts::ASK_OFF_TOPIC,
        Transition::WithinBranch,
    ),
    text(Step::VenueInformal, "venue_informal", prompts::ASK_VENUE, Transition::WithinBranch),
    text(
        Step::CoordboxInformal,
        "coordbox_informal",
        prompts::ASK_COORDBOX,
        Transition::WithinBranch,
    ),
    text(
        Step::ActivitiesInformal,
        "activities_informal",
        prompts::ASK_ACTIVITIES,
        Transition::WithinBranch,
    ),
    text(Step::Fullness, "fullness", prompts::ASK_FULLNESS, Transition::WithinBranch),
    text(Step::Pluses, "pluses", prompts::ASK_PLUSES, Transition::Next(Step::Minuses)),
    text(Step::Minuses, "minuses", prompts::ASK_MINUSES, Transition::Next(Step::Overall)),
    text(Step::Overall, "overall", prompts::ASK_OVERALL, Transition::Next(Step::ExtraComments)),
    text(Step::ExtraComments, "extra_comments", prompts::ASK_EXTRA_COMMENTS, Transition::Persist),
    Question {
        step: Step::AwaitPhoto,
        key: "photo",
        kind: InputKind::Photo,
        prompt: prompts::ASK_PHOTO,
        options: &[],
        transition: Transition::Relay,
    },
];

impl Step {
    /// All steps in table order.
    pub const ALL: [Step; 28] = [
        Step::Name,
        Step::Surname,
        Step::Group,
        Step::Faculty,
        Step::MeetingType,
        Step::Date,
        Step::MemberCount,
        Step::AttendeeCount,
        Step::AbsenceReasons,
        Step::HeadElected,
        Step::Organizations,
        Step::OffTopicInfo,
        Step::VenueBonding,
        Step::CoordboxBonding,
        Step::ActivitiesBonding,
        Step::OffTopicNewYear,
        Step::SecretSanta,
        Step::Highlights,
        Step::OffTopicOnline,
        Step::VenueInformal,
        Step::CoordboxInformal,
        Step::ActivitiesInformal,
        Step::Fullness,
        Step::Pluses,
        Step::Minuses,
        Step::Overall,
        Step::ExtraComments,
        Step::AwaitPhoto,
    ];

    /// The question asked in this step.
    pub fn question(self) -> &'static Question {
        &QUESTIONS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.question().key
    }

    pub fn kind(self) -> InputKind {
        self.question().kind
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
