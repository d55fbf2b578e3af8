//! Meeting types and the branch table.
//!
//! Each meeting type owns an ordered sub-path of questions asked between the
//! shared opening and the shared closing (pluses → minuses → overall → extra
//! comments). Routing is one lookup plus [`advance`]; adding a meeting type
//! means adding a row here.

use super::step::Step;

/// First step of the shared closing sequence.
pub const CLOSING_STEP: Step = Step::Pluses;

/// Meeting type options, in keyboard order.
pub const MEETING_TYPE_OPTIONS: &[&str] = &[
    "1 сентября",
    "Информационная встреча",
    "Встреча на сплочение",
    "Новогодняя предсессионная встреча",
    "Информационная онлайн-встреча",
    "Неформальная встреча",
    "Итоговая встреча",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeetingType {
    FirstOfSeptember,
    Informational,
    Bonding,
    NewYear,
    OnlineInformational,
    Informal,
    Final,
}

/// A meeting type and its sub-path.
#[derive(Debug)]
pub struct Branch {
    pub meeting: MeetingType,
    pub steps: &'static [Step],
}

/// The branch table.
pub static BRANCHES: &[Branch] = &[
    Branch {
        meeting: MeetingType::FirstOfSeptember,
        steps: &[Step::HeadElected],
    },
    Branch {
        meeting: MeetingType::Informational,
        steps: &[Step::Organizations, Step::OffTopicInfo],
    },
    Branch {
        meeting: MeetingType::Bonding,
        steps: &[Step::VenueBonding, Step::CoordboxBonding, Step::ActivitiesBonding],
    },
    Branch {
        meeting: MeetingType::NewYear,
        steps: &[Step::OffTopicNewYear, Step::SecretSanta],
    },
    Branch {
        meeting: MeetingType::OnlineInformational,
        steps: &[Step::Highlights, Step::OffTopicOnline],
    },
    Branch {
        meeting: MeetingType::Informal,
        steps: &[Step::VenueInformal, Step::CoordboxInformal, Step::ActivitiesInformal],
    },
    Branch {
        meeting: MeetingType::Final,
        steps: &[Step::Fullness],
    },
];

impl MeetingType {
    pub const ALL: [MeetingType; 7] = [
        MeetingType::FirstOfSeptember,
        MeetingType::Informational,
        MeetingType::Bonding,
        MeetingType::NewYear,
        MeetingType::OnlineInformational,
        MeetingType::Informal,
        MeetingType::Final,
    ];

    /// The default branch for values outside the option set.
    pub const DEFAULT: MeetingType = MeetingType::Final;

    /// Label shown on the button and written to the sheet.
    pub fn label(self) -> &'static str {
        MEETING_TYPE_OPTIONS[self as usize]
    }

    /// Exact label match.
    pub fn from_label(label: &str) -> Option<MeetingType> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }

    /// Like [`from_label`](Self::from_label), falling back to [`Self::DEFAULT`].
    pub fn resolve(label: &str) -> MeetingType {
        Self::from_label(label.trim()).unwrap_or(Self::DEFAULT)
    }

    /// The questions asked for this meeting type before closing.
    pub fn sub_path(self) -> &'static [Step] {
        BRANCHES
            .iter()
            .find(|b| b.meeting == self)
            .map(|b| b.steps)
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a sub-path starts.
pub fn first_step(path: &[Step]) -> Step {
    path.first().copied().unwrap_or(CLOSING_STEP)
}

/// The step after `current` inside `path`, or closing once the path is done.
pub fn advance(path: &[Step], current: Step) -> Step {
    path.iter()
        .position(|&s| s == current)
        .and_then(|i| path.get(i + 1))
        .copied()
        .unwrap_or(CLOSING_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk a sub-path from its start and collect every branch step visited.
    fn walk(path: &[Step]) -> Vec<Step> {
        let mut visited = Vec::new();
        let mut step = first_step(path);
        while step != CLOSING_STEP {
            visited.push(step);
            step = advance(path, step);
        }
        visited
    }

    #[test]
    fn every_meeting_type_has_one_branch() {
        for meeting in MeetingType::ALL {
            let rows = BRANCHES.iter().filter(|b| b.meeting == meeting).count();
            assert_eq!(rows, 1, "{meeting:?} should have exactly one branch row");
        }
    }

    #[test]
    fn labels_round_trip() {
        for meeting in MeetingType::ALL {
            assert_eq!(MeetingType::from_label(meeting.label()), Some(meeting));
        }
        assert_eq!(MeetingType::ALL.len(), MEETING_TYPE_OPTIONS.len());
    }

    #[test]
    fn unknown_value_resolves_to_final_meeting() {
        assert_eq!(MeetingType::resolve("Пикник"), MeetingType::Final);
        assert_eq!(MeetingType::resolve(" Неформальная встреча "), MeetingType::Informal);
    }

    #[test]
    fn sub_path_lengths() {
        let lengths: Vec<usize> = MeetingType::ALL
            .into_iter()
            .map(|m| m.sub_path().len())
            .collect();
        assert_eq!(lengths, vec![1, 2, 3, 2, 2, 3, 1]);
    }

    #[test]
    fn walking_visits_exactly_the_sub_path() {
        for meeting in MeetingType::ALL {
            assert_eq!(walk(meeting.sub_path()), meeting.sub_path().to_vec());
        }
    }

    #[test]
    fn sub_paths_do_not_overlap() {
        let mut seen = std::collections::HashSet::new();
        for branch in BRANCHES {
            for step in branch.steps {
                assert!(seen.insert(*step), "{step} appears in two branches");
            }
        }
    }

    #[test]
    fn empty_sub_path_jumps_to_closing() {
        assert_eq!(first_step(&[]), CLOSING_STEP);
        assert!(walk(&[]).is_empty());
    }

    #[test]
    fn step_outside_path_goes_to_closing() {
        let path = MeetingType::Bonding.sub_path();
        assert_eq!(advance(path, Step::HeadElected), CLOSING_STEP);
    }
}
