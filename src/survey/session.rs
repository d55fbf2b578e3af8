//! One user's pass through the survey.

use indexmap::IndexMap;

use super::branch::MeetingType;
use super::step::Step;

/// Who is filling in the diary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Respondent {
    pub user_id: String,
    pub chat_id: String,
    /// Transport handle without `@`; empty when the user has none.
    pub username: String,
    pub display_name: Option<String>,
}

impl Respondent {
    /// Value of the sheet's username column: the handle, else the display name.
    pub fn sheet_name(&self) -> &str {
        if self.username.is_empty() {
            self.display_name.as_deref().unwrap_or_default()
        } else {
            &self.username
        }
    }

    /// How the photo caption refers to the user: `@handle`, else the display name.
    pub fn contact(&self) -> String {
        if self.username.is_empty() {
            self.display_name.clone().unwrap_or_default()
        } else {
            format!("@{}", self.username)
        }
    }
}

/// An in-progress survey.
///
/// `answers` holds only keys of steps already passed, in the order they
/// were asked. `meeting_type` is set once and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    pub respondent: Respondent,
    pub step: Step,
    answers: IndexMap<&'static str, String>,
    meeting_type: Option<MeetingType>,
}

impl Session {
    pub fn new(respondent: Respondent) -> Self {
        Self {
            respondent,
            step: Step::Name,
            answers: IndexMap::new(),
            meeting_type: None,
        }
    }

    /// Record the answer to `step`.
    ///
    /// A second meeting-type answer is ignored.
    pub fn record(&mut self, step: Step, value: impl Into<String>) {
        let value = value.into();
        if step == Step::MeetingType {
            if self.meeting_type.is_some() {
                return;
            }
            self.meeting_type = Some(MeetingType::resolve(&value));
        }
        self.answers.insert(step.key(), value);
    }

    pub fn answer(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    /// Answer or empty string.
    pub fn answer_or_blank(&self, key: &str) -> &str {
        self.answer(key).unwrap_or_default()
    }

    pub fn answers(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.answers.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// The chosen meeting type, once the meeting-type question is answered.
    pub fn meeting_type(&self) -> Option<MeetingType> {
        self.meeting_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondent() -> Respondent {
        Respondent {
            user_id: "42".into(),
            chat_id: "42".into(),
            username: "anna".into(),
            display_name: Some("Anna".into()),
        }
    }

    #[test]
    fn handle_is_preferred_over_display_name() {
        let r = respondent();
        assert_eq!(r.sheet_name(), "anna");
        assert_eq!(r.contact(), "@anna");
    }

    #[test]
    fn display_name_stands_in_for_missing_handle() {
        let r = Respondent {
            username: String::new(),
            ..respondent()
        };
        assert_eq!(r.sheet_name(), "Anna");
        assert_eq!(r.contact(), "Anna");

        let anonymous = Respondent {
            display_name: None,
            ..r
        };
        assert_eq!(anonymous.sheet_name(), "");
        assert_eq!(anonymous.contact(), "");
    }

    #[test]
    fn new_session_starts_at_name() {
        let s = Session::new(respondent());
        assert_eq!(s.step, Step::Name);
        assert_eq!(s.answer_count(), 0);
        assert!(s.meeting_type().is_none());
    }

    #[test]
    fn answers_keep_insertion_order() {
        let mut s = Session::new(respondent());
        s.record(Step::Name, "Anna");
        s.record(Step::Surname, "Ivanova");
        s.record(Step::Group, "ЭБ24-1");
        let keys: Vec<&str> = s.answers().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "surname", "group"]);
        assert_eq!(s.answer("surname"), Some("Ivanova"));
        assert_eq!(s.answer_or_blank("pluses"), "");
    }

    #[test]
    fn meeting_type_is_set_once() {
        let mut s = Session::new(respondent());
        s.record(Step::MeetingType, "Неформальная встреча");
        assert_eq!(s.meeting_type(), Some(MeetingType::Informal));

        s.record(Step::MeetingType, "1 сентября");
        assert_eq!(s.meeting_type(), Some(MeetingType::Informal));
        assert_eq!(s.answer("meeting_type"), Some("Неформальная встреча"));
    }
}
