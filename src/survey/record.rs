//! Flattening a finished session into a sheet row.

use super::session::Session;

/// Where a column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Submission time, `%Y-%m-%d %H:%M:%S` local time.
    Timestamp,
    UserId,
    /// Telegram handle, or the display name when there is none.
    Username,
    /// The answer stored under this key.
    Answer(&'static str),
}

#[derive(Debug)]
pub struct Column {
    pub label: &'static str,
    pub source: ColumnSource,
}

const fn column(label: &'static str, source: ColumnSource) -> Column {
    Column { label, source }
}

const fn answer(label: &'static str, key: &'static str) -> Column {
    column(label, ColumnSource::Answer(key))
}

const COORDBOX_LABEL: &str = "Использовали ли вы Коордбокс на встрече? Если да, то в какие игры играли? \
(варианты ответа: Не использовали, «Детектив», «Отчислено»,«Тик-Так-Бум», «ФинЭлиас», «Координариум», «Шпион»)";
const COORDBOX_INFORMAL_LABEL: &str = "Использовали ли вы Коордбокс на встрече? Если да, то в какие игры играли? \
(варианты ответа: Не использовали, «Детектив», «Отчислено»,«Тик-Так-Бум», «ФинЭлиас», «Координариум», «Шпион»)_НЕФОР";

/// The sheet layout, in header order.
pub static COLUMNS: [Column; 31] = [
    column("Время заполнения", ColumnSource::Timestamp),
    column("ID", ColumnSource::UserId),
    column("username", ColumnSource::Username),
    answer("Имя", "name"),
    answer("Фамилия", "surname"),
    answer("Группа", "group"),
    answer("Факультет", "faculty"),
    answer("Вид встречи", "meeting_type"),
    answer("Дата проведения встречи", "date"),
    answer("Сколько первокурсников в группе?", "member_count"),
    answer("Сколько пришло?", "attendee_count"),
    answer("Причины отсутствия", "absence_reasons"),
    // 1 сентября
    answer("Выбрали ли старосту на встрече?", "head_elected"),
    // Информационная
    answer(
        "Про какие организации, клубы, внеучебные возможности ты рассказал(а) своей группе? \
         Что было наиболее интересно первокурсникам?",
        "organizations",
    ),
    answer("Задали ли первокурсники доп. вопросы не по теме встречи?_ИНФО", "off_topic_info"),
    // На сплочение
    answer("Где проходила встреча? Была ли она в стенах университета?", "venue_bonding"),
    answer(COORDBOX_LABEL, "coordbox_bonding"),
    answer("Чем вы занимались на встрече с первокурсниками?", "activities_bonding"),
    // Новогодняя предсессионная
    answer("Задали ли первокурсники доп. вопросы не по теме встречи?_НГ", "off_topic_new_year"),
    answer("Играли ли вы в Тайного Санту с группой? Если нет, то почему?", "secret_santa"),
    // Информационная онлайн
    answer(
        "Какие моменты ты осветил(а) на встрече? Что из этого было наиболее полезно первокурсникам?",
        "highlights",
    ),
    answer("Задали ли первокурсники доп. вопросы не по теме встречи?_ОНЛАЙН", "off_topic_online"),
    // Неформальная
    answer("Где проходила встреча? Была ли она в стенах университета?_НЕФОР", "venue_informal"),
    answer(COORDBOX_INFORMAL_LABEL, "coordbox_informal"),
    answer("Чем вы занимались на встрече с первокурсниками?_НЕФОР", "activities_informal"),
    // Итоговая
    answer("Какое было наполнение у твоей встречи с группой?", "fullness"),
    answer("Плюсы встречи", "pluses"),
    answer("Минусы встречи", "minuses"),
    answer("Общие впечатления", "overall"),
    answer("Доп. инфа", "extra_comments"),
    // Filled by hand from the broadcast chat.
    answer("Фото", "photo"),
];

/// Header row for a new sheet.
pub fn header_labels() -> Vec<String> {
    COLUMNS.iter().map(|c| c.label.to_string()).collect()
}

/// Format a submission time the way the sheet stores it.
pub fn format_timestamp(at: chrono::DateTime<chrono::Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn value_for(source: ColumnSource, session: &Session, timestamp: &str) -> String {
    match source {
        ColumnSource::Timestamp => timestamp.to_string(),
        ColumnSource::UserId => session.respondent.user_id.clone(),
        ColumnSource::Username => session.respondent.sheet_name().to_string(),
        ColumnSource::Answer(key) => session.answer_or_blank(key).to_string(),
    }
}

/// Build a row aligned to `header`.
///
/// Cells are placed by label, so a sheet whose header was reordered by hand
/// still gets the right values. Labels this bot does not know stay blank.
pub fn build_row(header: &[String], session: &Session, timestamp: &str) -> Vec<String> {
    header
        .iter()
        .map(|label| {
            COLUMNS
                .iter()
                .find(|c| c.label == label.trim())
                .map(|c| value_for(c.source, session, timestamp))
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::survey::session::Respondent;
    use crate::survey::step::{QUESTIONS, Step};

    fn session() -> Session {
        Session::new(Respondent {
            user_id: "42".into(),
            chat_id: "42".into(),
            username: "anna".into(),
            display_name: None,
        })
    }

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<&str> = COLUMNS.iter().map(|c| c.label).collect();
        assert_eq!(labels.len(), COLUMNS.len());
    }

    #[test]
    fn every_question_has_a_column() {
        for q in &QUESTIONS {
            assert!(
                COLUMNS.iter().any(|c| c.source == ColumnSource::Answer(q.key)),
                "no column for {}",
                q.key
            );
        }
    }

    #[test]
    fn row_matches_header_width() {
        let header = header_labels();
        let row = build_row(&header, &session(), "2025-09-01 12:00:00");
        assert_eq!(row.len(), header.len());
        assert_eq!(row[0], "2025-09-01 12:00:00");
        assert_eq!(row[1], "42");
        assert_eq!(row[2], "anna");
        assert!(row[3..].iter().all(String::is_empty));
    }

    #[test]
    fn username_column_falls_back_to_display_name() {
        let s = Session::new(Respondent {
            user_id: "7".into(),
            chat_id: "7".into(),
            username: String::new(),
            display_name: Some("Anna".into()),
        });
        let row = build_row(&header_labels(), &s, "t");
        assert_eq!(row[2], "Anna");
    }

    #[test]
    fn answers_land_in_their_columns() {
        let mut s = session();
        s.record(Step::Name, "Anna");
        s.record(Step::MeetingType, "Неформальная встреча");
        s.record(Step::VenueInformal, "Кафе");
        s.record(Step::Pluses, "fun");

        let header = header_labels();
        let row = build_row(&header, &s, "t");
        let cell = |label: &str| {
            let i = header.iter().position(|h| h == label).unwrap();
            row[i].as_str()
        };
        assert_eq!(cell("Имя"), "Anna");
        assert_eq!(cell("Вид встречи"), "Неформальная встреча");
        assert_eq!(cell("Где проходила встреча? Была ли она в стенах университета?_НЕФОР"), "Кафе");
        assert_eq!(cell("Где проходила встреча? Была ли она в стенах университета?"), "");
        assert_eq!(cell("Плюсы встречи"), "fun");
        assert_eq!(row.iter().filter(|v| !v.is_empty()).count(), 7);
    }

    #[test]
    fn reordered_header_is_respected() {
        let mut s = session();
        s.record(Step::Name, "Anna");
        let header: Vec<String> = vec!["Имя".into(), "Заметки".into(), "ID".into()];
        let row = build_row(&header, &s, "t");
        assert_eq!(row, vec!["Anna", "", "42"]);
    }

    #[test]
    fn timestamp_format() {
        use chrono::TimeZone;
        let at = chrono::Local.with_ymd_and_hms(2025, 9, 1, 8, 5, 3).unwrap();
        assert_eq!(format_timestamp(at), "2025-09-01 08:05:03");
    }
}
