//! User-facing texts. The bot speaks Russian only.

pub const GREETING_NAME: &str = "Привет! Я твой личный дневник Координатора!\n\nНапиши своё имя:";
pub const ASK_SURNAME: &str = "Супер! А теперь наши свою фамилию:";
pub const ASK_GROUP: &str = "Записал! Напиши группу, у которой проводилась встреча:";
pub const ASK_FACULTY: &str = "Класс! Какой это факультет:";
pub const ASK_MEETING_TYPE: &str = "Давай определимся с видом встречи:";
pub const ASK_DATE: &str = "Напиши дату, когда прошла ваша встреча (в формате 01.09.2025)";
pub const ASK_MEMBER_COUNT: &str =
    "Сколько первокурсников в группе? (отправь сообщение числом)";
pub const ASK_ATTENDEE_COUNT: &str =
    "Сколько пришло первокурсников на встречу? (отправь сообщение числом)";
pub const ASK_ABSENCE_REASONS: &str = "Если кто-то не пришёл на встречу, то по какой причине? \
Возможные варианты: никто не пропустил, болезнь, важные дела, неудобное время или место, \
не видят актуальность встречи для себя, предупредили и не пришли в последний момент, другое";

pub const ASK_HEAD_ELECTED: &str = "Выбрали ли старосту на встрече?";
pub const ASK_ORGANIZATIONS: &str = "Про какие организации, клубы, внеучебные возможности \
ты рассказал(а) своей группе? Что было наиболее интересно первокурсникам?";
pub const ASK_VENUE: &str = "Где проходила встреча? Была ли она в стенах университета?";
pub const ASK_OFF_TOPIC: &str = "Задали ли первокурсники доп. вопросы не по теме встречи?";
pub const ASK_COORDBOX: &str = "Использовали ли вы Коордбокс на встрече? Если да, то в какие \
игры играли? (варианты ответа: Не использовали, «Детектив», «Отчислено», «Тик-Так-Бум», \
«ФинЭлиас», «Координариум», «Шпион»)";
pub const ASK_ACTIVITIES: &str = "Чем вы занимались на встрече с первокурсниками?";
pub const ASK_SECRET_SANTA: &str = "Играли ли вы в Тайного Санту с группой? Если нет, то почему?";
pub const ASK_HIGHLIGHTS: &str = "Какие моменты ты осветил(а) на встрече? \
Что из этого было наиболее полезно первокурсникам?";
pub const ASK_FULLNESS: &str = "Какое было наполнение у твоей встречи с группой?";

pub const ASK_PLUSES: &str =
    "Что тебе понравилось по итогам встречи? Какие плюсы можешь выделить?";
pub const ASK_MINUSES: &str =
    "Что тебе не понравилось во встрече? Что бы ты хотел(а) исправить к следующей встрече";
pub const ASK_OVERALL: &str = "Какие у тебя общие впечатления от встречи?";
pub const ASK_EXTRA_COMMENTS: &str = "Если хочешь что-то ещё сказать, то напиши тут!\n\n\
(отправь сообщение, а если нечего добавить, напиши любой текст)";
pub const ASK_PHOTO: &str = "Спасибо огромное! Я всё успешно записал)\n\n\
Теперь отправь сюда одну фотографию со встречи с первашами. Если фотки нет, то отправь любую";

pub const PHOTO_RELAYED: &str = "Какие красавчики!\n\nДля записи следующей встречи сначала нажми /again!";
pub const SAVE_FAILED: &str = "Не получилось сохранить дневник, попробуй позже.\n\n\
Нажимай /start, чтобы заполнить встречу заново.";

pub const AGAIN: &str = "Прошла новая встреча с первашами?\n\nНажимай /start и мы всё запишем!";
pub const CANCEL: &str = "Начнём заново!\n\nНажимай /again и мы начнём заново!";
pub const HELP: &str = "Я твой личный дневник. Вот что я умею:\n\n\
/start - Нажимай и мы запишем твою встречу с первашами\n\
/cancel - Если что-то пошло не так, то я перезапишу твои данные\n\
/again - Когда заполнишь встречу, используй, чтобы записать новую";
pub const UNKNOWN_COMMAND: &str = "Не знаю такой команды. Посмотри /help";
pub const NO_SESSION: &str = "Чтобы записать встречу с первашами, нажми /start";

pub const HINT_TEXT: &str = "Ответь, пожалуйста, текстом.";
pub const HINT_CHOICE: &str = "Выбери один из вариантов кнопкой.";
pub const HINT_PHOTO: &str = "Жду фотографию со встречи.";

pub fn chat_id(chat_id: &str) -> String {
    format!("Айди этого чата => {chat_id}")
}

pub fn relay_error(error: &str) -> String {
    format!("❌ Ошибка: {error}")
}

/// Caption sent with the relayed meeting photo.
pub fn photo_caption(
    faculty: &str,
    group: &str,
    name: &str,
    surname: &str,
    contact: &str,
    meeting: &str,
    date: &str,
) -> String {
    format!(
        "Координатор факультета {faculty} и группы {group} {name} {surname} ({contact}) \
         заполнил дневник о встрече '{meeting}'\nДата проведения - {date}"
    )
}

/// A mismatch hint followed by the prompt it refers to.
pub fn with_hint(hint: &str, prompt: &str) -> String {
    format!("{hint}\n\n{prompt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_layout() {
        let caption = photo_caption(
            "ФЭБ",
            "ЭБ24-1",
            "Анна",
            "Иванова",
            "@anna",
            "Итоговая встреча",
            "01.09.2025",
        );
        assert_eq!(
            caption,
            "Координатор факультета ФЭБ и группы ЭБ24-1 Анна Иванова (@anna) \
             заполнил дневник о встрече 'Итоговая встреча'\nДата проведения - 01.09.2025"
        );
    }

    #[test]
    fn hint_precedes_prompt() {
        assert_eq!(with_hint(HINT_TEXT, ASK_GROUP), format!("{HINT_TEXT}\n\n{ASK_GROUP}"));
    }

    #[test]
    fn help_lists_commands() {
        for cmd in ["/start", "/cancel", "/again"] {
            assert!(HELP.contains(cmd));
        }
    }
}
