use std::sync::Arc;

use arabic_trainer::content::store::{question_counts, VERBS_CATEGORY};
use arabic_trainer::content::{Category, ContentStore, Entry, Tense};
use arabic_trainer::quiz::session::usable_entries;
use arabic_trainer::quiz::{
    Direction, FlashcardDeck, NegationDrill, NegationParticle, Phase, QuizError, QuizMode,
    QuizSession, SessionConfig, Step,
};
use arabic_trainer::{render, Config};
use dotenv::dotenv;
use log::{info, warn};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ParseMode},
};

type TrainerDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveMode,
    ReceiveQuizCategory,
    ReceiveQuizDirection {
        category: String,
    },
    ReceiveConjugationTense,
    ReceiveQuizAmount {
        category: String,
        mode: QuizMode,
    },
    Quiz {
        session: QuizSession,
    },
    ReceiveFlashcardCategory,
    Flashcards {
        deck: FlashcardDeck,
    },
    Negation {
        drill: NegationDrill,
    },
    ReceiveListCategory,
    VocabularyList {
        category: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();
    info!("Starting arabic trainer bot...");

    let config = Config::from_env()?;
    let store = config.load_content()?;
    info!("Content loaded: {} categories", store.categories().len());

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveMode].endpoint(receive_mode))
            .branch(dptree::case![State::ReceiveQuizCategory].endpoint(receive_quiz_category))
            .branch(
                dptree::case![State::ReceiveQuizDirection { category }]
                    .endpoint(receive_quiz_direction),
            )
            .branch(
                dptree::case![State::ReceiveConjugationTense].endpoint(receive_conjugation_tense),
            )
            .branch(
                dptree::case![State::ReceiveQuizAmount { category, mode }]
                    .endpoint(receive_quiz_amount),
            )
            .branch(dptree::case![State::Quiz { session }].endpoint(quiz))
            .branch(
                dptree::case![State::ReceiveFlashcardCategory]
                    .endpoint(receive_flashcard_category),
            )
            .branch(dptree::case![State::Flashcards { deck }].endpoint(flashcards))
            .branch(dptree::case![State::Negation { drill }].endpoint(negation))
            .branch(dptree::case![State::ReceiveListCategory].endpoint(receive_list_category))
            .branch(
                dptree::case![State::VocabularyList { category }].endpoint(vocabulary_list),
            ),
    )
    .dependencies(dptree::deps![
        InMemStorage::<State>::new(),
        Arc::new(store),
        Arc::new(config)
    ])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

const QUIZ_MODE: &str = "📝 Vokabelquiz";
const CONJUGATION_MODE: &str = "🔤 Konjugation";
const FLASHCARD_MODE: &str = "📚 Lernkarten";
const NEGATION_MODE: &str = "🚫 Verneinung";
const LIST_MODE: &str = "📋 Liste";

const MENU: &str = "🏠 Menü";
const AGAIN: &str = "🔁 Nochmal";
const FLIP: &str = "🔄 Umdrehen";
const PREV: &str = "⬅️ Zurück";
const NEXT: &str = "➡️ Weiter";
const LEARNED: &str = "✅ Gelernt";
const SHUFFLE: &str = "🔀 Neu mischen";
const SWITCH_DIRECTION: &str = "↔️ Richtung wechseln";
const OVERVIEW: &str = "📋 Übersicht";

fn keyboard(rows: Vec<Vec<String>>) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.into_iter()
            .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

fn menu_keyboard() -> KeyboardMarkup {
    keyboard(vec![
        vec![QUIZ_MODE.to_string(), CONJUGATION_MODE.to_string()],
        vec![FLASHCARD_MODE.to_string(), NEGATION_MODE.to_string()],
        vec![LIST_MODE.to_string()],
    ])
}

fn category_keyboard(categories: &[Category]) -> KeyboardMarkup {
    keyboard(
        categories
            .chunks(2)
            .map(|chunk| chunk.iter().map(|c| c.name.clone()).collect())
            .collect(),
    )
}

/// Whether a quiz over `pool` in `mode` can be started.
fn startable(pool: &[Entry], category: &str, mode: QuizMode) -> bool {
    QuizSession::new(SessionConfig {
        category: category.to_string(),
        count: 0,
        mode,
    })
    .can_start(pool)
}

fn tense_label(tense: Tense) -> String {
    format!("{} ({})", tense.german(), tense.arabic())
}

fn flashcard_keyboard() -> KeyboardMarkup {
    keyboard(vec![
        vec![FLIP.to_string()],
        vec![PREV.to_string(), NEXT.to_string()],
        vec![LEARNED.to_string(), SHUFFLE.to_string()],
        vec![SWITCH_DIRECTION.to_string(), MENU.to_string()],
    ])
}

fn negation_keyboard() -> KeyboardMarkup {
    keyboard(vec![
        NegationParticle::ALL
            .iter()
            .map(|p| p.arabic().to_string())
            .collect(),
        vec![PREV.to_string(), NEXT.to_string()],
        vec![LEARNED.to_string(), OVERVIEW.to_string()],
        vec![SHUFFLE.to_string(), MENU.to_string()],
    ])
}

async fn show_menu(bot: &Bot, dialogue: &TrainerDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Was möchtest du üben?")
        .reply_markup(menu_keyboard())
        .await?;
    dialogue.update(State::ReceiveMode).await?;
    Ok(())
}

async fn send_question(bot: &Bot, chat_id: ChatId, session: &QuizSession) -> HandlerResult {
    let (Some(question), Some((index, total))) = (session.current_question(), session.progress())
    else {
        return Ok(());
    };
    let options = question
        .options
        .iter()
        .map(|o| vec![o.clone()])
        .chain(std::iter::once(vec![MENU.to_string()]))
        .collect();

    bot.send_message(
        chat_id,
        render::question_text(question, session.config().mode, index, total),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboard(options))
    .await?;
    Ok(())
}

const GREETING_TEXT: &str = "مرحبا! Hallo! Ich helfe dir, arabische Vokabeln und Verben zu lernen.";
async fn start(bot: Bot, dialogue: TrainerDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    show_menu(&bot, &dialogue, msg.chat.id).await
}

async fn receive_mode(
    bot: Bot,
    dialogue: TrainerDialogue,
    msg: Message,
    store: Arc<ContentStore>,
    config: Arc<Config>,
) -> HandlerResult {
    match msg.text() {
        Some(QUIZ_MODE) => {
            bot.send_message(msg.chat.id, "Wähle eine Kategorie")
                .reply_markup(category_keyboard(&store.categories()))
                .await?;
            dialogue.update(State::ReceiveQuizCategory).await?;
        }
        Some(CONJUGATION_MODE) => {
            let tenses = [Tense::Past, Tense::Present]
                .into_iter()
                .map(|t| vec![tense_label(t)])
                .collect();
            bot.send_message(msg.chat.id, render::pronoun_table(store.pronouns()))
                .parse_mode(ParseMode::Html)
                .await?;
            bot.send_message(msg.chat.id, "Welche Zeitform möchtest du konjugieren?")
                .reply_markup(keyboard(tenses))
                .await?;
            dialogue.update(State::ReceiveConjugationTense).await?;
        }
        Some(FLASHCARD_MODE) => {
            bot.send_message(msg.chat.id, "Welche Karten möchtest du lernen?")
                .reply_markup(category_keyboard(&store.categories()))
                .await?;
            dialogue.update(State::ReceiveFlashcardCategory).await?;
        }
        Some(LIST_MODE) => {
            bot.send_message(msg.chat.id, "Welche Wortliste möchtest du sehen?")
                .reply_markup(category_keyboard(&store.categories()))
                .await?;
            dialogue.update(State::ReceiveListCategory).await?;
        }
        Some(NEGATION_MODE) => {
            let drill = {
                let mut rng = rand::thread_rng();
                NegationDrill::new(store.verbs(), config.negation_count, &mut rng)
            };
            let drill = match drill {
                Ok(drill) => drill,
                Err(e) => {
                    warn!("Negation drill unavailable: {}", e);
                    bot.send_message(msg.chat.id, "Keine Verben für die Übung vorhanden")
                        .await?;
                    return Ok(());
                }
            };
            bot.send_message(msg.chat.id, render::negation_text(&drill))
                .parse_mode(ParseMode::Html)
                .reply_markup(negation_keyboard())
                .await?;
            dialogue.update(State::Negation { drill }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Bitte wähle eine der Optionen")
                .reply_markup(menu_keyboard())
                .await?;
        }
    }
    Ok(())
}

async fn receive_quiz_category(
    bot: Bot,
    dialogue: TrainerDialogue,
    msg: Message,
    store: Arc<ContentStore>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(category) = msg.text().and_then(|name| store.category_by_name(name)) else {
        bot.send_message(msg.chat.id, "Bitte wähle eine der Kategorien")
            .reply_markup(category_keyboard(&store.categories()))
            .await?;
        return Ok(());
    };

    let pool = store.entries(&category.key)?;
    let directions = [Direction::ArabicToGerman, Direction::GermanToArabic];
    if !directions
        .into_iter()
        .any(|d| startable(&pool, &category.key, QuizMode::Vocabulary(d)))
    {
        bot.send_message(
            msg.chat.id,
            format!(
                "In „{}“ gibt es zu wenige verschiedene Einträge für ein Quiz",
                category.name
            ),
        )
        .await?;
        return Ok(());
    }

    let preferred = config.default_direction;
    let other = match preferred {
        Direction::ArabicToGerman => Direction::GermanToArabic,
        Direction::GermanToArabic => Direction::ArabicToGerman,
    };
    bot.send_message(msg.chat.id, "In welche Richtung?")
        .reply_markup(keyboard(vec![
            vec![preferred.label().to_string()],
            vec![other.label().to_string()],
        ]))
        .await?;
    dialogue
        .update(State::ReceiveQuizDirection {
            category: category.key,
        })
        .await?;
    Ok(())
}

async fn ask_amount(
    bot: &Bot,
    dialogue: &TrainerDialogue,
    chat_id: ChatId,
    available: usize,
    category: String,
    mode: QuizMode,
) -> HandlerResult {
    let mut counts = question_counts(available);
    if counts.is_empty() {
        counts.push(available);
    }
    let rows = counts.iter().map(|n| vec![n.to_string()]).collect();
    bot.send_message(chat_id, "Wähle die Anzahl der Fragen")
        .reply_markup(keyboard(rows))
        .await?;
    dialogue
        .update(State::ReceiveQuizAmount { category, mode })
        .await?;
    Ok(())
}

async fn receive_quiz_direction(
    bot: Bot,
    dialogue: TrainerDialogue,
    category: String,
    msg: Message,
    store: Arc<ContentStore>,
) -> HandlerResult {
    let Some(direction) = msg.text().and_then(|text| text.parse::<Direction>().ok()) else {
        bot.send_message(msg.chat.id, "Bitte wähle eine Richtung").await?;
        return Ok(());
    };

    let mode = QuizMode::Vocabulary(direction);
    let pool = store.entries(&category)?;
    if !startable(&pool, &category, mode) {
        bot.send_message(
            msg.chat.id,
            "In dieser Richtung gibt es zu wenige verschiedene Antworten, wähle die andere",
        )
        .await?;
        return Ok(());
    }
    ask_amount(&bot, &dialogue, msg.chat.id, pool.len(), category, mode).await
}

async fn receive_conjugation_tense(
    bot: Bot,
    dialogue: TrainerDialogue,
    msg: Message,
    store: Arc<ContentStore>,
) -> HandlerResult {
    let tense = [Tense::Past, Tense::Present]
        .into_iter()
        .find(|t| msg.text() == Some(tense_label(*t).as_str()));
    let Some(tense) = tense else {
        bot.send_message(msg.chat.id, "Bitte wähle eine Zeitform").await?;
        return Ok(());
    };

    let mode = QuizMode::Conjugation(tense);
    let pool = store.conjugable_verbs();
    if !startable(&pool, VERBS_CATEGORY, mode) {
        bot.send_message(msg.chat.id, "Es gibt nicht genug konjugierbare Verben")
            .await?;
        return show_menu(&bot, &dialogue, msg.chat.id).await;
    }
    let available = usable_entries(&pool, mode).len();
    ask_amount(
        &bot,
        &dialogue,
        msg.chat.id,
        available,
        VERBS_CATEGORY.to_string(),
        mode,
    )
    .await
}

async fn receive_quiz_amount(
    bot: Bot,
    dialogue: TrainerDialogue,
    (category, mode): (String, QuizMode),
    msg: Message,
    store: Arc<ContentStore>,
) -> HandlerResult {
    let Some(count) = msg.text().and_then(|text| text.trim().parse::<usize>().ok()) else {
        bot.send_message(msg.chat.id, "Bitte gib eine Zahl ein").await?;
        return Ok(());
    };
    if count == 0 {
        bot.send_message(msg.chat.id, "Die Anzahl der Fragen darf nicht 0 sein")
            .await?;
        return Ok(());
    }

    let pool = store.entries(&category)?;
    let mut session = QuizSession::new(SessionConfig {
        category,
        count,
        mode,
    });
    if !session.can_start(&pool) {
        bot.send_message(msg.chat.id, "Für diese Auswahl gibt es zu wenige Einträge")
            .await?;
        return show_menu(&bot, &dialogue, msg.chat.id).await;
    }
    let started = {
        let mut rng = rand::thread_rng();
        session.start(&pool, &mut rng)
    };
    if let Err(e) = started {
        warn!("Quiz could not be started: {}", e);
        bot.send_message(msg.chat.id, "Das Quiz konnte nicht gestartet werden")
            .await?;
        return show_menu(&bot, &dialogue, msg.chat.id).await;
    }

    send_question(&bot, msg.chat.id, &session).await?;
    dialogue.update(State::Quiz { session }).await?;
    Ok(())
}

async fn quiz(
    bot: Bot,
    dialogue: TrainerDialogue,
    mut session: QuizSession,
    msg: Message,
    store: Arc<ContentStore>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Bitte wähle eine der Antworten").await?;
        return Ok(());
    };
    if text == MENU {
        return show_menu(&bot, &dialogue, msg.chat.id).await;
    }

    if session.phase() == Phase::Result {
        if text != AGAIN {
            bot.send_message(msg.chat.id, "Bitte wähle eine der Optionen").await?;
            return Ok(());
        }
        session.reset();
        let pool = store.entries(&session.config().category)?;
        {
            let mut rng = rand::thread_rng();
            session.start(&pool, &mut rng)?;
        }
        send_question(&bot, msg.chat.id, &session).await?;
        dialogue.update(State::Quiz { session }).await?;
        return Ok(());
    }

    let feedback = match session.answer(text) {
        Ok(feedback) => feedback,
        Err(QuizError::UnknownOption(option)) => {
            warn!("Ignoring unknown option '{}'", option);
            bot.send_message(msg.chat.id, "Bitte wähle eine der Antworten").await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    bot.send_message(msg.chat.id, render::feedback_text(&feedback))
        .parse_mode(ParseMode::Html)
        .await?;

    match session.advance()? {
        Step::Next { .. } => {
            send_question(&bot, msg.chat.id, &session).await?;
        }
        Step::Finished(result) => {
            bot.send_message(msg.chat.id, render::result_text(&result))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard(vec![vec![AGAIN.to_string(), MENU.to_string()]]))
                .await?;
        }
    }
    dialogue.update(State::Quiz { session }).await?;
    Ok(())
}

async fn receive_flashcard_category(
    bot: Bot,
    dialogue: TrainerDialogue,
    msg: Message,
    store: Arc<ContentStore>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(category) = msg.text().and_then(|name| store.category_by_name(name)) else {
        bot.send_message(msg.chat.id, "Bitte wähle eine der Kategorien")
            .reply_markup(category_keyboard(&store.categories()))
            .await?;
        return Ok(());
    };

    let entries = store.entries(&category.key)?;
    let deck = {
        let mut rng = rand::thread_rng();
        FlashcardDeck::new(&entries, config.default_direction, &mut rng)
    };
    let deck = match deck {
        Ok(deck) => deck,
        Err(QuizError::EmptyDeck) => {
            bot.send_message(msg.chat.id, "Diese Kategorie ist leer").await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    bot.send_message(msg.chat.id, render::flashcard_text(&deck))
        .parse_mode(ParseMode::Html)
        .reply_markup(flashcard_keyboard())
        .await?;
    dialogue.update(State::Flashcards { deck }).await?;
    Ok(())
}

async fn flashcards(
    bot: Bot,
    dialogue: TrainerDialogue,
    mut deck: FlashcardDeck,
    msg: Message,
) -> HandlerResult {
    match msg.text() {
        Some(MENU) => return show_menu(&bot, &dialogue, msg.chat.id).await,
        Some(FLIP) => deck.flip(),
        Some(PREV) => deck.prev(),
        Some(NEXT) => deck.next(),
        Some(LEARNED) => {
            deck.mark_learned();
        }
        Some(SHUFFLE) => {
            let mut rng = rand::thread_rng();
            deck.reset(&mut rng);
        }
        Some(SWITCH_DIRECTION) => {
            let direction = match deck.direction() {
                Direction::ArabicToGerman => Direction::GermanToArabic,
                Direction::GermanToArabic => Direction::ArabicToGerman,
            };
            deck.set_direction(direction);
        }
        _ => {
            bot.send_message(msg.chat.id, "Bitte nutze die Tasten unten")
                .reply_markup(flashcard_keyboard())
                .await?;
            return Ok(());
        }
    }

    bot.send_message(msg.chat.id, render::flashcard_text(&deck))
        .parse_mode(ParseMode::Html)
        .reply_markup(flashcard_keyboard())
        .await?;
    dialogue.update(State::Flashcards { deck }).await?;
    Ok(())
}

async fn negation(
    bot: Bot,
    dialogue: TrainerDialogue,
    mut drill: NegationDrill,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Bitte nutze die Tasten unten").await?;
        return Ok(());
    };

    match text {
        MENU => return show_menu(&bot, &dialogue, msg.chat.id).await,
        PREV => drill.prev(),
        NEXT => drill.next(),
        LEARNED => {
            if let Err(QuizError::NoSelection) = drill.mark_learned() {
                bot.send_message(msg.chat.id, "Wähle zuerst eine Verneinung").await?;
                return Ok(());
            }
        }
        SHUFFLE => {
            let mut rng = rand::thread_rng();
            drill.reset(&mut rng);
        }
        OVERVIEW => {
            bot.send_message(msg.chat.id, render::negation_overview(&drill))
                .parse_mode(ParseMode::Html)
                .reply_markup(negation_keyboard())
                .await?;
            return Ok(());
        }
        other => {
            if let Some(particle) = NegationParticle::from_arabic(other) {
                drill.answer(particle);
            } else if let Ok(count) = other.trim().parse::<usize>() {
                let (min, max) = drill.count_bounds();
                if count < min || count > max {
                    bot.send_message(
                        msg.chat.id,
                        format!("Die Anzahl muss zwischen {} und {} liegen", min, max),
                    )
                    .await?;
                    return Ok(());
                }
                let mut rng = rand::thread_rng();
                drill.set_count(count, &mut rng);
            } else {
                bot.send_message(msg.chat.id, "Bitte wähle لا, لن oder لم")
                    .reply_markup(negation_keyboard())
                    .await?;
                return Ok(());
            }
        }
    }

    bot.send_message(msg.chat.id, render::negation_text(&drill))
        .parse_mode(ParseMode::Html)
        .reply_markup(negation_keyboard())
        .await?;
    dialogue.update(State::Negation { drill }).await?;
    Ok(())
}

async fn receive_list_category(
    bot: Bot,
    dialogue: TrainerDialogue,
    msg: Message,
    store: Arc<ContentStore>,
) -> HandlerResult {
    let Some(category) = msg.text().and_then(|name| store.category_by_name(name)) else {
        bot.send_message(msg.chat.id, "Bitte wähle eine der Kategorien")
            .reply_markup(category_keyboard(&store.categories()))
            .await?;
        return Ok(());
    };

    let entries = store.search(&category.key, "")?;
    bot.send_message(
        msg.chat.id,
        render::vocabulary_list_text(&category.name, "", &entries),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboard(vec![vec![MENU.to_string()]]))
    .await?;
    bot.send_message(msg.chat.id, "Schick mir ein Suchwort (Arabisch oder Deutsch)")
        .await?;
    dialogue
        .update(State::VocabularyList {
            category: category.key,
        })
        .await?;
    Ok(())
}

async fn vocabulary_list(
    bot: Bot,
    dialogue: TrainerDialogue,
    category: String,
    msg: Message,
    store: Arc<ContentStore>,
) -> HandlerResult {
    let Some(term) = msg.text() else {
        bot.send_message(msg.chat.id, "Bitte schick ein Suchwort als Text").await?;
        return Ok(());
    };
    if term == MENU {
        return show_menu(&bot, &dialogue, msg.chat.id).await;
    }

    let name = store
        .category_by_name(&category)
        .map(|c| c.name)
        .unwrap_or_else(|| category.clone());
    let entries = store.search(&category, term)?;
    bot.send_message(
        msg.chat.id,
        render::vocabulary_list_text(&name, term, &entries),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboard(vec![vec![MENU.to_string()]]))
    .await?;
    Ok(())
}
