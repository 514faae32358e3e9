//! Telegram HTML texts for questions, feedback, results and cards.

use teloxide::utils::html::{bold, escape, italic};

use crate::content::{Entry, Pronoun, PronounSlot, Tense};
use crate::quiz::flashcards::{FlashcardDeck, LearnProgress};
use crate::quiz::negation::NegationDrill;
use crate::quiz::{Direction, Feedback, Question, QuizMode, QuizResult};

const DEFAULT_EMOJI: &str = "📝";
// Keeps a word list inside one Telegram message.
const LIST_LIMIT: usize = 40;

pub fn progress_line(index: usize, total: usize) -> String {
    format!("Frage {} von {}", index + 1, total)
}

pub fn learn_progress_line(progress: &LearnProgress) -> String {
    format!(
        "📊 Fortschritt: {} / {} gelernt ({}%)",
        progress.learned, progress.total, progress.percentage
    )
}

fn instruction(mode: QuizMode) -> String {
    match mode {
        QuizMode::Vocabulary(Direction::ArabicToGerman) => "Was bedeutet das auf Deutsch?".to_string(),
        QuizMode::Vocabulary(Direction::GermanToArabic) => "Wie heißt das auf Arabisch?".to_string(),
        QuizMode::Conjugation(tense) => format!("Welche Form ist richtig ({})?", tense.german()),
    }
}

pub fn question_text(question: &Question, mode: QuizMode, index: usize, total: usize) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        italic(&progress_line(index, total)),
        bold(&escape(&question.prompt)),
        instruction(mode)
    )
}

pub fn feedback_text(feedback: &Feedback) -> String {
    if feedback.is_correct {
        "✅ Richtig!".to_string()
    } else {
        format!(
            "❌ Falsch! Deine Antwort: {}\nRichtig: {}",
            escape(&feedback.submitted),
            bold(&escape(&feedback.correct_answer))
        )
    }
}

pub fn result_text(result: &QuizResult) -> String {
    let headline = if result.passed() { "🏆 Quiz beendet!" } else { "📚 Quiz beendet, weiter üben!" };
    let mut text = format!(
        "{}\n{} / {} richtig = {}%\nNote: {}\n",
        bold(headline),
        result.correct,
        result.total,
        result.percentage,
        bold(&result.grade.to_string())
    );

    text.push_str("\nÜbersicht:\n");
    for (i, answer) in result.answers.iter().enumerate() {
        let mark = if answer.is_correct { "✅" } else { "❌" };
        text.push_str(&format!(
            "{}. {} {} → {}",
            i + 1,
            mark,
            escape(&answer.question.prompt),
            escape(&answer.question.correct_answer)
        ));
        if !answer.is_correct {
            text.push_str(&format!(" ({})", italic(&format!("Deine Antwort: {}", escape(&answer.submitted)))));
        }
        text.push('\n');
    }
    text
}

/// Pronoun and form per slot, one line each.
pub fn paradigm_table(entry: &Entry, tense: Tense) -> Option<String> {
    let paradigm = entry.paradigm.as_ref()?;
    let mut table = format!("{} – {}\n", bold(tense.arabic()), tense.german());
    for slot in PronounSlot::ALL {
        let pronoun = slot.pronoun();
        table.push_str(&format!(
            "{} ({}): {}\n",
            pronoun.arabic,
            pronoun.german,
            escape(paradigm.form(tense, slot))
        ));
    }
    Some(table)
}

pub fn pronoun_table(pronouns: &[Pronoun]) -> String {
    let mut table = format!("{}\n", bold("Personalpronomen"));
    for pronoun in pronouns {
        table.push_str(&format!("{} – {} ({})\n", pronoun.arabic, pronoun.german, pronoun.person));
    }
    table
}

/// Word list of a category, narrowed by a search term.
pub fn vocabulary_list_text(category: &str, term: &str, entries: &[Entry]) -> String {
    let mut text = bold(&escape(category));
    if !term.trim().is_empty() {
        text.push_str(&format!(" · Suche „{}“", escape(term.trim())));
    }
    text.push_str(&format!("\n{} Vokabeln\n\n", entries.len()));

    for entry in entries.iter().take(LIST_LIMIT) {
        text.push_str(&format!("{} – {}\n", escape(&entry.arabic), escape(&entry.german)));
        if let Some(antonym) = &entry.antonym {
            text.push_str(&format!("   ↔ {} ({})\n", escape(&antonym.arabic), escape(&antonym.german)));
        }
    }
    if entries.is_empty() {
        text.push_str(&italic("Keine Treffer"));
    } else if entries.len() > LIST_LIMIT {
        text.push_str(&italic(&format!("… und {} weitere, grenze die Suche ein", entries.len() - LIST_LIMIT)));
    }
    text
}

pub fn flashcard_text(deck: &FlashcardDeck) -> String {
    let card = deck.current();
    let emoji = card.emoji.as_deref().unwrap_or(DEFAULT_EMOJI);
    let learned = if deck.current_is_learned() { " ✓ gelernt" } else { "" };
    let mut text = format!(
        "{}{}\n\n{} {}\n",
        italic(&format!("📚 Karte {} von {}", deck.index() + 1, deck.len())),
        learned,
        emoji,
        bold(&escape(deck.front()))
    );

    if deck.is_flipped() {
        text.push_str(&format!("\n✨ Lösung: {}\n", bold(&escape(deck.back()))));
        if let Some(antonym) = &card.antonym {
            text.push_str(&format!(
                "↔️ Gegenteil: {} ({})\n",
                escape(&antonym.arabic),
                escape(&antonym.german)
            ));
        }
        for tense in [Tense::Past, Tense::Present] {
            if let Some(table) = paradigm_table(card, tense) {
                text.push('\n');
                text.push_str(&table);
            }
        }
    } else {
        text.push_str(&format!("\n{}\n", italic("Tippe auf „Umdrehen“, um die Lösung zu sehen")));
    }

    text.push('\n');
    text.push_str(&learn_progress_line(&deck.progress()));
    text
}

pub fn negation_text(drill: &NegationDrill) -> String {
    let exercise = drill.current();
    let mut text = format!(
        "{}\nEndung: {}\n\n{} ({})\n\nWähle die passende Verneinung: لا / لن / لم",
        italic(&format!("Karte {} von {}", drill.index() + 1, drill.len())),
        exercise.ending.label,
        bold(&escape(&exercise.present)),
        escape(&exercise.german)
    );

    if let Some(selected) = drill.selected() {
        let correct = exercise.correct();
        if selected == correct {
            text.push_str(&format!("\n\n✅ Richtig: {} ({})", selected.arabic(), selected.german()));
        } else {
            text.push_str(&format!(
                "\n\n❌ Deine Wahl: {}\nRichtig: {} ({})",
                selected.arabic(),
                bold(correct.arabic()),
                correct.german()
            ));
        }
    }

    text.push_str("\n\n");
    text.push_str(&learn_progress_line(&drill.progress()));
    text
}

pub fn negation_overview(drill: &NegationDrill) -> String {
    let mut text = format!("{}\n", bold("Übersicht"));
    for row in drill.rows() {
        let status = if row.learned {
            "✓"
        } else {
            match row.is_correct() {
                Some(true) => "✅",
                Some(false) => "❌",
                None => "–",
            }
        };
        let answer = row.answer.map(|a| a.arabic()).unwrap_or("–");
        text.push_str(&format!(
            "{}. {} ({}) · {} · {} {}\n",
            row.index + 1,
            escape(&row.exercise.present),
            escape(&row.exercise.german),
            row.exercise.ending.label,
            answer,
            status
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;
    use crate::quiz::scorer::{score, AnswerRecord};
    use crate::quiz::NegationParticle;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn question() -> Question {
        Question::new(
            1,
            "كَتَبَ – يَكتُبُ".into(),
            "schreiben".into(),
            vec!["lügen".into(), "schreiben".into(), "öffnen".into(), "helfen".into()],
        )
    }

    #[test]
    fn question_shows_progress_and_prompt() {
        let text = question_text(&question(), QuizMode::Vocabulary(Direction::ArabicToGerman), 1, 4);
        assert!(text.contains("Frage 2 von 4"));
        assert!(text.contains("<b>كَتَبَ – يَكتُبُ</b>"));
        assert!(text.contains("auf Deutsch"));
    }

    #[test]
    fn prompt_is_escaped() {
        let mut q = question();
        q.prompt = "<script>".into();
        let text = question_text(&q, QuizMode::Vocabulary(Direction::GermanToArabic), 0, 1);
        assert!(text.contains("&lt;script&gt;"));
    }

    #[test]
    fn wrong_feedback_reveals_answer() {
        let text = feedback_text(&Feedback {
            is_correct: false,
            submitted: "lügen".into(),
            correct_answer: "schreiben".into(),
        });
        assert!(text.contains("Falsch"));
        assert!(text.contains("<b>schreiben</b>"));
    }

    #[test]
    fn result_lists_grade_and_mistakes() {
        let q = question();
        let answers = vec![
            AnswerRecord { question: q.clone(), submitted: "schreiben".into(), is_correct: true },
            AnswerRecord { question: q, submitted: "lügen".into(), is_correct: false },
        ];
        let text = result_text(&score(answers, 2));
        assert!(text.contains("1 / 2 richtig = 50%"));
        assert!(text.contains("4 (Ausreichend)"));
        assert!(text.contains("Deine Antwort: lügen"));
    }

    #[test]
    fn flipped_verb_card_shows_paradigms() {
        let store = ContentStore::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut deck = FlashcardDeck::new(&store.verbs()[..1], Direction::ArabicToGerman, &mut rng).unwrap();

        let front = flashcard_text(&deck);
        assert!(front.contains("Karte 1 von 1"));
        assert!(!front.contains("✨ Lösung:"));
        assert!(front.contains("Umdrehen"));

        deck.flip();
        let back = flashcard_text(&deck);
        assert!(back.contains("✨ Lösung:"));
        assert!(back.contains("schreiben"));
        assert!(back.contains("كَتَبْتُ"));
        assert!(back.contains("تَكتُبِينَ"));
    }

    #[test]
    fn negation_card_reports_choice() {
        let store = ContentStore::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut drill = NegationDrill::new(store.verbs(), 3, &mut rng).unwrap();
        assert!(negation_text(&drill).contains("Damma"));

        let wrong = NegationParticle::ALL
            .into_iter()
            .find(|p| *p != drill.current().correct())
            .unwrap();
        drill.answer(wrong);
        assert!(negation_text(&drill).contains("Deine Wahl"));
        assert!(negation_overview(&drill).contains("❌"));
    }

    #[test]
    fn pronoun_table_lists_every_person() {
        let store = ContentStore::builtin().unwrap();
        let table = pronoun_table(store.pronouns());
        assert_eq!(table.lines().count(), 7);
        assert!(table.contains("هي – sie (3. Sg"));
    }

    #[test]
    fn vocabulary_list_shows_count_and_opposites() {
        let store = ContentStore::builtin().unwrap();
        let found = store.search("antonyms", "groß").unwrap();
        let text = vocabulary_list_text("Gegensätze", "groß", &found);
        assert!(text.contains("Suche „groß“"));
        assert!(text.contains("1 Vokabeln"));
        assert!(text.contains("↔ صَغِيرٌ (klein)"));

        let all = store.search("all", "").unwrap();
        let long = vocabulary_list_text("Alle Vokabeln", "", &all);
        assert!(long.contains(&format!("{} Vokabeln", all.len())));
        assert!(long.contains("weitere"));

        let empty = vocabulary_list_text("Verben", "fliegen", &[]);
        assert!(empty.contains("0 Vokabeln"));
        assert!(empty.contains("Keine Treffer"));
    }

    #[test]
    fn nouns_have_no_paradigm_table() {
        let noun = Entry::new(1, "بَيْتٌ", "Haus");
        assert!(paradigm_table(&noun, Tense::Past).is_none());
    }
}
