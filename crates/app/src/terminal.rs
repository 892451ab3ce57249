//! Line-oriented practice screen.
//!
//! Reads one command per line and renders plain text, so the loop runs the
//! same against a terminal or an in-memory buffer.

use std::io::{self, BufRead, Write};

use quiz_core::model::{PresentedQuestion, UserPreferences, onboarding_categories};
use quiz_core::session::AnswerOutcome;
use services::{PracticeSession, SessionError, SessionReport};
use thiserror::Error;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// How a practice run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayExit {
    /// Summary shown; the user asked for a fresh draw.
    Restart,
    /// Summary shown, or nothing to practice.
    Done,
    /// The user left mid-session.
    Quit,
}

/// One parsed line of input while a question is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Answer(usize),
    Skip,
    Quit,
    Invalid,
}

/// Parse a letter (`a`, `B`) or 1-based number into an option index.
#[must_use]
pub fn parse_input(line: &str, options: usize) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "s" | "skip" => return Input::Skip,
        "q" | "quit" => return Input::Quit,
        _ => {}
    }

    let index = match line.as_bytes() {
        [c] if c.is_ascii_alphabetic() => Some(usize::from(c.to_ascii_lowercase() - b'a')),
        _ => line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)),
    };
    match index {
        Some(i) if i < options => Input::Answer(i),
        _ => Input::Invalid,
    }
}

fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map_or('?', char::from)
}

fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Drive `session` to its summary, reading commands from `input`.
///
/// # Errors
///
/// Returns `PlayError` on I/O failure or if the session bookkeeping breaks.
pub fn play(
    session: &mut PracticeSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<PlayExit, PlayError> {
    if session.is_empty() {
        writeln!(
            out,
            "No questions match your preferences. Run `prefs` to choose other categories or difficulties."
        )?;
        return Ok(PlayExit::Done);
    }

    while !session.is_complete() {
        let label = session.progress().label();
        let Some(presented) = session.current()?.cloned() else {
            session.advance()?;
            continue;
        };
        render_question(out, label.as_deref(), &presented)?;

        let Some(line) = read_line(input)? else {
            return Ok(PlayExit::Quit);
        };
        match parse_input(&line, presented.question().options().len()) {
            Input::Quit => return Ok(PlayExit::Quit),
            Input::Invalid => {
                writeln!(out, "Type a letter to answer, s to skip, or q to quit.")?;
            }
            Input::Skip => {
                session.skip();
                session.advance()?;
            }
            Input::Answer(selected) => {
                let result = session.answer(selected)?;
                let correct = option_label(result.correct_option);
                let chosen = session.current_selection().map_or('?', option_label);
                match result.outcome {
                    AnswerOutcome::Correct => writeln!(out, "Correct!")?,
                    AnswerOutcome::Incorrect => {
                        writeln!(out, "Incorrect. You chose {chosen}; the answer is {correct}.")?;
                    }
                    AnswerOutcome::Ignored => writeln!(out, "Already answered {chosen}.")?,
                }
                if !result.explanation.is_empty() {
                    writeln!(out, "{}", result.explanation)?;
                }
                if result.prompt_sign_up {
                    writeln!(
                        out,
                        "Enjoying the practice? Sign up to keep your preferences across devices."
                    )?;
                }
                writeln!(out, "Press Enter for the next question.")?;
                if read_line(input)?.is_none_or(|l| l.trim().eq_ignore_ascii_case("q")) {
                    return Ok(PlayExit::Quit);
                }
                session.advance()?;
            }
        }
    }

    render_report(out, &session.report())?;
    writeln!(out, "Type r to practice again, anything else to finish.")?;
    let again = read_line(input)?.is_some_and(|l| l.trim().eq_ignore_ascii_case("r"));
    Ok(if again { PlayExit::Restart } else { PlayExit::Done })
}

fn render_question(
    out: &mut impl Write,
    label: Option<&str>,
    presented: &PresentedQuestion,
) -> io::Result<()> {
    let question = presented.question();
    writeln!(out)?;
    if let Some(label) = label {
        writeln!(out, "{label}  [{} · {}]", question.category().name(), question.difficulty())?;
    }
    writeln!(out, "{}", question.prompt())?;
    for (index, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}) {option}", option_label(index))?;
    }
    write!(out, "> ")?;
    out.flush()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar(correct: f64, incorrect: f64, skipped: f64) -> String {
    let cells = |pct: f64| ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let (c, i) = (cells(correct), cells(incorrect));
    let s = cells(skipped).min(BAR_WIDTH.saturating_sub(c + i));
    format!(
        "{}{}{}{}",
        "#".repeat(c),
        "x".repeat(i),
        "-".repeat(s),
        " ".repeat(BAR_WIDTH.saturating_sub(c + i + s))
    )
}

/// Write the end-of-session report.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn render_report(out: &mut impl Write, report: &SessionReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", report.title)?;
    writeln!(out, "{}", report.message)?;
    writeln!(
        out,
        "Score: {}%  ({} correct, {} incorrect, {} skipped of {})",
        report.rounded_percentage(),
        report.correct,
        report.incorrect,
        report.skipped,
        report.total
    )?;
    for item in &report.categories {
        let row = item
            .bar
            .map_or_else(|| " ".repeat(BAR_WIDTH), |[c, i, s]| bar(c, i, s));
        writeln!(
            out,
            "  {:<22} [{row}] {}/{}",
            item.name, item.correct, item.total
        )?;
    }
    Ok(())
}

/// Write the onboarding catalogue with the current selection marked.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn render_preferences(
    out: &mut impl Write,
    preferences: Option<&UserPreferences>,
) -> io::Result<()> {
    writeln!(out, "Categories:")?;
    for category in onboarding_categories() {
        let mark = if preferences.is_some_and(|p| p.categories().contains(category.id())) {
            'x'
        } else {
            ' '
        };
        writeln!(
            out,
            "  [{mark}] {:<22} {:<20} {}",
            category.id().as_str(),
            category.name(),
            category.description()
        )?;
    }
    match preferences {
        Some(p) => {
            let difficulties: Vec<&str> = p.difficulties().iter().map(|d| d.as_str()).collect();
            writeln!(out, "Questions per session: {}", p.question_count())?;
            writeln!(out, "Difficulties: {}", difficulties.join(", "))?;
        }
        None => writeln!(out, "No preferences saved yet.")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Clock;
    use quiz_core::model::{
        Category, CategoryId, Difficulty, Question, QuestionDraft, QuestionId, Topic,
    };
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use services::Identity;
    use std::io::Cursor;

    fn question(id: &str) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            prompt: format!("Prompt {id}"),
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answer: 0,
            explanation: String::new(),
            topic: Topic::new("Basics", Category::new("Cardiology", "")),
            difficulty: Difficulty::Easy,
            tags: Default::default(),
        }
        .validate()
        .unwrap()
    }

    fn session(categories: &[&str]) -> PracticeSession {
        PracticeSession::start(
            Identity::guest(),
            UserPreferences::from_persisted(
                categories.iter().map(|c| CategoryId::new(*c)),
                3,
                Difficulty::ALL,
            ),
            &[question("1"), question("2"), question("3")],
            StdRng::seed_from_u64(3),
            Clock::fixed(fixed_now()),
        )
    }

    #[test]
    fn parses_letters_numbers_and_commands() {
        assert_eq!(parse_input("b\n", 4), Input::Answer(1));
        assert_eq!(parse_input(" C ", 4), Input::Answer(2));
        assert_eq!(parse_input("1", 4), Input::Answer(0));
        assert_eq!(parse_input("e", 4), Input::Invalid);
        assert_eq!(parse_input("0", 4), Input::Invalid);
        assert_eq!(parse_input("S", 4), Input::Skip);
        assert_eq!(parse_input("quit", 4), Input::Quit);
    }

    #[test]
    fn plays_through_to_the_report() {
        let mut s = session(&["cardiology"]);
        let mut input = Cursor::new("s\nz\na\n\nb\n\nr\n");
        let mut out = Vec::new();

        let exit = play(&mut s, &mut input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(exit, PlayExit::Restart);
        assert!(text.contains("Question 1 of 3"));
        assert!(text.contains("Type a letter to answer"));
        assert!(text.contains("Sign up"));
        assert!(text.contains("1 skipped of 3"));
        assert!(s.is_complete());
    }

    #[test]
    fn wrong_answer_feedback_names_the_stored_choice() {
        let mut s = session(&["cardiology"]);
        let presented = s.current().unwrap().cloned().unwrap();
        let correct = presented.question().correct_answer();
        let wrong = (correct + 1) % presented.question().options().len();

        let mut input = Cursor::new(format!("{}\nq\n", option_label(wrong)));
        let mut out = Vec::new();
        let exit = play(&mut s, &mut input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(exit, PlayExit::Quit);
        assert!(text.contains(&format!(
            "You chose {}; the answer is {}.",
            option_label(wrong),
            option_label(correct)
        )));
        assert_eq!(s.current_selection(), Some(wrong));
    }

    #[test]
    fn end_of_input_quits_mid_session() {
        let mut s = session(&["cardiology"]);
        let exit = play(&mut s, &mut Cursor::new(""), &mut Vec::new()).unwrap();
        assert_eq!(exit, PlayExit::Quit);
        assert!(!s.is_complete());
    }

    #[test]
    fn empty_session_explains_itself() {
        let mut s = session(&["neurology"]);
        let mut out = Vec::new();
        let exit = play(&mut s, &mut Cursor::new(""), &mut out).unwrap();
        assert_eq!(exit, PlayExit::Done);
        assert!(String::from_utf8(out).unwrap().contains("No questions match"));
    }

    #[test]
    fn bars_fill_the_full_width() {
        assert_eq!(bar(50.0, 25.0, 25.0), "##########xxxxx-----");
        assert_eq!(bar(0.0, 0.0, 100.0).len(), BAR_WIDTH);
    }
}
