// src/render.rs

use std::fmt::Write;

use crate::{
    models::{
        answer::AnswerSet,
        question::{OptionKey, Question},
        submission::SubmissionResult,
        test::Test,
    },
    utils::html::plain_text,
};

/// Below this many seconds the clock is shown as urgent.
pub const LOW_TIME_SECS: u64 = 60;

/// `m:ss`, e.g. `4:05`.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Whether a clock value is worth printing on a line-based terminal:
/// every full minute, then each of the last ten seconds.
pub fn should_announce(remaining_secs: u64) -> bool {
    remaining_secs % 60 == 0 || remaining_secs <= 10
}

pub fn clock_line(remaining_secs: u64) -> String {
    let marker = if remaining_secs < LOW_TIME_SECS { " (!)" } else { "" };
    format!("Time Left: {}{}", format_time(remaining_secs), marker)
}

/// Scores are integral in practice; print `7`, not `7.0`.
fn format_marks(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

pub fn render_question(index: usize, question: &Question, selected: Option<OptionKey>) -> String {
    let mut out = format!("Q{}. {}\n", index + 1, plain_text(&question.question_text));
    for (key, text) in &question.options {
        let mark = if selected == Some(*key) { "(*)" } else { "( )" };
        let _ = writeln!(out, "   {} {}) {}", mark, key, plain_text(text));
    }
    out
}

pub fn render_test(test: &Test, answers: &AnswerSet, remaining_secs: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", plain_text(&test.title));
    if let Some(category) = &test.category {
        let _ = writeln!(out, "Category: {}", plain_text(category));
    }
    let _ = writeln!(out, "{}\n", clock_line(remaining_secs));
    for (index, question) in test.questions.iter().enumerate() {
        out.push_str(&render_question(index, question, answers.get(index)));
        out.push('\n');
    }
    out
}

pub fn render_answers(answers: &AnswerSet, question_count: usize) -> String {
    let picks: Vec<String> = answers
        .iter()
        .map(|(index, key)| format!("Q{}={}", index + 1, key))
        .collect();
    format!(
        "Answered {} of {}: {}",
        answers.len(),
        question_count,
        if picks.is_empty() { "-".to_string() } else { picks.join(", ") }
    )
}

pub fn render_result(result: &SubmissionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} - Results ==", plain_text(&result.test.title));
    let _ = writeln!(
        out,
        "Score: {} / {}",
        format_marks(result.score),
        format_marks(result.total_marks)
    );
    let _ = writeln!(
        out,
        "Correct answers: {} of {}",
        result.correct_count(),
        result.test.questions.len()
    );
    if let Some(at) = result.submitted_at {
        let _ = writeln!(out, "Submitted: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    let _ = writeln!(out, "\nDetailed Review");

    for (review, question) in result.review().iter().zip(&result.test.questions) {
        let verdict = if review.is_correct { "Correct" } else { "Incorrect" };
        let _ = writeln!(
            out,
            "\nQ{}. {} [{}]",
            review.index + 1,
            plain_text(&question.question_text),
            verdict
        );
        for (key, text) in &question.options {
            let mut line = format!("   {}) {}", key.as_char().to_ascii_uppercase(), plain_text(text));
            if review.correct == Some(*key) {
                line.push_str("  <- correct answer");
            } else if review.selected == Some(*key) {
                line.push_str("  <- your answer");
            }
            let _ = writeln!(out, "{}", line);
        }
    }
    out
}
