//! Line-oriented study modes over any reader/writer pair.

use std::collections::HashMap;
use std::error::Error;
use std::io::{BufRead, Write};

use services::{EngineError, FlashcardMove, VocabEngine};
use vocab_core::model::{
    FALSE_LABEL, GroupId, QuestionPolicy, Response, TRUE_LABEL, TestResult,
};

pub type ShellResult<T> = Result<T, Box<dyn Error>>;

const QUIT: &str = ":q";

pub struct Shell<R, W> {
    input: R,
    output: W,
    show_hints: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, show_hints: bool) -> Self {
        Self {
            input,
            output,
            show_hints,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// `None` on end of input.
    fn read_line(&mut self, prompt: &str) -> ShellResult<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Runs one test to completion. Returns `None` if the user quit early.
    ///
    /// # Errors
    ///
    /// Returns engine errors (unknown group, a test already running) and I/O errors.
    pub fn run_quiz(
        &mut self,
        engine: &mut VocabEngine,
        group: &GroupId,
        policy: QuestionPolicy,
        count: usize,
    ) -> ShellResult<Option<TestResult>> {
        let questions = engine.generate_quiz(group, policy, count)?.to_vec();
        let total = questions.len();
        writeln!(
            self.output,
            "{} on {group}: {total} questions. Enter skips, {QUIT} quits.",
            policy.label()
        )?;

        for (i, question) in questions.iter().enumerate() {
            writeln!(
                self.output,
                "\nQuestion {}/{total} [{}]",
                i + 1,
                question.kind().label()
            )?;
            writeln!(self.output, "{}", question.prompt())?;
            let options = question.options();
            for (n, option) in options.iter().enumerate() {
                writeln!(self.output, "  {}. {option}", n + 1)?;
            }
            if self.show_hints {
                if let Some(hint) = question.hint() {
                    writeln!(self.output, "  hint: {hint}")?;
                }
            }

            let line = match self.read_line("> ")? {
                Some(line) if line != QUIT => line,
                _ => {
                    engine.abandon_session()?;
                    writeln!(self.output, "\nTest abandoned.")?;
                    return Ok(None);
                }
            };

            let answer = if line.is_empty() {
                engine.skip_answer()?
            } else {
                engine.submit_answer(resolve_choice(&line, &options))?
            };
            match (&answer.response, answer.is_correct) {
                (_, true) => writeln!(self.output, "Correct!")?,
                (Response::Skipped, _) => {
                    writeln!(self.output, "Skipped. Answer: {}", answer.correct_answer)?;
                }
                (Response::Given(_), false) => {
                    writeln!(self.output, "Wrong. Answer: {}", answer.correct_answer)?;
                }
            }
        }

        let result = engine.finalize_session()?;
        write_result(&mut self.output, &result)?;
        Ok(Some(result))
    }

    /// Flashcard browsing: `n`ext, `p`revious, `f`irst, `l`ast, `m`eaning, `s`tudied, `q`uit.
    ///
    /// # Errors
    ///
    /// Returns engine errors (unknown or empty group) and I/O errors.
    pub fn run_flashcards(&mut self, engine: &mut VocabEngine, group: &GroupId) -> ShellResult<()> {
        let mut cursor = engine.open_flashcards(group)?;
        writeln!(
            self.output,
            "Flashcards for {group}: n/p/f/l move, m shows the meaning, s marks studied, q quits."
        )?;

        loop {
            let entry = engine
                .group(group)?
                .get(cursor.index())
                .ok_or_else(|| EngineError::EmptyGroup(group.clone()))?;
            writeln!(
                self.output,
                "\nCard {}/{}: {}",
                cursor.index() + 1,
                cursor.len(),
                entry.word
            )?;
            if cursor.show_meaning() {
                writeln!(self.output, "  {}\n  {}", entry.simple, entry.meaning)?;
            }

            let Some(command) = self.read_line("> ")? else {
                return Ok(());
            };
            let mv = match command.as_str() {
                "n" | "" => FlashcardMove::Next,
                "p" => FlashcardMove::Previous,
                "f" => FlashcardMove::First,
                "l" => FlashcardMove::Last,
                "m" => FlashcardMove::ToggleMeaning,
                "s" => {
                    engine.mark_group_studied(group)?;
                    writeln!(self.output, "{group} marked as studied.")?;
                    continue;
                }
                "q" | QUIT => return Ok(()),
                other => {
                    writeln!(self.output, "unknown command: {other}")?;
                    continue;
                }
            };
            engine.move_flashcard(&mut cursor, mv)?;
        }
    }

    /// Word-match game: choose the definition number for each word.
    ///
    /// # Errors
    ///
    /// Returns engine errors (unknown or empty group) and I/O errors.
    pub fn run_match(&mut self, engine: &mut VocabEngine, group: &GroupId) -> ShellResult<()> {
        let round = engine.start_match_round(group)?;
        writeln!(self.output, "Match each word with its definition:")?;
        for (n, definition) in round.definitions().iter().enumerate() {
            writeln!(self.output, "  {}. {definition}", n + 1)?;
        }

        let mut matches = HashMap::new();
        let words: Vec<String> = round.words().map(str::to_owned).collect();
        for word in words {
            let Some(line) = self.read_line(&format!("{word} > "))? else {
                break;
            };
            let chosen = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| round.definitions().get(i));
            if let Some(definition) = chosen {
                matches.insert(word, definition.clone());
            }
        }

        let outcome = round.check(&matches);
        writeln!(self.output, "\nMatched {}/{}", outcome.correct, outcome.total)?;
        for detail in outcome.details.iter().filter(|d| !d.is_correct) {
            writeln!(
                self.output,
                "  {}: {}",
                detail.word, detail.correct_definition
            )?;
        }
        if outcome.is_perfect() {
            writeln!(self.output, "Perfect round!")?;
        }
        Ok(())
    }
}

/// Maps an option number or a true/false shorthand to the canonical option text.
fn resolve_choice(input: &str, options: &[&str]) -> String {
    if let Some(option) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
    {
        return (*option).to_owned();
    }
    if options == [TRUE_LABEL, FALSE_LABEL] {
        match input.to_lowercase().as_str() {
            "t" | "true" => return TRUE_LABEL.to_owned(),
            "f" | "false" => return FALSE_LABEL.to_owned(),
            _ => {}
        }
    }
    input.to_owned()
}

/// Whole seconds as `1m 05s` / `42s`.
#[must_use]
pub fn format_duration(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

/// Summary and per-question review of a finished test.
///
/// # Errors
///
/// Returns I/O errors from `out`.
pub fn write_result(out: &mut impl Write, result: &TestResult) -> std::io::Result<()> {
    writeln!(
        out,
        "\nScore {} ({:.1}%) in {}. {}",
        result.score(),
        result.percentage(),
        format_duration(result.time_taken_secs()),
        result.band().message()
    )?;
    for answer in result.details() {
        let mark = if answer.is_correct { "ok" } else { "x " };
        writeln!(
            out,
            "  [{mark}] {} | yours: {} | answer: {}",
            answer.question,
            answer.response.display_text(),
            answer.correct_answer
        )?;
    }
    Ok(())
}

/// Group list with word counts and progress markers.
///
/// # Errors
///
/// Returns I/O errors from `out`.
pub fn write_groups(out: &mut impl Write, engine: &VocabEngine) -> std::io::Result<()> {
    let progress = engine.get_progress_snapshot();
    for group in engine.word_bank().groups() {
        let p = progress.get(group.id()).cloned().unwrap_or_default();
        let best = if p.test_taken {
            format!("best {:.1}%", p.best_score)
        } else {
            "untested".to_owned()
        };
        writeln!(
            out,
            "{:<12} {:>3} words  {}{}",
            group.id().as_str(),
            group.len(),
            best,
            if p.studied { "  studied" } else { "" }
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Returns engine errors for unknown groups and I/O errors.
pub fn write_search(
    out: &mut impl Write,
    engine: &VocabEngine,
    group: &GroupId,
    term: &str,
) -> ShellResult<()> {
    let hits = engine.search_group(group, term)?;
    if hits.is_empty() {
        writeln!(out, "No words match {term:?}.")?;
    }
    for entry in hits {
        writeln!(out, "{:<14} {} | {}", entry.word, entry.simple, entry.meaning)?;
    }
    Ok(())
}

/// Dashboard figures and per-group progress.
///
/// # Errors
///
/// Returns I/O errors from `out`.
pub fn write_progress(out: &mut impl Write, engine: &VocabEngine) -> std::io::Result<()> {
    let report = engine.progress_report();
    writeln!(
        out,
        "Groups studied: {}/{}",
        report.groups_studied, report.total_groups
    )?;
    writeln!(out, "Total words:    {}", report.total_words)?;
    writeln!(out, "Tests taken:    {}", report.tests_taken)?;
    writeln!(out, "Cards viewed:   {}", report.cards_viewed)?;
    match report.accuracy {
        Some(accuracy) => writeln!(out, "Accuracy:       {accuracy:.1}%")?,
        None => writeln!(out, "Accuracy:       n/a")?,
    }
    if let Some(avg) = report.average_best_score {
        writeln!(out, "Avg best score: {avg:.1}%")?;
    }
    writeln!(
        out,
        "Practice time:  {}",
        format_duration(report.total_practice_secs)
    )?;
    writeln!(out)?;
    write_groups(out, engine)
}

/// # Errors
///
/// Returns I/O errors from `out`.
pub fn write_history(out: &mut impl Write, engine: &VocabEngine, limit: usize) -> std::io::Result<()> {
    let history = engine.get_history(limit);
    if history.is_empty() {
        return writeln!(out, "No tests taken yet.");
    }
    for result in history.iter().rev() {
        writeln!(
            out,
            "{}  {:<12} {:<18} {:>6} {:>6.1}%  {}",
            result.date().format("%Y-%m-%d %H:%M"),
            result.group().as_str(),
            result.question_type(),
            result.score(),
            result.percentage(),
            format_duration(result.time_taken_secs())
        )?;
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
