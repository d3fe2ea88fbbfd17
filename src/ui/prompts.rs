//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts go through the [`Prompter`] trait so the release engine never
//! touches the terminal directly. [`TerminalPrompter`] talks to stdin and
//! stdout; [`ScriptedPrompter`] replays a fixed list of answers.
//!
//! In non-interactive mode every prompt fails with
//! [`PromptError::NotInteractive`]; callers that can fall back to a cached
//! value do so before prompting.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("input required for '{0}' but not in interactive mode")]
    NotInteractive(String),

    #[error("no valid answer for '{message}' after {attempts} attempt(s)")]
    RetriesExhausted { message: String, attempts: usize },

    #[error("scripted prompter has no answer for '{0}'")]
    ScriptExhausted(String),

    #[error("scripted answer {answer} does not fit prompt '{message}'")]
    ScriptMismatch { message: String, answer: String },

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(e: io::Error) -> Self {
        PromptError::IoError(e.to_string())
    }
}

/// Source of answers to interactive questions.
pub trait Prompter: Send + Sync {
    /// Select one of `options`, returning its index.
    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<usize, PromptError>;

    /// Free text input.
    fn input(&self, message: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Masked input for secrets. The answer is never echoed.
    fn password(&self, message: &str) -> Result<String, PromptError>;

    /// Yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;
}

/// How many times a validated prompt may be re-asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Ask until the answer is valid.
    Unbounded,
    /// Give up after this many invalid answers.
    Bounded(usize),
}

impl RetryPolicy {
    fn allows(&self, attempts: usize) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::Bounded(max) => attempts < *max,
        }
    }
}

fn acquire<F, P>(
    message: &str,
    mut read: F,
    predicate: P,
    retry: RetryPolicy,
) -> Result<String, PromptError>
where
    F: FnMut() -> Result<String, PromptError>,
    P: Fn(&str) -> bool,
{
    let mut attempts = 0;
    while retry.allows(attempts) {
        let answer = read()?;
        attempts += 1;
        if predicate(&answer) {
            return Ok(answer);
        }
        tracing::debug!(prompt = message, attempts, "rejected answer");
    }
    Err(PromptError::RetriesExhausted {
        message: message.to_string(),
        attempts,
    })
}

/// Ask for text until `predicate` accepts it.
///
/// # Example
///
/// ```
/// use shipyard::ui::prompts::{input_until, Answer, RetryPolicy, ScriptedPrompter};
///
/// let prompter = ScriptedPrompter::new([Answer::text(""), Answer::text("fix: typo")]);
/// let msg = input_until(&prompter, "Commit message", |s| !s.trim().is_empty(), RetryPolicy::Unbounded)
///     .unwrap();
/// assert_eq!(msg, "fix: typo");
/// ```
pub fn input_until<P>(
    prompter: &dyn Prompter,
    message: &str,
    predicate: P,
    retry: RetryPolicy,
) -> Result<String, PromptError>
where
    P: Fn(&str) -> bool,
{
    acquire(message, || prompter.input(message, None), predicate, retry)
}

/// Ask for a secret until `predicate` accepts it.
pub fn password_until<P>(
    prompter: &dyn Prompter,
    message: &str,
    predicate: P,
    retry: RetryPolicy,
) -> Result<String, PromptError>
where
    P: Fn(&str) -> bool,
{
    acquire(message, || prompter.password(message), predicate, retry)
}

// =============================================================================
// Terminal
// =============================================================================

/// Prompter backed by stdin/stdout.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    fn ensure_interactive(&self, message: &str) -> Result<(), PromptError> {
        if self.interactive {
            Ok(())
        } else {
            Err(PromptError::NotInteractive(message.to_string()))
        }
    }

    fn read_line() -> Result<String, PromptError> {
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<usize, PromptError> {
        self.ensure_interactive(message)?;
        if options.is_empty() {
            return Err(PromptError::Cancelled);
        }

        println!("{}", message);
        for (i, option) in options.iter().enumerate() {
            let marker = if Some(i) == default { "*" } else { " " };
            println!(" {} {}. {}", marker, i + 1, option);
        }

        loop {
            print!("Enter number: ");
            io::stdout().flush()?;
            let input = Self::read_line()?;
            let input = input.trim();
            if input.is_empty() {
                if let Some(d) = default {
                    return Ok(d);
                }
                continue;
            }
            match input.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => println!("Invalid selection"),
            }
        }
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        self.ensure_interactive(message)?;
        match default {
            Some(d) => print!("{} [{}]: ", message, d),
            None => print!("{}: ", message),
        }
        io::stdout().flush()?;
        let input = Self::read_line()?;
        if input.trim().is_empty() {
            if let Some(d) = default {
                return Ok(d.to_string());
            }
        }
        Ok(input)
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        self.ensure_interactive(message)?;
        print!("{}: ", message);
        io::stdout().flush()?;
        Ok(rpassword::read_password()?)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        self.ensure_interactive(message)?;
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{} {} ", message, hint);
        io::stdout().flush()?;
        let input = Self::read_line()?;
        Ok(match input.trim().to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }
}

// =============================================================================
// Scripted
// =============================================================================

/// A canned answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Pick the option with this index.
    Index(usize),
    /// Pick the option with this label.
    Choice(String),
    /// Text (also used for passwords).
    Text(String),
    /// Yes/no.
    Confirm(bool),
}

impl Answer {
    pub fn text(s: &str) -> Self {
        Answer::Text(s.to_string())
    }

    pub fn choice(s: &str) -> Self {
        Answer::Choice(s.to_string())
    }
}

/// Prompter that replays answers in order and records what was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I: IntoIterator<Item = Answer>>(answers: I) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt message seen so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn next(&self, message: &str) -> Result<Answer, PromptError> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.answers
            .lock()
            .map_err(|_| PromptError::IoError("answer queue poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| PromptError::ScriptExhausted(message.to_string()))
    }

    fn mismatch(message: &str, answer: &Answer) -> PromptError {
        PromptError::ScriptMismatch {
            message: message.to_string(),
            answer: format!("{:?}", answer),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &self,
        message: &str,
        options: &[String],
        _default: Option<usize>,
    ) -> Result<usize, PromptError> {
        let answer = self.next(message)?;
        match &answer {
            Answer::Index(i) if *i < options.len() => Ok(*i),
            Answer::Choice(label) => options
                .iter()
                .position(|o| o == label)
                .ok_or_else(|| Self::mismatch(message, &answer)),
            _ => Err(Self::mismatch(message, &answer)),
        }
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        match self.next(message)? {
            Answer::Text(s) if s.is_empty() && default.is_some() => {
                Ok(default.unwrap_or_default().to_string())
            }
            Answer::Text(s) => Ok(s),
            other => Err(Self::mismatch(message, &other)),
        }
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        match self.next(message)? {
            Answer::Text(s) => Ok(s),
            other => Err(Self::mismatch(message, &other)),
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> Result<bool, PromptError> {
        match self.next(message)? {
            Answer::Confirm(b) => Ok(b),
            other => Err(Self::mismatch(message, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_prompter_refuses_when_not_interactive() {
        let prompter = TerminalPrompter::new(false);
        assert!(matches!(
            prompter.confirm("Overwrite?", false),
            Err(PromptError::NotInteractive(_))
        ));
        assert!(matches!(
            prompter.input("Name", None),
            Err(PromptError::NotInteractive(m)) if m == "Name"
        ));
        assert!(prompter.password("Token").is_err());
        assert!(prompter.select("Pick", &["a".to_string()], None).is_err());
    }

    mod scripted {
        use super::*;

        fn opts() -> Vec<String> {
            vec!["GitHub".to_string(), "Gitee".to_string()]
        }

        #[test]
        fn replays_in_order_and_records() {
            let p = ScriptedPrompter::new([
                Answer::choice("Gitee"),
                Answer::Index(0),
                Answer::Confirm(true),
            ]);
            assert_eq!(p.select("Platform", &opts(), None).unwrap(), 1);
            assert_eq!(p.select("Again", &opts(), None).unwrap(), 0);
            assert!(p.confirm("Sure?", false).unwrap());
            assert_eq!(p.asked(), vec!["Platform", "Again", "Sure?"]);
            assert_eq!(p.remaining(), 0);
        }

        #[test]
        fn exhausted_script_fails() {
            let p = ScriptedPrompter::new([]);
            assert!(matches!(
                p.input("Anything", None),
                Err(PromptError::ScriptExhausted(_))
            ));
        }

        #[test]
        fn mismatched_answer_fails() {
            let p = ScriptedPrompter::new([Answer::Confirm(true), Answer::Index(5)]);
            assert!(matches!(
                p.input("Text", None),
                Err(PromptError::ScriptMismatch { .. })
            ));
            assert!(p.select("Pick", &opts(), None).is_err());
        }

        #[test]
        fn empty_text_takes_default() {
            let p = ScriptedPrompter::new([Answer::text("")]);
            assert_eq!(p.input("Name", Some("widget")).unwrap(), "widget");
        }
    }

    mod input_until {
        use super::*;

        fn non_empty(s: &str) -> bool {
            !s.trim().is_empty()
        }

        #[test]
        fn reprompts_until_valid() {
            let p = ScriptedPrompter::new([
                Answer::text(""),
                Answer::text("   "),
                Answer::text("initial commit"),
            ]);
            let msg = input_until(&p, "Commit message", non_empty, RetryPolicy::Unbounded).unwrap();
            assert_eq!(msg, "initial commit");
            assert_eq!(p.asked().len(), 3);
        }

        #[test]
        fn bounded_gives_up() {
            let p = ScriptedPrompter::new([Answer::text(""), Answer::text(""), Answer::text("ok")]);
            let err = input_until(&p, "Commit message", non_empty, RetryPolicy::Bounded(2))
                .unwrap_err();
            assert!(matches!(
                err,
                PromptError::RetriesExhausted { attempts: 2, .. }
            ));
            assert_eq!(p.remaining(), 1);
        }

        #[test]
        fn bounded_zero_never_asks() {
            let p = ScriptedPrompter::new([Answer::text("ok")]);
            assert!(input_until(&p, "x", non_empty, RetryPolicy::Bounded(0)).is_err());
            assert!(p.asked().is_empty());
        }

        #[test]
        fn password_until_uses_password_prompt() {
            let p = ScriptedPrompter::new([Answer::text(""), Answer::text("ghp_x")]);
            let token = password_until(&p, "Token", non_empty, RetryPolicy::Unbounded).unwrap();
            assert_eq!(token, "ghp_x");
        }

        #[test]
        fn prompt_errors_propagate() {
            let p = ScriptedPrompter::new([]);
            assert!(matches!(
                input_until(&p, "x", non_empty, RetryPolicy::Unbounded),
                Err(PromptError::ScriptExhausted(_))
            ));
        }
    }
}
