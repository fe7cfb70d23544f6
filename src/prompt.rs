//! Interactive yes/no confirmation.
use std::io::{self, BufRead as _, Write as _};

use crate::logging::Log;

/// Accepted answers, shown with every question.
const CHOICES: &str = "[y, yes, n, no]";

/// Source of answers to confirmation questions.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt: Send + Sync {
    /// Print `question` and read one line of input.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be written or read.
    fn ask(&self, question: &str) -> io::Result<Option<String>>;
}

/// Reads answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    #[allow(clippy::print_stdout)]
    fn ask(&self, question: &str) -> io::Result<Option<String>> {
        print!("{question} ");
        io::stdout().flush()?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    }
}

/// Ask `question` until a recognised answer is given.
///
/// Unrecognised answers are reported through `log` and the question is
/// repeated. End of input counts as "no".
///
/// # Errors
///
/// Returns an error if the prompt cannot be read.
pub fn confirm(prompt: &dyn Prompt, log: &dyn Log, question: &str) -> io::Result<bool> {
    let question = format!("{question} {CHOICES}");
    loop {
        let Some(answer) = prompt.ask(&question)? else {
            log.debug("no answer on input, declining");
            return Ok(false);
        };
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            other => log.error(&format!("invalid choices '{other}'")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::{BufferedLog, Severity};
    use mockall::Sequence;

    fn answering(answers: &[Option<&str>]) -> MockPrompt {
        let mut prompt = MockPrompt::new();
        let mut seq = Sequence::new();
        for answer in answers {
            let answer = answer.map(String::from);
            prompt
                .expect_ask()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(answer.clone()));
        }
        prompt
    }

    #[test]
    fn accepts_short_and_long_forms() {
        let log = BufferedLog::new();
        let cases = [
            ("y\n", true),
            ("YES\n", true),
            ("n\n", false),
            (" no \n", false),
        ];
        for (answer, expected) in cases {
            let prompt = answering(&[Some(answer)]);
            assert_eq!(confirm(&prompt, &log, "remove it ?").unwrap(), expected);
        }
    }

    #[test]
    fn reprompts_after_invalid_answer() {
        let log = BufferedLog::new();
        let prompt = answering(&[Some("maybe\n"), Some("y\n")]);
        assert!(confirm(&prompt, &log, "remove it ?").unwrap());
        assert_eq!(log.messages(Severity::Error), vec!["invalid choices 'maybe'"]);
    }

    #[test]
    fn end_of_input_declines() {
        let log = BufferedLog::new();
        let prompt = answering(&[None]);
        assert!(!confirm(&prompt, &log, "remove it ?").unwrap());
    }

    #[test]
    fn question_lists_choices() {
        let log = BufferedLog::new();
        let mut prompt = MockPrompt::new();
        prompt
            .expect_ask()
            .withf(|q| q.to_string() == "remove it ? [y, yes, n, no]")
            .returning(|_| Ok(Some("n".to_string())));
        assert!(!confirm(&prompt, &log, "remove it ?").unwrap());
    }

    #[test]
    fn read_errors_propagate() {
        let log = BufferedLog::new();
        let mut prompt = MockPrompt::new();
        prompt
            .expect_ask()
            .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")));
        assert!(confirm(&prompt, &log, "remove it ?").is_err());
    }
}
