//! The registration step: collect FIPS codes from an operator.

use crate::config::{validate_fips, STATE_PREFIX};
use crate::error::Result;
use crate::types::PipeConfig;

/// Prompt asking for the FIPS list.
pub const FIPS_PROMPT: &str = "Please enter a list of FIPS codes separated by commas:";

/// Warning shown when a code lacks the state prefix.
pub const INVALID_FIPS_WARNING: &str =
    "All FIPS codes must begin with 08 (prefix for the state of Colorado).";

/// Operator-facing input and output used by [`register`].
pub trait Prompter {
    /// Ask for a line of free text.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Show a non-fatal warning.
    fn warn(&mut self, message: &str);
}

/// Split comma-separated input into codes after removing whitespace.
///
/// Empty entries are kept so they fail validation like any other bad code.
///
/// # Examples
/// ```
/// use co_covid::register::parse_fips_list;
///
/// assert_eq!(parse_fips_list("08001, 08003"), vec!["08001", "08003"]);
/// assert_eq!(parse_fips_list("  "), vec![""]);
/// ```
pub fn parse_fips_list(input: &str) -> Vec<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    compact.split(',').map(str::to_string).collect()
}

/// Confirmation question echoing the parsed codes as a bulleted list.
pub fn confirmation_question(fips: &[String]) -> String {
    let mut question = String::from("Is this correct?");
    for code in fips {
        question.push_str("\n  - ");
        question.push_str(code);
    }
    question.push('\n');
    question
}

/// Run the registration loop until the operator confirms a valid list.
///
/// Invalid input re-prompts; only prompt IO failures are returned as errors.
pub fn register(prompter: &mut impl Prompter) -> Result<PipeConfig> {
    loop {
        let fips = parse_fips_list(&prompter.input(FIPS_PROMPT)?);

        if let Some(invalid) = fips.iter().find(|code| validate_fips(code).is_err()) {
            tracing::warn!(fips = %invalid, prefix = STATE_PREFIX, "Rejected FIPS code");
            prompter.warn(INVALID_FIPS_WARNING);
            continue;
        }

        if !prompter.confirm(&confirmation_question(&fips))? {
            continue;
        }

        return Ok(PipeConfig::new(fips));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Script {
        inputs: VecDeque<&'static str>,
        answers: VecDeque<bool>,
        prompts: usize,
        questions: Vec<String>,
        warnings: Vec<String>,
    }

    impl Prompter for Script {
        fn input(&mut self, _prompt: &str) -> Result<String> {
            self.prompts += 1;
            Ok(self.inputs.pop_front().unwrap().to_string())
        }

        fn confirm(&mut self, question: &str) -> Result<bool> {
            self.questions.push(question.to_string());
            Ok(self.answers.pop_front().unwrap())
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    #[test]
    fn test_parse_fips_list() {
        assert_eq!(parse_fips_list("08001,08003"), vec!["08001", "08003"]);
        assert_eq!(parse_fips_list(" 08001 ,\t08003 "), vec!["08001", "08003"]);
        assert_eq!(
            parse_fips_list("08001,,08003,"),
            vec!["08001", "", "08003", ""]
        );
        assert_eq!(parse_fips_list(""), vec![""]);
    }

    #[test]
    fn test_confirmation_question() {
        let question = confirmation_question(&["08001".to_string(), "08003".to_string()]);
        assert_eq!(question, "Is this correct?\n  - 08001\n  - 08003\n");
    }

    #[test]
    fn test_register_accepts_confirmed_list() {
        let mut script = Script {
            inputs: VecDeque::from(["08001, 08003"]),
            answers: VecDeque::from([true]),
            ..Default::default()
        };

        let config = register(&mut script).unwrap();
        assert_eq!(config.fips(), ["08001".to_string(), "08003".to_string()]);
        assert_eq!(config.columns.datetime, "date");
        assert_eq!(config.columns.id, "fips");
        assert_eq!(config.columns.value, "cases");
        assert!(script.warnings.is_empty());
    }

    #[test]
    fn test_register_reprompts_on_invalid_prefix() {
        let mut script = Script {
            inputs: VecDeque::from(["08001, 09003", "08001"]),
            answers: VecDeque::from([true]),
            ..Default::default()
        };

        let config = register(&mut script).unwrap();
        assert_eq!(config.fips(), ["08001".to_string()]);
        assert_eq!(script.prompts, 2);
        assert_eq!(script.warnings, vec![INVALID_FIPS_WARNING.to_string()]);
        // The invalid list is never offered for confirmation.
        assert_eq!(script.questions.len(), 1);
    }

    #[test]
    fn test_register_reprompts_on_decline_and_empty() {
        let mut script = Script {
            inputs: VecDeque::from(["08001", "", "08005"]),
            answers: VecDeque::from([false, true]),
            ..Default::default()
        };

        let config = register(&mut script).unwrap();
        assert_eq!(config.fips(), ["08005".to_string()]);
        assert_eq!(script.prompts, 3);
        assert_eq!(script.questions.len(), 2);
        assert_eq!(script.warnings, vec![INVALID_FIPS_WARNING.to_string()]);
    }

    #[test]
    fn test_register_rejects_empty_entry_between_commas() {
        let mut script = Script {
            inputs: VecDeque::from(["08001,,08003", "08001,08003"]),
            answers: VecDeque::from([true]),
            ..Default::default()
        };

        let config = register(&mut script).unwrap();
        assert_eq!(config.fips(), ["08001".to_string(), "08003".to_string()]);
        assert_eq!(script.prompts, 2);
        assert_eq!(script.warnings, vec![INVALID_FIPS_WARNING.to_string()]);
        assert_eq!(script.questions.len(), 1);
    }
}
