// src/cli.rs

use crate::{models::question::OptionKey, session::SessionCommand};

pub const HELP: &str = "\
Commands:
  <n> <option>   answer question n, e.g. `2 c` (answering again replaces it)
  answers        show your current answers
  time           show the remaining time
  submit         submit the exam
  quit           leave without submitting";

/// One line typed during an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Session(SessionCommand),
    ShowTime,
    ShowAnswers,
    Help,
    Empty,
}

pub fn parse_input(line: &str) -> Result<Input, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        [] => Ok(Input::Empty),
        [word] => match word.to_ascii_lowercase().as_str() {
            "submit" => Ok(Input::Session(SessionCommand::Submit)),
            "quit" | "exit" => Ok(Input::Session(SessionCommand::Leave)),
            "time" => Ok(Input::ShowTime),
            "answers" => Ok(Input::ShowAnswers),
            "help" | "?" => Ok(Input::Help),
            _ => Err(format!("Unknown command '{}'. Type `help`.", word)),
        },
        [number, option] => {
            let number: usize = number
                .parse()
                .map_err(|_| format!("'{}' is not a question number", number))?;
            if number == 0 {
                return Err("Questions are numbered from 1".to_string());
            }
            let key: OptionKey = option.parse()?;
            Ok(Input::Session(SessionCommand::Select {
                index: number - 1,
                key,
            }))
        }
        _ => Err("Expected `<question> <option>` or a command. Type `help`.".to_string()),
    }
}
