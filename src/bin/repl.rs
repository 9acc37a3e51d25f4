use std::borrow::Cow;
use std::collections::HashSet;

use log::debug;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

use monkey::{Env, Environment, TokenKind, builtins, evaluate, parse, tokenize};

const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = "monkey_history.txt";
const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

struct MonkeyCompleter {
    env: Env,
}

impl MonkeyCompleter {
    fn new(env: Env) -> Self {
        MonkeyCompleter { env }
    }

    fn candidates(&self) -> HashSet<String> {
        let mut candidates = self.env.borrow().get_identifiers();
        candidates.extend(builtins::names().map(String::from));
        candidates.extend(TokenKind::KEYWORDS.iter().map(|k| k.to_string()));
        candidates
    }
}

impl rustyline::completion::Completer for MonkeyCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let prefix = match tokenize(&line[..pos]).last() {
            Some(token) if token.kind == TokenKind::Ident && token.span.end == pos => {
                token.literal.clone()
            }
            _ => return Ok((pos, vec![])),
        };
        let mut completions: Vec<String> = self
            .candidates()
            .into_iter()
            .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|rest| !rest.is_empty())
            .collect();
        completions.sort();
        Ok((pos, completions))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct MonkeyHelper {
    #[rustyline(Validator)]
    validator: MonkeyValidator,
    #[rustyline(Highlighter)]
    highlighter: MonkeyHighlighter,
    #[rustyline(Completer)]
    completer: MonkeyCompleter,
}

fn closes(opening: char, closing: char) -> bool {
    matches!((opening, closing), ('(', ')') | ('[', ']') | ('{', '}'))
}

/// Keeps reading lines while a bracket or string is left open.
struct MonkeyValidator;

impl Validator for MonkeyValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        let mut stack = Vec::new();
        let mut in_string = false;

        for (i, c) in input.chars().enumerate() {
            // No escapes inside Monkey strings
            if in_string {
                if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => in_string = true,
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => match stack.pop() {
                    Some(opening) if closes(opening, c) => {}
                    _ => {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched '{}' at position {}",
                            c, i
                        ))));
                    }
                },
                _ => {}
            }
        }

        if in_string || !stack.is_empty() {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Colours strings and highlights the bracket pair next to the cursor.
struct MonkeyHighlighter;

impl Highlighter for MonkeyHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        // (bracket, byte index in `line`, byte offset in `highlighted`)
        let mut stack: Vec<(char, usize, usize)> = Vec::new();
        let mut highlighted = String::with_capacity(line.len());
        let mut in_string = false;
        let at_cursor = |i: usize| i == pos || i + 1 == pos;

        for (i, c) in line.char_indices() {
            if in_string {
                if c == '"' {
                    in_string = false;
                }
                highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // green
                continue;
            }

            match c {
                '"' => {
                    in_string = true;
                    highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c));
                }
                '(' | '[' | '{' => {
                    stack.push((c, i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' | ']' | '}' => match stack.pop() {
                    Some((opening, opening_index, offset)) if closes(opening, c) => {
                        if at_cursor(i) || at_cursor(opening_index) {
                            highlighted.push_str(&format!("\x1b[1;34m{}\x1b[0m", c)); // blue
                            highlighted.replace_range(
                                offset..offset + opening.len_utf8(),
                                &format!("\x1b[1;34m{}\x1b[0m", opening),
                            );
                        } else {
                            highlighted.push(c);
                        }
                    }
                    Some((opening, _, offset)) => {
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // red
                        highlighted.replace_range(
                            offset..offset + opening.len_utf8(),
                            &format!("\x1b[1;31m{}\x1b[0m", opening),
                        );
                    }
                    None => highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)),
                },
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "there".to_string())
}

/// Parses and evaluates one input in the session environment.
fn run(input: &str, env: &Env) {
    let (program, errors) = parse(input);
    if !errors.is_empty() {
        eprint!("{}", MONKEY_FACE);
        eprintln!("Woops! We ran into some monkey business here!");
        eprintln!(" parser errors:");
        for err in &errors {
            if let Err(io_err) = err.pretty_print("repl", input) {
                eprintln!("\t{}", err);
                debug!("could not render parse error: {}", io_err);
            }
        }
        return;
    }

    if let Some(result) = evaluate(&program, env) {
        println!("{}", result.inspect());
    }
}

fn main() -> rustyline::Result<()> {
    env_logger::init();

    println!(
        "Hello {}! This is the Monkey programming language!",
        user_name()
    );
    println!("Feel free to type in commands. Type 'exit' or press Ctrl-D to quit.");

    let env = Environment::new();
    let helper = MonkeyHelper {
        validator: MonkeyValidator,
        highlighter: MonkeyHighlighter,
        completer: MonkeyCompleter::new(env.clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Emacs)
        .auto_add_history(true)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(HISTORY_FILE).is_err() {
        debug!("no previous history in {}", HISTORY_FILE);
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "exit" {
                    break;
                }
                run(input, &env);
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closes() {
        assert!(closes('(', ')'));
        assert!(closes('{', '}'));
        assert!(!closes('[', ')'));
    }

    #[test]
    fn test_highlight_plain_line_unchanged() {
        assert_eq!(MonkeyHighlighter.highlight("let x = 5;", 0), "let x = 5;");
    }

    #[test]
    fn test_completion_candidates() {
        let env = Environment::new();
        env.borrow_mut()
            .define("counter", std::rc::Rc::new(monkey::Object::Integer(1)));
        let candidates = MonkeyCompleter::new(env).candidates();
        for name in ["counter", "len", "push", "let", "return"] {
            assert!(candidates.contains(name), "missing {}", name);
        }
    }
}
