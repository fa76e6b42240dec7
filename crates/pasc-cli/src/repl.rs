//! Interactive REPL: accumulates lines until one ends in `.`, then runs
//! the buffered text as a whole program through the same pipeline a
//! source file would go through. One `Evaluator` persists across turns,
//! so `VAR`-declared globals survive between statements the way
//! spec.md's anti-global-mutable-state design calls for: the state
//! lives in this one instance, not behind a `static`.

use std::io::{self, BufRead, Write};

use pasc_eval::Evaluator;
use pasc_lex::Lexer;
use pasc_par::Parser;
use pasc_sem::SemanticAnalyzer;
use pasc_util::Handler;

use crate::config::Config;
use crate::error::CliError;

const PROMPT: &str = "pasc> ";
const CONTINUATION_PROMPT: &str = "....> ";

pub fn run(config: &Config) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut eval = Evaluator::new().with_max_call_depth(config.max_call_depth);
    let mut buffer = String::new();

    loop {
        write!(stdout, "{}", if buffer.is_empty() { PROMPT } else { CONTINUATION_PROMPT })?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let trimmed = line.trim_end();

        if buffer.is_empty() {
            match trimmed.trim() {
                "exit" | "quit" => break,
                "help" => {
                    print_help(&mut stdout)?;
                    continue;
                }
                "show" => {
                    print_globals(&mut stdout, &eval)?;
                    continue;
                }
                "clear" => {
                    eval = Evaluator::new().with_max_call_depth(config.max_call_depth);
                    writeln!(stdout, "global environment cleared")?;
                    continue;
                }
                "" => continue,
                _ => {}
            }
        }

        buffer.push_str(trimmed);
        buffer.push('\n');

        if trimmed.ends_with('.') {
            match run_statement(&buffer, &mut eval) {
                Ok(()) => {}
                Err(err) => writeln!(stdout, "{}", err.render())?,
            }
            buffer.clear();
        }
    }

    Ok(())
}

fn run_statement(source: &str, eval: &mut Evaluator) -> Result<(), CliError> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    let handler = Handler::new();
    SemanticAnalyzer::new(&handler).analyze(&program)?;
    eval.interpret(&program)?;
    Ok(())
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "commands: show (dump globals), clear (reset globals), help, exit/quit\n\
         otherwise, type a PROGRAM ... END. and it runs when the line ends in '.'"
    )
}

fn print_globals(out: &mut impl Write, eval: &Evaluator) -> io::Result<()> {
    let mut vars: Vec<_> = eval.globals().collect();
    vars.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in vars {
        writeln!(out, "{name} = {value}")?;
    }
    Ok(())
}
