use ariadne::Source;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::io::{self, IsTerminal, Read};
use step_engine::{DebugInfo, Registry, StepEngine, StepHistory, StepRequest, StepStatus};
use step_parser::parser::{error::Error as ParseError, expr::Expr, Parser};

/// Reports a parse error to stderr.
///
/// The `ariadne` crate's [`Report`](ariadne::Report) type does not have a `Display`
/// implementation, so we can only use its `eprint` method to print to stderr.
fn report_parse_error(input: &str, error: ParseError) {
    error.build_report().eprint(("input", Source::from(input))).unwrap();
}

/// The interactive state: the engine, the working expression, and the session history.
struct Session {
    engine: StepEngine,
    history: StepHistory,
    expression: Option<String>,
    policy: String,
}

impl Session {
    fn new() -> Self {
        Self {
            engine: StepEngine::new(Registry::builtin()),
            history: StepHistory::new(),
            expression: None,
            policy: String::from("student"),
        }
    }

    /// Parses the input as a new working expression, resetting the session history.
    fn load_expression(&mut self, input: &str) {
        match Parser::new(input).try_parse_full::<Expr>() {
            Ok(tree) => {
                let expression = tree.to_string();
                println!("{}", expression);
                self.expression = Some(expression);
                self.history = StepHistory::new();
            },
            Err(error) => report_parse_error(input, error),
        }
    }

    /// Applies one step to the working expression.
    fn step(&mut self, selection: Option<&str>, preferred: Option<&str>) {
        let Some(expression) = self.expression.clone() else {
            println!("enter an expression first");
            return;
        };

        let mut request = StepRequest {
            expression,
            policy_name: self.policy.clone(),
            preferred_primitive_id: preferred.map(str::to_owned),
            ..StepRequest::default()
        };
        match selection {
            Some(selection) if selection.starts_with('@') => {
                match selection[1..].parse::<usize>() {
                    Ok(index) => request.operator_index = Some(index),
                    Err(_) => {
                        println!("usage: step @<operator-index> or step <path>");
                        return;
                    },
                }
            },
            Some(selection) => request.selection_path = Some(selection.to_owned()),
            None => (),
        }

        let response = self.engine.run_step(&mut self.history, &request);
        match response.status {
            StepStatus::StepApplied => {
                let new_expression = response.new_expression.unwrap();
                println!("=> {}", new_expression);
                self.expression = Some(new_expression);
            },
            StepStatus::NoCandidates => match response.debug {
                Some(DebugInfo::InvalidPrimitiveId { invalid_id }) => {
                    println!("no step: a candidate references the unknown primitive `{}`", invalid_id);
                },
                _ => println!("no step applies here"),
            },
            StepStatus::EngineError => match response.debug {
                Some(DebugInfo::ParseFailure { error }) => report_parse_error(&request.expression, error),
                Some(DebugInfo::ExecutorFailure { error }) => println!("step failed: {}", error),
                Some(DebugInfo::UnknownPolicy { name }) => println!("unknown policy `{}`", name),
                _ => println!("step failed"),
            },
            StepStatus::Choice => println!("several steps apply; pick one with a selection"),
        }
    }

    /// Undoes the most recent step.
    fn undo(&mut self) {
        match self.engine.undo(&mut self.history) {
            Some(expression) => {
                println!("=> {}", expression);
                self.expression = Some(expression);
            },
            None => println!("nothing to undo"),
        }
    }

    /// Prints the rule catalog.
    fn rules(&self) {
        for set in self.engine.registry().get_all_invariant_sets() {
            println!("{} - {}", set.id, set.description);
            for rule in set.rules {
                println!("  {} ({})", rule.id, rule.primitive_ids.join(", "));
            }
        }
    }

    /// Processes one line of input: a command, or a new expression.
    fn process(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(command, rest)| (command, rest.trim()))
            .unwrap_or((line, ""));

        match command {
            "step" => self.step(if rest.is_empty() { None } else { Some(rest) }, None),
            "prefer" => {
                if rest.is_empty() {
                    println!("usage: prefer <primitive-id>");
                } else {
                    self.step(None, Some(rest));
                }
            },
            "undo" => self.undo(),
            "policy" => match rest {
                "student" | "teacher" => self.policy = rest.to_owned(),
                _ => println!("policies: student, teacher"),
            },
            "rules" => self.rules(),
            "show" => match &self.expression {
                Some(expression) => println!("{}", expression),
                None => println!("no expression loaded"),
            },
            _ => self.load_expression(line),
        }
    }
}

fn main() {
    let mut session = Session::new();

    if !io::stdin().is_terminal() {
        // read commands from stdin, one per line
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).unwrap();
        for line in input.lines() {
            session.process(line);
        }
        return;
    }

    // run the repl / interactive mode
    let mut rl = DefaultEditor::new().unwrap();

    fn process_line(rl: &mut DefaultEditor, session: &mut Session) -> Result<(), ReadlineError> {
        let input = rl.readline("> ")?;
        if input.trim().is_empty() {
            return Ok(());
        }

        rl.add_history_entry(&input)?;

        session.process(&input);
        Ok(())
    }

    loop {
        if let Err(err) = process_line(&mut rl, &mut session) {
            match err {
                ReadlineError::Eof | ReadlineError::Interrupted => (),
                _ => eprintln!("{}", err),
            }
            break;
        }
    }
}
