// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::result::Result as StdResult;

use clap::{Parser, Subcommand};
use log::debug;

use exprgen::ast::DEFAULT_TYPE;
use exprgen::codegen::{Container, Statement, Statements};
use exprgen::transform::NamedNode;
use exprgen::{Frontend, Grammar};

const EXIT_FAILURE: i32 = 1;

macro_rules! die(
    ($($arg:tt)*) => { {
        eprintln!($($arg)*);
        std::process::exit(EXIT_FAILURE)
    } }
);

type CliResult<T> = StdResult<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "exprgen",
    version,
    about = "Tokenize, parse and emit algebraic expressions"
)]
struct Args {
    /// Grammar file to use instead of the built-in grammar.
    #[arg(long, global = true)]
    grammar: Option<PathBuf>,

    /// Label that whole expressions are parsed as.
    #[arg(long, global = true, default_value = "start")]
    start: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print each token as `TAG "text"`.
    Tokens {
        #[arg(long)]
        json: bool,
        /// Expression to read; one per line from stdin when omitted.
        expr: Option<String>,
    },
    /// Print the first parse tree.
    Tree {
        /// Print every parse, not just the first.
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
        expr: Option<String>,
    },
    /// Print the synthesized expression, emitted and in debug form.
    Ast { expr: Option<String> },
    /// Emit a function returning the expression.
    Function {
        #[arg(long, default_value = "g")]
        name: String,
        #[arg(long, default_value = DEFAULT_TYPE)]
        return_type: String,
        expr: Option<String>,
    },
}

impl Command {
    fn expr(&self) -> Option<&str> {
        match self {
            Command::Tokens { expr, .. }
            | Command::Tree { expr, .. }
            | Command::Ast { expr }
            | Command::Function { expr, .. } => expr.as_deref(),
        }
    }
}

fn load_frontend(args: &Args) -> CliResult<Frontend> {
    let grammar = match args.grammar {
        Some(ref path) => {
            let text = fs::read_to_string(path)?;
            Grammar::compile(&text)?
        }
        None => Grammar::default(),
    };
    debug!("{} grammar rules", grammar.rules().len());
    Ok(Frontend::new(grammar, &args.start))
}

fn run(frontend: &Frontend, command: &Command, input: &str) -> CliResult<String> {
    let tokens = frontend.tokens(input)?;
    let output = match command {
        Command::Tokens { json: true, .. } => serde_json::to_string_pretty(&tokens)?,
        Command::Tokens { json: false, .. } => tokens
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Tree { all, json, .. } => {
            let trees = if *all {
                frontend.all_trees(&tokens)?
            } else {
                vec![frontend.first_tree(&tokens)?]
            };
            if *json {
                let named: Vec<NamedNode> = trees
                    .iter()
                    .map(|tree| NamedNode::new(frontend.grammar(), &tokens, tree))
                    .collect();
                if *all {
                    serde_json::to_string_pretty(&named)?
                } else {
                    serde_json::to_string_pretty(&named[0])?
                }
            } else {
                trees
                    .iter()
                    .map(|tree| frontend.print_tree(&tokens, tree))
                    .collect::<Vec<_>>()
                    .join("\n\n")
            }
        }
        Command::Ast { .. } => {
            let tree = frontend.first_tree(&tokens)?;
            let value = frontend.synthesize(&tokens, &tree)?;
            format!("{value}\n{value:?}")
        }
        Command::Function {
            name,
            return_type,
            ..
        } => {
            let tree = frontend.first_tree(&tokens)?;
            let value = frontend.synthesize(&tokens, &tree)?;
            let function = Container::function(
                return_type,
                name,
                vec![],
                vec![Statement::returns(value)],
            );
            Statements(vec![function.into()]).to_string()
        }
    };
    Ok(output)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let frontend = match load_frontend(&args) {
        Ok(frontend) => frontend,
        Err(err) => die!("error: {err}"),
    };

    let inputs: Vec<String> = match args.command.expr() {
        Some(expr) => vec![expr.to_owned()],
        None => {
            let stdin = io::stdin();
            let mut lines = vec![];
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => {}
                    Ok(line) => lines.push(line),
                    Err(err) => die!("error: reading stdin: {err}"),
                }
            }
            lines
        }
    };

    let mut failed = false;
    for input in inputs.iter() {
        match run(&frontend, &args.command, input) {
            Ok(output) => println!("{}", output.trim_end()),
            Err(err) => {
                eprintln!("error: {input:?}: {err}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(EXIT_FAILURE);
    }
}
