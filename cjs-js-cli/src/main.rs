use cjs_js::analyze_exports;
use cjs_js::rewrite_requires;
use clap::Parser;
use clap::Subcommand;
use std::fs::File;
use std::io::stdin;
use std::io::stdout;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "cjs-js", about = "CommonJS export analysis and require hoisting")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the names a CommonJS module exports, as a JSON array.
  Exports {
    /// File to analyze; omit for stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,
  },
  /// Hoist require-style calls into static imports.
  Requires {
    /// File to rewrite; omit for stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output destination; omit for stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path prefix a call's string argument must start with.
    #[arg(short, long, default_value = "/node_modules/")]
    prefix: String,
  },
}

fn exit_with_error(message: String) -> ! {
  eprintln!("{}", message);
  process::exit(1);
}

fn read_source(input: Option<&PathBuf>) -> (String, String) {
  let name = input
    .map(|p| p.to_string_lossy().into_owned())
    .unwrap_or_else(|| "<stdin>".to_string());
  let mut buf = Vec::new();
  let mut file: Box<dyn Read> = match input {
    Some(p) => match File::open(p) {
      Ok(f) => Box::new(f),
      Err(err) => exit_with_error(format!("failed to open {}: {err}", p.display())),
    },
    None => Box::new(stdin()),
  };
  if let Err(err) = file.read_to_end(&mut buf) {
    exit_with_error(format!("failed to read input: {err}"));
  }
  match String::from_utf8(buf) {
    Ok(source) => (name, source),
    Err(err) => exit_with_error(format!("input is not valid UTF-8: {err}")),
  }
}

fn main() {
  let args = Cli::parse();
  match args.command {
    Command::Exports { input } => {
      let (name, source) = read_source(input.as_ref());
      let exports = match analyze_exports(&name, &source) {
        Ok(exports) => exports,
        Err(err) => exit_with_error(err.to_string()),
      };
      let mut rendered = match serde_json::to_string(&exports) {
        Ok(rendered) => rendered,
        Err(err) => exit_with_error(format!("failed to render output: {err}")),
      };
      rendered.push('\n');
      if let Err(err) = stdout().write_all(rendered.as_bytes()) {
        exit_with_error(format!("failed to write output: {err}"));
      }
    }
    Command::Requires {
      input,
      output,
      prefix,
    } => {
      let (name, source) = read_source(input.as_ref());
      let rewritten = match rewrite_requires(&name, &prefix, &source) {
        Ok(rewritten) => rewritten,
        Err(err) => exit_with_error(err.to_string()),
      };
      let write_result = match output.as_ref() {
        Some(p) => File::create(p)
          .and_then(|mut file| file.write_all(rewritten.as_bytes()))
          .map_err(|err| (p.display().to_string(), err)),
        None => stdout()
          .write_all(rewritten.as_bytes())
          .map_err(|err| ("<stdout>".to_string(), err)),
      };
      if let Err((dest, err)) = write_result {
        exit_with_error(format!("failed to write {dest}: {err}"));
      }
    }
  }
}
