use clap::Parser;
use scan_js::scan;
use std::fs::File;
use std::io::stdin;
use std::io::stdout;
use std::io::Read;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "scan-js", about = "JavaScript/TypeScript module-dependency scanner")]
struct Cli {
  /// File to scan; omit for stdin.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Logical path used for dialect selection when reading from stdin
  /// (e.g. `component.tsx` to enable JSX handling).
  #[arg(long, default_value = "stdin.js")]
  path: String,

  /// Pretty-print the JSON output.
  #[arg(long)]
  pretty: bool,
}

fn main() {
  let args = Cli::parse();
  let file_path = args
    .input
    .as_ref()
    .map(|p| p.to_string_lossy().into_owned())
    .unwrap_or(args.path);
  let mut source = Vec::new();
  let read_result = match args.input.as_ref() {
    Some(p) => File::open(p).and_then(|mut f| f.read_to_end(&mut source)),
    None => stdin().read_to_end(&mut source),
  };
  if let Err(err) = read_result {
    eprintln!("{}: {}", file_path, err);
    process::exit(1);
  }
  let source_str = match std::str::from_utf8(&source) {
    Ok(source_str) => source_str,
    Err(err) => {
      eprintln!("{}: input is not valid UTF-8: {}", file_path, err);
      process::exit(1);
    }
  };
  match scan(source_str, &file_path) {
    Ok(output) => {
      if args.pretty {
        serde_json::to_writer_pretty(stdout(), &output).expect("write to stdout");
      } else {
        serde_json::to_writer(stdout(), &output).expect("write to stdout");
      }
      println!();
    }
    Err(error) => {
      eprintln!("{}: {}", file_path, error);
      process::exit(1);
    }
  }
}
