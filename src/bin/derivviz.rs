use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use derivviz::{construct_dfa, parse_regex, visualize, DFA, FA};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Compile a regular expression into a DFA with Brzozowski derivatives, then match strings
/// against it and export or visualize the automaton.
#[derive(Parser, Debug)]
#[command(name = "derivviz", version, about)]
struct Args {
    /// The regular expression. Supports literals, grouping, | and *
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// A string to match against the DFA. May be given several times
    #[arg(short = 'm', long = "match", value_name = "INPUT")]
    inputs: Vec<String>,

    /// A file with one string to match per line
    #[arg(short = 'f', long = "input-file", value_name = "INPUT FILE")]
    input_file: Option<PathBuf>,

    /// Write the Graphviz description of the DFA to this file, - for stdout
    #[arg(long = "dot", value_name = "DOT FILE")]
    dot: Option<PathBuf>,

    /// Print a JSON summary of the DFA states and transitions
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Save the DFA as NAME.dot and render it to NAME.jpg with Graphviz
    #[arg(short = 's', long = "save-dfa", value_name = "NAME")]
    save_dfa: Option<String>,

    /// Visualize the DFA inside an interactive window that allows for zooming, panning and
    /// clicking of elements
    #[arg(short = 'v', long = "visualize")]
    visualize: bool,
}

fn read_input_file(file_path: &Path) -> Result<Vec<String>> {
    let file = File::open(file_path)
        .wrap_err_with(|| format!("Failed to open the input file {}", file_path.display()))?;
    let reader = BufReader::new(file);

    let mut inputs = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.wrap_err_with(|| {
            format!(
                "Failed to read line number {} in {}",
                line_number + 1,
                file_path.display()
            )
        })?;
        inputs.push(line);
    }

    Ok(inputs)
}

/// Write the verdict for every input, then the requested JSON and DOT exports
fn write_report<W: Write>(out: &mut W, args: &Args, dfa: &DFA, inputs: &[String]) -> Result<()> {
    for input in inputs {
        let verdict = if dfa.run(input) { "accept" } else { "reject" };
        writeln!(out, "{}\t{:?}", verdict, input)?;
    }

    if args.json {
        writeln!(out, "{}", dfa.to_json()?)?;
    }

    if let Some(dot_path) = &args.dot {
        let dot = dfa.to_dot(dfa.get_regex())?;
        if dot_path.as_os_str() == "-" {
            write!(out, "{}", dot)?;
        } else {
            fs::write(dot_path, dot)
                .wrap_err_with(|| format!("Failed to write {}", dot_path.display()))?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();

    let regex = parse_regex(&args.pattern)?;
    let dfa = construct_dfa(&regex)?;

    let mut inputs = args.inputs.clone();
    if let Some(input_file) = &args.input_file {
        inputs.extend(read_input_file(input_file)?);
    }

    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_report(&mut out, &args, &dfa, &inputs)?;
    }

    if let Some(name) = &args.save_dfa {
        dfa.show_fa(name)?;
    }

    if args.visualize {
        visualize(&dfa)?;
    }

    Ok(())
}

#[cfg(test)]
mod derivviz_tests {
    use super::*;

    fn get_args(extra: &[&str]) -> Args {
        let mut argv = vec!["derivviz", "(a|b)*abb"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn get_report(args: &Args, inputs: &[&str]) -> String {
        let regex = parse_regex(&args.pattern).unwrap();
        let dfa = construct_dfa(&regex).unwrap();
        let inputs: Vec<String> = inputs.iter().map(|input| input.to_string()).collect();

        let mut out = Vec::new();
        write_report(&mut out, args, &dfa, &inputs).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_verdicts() {
        let args = get_args(&[]);
        let report = get_report(&args, &["abb", "ab"]);
        assert_eq!(report, "accept\t\"abb\"\nreject\t\"ab\"\n");
    }

    #[test]
    fn test_report_dot_to_stdout() {
        let args = get_args(&["--dot", "-"]);
        let report = get_report(&args, &[]);
        assert!(report.starts_with("digraph DFA {"));
        assert!(report.contains("start -> 0;"));
    }

    #[test]
    fn test_report_json() {
        let args = get_args(&["--json"]);
        let report = get_report(&args, &[]);
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["start_state"], 0);
    }
}
