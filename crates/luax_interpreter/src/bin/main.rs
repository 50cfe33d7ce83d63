use std::env;
use std::io::{self, BufRead, Read, Write};
use std::process::ExitCode;

use luax::LuaState;

const VERSION: &str = "luax 0.1 (Lua 5.4)";

fn print_usage() {
    eprintln!("usage: luax [options] [script]");
    eprintln!("Available options are:");
    eprintln!("  -e stat   execute string 'stat'");
    eprintln!("  -i        enter interactive mode after executing 'script'");
    eprintln!("  -v        show version information");
    eprintln!("  --        stop handling options");
    eprintln!("  -         stop handling options and execute stdin");
}

#[derive(Default)]
struct Options {
    execute_strings: Vec<String>,
    interactive: bool,
    script_file: Option<String>,
    script_args: Vec<String>,
    show_version: bool,
    read_stdin: bool,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut i = 1;
    let mut stop_options = false;

    while i < args.len() {
        let arg = &args[i];

        if !stop_options && arg.starts_with('-') {
            match arg.as_str() {
                "-e" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("'-e' needs argument".to_string());
                    }
                    opts.execute_strings.push(args[i].clone());
                }
                "-i" => {
                    opts.interactive = true;
                }
                "-v" => {
                    opts.show_version = true;
                }
                "--" => {
                    stop_options = true;
                }
                "-" => {
                    opts.read_stdin = true;
                    stop_options = true;
                }
                _ => {
                    return Err(format!("unrecognized option '{}'", arg));
                }
            }
        } else {
            // First non-option argument is the script file; the rest belong
            // to the script
            opts.script_file = Some(arg.clone());
            i += 1;
            while i < args.len() {
                opts.script_args.push(args[i].clone());
                i += 1;
            }
            break;
        }
        i += 1;
    }

    Ok(opts)
}

fn lua_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\0' => quoted.push_str("\\000"),
            ch => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

// Build the script-facing arg table: arg[0] = script name, arg[1..] = args
fn setup_arg_table(state: &mut LuaState, script: &str, args: &[String]) -> luax::LuaResult<()> {
    let mut chunk = String::from("arg = { ");
    chunk.push_str(&format!("[0] = {}", lua_quote(script)));
    for (i, value) in args.iter().enumerate() {
        chunk.push_str(&format!(", [{}] = {}", i + 1, lua_quote(value)));
    }
    chunk.push_str(" }");
    state.parse_line(&chunk)
}

fn report(state: &LuaState) {
    eprintln!("luax: {}", state.last_error());
}

fn run_repl(state: &mut LuaState) {
    println!("{}", VERSION);
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if state.parse_line(line).is_err() {
            report(state);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("LUAX_LOG"))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("luax: {}", msg);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if opts.show_version {
        println!("{}", VERSION);
        if opts.execute_strings.is_empty()
            && opts.script_file.is_none()
            && !opts.interactive
            && !opts.read_stdin
        {
            return ExitCode::SUCCESS;
        }
    }

    let mut state = match LuaState::new() {
        Ok(state) => state,
        Err(err) => {
            eprintln!("luax: {}", err);
            return ExitCode::FAILURE;
        }
    };

    for stat in &opts.execute_strings {
        if state.parse_line(stat).is_err() {
            report(&state);
            return ExitCode::FAILURE;
        }
    }

    if let Some(script) = &opts.script_file {
        if setup_arg_table(&mut state, script, &opts.script_args).is_err() {
            report(&state);
            return ExitCode::FAILURE;
        }
        if state.parse_file(script).is_err() {
            report(&state);
            return ExitCode::FAILURE;
        }
        // Discard any top-level results the script returned
        let top = state.get_top();
        state.pop(top);
    }

    if opts.read_stdin {
        let mut source = String::new();
        if io::stdin().lock().read_to_string(&mut source).is_err() {
            eprintln!("luax: cannot read stdin");
            return ExitCode::FAILURE;
        }
        if state.parse_line(&source).is_err() {
            report(&state);
            return ExitCode::FAILURE;
        }
    }

    let ran_something =
        !opts.execute_strings.is_empty() || opts.script_file.is_some() || opts.read_stdin;
    if opts.interactive || (!ran_something && !opts.show_version) {
        run_repl(&mut state);
    }

    ExitCode::SUCCESS
}
