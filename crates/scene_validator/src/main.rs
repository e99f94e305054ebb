use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use scene_graph::{run, OutputFormat, FAILED_MESSAGE};
use scene_validator::{
    diagnostic_stream, exit_code, parse_args, usage_text, CliCommand, DiagnosticStream,
    EXIT_USAGE,
};
use tracing::debug;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let config = match parse_args(&args, |key| env::var(key).ok()) {
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return ExitCode::SUCCESS;
        }
        Ok(CliCommand::Validate(config)) => config,
        Err(err) => {
            eprintln!("{err}\n\n{}", usage_text());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let stream = diagnostic_stream(config.format);
    init_tracing(stream);

    let result = run(&config, &mut io::stdout());
    if let Err(err) = &result {
        debug!(error = %err, "scene_validation_aborted");
        let message = format!("ERROR: {err}");
        match stream {
            DiagnosticStream::Stdout => println!("{message}"),
            DiagnosticStream::Stderr => eprintln!("{message}"),
        }
        if config.format == OutputFormat::Text {
            println!("\n{FAILED_MESSAGE}");
        }
    }
    ExitCode::from(exit_code(&result))
}

fn init_tracing(stream: DiagnosticStream) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, ansi) = match stream {
        DiagnosticStream::Stdout => (BoxMakeWriter::new(io::stdout), io::stdout().is_terminal()),
        DiagnosticStream::Stderr => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
        .init();
}
