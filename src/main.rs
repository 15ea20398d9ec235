use std::io::BufRead;
use std::io::Write;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use miette::IntoDiagnostic;
use miette::WrapErr;
use numeric::CompileError;
use numeric::Compiler;
use numeric::CompilerOptions;
use numeric::FixedLocale;
use numeric::Reply;
use numeric::Session;
use numeric::Solution;
use numeric::UnitSystem;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate length expressions such as `5m + 3ft`")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Unit system results are shown in.
    #[arg(long, value_enum, default_value_t = System::Metric, global = true)]
    system: System,

    /// Show imperial results as decimals instead of fractions.
    #[arg(long, global = true)]
    no_fractions: bool,

    /// Allow metric results in centimeters.
    #[arg(long, global = true)]
    centimeters: bool,

    /// Allow imperial results in yards.
    #[arg(long, global = true)]
    yards: bool,

    /// Decimal separator to accept instead of the one from the environment.
    #[arg(long, global = true)]
    decimal_point: Option<char>,

    /// Print debug events of the given compilation stages to stderr.
    #[arg(long = "trace", value_enum, global = true)]
    trace: Vec<TraceEvent>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the tokens of an expression.
    Tokenize { expression: String },
    /// Print an expression in reverse Polish notation.
    Rpn { expression: String },
    /// Evaluate expressions; each continues in the unit of the one before.
    Eval { expressions: Vec<String> },
    /// Read expressions from stdin, one per line.
    Repl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum System {
    Generic,
    Metric,
    Imperial,
}

impl From<System> for UnitSystem {
    fn from(system: System) -> Self {
        match system {
            System::Generic => UnitSystem::Generic,
            System::Metric => UnitSystem::Metric,
            System::Imperial => UnitSystem::Imperial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TraceEvent {
    /// Tokens as they are produced.
    Tokenize,
    /// The RPN form of each expression.
    Parse,
    /// Evaluated and normalized results.
    Solve,
}

impl TraceEvent {
    fn target(self) -> &'static str {
        match self {
            TraceEvent::Tokenize => "tokenize",
            TraceEvent::Parse => "parse",
            TraceEvent::Solve => "solve",
        }
    }
}

fn init_tracing(events: &[TraceEvent]) {
    let filter = Targets::new()
        .with_default(LevelFilter::INFO)
        .with_targets(events.iter().map(|event| (event.target(), tracing::Level::TRACE)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(filter);

    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        eprintln!("warning: failed to initialize tracing.");
    }
}

impl Args {
    fn compiler(&self) -> Compiler {
        let options = CompilerOptions {
            imperial_fractions: !self.no_fractions,
            centimeters: self.centimeters,
            yards: self.yards,
        };
        let mut compiler = Compiler::with_options(options);
        if let Some(decimal_point) = self.decimal_point {
            compiler = compiler.with_locale(FixedLocale(decimal_point));
        }
        compiler.set_output_system(self.system.into());
        compiler
    }
}

fn report(error: CompileError, expression: &str) -> miette::Report {
    miette::Report::new(error).with_source_code(expression.to_string())
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_tracing(&args.trace);
    let compiler = args.compiler();

    match &args.command {
        Commands::Tokenize { expression } => {
            let tokens = compiler.parse(expression).map_err(|e| report(e, expression))?;
            for token in tokens {
                println!("{token}");
            }
        }
        Commands::Rpn { expression } => {
            let rpn = compiler
                .parse(expression)
                .and_then(|tokens| compiler.rpn(&tokens).map(|rpn| rpn.to_string()))
                .map_err(|e| report(e, expression))?;
            println!("{rpn}");
        }
        Commands::Eval { expressions } => {
            let mut previous: Option<Solution> = None;
            for expression in expressions {
                let solution = compiler
                    .eval(expression, previous.as_ref())
                    .map_err(|e| report(e, expression))?;
                println!("{}", compiler.format(&solution));
                previous = Some(solution);
            }
        }
        Commands::Repl => repl(Session::new(compiler))?,
    }
    Ok(())
}

fn repl(mut session: Session) -> miette::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        write!(stdout, "{}> ", session.compiler().output_system())
            .into_diagnostic()
            .wrap_err("writing prompt failed")?;
        stdout.flush().into_diagnostic().wrap_err("writing prompt failed")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .into_diagnostic()
            .wrap_err("reading stdin failed")?;
        if read == 0 {
            writeln!(stdout).into_diagnostic()?;
            return Ok(());
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match session.handle(line) {
            Ok(Reply::SystemChanged(system)) => println!("System units were set to {system}"),
            Ok(Reply::Shows(text)) => println!("{text}"),
            Err(e) => eprintln!("{:?}", report(e, line)),
        }
    }
}
