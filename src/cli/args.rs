use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fuzzpilot",
    version,
    about = "ffuf front-end with output classification and reporting",
    long_about = "Fuzzpilot builds an ffuf command from a target and a wordlist, streams ffuf's output, classifies every line by HTTP status or outcome, and writes a timestamped log, a JSON result file and a summary report.\n\nExamples:\n  fuzzpilot -u https://target.tld -w words.txt\n  fuzzpilot -u https://target.tld -w words.txt -X POST -H 'X-Api: 1' --timeout 60\n  fuzzpilot -u https://target.tld -w words.txt -y -- -mc 200,301 -t 50\n\nTip: Use --config to persist settings and --init-config to write a starter file.",
    after_help = "Arguments after -- are passed to ffuf unchanged."
)]
pub struct CliArgs {
    #[arg(
        short = 'u',
        long = "url",
        visible_alias = "target-url",
        value_name = "URL",
        help_heading = "Target",
        help = "Target base URL (http:// or https://). FUZZ is appended unless present."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'w',
        long = "wordlist",
        value_name = "FILE",
        help_heading = "Target",
        help = "Wordlist file passed to ffuf."
    )]
    pub wordlist: Option<String>,

    #[arg(
        short = 'X',
        long = "method",
        value_name = "METHOD",
        help_heading = "Request",
        help = "HTTP method: GET, POST, PUT, DELETE or HEAD (default: GET)."
    )]
    pub method: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        action = ArgAction::Append,
        help_heading = "Request",
        help = "Custom header, e.g. 'X-Api-Key: abc' (repeatable)."
    )]
    pub header: Vec<String>,

    #[arg(
        short = 'b',
        long = "cookie",
        visible_alias = "cookies",
        value_name = "COOKIES",
        help_heading = "Request",
        help = "Cookie header value, e.g. 'session=abc; theme=dark'."
    )]
    pub cookies: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Run",
        help = "Stop ffuf after this many seconds (default: 10)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "bin",
        visible_alias = "ffuf-bin",
        value_name = "PATH",
        help_heading = "Run",
        help = "ffuf executable to launch (default: ffuf from PATH)."
    )]
    pub bin: Option<String>,

    #[arg(
        short = 'y',
        long = "yes",
        help_heading = "Run",
        help = "Start without asking for confirmation."
    )]
    pub yes: bool,

    #[arg(
        long = "rf",
        visible_alias = "result-file",
        value_name = "FILE",
        help_heading = "Output",
        help = "JSON result file (default: ffuf_results.json)."
    )]
    pub result_file: Option<String>,

    #[arg(
        long = "lf",
        visible_alias = "log-file",
        value_name = "FILE",
        help_heading = "Output",
        help = "Timestamped log of ffuf output (default: ffuf_output.log)."
    )]
    pub log_file: Option<String>,

    #[arg(
        long = "rpf",
        visible_alias = "report-file",
        value_name = "FILE",
        help_heading = "Output",
        help = "Summary report file (default: ffuf_summary_report.txt)."
    )]
    pub report_file: Option<String>,

    #[arg(
        short = 'q',
        long = "quiet",
        help_heading = "Output",
        help = "Do not echo ffuf output lines to the console."
    )]
    pub quiet: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Config",
        help = "Path to config file (defaults to ~/.fuzzpilot/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Config",
        help = "Write a starter config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        value_name = "FFUF_ARGS",
        last = true,
        help = "Extra arguments passed to ffuf unchanged (after --)."
    )]
    pub extra_args: Vec<String>,
}
