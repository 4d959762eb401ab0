use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "vcat")]
#[command(author = "YAVC: Yet Another Verbose Cat")]
#[command(version = "0.1.0")]
#[command(about = "cat with a visual progress bar", long_about = None)]
pub struct Cli {
    /// File(s) to copy to standard output ("-" reads standard input)
    #[arg(required = true)]
    pub files: Vec<String>,
}
