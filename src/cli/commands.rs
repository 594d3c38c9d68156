use crate::model::Language;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Evidence-backed market validation for product ideas
#[derive(Parser, Debug)]
#[command(
    name = "ideacheck",
    about = "Evidence-backed market validation for product ideas",
    version,
    author,
    long_about = "ideacheck drafts a market snapshot and behavioral hypotheses for an idea, \
                  researches evidence for them and for eight market signals using web search, \
                  and synthesises conflicts, gaps and next steps into a JSON report."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run a market validation for an idea",
        long_about = "Runs the four validation stages against the configured completion service \
                      and prints the JSON report.\n\n\
                      Examples:\n  \
                      ideacheck validate --title \"Pet-sitting marketplace\" --tag pets --tag marketplace\n  \
                      ideacheck validate --idea-file idea.json --language es --output report.json"
    )]
    Validate(ValidateArgs),

    #[command(about = "Show the effective configuration")]
    Config,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(
        short = 't',
        long,
        required_unless_present = "idea_file",
        help = "Idea title"
    )]
    pub title: Option<String>,

    #[arg(short = 'd', long, help = "Longer idea description")]
    pub description: Option<String>,

    #[arg(long = "tag", value_name = "TAG", help = "Idea tag (repeatable)")]
    pub tags: Vec<String>,

    #[arg(
        short = 'l',
        long,
        default_value = "en",
        value_parser = parse_language,
        help = "Language of the report text (en|es)"
    )]
    pub language: Language,

    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["title", "description", "tags"],
        help = "Read the idea from a JSON file with title, description and tags"
    )]
    pub idea_file: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the report to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Emit compact JSON instead of pretty-printed")]
    pub compact: bool,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_validate_with_title_and_tags() {
        let args = CliArgs::parse_from([
            "ideacheck",
            "validate",
            "--title",
            "Pet-sitting marketplace",
            "--tag",
            "pets",
            "--tag",
            "marketplace",
        ]);
        match args.command {
            Commands::Validate(validate) => {
                assert_eq!(validate.title.as_deref(), Some("Pet-sitting marketplace"));
                assert_eq!(validate.tags, vec!["pets", "marketplace"]);
                assert_eq!(validate.language, Language::En);
                assert!(validate.idea_file.is_none());
                assert!(!validate.compact);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_validate_with_options() {
        let args = CliArgs::parse_from([
            "ideacheck",
            "validate",
            "--idea-file",
            "idea.json",
            "--language",
            "es",
            "--output",
            "report.json",
            "--compact",
        ]);
        match args.command {
            Commands::Validate(validate) => {
                assert_eq!(validate.idea_file, Some(PathBuf::from("idea.json")));
                assert_eq!(validate.language, Language::Es);
                assert_eq!(validate.output, Some(PathBuf::from("report.json")));
                assert!(validate.compact);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_validate_requires_an_idea() {
        assert!(CliArgs::try_parse_from(["ideacheck", "validate"]).is_err());
    }

    #[test]
    fn test_invalid_language_rejected() {
        let result =
            CliArgs::try_parse_from(["ideacheck", "validate", "--title", "x", "--language", "fr"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["ideacheck", "-v", "config"]);
        assert!(args.verbose);
        assert!(!args.quiet);
        assert!(matches!(args.command, Commands::Config));

        let args = CliArgs::parse_from(["ideacheck", "--log-level", "debug", "config"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
