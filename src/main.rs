use anyhow::Result;
use clap::Parser;
use folioai::{
    ClientError, commands,
    config::Settings,
    operations::{
        BioContext, Experience, ExperienceLevel, ProjectInput, TargetLength, Tone, UserProfile,
    },
};
use std::path::PathBuf;
use std::process::ExitCode;

/// folioai - portfolio AI assistant
///
/// Calls the portfolio AI service to enhance bios, optimize project write-ups
/// and recommend templates. Results are printed as JSON.
///
/// Settings are read from <config dir>/folioai/config.json, then from
/// FOLIOAI_* environment variables, then from the flags below.
#[derive(Parser, Debug)]
#[command(author, version = env!("FOLIOAI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the AI service
    #[arg(long = "api-url", env = "FOLIOAI_API_URL", value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, env = "FOLIOAI_TOKEN", value_name = "TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long = "timeout-ms", env = "FOLIOAI_TIMEOUT_MS", value_name = "MS", global = true)]
    timeout_ms: Option<u64>,

    /// Total attempts per operation
    #[arg(long = "max-retries", env = "FOLIOAI_MAX_RETRIES", value_name = "N", global = true)]
    max_retries: Option<u32>,

    /// Settings file (defaults to <config dir>/folioai/config.json)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Rewrite a bio
    EnhanceBio(EnhanceBioArgs),

    /// Improve a project description
    OptimizeProject(ProjectArgs),

    /// Recommend a portfolio template for a profile
    RecommendTemplate(ProfileArgs),

    /// List available templates
    Templates,

    /// Show past enhancements
    History,

    /// Run a JSON file of operations as one batch
    Batch(BatchArgs),
}

#[derive(clap::Args, Debug)]
struct EnhanceBioArgs {
    /// The bio text to enhance
    #[arg(long)]
    bio: String,

    /// Professional title
    #[arg(long, default_value = "")]
    title: String,

    /// Skill to highlight (repeatable)
    #[arg(long = "skill", value_name = "SKILL")]
    skills: Vec<String>,

    /// Prior position as COMPANY:POSITION:YEARS (repeatable)
    #[arg(long = "experience", value_name = "COMPANY:POSITION:YEARS", value_parser = parse_experience)]
    experience: Vec<Experience>,

    #[arg(long)]
    industry: Option<String>,

    #[arg(long, value_enum, default_value_t = ToneArg::Professional)]
    tone: ToneArg,

    #[arg(long, value_enum, default_value_t = LengthArg::Detailed)]
    length: LengthArg,
}

#[derive(clap::Args, Debug)]
struct ProjectArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    description: String,

    /// Technology used (repeatable)
    #[arg(long = "tech", value_name = "TECH")]
    technologies: Vec<String>,

    #[arg(long)]
    industry: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    title: String,

    /// Skill (repeatable)
    #[arg(long = "skill", value_name = "SKILL")]
    skills: Vec<String>,

    #[arg(long = "project-count", default_value_t = 0)]
    project_count: u32,

    #[arg(long = "has-design-work")]
    has_design_work: bool,

    #[arg(long)]
    industry: Option<String>,

    #[arg(long = "level", value_enum, default_value_t = LevelArg::Mid)]
    level: LevelArg,
}

#[derive(clap::Args, Debug)]
struct BatchArgs {
    /// JSON array of operations, each tagged with "type"
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ToneArg {
    Professional,
    Casual,
    Creative,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LengthArg {
    Concise,
    Detailed,
    Comprehensive,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LevelArg {
    Entry,
    Mid,
    Senior,
    Lead,
}

impl From<ToneArg> for Tone {
    fn from(arg: ToneArg) -> Self {
        match arg {
            ToneArg::Professional => Tone::Professional,
            ToneArg::Casual => Tone::Casual,
            ToneArg::Creative => Tone::Creative,
        }
    }
}

impl From<LengthArg> for TargetLength {
    fn from(arg: LengthArg) -> Self {
        match arg {
            LengthArg::Concise => TargetLength::Concise,
            LengthArg::Detailed => TargetLength::Detailed,
            LengthArg::Comprehensive => TargetLength::Comprehensive,
        }
    }
}

impl From<LevelArg> for ExperienceLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Entry => ExperienceLevel::Entry,
            LevelArg::Mid => ExperienceLevel::Mid,
            LevelArg::Senior => ExperienceLevel::Senior,
            LevelArg::Lead => ExperienceLevel::Lead,
        }
    }
}

fn parse_experience(s: &str) -> Result<Experience, String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [company, position, years] if !company.is_empty() && !position.is_empty() => {
            let years_experience = years
                .parse()
                .map_err(|_| format!("Invalid years '{}' in '{}'", years, s))?;
            Ok(Experience {
                company: company.to_string(),
                position: position.to_string(),
                years_experience,
            })
        }
        _ => Err(format!("Expected COMPANY:POSITION:YEARS, got '{}'", s)),
    }
}

async fn run(cli: Cli) -> Result<String> {
    let overrides = Settings {
        api_url: cli.api_url,
        token: cli.token,
        timeout_ms: cli.timeout_ms,
        max_retries: cli.max_retries,
    };
    let client = commands::build_client(overrides, cli.config.as_deref())?;

    match cli.command {
        Commands::EnhanceBio(args) => {
            let context = BioContext {
                title: args.title,
                skills: args.skills,
                experience: args.experience,
                industry: args.industry,
                tone: args.tone.into(),
                target_length: args.length.into(),
            };
            commands::enhance_bio(&client, &args.bio, &context).await
        }
        Commands::OptimizeProject(args) => {
            let project = ProjectInput {
                title: args.title,
                description: args.description,
                technologies: args.technologies,
                industry: args.industry,
            };
            commands::optimize_project(&client, &project).await
        }
        Commands::RecommendTemplate(args) => {
            let profile = UserProfile {
                title: args.title,
                skills: args.skills,
                project_count: args.project_count,
                has_design_work: args.has_design_work,
                industry: args.industry,
                experience_level: args.level.into(),
            };
            commands::recommend_template(&client, &profile).await
        }
        Commands::Templates => commands::templates(&client).await,
        Commands::History => commands::history(&client).await,
        Commands::Batch(args) => commands::batch(&client, &args.file).await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            match e.downcast_ref::<ClientError>() {
                Some(client_error) => eprintln!("{}", serde_json::to_string_pretty(client_error)?),
                None => eprintln!("Error: {:#}", e),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_enhance_bio_parsing() {
        let cli = Cli::try_parse_from([
            "folioai",
            "enhance-bio",
            "--bio",
            "I write code",
            "--skill",
            "Rust",
            "--skill",
            "Go",
            "--experience",
            "Acme:Engineer:3",
            "--tone",
            "casual",
        ])
        .unwrap();
        match cli.command {
            Commands::EnhanceBio(args) => {
                assert_eq!(args.bio, "I write code");
                assert_eq!(args.skills, vec!["Rust", "Go"]);
                assert_eq!(args.experience[0].company, "Acme");
                assert_eq!(args.experience[0].years_experience, 3);
                assert_eq!(args.tone, ToneArg::Casual);
                assert_eq!(args.length, LengthArg::Detailed);
            }
            _ => panic!("Expected EnhanceBio command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "folioai",
            "templates",
            "--api-url",
            "http://localhost:9999",
            "--max-retries",
            "3",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Templates));
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(cli.max_retries, Some(3));
    }

    #[test]
    fn test_cli_recommend_template_parsing() {
        let cli = Cli::try_parse_from([
            "folioai",
            "recommend-template",
            "--title",
            "Designer",
            "--has-design-work",
            "--level",
            "senior",
        ])
        .unwrap();
        match cli.command {
            Commands::RecommendTemplate(args) => {
                assert!(args.has_design_work);
                assert_eq!(args.level, LevelArg::Senior);
                assert_eq!(args.project_count, 0);
            }
            _ => panic!("Expected RecommendTemplate command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["folioai", "--bio", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_experience() {
        let exp = parse_experience("Acme Corp:Staff Engineer:7").unwrap();
        assert_eq!(exp.company, "Acme Corp");
        assert_eq!(exp.position, "Staff Engineer");
        assert_eq!(exp.years_experience, 7);

        assert!(parse_experience("Acme:Engineer").is_err());
        assert!(parse_experience("Acme:Engineer:many").is_err());
        assert!(parse_experience(":Engineer:1").is_err());
    }
}
