use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mdxmath_ast::{from_json, mdx::to_mdx, to_json};
use mdxmath_syntax::{ExpressionParser, TemplateParser};
use mdxmath_transform::{Options, TokenTag, Tokenizer, transform, wrap_raw};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdxmath")]
#[command(about = "Math-to-MDX template tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize math text into a template body
    Tokenize {
        /// Math text, e.g. '\pi = \js{Math.PI}'
        #[arg(value_name = "TEXT")]
        text: String,
        #[command(flatten)]
        syntax: SyntaxArgs,
        /// Print the token stream instead of the template
        #[arg(long)]
        tokens: bool,
        /// Parse the template and print its syntax tree
        #[arg(long, conflicts_with = "tokens")]
        tree: bool,
    },
    /// Replace math nodes in a JSON document tree
    Transform {
        /// Path to the mdast JSON document
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// JSON options file (`elementName`, `expressionMarker`, ...)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Name of the replacement element
        #[arg(long)]
        element_name: Option<String>,
        #[command(flatten)]
        syntax: SyntaxArgs,
        #[arg(long, value_enum, default_value_t = Format::Mdx)]
        format: Format,
    },
}

/// Expression syntax overrides shared by all subcommands.
#[derive(Args)]
struct SyntaxArgs {
    /// Marker followed by a brace-balanced expression
    #[arg(long, conflicts_with_all = ["start", "end", "pattern"])]
    marker: Option<String>,
    /// Regular expression marker followed by a brace-balanced expression
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pattern: Option<String>,
    /// Start delimiter (non-nesting mode)
    #[arg(long, requires = "end")]
    start: Option<String>,
    /// End delimiter (non-nesting mode)
    #[arg(long, requires = "start")]
    end: Option<String>,
}

impl SyntaxArgs {
    fn apply(&self, options: Options) -> Options {
        match (&self.marker, &self.pattern, &self.start, &self.end) {
            (Some(marker), ..) => options.with_marker(marker),
            (_, Some(pattern), ..) => options.with_pattern(pattern),
            (_, _, Some(start), Some(end)) => options.with_delimiters(start, end),
            _ => options,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Mdx,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Tokenize {
            text,
            syntax,
            tokens,
            tree,
        } => {
            let options = syntax.apply(Options::new());
            let tokenizer = Tokenizer::from_options(&options).context("invalid expression syntax")?;

            if *tokens {
                for token in tokenizer.tokens(text) {
                    let tag = match token.tag {
                        TokenTag::Literal => "literal",
                        TokenTag::EnterExpression => "enter",
                        TokenTag::ExitExpression => "exit",
                    };
                    println!("{tag:<8}{:?}", token.text);
                }
                return Ok(());
            }

            let template = tokenizer.normalize(text);
            if !*tree {
                println!("{template}");
                return Ok(());
            }

            let parsed = TemplateParser
                .parse_expression(&wrap_raw(&template))
                .with_context(|| format!("`{template}` is not a valid template"))?;
            print!("{}", parsed.dump());
            for (i, expression) in parsed.substitutions().iter().enumerate() {
                println!("${{{i}}} = {expression}");
            }
        }
        Commands::Transform {
            path,
            config,
            element_name,
            syntax,
            format,
        } => {
            let mut options = match config {
                Some(config) => {
                    let json = fs::read_to_string(config)
                        .with_context(|| format!("failed to read {}", config.display()))?;
                    serde_json::from_str(&json)
                        .with_context(|| format!("invalid options in {}", config.display()))?
                }
                None => Options::new(),
            };
            if let Some(name) = element_name {
                options = options.with_element_name(name);
            }
            let options = syntax.apply(options);
            if let Err(err) = options.validate() {
                bail!("invalid options: {err}");
            }

            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let tree = from_json(&content)
                .with_context(|| format!("{} is not a document tree", path.display()))?;
            let tree = transform(tree, &options, &TemplateParser)
                .with_context(|| format!("failed to transform {}", path.display()))?;

            match format {
                Format::Json => println!("{}", to_json(&tree)?),
                Format::Mdx => print!("{}", to_mdx(&tree)),
            }
        }
    }
    Ok(())
}
