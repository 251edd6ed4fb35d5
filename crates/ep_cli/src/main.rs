use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ep_ast::Conventions;
use ep_glslx::{GlslxCli, ShaderCompiler};
use ep_parser::{emit_js, parse_js};
use ep_transform::Pipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "elmpost", about = "elmpost — post-process Elm-compiled JavaScript")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and emit the rewritten module.
    Transform {
        /// Input .js file (compiled Elm output).
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Shader compiler binary to invoke.
        #[arg(long, default_value = "glslx")]
        glslx: String,
        /// Skip shader literal inlining.
        #[arg(long)]
        no_shaders: bool,
    },
    /// Parse the file and report any syntax errors.
    Check { input: PathBuf },
    /// Parse and dump the AST as JSON.
    Parse {
        input: PathBuf,
        #[arg(long)]
        ast: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            input,
            output,
            glslx,
            no_shaders,
        } => {
            let source = std::fs::read_to_string(&input)?;
            let filename = input.display().to_string();
            let mut parsed = parse_js(&source, &filename)?;

            let compiler = GlslxCli::new(glslx);
            let shader_compiler: Option<&dyn ShaderCompiler> =
                if no_shaders { None } else { Some(&compiler) };

            let pipeline = Pipeline::new(Conventions::default());
            let report = pipeline.run(&mut parsed.module, shader_compiler)?;

            let output_str = emit_js(&parsed.module, parsed.source_map)?;
            match &output {
                Some(path) => std::fs::write(path, &output_str)?,
                None => print!("{output_str}"),
            }

            eprintln!(
                "{filename}: {} arities, {} calls rewritten, {} shaders inlined ({} rejected), {} patches, {} annotations",
                report.arity_entries,
                report.calls_rewritten,
                report.shaders_inlined,
                report.shaders_rejected,
                report.patches_applied,
                report.annotations_inserted,
            );
        }
        Commands::Check { input } => {
            let source = std::fs::read_to_string(&input)?;
            let filename = input.display().to_string();
            parse_js(&source, &filename)?;
            eprintln!("OK: {filename}");
        }
        Commands::Parse { input, ast } => {
            let source = std::fs::read_to_string(&input)?;
            let filename = input.display().to_string();
            let parsed = parse_js(&source, &filename)?;

            if ast {
                let json = serde_json::to_string_pretty(&parsed.module)?;
                println!("{json}");
            } else {
                println!("{:#?}", parsed.module);
            }
        }
    }

    Ok(())
}
