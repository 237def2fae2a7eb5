//! # pchipper
//!
//! Command-line access to promptchipper tokenizers.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use promptchipper::EosPolicy;

mod commands;

/// promptchipper tokenizer cli.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Model name (looked up in the model dir) or artifact path.
    #[arg(long, short, default_value = "tekken")]
    pub model: String,

    /// Model directory; defaults to $PROMPTCHIPPER_MODEL_DIR, then the user data dir.
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Silence all output.
    #[arg(long, short)]
    pub quiet: bool,

    /// Verbose mode (-v, -vv, -vvv, etc).
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// [`EosPolicy`] as a cli value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EosPolicyArg {
    /// Close only a final assistant turn.
    #[default]
    FinalAssistant,

    /// Close every assistant turn.
    EveryAssistantTurn,

    /// Never close turns.
    Never,
}

impl From<EosPolicyArg> for EosPolicy {
    fn from(arg: EosPolicyArg) -> Self {
        match arg {
            EosPolicyArg::FinalAssistant => EosPolicy::FinalAssistant,
            EosPolicyArg::EveryAssistantTurn => EosPolicy::EveryAssistantTurn,
            EosPolicyArg::Never => EosPolicy::Never,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode text (or stdin) into token ids.
    Encode {
        /// Text to encode; reads stdin when absent.
        text: Option<String>,

        /// Prefix the bos token.
        #[arg(long)]
        bos: bool,

        /// Suffix the eos token.
        #[arg(long)]
        eos: bool,
    },

    /// Decode token ids (or whitespace separated ids on stdin).
    Decode {
        /// Token ids.
        ids: Vec<u32>,

        /// Render control tokens as their literals.
        #[arg(long)]
        controls: bool,
    },

    /// Print the vocabulary, one `id<TAB>token` per line.
    Vocab {
        /// Only print the first N tokens.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Encode a JSON instruct request from a file (or stdin).
    Instruct {
        /// Request file; reads stdin when absent.
        request: Option<PathBuf>,

        /// When to append the eos token.
        #[arg(long, value_enum, default_value_t)]
        eos_policy: EosPolicyArg,

        /// Skip rendering the text form.
        #[arg(long)]
        no_text: bool,
    },

    /// List the model artifacts in the model dir.
    Models,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .module(module_path!())
        .module("promptchipper")
        .module("promptchipper_model_cache")
        .quiet(args.quiet)
        .verbosity(args.verbose as usize)
        .timestamp(stderrlog::Timestamp::Off)
        .init()?;

    log::debug!("{args:#?}");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&args, &mut out)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args() {
        Args::command().debug_assert();

        let args = Args::parse_from(["pchipper", "-vv", "--model", "m.json", "encode", "--bos", "hi"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.model, "m.json");
        assert!(matches!(
            args.command,
            Command::Encode { text: Some(ref t), bos: true, eos: false } if t == "hi"
        ));

        let args = Args::parse_from(["pchipper", "instruct", "--eos-policy", "every-assistant-turn"]);
        assert!(matches!(
            args.command,
            Command::Instruct {
                request: None,
                eos_policy: EosPolicyArg::EveryAssistantTurn,
                no_text: false,
            }
        ));
        assert_eq!(
            EosPolicy::from(EosPolicyArg::EveryAssistantTurn),
            EosPolicy::EveryAssistantTurn
        );
    }
}
