use std::path::PathBuf;

use rensa_engine::SessionConfig;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ShowConfigArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(config: &SessionConfig, arg: &ShowConfigArg) -> anyhow::Result<()> {
    Output::save_json(config, arg.output.clone())
}
