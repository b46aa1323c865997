#[cfg(windows)]
mod tutorial01;

use d3d11_common::command_line::build_command_line;
use d3d11_common::error::MyResult;
use d3d11_common::logging::init_tracing;
use tracing::info;

pub fn main() -> MyResult<()> {
    let command_line = build_command_line();
    init_tracing(command_line.verbose)?;
    command_line.report_unrecognized();
    info!("Ahoy, tutorial01!");

    #[cfg(windows)]
    {
        d3d11_common::sample_runner::run_sample_with::<tutorial01::Tutorial01>(&command_line)
    }
    #[cfg(not(windows))]
    {
        tracing::error!("Direct3D 11 is only available on Windows");
        Err(eyre::eyre!("unsupported platform").into())
    }
}
