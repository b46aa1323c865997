use std::path::PathBuf;

use tracing::warn;

/// Command line arguments for sample initialization
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleCommandLine {
    pub use_warp_device: bool,
    pub vsync: bool,
    pub verbose: bool,
    /// Extra asset search directories, tried before the sample's own.
    pub asset_paths: Vec<PathBuf>,
    /// Arguments that were not understood. Parsing happens before logging
    /// is set up, so these are reported later by [`SampleCommandLine::report_unrecognized`].
    pub unrecognized: Vec<String>,
}

impl SampleCommandLine {
    pub fn report_unrecognized(&self) {
        for arg in &self.unrecognized {
            warn!("Ignoring unrecognized argument {arg:?}");
        }
    }
}

/// Builds a SampleCommandLine from the process arguments
pub fn build_command_line() -> SampleCommandLine {
    parse_command_line(std::env::args().skip(1))
}

const FLAGS: [&str; 4] = ["warp", "vsync", "verbose", "assets"];

fn is_flag(arg: &str, name: &str) -> bool {
    arg.strip_prefix('-')
        .or_else(|| arg.strip_prefix('/'))
        .is_some_and(|rest| rest.eq_ignore_ascii_case(name))
}

fn is_any_flag(arg: &str) -> bool {
    FLAGS.iter().any(|name| is_flag(arg, name))
}

pub fn parse_command_line<I, A>(args: I) -> SampleCommandLine
where
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    let mut command_line = SampleCommandLine::default();
    let mut args = args.into_iter().map(Into::<String>::into).peekable();

    while let Some(arg) = args.next() {
        if is_flag(&arg, "warp") {
            command_line.use_warp_device = true;
        } else if is_flag(&arg, "vsync") {
            command_line.vsync = true;
        } else if is_flag(&arg, "verbose") {
            command_line.verbose = true;
        } else if is_flag(&arg, "assets") {
            // A following flag is never taken as the directory.
            match args.next_if(|next| !is_any_flag(next)) {
                Some(path) => command_line.asset_paths.push(PathBuf::from(path)),
                None => command_line.unrecognized.push(arg),
            }
        } else {
            command_line.unrecognized.push(arg);
        }
    }

    command_line
}
