use crate::report::write_session;
use crate::Result;
use libcartopal::{InitialSeeds, Session, Settings};

pub struct GenerateArgs<'a, W: std::io::Write> {
    pub count: usize,
    pub start_color: Option<String>,
    pub random: bool,
    pub rescale_hue: bool,
    pub settings: Settings,
    pub stdout: &'a mut W,
}

/// Generates seed colors and prints the palettes built from the first three.
pub fn run<W: std::io::Write>(args: GenerateArgs<W>) -> Result<()> {
    let mut session = Session::new(args.settings)?;

    let source = if args.random {
        InitialSeeds::Random { count: args.count }
    } else {
        InitialSeeds::Generate {
            count: args.count,
            start_color: args.start_color,
        }
    };
    session.initialize(&source)?;

    if args.rescale_hue {
        session.rescale_hue_to_settings()?;
    }

    write_session(args.stdout, &session)
}
