use anyhow::{Context, bail};
use sapper_core::{Coord, Coord2, Point};

/// One line of player input.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    Open(Coord2),
    Flag(Coord2),
    Chord(Coord2),
    /// Pointer actions in screen pixels, resolved through the board view.
    Tap(Point),
    LongTap(Point),
    RightClick(Point),
    MiddleClick(Point),
    Hover(Option<Point>),
    Pan(f32, f32),
    Zoom(f32, Point),
    Scroll(f32, Point),
    Fit,
    AutoFlag,
    ToggleTap,
    Pause,
    NewGame,
    Show,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
cells:   o X Y  open      f X Y  flag      c X Y  chord      a  auto-flag
pointer: tap PX PY   long PX PY   right PX PY   middle PX PY   hover [PX PY]
view:    pan DX DY   zoom FACTOR PX PY   scroll DY PX PY   fit
game:    t  toggle tap dig/flag   p  pause/resume   n  new game   s  show   h  help   q  quit";

fn arg<'a>(args: &[&'a str], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .copied()
        .with_context(|| format!("missing {name}"))
}

fn number(args: &[&str], index: usize, name: &str) -> anyhow::Result<f32> {
    let raw = arg(args, index, name)?;
    raw.parse()
        .with_context(|| format!("{name} must be a number, got {raw:?}"))
}

fn coord(args: &[&str], index: usize, name: &str) -> anyhow::Result<Coord> {
    let raw = arg(args, index, name)?;
    raw.parse()
        .with_context(|| format!("{name} must be a cell index, got {raw:?}"))
}

fn cell(args: &[&str]) -> anyhow::Result<Coord2> {
    Ok((coord(args, 0, "x")?, coord(args, 1, "y")?))
}

fn point(args: &[&str], offset: usize) -> anyhow::Result<Point> {
    Ok(Point::new(
        number(args, offset, "px")?,
        number(args, offset + 1, "py")?,
    ))
}

impl Command {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Show);
        };
        let args: Vec<&str> = words.collect();

        use Command::*;
        Ok(match name {
            "o" | "open" => Open(cell(&args)?),
            "f" | "flag" => Flag(cell(&args)?),
            "c" | "chord" => Chord(cell(&args)?),
            "tap" => Tap(point(&args, 0)?),
            "long" => LongTap(point(&args, 0)?),
            "right" => RightClick(point(&args, 0)?),
            "middle" => MiddleClick(point(&args, 0)?),
            "hover" if args.is_empty() => Hover(None),
            "hover" => Hover(Some(point(&args, 0)?)),
            "pan" => Pan(number(&args, 0, "dx")?, number(&args, 1, "dy")?),
            "zoom" => Zoom(number(&args, 0, "factor")?, point(&args, 1)?),
            "scroll" => Scroll(number(&args, 0, "dy")?, point(&args, 1)?),
            "fit" => Fit,
            "a" | "auto" => AutoFlag,
            "t" | "toggle" => ToggleTap,
            "p" | "pause" => Pause,
            "n" | "new" => NewGame,
            "s" | "show" => Show,
            "h" | "help" | "?" => Help,
            "q" | "quit" | "exit" => Quit,
            other => bail!("unknown command {other:?}, try \"h\""),
        })
    }
}
