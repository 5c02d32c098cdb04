use chrono::{DateTime, Duration, Utc};
use quickpick_core::{MealFilter, Msg};

pub const HELP: &str = "\
commands:
  start [filter]     begin (filters: all breakfast lunch dinner snack dessert)
  filter <filter>    switch meal type
  yes | no           approve / reject the current card
  drag <dx> [v]      drag horizontally and release (pixels, pixels/second)
  tap <x>            single tap at x in 0.0..1.0
  dtap <x>           double tap at x
  fav                toggle favorite
  hide | show        simulate the window being hidden or shown
  retry              retry after an error
  help | quit";

const DOUBLE_TAP_GAP_MS: i64 = 80;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start(Option<MealFilter>),
    Dispatch(Vec<Msg>),
    Help,
    Quit,
}

/// Parses one input line into a command, stamping time-based messages with `now`.
pub fn parse_command(line: &str, now: DateTime<Utc>) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Dispatch(Vec::new()));
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "start" => Command::Start(args.first().map(|raw| raw.parse()).transpose()?),
        "filter" => {
            let raw = args.first().ok_or("filter needs a meal type")?;
            Command::Dispatch(vec![Msg::FilterChanged(raw.parse()?)])
        }
        "yes" | "approve" => Command::Dispatch(vec![Msg::ApproveClicked { at: now }]),
        "no" | "reject" => Command::Dispatch(vec![Msg::RejectClicked { at: now }]),
        "drag" => {
            let dx = number(args.first(), "drag needs an offset")?;
            let velocity = match args.get(1) {
                Some(raw) => number(Some(raw), "")?,
                None => 0.0,
            };
            Command::Dispatch(vec![
                Msg::DragStarted,
                Msg::DragMoved { dx },
                Msg::DragReleased {
                    dx,
                    velocity,
                    at: now,
                },
            ])
        }
        "tap" => {
            let x = number(args.first(), "tap needs a position")?;
            Command::Dispatch(vec![Msg::CardTapped { x, at: now }])
        }
        "dtap" => {
            let x = number(args.first(), "dtap needs a position")?;
            Command::Dispatch(vec![
                Msg::CardTapped { x, at: now },
                Msg::CardTapped {
                    x,
                    at: now + Duration::milliseconds(DOUBLE_TAP_GAP_MS),
                },
            ])
        }
        "fav" | "favorite" => Command::Dispatch(vec![Msg::FavoriteToggled]),
        "hide" => Command::Dispatch(vec![Msg::VisibilityChanged {
            visible: false,
            at: now,
        }]),
        "show" => Command::Dispatch(vec![Msg::VisibilityChanged {
            visible: true,
            at: now,
        }]),
        "retry" => Command::Dispatch(vec![Msg::RetryClicked]),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(command)
}

fn number(raw: Option<&&str>, missing: &str) -> Result<f32, String> {
    let raw = raw.ok_or_else(|| missing.to_string())?;
    raw.parse()
        .map_err(|_| format!("`{raw}` is not a number"))
}
