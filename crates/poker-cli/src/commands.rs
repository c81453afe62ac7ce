//! Line commands read from stdin.

use poker_app::UserInput;
use poker_client::{Deck, LinkError, ParseDeckError, RoomLink};
use thiserror::Error;

/// Command line help, printed by `help`.
pub const HELP: &str = "\
commands:
  create              create a room and connect to it
  open <url>          open a shared room link
  join                join the room without voting
  vote <card>         vote a card (again to retract)
  reveal              show or hide estimates for everyone
  clear               clear every vote (asks to confirm)
  remove <name>       remove a participant (asks to confirm)
  yes | no            answer the pending question
  link | qr           show the shareable link
  name <username>     change your name
  host <host>         change the relay host
  room <name>         change the room name
  deck <deck>         fibonacci, modified-fibonacci, t-shirt, powers-of-two
  disconnect          leave the room
  quit                exit";

/// Something shown below the session view on the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// The shareable URL.
    Link,
    /// The shareable URL as a QR code.
    Qr,
    /// Command help.
    Help,
    /// A one-line message.
    Notice(String),
}

/// A parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forwarded to the App.
    Input(UserInput),
    /// Handled by the view.
    Show(Overlay),
}

/// Line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// First word is not a command.
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    /// Command needs an argument.
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    /// Unknown deck name.
    #[error(transparent)]
    Deck(#[from] ParseDeckError),

    /// Malformed room link.
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Parse one line.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let argument = |name: &'static str| {
        if rest.is_empty() { Err(CommandError::MissingArgument(name)) } else { Ok(rest.to_owned()) }
    };

    let input = match word.to_ascii_lowercase().as_str() {
        "" => return Err(CommandError::Empty),
        "create" | "new" => UserInput::CreateRoom,
        "open" => UserInput::OpenLink(RoomLink::parse(&argument("open")?)?),
        "join" => UserInput::JoinRoom,
        "vote" | "v" => UserInput::Vote(argument("vote")?),
        "reveal" | "hide" => UserInput::ToggleVisibility,
        "clear" => UserInput::RequestClearVotes,
        "remove" | "kick" => UserInput::RequestRemoveUser(argument("remove")?),
        "yes" | "y" => UserInput::Confirm,
        "no" | "n" => UserInput::Cancel,
        "name" => UserInput::SetUsername(argument("name")?),
        "host" => UserInput::SetHostName(argument("host")?),
        "room" => UserInput::SetRoomName(argument("room")?),
        "deck" => UserInput::SetDeck(argument("deck")?.parse::<Deck>()?),
        "disconnect" | "leave" => UserInput::Disconnect,
        "quit" | "exit" | "q" => UserInput::Quit,
        "link" => return Ok(Command::Show(Overlay::Link)),
        "qr" => return Ok(Command::Show(Overlay::Qr)),
        "help" | "?" => return Ok(Command::Show(Overlay::Help)),
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(Command::Input(input))
}
