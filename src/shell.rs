//! Line grammar for the interactive shell.
//!
//! One command per line; words are split on whitespace:
//! `go <path>`, `back`, `forward`, `login <email> <password>`, `logout`,
//! `where`, `help`, `quit`.

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;

pub const HELP: &str = "\
comandos:
  go <ruta>                  navegar (p. ej. go /tareas)
  back | forward             moverse por el historial
  login <email> <password>   iniciar sesión
  logout                     cerrar sesión
  where                      ruta actual
  help                       esta ayuda
  quit                       salir";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Go(String),
    Back,
    Forward,
    Login { email: String, password: String },
    Logout,
    Where,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShellParseError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, ShellParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (head, args) {
        ("go", [path]) => ShellCommand::Go((*path).to_owned()),
        ("go", _) => return Err(ShellParseError::Usage("go <ruta>")),
        ("back", []) => ShellCommand::Back,
        ("forward", []) => ShellCommand::Forward,
        ("login", [email, password]) => {
            ShellCommand::Login { email: (*email).to_owned(), password: (*password).to_owned() }
        }
        ("login", _) => return Err(ShellParseError::Usage("login <email> <password>")),
        ("logout", []) => ShellCommand::Logout,
        ("where", []) => ShellCommand::Where,
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit", _) => ShellCommand::Quit,
        (other, _) => return Err(ShellParseError::Unknown(other.to_owned())),
    };
    Ok(Some(command))
}
