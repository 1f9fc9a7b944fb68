//! Commands accepted on the terminal.

use crate::error::MonitorError;
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  rate <hz>              set the target sample rate (1-50 Hz)
  enable <name|all>      platform-enable a sensor
  disable <name|all>     platform-disable a sensor
  on <name>              check a sensor
  off <name>             uncheck a sensor
  info <name>            show sensor details
  pause                  stop listening on every sensor
  resume                 enable and start every sensor
  list                   show the sensor table
  help                   show this help
  quit                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw rate text; parsed leniently when applied.
    Rate(String),
    Enable(String),
    Disable(String),
    Toggle { name: String, checked: bool },
    Info(String),
    /// Session goes to the background: stop every sensor.
    Pause,
    /// Session comes back: enable and start every sensor.
    Resume,
    List,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = MonitorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| MonitorError::InvalidCommand("empty command".to_string()))?;
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(MonitorError::InvalidCommand(format!(
                "too many arguments to '{}'",
                verb
            )));
        }

        let required = |arg: Option<&str>| {
            arg.map(str::to_string)
                .ok_or_else(|| MonitorError::InvalidCommand(format!("'{}' needs an argument", verb)))
        };

        match verb.to_ascii_lowercase().as_str() {
            "rate" => Ok(Command::Rate(required(arg)?)),
            "enable" => Ok(Command::Enable(required(arg)?)),
            "disable" => Ok(Command::Disable(required(arg)?)),
            "on" => Ok(Command::Toggle {
                name: required(arg)?,
                checked: true,
            }),
            "off" => Ok(Command::Toggle {
                name: required(arg)?,
                checked: false,
            }),
            "info" => Ok(Command::Info(required(arg)?)),
            "pause" => Ok(Command::Pause),
            "resume" => Ok(Command::Resume),
            "list" | "ls" => Ok(Command::List),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(MonitorError::InvalidCommand(format!(
                "unknown command '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("rate 25"), Command::Rate("25".to_string()));
        assert_eq!(parse("rate nope"), Command::Rate("nope".to_string()));
        assert_eq!(parse("enable all"), Command::Enable("all".to_string()));
        assert_eq!(parse("DISABLE light"), Command::Disable("light".to_string()));
        assert_eq!(
            parse("on gyroscope"),
            Command::Toggle {
                name: "gyroscope".to_string(),
                checked: true
            }
        );
        assert_eq!(
            parse("  off   proximity "),
            Command::Toggle {
                name: "proximity".to_string(),
                checked: false
            }
        );
        assert_eq!(parse("info pressure"), Command::Info("pressure".to_string()));
        assert_eq!(parse("pause"), Command::Pause);
        assert_eq!(parse("Resume"), Command::Resume);
        assert_eq!(parse("list"), Command::List);
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn test_invalid_commands() {
        assert!("".parse::<Command>().is_err());
        assert!("rate".parse::<Command>().is_err());
        assert!("on a b".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }
}
