//! Line commands read from stdin.
//!
//! ```text
//! buy [volume] [sl=<price>] [tp=<price>]
//! sell [volume] [sl=<price>] [tp=<price>]
//! close <ticket>
//! tf <timeframe>
//! symbol <symbol>
//! positions | tick | status | help | quit
//! ```

use std::str::FromStr;

use bridgesync_sdk::{Side, Ticket, Timeframe};

/// Usage text printed by `help`.
pub const USAGE: &str = "commands: buy [vol] [sl=<p>] [tp=<p>] | sell [vol] [sl=<p>] [tp=<p>] | \
close <ticket> | tf <M1|M5|M15|M30|H1|H4|D1> | symbol <sym> | positions | tick | status | help | quit";

/// Market order arguments as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArgs {
    /// Direction.
    pub side: Side,
    /// Volume in lots; the configured default when absent.
    pub volume: Option<f64>,
    /// Stop loss level.
    pub stop_loss: Option<f64>,
    /// Take profit level.
    pub take_profit: Option<f64>,
}

/// A parsed terminal command.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCommand {
    /// Place a market order.
    Order(OrderArgs),
    /// Close a position.
    Close(Ticket),
    /// Switch the chart timeframe.
    Timeframe(Timeframe),
    /// Switch the chart symbol.
    Symbol(String),
    /// Refresh and print positions.
    Positions,
    /// Request a fresh quote.
    Tick,
    /// Print connection state, market summary and metrics.
    Status,
    /// Print usage.
    Help,
    /// Exit.
    Quit,
}

/// Command parse errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// Unknown command word.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// A required argument is missing.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// Extra tokens after a complete command.
    #[error("unexpected argument: {0}")]
    Unexpected(String),

    /// A numeric argument could not be parsed.
    #[error("invalid {name}: {value}")]
    InvalidValue {
        /// Argument name.
        name: &'static str,
        /// Raw text.
        value: String,
    },
}

impl FromStr for TerminalCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let word = tokens.next().ok_or(ParseError::Empty)?.to_ascii_lowercase();

        let command = match word.as_str() {
            "buy" | "b" => Self::Order(parse_order(Side::Buy, &mut tokens)?),
            "sell" | "s" => Self::Order(parse_order(Side::Sell, &mut tokens)?),
            "close" | "c" => {
                let raw = tokens.next().ok_or(ParseError::MissingArgument("ticket"))?;
                Self::Close(parse_value("ticket", raw)?)
            }
            "tf" | "timeframe" => {
                let raw = tokens
                    .next()
                    .ok_or(ParseError::MissingArgument("timeframe"))?;
                Self::Timeframe(parse_value("timeframe", raw)?)
            }
            "symbol" | "sym" => {
                let raw = tokens.next().ok_or(ParseError::MissingArgument("symbol"))?;
                Self::Symbol(raw.to_string())
            }
            "positions" | "pos" => Self::Positions,
            "tick" => Self::Tick,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(ParseError::Unknown(word)),
        };

        match tokens.next() {
            Some(extra) => Err(ParseError::Unexpected(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn parse_order<'a>(
    side: Side,
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<OrderArgs, ParseError> {
    let mut args = OrderArgs {
        side,
        volume: None,
        stop_loss: None,
        take_profit: None,
    };

    for token in tokens {
        match token.split_once('=') {
            Some(("sl", raw)) => args.stop_loss = Some(parse_value("sl", raw)?),
            Some(("tp", raw)) => args.take_profit = Some(parse_value("tp", raw)?),
            Some(_) => return Err(ParseError::Unexpected(token.to_string())),
            None if args.volume.is_none() => args.volume = Some(parse_value("volume", token)?),
            None => return Err(ParseError::Unexpected(token.to_string())),
        }
    }

    Ok(args)
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<TerminalCommand, ParseError> {
        line.parse()
    }

    #[test]
    fn test_parse_buy_with_levels() {
        assert_eq!(
            parse("buy 0.1 sl=2300 tp=2400.5"),
            Ok(TerminalCommand::Order(OrderArgs {
                side: Side::Buy,
                volume: Some(0.1),
                stop_loss: Some(2300.0),
                take_profit: Some(2400.5),
            }))
        );
    }

    #[test]
    fn test_parse_sell_default_volume() {
        assert_eq!(
            parse("SELL"),
            Ok(TerminalCommand::Order(OrderArgs {
                side: Side::Sell,
                volume: None,
                stop_loss: None,
                take_profit: None,
            }))
        );
    }

    #[test]
    fn test_parse_order_rejects_unknown_option() {
        assert_eq!(
            parse("buy 0.1 trail=5"),
            Err(ParseError::Unexpected("trail=5".to_string()))
        );
        assert_eq!(
            parse("buy 0.1 0.2"),
            Err(ParseError::Unexpected("0.2".to_string()))
        );
        assert!(matches!(
            parse("buy lots"),
            Err(ParseError::InvalidValue { name: "volume", .. })
        ));
    }

    #[test]
    fn test_parse_close() {
        assert_eq!(parse("close 123456"), Ok(TerminalCommand::Close(123_456)));
        assert_eq!(parse("close"), Err(ParseError::MissingArgument("ticket")));
        assert!(parse("close -1").is_err());
    }

    #[test]
    fn test_parse_timeframe_and_symbol() {
        assert_eq!(parse("tf h1"), Ok(TerminalCommand::Timeframe(Timeframe::H1)));
        assert!(parse("tf W1").is_err());
        assert_eq!(
            parse("symbol EURUSD"),
            Ok(TerminalCommand::Symbol("EURUSD".to_string()))
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("positions"), Ok(TerminalCommand::Positions));
        assert_eq!(parse("  tick  "), Ok(TerminalCommand::Tick));
        assert_eq!(parse("status"), Ok(TerminalCommand::Status));
        assert_eq!(parse("help"), Ok(TerminalCommand::Help));
        assert_eq!(parse("q"), Ok(TerminalCommand::Quit));
        assert_eq!(
            parse("status now"),
            Err(ParseError::Unexpected("now".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(
            parse("hedge 1"),
            Err(ParseError::Unknown("hedge".to_string()))
        );
    }
}
