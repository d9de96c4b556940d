pub mod parser;
pub mod registry;
pub mod session;

pub use parser::{parse, parse_command, tokenize, ParseErrors, ParseIssue, ParsedArgs};
pub use registry::{CommandRegistry, CommandSignature, COMMANDS};
pub use session::{CommandOutcome, CommandOutput, Confirm, ConfirmRequest, WalletSession};
