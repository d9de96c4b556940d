use std::collections::HashMap;

use once_cell::sync::Lazy;
use strsim::levenshtein;

/// Flag spellings shared by the command table and the session.
pub mod flags {
    pub const USER: &str = "-u";
    pub const PASSWORD: &str = "-p";
    pub const CATEGORY: &str = "-c";
    pub const AMOUNT: &str = "-a";
    pub const DESCRIPTION: &str = "-d";
    pub const TYPE: &str = "-t";
    pub const COUNT: &str = "-n";
    pub const NEW_NAME: &str = "-n";
    pub const FROM: &str = "-from";
    pub const TO: &str = "-to";
    pub const ID: &str = "-i";
    pub const FILE: &str = "-f";
}

use flags::*;

/// Largest edit distance for which an unknown command gets a suggestion.
const SUGGESTION_DISTANCE: usize = 3;

/// Accepted flag set for one command. Flag order on the command line is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSignature {
    pub name: &'static str,
    pub flags: &'static [&'static str],
}

impl CommandSignature {
    pub const fn new(name: &'static str, flags: &'static [&'static str]) -> Self {
        Self { name, flags }
    }

    pub fn accepts(&self, flag: &str) -> bool {
        self.flags.contains(&flag)
    }

    /// Number of leading tokens taken by the command name (`actions list` is two).
    pub fn word_count(&self) -> usize {
        self.name.split_whitespace().count()
    }
}

const BUILTIN: &[CommandSignature] = &[
    CommandSignature::new("login", &[USER, PASSWORD]),
    CommandSignature::new("registration", &[USER, PASSWORD]),
    CommandSignature::new("add_income", &[CATEGORY, AMOUNT, DESCRIPTION]),
    CommandSignature::new("add_outcome", &[CATEGORY, AMOUNT, DESCRIPTION]),
    CommandSignature::new("set_budget", &[CATEGORY, AMOUNT, DESCRIPTION]),
    CommandSignature::new("status", &[]),
    CommandSignature::new("actions list", &[CATEGORY, TYPE, COUNT, FROM, TO]),
    CommandSignature::new("actions remove", &[ID]),
    CommandSignature::new("category remove", &[CATEGORY, TYPE]),
    CommandSignature::new("category list", &[CATEGORY, TYPE]),
    CommandSignature::new("category edit", &[CATEGORY, TYPE, NEW_NAME]),
    CommandSignature::new("category add", &[CATEGORY, TYPE]),
    CommandSignature::new("export", &[FILE]),
    CommandSignature::new("import", &[FILE]),
];

pub static COMMANDS: Lazy<CommandRegistry> = Lazy::new(CommandRegistry::builtin);

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandSignature>,
    order: Vec<&'static str>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for signature in BUILTIN {
            registry.register(*signature);
        }
        registry
    }

    pub fn register(&mut self, signature: CommandSignature) {
        let name = signature.name;
        if self.commands.insert(name, signature).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandSignature> {
        self.commands.get(name)
    }

    pub fn list(&self) -> Vec<&CommandSignature> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    /// Finds the command a token line starts with, preferring two-word names.
    pub fn resolve<S: AsRef<str>>(&self, tokens: &[S]) -> Option<&CommandSignature> {
        let first = tokens.first()?.as_ref();
        tokens
            .get(1)
            .and_then(|second| self.get(&format!("{} {}", first, second.as_ref())))
            .or_else(|| self.get(first))
    }

    /// Closest registered name to `input`, if it is near enough to be a typo.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        self.names()
            .map(|name| (levenshtein(name, input), name))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .map(|(_, name)| name)
    }
}
