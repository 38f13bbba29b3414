//! Usage and help text rendered from a parser's declarations.

use crate::arity::Arity;
use crate::declaration::Argument;
use crate::parser::ArgumentParser;

impl ArgumentParser {
    /// One-line synopsis, e.g. `Usage: serve [OPTIONS] <ROOT>`.
    pub fn usage(&self) -> String {
        let mut out = format!("Usage: {}", self.program());
        if !self.options().is_empty() {
            out.push_str(" [OPTIONS]");
        }
        for argument in self.positionals() {
            out.push(' ');
            out.push_str(&positional_left(argument));
        }
        out
    }

    /// Full help text: synopsis, description, then aligned argument and
    /// option tables.
    pub fn help(&self) -> String {
        let mut out = String::new();
        if self.about().trim().is_empty() {
            out.push_str(self.program());
            out.push('\n');
        } else {
            out.push_str(&format!("{} - {}\n", self.program(), self.about().trim()));
        }

        out.push('\n');
        out.push_str(&self.usage());
        out.push('\n');

        if !self.positionals().is_empty() {
            out.push_str("\nArguments:\n");
            let rows: Vec<(String, String)> = self
                .positionals()
                .iter()
                .map(|a| (positional_left(a), describe(a)))
                .collect();
            push_rows(&mut out, rows);
        }

        if !self.options().is_empty() {
            out.push_str("\nOptions:\n");
            let rows: Vec<(String, String)> = self
                .options()
                .iter()
                .map(|a| (option_left(a), describe(a)))
                .collect();
            push_rows(&mut out, rows);
        }

        out
    }
}

fn push_rows(out: &mut String, rows: Vec<(String, String)>) {
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {}\n", left));
        } else {
            out.push_str(&format!("  {:width$}  {}\n", left, help, width = width));
        }
    }
}

fn positional_left(argument: &Argument) -> String {
    let name = argument.value_name();
    if argument.is_required() {
        format!("<{name}>")
    } else {
        format!("[{name}]")
    }
}

fn option_left(argument: &Argument) -> String {
    let mut out = argument.display_name();
    out.push_str(&placeholder(argument));
    out
}

fn placeholder(argument: &Argument) -> String {
    let name = match argument.choices() {
        Some(choices) => format!("{{{}}}", choices.iter().cloned().collect::<Vec<_>>().join(",")),
        None => argument.value_name(),
    };
    match argument.arity() {
        Arity::Fixed(n) => format!(" <{name}>").repeat(n),
        Arity::Optional => format!(" [{name}]"),
        Arity::Any => format!(" [{name}...]"),
        Arity::AtLeastOne => format!(" <{name}>..."),
    }
}

fn describe(argument: &Argument) -> String {
    let mut out = argument.usage().trim().to_string();
    if argument.is_required() && !argument.is_positional() {
        if out.is_empty() {
            out.push_str("required");
        } else {
            out.push_str(" (required)");
        }
    }
    if let Some(default) = argument.default_value() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("[default: {default}]"));
    }
    out
}
