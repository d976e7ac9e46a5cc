use colored::Colorize;
use resub::api::{CmdMessage, MessageLevel};
use resub::config::{ResubConfig, KEYS};
use resub::rules::Rule;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_rules(rules: &[Rule]) {
    for (i, rule) in rules.iter().enumerate() {
        println!(
            "{:>3}. {} {} {}",
            i + 1,
            rule.pattern,
            "=>".dimmed(),
            rule.replacement.bold()
        );
    }
}

pub(super) fn print_config(config: &ResubConfig) {
    for key in KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}
