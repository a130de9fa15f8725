pub mod handlers;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("wppq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Waiting queues for WhatsApp phone lines")
        .subcommand_required(true)
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("SQLite database file (overrides config)"),
        )
        .arg(
            Arg::new("account")
                .long("account")
                .global(true)
                .value_name("ID")
                .help("Account to act as (overrides WPPQ_ACCOUNT_ID)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .subcommand(cmd_phone())
        .subcommand(cmd_queue())
        .subcommand(cmd_metrics())
}

fn phone_id_arg() -> Arg {
    Arg::new("phone").required(true).help("Phone id")
}

fn cmd_phone() -> Command {
    Command::new("phone")
        .about("Manage phone lines")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Register a phone line (starts offline)")
                .arg(Arg::new("number").required(true).help("Phone number"))
                .arg(Arg::new("name").long("name").default_value("").help("Display name")),
        )
        .subcommand(Command::new("list").about("List phone lines"))
        .subcommand(
            Command::new("online")
                .about("Bring a phone online and queue it")
                .arg(phone_id_arg()),
        )
        .subcommand(
            Command::new("offline")
                .about("Take a phone offline and drop its queue")
                .arg(phone_id_arg()),
        )
        .subcommand(
            Command::new("edit")
                .about("Change a phone's name or number")
                .arg(phone_id_arg())
                .arg(Arg::new("name").long("name").help("New display name"))
                .arg(Arg::new("number").long("number").help("New phone number")),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a phone line")
                .arg(phone_id_arg()),
        )
}

fn cmd_queue() -> Command {
    let entry = || Arg::new("entry").required(true).help("Queue entry id");

    Command::new("queue")
        .about("Inspect and reorder waiting queues")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List waiting entries (all online phones by default)")
                .arg(Arg::new("phone").long("phone").help("Only this phone")),
        )
        .subcommand(
            Command::new("push")
                .about("Add a waiting caller to a phone's queue")
                .arg(phone_id_arg()),
        )
        .subcommand(
            Command::new("move")
                .about("Move an entry within its queue")
                .arg(phone_id_arg())
                .arg(entry())
                .arg(
                    Arg::new("direction")
                        .required(true)
                        .value_parser(["top", "up", "down", "bottom"])
                        .help("Where to move the entry"),
                ),
        )
        .subcommand(
            Command::new("attend")
                .about("Mark an entry as attended and close the gap")
                .arg(phone_id_arg())
                .arg(entry()),
        )
        .subcommand(
            Command::new("repair")
                .about("Renumber a queue to 1..N")
                .arg(phone_id_arg()),
        )
}

fn cmd_metrics() -> Command {
    Command::new("metrics")
        .about("Attendance metrics")
        .subcommand_required(true)
        .subcommand(Command::new("show").about("Show the account dashboard"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() -> Result<(), clap::Error> {
        let matches = build_cli().try_get_matches_from([
            "wppq", "queue", "move", "7", "12", "bottom", "--json", "--db", "/tmp/q.db",
        ])?;
        assert!(matches.get_flag("json"));
        assert_eq!(
            matches.get_one::<PathBuf>("db"),
            Some(&PathBuf::from("/tmp/q.db"))
        );
        let (group, queue) = matches.subcommand().ok_or_else(|| {
            clap::Error::raw(clap::error::ErrorKind::MissingSubcommand, "group")
        })?;
        assert_eq!(group, "queue");
        let (command, args) = queue.subcommand().ok_or_else(|| {
            clap::Error::raw(clap::error::ErrorKind::MissingSubcommand, "command")
        })?;
        assert_eq!(command, "move");
        assert_eq!(args.get_one::<String>("direction").map(String::as_str), Some("bottom"));
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_direction() {
        let result =
            build_cli().try_get_matches_from(["wppq", "queue", "move", "7", "12", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_group_requires_command() {
        assert!(build_cli().try_get_matches_from(["wppq", "phone"]).is_err());
    }
}
