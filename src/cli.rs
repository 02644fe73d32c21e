// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("nestegg")
        .about("Savings coach: accounts, balance snapshots, SOP templates, bonuses, and rolling-anchor milestone forecasts")
        .version(clap::crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("account")
                .about("Manage purpose-classified accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("purpose")
                                .long("purpose")
                                .required(true)
                                .help("salary|fixed_expense|dating_fund|savings|flexible|housing_fund"),
                        )
                        .arg(Arg::new("bank").long("bank"))
                        .arg(
                            Arg::new("sort-order")
                                .long("sort-order")
                                .value_parser(clap::value_parser!(i64))
                                .default_value("0"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List accounts")))
                .subcommand(
                    Command::new("rm")
                        .about("Remove an account")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("balance")
                .about("Record and inspect balance snapshots")
                .subcommand(
                    Command::new("record")
                        .about("Record a balance snapshot (upserts per account and date)")
                        .arg(Arg::new("account").required(true))
                        .arg(Arg::new("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("amount").required(true))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    json_flags(Command::new("list").about("List balance snapshots"))
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("month").long("month").help("YYYY-MM")),
                ),
        )
        .subcommand(
            Command::new("sop")
                .about("Manage recurring SOP templates")
                .subcommand(
                    Command::new("add")
                        .about("Add a template")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("label").required(true))
                        .arg(
                            Arg::new("due-day")
                                .long("due-day")
                                .required(true)
                                .value_parser(clap::value_parser!(u32).range(1..=31)),
                        )
                        .arg(Arg::new("from").long("from").help("Source account name"))
                        .arg(Arg::new("to").long("to").help("Destination account name"))
                        .arg(Arg::new("amount").long("amount").help("Default monthly amount"))
                        .arg(
                            Arg::new("sort-order")
                                .long("sort-order")
                                .value_parser(clap::value_parser!(i64))
                                .default_value("0"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List templates")))
                .subcommand(
                    Command::new("enable")
                        .about("Activate a template")
                        .arg(Arg::new("key").required(true)),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Deactivate a template")
                        .arg(Arg::new("key").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a template")
                        .arg(Arg::new("key").required(true)),
                ),
        )
        .subcommand(
            Command::new("bonus")
                .about("Manage bonus events")
                .subcommand(
                    Command::new("add")
                        .about("Add a bonus event")
                        .arg(Arg::new("label").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("signing_bonus|year_end_bonus|other"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .required(true)
                                .help("Expected date, YYYY-MM-DD"),
                        )
                        .arg(Arg::new("target").long("target").help("Target account name"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(Command::new("list").about("List bonus events")))
                .subcommand(
                    Command::new("received")
                        .about("Mark a bonus as received with its actual amount")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a bonus event")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(clap::value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("salary")
                .about("Salary configuration and tax forecast")
                .subcommand(
                    Command::new("set")
                        .about("Save a salary configuration (becomes authoritative by effective date)")
                        .arg(Arg::new("gross").long("gross").required(true))
                        .arg(
                            Arg::new("fund-rate")
                                .long("fund-rate")
                                .required(true)
                                .help("Housing fund rate, percent"),
                        )
                        .arg(Arg::new("fund-base").long("fund-base"))
                        .arg(Arg::new("social").long("social").required(true))
                        .arg(
                            Arg::new("deductions")
                                .long("deductions")
                                .default_value("0")
                                .help("Special additional deductions"),
                        )
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .required(true)
                                .help("Effective from, YYYY-MM-DD; starts the milestone series"),
                        )
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(Command::new("show").about("Show the authoritative configuration")))
                .subcommand(json_flags(
                    Command::new("tax").about("12-month cumulative-withholding breakdown"),
                )),
        )
        .subcommand(
            Command::new("milestone")
                .about("Savings milestones")
                .subcommand(Command::new("regen").about("Recompute the 12-month milestone series"))
                .subcommand(json_flags(Command::new("list").about("List milestones chronologically")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete one milestone month (a later regen recreates in-window months)")
                        .arg(Arg::new("month").required(true).help("YYYY-MM")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Monthly summaries")
                .subcommand(
                    json_flags(Command::new("month").about("Milestone and per-account balance changes for one month"))
                        .arg(Arg::new("month").required(true).help("YYYY-MM")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("milestones")
                        .about("Export the milestone table")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check for configuration that silently counts for nothing"))
}
