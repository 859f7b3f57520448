use super::*;

#[test]
fn parses_translate_with_defaults() {
    let cli = Cli::try_parse_from(["cobipedia", "translate"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Translate {
            dry_run: false,
            resume: false,
            limit: None,
            locale: None,
            content_type: None,
        }
    ));
}

#[test]
fn parses_translate_with_every_flag() {
    let cli = Cli::try_parse_from([
        "cobipedia",
        "translate",
        "--dry-run",
        "--resume",
        "--limit",
        "5",
        "--locale",
        "pl",
        "--type",
        "set",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Translate {
            dry_run,
            resume,
            limit,
            locale,
            content_type,
        } => {
            assert!(dry_run);
            assert!(resume);
            assert_eq!(limit, Some(5));
            assert_eq!(locale.as_deref(), Some("pl"));
            assert_eq!(content_type.as_deref(), Some("set"));
        }
        other => panic!("expected translate, got {other:?}"),
    }
}

#[test]
fn translate_rejects_non_numeric_limit() {
    assert!(Cli::try_parse_from(["cobipedia", "translate", "--limit", "ten"]).is_err());
}

#[test]
fn parses_check_command() {
    let cli = Cli::try_parse_from(["cobipedia", "check"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Check));
}

#[test]
fn parses_report_quality_json() {
    let cli = Cli::try_parse_from(["cobipedia", "report", "quality", "--json"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Report {
            command: ReportCommands::Quality { json: true }
        }
    ));
}

#[test]
fn command_is_required() {
    assert!(Cli::try_parse_from(["cobipedia"]).is_err());
}
