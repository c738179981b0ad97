use clap::CommandFactory;
use searchkaro_admin::{MemoryCookieStore, SessionUser};

use super::*;

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn parses_resource_update() {
    let cli = Cli::try_parse_from(["searchkaro", "categories", "update", "7", "--data", "{}"]).unwrap();
    match cli.command {
        Command::Categories(ResourceCommand { command: ResourceSubcommand::Update { id, data } }) => {
            assert_eq!(id, "7");
            assert_eq!(data, "{}");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

fn logout_countdown(args: &[&str]) -> Option<u32> {
    let cli = Cli::try_parse_from(args).unwrap();
    match cli.command {
        Command::Logout { countdown } => countdown_secs(countdown),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn countdown_flag_defaults_and_overrides() {
    assert_eq!(logout_countdown(&["searchkaro", "logout"]), None);
    assert_eq!(logout_countdown(&["searchkaro", "logout", "--countdown"]), Some(DEFAULT_COUNTDOWN_SECS));
    assert_eq!(logout_countdown(&["searchkaro", "logout", "--countdown", "5"]), Some(5));
}

#[test]
fn status_omits_token() {
    let mut session = Session::pending();
    session.commit("abc123".to_owned(), SessionUser::logged_in());

    let status = status_json(&session);
    assert_eq!(status, json!({ "authenticated": true, "loading": false, "user": { "loggedIn": true } }));
    assert!(!status.to_string().contains("abc123"));
}

#[test]
fn flags_override_environment_config() {
    let config = build_config("http://admin.example.test/api/", PathBuf::from("/tmp/jar.txt")).unwrap();
    assert_eq!(config.base_url, "http://admin.example.test/api");
    assert_eq!(config.cookie_jar, PathBuf::from("/tmp/jar.txt"));
    assert!(build_config("admin.example.test", PathBuf::from("/tmp/jar.txt")).is_err());
}

#[test]
fn protected_command_without_session_asks_for_login() {
    let config = ClientConfig::new(DEFAULT_API_URL).unwrap();
    let api = ApiClient::new(&config, Arc::new(MemoryCookieStore::new())).unwrap();
    let gateway = AuthGateway::new(api);
    gateway.restore();

    let err = require(&gateway, Route::Categories).unwrap_err();
    assert!(matches!(err, CliError::LoginRequired("/categories")));
    assert_eq!(err.to_string(), "/categories requires a session; log in first");
}
