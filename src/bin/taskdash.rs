//!
//! taskdash CLI binary
//! -------------------
//! Command-line front end for the task-scheduling dashboard. Logs in against
//! the dashboard backend, keeps the bearer credential in a persistent slot,
//! and exposes the dashboard/admin views as REPL commands. Every command is
//! checked against the role-gated navigation guard before it runs.

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Url;

use taskdash::cli::{print_task_table, print_user_table};
use taskdash::client::{DashboardApi, NewTask, ScriptType};
use taskdash::config::Config;
use taskdash::error::ClientError;
use taskdash::guard::{resolve, AccessState, NavOutcome, View};
use taskdash::session::{FileCredentialStorage, Role, SessionStore};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--url <base>] [--user <u> --password <p>] [--token-file <path>] [--command \"<cmd>\"] [--repl]\n\nFlags:\n  --url <base>             Backend base URL (default: TASKDASH_API_URL or http://127.0.0.1:8000)\n  --user <u>               Username for auto-login at startup\n  --password <p>           Password for auto-login at startup\n  --token-file <path>      Persistent credential slot (default: TASKDASH_CREDENTIAL_FILE or .taskdash/credential)\n  --command <cmd>          Run a single command and exit\n  --repl                   Start the interpreter (the default; with --command, runs the command first)\n  -h, --help               Show this help\n\nInteractive commands:\n  login <user> <password>            authenticate and persist the credential\n  logout                             drop the session and clear the slot\n  register <user> <email> <pass>     submit a registration request\n  change-password <old> <new>        change the current user's password (alias: passwd)\n  tasks                              list scheduled tasks\n  create <name> <python|bash> [script] [cron...]   create a task; a cron expression schedules it\n  delete <id>                        delete a task\n  users                              list users (admin)\n  role <id> <role>                   set a user's role (admin)\n  approve <id>                       approve a pending registration (admin)\n  remove-user <id>                   delete a user (admin)\n  open <view>                        run the navigation guard for a view\n  status                             show connection and session state\n  whoami                             show the decoded claims\n  help                               show this help\n  quit | exit                        leave the interpreter\n\nExamples:\n  {program} --url https://dashboard.example.org --user ada --password s3cret\n  {program} --command \"tasks\"\n  {program} --command \"create backup bash /opt/jobs/backup.sh 0 2 * * *\""
    );
}

/// Flags collected from the command line. Config overrides (`--url`,
/// `--token-file`) are applied to the `Config` directly.
#[derive(Debug, Default)]
struct CliFlags {
    auto_user: Option<String>,
    auto_password: Option<String>,
    one_shot: Option<String>,
    repl: bool,
    help: bool,
}

fn parse_flags(args: &[String], cfg: &mut Config) -> std::result::Result<CliFlags, String> {
    let mut flags = CliFlags::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                cfg.api_url = flag_value(args, i, "--url")?;
                i += 2;
            }
            "--user" => {
                flags.auto_user = Some(flag_value(args, i, "--user")?);
                i += 2;
            }
            "--password" => {
                flags.auto_password = Some(flag_value(args, i, "--password")?);
                i += 2;
            }
            "--token-file" => {
                cfg.credential_file = flag_value(args, i, "--token-file")?.into();
                i += 2;
            }
            "--command" => {
                flags.one_shot = Some(flag_value(args, i, "--command")?);
                i += 2;
            }
            "--repl" => {
                flags.repl = true;
                i += 1;
            }
            "-h" | "--help" => {
                flags.help = true;
                i += 1;
            }
            unk => return Err(format!("Unrecognized argument: {}", unk)),
        }
    }
    Ok(flags)
}

fn flag_value(args: &[String], i: usize, flag: &str) -> std::result::Result<String, String> {
    args.get(i + 1).cloned().ok_or_else(|| format!("{} requires a value", flag))
}

fn main() -> Result<()> {
    println!(
        r"  __             __       __           __
 / /_____ ______/ /______/ /___ ______/ /_
/ __/ __ `/ ___/ //_/ __  / __ `/ ___/ __ \
\ /_/ /_/ (__  ) ,< / /_/ / /_/ (__  ) / / /
 \__/\__,_/____/_/|_|\__,_/\__,_/____/_/ /_/
       Task Dashboard Client"
    );
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut cfg = Config::from_env();
    let flags = match parse_flags(&args, &mut cfg) {
        Ok(flags) => flags,
        Err(msg) => {
            eprintln!("{}", msg);
            print_usage(&program);
            std::process::exit(2);
        }
    };
    if flags.help {
        print_usage(&program);
        return Ok(());
    }

    let base = Url::parse(&cfg.api_url)
        .with_context(|| format!("invalid backend URL '{}'", cfg.api_url))?;
    let session = Arc::new(SessionStore::new(Box::new(FileCredentialStorage::new(
        &cfg.credential_file,
    ))));
    let api = DashboardApi::new(base.clone(), session.clone(), cfg.http_timeout)
        .context("failed to build API client")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Optional auto-login before any command runs
    if let (Some(user), Some(pass)) = (flags.auto_user.as_deref(), flags.auto_password.as_deref()) {
        match rt.block_on(api.login(user, pass)) {
            Ok(claims) => println!("logged in as {} ({})", claims.username, claims.role),
            Err(e) => eprintln!("login failed: {}", e),
        }
    }

    if let Some(cmd) = &flags.one_shot {
        run_command(&rt, &api, &session, &base, &program, cmd);
        if !flags.repl {
            return Ok(());
        }
    }

    // REPL
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    println!("taskdash interpreter. Type 'help' for commands.");
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        if stdin.read_line(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break; // EOF
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        run_command(&rt, &api, &session, &base, &program, line);
    }
    Ok(())
}

/// Split a command line into the command word and its arguments. Blank
/// lines carry no command at all and yield `None`.
fn parse_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?;
    Some((cmd, parts.collect()))
}

/// The view a command belongs to, for the guard check. Commands mapping to
/// no view (login, status, ...) are open to any session state.
fn command_view(cmd: &str) -> Option<View> {
    match cmd {
        "tasks" | "create" | "delete" | "change-password" | "passwd" => Some(View::Dashboard),
        "users" | "role" | "approve" | "remove-user" => Some(View::Admin),
        _ => None,
    }
}

/// Map a command to the view it lives on, run the guard, and execute.
/// A denied command prints the redirect target and never partially executes.
fn run_command(
    rt: &tokio::runtime::Runtime,
    api: &DashboardApi,
    session: &Arc<SessionStore>,
    base: &Url,
    program: &str,
    line: &str,
) {
    let Some((cmd, rest)) = parse_line(line) else {
        return;
    };
    let rest = rest.as_slice();
    if let Some(view) = command_view(cmd) {
        if !allow(session, view) {
            return;
        }
    }

    match cmd {
        "help" => print_usage(program),
        "status" => {
            println!("backend: {}", base);
            match session.current_claims() {
                Some(c) => {
                    let until = c
                        .expires_at()
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "(no expiry claim)".to_string());
                    println!("session: {} ({}), valid until {}", c.username, c.role, until);
                }
                None => println!("session: not logged in"),
            }
        }
        "whoami" => match session.current_claims() {
            Some(c) => println!(
                "user id {} username {} role {} active {}",
                c.sub, c.username, c.role, c.is_active
            ),
            None => println!("not logged in"),
        },
        "open" => {
            let Some(view) = rest.first().and_then(|v| v.parse::<View>().ok()) else {
                eprintln!("usage: open <login|register|dashboard|admin>");
                return;
            };
            match resolve(AccessState::of(session.current_claims().as_ref()), view) {
                NavOutcome::Render(v) => println!("rendering {}", v),
                NavOutcome::Redirect(target) => println!("redirected to {}", target),
            }
        }
        "login" => {
            if rest.len() != 2 {
                eprintln!("usage: login <user> <password>");
                return;
            }
            match rt.block_on(api.login(rest[0], rest[1])) {
                Ok(claims) => println!("logged in as {} ({})", claims.username, claims.role),
                Err(e) => report(&e),
            }
        }
        "logout" => {
            session.logout();
            println!("logged out");
        }
        "register" => {
            if rest.len() != 3 {
                eprintln!("usage: register <user> <email> <password>");
                return;
            }
            match rt.block_on(api.register(rest[0], rest[1], rest[2])) {
                Ok(msg) => println!("{}", msg),
                Err(e) => report(&e),
            }
        }
        "change-password" | "passwd" => {
            if rest.len() != 2 {
                eprintln!("usage: change-password <old> <new>");
                return;
            }
            match rt.block_on(api.change_password(rest[0], rest[1])) {
                Ok(msg) => println!("{}", msg),
                Err(e) => report(&e),
            }
        }
        "tasks" => match rt.block_on(api.list_tasks()) {
            Ok(tasks) => print_task_table(&tasks),
            Err(e) => report(&e),
        },
        "create" => {
            if rest.len() < 2 {
                eprintln!("usage: create <name> <python|bash> [script] [cron...]");
                return;
            }
            let script_type = match rest[1].parse::<ScriptType>() {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("{}", e);
                    return;
                }
            };
            let mut task = NewTask::new(rest[0], script_type);
            if let Some(script) = rest.get(2) {
                task.script_path = Some(script.to_string());
            }
            if rest.len() > 3 {
                task.schedule_cron = Some(rest[3..].join(" "));
                task.scheduled = true;
            }
            match rt.block_on(api.create_task(&task)) {
                Ok(created) => println!("created task {} '{}'", created.id, created.taskname),
                Err(e) => report(&e),
            }
        }
        "delete" => {
            let Some(id) = rest.first().and_then(|v| v.parse::<i64>().ok()) else {
                eprintln!("usage: delete <id>");
                return;
            };
            match rt.block_on(api.delete_task(id)) {
                Ok(()) => println!("deleted task {}", id),
                Err(e) => report(&e),
            }
        }
        "users" => match rt.block_on(api.list_users()) {
            Ok(users) => print_user_table(&users),
            Err(e) => report(&e),
        },
        "role" => {
            if rest.len() != 2 {
                eprintln!("usage: role <id> <admin|moderator|power_user|viewer>");
                return;
            }
            let (Ok(id), Ok(role)) = (rest[0].parse::<i64>(), rest[1].parse::<Role>()) else {
                eprintln!("usage: role <id> <admin|moderator|power_user|viewer>");
                return;
            };
            match rt.block_on(api.update_user_role(id, role)) {
                Ok(()) => println!("user {} is now {}", id, role),
                Err(e) => report(&e),
            }
        }
        "approve" => {
            let Some(id) = rest.first().and_then(|v| v.parse::<i64>().ok()) else {
                eprintln!("usage: approve <id>");
                return;
            };
            match rt.block_on(api.approve_user(id)) {
                Ok(msg) => println!("{}", msg),
                Err(e) => report(&e),
            }
        }
        "remove-user" => {
            let Some(id) = rest.first().and_then(|v| v.parse::<i64>().ok()) else {
                eprintln!("usage: remove-user <id>");
                return;
            };
            match rt.block_on(api.delete_user(id)) {
                Ok(()) => println!("deleted user {}", id),
                Err(e) => report(&e),
            }
        }
        unk => eprintln!("unknown command '{}'; type 'help'", unk),
    }
}

/// Guard check for the view a command belongs to.
fn allow(session: &Arc<SessionStore>, view: View) -> bool {
    match resolve(AccessState::of(session.current_claims().as_ref()), view) {
        NavOutcome::Render(_) => true,
        NavOutcome::Redirect(target) => {
            eprintln!("'{}' is not available for this session; redirected to {}", view, target);
            false
        }
    }
}

/// Inline error reporting: session-ending failures become a login hint,
/// everything else is shown as-is. Nothing here is fatal.
fn report(err: &ClientError) {
    if err.ends_session() {
        eprintln!("session expired or missing, please login (error: {})", err);
    } else {
        eprintln!("error: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_command_lines_carry_no_command() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \t  "), None);
    }

    #[test]
    fn command_lines_split_into_word_and_args() {
        let (cmd, rest) = parse_line("role 7 admin").unwrap();
        assert_eq!(cmd, "role");
        assert_eq!(rest, vec!["7", "admin"]);

        let (cmd, rest) = parse_line("  tasks  ").unwrap();
        assert_eq!(cmd, "tasks");
        assert!(rest.is_empty());
    }

    #[test]
    fn repl_flag_is_accepted() {
        let mut cfg = Config::default();
        let flags = parse_flags(&strings(&["--repl"]), &mut cfg).unwrap();
        assert!(flags.repl);
        assert!(flags.one_shot.is_none());

        // and can follow a one-shot command
        let flags =
            parse_flags(&strings(&["--command", "tasks", "--repl"]), &mut cfg).unwrap();
        assert!(flags.repl);
        assert_eq!(flags.one_shot.as_deref(), Some("tasks"));
    }

    #[test]
    fn flag_values_land_in_config_and_flags() {
        let mut cfg = Config::default();
        let args = strings(&[
            "--url",
            "http://dash.example.org",
            "--token-file",
            "/tmp/slot",
            "--user",
            "ada",
            "--password",
            "s3cret",
        ]);
        let flags = parse_flags(&args, &mut cfg).unwrap();
        assert_eq!(cfg.api_url, "http://dash.example.org");
        assert_eq!(cfg.credential_file, PathBuf::from("/tmp/slot"));
        assert_eq!(flags.auto_user.as_deref(), Some("ada"));
        assert_eq!(flags.auto_password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn bad_flags_are_rejected_with_a_message() {
        let mut cfg = Config::default();
        let err = parse_flags(&strings(&["--bogus"]), &mut cfg).unwrap_err();
        assert!(err.contains("--bogus"));

        let err = parse_flags(&strings(&["--url"]), &mut cfg).unwrap_err();
        assert_eq!(err, "--url requires a value");
    }

    #[test]
    fn both_password_command_spellings_hit_the_same_gate() {
        assert_eq!(command_view("change-password"), Some(View::Dashboard));
        assert_eq!(command_view("passwd"), Some(View::Dashboard));
        assert_eq!(command_view("users"), Some(View::Admin));
        assert_eq!(command_view("login"), None);
        assert_eq!(command_view("status"), None);
    }
}
