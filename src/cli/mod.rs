//! ASCII table rendering for REPL output.

use terminal_size::{terminal_size, Width};

use crate::client::{Task, User};

/// Render the task listing the dashboard view shows.
pub fn print_task_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    let headers = ["id", "name", "scheduled", "cron", "runs", "last run", "type", "script"];
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.taskname.clone(),
                yes_no(t.scheduled),
                t.schedule_cron.clone().unwrap_or_default(),
                t.runcount.to_string(),
                if t.runcount > 0 { ok_failed(t.successful) } else { "-".to_string() },
                t.script_type.to_string(),
                t.script_path.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&headers, &rows);
    println!("tasks: {}", tasks.len());
}

/// Render the admin user listing.
pub fn print_user_table(users: &[User]) {
    if users.is_empty() {
        println!("no users");
        return;
    }
    let headers = ["id", "username", "email", "role", "active"];
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.username.clone(),
                u.email.clone(),
                u.role.to_string(),
                yes_no(u.is_active),
            ]
        })
        .collect();
    print_table(&headers, &rows);
    println!("users: {}", users.len());
}

fn yes_no(b: bool) -> String {
    if b { "yes" } else { "no" }.to_string()
}

fn ok_failed(b: bool) -> String {
    if b { "ok" } else { "failed" }.to_string()
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    // Cap each column at a share of the terminal width so wide script paths
    // do not wrap.
    let term_width = terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(120);
    let max_col_width = (term_width / headers.len().max(1)).max(8);

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count()).min(max_col_width);
        }
    }

    let sep = separator(&widths);
    println!("{}", sep);
    println!("{}", format_row(headers.iter().map(|h| h.to_string()).collect::<Vec<_>>().as_slice(), &widths));
    println!("{}", sep);
    for row in rows {
        println!("{}", format_row(row, &widths));
    }
    println!("{}", sep);
}

fn separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = w.saturating_sub(text.chars().count());
        s.push(' ');
        if is_numeric_like(cell) {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty() && t.chars().all(|c| c.is_ascii_digit())
}
