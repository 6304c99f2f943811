use std::io::{self, Write};
use std::str::FromStr;

use timetable_engine::persistence::{
    export_rows_to_csv, load_timetable_from_json, save_timetable_to_json,
};
use timetable_engine::view::EntryRow;
use timetable_engine::{
    Day, EngineConfig, NewEntry, Timetable, TimetableEngine, ViewFilter, logging,
};

const HEADERS: [&str; 9] = [
    "day", "time", "subject", "code", "teacher", "class", "batch", "lab_room", "type",
];

fn row_cells(row: &EntryRow) -> Vec<String> {
    vec![
        row.day.clone(),
        format!("{}-{}", row.start, row.end),
        row.subject.clone(),
        row.subject_code.clone(),
        row.teacher.clone(),
        row.class.clone(),
        row.batch.clone(),
        row.lab_room.clone(),
        if row.is_lab { "lab" } else { "lecture" }.to_string(),
    ]
}

fn render_rows_as_text_table(rows: &[EntryRow]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_line = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(value.len())));
            line.push_str(" |");
        }
        line
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_line(&header));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the master timetable\n  stats                              Show resource and entry counts\n  sample                             Reset to the sample dataset\n  clear                              Remove every entry\n  generate                           Generate a fresh timetable\n  class <id>                         Show one class's timetable\n  teacher <id>                       Show one teacher's timetable\n  warnings                           Show warnings from the last generation\n  audit                              List clashes among current entries\n  lecture <day> <slot> <subject> <teacher> <class>\n                                     Add a lecture entry by hand\n  lab <day> <slot> <subject> <teacher> <class> <batch> <room>\n                                     Add a lab entry by hand\n  delete <entry_id>                  Remove one entry\n  remove <kind> <id>                 Remove a time_slot|subject|teacher|class|lab_room\n  save json <path>                   Save the timetable as JSON\n  load json <path>                   Load a timetable from JSON\n  save sqlite <path>                 Save the timetable to a SQLite file\n  load sqlite <path>                 Load the timetable from a SQLite file\n  export csv <path> [class|teacher <id>]\n                                     Export rows as CSV\n  config <json_path>                 Load engine settings\n  seed <n>                           Change the lecture-count seed\n  quit|exit                          Exit"
    );
}

fn print_entries(timetable: &Timetable, filter: &ViewFilter) {
    let rows = timetable.rows(filter);
    if rows.is_empty() {
        println!("No entries.");
    } else {
        println!("{}", render_rows_as_text_table(&rows));
    }
}

fn parse_filter<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<ViewFilter, String> {
    match (parts.next(), parts.next()) {
        (None, _) => Ok(ViewFilter::Master),
        (Some("class"), Some(id)) => Ok(ViewFilter::Class(id.to_string())),
        (Some("teacher"), Some(id)) => Ok(ViewFilter::Teacher(id.to_string())),
        _ => Err("expected 'class <id>' or 'teacher <id>'".to_string()),
    }
}

fn parse_entry(cmd: &str, args: &[&str]) -> Result<NewEntry, String> {
    let day = Day::from_str(args[0]).map_err(|e| e.to_string())?;
    if cmd == "lecture" {
        return Ok(NewEntry::lecture(day, args[1], args[2], args[3], args[4]));
    }
    let batch: u32 = args[5]
        .parse()
        .map_err(|_| format!("Invalid batch number '{}'", args[5]))?;
    Ok(NewEntry::lab(
        day, args[1], args[2], args[3], args[4], batch, args[6],
    ))
}

#[cfg(feature = "sqlite")]
fn save_sqlite(timetable: &Timetable, path: &str) -> Result<(), String> {
    use timetable_engine::persistence::TimetableStore;
    use timetable_engine::persistence::sqlite::SqliteTimetableStore;

    let store = SqliteTimetableStore::new(path).map_err(|e| e.to_string())?;
    store.save_timetable(timetable).map_err(|e| e.to_string())
}

#[cfg(feature = "sqlite")]
fn load_sqlite(path: &str) -> Result<Timetable, String> {
    use timetable_engine::persistence::sqlite::SqliteTimetableStore;
    use timetable_engine::persistence::{PersistenceError, TimetableStore};

    let store = SqliteTimetableStore::new(path).map_err(|e| e.to_string())?;
    store
        .load_timetable()
        .and_then(|loaded| loaded.ok_or(PersistenceError::NotFound))
        .map_err(|e| e.to_string())
}

#[cfg(not(feature = "sqlite"))]
fn save_sqlite(_timetable: &Timetable, _path: &str) -> Result<(), String> {
    Err("rebuild with the `sqlite` feature to use SQLite storage".to_string())
}

#[cfg(not(feature = "sqlite"))]
fn load_sqlite(_path: &str) -> Result<Timetable, String> {
    Err("rebuild with the `sqlite` feature to use SQLite storage".to_string())
}

fn main() {
    logging::init();

    let mut timetable = Timetable::sample();
    let mut config = EngineConfig::default();
    let mut engine = TimetableEngine::default();

    println!("Timetable Engine (CLI) - type 'help' for commands\n");
    let stats = timetable.stats();
    println!(
        "Loaded sample data: {} classes, {} subjects, {} teachers, {} lab rooms.",
        stats.classes, stats.subjects, stats.teachers, stats.lab_rooms
    );

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_entries(&timetable, &ViewFilter::Master),
            "stats" => {
                let s = timetable.stats();
                println!(
                    "time_slots={} (breaks={}, lab={}), subjects={} (with lab={}), teachers={}, classes={}, lab_rooms={}, entries={} (labs={})",
                    s.time_slots,
                    s.breaks,
                    s.lab_slots,
                    s.subjects,
                    s.lab_subjects,
                    s.teachers,
                    s.classes,
                    s.lab_rooms,
                    s.entries,
                    s.lab_entries
                );
            }
            "sample" => {
                timetable.reset_to_sample();
                println!("Sample data restored.");
            }
            "clear" => {
                timetable.clear_entries();
                println!("All entries removed.");
            }
            "generate" => match timetable.generate(&engine) {
                Ok(summary) => println!("Generated ({})", summary.to_cli_summary()),
                Err(e) => println!("Generation error: {}", e),
            },
            "class" | "teacher" => match parts.next() {
                Some(id) => {
                    let filter = if cmd == "class" {
                        ViewFilter::Class(id.to_string())
                    } else {
                        ViewFilter::Teacher(id.to_string())
                    };
                    print_entries(&timetable, &filter);
                }
                None => println!("Usage: {} <id>", cmd),
            },
            "warnings" => {
                let warnings = timetable.warnings();
                if warnings.is_empty() {
                    println!("No warnings.");
                }
                for warning in warnings {
                    println!("[{}] {}", warning.kind(), warning);
                }
            }
            "audit" => {
                let conflicts = timetable.audit();
                if conflicts.is_empty() {
                    println!("No conflicts.");
                }
                for conflict in conflicts {
                    println!("{}", conflict);
                }
            }
            "lecture" | "lab" => {
                let args: Vec<&str> = parts.collect();
                let needed = if cmd == "lecture" { 5 } else { 7 };
                if args.len() != needed {
                    if cmd == "lecture" {
                        println!("Usage: lecture <day> <slot> <subject> <teacher> <class>");
                    } else {
                        println!(
                            "Usage: lab <day> <slot> <subject> <teacher> <class> <batch> <room>"
                        );
                    }
                    continue;
                }
                let entry = match parse_entry(cmd, &args) {
                    Ok(entry) => entry,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match timetable.add_entry(entry) {
                    Ok(entry) => println!("Added entry {}.", entry.id),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    if timetable.remove_entry(id) {
                        println!("Deleted entry {}.", id);
                    } else {
                        println!("Entry {} not found.", id);
                    }
                }
                None => println!("Usage: delete <entry_id>"),
            },
            "remove" => {
                let (Some(kind), Some(id)) = (parts.next(), parts.next()) else {
                    println!("Usage: remove <time_slot|subject|teacher|class|lab_room> <id>");
                    continue;
                };
                let removed = match kind {
                    "time_slot" => timetable.remove_time_slot(id),
                    "subject" => timetable.remove_subject(id),
                    "teacher" => timetable.remove_teacher(id),
                    "class" => timetable.remove_class(id),
                    "lab_room" => timetable.remove_lab_room(id),
                    _ => {
                        println!("Unknown kind '{}'.", kind);
                        continue;
                    }
                };
                if removed {
                    println!("Removed {} {}.", kind, id);
                } else {
                    println!("No {} with id {}.", kind, id);
                }
            }
            "save" | "load" => {
                let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: {} <json|sqlite> <path>", cmd);
                    continue;
                };
                let result = match (cmd, format) {
                    ("save", "json") => save_timetable_to_json(&timetable, path)
                        .map_err(|e| e.to_string()),
                    ("save", "sqlite") => save_sqlite(&timetable, path),
                    ("load", "json") => load_timetable_from_json(path)
                        .map(|loaded| timetable = loaded)
                        .map_err(|e| e.to_string()),
                    ("load", "sqlite") => load_sqlite(path).map(|loaded| timetable = loaded),
                    _ => Err(format!("unknown format '{}'", format)),
                };
                match result {
                    Ok(()) if cmd == "save" => println!("Timetable saved to {}.", path),
                    Ok(()) => println!("Timetable loaded from {}.", path),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "export" => {
                let (Some("csv"), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: export csv <path> [class|teacher <id>]");
                    continue;
                };
                let filter = match parse_filter(parts) {
                    Ok(filter) => filter,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match export_rows_to_csv(&timetable, &filter, path) {
                    Ok(count) => println!("Exported {} rows to {}.", count, path),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "config" => {
                let Some(path) = parts.next() else {
                    println!("Usage: config <json_path>");
                    continue;
                };
                let loaded = EngineConfig::from_json_file(path).and_then(|loaded| {
                    TimetableEngine::new(loaded.clone()).map(|built| (loaded, built))
                });
                match loaded {
                    Ok((loaded, built)) => {
                        config = loaded;
                        engine = built;
                        println!("Engine settings loaded from {}.", path);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "seed" => {
                let Some(seed) = parts.next().and_then(|s| s.parse::<u64>().ok()) else {
                    println!("Usage: seed <n>");
                    continue;
                };
                let mut next = config.clone();
                next.seed = seed;
                match TimetableEngine::new(next.clone()) {
                    Ok(built) => {
                        config = next;
                        engine = built;
                        println!("Seed set to {}.", seed);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
