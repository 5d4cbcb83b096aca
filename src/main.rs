#[cfg(not(feature = "cli"))]
compile_error!("The binary requires the 'cli' feature. Run with: cargo build --features cli");

use clap::Parser;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use erbsland_maze::cli::Args;
use erbsland_maze::generator::Generator;
use erbsland_maze::room::WallState;

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let silent = args.silent;
    let no_marks = args.no_marks;
    let output = args.output.clone();

    let config = match args.into_configuration() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::from(1);
        }
    };

    let mut generator = Generator::new(config);
    let model = match generator.run() {
        Ok(model) => model,
        Err(err) => {
            eprintln!("generation failed: {err}");
            return ExitCode::from(2);
        }
    };

    if !model.warnings.is_empty() {
        for warning in &model.warnings {
            eprintln!("warning: {warning}");
        }
    }

    if !silent {
        println!("{}", ascii_preview(&model, no_marks));
    }

    if let Some(path) = output.as_ref() {
        let json = serde_json::to_string_pretty(&model).expect("serialize maze model");
        let p: &Path = path.as_path();
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = fs::create_dir_all(parent);
            }
        }
        fs::write(p, json).expect("write json file");
    }

    ExitCode::SUCCESS
}

/// A compact text preview of the grid, one character per wall/room cell,
/// in the teacher's `visualize::to_ascii` spirit but over the tri-state
/// wall model rather than tile ids.
fn ascii_preview(model: &erbsland_maze::model::MazeModel, no_marks: bool) -> String {
    let mut rows_by_location = std::collections::HashMap::new();
    for room in &model.rooms {
        for dy in 0..room.size.h {
            for dx in 0..room.size.w {
                rows_by_location.insert((room.location.x + dx as i32, room.location.y + dy as i32), room);
            }
        }
    }
    let mut out = String::new();
    for y in 0..model.ny as i32 {
        for x in 0..model.nx as i32 {
            let room = rows_by_location.get(&(x, y));
            let ch = match room {
                None => '?',
                Some(room) if room.room_type == erbsland_maze::room::RoomType::Blank => ' ',
                Some(room) if !no_marks && room.endpoint.is_some() => 'E',
                Some(room) if room.walls.iter().any(|w| *w == WallState::Carved) => '.',
                Some(_) => '#',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
