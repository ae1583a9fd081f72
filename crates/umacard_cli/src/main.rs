use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::debug;
use umacard_core::card::{export_file_stem, portrait_file_name};
use umacard_core::core_api::{CoreError, Engine};
use umacard_core::invariants::Operation;
use umacard_core::png::{self, Chunks};
use umacard_core::record::{Aptitude, AptitudeKind, CanonicalRecord, Stat, Strategy};
use umacard_render::{
    JsonStyle, render_chunk_listing, render_chunks_json, render_json, render_sheet,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding skill_data.json, skill_meta.json, skillnames.json and umas.json.
    #[arg(long, env = "UMACARD_DATA_DIR", value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a horse record from a JSON file or an Uma card PNG.
    Show {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
        /// With --json, include character and skill names.
        #[arg(long, requires = "json")]
        annotated: bool,
    },
    /// Write a record out as JSON, or as a card PNG with --card.
    Export {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        target: OutputTarget,
    },
    /// Apply edits to a record and write the result.
    Edit {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        edits: EditArgs,
        #[command(flatten)]
        target: OutputTarget,
    },
    /// Build a record from a saved vision-model reply.
    Ocr {
        #[arg(value_name = "TEXT_FILE")]
        path: PathBuf,
        #[command(flatten)]
        target: OutputTarget,
    },
    /// Find outfits by epithet or character name.
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },
    #[command(subcommand)]
    Debug(DebugCommand),
}

#[derive(Debug, Subcommand)]
enum DebugCommand {
    /// List the chunks of a PNG file.
    Chunks {
        #[arg(value_name = "PNG")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, clap::Args)]
struct OutputTarget {
    /// Write an Uma card PNG instead of JSON.
    #[arg(long)]
    card: bool,
    /// Directory of trained_chr_icon_*.png portraits; defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    icons_dir: Option<PathBuf>,
    /// Output path; `-` prints JSON to stdout (not allowed with --card). Defaults to a name
    /// derived from the character.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct EditArgs {
    /// Start from the default record before applying other edits.
    #[arg(long)]
    reset: bool,
    /// Outfit id, or an empty string to clear.
    #[arg(long = "set-outfit", value_name = "OUTFIT_ID")]
    set_outfit: Option<String>,
    #[arg(long = "set-speed")]
    set_speed: Option<i32>,
    #[arg(long = "set-stamina")]
    set_stamina: Option<i32>,
    #[arg(long = "set-power")]
    set_power: Option<i32>,
    #[arg(long = "set-guts")]
    set_guts: Option<i32>,
    #[arg(long = "set-wisdom")]
    set_wisdom: Option<i32>,
    #[arg(long = "set-strategy", value_name = "Nige|Senkou|Sasi|Oikomi|Oonige")]
    set_strategy: Option<Strategy>,
    #[arg(long = "set-surface-aptitude", value_name = "GRADE")]
    set_surface_aptitude: Option<Aptitude>,
    #[arg(long = "set-distance-aptitude", value_name = "GRADE")]
    set_distance_aptitude: Option<Aptitude>,
    #[arg(long = "set-strategy-aptitude", value_name = "GRADE")]
    set_strategy_aptitude: Option<Aptitude>,
    #[arg(long = "set-mood", allow_hyphen_values = true)]
    set_mood: Option<i8>,
    #[arg(long = "remove-skill", value_name = "SKILL_ID")]
    remove_skill: Vec<String>,
    #[arg(long = "add-skill", value_name = "SKILL_ID")]
    add_skill: Vec<String>,
    /// `SKILL_ID=METERS`; an empty or non-numeric value clears the position.
    #[arg(long = "force-position", value_name = "SKILL_ID=METERS")]
    force_position: Vec<String>,
}

impl EditArgs {
    /// Edits in the order they are applied.
    fn operations(&self) -> Result<Vec<Operation>, String> {
        let mut ops = Vec::new();
        if self.reset {
            ops.push(Operation::Reset);
        }
        if let Some(outfit) = &self.set_outfit {
            ops.push(Operation::SetOutfit(outfit.clone()));
        }
        let stats = [
            (Stat::Speed, self.set_speed),
            (Stat::Stamina, self.set_stamina),
            (Stat::Power, self.set_power),
            (Stat::Guts, self.set_guts),
            (Stat::Wisdom, self.set_wisdom),
        ];
        for (stat, value) in stats {
            if let Some(v) = value {
                ops.push(Operation::SetStat(stat, v));
            }
        }
        if let Some(strategy) = self.set_strategy {
            ops.push(Operation::SetStrategy(strategy));
        }
        let aptitudes = [
            (AptitudeKind::Surface, self.set_surface_aptitude),
            (AptitudeKind::Distance, self.set_distance_aptitude),
            (AptitudeKind::Strategy, self.set_strategy_aptitude),
        ];
        for (kind, grade) in aptitudes {
            if let Some(g) = grade {
                ops.push(Operation::SetAptitude(kind, g));
            }
        }
        if let Some(mood) = self.set_mood {
            ops.push(Operation::SetMood(mood));
        }
        for id in &self.remove_skill {
            ops.push(Operation::RemoveSkill(id.clone()));
        }
        for id in &self.add_skill {
            ops.push(Operation::AddSkill(id.clone()));
        }
        for pair in &self.force_position {
            let Some((skill_id, raw)) = pair.split_once('=') else {
                return Err(format!(
                    "--force-position expects SKILL_ID=METERS, got {pair:?}"
                ));
            };
            ops.push(Operation::SetForcedPosition {
                skill_id: skill_id.to_string(),
                raw: raw.to_string(),
            });
        }
        Ok(ops)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Debug(DebugCommand::Chunks { path, json }) => debug_chunks(path, *json),
        Command::Show {
            path,
            json,
            annotated,
        } => {
            let engine = load_engine(cli.data_dir.as_deref());
            let record = import_file(&engine, path);
            if *json {
                let style = if *annotated {
                    JsonStyle::Annotated
                } else {
                    JsonStyle::Canonical
                };
                print_json(&render_json(&record, engine.corpus(), style));
            } else {
                print!("{}", render_sheet(&record, engine.corpus()));
            }
        }
        Command::Export { path, target } => {
            let engine = load_engine(cli.data_dir.as_deref());
            let record = import_file(&engine, path);
            write_record(&engine, &record, target);
        }
        Command::Edit {
            path,
            edits,
            target,
        } => {
            let ops = edits.operations().unwrap_or_else(|e| {
                eprintln!("{e}");
                process::exit(2);
            });
            if ops.is_empty() {
                eprintln!("edit requires at least one --set-*, --add-skill, --remove-skill, --force-position or --reset flag");
                process::exit(2);
            }

            let engine = load_engine(cli.data_dir.as_deref());
            let mut record = import_file(&engine, path);
            for op in ops {
                debug!("applying {op:?}");
                record = engine.apply(&record, op.clone()).unwrap_or_else(|e| {
                    eprintln!("Error applying edit {op:?}: {e}");
                    process::exit(1);
                });
            }
            write_record(&engine, &record, target);
        }
        Command::Ocr { path, target } => {
            let engine = load_engine(cli.data_dir.as_deref());
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            });
            let record = engine.import_ocr_text(&text).unwrap_or_else(|e| {
                eprintln!("Error reading vision model reply: {}", path.display());
                eprintln!("  {e}");
                process::exit(1);
            });
            write_record(&engine, &record, target);
        }
        Command::Search { query } => {
            let engine = load_engine(cli.data_dir.as_deref());
            let outfits = &engine.corpus().outfits;
            let hits = outfits.search(query);
            if hits.is_empty() {
                eprintln!("No outfits match {query:?}");
                process::exit(1);
            }
            for outfit_id in hits {
                println!(
                    "{outfit_id}\t{}\t{}",
                    outfits.epithet(outfit_id).unwrap_or_default(),
                    outfits.character_name(outfit_id).unwrap_or_default()
                );
            }
        }
    }
}

fn load_engine(data_dir: Option<&Path>) -> Engine {
    let Some(data_dir) = data_dir else {
        eprintln!("--data-dir <DIR> or UMACARD_DATA_DIR is required for this command");
        process::exit(2);
    };
    Engine::load_from_dir(data_dir).unwrap_or_else(|e| {
        eprintln!("Error loading game data from {}", data_dir.display());
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn import_file(engine: &Engine, path: &Path) -> CanonicalRecord {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    engine.open_bytes(bytes, None).unwrap_or_else(|e| {
        eprintln!("Error importing {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn write_record(engine: &Engine, record: &CanonicalRecord, target: &OutputTarget) {
    let to_stdout = target.output.as_deref() == Some(Path::new("-"));
    if target.card && to_stdout {
        eprintln!("--card writes a PNG file; pass a file path to --output");
        process::exit(2);
    }
    let stem = export_file_stem(record, &engine.corpus().outfits);

    let (bytes, default_name) = if target.card {
        let icons_dir = target
            .icons_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."));
        let portrait_path = icons_dir.join(portrait_file_name(&record.outfit_id));
        let portrait = fs::read(&portrait_path).unwrap_or_else(|e| {
            eprintln!("Error reading portrait {}: {e}", portrait_path.display());
            process::exit(1);
        });
        let card = engine
            .export_card(record, &portrait)
            .unwrap_or_else(|e| exit_with(&e, "Error creating card"));
        (card, format!("{stem}_card.png"))
    } else {
        let json = engine
            .export_json(record)
            .unwrap_or_else(|e| exit_with(&e, "Error rendering JSON output"));
        if to_stdout {
            println!("{json}");
            return;
        }
        (format!("{json}\n").into_bytes(), format!("{stem}.json"))
    };

    let out_path = target
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_name));
    fs::write(&out_path, bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });
    println!("Wrote {}", out_path.display());
}

fn exit_with(err: &CoreError, context: &str) -> ! {
    eprintln!("{context}: {err}");
    process::exit(1);
}

fn debug_chunks(path: &Path, json: bool) {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    let scanned = png::scan_layout(&bytes).and_then(|layout| {
        let chunks = Chunks::new(&bytes)?.collect::<Result<Vec<_>, _>>()?;
        Ok((layout, chunks))
    });
    let (layout, chunks) = scanned.unwrap_or_else(|e| {
        eprintln!("Error scanning {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    });
    if let Err(e) = layout.validate() {
        eprintln!("Error mapping {}: {e}", path.display());
        process::exit(1);
    }

    if json {
        print_json(&render_chunks_json(&chunks, &layout));
        return;
    }
    print!("{}", render_chunk_listing(&chunks, &layout));
    if let Ok(Some(text)) = png::extract_text(&bytes) {
        println!("card payload: {text}");
    }
}

fn print_json(value: &serde_json::Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
