use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::load_config;
use crate::model::rows_from_json;
use crate::overrides::LayoutOverrides;
use crate::session::EditorSession;

#[derive(Parser, Debug)]
#[command(
    name = "reeflow",
    version,
    about = "Rare-earth material-flow diagram layout engine"
)]
pub struct Args {
    /// Rows JSON file: a year-keyed table of named flow volumes (kt)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Year to lay out; defaults to the latest year in the table
    #[arg(short = 'y', long = "year")]
    pub year: Option<i32>,

    /// Saved layout JSON applied on top of the automatic layout
    #[arg(short = 'l', long = "layout")]
    pub layout: Option<PathBuf>,

    /// Output file for the positioned-graph dump; stdout if omitted
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Write the layout snapshot back out after positioning
    #[arg(long = "saveLayout")]
    pub save_layout: Option<PathBuf>,

    /// Config JSON/JSON5 file (layout + theme overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// List the years present in the input and exit
    #[arg(long = "listYears")]
    pub list_years: bool,
}

pub fn run() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read rows file {}", args.input.display()))?;
    let rows = rows_from_json(&contents)?;
    if rows.is_empty() {
        return Err(anyhow::anyhow!("no rows found in input"));
    }

    if args.list_years {
        for year in rows.keys() {
            println!("{year}");
        }
        return Ok(());
    }

    let year = match args.year {
        Some(year) => year,
        None => *rows.keys().next_back().expect("rows checked non-empty"),
    };
    let row = rows
        .get(&year)
        .with_context(|| format!("year {year} not present in input"))?
        .clone();

    let config = load_config(args.config.as_deref())?;
    let mut session = EditorSession::new(row, config)?;

    if let Some(path) = args.layout.as_deref() {
        let overrides = read_overrides(path)?;
        session.load_overrides(overrides)?;
    }

    if let Some(path) = args.save_layout.as_deref() {
        let snapshot = session.save_layout();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
    }

    let theme = session.config().theme.clone();
    match args.output.as_deref() {
        Some(path) => {
            crate::layout_dump::write_layout_dump(path, session.layout(), &theme, session.labels())?;
        }
        None => {
            let dump = crate::layout_dump::LayoutDump::from_layout(
                session.layout(),
                &theme,
                session.labels(),
            );
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}

fn read_overrides(path: &Path) -> Result<LayoutOverrides> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read layout file {}", path.display()))?;
    let overrides = serde_json::from_str(&contents)
        .with_context(|| format!("invalid layout file {}", path.display()))?;
    Ok(overrides)
}
