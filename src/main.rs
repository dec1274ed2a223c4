use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use rusty_bunch::data::files::{load_files, LoadFilesOptions, DEFAULT_SEED};
use rusty_bunch::data::resources::{Resources, RESOURCES_ENV};
use rusty_bunch::summary::Summary;

#[derive(Debug, Parser)]
#[command(name = "rusty-bunch", version, about = "Inspect bundled datasets and file corpora")]
struct Cli {
    /// Resource root holding data/ and descr/.
    #[arg(long, global = true, env = RESOURCES_ENV)]
    resources: Option<PathBuf>,

    /// Rows or paths to show.
    #[arg(long, global = true, default_value_t = 5)]
    head: usize,

    /// Also print the dataset description.
    #[arg(long, global = true)]
    show_descr: bool,

    /// Print the summary as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bundled iris dataset.
    Iris,
    /// Bundled 8x8 digits dataset.
    Digits,
    /// Bundled cherry trees regression dataset.
    Trees,
    /// A directory with one subfolder per category.
    Files {
        container: PathBuf,
        /// Only load these categories (repeatable).
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        no_shuffle: bool,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        #[arg(long)]
        description: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let resources = cli
        .resources
        .clone()
        .map(Resources::new)
        .unwrap_or_else(Resources::bundled);
    info!("resource root: {}", resources.root().display());

    let summary = match &cli.command {
        Command::Iris => {
            let ds = resources.load_iris().context("loading iris")?;
            Summary::of_tabular("iris", &ds, cli.head)
        }
        Command::Digits => {
            let ds = resources.load_digits().context("loading digits")?;
            Summary::of_tabular("digits", &ds, cli.head)
        }
        Command::Trees => {
            let ds = resources.load_trees().context("loading trees")?;
            Summary::of_regression("trees", &ds, cli.head)
        }
        Command::Files {
            container,
            categories,
            no_shuffle,
            seed,
            description,
        } => {
            let mut options = LoadFilesOptions::new().shuffle(!no_shuffle).seed(*seed);
            if !categories.is_empty() {
                options = options.categories(categories.iter().cloned());
            }
            options.description = description.clone();
            let corpus = load_files(container, &options)
                .with_context(|| format!("loading corpus {}", container.display()))?;
            Summary::of_corpus(&container.display().to_string(), &corpus, cli.head)
        }
    };

    if cli.json {
        println!("{}", summary.to_json().context("serialising summary")?);
    } else {
        print!("{summary}");
        if cli.show_descr {
            match &summary.descr {
                Some(text) => println!("\n{text}"),
                None => println!("\n(no description)"),
            }
        }
    }
    Ok(())
}
